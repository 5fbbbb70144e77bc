//! `sprig serve`: demo HTTP host with live component rendering.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Request, Response, Server, StatusCode};

use crate::config::{ReloadStrategy, RendererConfig};
use crate::engine::EnvironmentBuilder;
use crate::log;
use crate::metrics::LogSink;
use crate::reload::{EnvironmentSource, ReloadLoop, ReloadLoopHandle, Reloading};
use crate::render::{ComponentState, RenderScheduler};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference so the Ctrl+C handler can unblock the accept loop
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

pub fn run(
    config: &RendererConfig,
    interface: Option<std::net::IpAddr>,
    port: Option<u16>,
) -> Result<()> {
    let addr = SocketAddr::new(
        interface.unwrap_or(config.serve.interface),
        port.unwrap_or(config.serve.port),
    );

    let files = config.source_files();
    let builder = EnvironmentBuilder::new(files.clone());

    // Reload strategy: a background poll loop publishing into a slot, or a
    // call-time reloading handle. With reloading disabled the loop still
    // performs the one-shot initial build, then exits.
    let mut poll_handle: Option<ReloadLoopHandle> = None;
    let source: Arc<dyn EnvironmentSource> =
        if config.reload.enabled && config.reload.strategy == ReloadStrategy::OnDemand {
            Arc::new(Reloading::new(files, move || {
                builder.build().map_err(Into::into)
            }))
        } else {
            let handle = ReloadLoop::spawn(builder, config.poll_interval(), config.reload.enabled);
            let slot = handle.slot();
            poll_handle = Some(handle);
            slot
        };

    let scheduler = Arc::new(RenderScheduler::new(
        source,
        Arc::new(LogSink),
        config.render.workers,
        config.queue_capacity(),
        config.render_timeout(),
    ));

    let server =
        Arc::new(Server::http(addr).map_err(|e| anyhow!("failed to bind {addr}: {e}"))?);
    setup_shutdown_handler(Arc::clone(&server))?;
    log!("serve"; "http://{addr}");

    run_request_loop(&server, &scheduler, config)?;

    scheduler.shutdown_now();
    if let Some(handle) = poll_handle {
        handle.stop();
    }
    log!("serve"; "stopped");
    Ok(())
}

/// Setup the global Ctrl+C handler: flag shutdown and unblock the accept
/// loop so the process can wind down instead of waiting for one more
/// request.
fn setup_shutdown_handler(server: Arc<Server>) -> Result<()> {
    let _ = SERVER.set(server);
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        if let Some(server) = SERVER.get() {
            log!("serve"; "shutting down...");
            server.unblock();
        }
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {e}"))
}

fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

fn run_request_loop(
    server: &Server,
    scheduler: &Arc<RenderScheduler>,
    config: &RendererConfig,
) -> Result<()> {
    // Handle requests concurrently so one slow render does not serialize
    // the whole server behind it.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create request thread pool")?;

    let config = Arc::new(config.clone());
    for request in server.incoming_requests() {
        if is_shutdown() {
            break;
        }
        let scheduler = Arc::clone(scheduler);
        let config = Arc::clone(&config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &scheduler, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(
    request: Request,
    scheduler: &RenderScheduler,
    config: &RendererConfig,
) -> Result<()> {
    let url = request.url().to_owned();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));

    let id = path.trim_matches('/');
    let id = if id.is_empty() {
        config.serve.component.as_str()
    } else {
        id
    };

    let Some(component) = config.component(id) else {
        let response = Response::from_string(format!("unknown component `{id}`\n"))
            .with_status_code(StatusCode(404));
        return Ok(request.respond(response)?);
    };

    // Host-side JSON shaping: scripts receive one pre-serialized payload.
    let data = serde_json::json!({
        "path": path,
        "query": query,
    })
    .to_string();
    let state = ComponentState::new(data, url.clone());

    let markup = scheduler.render(&component, &state).wait();
    let response = Response::from_string(page(id, &markup)).with_header(html_header());
    Ok(request.respond(response)?)
}

fn html_header() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("static header is valid")
}

/// Minimal page shell around the rendered markup.
fn page(title: &str, markup: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{markup}\n</body>\n</html>\n"
    )
}
