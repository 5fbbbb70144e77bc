//! Bounded worker pool with deadline-bounded result retrieval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;

use super::{Component, ComponentState, WorkerContext};
use crate::engine::ExecutionEnvironment;
use crate::metrics::{Outcome, TimingSink};
use crate::reload::EnvironmentSource;
use crate::{debug, log};

/// One submitted render: component + state pinned to the environment that
/// was current at submission time.
struct Job {
    component: Component,
    state: ComponentState,
    env: Arc<ExecutionEnvironment>,
    reply: Sender<String>,
    submitted: Instant,
}

/// Accepts render requests and runs them on a fixed pool of workers.
///
/// Submission never blocks: when the bounded queue is full (or the pool is
/// shutting down) the call resolves to an empty result immediately; callers
/// block only on result retrieval, and only up to the configured deadline.
pub struct RenderScheduler {
    /// `None` once the pool is shutting down.
    jobs: Mutex<Option<Sender<Job>>>,
    source: Arc<dyn EnvironmentSource>,
    sink: Arc<dyn TimingSink>,
    timeout: Duration,
    shutdown: Arc<AtomicBool>,
}

impl RenderScheduler {
    pub fn new(
        source: Arc<dyn EnvironmentSource>,
        sink: Arc<dyn TimingSink>,
        workers: usize,
        queue: usize,
        timeout: Duration,
    ) -> Self {
        let (jobs_tx, jobs_rx) = channel::bounded::<Job>(queue);
        let shutdown = Arc::new(AtomicBool::new(false));

        for worker in 0..workers {
            let jobs = jobs_rx.clone();
            let sink = Arc::clone(&sink);
            let stop = Arc::clone(&shutdown);
            std::thread::spawn(move || run_worker(worker, &jobs, &sink, &stop));
        }

        Self {
            jobs: Mutex::new(Some(jobs_tx)),
            source,
            sink,
            timeout,
            shutdown,
        }
    }

    /// Submit a render. The returned [`Pending`] resolves to the rendered
    /// markup, or to an empty string on saturation, script failure, or a
    /// blown deadline.
    pub fn render(&self, component: &Component, state: &ComponentState) -> Pending {
        let env = match self.source.environment() {
            Ok(env) => env,
            Err(err) => {
                log!("warning"; "render skipped for `{}`: {err:#}", component.id());
                return Pending::empty();
            }
        };

        let Some(jobs) = self.jobs.lock().clone() else {
            log!("warning"; "pool shutting down, dropping `{}`", component.id());
            return Pending::empty();
        };

        let submitted = Instant::now();
        let (reply_tx, reply_rx) = channel::bounded(1);
        let job = Job {
            component: component.clone(),
            state: state.clone(),
            env,
            reply: reply_tx,
            submitted,
        };

        match jobs.try_send(job) {
            Ok(()) => Pending::waiting(
                reply_rx,
                self.timeout,
                component.id().to_owned(),
                submitted,
                Arc::clone(&self.sink),
            ),
            Err(TrySendError::Full(_)) => {
                log!("warning"; "render queue saturated, dropping `{}`", component.id());
                Pending::empty()
            }
            Err(TrySendError::Disconnected(_)) => {
                log!("warning"; "pool shutting down, dropping `{}`", component.id());
                Pending::empty()
            }
        }
    }

    /// Immediate, non-graceful stop. Queued jobs are abandoned (their
    /// callers resolve to empty), a job already evaluating finishes on its
    /// detached worker with its result discarded, and every later
    /// submission is rejected.
    pub fn shutdown_now(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Dropping the only sender wakes every blocked worker.
        self.jobs.lock().take();
    }
}

fn run_worker(
    worker: usize,
    jobs: &Receiver<Job>,
    sink: &Arc<dyn TimingSink>,
    shutdown: &AtomicBool,
) {
    let mut ctx = WorkerContext::new(worker);
    while let Ok(job) = jobs.recv() {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let scope = ctx.scope_for(&job.env);
        match job.env.render(scope, &job.component, &job.state) {
            Ok(html) => {
                sink.record(job.component.id(), Outcome::Rendered, job.submitted.elapsed());
                // The caller may have timed out and gone away; the result
                // is simply discarded then.
                let _ = job.reply.send(html);
            }
            Err(err) => {
                log!("error"; "could not render `{}`: {err}", job.component.id());
                sink.record(job.component.id(), Outcome::Failed, job.submitted.elapsed());
                let _ = job.reply.send(String::new());
            }
        }
    }
    debug!("render"; "worker {worker} exiting");
}

/// A lazily-resolvable render result.
pub struct Pending(Inner);

enum Inner {
    Ready(String),
    Waiting {
        rx: Receiver<String>,
        deadline: Duration,
        component: String,
        submitted: Instant,
        sink: Arc<dyn TimingSink>,
    },
}

impl Pending {
    /// An already-resolved result.
    pub fn ready(value: impl Into<String>) -> Self {
        Self(Inner::Ready(value.into()))
    }

    /// An already-resolved empty result.
    pub fn empty() -> Self {
        Self::ready("")
    }

    fn waiting(
        rx: Receiver<String>,
        deadline: Duration,
        component: String,
        submitted: Instant,
        sink: Arc<dyn TimingSink>,
    ) -> Self {
        Self(Inner::Waiting {
            rx,
            deadline,
            component,
            submitted,
            sink,
        })
    }

    /// Force the result, blocking up to the deadline.
    ///
    /// A blown deadline yields an empty string and one `timed-out` event;
    /// the underlying job is not cancelled: it runs to completion and its
    /// reply is discarded.
    pub fn wait(self) -> String {
        match self.0 {
            Inner::Ready(value) => value,
            Inner::Waiting {
                rx,
                deadline,
                component,
                submitted,
                sink,
            } => match rx.recv_timeout(deadline) {
                Ok(html) => html,
                Err(RecvTimeoutError::Timeout) => {
                    log!("warning"; "`{}` timed out after {} ms", component, deadline.as_millis());
                    sink.record(&component, Outcome::TimedOut, submitted.elapsed());
                    String::new()
                }
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("render"; "`{component}` abandoned during shutdown");
                    String::new()
                }
            },
        }
    }
}
