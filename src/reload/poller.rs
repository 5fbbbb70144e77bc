//! Background reload loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{self, Sender};

use super::EnvironmentSlot;
use crate::engine::EnvironmentBuilder;
use crate::freshness::{self, ChangeStamp};
use crate::{debug, log};

/// Where the loop currently is. Purely observational: the loop's behavior
/// is driven by the ticker and the scan, not by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    Idle = 0,
    Checking = 1,
    Building = 2,
    Published = 3,
    Failed = 4,
}

impl LoopState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Checking,
            2 => Self::Building,
            3 => Self::Published,
            4 => Self::Failed,
            _ => Self::Idle,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Building => "building",
            Self::Published => "published",
            Self::Failed => "failed",
        }
    }
}

/// Polls the source files on a fixed interval from a dedicated thread and
/// publishes rebuilt environments into an [`EnvironmentSlot`].
///
/// The first check runs immediately (that is the initial build); when
/// reloading is disabled the loop stops right after it. A failed build
/// keeps the previously published environment and still advances the change
/// stamp, so broken sources are not rebuilt in a hot loop. The next attempt
/// waits for the next on-disk change.
pub struct ReloadLoop;

impl ReloadLoop {
    /// Spawn the loop. The returned handle owns the published slot and the
    /// shutdown channel.
    pub fn spawn(builder: EnvironmentBuilder, interval: Duration, enabled: bool) -> ReloadLoopHandle {
        let slot = Arc::new(EnvironmentSlot::new());
        let state = Arc::new(AtomicU8::new(LoopState::Idle as u8));
        let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();

        let loop_slot = Arc::clone(&slot);
        let loop_state = Arc::clone(&state);
        let thread = std::thread::spawn(move || {
            let mut stamp = ChangeStamp::ZERO;

            // Initial build, before the first tick fires.
            check_and_build(&builder, &loop_slot, &loop_state, &mut stamp);

            if !enabled {
                debug!("reload"; "reloading disabled, initial build only");
                set_state(&loop_state, LoopState::Idle);
                return;
            }

            let ticker = channel::tick(interval);
            loop {
                crossbeam::select! {
                    recv(ticker) -> _ => {
                        check_and_build(&builder, &loop_slot, &loop_state, &mut stamp);
                    }
                    recv(shutdown_rx) -> _ => {
                        debug!("reload"; "shutting down");
                        return;
                    }
                }
            }
        });

        ReloadLoopHandle {
            slot,
            state,
            shutdown_tx,
            thread,
        }
    }
}

/// Running reload loop: slot accessor, state probe, and shutdown.
pub struct ReloadLoopHandle {
    slot: Arc<EnvironmentSlot>,
    state: Arc<AtomicU8>,
    shutdown_tx: Sender<()>,
    thread: JoinHandle<()>,
}

impl ReloadLoopHandle {
    /// The slot this loop publishes into; share it with schedulers.
    pub fn slot(&self) -> Arc<EnvironmentSlot> {
        Arc::clone(&self.slot)
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Stop the loop and wait for it to exit. An in-flight build is allowed
    /// to finish; it only touches the slot.
    pub fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.thread.join();
    }
}

fn set_state(state: &AtomicU8, value: LoopState) {
    let prev = state.swap(value as u8, Ordering::Relaxed);
    if prev != value as u8 {
        debug!("reload"; "state: {}", value.label());
    }
}

fn check_and_build(
    builder: &EnvironmentBuilder,
    slot: &EnvironmentSlot,
    state: &AtomicU8,
    stamp: &mut ChangeStamp,
) {
    set_state(state, LoopState::Checking);
    let scan = freshness::scan(builder.files(), *stamp);
    if !scan.changed {
        set_state(state, LoopState::Idle);
        return;
    }

    // Persist before building: a broken build waits for the next change.
    *stamp = scan.stamp;

    set_state(state, LoopState::Building);
    match builder.build() {
        Ok(env) => {
            let generation = env.generation();
            slot.store(Arc::new(env));
            set_state(state, LoopState::Published);
            log!("reload"; "published environment #{generation}");
        }
        Err(err) => {
            set_state(state, LoopState::Failed);
            log!("error"; "environment build failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::SourceFileSet;
    use crate::render::{Component, ComponentState};
    use std::fs::{self, OpenOptions};
    use std::path::PathBuf;
    use std::time::{Instant, SystemTime};
    use tempfile::TempDir;

    const TICK: Duration = Duration::from_millis(10);

    fn touch(path: &PathBuf, secs_past_now: u64) {
        let file = OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(secs_past_now))
            .unwrap();
    }

    fn wait_for<T>(mut probe: impl FnMut() -> Option<T>) -> T {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(v) = probe() {
                return v;
            }
            assert!(Instant::now() < deadline, "condition not reached in time");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn render_current(slot: &EnvironmentSlot) -> String {
        let env = slot.load().unwrap();
        let mut scope = env.new_context();
        env.render(
            &mut scope,
            &Component::new("v", "version"),
            &ComponentState::new("{}", "/"),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_build_is_published() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.rhai");
        fs::write(&path, r#"let version = "one";"#).unwrap();

        let builder = EnvironmentBuilder::new(SourceFileSet::new(vec![path]));
        let handle = ReloadLoop::spawn(builder, TICK, true);

        wait_for(|| handle.slot().load());
        assert_eq!(render_current(&handle.slot()), "one");
        handle.stop();
    }

    #[test]
    fn test_change_publishes_new_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.rhai");
        fs::write(&path, r#"let version = "one";"#).unwrap();

        let builder = EnvironmentBuilder::new(SourceFileSet::new(vec![path.clone()]));
        let handle = ReloadLoop::spawn(builder, TICK, true);
        let first = wait_for(|| handle.slot().load());

        fs::write(&path, r#"let version = "two";"#).unwrap();
        touch(&path, 60);

        wait_for(|| {
            handle
                .slot()
                .load()
                .filter(|env| env.generation() > first.generation())
        });
        assert_eq!(render_current(&handle.slot()), "two");
        handle.stop();
    }

    #[test]
    fn test_failed_reload_keeps_previous_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.rhai");
        fs::write(&path, r#"let version = "one";"#).unwrap();

        let builder = EnvironmentBuilder::new(SourceFileSet::new(vec![path.clone()]));
        let handle = ReloadLoop::spawn(builder, TICK, true);
        let first = wait_for(|| handle.slot().load());
        let before = render_current(&handle.slot());

        fs::write(&path, "fn ( broken").unwrap();
        touch(&path, 60);

        // Give the loop plenty of ticks to notice the change and fail the
        // rebuild, then settle.
        std::thread::sleep(TICK * 20);

        // Previous environment still serves identical output.
        let current = handle.slot().load().unwrap();
        assert_eq!(current.generation(), first.generation());
        assert_eq!(render_current(&handle.slot()), before);

        // A broken build is not retried until the next change: the loop
        // settles back to idle scanning instead of hot-looping on the
        // broken sources.
        wait_for(|| (handle.state() == LoopState::Idle).then_some(()));
        assert_eq!(handle.slot().load().unwrap().generation(), first.generation());
        handle.stop();
    }

    #[test]
    fn test_disabled_loop_builds_once_and_exits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.rhai");
        fs::write(&path, r#"let version = "one";"#).unwrap();

        let builder = EnvironmentBuilder::new(SourceFileSet::new(vec![path.clone()]));
        let handle = ReloadLoop::spawn(builder, TICK, false);
        let first = wait_for(|| handle.slot().load());

        // Changes are ignored once the one-shot build is done.
        fs::write(&path, r#"let version = "two";"#).unwrap();
        touch(&path, 60);
        std::thread::sleep(TICK * 5);
        assert_eq!(handle.slot().load().unwrap().generation(), first.generation());
        handle.stop();
    }

    #[test]
    fn test_empty_file_set_never_publishes() {
        let builder = EnvironmentBuilder::new(SourceFileSet::new(vec![]));
        let handle = ReloadLoop::spawn(builder, TICK, true);
        std::thread::sleep(TICK * 5);
        assert!(handle.slot().load().is_none());
        handle.stop();
    }
}
