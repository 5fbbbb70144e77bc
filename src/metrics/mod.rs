//! Render timing observability.
//!
//! Every render job emits exactly one timing event: component id, outcome,
//! and elapsed time from submission to completion (or to the deadline, for
//! timeouts). Hosts plug in their own [`TimingSink`] to forward events to a
//! metrics backend; the default [`LogSink`] writes debug log lines.

use std::time::Duration;

use parking_lot::Mutex;

/// How a render call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rendered,
    Failed,
    TimedOut,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rendered => "rendered",
            Self::Failed => "failed",
            Self::TimedOut => "timed-out",
        }
    }
}

/// Sink for per-render timing events.
pub trait TimingSink: Send + Sync {
    fn record(&self, component: &str, outcome: Outcome, elapsed: Duration);
}

/// Default sink: one debug log line per event.
pub struct LogSink;

impl TimingSink for LogSink {
    fn record(&self, component: &str, outcome: Outcome, elapsed: Duration) {
        crate::debug!("timing"; "{} {}: {} ms", component, outcome.label(), elapsed.as_millis());
    }
}

/// Collecting sink, for hosts that batch-export events and for tests.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<TimingEvent>>,
}

/// One recorded timing event.
#[derive(Debug, Clone)]
pub struct TimingEvent {
    pub component: String,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far.
    pub fn events(&self) -> Vec<TimingEvent> {
        self.events.lock().clone()
    }

    /// Events for one component with the given outcome.
    pub fn count(&self, component: &str, outcome: Outcome) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.component == component && e.outcome == outcome)
            .count()
    }
}

impl TimingSink for MemorySink {
    fn record(&self, component: &str, outcome: Outcome, elapsed: Duration) {
        self.events.lock().push(TimingEvent {
            component: component.to_owned(),
            outcome,
            elapsed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Rendered.label(), "rendered");
        assert_eq!(Outcome::Failed.label(), "failed");
        assert_eq!(Outcome::TimedOut.label(), "timed-out");
    }

    #[test]
    fn test_memory_sink_counts_by_component_and_outcome() {
        let sink = MemorySink::new();
        sink.record("app", Outcome::Rendered, Duration::from_millis(3));
        sink.record("app", Outcome::TimedOut, Duration::from_millis(50));
        sink.record("nav", Outcome::Rendered, Duration::from_millis(1));

        assert_eq!(sink.count("app", Outcome::Rendered), 1);
        assert_eq!(sink.count("app", Outcome::TimedOut), 1);
        assert_eq!(sink.count("nav", Outcome::Failed), 0);
        assert_eq!(sink.events().len(), 3);
    }
}
