//! Call recording for mocks.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A record of a single call made on a mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// Display name of the called mock, e.g. `mock.removesuffix`.
    pub path: String,
    /// `Debug` rendering of the call arguments.
    pub args: String,
    /// When the call was made (relative to mock creation).
    pub timestamp: Duration,
}

impl CallRecord {
    /// Whether this call was made with arguments equal to `args`.
    ///
    /// Arguments are compared by their `Debug` rendering.
    pub fn matches<A: Debug + ?Sized>(&self, args: &A) -> bool {
        self.args == render(args)
    }
}

pub(crate) fn render<A: Debug + ?Sized>(args: &A) -> String {
    format!("{args:?}")
}

/// Per-mock call history.
pub(crate) struct CallLog {
    calls: Mutex<Vec<CallRecord>>,
    created_at: Instant,
}

impl CallLog {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            created_at: Instant::now(),
        }
    }

    pub(crate) fn track(&self, path: &str, args: String) {
        self.calls.lock().push(CallRecord {
            path: path.to_owned(),
            args,
            timestamp: self.created_at.elapsed(),
        });
    }

    pub(crate) fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub(crate) fn last_call(&self) -> Option<CallRecord> {
        self.calls.lock().last().cloned()
    }

    pub(crate) fn any_matches(&self, rendered: &str) -> bool {
        self.calls.lock().iter().any(|c| c.args == rendered)
    }

    pub(crate) fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl Debug for CallLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let calls = self.calls.lock();
        f.debug_struct("CallLog")
            .field("call_count", &calls.len())
            .field("calls", &*calls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_log_tracks() {
        let log = CallLog::new();
        assert_eq!(log.call_count(), 0);

        log.track("mock", render(&(1, "a")));
        log.track("mock", render(&(2, "b")));

        assert_eq!(log.call_count(), 2);
        let calls = log.calls();
        assert_eq!(calls[0].args, "(1, \"a\")");
        assert!(calls[1].matches(&(2, "b")));
        assert!(log.any_matches(&render(&(1, "a"))));
        assert!(!log.any_matches(&render(&(3, "c"))));
    }

    #[test]
    fn test_call_log_last_and_reset() {
        let log = CallLog::new();
        assert!(log.last_call().is_none());

        log.track("mock.f", render(&()));
        assert_eq!(log.last_call().unwrap().path, "mock.f");

        log.reset();
        assert_eq!(log.call_count(), 0);
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_call_log_debug() {
        let log = CallLog::new();
        log.track("mock", render(&42));

        let debug = format!("{log:?}");
        assert!(debug.contains("CallLog"));
        assert!(debug.contains("call_count"));
    }

    #[test]
    fn test_call_count_agrees_with_calls_across_threads() {
        let log = std::sync::Arc::new(CallLog::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        log.track("mock", render(&(i, j)));
                        if j == 25 && i == 0 {
                            log.reset();
                        }
                        assert!(log.call_count() <= 200);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.call_count(), log.calls().len());
        log.reset();
        assert_eq!(log.call_count(), log.calls().len());
        assert_eq!(log.call_count(), 0);
    }
}
