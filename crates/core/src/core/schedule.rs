//! Single-slot deferred task.
//!
//! Holds at most one pending payload with a deadline. Arming again replaces the
//! previous payload (debounce); polling past the deadline fires it exactly once.
//! Time is supplied by the caller in milliseconds, so the slot works the same
//! under a browser frame loop and in host tests.

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask<T> {
    slot: Option<Pending<T>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Pending<T> {
    payload: T,
    deadline_ms: f64,
}

impl<T> Default for ScheduledTask<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> ScheduledTask<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the slot. Any previous payload is dropped.
    pub fn arm(&mut self, payload: T, deadline_ms: f64) {
        self.slot = Some(Pending {
            payload,
            deadline_ms,
        });
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.slot.take().map(|p| p.payload)
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.slot.as_ref().map(|p| &p.payload)
    }

    pub fn deadline_ms(&self) -> Option<f64> {
        self.slot.as_ref().map(|p| p.deadline_ms)
    }

    /// Take the payload if its deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        let due = self
            .slot
            .as_ref()
            .is_some_and(|p| now_ms >= p.deadline_ms);
        if due {
            self.cancel()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_deadline() {
        let mut task = ScheduledTask::new();
        task.arm(7.0, 100.0);
        assert_eq!(task.poll(99.9), None);
        assert!(task.is_armed());
        assert_eq!(task.poll(100.0), Some(7.0));
        assert_eq!(task.poll(500.0), None);
        assert!(!task.is_armed());
    }

    #[test]
    fn rearming_replaces_payload_and_deadline() {
        let mut task = ScheduledTask::new();
        task.arm("a", 100.0);
        task.arm("b", 250.0);
        assert_eq!(task.pending(), Some(&"b"));
        assert_eq!(task.deadline_ms(), Some(250.0));
        assert_eq!(task.poll(200.0), None);
        assert_eq!(task.poll(250.0), Some("b"));
    }

    #[test]
    fn cancel_returns_payload() {
        let mut task = ScheduledTask::new();
        assert_eq!(task.cancel(), None::<u8>);
        task.arm(3u8, 10.0);
        assert_eq!(task.cancel(), Some(3));
        assert_eq!(task.poll(1_000.0), None);
    }
}
