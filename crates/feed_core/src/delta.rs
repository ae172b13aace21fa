use std::time::Duration;

/// How long a positive delta stays visible before it is cleared.
pub const DELTA_DISPLAY_DURATION: Duration = Duration::from_secs(3);

pub type DeltaToken = u64;

/// Number of newly visible events between two successive snapshots.
///
/// `previous` is `None` until the first successful sync, which never
/// reports a delta. A shrinking or unchanged snapshot reports zero.
pub fn compute_delta(previous: Option<usize>, new: usize) -> usize {
    match previous {
        None => 0,
        Some(previous) => new.saturating_sub(previous),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaSignal {
    pub count: usize,
    /// Identifies this signal so a clear instruction cannot erase a newer one.
    pub token: DeltaToken,
}

/// Owns the transient "new events" signal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeltaTracker {
    signal: Option<DeltaSignal>,
    next_token: DeltaToken,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the delta for a new snapshot and replaces the current signal.
    ///
    /// Returns the new signal when it is positive; a zero delta clears any
    /// signal still showing.
    pub fn record(&mut self, previous: Option<usize>, new: usize) -> Option<DeltaSignal> {
        let count = compute_delta(previous, new);
        if count == 0 {
            self.signal = None;
            return None;
        }
        self.next_token += 1;
        let signal = DeltaSignal {
            count,
            token: self.next_token,
        };
        self.signal = Some(signal);
        Some(signal)
    }

    /// Clears the signal if `token` still identifies it. Returns whether it did.
    pub fn expire(&mut self, token: DeltaToken) -> bool {
        match self.signal {
            Some(signal) if signal.token == token => {
                self.signal = None;
                true
            }
            _ => false,
        }
    }

    pub fn signal(&self) -> Option<DeltaSignal> {
        self.signal
    }

    pub fn count(&self) -> usize {
        self.signal.map_or(0, |signal| signal.count)
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_delta, DeltaTracker};

    #[test]
    fn delta_policy() {
        assert_eq!(compute_delta(Some(5), 8), 3);
        assert_eq!(compute_delta(Some(5), 3), 0);
        assert_eq!(compute_delta(Some(5), 5), 0);
        assert_eq!(compute_delta(None, 20), 0);
        assert_eq!(compute_delta(Some(0), 4), 4);
    }

    #[test]
    fn next_computation_replaces_signal() {
        let mut tracker = DeltaTracker::new();
        let first = tracker.record(Some(2), 4).unwrap();
        assert_eq!(tracker.count(), 2);

        assert!(tracker.record(Some(4), 4).is_none());
        assert_eq!(tracker.count(), 0);
        assert!(!tracker.expire(first.token));
    }

    #[test]
    fn stale_token_does_not_clear_newer_signal() {
        let mut tracker = DeltaTracker::new();
        let first = tracker.record(Some(1), 2).unwrap();
        let second = tracker.record(Some(2), 5).unwrap();
        assert_ne!(first.token, second.token);

        assert!(!tracker.expire(first.token));
        assert_eq!(tracker.count(), 3);
        assert!(tracker.expire(second.token));
        assert_eq!(tracker.count(), 0);
    }
}
