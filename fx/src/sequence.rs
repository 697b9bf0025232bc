//! Last-response-wins ordering for overlapping requests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out monotonic sequence numbers and tracks the newest applied one.
///
/// A response may be applied only if no request issued after it has been
/// applied already.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number for a new request. Starts at 1.
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Mark `sequence` as applied. Returns false if a newer one already was.
    pub fn try_apply(&self, sequence: u64) -> bool {
        self.applied.fetch_max(sequence, Ordering::SeqCst) < sequence
    }

    /// Newest applied sequence number, 0 if none.
    pub fn last_applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }

    /// Newest issued sequence number, 0 if none.
    pub fn last_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_responses_apply() {
        let seq = RequestSequencer::new();
        let a = seq.next();
        let b = seq.next();

        assert!(seq.try_apply(a));
        assert!(seq.try_apply(b));
        assert_eq!(seq.last_applied(), b);
    }

    #[test]
    fn test_stale_response_is_rejected() {
        let seq = RequestSequencer::new();
        let older = seq.next();
        let newer = seq.next();

        assert!(seq.try_apply(newer));
        assert!(!seq.try_apply(older));
        assert!(!seq.try_apply(newer));
        assert_eq!(seq.last_applied(), newer);
        assert_eq!(seq.last_issued(), 2);
    }
}
