use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::calculator::{calculate, CalculationInput, CalculationResult};

/// Anything able to turn inputs into a full set of figures.
pub trait Compute {
    fn compute(&self, input: &CalculationInput) -> CalculationResult;
}

/// Runs the calculation inline. The calculation is pure and fast, so this is
/// what the application state uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncCompute;

impl Compute for SyncCompute {
    fn compute(&self, input: &CalculationInput) -> CalculationResult {
        calculate(input)
    }
}

/// Handle for one recompute request issued by [`LatestWins::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Last-write-wins sequencing for computations that finish out of band.
///
/// Only the result belonging to the most recently issued ticket is ever
/// accepted; anything older is dropped, whatever order results arrive in.
#[derive(Debug, Default)]
pub struct LatestWins {
    issued: AtomicU64,
}

impl LatestWins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request. Supersedes every ticket issued before it.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Sequence number of the newest ticket, zero before the first request.
    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::Acquire)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.0 == self.latest()
    }

    /// Hand back `value` only if `ticket` has not been superseded.
    pub fn complete<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(&ticket) {
            Some(value)
        } else {
            debug!(
                ticket = ticket.0,
                latest = self.latest(),
                "discarding stale recompute result"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sync_compute_matches_calculate() {
        let input = CalculationInput {
            sales_amount: dec!(1000),
            commission_rate: dec!(0.1),
            ..Default::default()
        };
        assert_eq!(SyncCompute.compute(&input), calculate(&input));
    }

    #[test]
    fn test_tickets_increase() {
        let seq = LatestWins::new();
        assert_eq!(seq.latest(), 0);
        let a = seq.begin();
        let b = seq.begin();
        assert!(b > a);
        assert_eq!(b.sequence(), 2);
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let seq = LatestWins::new();
        let first = seq.begin();
        let second = seq.begin();

        // The newer request finishes first, then the older one straggles in.
        assert_eq!(seq.complete(second, "second"), Some("second"));
        assert_eq!(seq.complete(first, "first"), None);
    }

    #[test]
    fn test_result_superseded_while_in_flight() {
        let seq = LatestWins::new();
        let ticket = seq.begin();
        assert!(seq.is_current(&ticket));
        let _newer = seq.begin();
        assert!(!seq.is_current(&ticket));
        assert_eq!(seq.complete(ticket, 1), None);
    }

    #[test]
    fn test_only_latest_of_concurrent_requests_survives() {
        let seq = Arc::new(LatestWins::new());
        let tickets: Vec<Ticket> = (0..8).map(|_| seq.begin()).collect();

        let handles: Vec<_> = tickets
            .into_iter()
            .map(|t| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || seq.complete(t, t.sequence()))
            })
            .collect();

        let accepted: Vec<u64> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(accepted, vec![8]);
    }
}
