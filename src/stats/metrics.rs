//! Counters for the stream path
//!
//! Nothing on the stream path is reported to the caller except through logs;
//! these counters make the outcome of a broadcast or a batch inspectable.

use std::ops::AddAssign;

/// Outcome of broadcasting one payload to a dataset's subscribers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Subscriptions found for the dataset
    pub recipients: u64,
    /// Deliveries the transport accepted
    pub delivered: u64,
    /// Deliveries to connections that no longer exist
    pub gone: u64,
    /// Deliveries that failed for any other reason
    pub failed: u64,
    /// Gone subscriptions removed from the registry
    pub pruned: u64,
}

impl BroadcastStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries that did not reach their connection
    pub fn undelivered(&self) -> u64 {
        self.gone + self.failed
    }
}

impl AddAssign for BroadcastStats {
    fn add_assign(&mut self, other: Self) {
        self.recipients += other.recipients;
        self.delivered += other.delivered;
        self.gone += other.gone;
        self.failed += other.failed;
        self.pruned += other.pruned;
    }
}

/// Outcome of routing one batch of stream records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Records in the batch
    pub records: u64,
    /// Records handed to the broadcaster
    pub routed: u64,
    /// Records skipped because the source id or payload was unparsable
    pub malformed: u64,
    /// Records whose subscriber lookup failed
    pub failed: u64,
    /// Delivery counters summed over every routed record
    pub deliveries: BroadcastStats,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every record was routed
    pub fn is_clean(&self) -> bool {
        self.malformed == 0 && self.failed == 0
    }
}
