//! Delivery and routing statistics

pub mod metrics;

pub use metrics::{BatchStats, BroadcastStats};
