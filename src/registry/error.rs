//! Registry error types

/// Error type for registry operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Backing store could not be reached or rejected the operation
    #[error("subscription store unavailable: {0}")]
    Unavailable(String),

    /// Stored item could not be decoded into a subscription
    #[error("corrupt subscription record for {connection_id}: {reason}")]
    CorruptRecord {
        connection_id: String,
        reason: String,
    },
}
