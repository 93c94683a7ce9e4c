//! State backend trait and error types

use async_trait::async_trait;
use thiserror::Error;

use crate::lock::LockInfo;
use crate::state::StateFile;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("State is locked by {who} (lock ID: {lock_id}, operation: {operation})")]
    Locked {
        lock_id: String,
        who: String,
        operation: String,
    },

    #[error("Lock not found: {0}")]
    LockNotFound(String),

    #[error("Lock ID mismatch: expected {expected}, got {actual}")]
    LockMismatch { expected: String, actual: String },

    #[error("Invalid state file: {0}")]
    InvalidState(String),

    /// The file on disk belongs to a different state lineage
    #[error("State lineage mismatch: expected {expected}, got {actual}")]
    LineageMismatch { expected: String, actual: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    pub fn locked(lock: &LockInfo) -> Self {
        Self::Locked {
            lock_id: lock.id.clone(),
            who: lock.who.clone(),
            operation: lock.operation.clone(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Storage for the state file
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Current state, `None` before the first write
    async fn read_state(&self) -> BackendResult<Option<StateFile>>;

    /// Persist `state`; the caller increments the serial first
    async fn write_state(&self, state: &StateFile) -> BackendResult<()>;

    /// Fails while another live lock is held
    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo>;

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_error_names_holder() {
        let lock = LockInfo::new("apply");
        let message = BackendError::locked(&lock).to_string();
        assert!(message.contains(&lock.who));
        assert!(message.contains("apply"));
    }
}
