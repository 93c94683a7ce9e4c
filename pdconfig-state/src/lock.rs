//! Lock held on a state file while a command modifies it

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Locks older than this are considered abandoned
pub const DEFAULT_LOCK_TIMEOUT_SECS: i64 = 900;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub id: String,
    /// Command holding the lock (e.g., "apply", "destroy")
    pub operation: String,
    /// `user@host`
    pub who: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(operation: impl Into<String>) -> Self {
        Self::with_timeout(operation, DEFAULT_LOCK_TIMEOUT_SECS)
    }

    pub fn with_timeout(operation: impl Into<String>, timeout_secs: i64) -> Self {
        let created = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            operation: operation.into(),
            who: lock_owner(),
            created,
            expires: created + Duration::seconds(timeout_secs),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires
    }
}

fn lock_owner() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());
    format!("{}@{}", user, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lock_is_live() {
        let lock = LockInfo::new("apply");
        assert_eq!(lock.operation, "apply");
        assert!(lock.who.contains('@'));
        assert!(!lock.is_expired());
    }

    #[test]
    fn negative_timeout_is_expired() {
        assert!(LockInfo::with_timeout("refresh", -1).is_expired());
    }
}
