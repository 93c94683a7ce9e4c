//! pdconfig State Management
//!
//! Records which configuration objects pdconfig manages and the attribute
//! values last applied to each of them.
//!
//! - **StateFile**: every managed resource plus lineage and serial
//! - **StateBackend**: storage for the state file (local JSON file)
//! - **LockInfo**: guards a state file against concurrent runs
//!
//! # Example
//!
//! ```ignore
//! use pdconfig_state::{LocalBackend, StateBackend, StateFile};
//!
//! let backend = LocalBackend::new();
//! let lock = backend.acquire_lock("apply").await?;
//! let mut state = backend.read_state().await?.unwrap_or_default();
//! // ... apply changes ...
//! state.increment_serial();
//! backend.write_state(&state).await?;
//! backend.release_lock(&lock).await?;
//! ```

pub mod backend;
pub mod backends;
pub mod lock;
pub mod state;

pub use backend::{BackendError, BackendResult, StateBackend};
pub use backends::LocalBackend;
pub use lock::LockInfo;
pub use state::{ResourceState, StateFile};
