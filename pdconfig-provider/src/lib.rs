//! pdconfig directory server provider
//!
//! Binds directory server configuration objects to the pdconfig resource
//! lifecycle.
//!
//! ## Module Structure
//!
//! - `provider` - Provider configuration and the PingDirectoryProvider
//! - `resources` - Resource type implementations
//! - `utils` - Shared helpers (formatted value checks, error reporting)

pub mod provider;
pub mod resources;
pub mod utils;

// Re-export main types
pub use provider::{PingDirectoryProvider, ProviderConfig};
pub use resources::generate_server_profile_recurring_task::GenerateServerProfileRecurringTaskResource;
