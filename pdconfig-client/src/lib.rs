//! pdconfig Client
//!
//! HTTP client for the configuration API of the directory server.
//!
//! ## Module Structure
//!
//! - `configuration` - Base URL, credentials and TLS trust settings
//! - `models` - Request and response bodies
//! - `apis` - Operations grouped by configuration object
//! - `error` - Errors returned by API calls

pub mod apis;
pub mod configuration;
pub mod error;
pub mod models;

pub use apis::ApiClient;
pub use apis::recurring_task::RecurringTaskApi;
pub use configuration::{Configuration, Credentials};
pub use error::ApiError;
pub use reqwest::StatusCode;
