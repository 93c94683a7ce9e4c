//! pdconfig Core
//!
//! Core library for declaring directory server configuration objects as
//! resources: attribute values, schemas, diagnostics, lifecycle envelopes and
//! the PATCH operations computed from a plan/state diff.

pub mod attr;
pub mod diagnostics;
pub mod operations;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod value;
