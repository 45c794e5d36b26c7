//! API module for the HTTP wire format
//!
//! Request and response bodies shared by the service (payfix-api) and the
//! operator client (payfix-desk). No HTTP framework dependencies.

pub mod types;

pub use types::*;
