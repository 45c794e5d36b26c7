//! HTTP API handlers for payfix-api

pub mod auth;
pub mod dashboard;
pub mod exceptions;
pub mod fix;
pub mod health;

pub use auth::{auth_middleware, login, signup};
pub use dashboard::{dashboard, operator_stats};
pub use exceptions::{audit_log, list_exceptions, list_processed, seed_data};
pub use fix::fix_transaction;
pub use health::{health_routes, ping};
