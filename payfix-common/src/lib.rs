//! # PayFix Common Library
//!
//! Shared code for the PayFix exception desk:
//! - Transaction document model and field validation
//! - Document store on SQLite (exceptions, processed, audit trail, users)
//! - Correct-and-resubmit workflow
//! - Dashboard aggregation
//! - Password hashing and bearer tokens
//! - API request/response types shared by the service and the operator client
//! - Configuration loading

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod time;
pub mod validation;

#[cfg(feature = "sqlx")]
pub mod dashboard;
#[cfg(feature = "sqlx")]
pub mod db;
#[cfg(feature = "sqlx")]
pub mod fix;

pub use error::{Error, Result};
pub use model::{AuditEntry, ExceptionRecord, ProcessedRecord, Transaction};
