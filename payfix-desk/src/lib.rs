//! payfix-desk library - operator client for the payments exception desk
//!
//! Talks to payfix-api over HTTP: lists the exception queue, edits and
//! resubmits records, and renders dashboard statistics as text charts.

pub mod client;
pub mod editor;
pub mod error;
pub mod render;
pub mod session;

pub use client::{ApiClient, DEFAULT_API_BASE};
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionStore};
