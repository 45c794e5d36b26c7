//! Document store on SQLite
//!
//! Collections of the exception desk map to tables: `exceptions` (the queue),
//! `processed`, `audit_logs`, `users`, and `settings`.

pub mod audit;
pub mod exceptions;
pub mod init;
pub mod processed;
mod rows;
pub mod seed;
pub mod settings;
pub mod users;

pub use audit::*;
pub use exceptions::*;
pub use init::*;
pub use processed::*;
pub use seed::*;
pub use settings::*;
pub use users::*;
