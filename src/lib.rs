//! Client core for the HR dashboard: a typed client for the remote
//! collection store, plus the session and consistency logic the dashboard
//! pages call into.

pub mod accounts;
pub mod attendance;
pub mod clock;
pub mod config;
mod dates;
pub mod departments;
pub mod error;
pub mod leaves;
pub mod payroll;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod store;

pub use config::AppConfig;
pub use error::{HrError, HrResult, StoreError};
pub use session::Session;
pub use state::AppState;
