mod dto;
mod repo_types;
mod services;

pub use dto::LeaveApplication;
pub use repo_types::{LeaveDecision, LeaveRequest, LeaveStatus};
pub use services::{set_leave_status, submit_leave};
