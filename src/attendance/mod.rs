mod repo_types;
mod services;

pub use repo_types::{AttendanceRecord, AttendanceStatus, ClockMark};
pub use services::{auto_mark_attendance, format_hours, today_status, working_hours};
