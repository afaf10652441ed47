pub mod announcement;
pub mod log_message;
pub mod recent_log;
