pub mod log_strip;
