pub mod code_entry;
pub mod email;
pub mod flow_error;
pub mod otp_code;
pub mod session;
