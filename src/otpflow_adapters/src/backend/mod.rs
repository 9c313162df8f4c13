pub mod http_otp_client;
pub mod in_memory_otp_backend;

pub use http_otp_client::HttpOtpClient;
pub use in_memory_otp_backend::InMemoryOtpBackend;
