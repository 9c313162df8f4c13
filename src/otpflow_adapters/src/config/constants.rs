pub mod env {
    pub const ENV_PREFIX: &str = "OTPFLOW";
    pub const BACKEND_BASE_URL_ENV_VAR: &str = "OTPFLOW_BACKEND__BASE_URL";
}

/// Optional settings file, extension resolved by the `config` crate.
pub const CONFIG_FILE: &str = "config/otpflow";

pub mod defaults {
    pub const RESEND_COOLDOWN_SECS: u32 = otpflow_application::DEFAULT_RESEND_COOLDOWN_SECS;
    pub const TICK_INTERVAL_MILLIS: u64 = 1_000;
    pub const CODE_TTL_SECS: i64 = 10 * 60;
    pub const BACKEND_TIMEOUT_MILLIS: u64 = 10_000;
}

pub mod routes {
    pub const SEND_CODE: &str = "/otp/send";
    pub const VERIFY_CODE: &str = "/otp/verify";
}

pub mod test {
    pub mod backend {
        use std::time::Duration;

        pub const TIMEOUT: Duration = std::time::Duration::from_millis(200);
    }
}
