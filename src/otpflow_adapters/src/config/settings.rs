use std::time::Duration;

use chrono::TimeDelta;
use config::{
    Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, builder::DefaultState,
};
use otpflow_application::FlowOptions;
use serde::Deserialize;

use crate::config::constants::{CONFIG_FILE, defaults, env::ENV_PREFIX};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub flow: FlowSettings,
    pub backend: BackendSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowSettings {
    pub resend_cooldown_secs: u32,
    pub tick_interval_millis: u64,
    /// Lifetime of codes issued by the in-memory backend.
    pub code_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    /// Origin of the OTP service. Without one the in-memory backend is used.
    #[serde(default)]
    pub base_url: Option<String>,
    pub timeout_in_millis: u64,
}

impl Settings {
    /// Defaults, then `config/otpflow.*` if present, then `OTPFLOW_*` environment variables
    /// (`OTPFLOW_FLOW__RESEND_COOLDOWN_SECS=10`). A `.env` file is honoured.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Defaults overlaid with a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let ttl = self.flow.code_ttl_secs;
        if ttl < 0 || TimeDelta::try_seconds(ttl).is_none() {
            return Err(ConfigError::Message(format!(
                "flow.code_ttl_secs out of range: {ttl}"
            )));
        }
        Ok(self)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default(
                "flow.resend_cooldown_secs",
                i64::from(defaults::RESEND_COOLDOWN_SECS),
            )?
            .set_default(
                "flow.tick_interval_millis",
                defaults::TICK_INTERVAL_MILLIS as i64,
            )?
            .set_default("flow.code_ttl_secs", defaults::CODE_TTL_SECS)?
            .set_default(
                "backend.timeout_in_millis",
                defaults::BACKEND_TIMEOUT_MILLIS as i64,
            )
    }

    pub fn flow_options(&self) -> FlowOptions {
        FlowOptions {
            resend_cooldown_secs: self.flow.resend_cooldown_secs,
            tick_interval: Duration::from_millis(self.flow.tick_interval_millis),
        }
    }

    pub fn code_ttl(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.flow.code_ttl_secs).unwrap_or(TimeDelta::MAX)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.timeout_in_millis)
    }
}
