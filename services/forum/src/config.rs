//! Server configuration

use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

use crate::throttle::ThrottleConfig;

/// HTTP server and login throttling settings
///
/// Read from `FORUM_`-prefixed environment variables, e.g. `FORUM_PORT`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on the time a single request may take
    pub request_timeout_secs: u64,
    pub login_max_attempts: u32,
    pub login_window_secs: u64,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("request_timeout_secs", 60)?
            .set_default("login_max_attempts", 5)?
            .set_default("login_window_secs", 300)?
            .add_source(Environment::with_prefix("FORUM").try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn login_throttle(&self) -> ThrottleConfig {
        ThrottleConfig {
            max_failures: self.login_max_attempts,
            window: Duration::from_secs(self.login_window_secs),
        }
    }
}
