//! Client configuration.
//!
//! Defaults match a backend running locally with the API under `/api`.
//! `from_env` overrides individual fields from `TRACKERPRO_*` variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_LOGIN_PATH: &str = "/loginPage.html";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got `{value}`")]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root, e.g. `https://tracker.example.com/api`.
    pub base_url: String,
    /// Page the user is sent to when the session ends. Relative paths are
    /// resolved against the origin of `base_url`.
    pub login_path: String,
    /// Applied by the transport to each request as a whole.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Reads `TRACKERPRO_API_URL`, `TRACKERPRO_LOGIN_PATH` and
    /// `TRACKERPRO_TIMEOUT_SECS`, keeping defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup("TRACKERPRO_API_URL") {
            config.base_url = url;
        }
        if let Some(path) = lookup("TRACKERPRO_LOGIN_PATH") {
            config.login_path = path;
        }
        if let Some(raw) = lookup("TRACKERPRO_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                var: "TRACKERPRO_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Absolute login URL: `login_path` as-is when it is already absolute,
    /// otherwise joined to the origin of `base_url`.
    pub fn login_url(&self) -> String {
        if self.login_path.contains("://") {
            return self.login_path.clone();
        }
        match url::Url::parse(&self.base_url).and_then(|base| base.join(&self.login_path)) {
            Ok(url) => url.to_string(),
            Err(_) => self.login_path.clone(),
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
