use std::{path::Path, time::Duration};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::simulated::SimulatedDelays;

const DEFAULT_CONFIG_NAME: &str = "learner";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DelaySettings {
    pub login_ms: u64,
    pub register_ms: u64,
    pub logout_ms: u64,
    pub update_ms: u64,
    pub restore_ms: u64,
}

impl Default for DelaySettings {
    fn default() -> Self {
        let delays = SimulatedDelays::default();
        Self {
            login_ms: delays.login.as_millis() as u64,
            register_ms: delays.register.as_millis() as u64,
            logout_ms: delays.logout.as_millis() as u64,
            update_ms: delays.update.as_millis() as u64,
            restore_ms: delays.restore.as_millis() as u64,
        }
    }
}

impl From<&DelaySettings> for SimulatedDelays {
    fn from(value: &DelaySettings) -> Self {
        Self {
            login: Duration::from_millis(value.login_ms),
            register: Duration::from_millis(value.register_ms),
            logout: Duration::from_millis(value.logout_ms),
            update: Duration::from_millis(value.update_ms),
            restore: Duration::from_millis(value.restore_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// When set, the HTTP backend is used instead of the simulated one.
    pub server_url: Option<String>,
    pub request_timeout_secs: u64,
    pub delays: DelaySettings,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            request_timeout_secs: 10,
            delays: DelaySettings::default(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults, then `learner.toml` (or the explicit `path`, which must exist),
/// then `APP__*` environment variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to read client settings")?
        .try_deserialize::<ClientSettings>()
        .context("invalid client settings")
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
