//! Layered runtime settings.
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file,
//! `TUNNELWATCH_*` environment variables, then command-line flags.
//!
//! ```toml
//! endpoint = "http://monitor.lan:5000"
//! request_timeout = "3s"
//! reset_timeout = "120s"
//! log_file = "tunnelwatch.log"
//!
//! [hosts]
//! "172.20.3.108" = "Curator Service - 172.20.3.108"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::HostLabels;

pub const DEFAULT_CONFIG_FILE: &str = "tunnelwatch.toml";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";
const ENV_PREFIX: &str = "TUNNELWATCH";

/// Values given on the command line, applied over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub request_timeout: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the ping-monitor service.
    pub endpoint: String,
    /// Timeout for polls and the clear call, e.g. "3s" or "1500ms".
    pub request_timeout: String,
    /// Timeout for a reset request, which runs a remote session.
    pub reset_timeout: String,
    pub log_file: PathBuf,
    /// Display label per host id.
    pub hosts: HostLabels,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: "3s".to_string(),
            reset_timeout: "120s".to_string(),
            log_file: PathBuf::from("tunnelwatch.log"),
            hosts: HostLabels::reference(),
        }
    }
}

impl Settings {
    /// Load settings; a missing config file is not an error.
    pub fn load(config_path: &Path, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(config_path, overrides, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(config_path: &Path, overrides: &Overrides, env: Environment) -> Result<Self> {
        let log_file = overrides
            .log_file
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let settings: Settings = Config::builder()
            .add_source(File::from(config_path).format(FileFormat::Toml).required(false))
            .add_source(env)
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .set_override_option("request_timeout", overrides.request_timeout.clone())?
            .set_override_option("log_file", log_file)?
            .build()
            .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.request_timeout()?;
        settings.reset_timeout()?;
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration(&self.request_timeout)
            .with_context(|| format!("Invalid request_timeout '{}'", self.request_timeout))
    }

    pub fn reset_timeout(&self) -> Result<Duration> {
        parse_duration(&self.reset_timeout)
            .with_context(|| format!("Invalid reset_timeout '{}'", self.reset_timeout))
    }
}
