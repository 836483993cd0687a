//! Runtime configuration
//!
//! Settings live in an optional JSON file. The path comes from the
//! `CGNAT_CHECK_CONFIG` environment variable; without it (or with a missing
//! or empty file) the built-in defaults apply.

use crate::connectivity::{PublicIpMethod, DEFAULT_HTTP_ENDPOINT, DEFAULT_STUN_SERVER};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the settings file
pub const CONFIG_ENV_VAR: &str = "CGNAT_CHECK_CONFIG";

/// Default lookup timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// How the report is written to stdout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable fact per line
    #[default]
    Plain,
    /// Serialized `DetectionReport`
    Json,
}

/// Application settings
///
/// # Example
/// ```rust,no_run
/// use cgnat_check::config::Settings;
///
/// let settings = Settings::load("cgnat-check.json").expect("Failed to load");
/// println!("Using {} with a {:?} timeout", settings.method, settings.timeout());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Public address lookup method
    pub method: PublicIpMethod,
    /// STUN server as `host:port`
    pub stun_server: String,
    /// IP-echo endpoint URL
    pub http_endpoint: String,
    /// Timeout for the public address lookup in milliseconds
    pub timeout_ms: u64,
    /// Report format
    pub output: OutputFormat,
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// Returns the defaults if the file does not exist or is empty.
    /// Fields missing from the file keep their default values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the file named by `CGNAT_CHECK_CONFIG`, if set
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save settings to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        Ok(())
    }

    /// Check that every field is usable
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be greater than zero".to_string()));
        }

        match self.stun_server.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
            _ => {
                return Err(Error::Config(format!(
                    "stun_server must be host:port, got {:?}",
                    self.stun_server
                )));
            }
        }

        if !(self.http_endpoint.starts_with("http://") || self.http_endpoint.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "http_endpoint must be an http(s) URL, got {:?}",
                self.http_endpoint
            )));
        }

        Ok(())
    }

    /// Lookup timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Endpoint queried by the selected method
    pub fn endpoint(&self) -> &str {
        match self.method {
            PublicIpMethod::Stun => &self.stun_server,
            PublicIpMethod::Http => &self.http_endpoint,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            method: PublicIpMethod::Stun,
            stun_server: DEFAULT_STUN_SERVER.to_string(),
            http_endpoint: DEFAULT_HTTP_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            output: OutputFormat::Plain,
        }
    }
}
