//! Application settings management
//!
//! Stream URL, ListenBrainz credentials and polling knobs.

use std::path::Path;
use std::time::Duration;

use icyscrobble::config::{polling, timeouts};
use serde::{Deserialize, Serialize};

use crate::config::listenbrainz::{API_URL, TOKEN_ENV};
use crate::data::storage;
use crate::error::{AppError, Result};

/// Settings data file name
const SETTINGS_FILE: &str = "settings.json";

/// Settings file format version for migrations
const SETTINGS_VERSION: u32 = 1;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// File format version
    #[serde(default = "default_version")]
    pub version: u32,

    // === Stream ===
    /// Station stream URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,

    /// Connect and read timeout for the stream, in seconds
    #[serde(default = "default_stream_timeout")]
    pub stream_timeout_secs: u64,

    /// Metadata frames to read per cycle before giving up
    #[serde(default = "default_scan_attempts")]
    pub scan_attempts: usize,

    /// Delay between poll cycles, in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    // === ListenBrainz ===
    /// User token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listenbrainz_token: Option<String>,

    /// API root
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Submission timeout, in seconds
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_stream_timeout() -> u64 {
    timeouts::STREAM_TIMEOUT_SECS
}

fn default_scan_attempts() -> usize {
    polling::SCAN_ATTEMPTS
}

fn default_poll_interval() -> u64 {
    polling::POLL_INTERVAL_SECS
}

fn default_api_url() -> String {
    API_URL.to_string()
}

fn default_submit_timeout() -> u64 {
    timeouts::SUBMIT_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            stream_url: None,
            stream_timeout_secs: default_stream_timeout(),
            scan_attempts: default_scan_attempts(),
            poll_interval_secs: default_poll_interval(),
            listenbrainz_token: None,
            api_url: default_api_url(),
            submit_timeout_secs: default_submit_timeout(),
        }
    }
}

impl Settings {
    /// Load settings from default storage location
    pub fn load() -> Result<Self> {
        Ok(storage::load::<Settings>(SETTINGS_FILE)?.unwrap_or_default())
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(storage::load_from::<Settings>(path)?.unwrap_or_default())
    }

    /// Save settings to default storage location
    pub fn save(&self) -> Result<()> {
        storage::save(SETTINGS_FILE, self)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        storage::save_to(path, self)
    }

    /// Take the token from `LISTENBRAINZ_TOKEN` when set
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.listenbrainz_token = Some(token.trim().to_string());
        }
    }

    /// Check that the settings describe something that can run
    pub fn validate(&self) -> Result<()> {
        let url = self
            .stream_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::Config("No stream URL configured".to_string()))?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Stream URL must be http(s): {url}"
            )));
        }
        if self.stream_timeout_secs == 0 || self.submit_timeout_secs == 0 {
            return Err(AppError::Config("Timeouts must be at least 1 second".to_string()));
        }
        if self.scan_attempts == 0 {
            return Err(AppError::Config("scan_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }
}
