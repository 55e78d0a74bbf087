//! Configuration management for Acuity.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. All values default to the fixed
//! constants the audit pipeline was designed around, so a missing config
//! file is never an error.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// User agent presented by both the reachability pre-check and the
/// headless browser, so the target sees one consistent client identity.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main application configuration.
///
/// Loaded from `~/.config/acuity/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Admission control and scan attempt settings
    pub scanning: ScanningConfig,
    /// Headless browser settings
    pub browser: BrowserConfig,
    /// Page preparation (auto-scroll) settings
    pub scroll: ScrollConfig,
    /// Third-party rule engine settings
    pub engine: RuleEngineConfig,
    /// Outward-facing service settings
    pub service: ServiceConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `ACUITY_MAX_CONCURRENT`: Override the scan concurrency limit
    /// - `ACUITY_HEADLESS`: Override browser headless mode (true/false)
    /// - `ACUITY_DIAGNOSTICS`: Override diagnostic error detail (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("ACUITY_MAX_CONCURRENT") {
            if let Ok(max) = val.parse() {
                config.scanning.max_concurrent = max;
                tracing::debug!("Override scanning.max_concurrent from env: {}", max);
            }
        }

        if let Ok(val) = std::env::var("ACUITY_HEADLESS") {
            if let Ok(headless) = val.parse() {
                config.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("ACUITY_DIAGNOSTICS") {
            if let Ok(diagnostics) = val.parse() {
                config.service.diagnostics = diagnostics;
                tracing::debug!("Override service.diagnostics from env: {}", diagnostics);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/acuity/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "acuity", "acuity").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Admission control and scan attempt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Maximum scan attempts running at once
    pub max_concurrent: usize,
    /// End-to-end attempts per submission at the service boundary
    pub max_attempts: u32,
    /// Delay between end-to-end retries, in milliseconds
    pub retry_delay_ms: u64,
    /// Hard timeout for page navigation, in seconds
    pub navigation_timeout_secs: u64,
    /// Advisory timeout for the post-navigation load-settle wait, in seconds
    pub settle_timeout_secs: u64,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            max_attempts: 3,
            retry_delay_ms: 1000,
            navigation_timeout_secs: 30,
            settle_timeout_secs: 15,
        }
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run the browser without a visible window
    pub headless: bool,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// User agent presented to the target page
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Page preparation (auto-scroll) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Pixels scrolled per step
    pub step_px: u32,
    /// Pause between scroll steps, in milliseconds
    pub interval_ms: u64,
    /// Offset movement below this counts as "stuck", in pixels
    pub stuck_threshold_px: f64,
    /// Consecutive stuck intervals before giving up
    pub max_stuck: u32,
    /// Overall wall-clock cap on scrolling, in milliseconds
    pub wall_clock_ms: u64,
    /// Pause after scrolling for lazy-load fetches, in milliseconds
    pub post_scroll_pause_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step_px: 300,
            interval_ms: 100,
            stuck_threshold_px: 10.0,
            max_stuck: 5,
            wall_clock_ms: 10_000,
            post_scroll_pause_ms: 500,
        }
    }
}

/// Third-party rule engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleEngineConfig {
    /// Public CDN URL of the versioned rule engine bundle
    pub bundle_url: String,
    /// Timeout for fetching the bundle, in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for RuleEngineConfig {
    fn default() -> Self {
        Self {
            bundle_url: "https://unpkg.com/axe-core@4.10.3/axe.min.js".to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

/// Outward-facing service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Timeout for the reachability pre-check, in seconds
    pub precheck_timeout_secs: u64,
    /// Attach detailed error causes to failure responses
    pub diagnostics: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            precheck_timeout_secs: 10,
            diagnostics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_design_constants() {
        let config = AppConfig::default();
        assert_eq!(config.scanning.max_concurrent, 2);
        assert_eq!(config.scanning.max_attempts, 3);
        assert_eq!(config.scanning.retry_delay_ms, 1000);
        assert_eq!(config.scanning.navigation_timeout_secs, 30);
        assert_eq!(config.scroll.wall_clock_ms, 10_000);
        assert_eq!(config.scroll.max_stuck, 5);
        assert!(config.browser.headless);
        assert!(config.engine.bundle_url.contains("axe-core"));
        assert_eq!(config.service.precheck_timeout_secs, 10);
        assert!(!config.service.diagnostics);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize config");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse config");
        assert_eq!(parsed.scanning.max_concurrent, config.scanning.max_concurrent);
        assert_eq!(parsed.browser.user_agent, config.browser.user_agent);
        assert_eq!(parsed.engine.bundle_url, config.engine.bundle_url);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [scanning]
            max_concurrent = 4
        "#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scanning.max_concurrent, 4);
        // Untouched sections fall back to defaults
        assert_eq!(config.scanning.max_attempts, 3);
        assert_eq!(config.scroll.step_px, 300);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("scanning = \"nope\"");
        assert!(result.is_err());
    }
}
