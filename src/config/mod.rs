use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{RangepilotError, Result};

/// Deep link into the range-builder practice scenario opened for every
/// session. Fixed on purpose: the API never lets a caller pick a URL.
pub const DEFAULT_TARGET_URL: &str = "https://app.gtowizard.com/practice/range-builder?custree_id=929b2d3e-9830-448c-a6a4-e9218cba6504&cussol_id=cf42a022-e53a-438f-9997-02e36495104d&solution_type=gwiz&gmfs_solution_tab=ai_sols&gametype=MTTGeneral&depth=12.125&gmff_depth=100&gmfft_sort_key=0&gmfft_sort_order=desc&board=Js8d2d&history_spot=0";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Target site configuration
    #[serde(default)]
    pub target: TargetConfig,

    /// Filter executor timing
    #[serde(default)]
    pub executor: ExecutorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind on
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Run the browser headless
    #[serde(default)]
    pub headless: bool,

    /// Browser executable path (overrides auto-discovery)
    pub executable: Option<String>,

    /// User data directory (tilde-expanded)
    pub user_data_dir: Option<String>,

    /// Browser window width
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Browser window height
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// User agent presented to the target site
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            executable: None,
            user_data_dir: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
        }
    }
}

impl BrowserSettings {
    /// Executable path with `~` expanded, if one is configured
    pub fn expanded_executable(&self) -> Option<PathBuf> {
        self.executable
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
    }

    /// User data directory with `~` expanded, if one is configured
    pub fn expanded_user_data_dir(&self) -> Option<PathBuf> {
        self.user_data_dir
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
    }
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// URL opened when a session is created
    #[serde(default = "default_target_url")]
    pub url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: default_target_url(),
        }
    }
}

fn default_target_url() -> String {
    DEFAULT_TARGET_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorSettings {
    /// Per-strategy limit for locating a visible control (ms)
    #[serde(default = "default_locate_timeout_ms")]
    pub locate_timeout_ms: u64,

    /// Interval between locate probes (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Pause after a click before verifying its effect (ms)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Limit for confirming the active visual state (ms)
    #[serde(default = "default_verify_timeout_ms")]
    pub verify_timeout_ms: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            locate_timeout_ms: default_locate_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_ms: default_settle_ms(),
            verify_timeout_ms: default_verify_timeout_ms(),
        }
    }
}

impl ExecutorSettings {
    pub fn locate_timeout(&self) -> Duration {
        Duration::from_millis(self.locate_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_millis(self.verify_timeout_ms)
    }
}

fn default_locate_timeout_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_verify_timeout_ms() -> u64 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            browser: BrowserSettings::default(),
            target: TargetConfig::default(),
            executor: ExecutorSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from all sources (file, env, defaults)
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Merge config file if exists
            .merge(Toml::file(&config_path))
            // Merge environment variables (RANGEPILOT_*)
            .merge(Env::prefixed("RANGEPILOT_").split("_"))
            .extract()
            .map_err(|e| RangepilotError::ConfigError(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rangepilot")
            .join("config.toml")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RangepilotError::ConfigError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_all_interfaces_on_8000() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn default_browser_is_headful_with_original_window() {
        let config = Config::default();

        assert!(!config.browser.headless);
        assert_eq!(config.browser.window_width, 1920);
        assert_eq!(config.browser.window_height, 1080);
    }

    #[test]
    fn default_target_is_the_range_builder_deep_link() {
        let config = Config::default();

        assert!(config.target.url.contains("/practice/range-builder"));
    }

    #[test]
    fn executor_settings_convert_to_durations() {
        let executor = ExecutorSettings::default();

        assert_eq!(executor.locate_timeout(), Duration::from_secs(5));
        assert_eq!(executor.poll_interval(), Duration::from_millis(100));
        assert_eq!(executor.settle(), Duration::from_secs(1));
        assert_eq!(executor.verify_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn expanded_executable_passes_plain_paths_through() {
        let settings = BrowserSettings {
            executable: Some("/usr/bin/chromium".to_string()),
            ..BrowserSettings::default()
        };

        assert_eq!(
            settings.expanded_executable(),
            Some(PathBuf::from("/usr/bin/chromium"))
        );
        assert_eq!(BrowserSettings::default().expanded_executable(), None);
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.target.url, config.target.url);
        assert_eq!(
            parsed.executor.locate_timeout_ms,
            config.executor.locate_timeout_ms
        );
    }
}
