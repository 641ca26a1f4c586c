//! Settings storage.
//!
//! Settings live in `config.toml` inside the config directory, which is
//! resolved as: `--config-dir` / `VPNWARDEN_CONFIG_DIR` > `XDG_CONFIG_HOME` >
//! the platform config directory. Missing keys take their defaults.
//!
//! The core never reads settings directly; the shell owns an
//! [`AppSettings`] value and a [`SettingsStore`] and passes what is needed
//! down.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;

/// Name of the settings file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// User-configurable settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    /// OpenVPN profile (unit instance) to supervise.
    pub vpn_name: String,
    /// Unit template override; detected from the OpenVPN version when unset.
    #[serde(alias = "service_name", skip_serializing_if = "Option::is_none")]
    pub service_template: Option<String>,
    /// Service manager binary.
    pub service_manager: String,
    /// Prefix start/stop with the privilege command.
    #[serde(alias = "use_privilege")]
    pub use_sudo: bool,
    /// Privilege command; empty means `sudo`.
    #[serde(alias = "privilege_command")]
    pub sudo_command: String,
    /// Warn when the connection drops without a user stop.
    pub show_warning: bool,
    /// Open the log viewer after a successful start.
    pub show_log: bool,
    /// Start the VPN once at launch if it is not already up.
    pub auto_connect: bool,
    /// Seconds between status queries.
    pub poll_interval: u64,
    /// UI refresh rate in milliseconds.
    pub tick_rate: u64,
    /// Minimum log level (`debug`, `info`, `warning`, `error`).
    pub log_level: String,
    /// Entries kept in the activity log.
    pub max_log_entries: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            vpn_name: String::new(),
            service_template: None,
            service_manager: constants::DEFAULT_SERVICE_MANAGER.to_string(),
            use_sudo: false,
            sudo_command: String::new(),
            show_warning: false,
            show_log: false,
            auto_connect: false,
            poll_interval: constants::DEFAULT_POLL_INTERVAL_SECS,
            tick_rate: constants::DEFAULT_TICK_RATE,
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
            max_log_entries: constants::DEFAULT_MAX_LOG_ENTRIES,
        }
    }
}

impl AppSettings {
    /// Poll interval, never below one second.
    pub fn poll_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval.max(1))
    }
}

/// Load/save access to persisted settings.
pub trait SettingsStore {
    /// # Errors
    ///
    /// Returns an error if stored settings exist but cannot be read or parsed.
    fn load(&self) -> Result<AppSettings, String>;

    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    fn save(&self, settings: &AppSettings) -> Result<(), String>;

    /// Human-readable location, for `info` output.
    fn location(&self) -> String;
}

/// `config.toml` in a config directory.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    dir: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<AppSettings, String> {
        load_config(&self.dir)
    }

    fn save(&self, settings: &AppSettings) -> Result<(), String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| format!("Failed to create {}: {e}", self.dir.display()))?;
        let content = toml::to_string_pretty(settings)
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;
        let path = self.path();
        std::fs::write(&path, content).map_err(|e| format!("Failed to write {}: {e}", path.display()))
    }

    fn location(&self) -> String {
        self.path().display().to_string()
    }
}

/// Resolves (and creates) the config directory.
///
/// # Errors
///
/// Returns an error if no directory can be determined or it cannot be created.
pub fn resolve_config_dir(cli_override: Option<&PathBuf>) -> std::io::Result<PathBuf> {
    let path = if let Some(dir) = cli_override {
        if dir.is_relative() {
            std::env::current_dir()?.join(dir)
        } else {
            dir.clone()
        }
    } else {
        default_config_dir()?
    };

    std::fs::create_dir_all(&path)?;
    std::fs::canonicalize(&path)
}

fn default_config_dir() -> std::io::Result<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let xdg_path = PathBuf::from(xdg);
        if xdg_path.is_absolute() {
            return Ok(xdg_path.join(constants::APP_NAME));
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join(constants::APP_NAME))
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "Config directory not found"))
}

/// Loads `config.toml` from `config_dir`, or defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(config_dir: &Path) -> Result<AppSettings, String> {
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        return Ok(AppSettings::default());
    }

    let content = std::fs::read_to_string(&config_path)
        .map_err(|e| format!("Failed to read {}: {e}", config_path.display()))?;

    toml::from_str(&content).map_err(|e| format!("Invalid config at {}: {e}", config_path.display()))
}
