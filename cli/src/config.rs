//! Configuration file management
//!
//! CLIConfiguration with TOML parsing for ~/.medisite/config.toml
//!
//! # Configuration Format
//!
//! ```toml
//! [server]
//! url = "http://localhost:8000/api"  # CMS API base address
//! timeout = 30                       # Request timeout in seconds
//!
//! [cache]
//! keep_unused_data_for_secs = 60
//!
//! [storage]
//! session_file = "~/.config/medisite/session.toml"
//!
//! [ui]
//! format = "table"           # table, json
//! color = true
//! ```

use medisite_link::{CacheConfig, LinkTimeouts};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CLIError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "~/.medisite/config.toml";

/// CLI configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CLIConfiguration {
    /// Server connection settings
    pub server: Option<ServerConfig>,

    /// Query cache retention
    pub cache: Option<CacheSettings>,

    /// Where the signed-in session is kept
    pub storage: Option<StorageConfig>,

    /// UI preferences
    pub ui: Option<UIConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API base address (e.g., http://localhost:8000/api)
    pub url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds an unused query result is kept around
    #[serde(default = "default_keep_unused_data_for_secs")]
    pub keep_unused_data_for_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Session file path; `~/` is expanded
    pub session_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    /// Output format: table, json
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_keep_unused_data_for_secs() -> u64 {
    60
}

fn default_format() -> String {
    "table".to_string()
}

fn default_color() -> bool {
    true
}

impl Default for CLIConfiguration {
    fn default() -> Self {
        Self {
            server: Some(ServerConfig {
                url: Some(default_url()),
                timeout: default_timeout(),
            }),
            cache: Some(CacheSettings {
                keep_unused_data_for_secs: default_keep_unused_data_for_secs(),
            }),
            storage: None,
            ui: Some(UIConfig {
                format: default_format(),
                color: default_color(),
            }),
        }
    }
}

pub fn expand_config_path(path: &Path) -> PathBuf {
    let path_str = path.to_str().unwrap_or(DEFAULT_CONFIG_PATH);
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

/// `<config dir>/medisite/session.toml`, falling back to the home directory.
pub fn default_session_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("medisite").join("session.toml"))
        .unwrap_or_else(|| expand_config_path(Path::new("~/.medisite/session.toml")))
}

impl CLIConfiguration {
    /// Load configuration from file
    ///
    /// Returns default configuration if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_config_path(path);
        let path = &expanded_path;

        if !path.exists() {
            log::debug!("[CONFIG] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CLIError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: CLIConfiguration = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn resolved_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or(ServerConfig {
            url: None,
            timeout: default_timeout(),
        })
    }

    pub fn resolved_ui(&self) -> UIConfig {
        self.ui.clone().unwrap_or(UIConfig {
            format: default_format(),
            color: default_color(),
        })
    }

    pub fn server_url(&self) -> String {
        self.resolved_server().url.unwrap_or_else(default_url)
    }

    pub fn timeouts(&self) -> LinkTimeouts {
        LinkTimeouts::builder()
            .request_timeout_secs(self.resolved_server().timeout)
            .build()
    }

    pub fn cache_config(&self) -> CacheConfig {
        let secs = self
            .cache
            .as_ref()
            .map_or_else(default_keep_unused_data_for_secs, |c| {
                c.keep_unused_data_for_secs
            });
        CacheConfig::default().with_keep_unused_data_for(Duration::from_secs(secs))
    }

    pub fn session_path(&self) -> PathBuf {
        self.storage
            .as_ref()
            .and_then(|s| s.session_file.as_deref())
            .map(|p| expand_config_path(Path::new(p)))
            .unwrap_or_else(default_session_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CLIConfiguration::default();
        assert_eq!(config.server_url(), "http://localhost:8000/api");
        assert_eq!(config.resolved_server().timeout, 30);
        assert_eq!(
            config.cache_config().keep_unused_data_for,
            Duration::from_secs(60)
        );
        assert_eq!(config.resolved_ui().format, "table");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = CLIConfiguration::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nurl = \"https://cms.hospital.test/api\"\n\n[ui]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = CLIConfiguration::load(&path).unwrap();
        assert_eq!(config.server_url(), "https://cms.hospital.test/api");
        assert_eq!(config.resolved_server().timeout, 30);
        assert!(config.resolved_ui().color);
        assert_eq!(config.resolved_ui().format, "json");
        assert_eq!(
            config.cache_config().keep_unused_data_for,
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_invalid_toml_is_a_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[server\nurl = ").unwrap();

        let err = CLIConfiguration::load(&path).unwrap_err();
        assert!(matches!(err, CLIError::ConfigurationError(_)));
    }

    #[test]
    fn test_session_file_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let session = temp_dir.path().join("s.toml");
        std::fs::write(
            &path,
            format!("[storage]\nsession_file = {:?}\n", session.display().to_string()),
        )
        .unwrap();

        let config = CLIConfiguration::load(&path).unwrap();
        assert_eq!(config.session_path(), session);
    }

    #[test]
    fn test_expand_home() {
        let expanded = expand_config_path(Path::new("~/.medisite/config.toml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join(".medisite/config.toml"));
        }
        let absolute = expand_config_path(Path::new("/etc/medisite.toml"));
        assert_eq!(absolute, PathBuf::from("/etc/medisite.toml"));
    }
}
