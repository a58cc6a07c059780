//! Configuration management for Notekeeper
//!
//! Loads settings from TOML file at ~/.notekeeper/config.toml

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Server host (default: 0.0.0.0 - all interfaces)
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Log output configuration. Stdout logging is always on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily-rolling log files; unset disables file logging
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// File name prefix for rolled log files
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "notekeeper.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            dir: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl LoggingConfig {
    /// Log directory with ~ expanded
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_path)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = expand_path(path.as_ref());

        if !expanded_path.exists() {
            return Err(CoreError::Config(format!(
                "Configuration file not found: {}",
                expanded_path.display()
            )));
        }

        let content = std::fs::read_to_string(&expanded_path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> SocketAddr {
        use std::net::ToSocketAddrs;

        format!("{}:{}", self.server.host, self.server.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NOTEKEEPER_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NOTEKEEPER_SERVER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid NOTEKEEPER_SERVER_PORT: {}", port),
            }
        }
        if let Ok(dir) = std::env::var("NOTEKEEPER_LOG_DIR") {
            self.logging.dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
    }

    /// Create a default configuration file at the given path
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let content = r#"# Notekeeper Configuration

[server]
# Port to listen on (default: 3000)
port = 3000

# Host to bind to
# "0.0.0.0" = all interfaces (default)
# "127.0.0.1" = localhost only
host = "0.0.0.0"

[logging]
# Write daily-rolling log files in addition to stdout
# dir = "~/.notekeeper/logs"
file_prefix = "notekeeper.log"
"#;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.logging.dir.is_none());
        assert_eq!(config.server_addr(), SocketAddr::from(([0, 0, 0, 0], 3000)));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
port = 9000
host = "127.0.0.1"

[logging]
dir = "/var/log/notekeeper"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.logging.dir.as_deref(),
            Some(Path::new("/var/log/notekeeper"))
        );
        assert_eq!(config.logging.file_prefix, "notekeeper.log");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_create_default_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::create_default(&path).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"not a port\"\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::TomlParse(_)));
    }
}
