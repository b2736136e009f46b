//! Configuration for `taskboard`, read from `taskboard.toml`.
//!
//! Settings are layered file → environment → CLI. The file is optional;
//! every section falls back to defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 4000
//! broadcast_capacity = 256
//! ping_interval_secs = 30
//! pong_timeout_secs = 60
//! dev_mode = false
//!
//! [board]
//! initial_columns = ["To Do", "In Progress", "Done"]
//!
//! [client]
//! url = "ws://127.0.0.1:4000/ws"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! file = "taskboard.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::{Board, IdSource};
use crate::errors::ConfigError;
use crate::sync::ws::Keepalive;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "taskboard.toml";

pub const ENV_HOST: &str = "TASKBOARD_HOST";
pub const ENV_PORT: &str = "TASKBOARD_PORT";

/// Coordination point settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Relayed messages a slow client may fall behind before skipping.
    pub broadcast_capacity: usize,
    pub ping_interval_secs: u64,
    pub pong_timeout_secs: u64,
    /// Enables permissive CORS.
    pub dev_mode: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            broadcast_capacity: 256,
            ping_interval_secs: 30,
            pong_timeout_secs: 60,
            dev_mode: false,
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn keepalive(&self) -> Keepalive {
        Keepalive {
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            pong_timeout: Duration::from_secs(self.pong_timeout_secs),
        }
    }
}

/// The board the coordination point starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub initial_columns: Vec<String>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            initial_columns: vec![
                "To Do".to_string(),
                "In Progress".to_string(),
                "Done".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:4000/ws".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
    /// Daily-rolling log file. Empty or absent disables file logging.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

impl LoggingSettings {
    pub fn file(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

/// Parsed `taskboard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl TaskboardConfig {
    /// Load the configuration file.
    ///
    /// An explicit `path` must exist. Without one, `./taskboard.toml` is used
    /// if present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `TASKBOARD_HOST` / `TASKBOARD_PORT` overrides from `lookup`
    /// (normally `std::env::var(..).ok()`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid(
                "server.broadcast_capacity must be greater than zero".to_string(),
            ));
        }
        if self.server.ping_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.ping_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.server.pong_timeout_secs <= self.server.ping_interval_secs {
            return Err(ConfigError::Invalid(format!(
                "server.pong_timeout_secs ({}) must exceed server.ping_interval_secs ({})",
                self.server.pong_timeout_secs, self.server.ping_interval_secs
            )));
        }
        if self.client.url.is_empty() {
            return Err(ConfigError::Invalid("client.url must not be empty".to_string()));
        }
        Ok(())
    }

    /// The board the hub starts from: one empty column per configured title.
    pub fn initial_board(&self, ids: &dyn IdSource) -> Board {
        Board::with_columns(self.board.initial_columns.as_slice(), ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SequentialIds;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = TaskboardConfig::parse("").unwrap();
        assert_eq!(config, TaskboardConfig::default());
        assert_eq!(config.server.addr(), "127.0.0.1:4000");
        assert_eq!(config.server.broadcast_capacity, 256);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.file().is_none());
    }

    #[test]
    fn test_parse_partial_sections() {
        let config = TaskboardConfig::parse(
            r#"
[server]
port = 9000
dev_mode = true

[board]
initial_columns = ["Backlog"]

[logging]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.server.dev_mode);
        assert_eq!(config.board.initial_columns, vec!["Backlog"]);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_rejects_unknown_log_format() {
        assert!(TaskboardConfig::parse("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_empty_log_file_disables_file_logging() {
        let config = TaskboardConfig::parse("[logging]\nfile = \"\"").unwrap();
        assert!(config.logging.file().is_none());

        let config = TaskboardConfig::parse("[logging]\nfile = \"board.log\"").unwrap();
        assert_eq!(config.logging.file(), Some(Path::new("board.log")));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[client]\nurl = \"ws://example:1/ws\"\n").unwrap();

        let config = TaskboardConfig::load(Some(&path)).unwrap();
        assert_eq!(config.client.url, "ws://example:1/ws");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        match TaskboardConfig::load(Some(&path)) {
            Err(ConfigError::Read { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected Read error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_malformed_file_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = TaskboardConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = TaskboardConfig::parse("[server]\nhost = \"10.0.0.1\"\nport = 1").unwrap();
        config
            .apply_env(env(&[(ENV_HOST, "0.0.0.0"), (ENV_PORT, "4567")]))
            .unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:4567");
    }

    #[test]
    fn test_env_absent_leaves_config_untouched() {
        let mut config = TaskboardConfig::default();
        config.apply_env(env(&[])).unwrap();
        assert_eq!(config, TaskboardConfig::default());
    }

    #[test]
    fn test_env_invalid_port_is_rejected() {
        let mut config = TaskboardConfig::default();
        let err = config.apply_env(env(&[(ENV_PORT, "eighty")])).unwrap_err();
        match err {
            ConfigError::InvalidEnv { var, value } => {
                assert_eq!(var, ENV_PORT);
                assert_eq!(value, "eighty");
            }
            other => panic!("Expected InvalidEnv, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_defaults_ok() {
        assert!(TaskboardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = TaskboardConfig::default();
        config.server.broadcast_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_pong_timeout_not_exceeding_ping() {
        let mut config = TaskboardConfig::default();
        config.server.pong_timeout_secs = config.server.ping_interval_secs;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pong_timeout_secs"));
    }

    #[test]
    fn test_keepalive_from_settings() {
        let keepalive = TaskboardConfig::default().server.keepalive();
        assert_eq!(keepalive.ping_interval, Duration::from_secs(30));
        assert_eq!(keepalive.pong_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_initial_board_has_configured_columns_in_order() {
        let config = TaskboardConfig::default();
        let board = config.initial_board(&SequentialIds::new("c"));
        let titles: Vec<&str> = board.ordered_columns().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Done"]);
        assert!(board.tasks.is_empty());
        assert!(board.is_valid());
    }
}
