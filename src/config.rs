//! Configuration loader and validator for the roster service and its client.
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::db::PoolSettings;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub database: Database,
    pub client: Client,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Server {
    pub bind_addr: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5178".into(),
        }
    }
}

/// Storage connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/school.db".into(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

/// Settings for `roster-client`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Client {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5178/".into(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Parsed listener address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::Invalid("server.bind_addr must be host:port"))
    }

    /// Validate the `server` and `database` sections. Only the service needs them.
    pub fn validate_service(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must be non-empty"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be > 0"));
        }

        Ok(())
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.database.max_connections,
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
        }
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_secs)
    }

    /// Apply `DATABASE_URL`, `BIND_ADDR` and `API_BASE_URL` on top of the file values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.url = url;
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            self.server.bind_addr = addr;
        }
        if let Some(base) = lookup(ENV_API_BASE_URL) {
            self.client.base_url = base;
        }
    }
}

/// Load configuration from a YAML file, apply environment overrides and validate.
/// - If `path` is None, uses `config.yaml` in the current working directory and
///   falls back to defaults when that file does not exist.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = match path {
        Some(path) => read_file(path)?,
        None => {
            let default_path = Path::new("config.yaml");
            if default_path.exists() {
                read_file(default_path)?
            } else {
                Config::default()
            }
        }
    };
    cfg.apply_env();
    validate(&cfg)?;
    Ok(cfg)
}

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Validate the sections every binary reads.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.client.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("client.base_url must be non-empty"));
    }
    if cfg.client.timeout_secs == 0 {
        return Err(ConfigError::Invalid("client.timeout_secs must be > 0"));
    }

    Ok(())
}

/// Example `config.yaml` with every key spelled out.
pub fn example() -> &'static str {
    r#"server:
  bind_addr: "0.0.0.0:5178"

database:
  url: "sqlite://./data/school.db"
  max_connections: 5
  acquire_timeout_secs: 5

client:
  base_url: "http://localhost:5178/"
  timeout_secs: 30
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        cfg.validate_service().unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("database:\n  url: \"sqlite::memory:\"\n").unwrap();
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.client.timeout_secs, 30);
        assert_eq!(cfg.bind_addr().unwrap().port(), 5178);
    }

    #[test]
    fn invalid_bind_addr() {
        let mut cfg = Config::default();
        cfg.server.bind_addr = "not-an-addr".into();
        let err = cfg.validate_service().unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("server.bind_addr")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_database_settings() {
        let mut cfg = Config::default();
        cfg.database.url = "  ".into();
        let err = cfg.validate_service().unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("database.url")),
            _ => panic!("wrong error"),
        }

        let mut cfg = Config::default();
        cfg.database.max_connections = 0;
        assert!(matches!(cfg.validate_service(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn client_ignores_service_sections() {
        let mut cfg = Config::default();
        cfg.server.bind_addr = "localhost:5178".into();
        cfg.database.url = "".into();
        validate(&cfg).unwrap();
        assert!(cfg.validate_service().is_err());
    }

    #[test]
    fn load_accepts_hostname_bind_addr() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, "server:\n  bind_addr: \"localhost:5178\"\n").unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.client.base_url, "http://localhost:5178/");
    }

    #[test]
    fn invalid_client_settings() {
        let mut cfg = Config::default();
        cfg.client.base_url = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg = Config::default();
        cfg.client.timeout_secs = 0;
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("client.timeout_secs")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            (ENV_DATABASE_URL, "sqlite:///srv/school.db"),
            (ENV_BIND_ADDR, "127.0.0.1:9000"),
            (ENV_API_BASE_URL, "http://api.internal/"),
        ]
        .into_iter()
        .collect();
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.database.url, "sqlite:///srv/school.db");
        assert_eq!(cfg.bind_addr().unwrap().port(), 9000);
        assert_eq!(cfg.client.base_url, "http://api.internal/");
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.pool_settings().max_connections, 5);
        assert_eq!(cfg.client_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn load_missing_explicit_file_is_io_error() {
        let td = tempdir().unwrap();
        let err = load(Some(&td.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
