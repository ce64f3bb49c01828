use serde::Serialize;
use std::env;
use thiserror::Error;

pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_LISTEN_PORT: u16 = 8000;
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Errors raised while loading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = |key: &'static str, default: u16| -> Result<u16, ConfigError> {
            match get(key) {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid { var: key, value: v }),
                None => Ok(default),
            }
        };

        // Secret first so a missing key is reported before database settings
        let api_key = required("API_KEY")?;

        let database = DatabaseConfig {
            host: required("MYSQL_HOST")?,
            port: port("MYSQL_PORT", DEFAULT_DB_PORT)?,
            user: required("MYSQL_USER")?,
            password: required("MYSQL_PASSWORD")?,
            name: required("MYSQL_DATABASE")?,
        };

        let server = ServerConfig {
            host: get("HOST").unwrap_or_else(|| DEFAULT_LISTEN_HOST.to_string()),
            port: port("PORT", DEFAULT_LISTEN_PORT)?,
        };

        Ok(Self {
            server,
            database,
            security: SecurityConfig { api_key },
        })
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn full() -> Vec<(&'static str, &'static str)> {
        vec![
            ("API_KEY", "secret"),
            ("MYSQL_HOST", "db.local"),
            ("MYSQL_USER", "reader"),
            ("MYSQL_PASSWORD", "pw"),
            ("MYSQL_DATABASE", "shop"),
        ]
    }

    #[test]
    fn applies_defaults() {
        let config = AppConfig::from_lookup(lookup(&full())).unwrap();
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.security.api_key, "secret");
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn reads_explicit_ports() {
        let mut vars = full();
        vars.push(("MYSQL_PORT", "3307"));
        vars.push(("PORT", "9090"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn missing_secret_fails_first() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("API_KEY")));
    }

    #[test]
    fn empty_database_value_counts_as_missing() {
        let mut vars = full();
        vars.retain(|(k, _)| *k != "MYSQL_PASSWORD");
        vars.push(("MYSQL_PASSWORD", ""));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MYSQL_PASSWORD")));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut vars = full();
        vars.push(("MYSQL_PORT", "mysql"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MYSQL_PORT", .. }));
    }

    #[test]
    fn cli_overrides_win() {
        let config = AppConfig::from_lookup(lookup(&full()))
            .unwrap()
            .with_overrides(Some("127.0.0.1".into()), Some(1234));
        assert_eq!(config.bind_addr(), "127.0.0.1:1234");
    }

    #[test]
    fn secrets_are_not_serialized() {
        let config = AppConfig::from_lookup(lookup(&full())).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("\"pw\""));
    }
}
