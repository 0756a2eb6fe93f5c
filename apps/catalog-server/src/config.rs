//! Server configuration.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database URL. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Log level.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match env::var("CATALOG_SERVER_PORT") {
            Ok(port) => port
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid CATALOG_SERVER_PORT {port:?}: {e}"))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            host: env::var("CATALOG_SERVER_HOST").unwrap_or(defaults.host),
            port,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            log_level: env::var("CATALOG_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults_and_overrides() {
        // SAFETY: this is the only test in the crate that touches these vars
        unsafe {
            env::remove_var("CATALOG_SERVER_HOST");
            env::remove_var("DATABASE_URL");
            env::set_var("CATALOG_SERVER_PORT", "9090");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.server_addr(), "0.0.0.0:9090");
        assert!(config.database_url.is_none());

        // SAFETY: see above
        unsafe {
            env::set_var("CATALOG_SERVER_PORT", "not-a-port");
        }
        assert!(Config::from_env().is_err());

        // SAFETY: see above
        unsafe {
            env::remove_var("CATALOG_SERVER_PORT");
        }
    }
}
