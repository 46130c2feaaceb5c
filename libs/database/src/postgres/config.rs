use core_config::{ConfigError, FromEnv, env_parse_or_default, env_required};
use sea_orm::ConnectOptions;
use std::time::Duration;

use crate::common::RetryPolicy;

/// PostgreSQL connection and pool settings.
///
/// ```ignore
/// use core_config::FromEnv;
/// use database::postgres::PostgresConfig;
///
/// let config = PostgresConfig::from_env()?;
/// let options = config.connect_options();
/// ```
#[derive(Clone, Debug)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    /// Log every statement through SeaORM's sqlx logger
    pub sql_logging: bool,
    /// Backoff used while the database is still starting up
    pub retry: RetryPolicy,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout: Duration::from_secs(8),
            acquire_timeout: Duration::from_secs(8),
            idle_timeout: Duration::from_secs(300),
            sql_logging: false,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_pool_size(mut self, max_connections: u32, min_connections: u32) -> Self {
        self.max_connections = max_connections;
        self.min_connections = min_connections.min(max_connections);
        self
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(&self.url);
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .sqlx_logging(self.sql_logging);
        options
    }
}

/// Environment variables:
/// - `DATABASE_URL` (required)
/// - `DB_MAX_CONNECTIONS` (default: 20)
/// - `DB_MIN_CONNECTIONS` (default: 2)
/// - `DB_CONNECT_TIMEOUT_SECS` (default: 8)
/// - `DB_ACQUIRE_TIMEOUT_SECS` (default: 8)
/// - `DB_IDLE_TIMEOUT_SECS` (default: 300)
/// - `DB_SQL_LOGGING` (default: false)
/// - `DB_CONNECT_ATTEMPTS` (default: 4)
impl FromEnv for PostgresConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_required("DATABASE_URL")?;

        let max_connections = env_parse_or_default("DB_MAX_CONNECTIONS", "20")?;
        let min_connections = env_parse_or_default("DB_MIN_CONNECTIONS", "2")?;
        let connect_timeout = env_parse_or_default("DB_CONNECT_TIMEOUT_SECS", "8")?;
        let acquire_timeout = env_parse_or_default("DB_ACQUIRE_TIMEOUT_SECS", "8")?;
        let idle_timeout = env_parse_or_default("DB_IDLE_TIMEOUT_SECS", "300")?;
        let sql_logging = env_parse_or_default("DB_SQL_LOGGING", "false")?;
        let attempts = env_parse_or_default("DB_CONNECT_ATTEMPTS", "4")?;

        if min_connections > max_connections {
            return Err(ConfigError::ParseError {
                key: "DB_MIN_CONNECTIONS".to_string(),
                details: format!(
                    "must not exceed DB_MAX_CONNECTIONS ({} > {})",
                    min_connections, max_connections
                ),
            });
        }

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout),
            acquire_timeout: Duration::from_secs(acquire_timeout),
            idle_timeout: Duration::from_secs(idle_timeout),
            sql_logging,
            retry: RetryPolicy::new(attempts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB_VARS: [&str; 7] = [
        "DB_MAX_CONNECTIONS",
        "DB_MIN_CONNECTIONS",
        "DB_CONNECT_TIMEOUT_SECS",
        "DB_ACQUIRE_TIMEOUT_SECS",
        "DB_IDLE_TIMEOUT_SECS",
        "DB_SQL_LOGGING",
        "DB_CONNECT_ATTEMPTS",
    ];

    fn with_db_env<F: FnOnce()>(overrides: &[(&str, &str)], f: F) {
        let mut vars: Vec<(&str, Option<&str>)> = DB_VARS
            .iter()
            .map(|key| (*key, overrides.iter().find(|(k, _)| k == key).map(|(_, v)| *v)))
            .collect();
        vars.push((
            "DATABASE_URL",
            overrides.iter().find(|(k, _)| *k == "DATABASE_URL").map(|(_, v)| *v),
        ));
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_postgres_config_new_defaults() {
        let config = PostgresConfig::new("postgresql://localhost/todolist");
        assert_eq!(config.url, "postgresql://localhost/todolist");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 2);
        assert!(!config.sql_logging);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_with_pool_size_clamps_minimum() {
        let config = PostgresConfig::new("postgresql://localhost/todolist").with_pool_size(4, 10);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 4);
    }

    #[test]
    fn test_from_env_minimal() {
        with_db_env(&[("DATABASE_URL", "postgresql://localhost/testdb")], || {
            let config = PostgresConfig::from_env().unwrap();
            assert_eq!(config.url, "postgresql://localhost/testdb");
            assert_eq!(config.max_connections, 20);
            assert_eq!(config.idle_timeout, Duration::from_secs(300));
            assert_eq!(config.retry.max_attempts, 4);
        });
    }

    #[test]
    fn test_from_env_custom() {
        with_db_env(
            &[
                ("DATABASE_URL", "postgresql://localhost/testdb"),
                ("DB_MAX_CONNECTIONS", "50"),
                ("DB_MIN_CONNECTIONS", "10"),
                ("DB_CONNECT_TIMEOUT_SECS", "15"),
                ("DB_SQL_LOGGING", "true"),
                ("DB_CONNECT_ATTEMPTS", "9"),
            ],
            || {
                let config = PostgresConfig::from_env().unwrap();
                assert_eq!(config.max_connections, 50);
                assert_eq!(config.min_connections, 10);
                assert_eq!(config.connect_timeout, Duration::from_secs(15));
                assert!(config.sql_logging);
                assert_eq!(config.retry.max_attempts, 9);
            },
        );
    }

    #[test]
    fn test_from_env_missing_url() {
        with_db_env(&[], || {
            let err = PostgresConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[test]
    fn test_from_env_invalid_number() {
        with_db_env(
            &[
                ("DATABASE_URL", "postgresql://localhost/testdb"),
                ("DB_MAX_CONNECTIONS", "lots"),
            ],
            || {
                let err = PostgresConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_inverted_pool_bounds() {
        with_db_env(
            &[
                ("DATABASE_URL", "postgresql://localhost/testdb"),
                ("DB_MAX_CONNECTIONS", "3"),
                ("DB_MIN_CONNECTIONS", "5"),
            ],
            || {
                let err = PostgresConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("DB_MIN_CONNECTIONS"));
            },
        );
    }
}
