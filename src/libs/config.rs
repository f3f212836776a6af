use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::libs::adapter::DatabaseAdapter;
use crate::libs::dialect::Dialect;
use crate::libs::error::OrmResult;
use crate::libs::mysql::MySqlAdapter;
use crate::libs::postgres::PostgresAdapter;
use crate::libs::sqlite::SqliteAdapter;

/// Connection settings handed to an adapter before `connect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Which engine and SQL dialect to use
    pub dialect: Dialect,

    /// Full connection URL. When set, it wins over the discrete fields.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Database name, or file path / `:memory:` for SQLite
    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub pool: PoolConfig,
}

impl AdapterConfig {
    fn server(
        dialect: Dialect,
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            dialect,
            url: None,
            host: Some(host.into()),
            port: dialect.default_port(),
            database: database.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            pool: PoolConfig::default(),
        }
    }

    pub fn mysql(
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::server(Dialect::MySql, host, database, username, password)
    }

    pub fn postgres(
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::server(Dialect::Postgres, host, database, username, password)
    }

    /// A file path (created if missing) or `:memory:`.
    pub fn sqlite(database: impl Into<String>) -> Self {
        Self {
            dialect: Dialect::Sqlite,
            url: None,
            host: None,
            port: None,
            database: database.into(),
            username: None,
            password: None,
            pool: PoolConfig::default(),
        }
    }

    pub fn from_url(dialect: Dialect, url: impl Into<String>) -> Self {
        Self {
            dialect,
            url: Some(url.into()),
            ..Self::sqlite(String::new())
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn host_or_default(&self) -> &str {
        self.host.as_deref().unwrap_or("localhost")
    }

    pub fn port_or_default(&self) -> Option<u16> {
        self.port.or(self.dialect.default_port())
    }
}

/// Configuration for the adapter's connection pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,

    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_seconds: u64,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    2
}
fn default_idle_timeout() -> u64 {
    300
} // 5 minutes
fn default_max_lifetime() -> u64 {
    1800
} // 30 minutes
fn default_acquire_timeout() -> u64 {
    30
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            idle_timeout_seconds: default_idle_timeout(),
            max_lifetime_seconds: default_max_lifetime(),
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

impl PoolConfig {
    /// Min is clamped to max so a small pool never asks for more idle
    /// connections than it may open.
    pub fn min_connections_clamped(&self) -> u32 {
        self.min_connections.min(self.max_connections)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_seconds)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

/// Builds the adapter matching `config.dialect` without connecting it.
pub fn build_adapter(config: &AdapterConfig) -> Arc<dyn DatabaseAdapter> {
    match config.dialect {
        Dialect::MySql => Arc::new(MySqlAdapter::new(config.clone())),
        Dialect::Postgres => Arc::new(PostgresAdapter::new(config.clone())),
        Dialect::Sqlite => Arc::new(SqliteAdapter::new(config.clone())),
    }
}

/// Builds the adapter matching `config.dialect` and connects it.
pub async fn connect_adapter(config: &AdapterConfig) -> OrmResult<Arc<dyn DatabaseAdapter>> {
    let adapter = build_adapter(config);
    adapter.connect().await?;
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.idle_timeout_seconds, 300);
        assert_eq!(config.max_lifetime_seconds, 1800);
        assert_eq!(config.acquire_timeout_seconds, 30);
    }

    #[test]
    fn test_min_connections_clamped() {
        let config = PoolConfig {
            max_connections: 1,
            ..PoolConfig::default()
        };
        assert_eq!(config.min_connections_clamped(), 1);
    }

    #[test]
    fn test_constructors() {
        let my = AdapterConfig::mysql("db", "app", "root", "secret");
        assert_eq!(my.dialect, Dialect::MySql);
        assert_eq!(my.port, Some(3306));

        let pg = AdapterConfig::postgres("db", "app", "postgres", "secret").with_port(6543);
        assert_eq!(pg.port_or_default(), Some(6543));

        let url = AdapterConfig::from_url(Dialect::Postgres, "postgres://localhost/app");
        assert_eq!(url.dialect, Dialect::Postgres);
        assert_eq!(url.url.as_deref(), Some("postgres://localhost/app"));
        assert_eq!(url.host_or_default(), "localhost");
    }

    #[test]
    fn test_config_deserialization_fills_defaults() {
        let config: AdapterConfig =
            serde_json::from_str(r#"{"dialect":"postgres","database":"app","pool":{"max_connections":4}}"#)
                .unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.port_or_default(), Some(5432));
        assert_eq!(config.pool.max_connections, 4);
        assert_eq!(config.pool.min_connections, 2);
    }

    #[test]
    fn test_build_adapter_matches_dialect() {
        assert_eq!(build_adapter(&AdapterConfig::sqlite(":memory:")).dialect(), Dialect::Sqlite);
        assert_eq!(
            build_adapter(&AdapterConfig::mysql("h", "d", "u", "p")).dialect(),
            Dialect::MySql
        );
    }
}
