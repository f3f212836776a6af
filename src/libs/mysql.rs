use async_trait::async_trait;
use sqlx::Row as _;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::libs::adapter::DatabaseAdapter;
use crate::libs::config::AdapterConfig;
use crate::libs::decode::{decode_row, unsigned_value};
use crate::libs::dialect::Dialect;
use crate::libs::error::{OrmError, OrmResult};
use crate::libs::schema::ColumnDefinition;
use crate::libs::sql::create_table_sql;
use crate::libs::value::{Row, Value};

/// MySQL adapter backed by a sqlx pool.
pub struct MySqlAdapter {
    config: AdapterConfig,
    pool: RwLock<Option<MySqlPool>>,
}

impl MySqlAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(AdapterConfig::from_url(Dialect::MySql, url))
    }

    fn connect_options(&self) -> OrmResult<MySqlConnectOptions> {
        if let Some(url) = &self.config.url {
            return MySqlConnectOptions::from_str(url)
                .map_err(|e| OrmError::Configuration(format!("invalid mysql url: {}", e)));
        }

        let mut options = MySqlConnectOptions::new().host(self.config.host_or_default());
        if let Some(port) = self.config.port_or_default() {
            options = options.port(port);
        }
        if !self.config.database.is_empty() {
            options = options.database(&self.config.database);
        }
        if let Some(username) = &self.config.username {
            options = options.username(username);
        }
        if let Some(password) = &self.config.password {
            options = options.password(password);
        }
        Ok(options)
    }

    async fn pool(&self) -> OrmResult<MySqlPool> {
        self.pool.read().await.clone().ok_or(OrmError::NotConnected)
    }
}

// sqlx reads `UNSIGNED` integer columns only as unsigned Rust types
fn decode_unsigned(row: &MySqlRow, index: usize) -> Option<Option<Value>> {
    row.try_get::<Option<u64>, usize>(index)
        .ok()
        .map(|v| v.map(unsigned_value))
}

#[async_trait]
impl DatabaseAdapter for MySqlAdapter {
    async fn connect(&self) -> OrmResult<()> {
        let mut guard = self.pool.write().await;
        if guard.is_some() {
            debug!("mysql adapter already connected");
            return Ok(());
        }

        let pool_config = &self.config.pool;
        let pool = MySqlPoolOptions::new()
            .max_connections(pool_config.max_connections)
            .min_connections(pool_config.min_connections_clamped())
            .idle_timeout(pool_config.idle_timeout())
            .max_lifetime(pool_config.max_lifetime())
            .acquire_timeout(pool_config.acquire_timeout())
            .connect_with(self.connect_options()?)
            .await
            .map_err(OrmError::Connection)?;

        info!(
            host = self.config.host_or_default(),
            database = %self.config.database,
            max_connections = pool_config.max_connections,
            "connected to mysql"
        );
        *guard = Some(pool);
        Ok(())
    }

    async fn disconnect(&self) -> OrmResult<()> {
        let pool = self.pool.write().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            info!("disconnected from mysql");
        }
        Ok(())
    }

    async fn create_table(&self, table_name: &str, columns: &[ColumnDefinition]) -> OrmResult<()> {
        let pool = self.pool().await?;
        let sql = create_table_sql(table_name, columns);
        debug!(sql = %sql, "creating table");
        sqlx::query(&sql)
            .execute(&pool)
            .await
            .map_err(|e| OrmError::query(sql.as_str(), e))?;
        Ok(())
    }

    async fn prepare(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let pool = self.pool().await?;

        let mut query = sqlx::query(sql);
        for value in params {
            query = match value {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(*b),
                Value::Int(i) => query.bind(*i),
                Value::Float(f) => query.bind(*f),
                Value::Text(s) => query.bind(s.clone()),
                Value::Bytes(b) => query.bind(b.clone()),
            };
        }

        let rows = query
            .fetch_all(&pool)
            .await
            .map_err(|e| OrmError::query(sql, e))?;
        debug!(sql, params = params.len(), rows = rows.len(), "executed statement");
        Ok(rows.iter().map(|row| decode_row(row, decode_unsigned)).collect())
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_operations_require_connection() {
        let adapter = MySqlAdapter::new(AdapterConfig::mysql("localhost", "app", "root", "secret"));
        assert!(matches!(
            adapter.prepare("SELECT 1", &[]).await,
            Err(OrmError::NotConnected)
        ));
        assert!(matches!(
            adapter.create_table("users", &[]).await,
            Err(OrmError::NotConnected)
        ));
        adapter.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_configuration_error() {
        let adapter = MySqlAdapter::from_url("not a url");
        assert!(matches!(
            adapter.connect().await,
            Err(OrmError::Configuration(_))
        ));
    }
}
