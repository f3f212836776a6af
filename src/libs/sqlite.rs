use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::libs::adapter::DatabaseAdapter;
use crate::libs::config::AdapterConfig;
use crate::libs::decode::{decode_row, no_extra};
use crate::libs::dialect::Dialect;
use crate::libs::error::{OrmError, OrmResult};
use crate::libs::schema::ColumnDefinition;
use crate::libs::sql::create_table_sql;
use crate::libs::value::{Row, Value};

const MEMORY: &str = ":memory:";

/// SQLite adapter backed by a sqlx pool.
///
/// An in-memory database lives only as long as its connection, so it is
/// served by exactly one connection that is never reaped.
pub struct SqliteAdapter {
    config: AdapterConfig,
    pool: RwLock<Option<SqlitePool>>,
}

impl SqliteAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(AdapterConfig::sqlite(MEMORY))
    }

    pub fn is_in_memory(&self) -> bool {
        match &self.config.url {
            Some(url) => url.contains(MEMORY) || url.contains("mode=memory"),
            None => self.config.database.is_empty() || self.config.database == MEMORY,
        }
    }

    fn connect_options(&self) -> OrmResult<SqliteConnectOptions> {
        let url = match &self.config.url {
            Some(url) => url.clone(),
            None if self.is_in_memory() => "sqlite::memory:".to_string(),
            None => {
                return Ok(SqliteConnectOptions::new()
                    .filename(&self.config.database)
                    .create_if_missing(true));
            }
        };
        SqliteConnectOptions::from_str(&url)
            .map_err(|e| OrmError::Configuration(format!("invalid sqlite url: {}", e)))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let pool_config = &self.config.pool;
        let options = SqlitePoolOptions::new().acquire_timeout(pool_config.acquire_timeout());
        if self.is_in_memory() {
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            options
                .max_connections(pool_config.max_connections)
                .min_connections(pool_config.min_connections_clamped())
                .idle_timeout(pool_config.idle_timeout())
                .max_lifetime(pool_config.max_lifetime())
        }
    }

    async fn pool(&self) -> OrmResult<SqlitePool> {
        self.pool.read().await.clone().ok_or(OrmError::NotConnected)
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn connect(&self) -> OrmResult<()> {
        let mut guard = self.pool.write().await;
        if guard.is_some() {
            debug!("sqlite adapter already connected");
            return Ok(());
        }

        let pool = self
            .pool_options()
            .connect_with(self.connect_options()?)
            .await
            .map_err(OrmError::Connection)?;

        info!(
            database = %self.config.database,
            in_memory = self.is_in_memory(),
            "connected to sqlite"
        );
        *guard = Some(pool);
        Ok(())
    }

    async fn disconnect(&self) -> OrmResult<()> {
        let pool = self.pool.write().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            info!("disconnected from sqlite");
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
        Ok(rows.iter().map(|row| decode_row(row, no_extra)).collect())
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}
