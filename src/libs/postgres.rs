use async_trait::async_trait;
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{
    PgArgumentBuffer, PgConnectOptions, PgPool, PgPoolOptions, PgTypeInfo, Postgres,
};
use sqlx::{Encode, Type};
use std::str::FromStr;
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

/// A NULL parameter with no declared type, so the server infers it from
/// the column or expression it is compared with or assigned to.
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

/// PostgreSQL adapter backed by a sqlx pool.
pub struct PostgresAdapter {
    config: AdapterConfig,
    pool: RwLock<Option<PgPool>>,
}

impl PostgresAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(AdapterConfig::from_url(Dialect::Postgres, url))
    }

    fn connect_options(&self) -> OrmResult<PgConnectOptions> {
        if let Some(url) = &self.config.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| OrmError::Configuration(format!("invalid postgres url: {}", e)));
        }

        let mut options = PgConnectOptions::new().host(self.config.host_or_default());
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

    async fn pool(&self) -> OrmResult<PgPool> {
        self.pool.read().await.clone().ok_or(OrmError::NotConnected)
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
    async fn connect(&self) -> OrmResult<()> {
        let mut guard = self.pool.write().await;
        if guard.is_some() {
            debug!("postgres adapter already connected");
            return Ok(());
        }

        let pool_config = &self.config.pool;
        let pool = PgPoolOptions::new()
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
            "connected to postgres"
        );
        *guard = Some(pool);
        Ok(())
    }

    async fn disconnect(&self) -> OrmResult<()> {
        let pool = self.pool.write().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            info!("disconnected from postgres");
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
                Value::Null => query.bind(UntypedNull),
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
        Dialect::Postgres
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_operations_require_connection() {
        let adapter = PostgresAdapter::new(AdapterConfig::postgres("localhost", "app", "postgres", "secret"));
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

    #[test]
    fn test_dialect() {
        let adapter = PostgresAdapter::from_url("postgres://postgres@localhost/app");
        assert_eq!(adapter.dialect(), Dialect::Postgres);
        assert_eq!(adapter.dialect().placeholder(2), "$2");
    }

    #[test]
    fn test_null_parameter_is_untyped() {
        let info = <UntypedNull as Type<Postgres>>::type_info();
        assert_eq!(info, PgTypeInfo::with_oid(Oid(0)));
        assert_ne!(info, <String as Type<Postgres>>::type_info());
        assert_ne!(info, <i64 as Type<Postgres>>::type_info());

        let mut buf = PgArgumentBuffer::default();
        let encoded = UntypedNull.encode_by_ref(&mut buf).unwrap();
        assert!(matches!(encoded, IsNull::Yes));
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_configuration_error() {
        let adapter = PostgresAdapter::from_url("not a url");
        assert!(matches!(
            adapter.connect().await,
            Err(OrmError::Configuration(_))
        ));
    }
}
