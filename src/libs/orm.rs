use std::sync::Arc;
use tracing::info;

use crate::libs::adapter::DatabaseAdapter;
use crate::libs::config::{AdapterConfig, build_adapter};
use crate::libs::error::{OrmError, OrmResult};
use crate::libs::model::Table;
use crate::libs::schema::TableSchema;
use crate::libs::value::{Row, Value};

/// A set of table schemas served by one adapter.
#[derive(Clone)]
pub struct Orm {
    adapter: Arc<dyn DatabaseAdapter>,
    schemas: Vec<Arc<TableSchema>>,
}

impl Orm {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>, schemas: Vec<TableSchema>) -> Self {
        Self {
            adapter,
            schemas: schemas.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build the adapter for `config`. Call [`connect`](Self::connect) before use.
    pub fn from_config(config: &AdapterConfig, schemas: Vec<TableSchema>) -> Self {
        Self::new(build_adapter(config), schemas)
    }

    pub fn adapter(&self) -> &Arc<dyn DatabaseAdapter> {
        &self.adapter
    }

    pub fn schemas(&self) -> impl Iterator<Item = &TableSchema> {
        self.schemas.iter().map(|s| s.as_ref())
    }

    pub async fn connect(&self) -> OrmResult<()> {
        self.adapter.connect().await
    }

    pub async fn disconnect(&self) -> OrmResult<()> {
        self.adapter.disconnect().await
    }

    // -------- Create tables --------
    pub async fn migrate(&self) -> OrmResult<()> {
        for schema in &self.schemas {
            self.adapter
                .create_table(&schema.table_name, &schema.columns)
                .await?;
        }
        info!(tables = self.schemas.len(), "migrated schemas");
        Ok(())
    }

    /// The table registered under `table_name`.
    pub fn table<T>(&self, table_name: &str) -> OrmResult<Table<T>> {
        self.schemas
            .iter()
            .find(|s| s.table_name == table_name)
            .map(|schema| Table::from_shared(Arc::clone(schema), Arc::clone(&self.adapter)))
            .ok_or_else(|| {
                OrmError::Initialization(format!(
                    "table {} has no registered schema",
                    table_name
                ))
            })
    }

    // -------- Execute raw SQL --------
    pub async fn raw(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.adapter.prepare(sql, params).await
    }
}
