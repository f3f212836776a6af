use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::libs::adapter::DatabaseAdapter;
use crate::libs::error::{OrmError, OrmResult};
use crate::libs::schema::TableSchema;
use crate::libs::sql::{self, QueryBuilder, Statement, page_offset};
use crate::libs::value::{Conditions, Row, Value, from_row, to_record};

pub const DEFAULT_PAGE_SIZE: u64 = 30;

const ID_COLUMN: &str = "id";

/// A table schema bound to the adapter that executes its statements.
///
/// Cloning is cheap; clones share the schema and the adapter.
///
/// # Example
/// ```rust,no_run
/// # use adaptorm::*;
/// # async fn run(adapter: std::sync::Arc<dyn DatabaseAdapter>) -> OrmResult<()> {
/// let users = Table::<Record>::initialize(TableSchema::new("users"), adapter);
/// let active = users
///     .find_by(&conditions([("status", "active".into())]))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Table<T> {
    schema: Arc<TableSchema>,
    adapter: Arc<dyn DatabaseAdapter>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            adapter: Arc::clone(&self.adapter),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("table_name", &self.schema.table_name)
            .field("dialect", &self.adapter.dialect())
            .finish()
    }
}

impl<T> Table<T> {
    /// Bind a schema to an adapter. The binding never changes afterwards.
    pub fn initialize(schema: TableSchema, adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self::from_shared(Arc::new(schema), adapter)
    }

    pub(crate) fn from_shared(schema: Arc<TableSchema>, adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self {
            schema,
            adapter,
            _marker: PhantomData,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn table_name(&self) -> &str {
        &self.schema.table_name
    }

    pub fn adapter(&self) -> &Arc<dyn DatabaseAdapter> {
        &self.adapter
    }

    /// Wrap a value so it can be saved or deleted through this table.
    pub fn model(&self, data: T) -> Model<T> {
        Model {
            data,
            table: self.clone(),
        }
    }

    /// A `SELECT * FROM <table>` builder in this adapter's dialect.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.table_name(), self.adapter.dialect())
    }

    async fn run(&self, statement: Statement) -> OrmResult<Vec<Row>> {
        self.adapter
            .prepare(&statement.sql, &statement.params)
            .await
    }

    pub async fn create_table(&self) -> OrmResult<()> {
        self.adapter
            .create_table(&self.schema.table_name, &self.schema.columns)
            .await
    }

    /// Empties the table, then drops it.
    ///
    /// The two statements are not wrapped in a transaction. If the drop
    /// fails, the table is left empty but still present.
    pub async fn drop_table(&self) -> OrmResult<()> {
        self.run(sql::delete_all(self.table_name())).await?;
        if let Err(err) = self.run(sql::drop_table(self.table_name())).await {
            warn!(
                table = self.table_name(),
                error = %err,
                "table was emptied but could not be dropped"
            );
            return Err(err);
        }
        Ok(())
    }

    /// One 1-based page of rows. Page 0 is read as page 1.
    pub async fn find_all(&self, page: u64, page_size: u64) -> OrmResult<Vec<Row>> {
        let offset = page_offset(page, page_size);
        debug!(table = self.table_name(), page, page_size, offset, "find_all");
        self.run(self.query().paginate(offset, page_size).build())
            .await
    }

    /// The first [`DEFAULT_PAGE_SIZE`] rows.
    pub async fn find_all_default(&self) -> OrmResult<Vec<Row>> {
        self.find_all(1, DEFAULT_PAGE_SIZE).await
    }

    pub async fn find_by_id(&self, id: impl Into<Value>) -> OrmResult<Option<Row>> {
        let statement = self.query().where_eq(ID_COLUMN, id.into()).limit(1).build();
        Ok(self.run(statement).await?.into_iter().next())
    }

    pub async fn find_one(&self, conditions: &Conditions) -> OrmResult<Option<Row>> {
        let statement = self.query().filter(conditions).limit(1).build();
        Ok(self.run(statement).await?.into_iter().next())
    }

    /// Every row matching all conditions. Empty conditions match every row.
    pub async fn find_by(&self, conditions: &Conditions) -> OrmResult<Vec<Row>> {
        self.run(self.query().filter(conditions).build()).await
    }

    /// Number of rows matching all conditions.
    ///
    /// A missing row, a missing `count` column and a falsy or non-numeric
    /// count all read as zero.
    pub async fn count(&self, conditions: &Conditions) -> OrmResult<u64> {
        let statement = self
            .query()
            .select(&["COUNT(*) AS count"])
            .filter(conditions)
            .build();
        let rows = self.run(statement).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("count"))
            .filter(|count| count.is_truthy())
            .and_then(Value::as_count)
            .unwrap_or(0))
    }
}

impl<T> Table<T>
where
    T: DeserializeOwned,
{
    pub async fn find_all_as(&self, page: u64, page_size: u64) -> OrmResult<Vec<T>> {
        self.find_all(page, page_size)
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    pub async fn find_by_id_as(&self, id: impl Into<Value>) -> OrmResult<Option<T>> {
        self.find_by_id(id).await?.map(from_row).transpose()
    }

    pub async fn find_one_as(&self, conditions: &Conditions) -> OrmResult<Option<T>> {
        self.find_one(conditions).await?.map(from_row).transpose()
    }

    pub async fn find_by_as(&self, conditions: &Conditions) -> OrmResult<Vec<T>> {
        self.find_by(conditions)
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }
}

/// One record bound to its table.
///
/// `data` is serialized at execution time; its field order decides the
/// column order of the generated `INSERT`.
pub struct Model<T> {
    pub data: T,
    table: Table<T>,
}

impl<T: fmt::Debug> fmt::Debug for Model<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("table", &self.table.table_name())
            .field("data", &self.data)
            .finish()
    }
}

impl<T> Model<T> {
    pub fn table(&self) -> &Table<T> {
        &self.table
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> Model<T>
where
    T: Serialize,
{
    fn insert_statement(&self) -> OrmResult<Statement> {
        let record = to_record(&self.data)?;
        if record.is_empty() {
            return Err(OrmError::Validation(format!(
                "cannot insert a record with no columns into {}",
                self.table.table_name()
            )));
        }
        Ok(sql::insert(
            self.table.adapter.dialect(),
            self.table.table_name(),
            &record,
        ))
    }

    /// Insert `data` as a new row. This never updates an existing row.
    pub async fn save(&self) -> OrmResult<()> {
        let statement = self.insert_statement()?;
        self.table.run(statement).await?;
        Ok(())
    }

    /// Insert `data` as a new row. Same statement as [`save`](Self::save);
    /// data that serializes to no columns is rejected before the adapter is
    /// contacted.
    pub async fn create(&self) -> OrmResult<()> {
        self.save().await
    }

    /// Delete the row whose `id` matches `data["id"]`.
    pub async fn delete(&self) -> OrmResult<()> {
        let record = to_record(&self.data)?;
        let id = match record.get(ID_COLUMN) {
            Some(id) if id.is_truthy() => id.clone(),
            _ => return Err(OrmError::missing_identifier(self.table.table_name())),
        };
        let statement = sql::delete_by_id(self.table.adapter.dialect(), self.table.table_name(), id);
        self.table.run(statement).await?;
        Ok(())
    }
}
