use async_trait::async_trait;

use crate::libs::dialect::Dialect;
use crate::libs::error::OrmResult;
use crate::libs::schema::ColumnDefinition;
use crate::libs::value::{Row, Value};

/// Translates the ORM's four operations into calls against one engine.
///
/// Implementations hold a pool that is created by [`connect`](Self::connect)
/// and reused by every call until [`disconnect`](Self::disconnect). Every
/// other operation fails with [`OrmError::NotConnected`](crate::OrmError)
/// while no pool exists. The pool is shared, so one adapter may serve
/// many concurrent callers.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Create the pool. Calling it again while connected is a no-op.
    async fn connect(&self) -> OrmResult<()>;

    /// Close the pool. Calling it while disconnected is a no-op.
    async fn disconnect(&self) -> OrmResult<()>;

    /// Run `CREATE TABLE IF NOT EXISTS` for the given columns, in order.
    async fn create_table(&self, table_name: &str, columns: &[ColumnDefinition]) -> OrmResult<()>;

    /// Execute a statement with positional parameters and return its rows.
    /// Statements that produce no result set return an empty vec.
    async fn prepare(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;

    fn dialect(&self) -> Dialect;
}
