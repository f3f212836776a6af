//! An async ORM built around a pluggable [`DatabaseAdapter`].
//!
//! A [`TableSchema`] describes one table. A [`Table`] binds that schema to a
//! shared adapter and provides the table-wide finders. A [`Model`] wraps one
//! caller value and persists it. The SQL is assembled from the schema and
//! executed through the adapter, which returns ordered [`Row`]s.
//!
//! ```rust,no_run
//! use adaptorm::*;
//!
//! # async fn run() -> OrmResult<()> {
//! let adapter = connect_adapter(&AdapterConfig::sqlite(":memory:")).await?;
//! let users = Table::<Record>::initialize(
//!     TableSchema::new("users")
//!         .column(ColumnDefinition::new("id", "INTEGER").primary_key())
//!         .column(ColumnDefinition::new("name", "TEXT")),
//!     adapter,
//! );
//! users.create_table().await?;
//! users.model(conditions([("id", 1.into()), ("name", "Ada".into())])).save().await?;
//! assert_eq!(users.count(&Conditions::new()).await?, 1);
//! # Ok(())
//! # }
//! ```

mod libs;

pub use libs::*;
