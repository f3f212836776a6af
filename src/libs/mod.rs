pub mod adapter;
pub mod config;
mod decode;
pub mod dialect;
pub mod error;
pub mod model;
pub mod mysql;
pub mod orm;
pub mod postgres;
pub mod schema;
pub mod sql;
pub mod sqlite;
pub mod value;

// Re-export them for easier access from the crate root
pub use adapter::*;
pub use config::*;
pub use dialect::*;
pub use error::*;
pub use model::*;
pub use mysql::*;
pub use orm::*;
pub use postgres::*;
pub use schema::*;
pub use sql::{QueryBuilder, Statement};
pub use sqlite::*;
pub use value::*;
