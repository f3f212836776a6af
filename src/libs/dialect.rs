//! SQL syntax differences between engines.
//!
//! Statement assembly lives in [`crate::sql`] and is shared by every
//! engine; only the parameter placeholder and the pagination clause vary.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Placeholder for the `index`-th (1-based) positional parameter.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
        }
    }

    /// Row window clause appended to a `SELECT`.
    pub fn paginate(&self, offset: u64, limit: u64) -> String {
        match self {
            Dialect::Postgres => format!("LIMIT {} OFFSET {}", limit, offset),
            Dialect::MySql | Dialect::Sqlite => format!("LIMIT {}, {}", offset, limit),
        }
    }

    pub fn default_port(&self) -> Option<u16> {
        match self {
            Dialect::MySql => Some(3306),
            Dialect::Postgres => Some(5432),
            Dialect::Sqlite => None,
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Sqlite => write!(f, "sqlite"),
        }
    }
}
