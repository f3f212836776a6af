use thiserror::Error;

/// Error type for every adapter and model operation.
#[derive(Debug, Error)]
pub enum OrmError {
    /// A table was requested that was never bound to a schema and adapter
    #[error("initialization error: {0}")]
    Initialization(String),

    /// The adapter has no live pool
    #[error("connection is not established")]
    NotConnected,

    /// The engine could not be reached while building the pool
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Connection settings could not be turned into connect options
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The engine rejected or failed a statement
    #[error("query error in `{sql}`: {source}")]
    Query {
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    /// `delete` was called on a record without an `id`
    #[error("id is required to delete a record from {table}")]
    MissingIdentifier { table: String },

    /// The record cannot be persisted as given
    #[error("validation error: {0}")]
    Validation(String),

    /// Model data or a row could not be converted through serde
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrmError {
    pub fn query(sql: impl Into<String>, source: sqlx::Error) -> Self {
        OrmError::Query {
            sql: sql.into(),
            source,
        }
    }

    pub fn missing_identifier(table: impl Into<String>) -> Self {
        OrmError::MissingIdentifier {
            table: table.into(),
        }
    }
}

/// Result type for ORM operations
pub type OrmResult<T> = Result<T, OrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            OrmError::NotConnected.to_string(),
            "connection is not established"
        );
        assert_eq!(
            OrmError::missing_identifier("users").to_string(),
            "id is required to delete a record from users"
        );
        let err = OrmError::query("SELECT 1", sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("query error in `SELECT 1`"));
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: OrmError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, OrmError::Serialization(_)));
    }
}
