use crate::libs::error::{OrmError, OrmResult};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A single column value as bound to a statement or read back from a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, `false`, zero, NaN, and empty text or bytes are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
        }
    }

    /// Reads the value as a non-negative count. Some drivers report
    /// aggregates as text or floats, so both are accepted.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Int(i) => u64::try_from(*i).ok(),
            Value::Float(f) if *f >= 0.0 => Some(*f as u64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s),
            nested => Value::Text(nested.to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Column name to value, in column order.
pub type Record = IndexMap<String, Value>;

/// One normalized result row.
pub type Row = Record;

/// Equality conditions, AND-joined in insertion order.
pub type Conditions = Record;

/// Builds a [`Record`] from `(column, value)` pairs, keeping their order.
pub fn conditions<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Record {
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Deserializes a row into a caller type.
pub fn from_row<T: DeserializeOwned>(row: Row) -> OrmResult<T> {
    let value = serde_json::to_value(row)?;
    Ok(serde_json::from_value(value)?)
}

/// Serializes model data into a record that follows its field order.
/// `None` and unit both become an empty record.
pub fn to_record<T: Serialize + ?Sized>(data: &T) -> OrmResult<Record> {
    match serde_json::to_value(data)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, Value::from_json(v)))
            .collect()),
        serde_json::Value::Null => Ok(Record::new()),
        other => Err(OrmError::Validation(format!(
            "model data must serialize to a map of columns, got `{}`",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Person {
        name: String,
        age: i64,
        nickname: Option<String>,
    }

    #[test]
    fn test_to_record_keeps_field_order() {
        let record = to_record(&Person {
            name: "a".into(),
            age: 1,
            nickname: None,
        })
        .unwrap();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "age", "nickname"]);
        assert_eq!(record["name"], Value::Text("a".into()));
        assert_eq!(record["age"], Value::Int(1));
        assert_eq!(record["nickname"], Value::Null);
    }

    #[test]
    fn test_to_record_empty_and_scalar() {
        assert!(to_record(&None::<Person>).unwrap().is_empty());
        assert!(to_record(&()).unwrap().is_empty());
        assert!(matches!(to_record(&5), Err(OrmError::Validation(_))));
    }

    #[test]
    fn test_nested_values_bind_as_json_text() {
        let record = to_record(&serde_json::json!({"tags": ["a", "b"]})).unwrap();
        assert_eq!(record["tags"], Value::Text(r#"["a","b"]"#.into()));
    }

    #[test]
    fn test_from_row() {
        let row = conditions([
            ("name", Value::from("Ada")),
            ("age", Value::from(36)),
            ("nickname", Value::Null),
        ]);
        let person: Person = from_row(row).unwrap();
        assert_eq!(
            person,
            Person {
                name: "Ada".into(),
                age: 36,
                nickname: None
            }
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(5).is_truthy());
        assert!(Value::from("x").is_truthy());
    }

    #[test]
    fn test_as_count() {
        assert_eq!(Value::Int(3).as_count(), Some(3));
        assert_eq!(Value::Text("7".into()).as_count(), Some(7));
        assert_eq!(Value::Float(2.0).as_count(), Some(2));
        assert_eq!(Value::Int(-1).as_count(), None);
        assert_eq!(Value::Null.as_count(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }
}
