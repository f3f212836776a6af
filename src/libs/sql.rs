//! Statement assembly. Identifiers are concatenated verbatim; values always
//! travel as positional parameters.

use crate::libs::dialect::Dialect;
use crate::libs::schema::ColumnDefinition;
use crate::libs::value::{Conditions, Record, Value};

/// SQL text plus its positional parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

/// `CREATE TABLE IF NOT EXISTS <name> (<col defs>)`
pub fn create_table_sql(table_name: &str, columns: &[ColumnDefinition]) -> String {
    let cols: Vec<String> = columns.iter().map(ColumnDefinition::to_sql).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table_name,
        cols.join(", ")
    )
}

pub fn delete_all(table_name: &str) -> Statement {
    Statement::new(format!("DELETE FROM {}", table_name))
}

pub fn drop_table(table_name: &str) -> Statement {
    Statement::new(format!("DROP TABLE IF EXISTS {}", table_name))
}

/// `INSERT INTO <t> (<keys>) VALUES (<placeholders>)` in record order.
/// The caller is responsible for rejecting an empty record.
pub fn insert(dialect: Dialect, table_name: &str, record: &Record) -> Statement {
    let cols: Vec<&str> = record.keys().map(String::as_str).collect();
    let placeholders: Vec<String> = (1..=cols.len()).map(|i| dialect.placeholder(i)).collect();
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_name,
            cols.join(", "),
            placeholders.join(", ")
        ),
        params: record.values().cloned().collect(),
    }
}

pub fn delete_by_id(dialect: Dialect, table_name: &str, id: Value) -> Statement {
    Statement {
        sql: format!(
            "DELETE FROM {} WHERE id = {}",
            table_name,
            dialect.placeholder(1)
        ),
        params: vec![id],
    }
}

/// Builds `SELECT` statements against a single table.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    dialect: Dialect,
    selects: Vec<String>,
    wheres: Vec<String>,
    window_clause: Option<String>,
    params: Vec<Value>,
}

impl QueryBuilder {
    pub fn new(table: &str, dialect: Dialect) -> Self {
        Self {
            table: table.to_string(),
            dialect,
            selects: vec!["*".to_string()],
            wheres: vec![],
            window_clause: None,
            params: Vec::new(),
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.selects = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn where_eq(mut self, column: &str, value: Value) -> Self {
        let placeholder = self.dialect.placeholder(self.params.len() + 1);
        self.wheres.push(format!("{} = {}", column, placeholder));
        self.params.push(value);
        self
    }

    /// AND-joins one equality per condition, in map order.
    pub fn filter(self, conditions: &Conditions) -> Self {
        conditions
            .iter()
            .fold(self, |qb, (column, value)| qb.where_eq(column, value.clone()))
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.window_clause = Some(format!("LIMIT {}", n));
        self
    }

    pub fn paginate(mut self, offset: u64, limit: u64) -> Self {
        self.window_clause = Some(self.dialect.paginate(offset, limit));
        self
    }

    fn build_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.selects.join(", "), self.table);
        if !self.wheres.is_empty() {
            sql += &format!(" WHERE {}", self.wheres.join(" AND "));
        }
        if let Some(window) = &self.window_clause {
            sql += &format!(" {}", window);
        }
        sql
    }

    pub fn build(self) -> Statement {
        Statement {
            sql: self.build_sql(),
            params: self.params,
        }
    }
}

/// Zero-based row offset of a 1-based page. Page 0 is read as page 1.
pub fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::value::conditions;

    #[test]
    fn test_create_table_sql_keeps_schema_order() {
        let columns = vec![
            ColumnDefinition::new("id", "INT").primary_key(),
            ColumnDefinition::new("name", "VARCHAR(64)"),
            ColumnDefinition::new("status", "VARCHAR(16)").default_value("'active'"),
        ];
        assert_eq!(
            create_table_sql("users", &columns),
            "CREATE TABLE IF NOT EXISTS users (id INT PRIMARY KEY, name VARCHAR(64), status VARCHAR(16) DEFAULT 'active')"
        );
    }

    #[test]
    fn test_insert_order_and_params() {
        let record = conditions([("name", Value::from("a")), ("age", Value::from(1))]);
        let stmt = insert(Dialect::MySql, "users", &record);
        assert_eq!(stmt.sql, "INSERT INTO users (name, age) VALUES (?, ?)");
        assert_eq!(stmt.params, vec![Value::from("a"), Value::from(1)]);

        let stmt = insert(Dialect::Postgres, "users", &record);
        assert_eq!(stmt.sql, "INSERT INTO users (name, age) VALUES ($1, $2)");
    }

    #[test]
    fn test_filter_numbers_postgres_placeholders() {
        let conds = conditions([("status", Value::from("active")), ("age", Value::from(30))]);
        let stmt = QueryBuilder::new("users", Dialect::Postgres)
            .filter(&conds)
            .limit(1)
            .build();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM users WHERE status = $1 AND age = $2 LIMIT 1"
        );
        assert_eq!(stmt.params, vec![Value::from("active"), Value::from(30)]);
    }

    #[test]
    fn test_empty_filter_omits_where() {
        let stmt = QueryBuilder::new("users", Dialect::MySql)
            .select(&["COUNT(*) AS count"])
            .filter(&Conditions::new())
            .build();
        assert_eq!(stmt.sql, "SELECT COUNT(*) AS count FROM users");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 30), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 10), 0);
    }

    #[test]
    fn test_paginated_select() {
        let stmt = QueryBuilder::new("users", Dialect::MySql)
            .paginate(page_offset(3, 10), 10)
            .build();
        assert_eq!(stmt.sql, "SELECT * FROM users LIMIT 20, 10");
    }

    #[test]
    fn test_delete_statements() {
        assert_eq!(delete_all("users").sql, "DELETE FROM users");
        assert_eq!(drop_table("users").sql, "DROP TABLE IF EXISTS users");
        let stmt = delete_by_id(Dialect::Sqlite, "users", Value::from(5));
        assert_eq!(stmt.sql, "DELETE FROM users WHERE id = ?");
        assert_eq!(stmt.params, vec![Value::Int(5)]);
    }
}
