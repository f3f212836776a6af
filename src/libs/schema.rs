use serde::{Deserialize, Serialize};

/// One column of a table, rendered verbatim into DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub default: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            primary_key: false,
            default: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// The expression is emitted after `DEFAULT` as-is, so string literals
    /// need their own quotes.
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// `<name> <type>[ PRIMARY KEY][ DEFAULT <value>]`
    pub fn to_sql(&self) -> String {
        let mut col_def = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            col_def.push_str(" PRIMARY KEY");
        }
        if let Some(default) = &self.default {
            col_def.push_str(" DEFAULT ");
            col_def.push_str(default);
        }
        col_def
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }
}
