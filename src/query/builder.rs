//! Parameterized SQL assembly.
//!
//! Query text only grows through [`SqlBuilder::push_sql`] (static
//! fragments), [`SqlBuilder::push_column`] (registry columns) and
//! [`SqlBuilder::push_table`] (validated table names). Every value goes
//! through [`SqlBuilder::push_value`], which writes a `?` placeholder and
//! records the value in the same step.

use super::error::QueryError;
use crate::registry::Column;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Bound parameter value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<u16> for SqlValue {
    fn from(value: u16) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(value) => write!(f, "{value}"),
            SqlValue::Text(value) => write!(f, "{value:?}"),
        }
    }
}

/// Table name checked to be a plain identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Result<Self, QueryError> {
        let name = name.into();
        if IDENTIFIER_RE.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(QueryError::InvalidTableName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self("access_logs".to_string())
    }
}

impl TryFrom<String> for TableName {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TableName::new(value)
    }
}

impl From<TableName> for String {
    fn from(table: TableName) -> Self {
        table.0
    }
}

/// Query text plus the values bound to its `?` placeholders, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub text: String,
    pub params: Vec<SqlValue>,
}

impl CompiledQuery {
    pub fn placeholder_count(&self) -> usize {
        self.text.matches('?').count()
    }
}

#[derive(Debug, Default)]
pub struct SqlBuilder {
    text: String,
    params: Vec<SqlValue>,
    has_where: bool,
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sql(&mut self, fragment: &'static str) -> &mut Self {
        self.text.push_str(fragment);
        self
    }

    pub fn push_column(&mut self, column: Column) -> &mut Self {
        self.text.push_str(column.as_str());
        self
    }

    pub fn push_table(&mut self, table: &TableName) -> &mut Self {
        debug_assert!(IDENTIFIER_RE.is_match(table.as_str()));
        self.text.push_str(table.as_str());
        self
    }

    pub fn push_value(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.text.push('?');
        self.params.push(value.into());
        self
    }

    /// `(?, ?, ...)` with one placeholder per value
    pub fn push_value_list<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.text.push('(');
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.text.push_str(", ");
            }
            self.push_value(value);
        }
        self.text.push(')');
        self
    }

    /// Start a new condition: ` WHERE ` for the first one, ` AND ` after.
    pub fn and_where(&mut self) -> &mut Self {
        if self.has_where {
            self.text.push_str(" AND ");
        } else {
            self.text.push_str(" WHERE ");
            self.has_where = true;
        }
        self
    }

    pub fn finish(self) -> CompiledQuery {
        CompiledQuery {
            text: self.text,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_list_placeholders() {
        let mut sql = SqlBuilder::new();
        sql.push_column(Column::Status)
            .push_sql(" IN ")
            .push_value_list([404u16, 500]);
        let query = sql.finish();
        assert_eq!(query.text, "status IN (?, ?)");
        assert_eq!(query.params, vec![SqlValue::Integer(404), SqlValue::Integer(500)]);
    }

    #[test]
    fn test_and_where_separators() {
        let mut sql = SqlBuilder::new();
        sql.push_sql("SELECT 1");
        sql.and_where().push_column(Column::Method).push_sql(" = ").push_value("GET");
        sql.and_where().push_column(Column::Path).push_sql(" = ").push_value("/");
        let query = sql.finish();
        assert_eq!(query.text, "SELECT 1 WHERE method = ? AND path = ?");
        assert_eq!(query.placeholder_count(), query.params.len());
    }

    #[test]
    fn test_table_name_validation() {
        assert!(TableName::new("access_logs").is_ok());
        assert!(TableName::new("_logs2").is_ok());
        assert_eq!(
            TableName::new("logs; DROP TABLE x"),
            Err(QueryError::InvalidTableName("logs; DROP TABLE x".to_string()))
        );
        assert!(TableName::new("").is_err());
        assert!(TableName::new("2logs").is_err());
    }

    #[test]
    fn test_sql_value_json() {
        let values = vec![SqlValue::from("abc"), SqlValue::from(404u16)];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"["abc",404]"#
        );
    }
}
