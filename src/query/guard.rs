//! Read-only checks for query text handed to the execution layer.

use super::builder::{CompiledQuery, SqlValue};
use super::error::QueryError;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Row cap applied when a query carries no `LIMIT` of its own
pub const DEFAULT_ROW_LIMIT: u32 = 1000;

const FORBIDDEN_KEYWORDS: [&str; 7] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE",
];

static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[^\n]*").expect("valid line comment regex"));
static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("valid block comment regex"));
static FORBIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({})\b", FORBIDDEN_KEYWORDS.join("|")))
        .expect("valid forbidden keyword regex")
});
static SELECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSELECT\b").expect("valid select regex"));
static LIMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLIMIT\b").expect("valid limit regex"));

fn strip_comments(text: &str) -> String {
    let without_lines = LINE_COMMENT_RE.replace_all(text, "");
    BLOCK_COMMENT_RE.replace_all(&without_lines, "").into_owned()
}

/// Accept a single `SELECT` (or `WITH ... SELECT`) statement only.
pub fn ensure_read_only(text: &str) -> Result<(), QueryError> {
    let stripped = strip_comments(text);
    let statement = stripped.trim();
    let upper = statement.to_uppercase();

    if upper.starts_with("WITH") {
        if !SELECT_RE.is_match(statement) {
            return Err(QueryError::WithoutSelect);
        }
    } else if !upper.starts_with("SELECT") {
        return Err(QueryError::NotSelect);
    }

    if let Some(keyword) = FORBIDDEN_RE.find(statement) {
        return Err(QueryError::ForbiddenKeyword(keyword.as_str().to_uppercase()));
    }

    if let Some((_, rest)) = statement.split_once(';') {
        if !rest.trim().is_empty() {
            return Err(QueryError::MultipleStatements);
        }
    }

    Ok(())
}

/// Body of a request to the SQL execution endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub params: Vec<SqlValue>,
    pub limit: u32,
}

impl QueryRequest {
    pub fn new(compiled: CompiledQuery, limit: u32) -> Result<Self, QueryError> {
        ensure_read_only(&compiled.text)?;
        Ok(Self {
            query: compiled.text,
            params: compiled.params,
            limit,
        })
    }

    /// Query text with ` LIMIT <limit>` appended unless it already has one
    pub fn query_with_limit(&self) -> String {
        if LIMIT_RE.is_match(&self.query) {
            self.query.clone()
        } else {
            format!("{} LIMIT {}", self.query, self.limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_select_and_with() {
        assert!(ensure_read_only("SELECT * FROM access_logs").is_ok());
        assert!(ensure_read_only("  select 1;  ").is_ok());
        assert!(ensure_read_only("WITH t AS (SELECT 1) SELECT * FROM t").is_ok());
        assert!(ensure_read_only("-- note\nSELECT 1 /* trailing */").is_ok());
    }

    #[test]
    fn test_rejects_writes() {
        assert_eq!(
            ensure_read_only("DELETE FROM access_logs"),
            Err(QueryError::NotSelect)
        );
        assert_eq!(
            ensure_read_only("SELECT 1; drop table access_logs"),
            Err(QueryError::ForbiddenKeyword("DROP".to_string()))
        );
        assert_eq!(
            ensure_read_only("WITH x AS (VALUES (1)) DELETE FROM t"),
            Err(QueryError::WithoutSelect)
        );
        assert_eq!(
            ensure_read_only("SELECT 1; SELECT 2"),
            Err(QueryError::MultipleStatements)
        );
    }

    #[test]
    fn test_keyword_inside_identifier_is_allowed() {
        assert!(ensure_read_only("SELECT created_at, updated FROM t").is_ok());
    }

    #[test]
    fn test_limit_appended_once() {
        let compiled = CompiledQuery {
            text: "SELECT * FROM access_logs".to_string(),
            params: vec![],
        };
        let request = QueryRequest::new(compiled, DEFAULT_ROW_LIMIT).unwrap();
        assert_eq!(
            request.query_with_limit(),
            "SELECT * FROM access_logs LIMIT 1000"
        );

        let paged = CompiledQuery {
            text: "SELECT * FROM access_logs LIMIT ? OFFSET ?".to_string(),
            params: vec![SqlValue::Integer(10), SqlValue::Integer(0)],
        };
        let request = QueryRequest::new(paged, 500).unwrap();
        assert_eq!(
            request.query_with_limit(),
            "SELECT * FROM access_logs LIMIT ? OFFSET ?"
        );
    }
}
