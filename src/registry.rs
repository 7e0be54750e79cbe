use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP verbs the text parser and the method control recognize.
pub const HTTP_METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "HEAD"];

/// Status codes offered as presets by the status control
pub const STATUS_PRESETS: [u16; 8] = [200, 301, 302, 304, 400, 403, 404, 500];

/// Column holding the log file id every query is scoped to.
///
/// Not part of the registry: it is never user-selectable.
pub const SCOPE_COLUMN: &str = "log_file_id";

/// Columns that may be filtered on or sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Time,
    IpAddress,
    Method,
    Path,
    Status,
    CrawlerName,
}

const ALL_COLUMNS: [Column; 6] = [
    Column::Time,
    Column::IpAddress,
    Column::Method,
    Column::Path,
    Column::Status,
    Column::CrawlerName,
];

impl Column {
    /// Name of the column as it appears in query text
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Time => "time",
            Column::IpAddress => "ip_address",
            Column::Method => "method",
            Column::Path => "path",
            Column::Status => "status",
            Column::CrawlerName => "crawler_name",
        }
    }

    /// Resolve a name that internal code believes is registered.
    ///
    /// An unknown name here means a caller skipped validation. Debug builds
    /// panic; release builds log the violation and fall back to `time`.
    pub fn from_identifier(name: &str) -> Column {
        match name.parse() {
            Ok(column) => column,
            Err(_) => {
                if cfg!(debug_assertions) {
                    panic!("unregistered identifier reached the compiler: {name:?}");
                }
                tracing::error!(identifier = name, "unregistered identifier, using `time`");
                Column::Time
            }
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a name is not in the registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column: {0}")]
pub struct UnknownColumn(pub String);

impl FromStr for Column {
    type Err = UnknownColumn;

    // Exact match only: identifiers are case-sensitive in the registry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_COLUMNS
            .iter()
            .copied()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

pub fn is_filterable(name: &str) -> bool {
    name.parse::<Column>().is_ok()
}

pub fn is_sortable(name: &str) -> bool {
    name.parse::<Column>().is_ok()
}

/// Every registered column, in registry order.
pub fn all_columns() -> &'static [Column] {
    &ALL_COLUMNS
}

/// Uppercased form of `word` if it is a recognized HTTP method
pub fn normalize_method(word: &str) -> Option<&'static str> {
    HTTP_METHODS
        .iter()
        .copied()
        .find(|method| method.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_is_fixed() {
        let names: Vec<&str> = all_columns().iter().map(Column::as_str).collect();
        assert_eq!(
            names,
            vec!["time", "ip_address", "method", "path", "status", "crawler_name"]
        );
    }

    #[test]
    fn test_membership() {
        assert!(is_sortable("crawler_name"));
        assert!(is_filterable("status"));
        assert!(!is_sortable("password"));
        assert!(!is_filterable("log_file_id"));
        assert!(!is_sortable("TIME"));
        assert!(!is_sortable("time; DROP TABLE access_logs"));
    }

    #[test]
    fn test_normalize_method() {
        assert_eq!(normalize_method("get"), Some("GET"));
        assert_eq!(normalize_method("Delete"), Some("DELETE"));
        assert_eq!(normalize_method("PATCH"), None);
    }

    #[test]
    fn test_from_identifier_known() {
        assert_eq!(Column::from_identifier("ip_address"), Column::IpAddress);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unregistered identifier")]
    fn test_from_identifier_unknown_panics_in_debug() {
        Column::from_identifier("password");
    }
}
