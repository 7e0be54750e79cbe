use super::error::QueryError;
use crate::registry::Column;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Case-insensitive `asc` / `desc`; anything else is rejected.
    pub fn from_token(token: &str) -> Option<SortDirection> {
        if token.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

/// Sort request as received from the table view.
///
/// Both parts are untrusted strings; [`SortSpec::resolve`] maps them onto
/// the closed column and direction sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSpec {
    pub column: Option<String>,
    pub direction: Option<String>,
}

/// Sort that is safe to write into query text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSort {
    pub column: Column,
    pub direction: SortDirection,
}

impl Default for ResolvedSort {
    fn default() -> Self {
        Self {
            column: Column::Time,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub fn new(column: Option<impl Into<String>>, direction: Option<impl Into<String>>) -> Self {
        Self {
            column: column.map(Into::into),
            direction: direction.map(Into::into),
        }
    }

    pub fn by(column: Column, direction: SortDirection) -> Self {
        Self {
            column: Some(column.as_str().to_string()),
            direction: Some(direction.as_sql().to_string()),
        }
    }

    /// Map onto the registry, falling back to `time DESC`.
    ///
    /// An unknown column discards the whole request. A missing column sorts
    /// by `time` in the requested direction. A bad direction becomes `DESC`.
    pub fn resolve(&self) -> ResolvedSort {
        self.resolve_with(ResolvedSort::default())
    }

    /// Like [`SortSpec::resolve`], but a missing column or direction takes
    /// the value from `default` (the configured default sort).
    pub fn resolve_with(&self, default: ResolvedSort) -> ResolvedSort {
        let column = match self.column.as_deref() {
            None => default.column,
            Some(name) => match name.parse::<Column>() {
                Ok(column) => column,
                Err(_) => {
                    tracing::debug!(column = name, "sort column not in registry, using default");
                    return ResolvedSort::default();
                }
            },
        };
        let direction = match self.direction.as_deref() {
            None => default.direction,
            Some(token) => SortDirection::from_token(token).unwrap_or_else(|| {
                tracing::debug!(direction = token, "unknown sort direction, using DESC");
                SortDirection::Desc
            }),
        };
        ResolvedSort { column, direction }
    }
}

/// 1-based page cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// `(limit, offset)` after checking bounds against `max_page_size`
    pub fn limit_offset(&self, max_page_size: u32) -> Result<(u32, i64), QueryError> {
        if self.page == 0 {
            return Err(QueryError::InvalidPage(self.page));
        }
        if self.page_size == 0 || self.page_size > max_page_size {
            return Err(QueryError::InvalidPageSize {
                size: self.page_size,
                max: max_page_size,
            });
        }
        let offset = i64::from(self.page - 1) * i64::from(self.page_size);
        Ok((self.page_size, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        assert_eq!(SortSpec::default().resolve(), ResolvedSort::default());
    }

    #[test]
    fn test_resolve_valid() {
        let sort = SortSpec::new(Some("status"), Some("asc")).resolve();
        assert_eq!(sort.column, Column::Status);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_unknown_column_discards_direction() {
        let sort = SortSpec::new(Some("password"), Some("ASC")).resolve();
        assert_eq!(sort, ResolvedSort::default());
    }

    #[test]
    fn test_bad_direction_becomes_desc() {
        let sort = SortSpec::new(Some("path"), Some("ASC; DROP TABLE x")).resolve();
        assert_eq!(sort.column, Column::Path);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_missing_column_keeps_direction() {
        let sort = SortSpec::new(None::<String>, Some("Asc")).resolve();
        assert_eq!(sort.column, Column::Time);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_configured_default_only_fills_gaps() {
        let default = ResolvedSort {
            column: Column::Status,
            direction: SortDirection::Asc,
        };
        assert_eq!(SortSpec::default().resolve_with(default), default);
        assert_eq!(
            SortSpec::new(Some("path"), None::<String>).resolve_with(default),
            ResolvedSort {
                column: Column::Path,
                direction: SortDirection::Asc
            }
        );
        assert_eq!(
            SortSpec::new(Some("password"), None::<String>).resolve_with(default),
            ResolvedSort::default()
        );
    }

    #[test]
    fn test_pagination_bounds() {
        assert_eq!(Pagination::new(1, 50).limit_offset(1000), Ok((50, 0)));
        assert_eq!(Pagination::new(3, 25).limit_offset(1000), Ok((25, 50)));
        assert_eq!(
            Pagination::new(0, 25).limit_offset(1000),
            Err(QueryError::InvalidPage(0))
        );
        assert_eq!(
            Pagination::new(1, 5000).limit_offset(1000),
            Err(QueryError::InvalidPageSize { size: 5000, max: 1000 })
        );
    }
}
