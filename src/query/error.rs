use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(u32),
    #[error("page size must be between 1 and {max}, got {size}")]
    InvalidPageSize { size: u32, max: u32 },
    #[error("only SELECT or WITH queries are allowed")]
    NotSelect,
    #[error("WITH statements must include a SELECT query")]
    WithoutSelect,
    #[error("query contains forbidden keyword: {0}")]
    ForbiddenKeyword(String),
    #[error("query contains more than one statement")]
    MultipleStatements,
    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),
}
