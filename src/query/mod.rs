//! Lowering of filter models into parameterized SQL.

mod builder;
mod compiler;
mod error;
mod guard;
mod sort;

pub use builder::{CompiledQuery, SqlBuilder, SqlValue, TableName};
pub use compiler::{
    QueryCompiler, TimeBucket, compile, compile_count, compile_histogram, compile_page,
    escape_like_pattern,
};
pub use error::QueryError;
pub use guard::{DEFAULT_ROW_LIMIT, QueryRequest, ensure_read_only};
pub use sort::{Pagination, ResolvedSort, SortDirection, SortSpec};
