use super::builder::{CompiledQuery, SqlBuilder, TableName};
use super::error::QueryError;
use super::sort::{Pagination, ResolvedSort, SortSpec};
use crate::config::{LogQueryConfig, default_config};
use crate::filter::{FilterModel, TextPredicate};
use crate::registry::{Column, SCOPE_COLUMN};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Histogram bucket width, lowered to a fixed `strftime` expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Minute,
    #[default]
    Hour,
    Day,
    Month,
}

impl TimeBucket {
    fn expression(&self) -> &'static str {
        match self {
            TimeBucket::Minute => "strftime('%Y-%m-%d %H:%M', time)",
            TimeBucket::Hour => "strftime('%Y-%m-%d %H:00', time)",
            TimeBucket::Day => "strftime('%Y-%m-%d', time)",
            TimeBucket::Month => "strftime('%Y-%m', time)",
        }
    }
}

/// Lowers filter models into parameterized queries against one table
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    table: TableName,
    escape_like_wildcards: bool,
    max_page_size: u32,
    default_sort: ResolvedSort,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::from_config(default_config())
    }
}

impl QueryCompiler {
    pub fn from_config(config: &LogQueryConfig) -> Self {
        Self {
            table: config.table.clone(),
            escape_like_wildcards: config.escape_like_wildcards,
            max_page_size: config.pagination.max_page_size,
            default_sort: ResolvedSort {
                column: Column::from_identifier(&config.sort.column),
                direction: config.sort.direction,
            },
        }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// `SELECT * ... ORDER BY ...` for the rows matching `model`.
    pub fn compile(
        &self,
        model: &FilterModel,
        sort: &SortSpec,
        scope_id: Option<&str>,
    ) -> CompiledQuery {
        self.select_rows(model, sort, scope_id).finish()
    }

    /// [`QueryCompiler::compile`] followed by `LIMIT ? OFFSET ?`
    pub fn compile_page(
        &self,
        model: &FilterModel,
        sort: &SortSpec,
        scope_id: Option<&str>,
        pagination: Pagination,
    ) -> Result<CompiledQuery, QueryError> {
        let (limit, offset) = pagination.limit_offset(self.max_page_size)?;
        let mut sql = self.select_rows(model, sort, scope_id);
        sql.push_sql(" LIMIT ").push_value(limit);
        sql.push_sql(" OFFSET ").push_value(offset);
        Ok(sql.finish())
    }

    /// Total number of matching rows, with the same conditions as the row query.
    pub fn compile_count(&self, model: &FilterModel, scope_id: Option<&str>) -> CompiledQuery {
        let mut sql = SqlBuilder::new();
        sql.push_sql("SELECT COUNT(*) AS total FROM ")
            .push_table(&self.table);
        self.push_conditions(&mut sql, model, scope_id);
        sql.finish()
    }

    /// Hits per time bucket for the chart view.
    pub fn compile_histogram(
        &self,
        model: &FilterModel,
        scope_id: Option<&str>,
        bucket: TimeBucket,
    ) -> CompiledQuery {
        let mut sql = SqlBuilder::new();
        sql.push_sql("SELECT ")
            .push_sql(bucket.expression())
            .push_sql(" AS bucket, COUNT(*) AS hits FROM ")
            .push_table(&self.table);
        self.push_conditions(&mut sql, model, scope_id);
        sql.push_sql(" GROUP BY bucket ORDER BY bucket ASC");
        sql.finish()
    }

    fn select_rows(&self, model: &FilterModel, sort: &SortSpec, scope_id: Option<&str>) -> SqlBuilder {
        let mut sql = SqlBuilder::new();
        sql.push_sql("SELECT * FROM ").push_table(&self.table);
        self.push_conditions(&mut sql, model, scope_id);

        let sort = sort.resolve_with(self.default_sort);
        sql.push_sql(" ORDER BY ")
            .push_column(sort.column)
            .push_sql(" ")
            .push_sql(sort.direction.as_sql());
        sql
    }

    // Order is fixed: scope, method, status, crawler, path, start, end.
    fn push_conditions(&self, sql: &mut SqlBuilder, model: &FilterModel, scope_id: Option<&str>) {
        if let Some(scope_id) = scope_id {
            sql.and_where()
                .push_sql(SCOPE_COLUMN)
                .push_sql(" = ")
                .push_value(scope_id);
        }
        if !model.method.is_empty() {
            sql.and_where()
                .push_column(Column::Method)
                .push_sql(" IN ")
                .push_value_list(model.method.iter().map(String::as_str));
        }
        if !model.status.is_empty() {
            sql.and_where()
                .push_column(Column::Status)
                .push_sql(" IN ")
                .push_value_list(model.status.iter().copied());
        }
        if let Some(crawler) = &model.crawler {
            sql.and_where();
            self.push_text_predicate(sql, Column::CrawlerName, crawler);
        }
        if let Some(path) = &model.path {
            sql.and_where();
            self.push_text_predicate(sql, Column::Path, path);
        }
        if let Some(start) = &model.date_range.start {
            sql.and_where()
                .push_column(Column::Time)
                .push_sql(" >= ")
                .push_value(start.as_str());
        }
        if let Some(end) = &model.date_range.end {
            sql.and_where()
                .push_column(Column::Time)
                .push_sql(" <= ")
                .push_value(end.as_str());
        }
    }

    fn push_text_predicate(&self, sql: &mut SqlBuilder, column: Column, predicate: &TextPredicate) {
        match predicate {
            TextPredicate::Single(value) => self.push_like(sql, column, value),
            TextPredicate::Alternation(values) => {
                sql.push_sql("(");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push_sql(" OR ");
                    }
                    self.push_like(sql, column, value);
                }
                sql.push_sql(")");
            }
        }
    }

    fn push_like(&self, sql: &mut SqlBuilder, column: Column, value: &str) {
        sql.push_column(column).push_sql(" LIKE ");
        if self.escape_like_wildcards {
            sql.push_value(format!("%{}%", escape_like_pattern(value)))
                .push_sql(" ESCAPE '\\'");
        } else {
            sql.push_value(format!("%{value}%"));
        }
    }
}

/// Escape LIKE metacharacters (`%`, `_`, `\`) in a user literal
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

static DEFAULT_COMPILER: LazyLock<QueryCompiler> = LazyLock::new(QueryCompiler::default);

/// Compile with the default configuration.
pub fn compile(model: &FilterModel, sort: &SortSpec, scope_id: Option<&str>) -> CompiledQuery {
    DEFAULT_COMPILER.compile(model, sort, scope_id)
}

pub fn compile_page(
    model: &FilterModel,
    sort: &SortSpec,
    scope_id: Option<&str>,
    pagination: Pagination,
) -> Result<CompiledQuery, QueryError> {
    DEFAULT_COMPILER.compile_page(model, sort, scope_id, pagination)
}

pub fn compile_count(model: &FilterModel, scope_id: Option<&str>) -> CompiledQuery {
    DEFAULT_COMPILER.compile_count(model, scope_id)
}

pub fn compile_histogram(
    model: &FilterModel,
    scope_id: Option<&str>,
    bucket: TimeBucket,
) -> CompiledQuery {
    DEFAULT_COMPILER.compile_histogram(model, scope_id, bucket)
}
