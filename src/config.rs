use crate::query::{DEFAULT_ROW_LIMIT, SortDirection, TableName, TimeBucket};
use crate::registry::is_sortable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid config file '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogQueryConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    /// Table holding one row per recorded request.
    pub table: TableName,
    /// Escape `%`, `_` and `\` in substring filters instead of passing them
    /// through as LIKE wildcards.
    pub escape_like_wildcards: bool,
    pub sort: SortRules,
    pub pagination: PaginationRules,
    pub request: RequestRules,
    pub histogram: HistogramRules,
}

impl Default for LogQueryConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            table: TableName::default(),
            escape_like_wildcards: false,
            sort: SortRules::default(),
            pagination: PaginationRules::default(),
            request: RequestRules::default(),
            histogram: HistogramRules::default(),
        }
    }
}

/// Sort used when the request does not name a column or direction.
///
/// Requests naming an unknown column still fall back to `time DESC`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SortRules {
    pub column: String,
    pub direction: SortDirection,
}

impl Default for SortRules {
    fn default() -> Self {
        Self {
            column: "time".to_string(),
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationRules {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationRules {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestRules {
    pub row_limit: u32,
}

impl Default for RequestRules {
    fn default() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramRules {
    pub default_bucket: TimeBucket,
}

impl LogQueryConfig {
    fn validate(&self) -> Result<(), String> {
        if !is_sortable(&self.sort.column) {
            return Err(format!("sort.column '{}' is not a sortable column", self.sort.column));
        }
        let pagination = &self.pagination;
        if pagination.max_page_size == 0 {
            return Err("pagination.max_page_size must be at least 1".to_string());
        }
        if pagination.default_page_size == 0
            || pagination.default_page_size > pagination.max_page_size
        {
            return Err(format!(
                "pagination.default_page_size must be between 1 and {}",
                pagination.max_page_size
            ));
        }
        if self.request.row_limit == 0 {
            return Err("request.row_limit must be at least 1".to_string());
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<LogQueryConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<LogQueryConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    let config = toml::from_str::<LogQueryConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display.clone(),
        source,
    })?;

    config.validate().map_err(|reason| ConfigError::Invalid {
        path: path_display,
        reason,
    })?;

    tracing::debug!(profile = %config.profile_name, path = %path.display(), "loaded config");
    Ok(config)
}

pub fn default_config() -> &'static LogQueryConfig {
    static DEFAULT_CONFIG: LazyLock<LogQueryConfig> = LazyLock::new(LogQueryConfig::default);
    &DEFAULT_CONFIG
}
