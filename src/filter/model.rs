use chrono::{DateTime, Duration, Local};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Substring constraint on a text column.
///
/// An `Alternation` always holds at least two distinct values; build one
/// with [`TextPredicate::from_values`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawPredicate")]
pub enum TextPredicate {
    Single(String),
    Alternation(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPredicate {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<RawPredicate> for TextPredicate {
    type Error = String;

    fn try_from(raw: RawPredicate) -> Result<Self, Self::Error> {
        match raw {
            RawPredicate::One(value) => Ok(TextPredicate::Single(value)),
            RawPredicate::Many(values) => TextPredicate::from_values(values)
                .ok_or_else(|| "text predicate needs at least one value".to_string()),
        }
    }
}

impl TextPredicate {
    /// Build a predicate from literals, dropping duplicates but keeping the
    /// order of first appearance. Returns `None` for an empty input.
    pub fn from_values<I, S>(values: I) -> Option<TextPredicate>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: IndexSet<String> = values.into_iter().map(Into::into).collect();
        match unique.len() {
            0 => None,
            1 => unique.pop().map(TextPredicate::Single),
            _ => Some(TextPredicate::Alternation(unique.into_iter().collect())),
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            TextPredicate::Single(value) => std::slice::from_ref(value),
            TextPredicate::Alternation(values) => values,
        }
    }
}

/// Inclusive time bounds, compared lexically by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Timestamp layout the log importer writes into the `time` column
pub const STORE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl DateRange {
    pub fn new(start: Option<impl Into<String>>, end: Option<impl Into<String>>) -> Self {
        Self {
            start: start.map(Into::into),
            end: end.map(Into::into),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Open-ended range covering the `hours` before `now`
    pub fn last_hours(hours: u32, now: DateTime<Local>) -> Self {
        let start = now - Duration::hours(i64::from(hours));
        Self {
            start: Some(start.format(STORE_TIME_FORMAT).to_string()),
            end: None,
        }
    }
}

/// Fields of the model that can be shown and removed as a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Crawler,
    Path,
    Method,
    Status,
    DateRange,
}

impl FilterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Crawler => "crawler",
            FilterKey::Path => "path",
            FilterKey::Method => "method",
            FilterKey::Status => "status",
            FilterKey::DateRange => "dateRange",
        }
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crawler" => Ok(FilterKey::Crawler),
            "path" => Ok(FilterKey::Path),
            "method" => Ok(FilterKey::Method),
            "status" => Ok(FilterKey::Status),
            "dateRange" => Ok(FilterKey::DateRange),
            _ => Err(format!("unknown filter key: {s}")),
        }
    }
}

/// All active search constraints.
///
/// Callers replace the model on every edit; the compiler only borrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler: Option<TextPredicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<TextPredicate>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub method: IndexSet<String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub status: IndexSet<u16>,
    #[serde(skip_serializing_if = "DateRange::is_empty")]
    pub date_range: DateRange,
}

impl FilterModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.crawler.is_none()
            && self.path.is_none()
            && self.method.is_empty()
            && self.status.is_empty()
            && self.date_range.is_empty()
    }

    pub fn with_crawler(mut self, crawler: Option<TextPredicate>) -> Self {
        self.crawler = crawler;
        self
    }

    pub fn with_path(mut self, path: Option<TextPredicate>) -> Self {
        self.path = path;
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method.insert(method.into());
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method.extend(methods.into_iter().map(Into::into));
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status.insert(status);
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.status.extend(statuses);
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Copy of the model with one field cleared
    pub fn without(&self, key: FilterKey) -> Self {
        let mut model = self.clone();
        match key {
            FilterKey::Crawler => model.crawler = None,
            FilterKey::Path => model.path = None,
            FilterKey::Method => model.method.clear(),
            FilterKey::Status => model.status.clear(),
            FilterKey::DateRange => model.date_range = DateRange::default(),
        }
        model
    }

    /// Combine control state (`self`) with a freshly parsed model.
    ///
    /// Text predicates and date bounds set by `parsed` replace ours;
    /// method and status sets are unioned, ours first.
    pub fn merge(&self, parsed: &FilterModel) -> FilterModel {
        let mut merged = self.clone();
        if parsed.crawler.is_some() {
            merged.crawler = parsed.crawler.clone();
        }
        if parsed.path.is_some() {
            merged.path = parsed.path.clone();
        }
        merged.method.extend(parsed.method.iter().cloned());
        merged.status.extend(parsed.status.iter().copied());
        if parsed.date_range.start.is_some() {
            merged.date_range.start = parsed.date_range.start.clone();
        }
        if parsed.date_range.end.is_some() {
            merged.date_range.end = parsed.date_range.end.clone();
        }
        merged
    }
}
