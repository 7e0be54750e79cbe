//! Parser for the free-text filter language.
//!
//! ```text
//! query  := clause (AND clause)*
//! clause := term (OR term)*
//! term   := field op value
//! field  := status | method | path | crawler | date
//! op     := = | contains
//! ```
//!
//! Parsing is lossy by design: anything that does not fit the grammar is
//! dropped and the rest of the input still applies, so the search box never
//! turns into an error state.

use super::model::{DateRange, FilterModel, TextPredicate};
use crate::registry::normalize_method;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static AND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+AND\s+").expect("valid AND regex"));
static OR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+OR\s+").expect("valid OR regex"));
static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_]+)").expect("valid field regex"));
static OPERAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bcontains\b|=)\s*(\S+)").expect("valid operand regex")
});
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("valid word regex"));
static DATE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9T:\-]+").expect("valid date token regex"));
// `:` separates the bounds but also appears inside times; only split where
// the remainder starts with a year.
static DATE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<start>.+?):(?P<end>\d{4}(?:-[0-9T:\-]*)?)$")
        .expect("valid date split regex")
});

/// Field keywords understood by the text language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Status,
    Method,
    Path,
    Crawler,
    Date,
}

impl FromStr for QueryField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "status" => Ok(QueryField::Status),
            "method" => Ok(QueryField::Method),
            "path" => Ok(QueryField::Path),
            "crawler" => Ok(QueryField::Crawler),
            "date" => Ok(QueryField::Date),
            _ => Err(s.to_string()),
        }
    }
}

impl QueryField {
    pub fn keyword(&self) -> &'static str {
        match self {
            QueryField::Status => "status",
            QueryField::Method => "method",
            QueryField::Path => "path",
            QueryField::Crawler => "crawler",
            QueryField::Date => "date",
        }
    }
}

/// Parse a text query into a filter model and its date range.
///
/// Never fails. Empty input yields an empty model.
pub fn parse(text: &str) -> (FilterModel, DateRange) {
    let mut model = FilterModel::new();

    for segment in AND_RE.split(text.trim()) {
        apply_segment(&mut model, segment);
    }

    let date_range = model.date_range.clone();
    (model, date_range)
}

/// Parse `text` and fold the result into existing control state.
pub fn parse_into(controls: &FilterModel, text: &str) -> FilterModel {
    let (parsed, _) = parse(text);
    controls.merge(&parsed)
}

fn apply_segment(model: &mut FilterModel, segment: &str) {
    let alternatives: Vec<&str> = OR_RE.split(segment.trim()).collect();
    let Some(first) = alternatives.first() else {
        return;
    };
    let Some(keyword) = FIELD_RE.captures(first).and_then(|caps| caps.get(1)) else {
        if !segment.trim().is_empty() {
            tracing::debug!(segment, "dropping clause without a field keyword");
        }
        return;
    };
    let field = match keyword.as_str().parse::<QueryField>() {
        Ok(field) => field,
        Err(unknown) => {
            tracing::debug!(field = %unknown, segment, "dropping clause with unknown field");
            return;
        }
    };

    match field {
        QueryField::Status => {
            for alternative in &alternatives {
                model.status.extend(scrape_statuses(alternative));
            }
        }
        QueryField::Method => {
            for alternative in &alternatives {
                model.method.extend(
                    WORD_RE
                        .find_iter(alternative)
                        .filter_map(|word| normalize_method(word.as_str()))
                        .map(str::to_string),
                );
            }
        }
        QueryField::Path | QueryField::Crawler => {
            let literals = alternatives
                .iter()
                .filter_map(|alternative| extract_literal(alternative, field));
            match TextPredicate::from_values(literals) {
                Some(predicate) if field == QueryField::Path => model.path = Some(predicate),
                Some(predicate) => model.crawler = Some(predicate),
                None => tracing::debug!(segment, "dropping text clause without a value"),
            }
        }
        QueryField::Date => {
            let Some((start, end)) = extract_operand(first).and_then(split_date_bounds) else {
                tracing::debug!(segment, "dropping date clause without a usable value");
                return;
            };
            if start.is_some() {
                model.date_range.start = start;
            }
            if end.is_some() {
                model.date_range.end = end;
            }
        }
    }
}

fn scrape_statuses(text: &str) -> impl Iterator<Item = u16> + '_ {
    DIGITS_RE
        .find_iter(text)
        .filter_map(|digits| digits.as_str().parse::<u16>().ok())
}

fn extract_operand(text: &str) -> Option<&str> {
    OPERAND_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|operand| operand.as_str())
}

/// Literal of one path/crawler alternative.
///
/// `path contains /a`, `path = /a` and the continuation form `/a` (after an
/// `OR` inside the same clause) all yield `/a`.
fn extract_literal(alternative: &str, field: QueryField) -> Option<String> {
    if let Some(operand) = extract_operand(alternative) {
        return Some(operand.to_string());
    }
    let mut tokens = alternative.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(token), None) if !token.eq_ignore_ascii_case(field.keyword()) => {
            Some(token.to_string())
        }
        _ => None,
    }
}

/// `(start, end)` of a date operand: `start`, `start:end` or `:end`.
///
/// A trailing `:` is ignored. `None` when neither bound is present.
pub(super) fn split_date_bounds(operand: &str) -> Option<(Option<String>, Option<String>)> {
    let token = DATE_TOKEN_RE.find(operand)?.as_str().trim_end_matches(':');
    if let Some(end) = token.strip_prefix(':') {
        let end = end.trim_start_matches(':');
        return (!end.is_empty()).then(|| (None, Some(end.to_string())));
    }
    if token.is_empty() {
        return None;
    }
    if let Some(caps) = DATE_SPLIT_RE.captures(token) {
        let start = caps["start"].trim_end_matches(':');
        return Some((Some(start.to_string()), Some(caps["end"].to_string())));
    }
    Some((Some(token.to_string()), None))
}
