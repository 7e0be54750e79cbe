use super::model::{DateRange, FilterKey, FilterModel, TextPredicate};
use super::parser::split_date_bounds;
use serde::Serialize;

/// Display summary of one active constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChip {
    pub label: String,
    pub key: String,
}

impl FilterChip {
    fn new(key: FilterKey, label: String) -> Self {
        Self {
            label,
            key: key.as_str().to_string(),
        }
    }
}

/// One chip per non-empty field: crawler, path, method, status, date range.
pub fn project(model: &FilterModel) -> Vec<FilterChip> {
    let mut chips = Vec::new();

    if let Some(crawler) = &model.crawler {
        chips.push(FilterChip::new(
            FilterKey::Crawler,
            format!("Crawler: {}", predicate_label(crawler)),
        ));
    }
    if let Some(path) = &model.path {
        chips.push(FilterChip::new(
            FilterKey::Path,
            format!("Path: {}", predicate_label(path)),
        ));
    }
    if !model.method.is_empty() {
        let methods: Vec<&str> = model.method.iter().map(String::as_str).collect();
        chips.push(FilterChip::new(
            FilterKey::Method,
            format!("Method: {}", methods.join(", ")),
        ));
    }
    if !model.status.is_empty() {
        let statuses: Vec<String> = model.status.iter().map(u16::to_string).collect();
        chips.push(FilterChip::new(
            FilterKey::Status,
            format!("Status: {}", statuses.join(", ")),
        ));
    }
    if let Some(label) = date_label(&model.date_range) {
        chips.push(FilterChip::new(FilterKey::DateRange, label));
    }

    chips
}

/// Model without the constraint behind `chip`. Unknown keys change nothing.
pub fn remove_chip(model: &FilterModel, chip: &FilterChip) -> FilterModel {
    match chip.key.parse::<FilterKey>() {
        Ok(key) => model.without(key),
        Err(_) => model.clone(),
    }
}

/// Rebuild a text query that parses back to the same constraints.
///
/// Some values have no textual form and are left out: literals containing
/// whitespace, literals equal to `and` / `or` (any case), and date ranges
/// whose bounds would split differently when parsed back.
pub fn to_query_text(model: &FilterModel) -> String {
    let mut clauses = Vec::new();

    if let Some(crawler) = &model.crawler {
        push_text_clause(&mut clauses, "crawler", crawler);
    }
    if let Some(path) = &model.path {
        push_text_clause(&mut clauses, "path", path);
    }
    if !model.method.is_empty() {
        let terms: Vec<String> = model
            .method
            .iter()
            .map(|method| format!("method = {method}"))
            .collect();
        clauses.push(terms.join(" OR "));
    }
    if !model.status.is_empty() {
        let terms: Vec<String> = model
            .status
            .iter()
            .map(|status| format!("status = {status}"))
            .collect();
        clauses.push(terms.join(" OR "));
    }
    if let Some(clause) = date_clause(&model.date_range) {
        clauses.push(clause);
    }

    clauses.join(" AND ")
}

fn push_text_clause(clauses: &mut Vec<String>, field: &str, predicate: &TextPredicate) {
    let terms: Vec<String> = predicate
        .values()
        .iter()
        .filter(|value| is_expressible_literal(value))
        .map(|value| format!("{field} contains {value}"))
        .collect();
    if !terms.is_empty() {
        clauses.push(terms.join(" OR "));
    }
}

// The parser splits on whitespace and on the AND / OR separators.
fn is_expressible_literal(value: &str) -> bool {
    !value.is_empty()
        && !value.contains(char::is_whitespace)
        && !value.eq_ignore_ascii_case("and")
        && !value.eq_ignore_ascii_case("or")
}

fn date_clause(range: &DateRange) -> Option<String> {
    let operand = match (&range.start, &range.end) {
        (Some(start), Some(end)) => format!("{start}:{end}"),
        (Some(start), None) => start.clone(),
        (None, Some(end)) => format!(":{end}"),
        (None, None) => return None,
    };
    let bounds = (range.start.clone(), range.end.clone());
    (split_date_bounds(&operand) == Some(bounds)).then(|| format!("date = {operand}"))
}

fn predicate_label(predicate: &TextPredicate) -> String {
    predicate.values().join(" OR ")
}

fn date_label(range: &DateRange) -> Option<String> {
    match (&range.start, &range.end) {
        (Some(start), Some(end)) => Some(format!("Date: {start} to {end}")),
        (Some(start), None) => Some(format!("Date: from {start}")),
        (None, Some(end)) => Some(format!("Date: until {end}")),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_model_has_no_chips() {
        assert!(project(&FilterModel::new()).is_empty());
    }

    #[test]
    fn test_chip_order_and_labels() {
        let model = FilterModel::new()
            .with_statuses([404, 500])
            .with_method("GET")
            .with_path(TextPredicate::from_values(["/a", "/b"]))
            .with_crawler(TextPredicate::from_values(["Googlebot"]))
            .with_date_range(DateRange::new(None::<String>, Some("2024-02-01")));

        let chips = project(&model);
        let keys: Vec<&str> = chips.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["crawler", "path", "method", "status", "dateRange"]);

        let labels: Vec<&str> = chips.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Crawler: Googlebot",
                "Path: /a OR /b",
                "Method: GET",
                "Status: 404, 500",
                "Date: until 2024-02-01",
            ]
        );
    }

    #[test]
    fn test_remove_chip() {
        let model = FilterModel::new().with_method("GET").with_status(404);
        let chips = project(&model);
        let without_method = remove_chip(&model, &chips[0]);
        assert!(without_method.method.is_empty());
        assert_eq!(without_method.status.len(), 1);
    }

    #[test]
    fn test_query_text_skips_separator_literals() {
        let model = FilterModel::new()
            .with_crawler(TextPredicate::from_values(["or", "bot"]))
            .with_path(TextPredicate::from_values(["AND"]))
            .with_method("GET");
        assert_eq!(
            to_query_text(&model),
            "crawler contains bot AND method = GET"
        );
    }

    #[test]
    fn test_query_text_date_forms() {
        let both = FilterModel::new()
            .with_date_range(DateRange::new(Some("2024-01-01"), Some("2024-01-31")));
        assert_eq!(to_query_text(&both), "date = 2024-01-01:2024-01-31");

        let end_only =
            FilterModel::new().with_date_range(DateRange::new(None::<String>, Some("2024-01-31")));
        assert_eq!(to_query_text(&end_only), "date = :2024-01-31");

        // "2024-01-01:10:00" would parse back as a single start bound
        let ambiguous =
            FilterModel::new().with_date_range(DateRange::new(Some("2024-01-01"), Some("10:00")));
        assert_eq!(to_query_text(&ambiguous), "");

        let not_a_date =
            FilterModel::new().with_date_range(DateRange::new(Some("yesterday"), None::<String>));
        assert_eq!(to_query_text(&not_a_date), "");
    }

    #[test]
    fn test_query_text_skips_whitespace_literals() {
        let model = FilterModel::new()
            .with_path(TextPredicate::from_values(["/a b", "/c"]))
            .with_status(200);
        assert_eq!(to_query_text(&model), "path contains /c AND status = 200");
    }
}
