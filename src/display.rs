use crate::filter::{FilterChip, FilterModel};
use crate::query::QueryRequest;
use crate::registry::{HTTP_METHODS, STATUS_PRESETS, all_columns};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;
use std::fmt::Write as _;

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Everything the `parse` and `compile` commands report, for JSON output
#[derive(Debug, Serialize)]
pub struct FilterReport<'a> {
    pub model: &'a FilterModel,
    pub chips: &'a [FilterChip],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<&'a QueryRequest>,
}

/// Warnings for values the form controls would not offer.
///
/// They do not block compilation; the values are still bound as given.
pub fn filter_warnings(model: &FilterModel) -> Vec<String> {
    let mut warnings = Vec::new();
    for method in &model.method {
        if !HTTP_METHODS.contains(&method.as_str()) {
            warnings.push(format!(
                "Unknown HTTP method '{}'. Known methods are: {}",
                method,
                HTTP_METHODS.join(", ")
            ));
        }
    }
    for status in &model.status {
        if !(100..=599).contains(status) {
            warnings.push(format!("Status {} is outside the HTTP range 100-599", status));
        }
    }
    warnings
}

pub fn print_filter_warnings(model: &FilterModel) {
    for warning in filter_warnings(model) {
        eprintln!("{} {}", "Warning:".yellow().bold(), warning);
    }
}

pub fn format_chips_text(chips: &[FilterChip]) -> String {
    if chips.is_empty() {
        return format!("{}\n", "No active filters".dimmed());
    }
    let mut table = create_styled_table(&["Filter", "Key"]);
    for chip in chips {
        table.add_row(vec![Cell::new(&chip.label), Cell::new(&chip.key)]);
    }
    format!("{table}\n")
}

pub fn format_request_text(request: &QueryRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Query".bold().bright_blue());
    let _ = writeln!(out, "  {}", request.query_with_limit().bright_white());
    if request.params.is_empty() {
        let _ = writeln!(out, "{} {}", "Params".bold().bright_blue(), "none".dimmed());
    } else {
        let _ = writeln!(out, "{}", "Params".bold().bright_blue());
        for (i, param) in request.params.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {}", i + 1, param.to_string().green());
        }
    }
    out
}

pub fn format_columns_text() -> String {
    let mut table = create_styled_table(&["Column", "Filterable", "Sortable"]);
    for column in all_columns() {
        table.add_row(vec![Cell::new(column.as_str()), Cell::new("yes"), Cell::new("yes")]);
    }

    let statuses: Vec<String> = STATUS_PRESETS.iter().map(u16::to_string).collect();
    let mut out = format!("{table}\n");
    let _ = writeln!(out, "{} {}", "Methods:".bold(), HTTP_METHODS.join(", "));
    let _ = writeln!(out, "{} {}", "Status presets:".bold(), statuses.join(", "));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_warnings() {
        let model = FilterModel::new()
            .with_method("GET")
            .with_method("PATCH")
            .with_status(404)
            .with_status(42);
        let warnings = filter_warnings(&model);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("PATCH"));
        assert!(warnings[1].contains("42"));
    }

    #[test]
    fn test_request_text_lists_params() {
        let request = QueryRequest {
            query: "SELECT * FROM access_logs WHERE log_file_id = ?".to_string(),
            params: vec!["f1".into()],
            limit: 10,
        };
        let text = format_request_text(&request);
        assert!(text.contains("SELECT * FROM access_logs WHERE log_file_id = ? LIMIT 10"));
        // each piece is styled as a whole, so these hold with or without color
        assert!(text.contains(" 1. "));
        assert!(text.contains(r#""f1""#));
    }
}
