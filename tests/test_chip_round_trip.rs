use log_query::filter::{
    DateRange, FilterModel, TextPredicate, parse, project, remove_chip, to_query_text,
};

fn sample_model() -> FilterModel {
    FilterModel::new()
        .with_crawler(TextPredicate::from_values(["Googlebot", "AhrefsBot"]))
        .with_path(TextPredicate::from_values(["/wp-admin"]))
        .with_methods(["GET", "POST"])
        .with_statuses([404, 500, 403])
        .with_date_range(DateRange::new(Some("2024-05-01T00:00"), Some("2024-05-02T00:00")))
}

#[test]
fn test_round_trip_preserves_sets() {
    let model = sample_model();
    let text = to_query_text(&model);
    let (reparsed, range) = parse(&text);

    assert_eq!(
        reparsed.method.iter().collect::<Vec<_>>(),
        model.method.iter().collect::<Vec<_>>()
    );
    assert_eq!(
        reparsed.status.iter().collect::<Vec<_>>(),
        model.status.iter().collect::<Vec<_>>()
    );
    assert_eq!(reparsed.crawler, model.crawler);
    assert_eq!(reparsed.path, model.path);
    assert_eq!(range, model.date_range);
    assert_eq!(project(&reparsed), project(&model));
}

#[test]
fn test_chips_follow_field_order() {
    let chips = project(&sample_model());
    let keys: Vec<&str> = chips.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["crawler", "path", "method", "status", "dateRange"]);
    assert_eq!(chips[0].label, "Crawler: Googlebot OR AhrefsBot");
    assert_eq!(chips[4].label, "Date: 2024-05-01T00:00 to 2024-05-02T00:00");
}

#[test]
fn test_removing_every_chip_empties_model() {
    let mut model = sample_model();
    while let Some(chip) = project(&model).into_iter().next() {
        model = remove_chip(&model, &chip);
    }
    assert!(model.is_empty());
    assert_eq!(to_query_text(&model), "");
}

#[test]
fn test_projection_is_read_only() {
    let model = sample_model();
    let before = model.clone();
    let _ = project(&model);
    let _ = project(&model);
    assert_eq!(model, before);
}

#[test]
fn test_separator_literals_do_not_swallow_other_clauses() {
    let model = FilterModel::new()
        .with_path(TextPredicate::from_values(["and"]))
        .with_crawler(TextPredicate::from_values(["or", "bot"]))
        .with_method("GET")
        .with_status(404);
    let (reparsed, _) = parse(&to_query_text(&model));

    assert_eq!(
        reparsed.method.iter().collect::<Vec<_>>(),
        model.method.iter().collect::<Vec<_>>()
    );
    assert_eq!(
        reparsed.status.iter().collect::<Vec<_>>(),
        model.status.iter().collect::<Vec<_>>()
    );
    assert!(reparsed.path.is_none());
    assert_eq!(reparsed.crawler, Some(TextPredicate::Single("bot".to_string())));
}

#[test]
fn test_date_round_trip_keeps_bounds_or_drops_them() {
    for range in [
        DateRange::new(Some("2024-01-01T10:00"), Some("2024-01-02T08:30")),
        DateRange::new(Some("2024-01-01"), None::<String>),
        DateRange::new(None::<String>, Some("2024-01-31")),
        DateRange::new(Some("2024"), Some("2025")),
    ] {
        let model = FilterModel::new().with_date_range(range.clone());
        let (_, reparsed) = parse(&to_query_text(&model));
        assert_eq!(reparsed, range);
    }

    let model = FilterModel::new()
        .with_date_range(DateRange::new(Some("2024-01-01"), Some("10:00")))
        .with_status(500);
    let (reparsed, range) = parse(&to_query_text(&model));
    assert!(range.is_empty());
    assert_eq!(reparsed.status.iter().copied().collect::<Vec<_>>(), vec![500]);
}
