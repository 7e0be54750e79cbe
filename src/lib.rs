pub mod cli;
pub mod config;
pub mod display;
pub mod filter;
pub mod query;
pub mod registry;

use crate::config::LogQueryConfig;
use crate::display::{
    FilterReport, format_chips_text, format_columns_text, format_request_text,
    print_filter_warnings,
};
use anyhow::Context;
pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
pub use filter::{
    DateRange, FilterChip, FilterModel, TextPredicate, parse, parse_into, project, to_query_text,
};
pub use query::{
    CompiledQuery, Pagination, QueryCompiler, QueryError, QueryRequest, SortDirection, SortSpec,
    SqlValue, TimeBucket, compile, compile_count, compile_histogram, compile_page,
};
pub use registry::{Column, all_columns, is_filterable, is_sortable};
use tracing_subscriber::EnvFilter;

const ENV_LOG: &str = "LOG_QUERY_LOG";

fn init_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_filter.to_string());

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_env_filter(EnvFilter::new(filter))
        .init();
}

/// Filter flags of the `compile` command, before merging with the text query
struct ControlState<'a> {
    methods: &'a [String],
    statuses: &'a [u16],
    crawlers: &'a [String],
    paths: &'a [String],
    start: Option<&'a str>,
    end: Option<&'a str>,
    last_hours: Option<u32>,
}

impl ControlState<'_> {
    fn to_model(&self) -> FilterModel {
        let date_range = match self.last_hours {
            Some(hours) => DateRange {
                end: self.end.map(str::to_string),
                ..DateRange::last_hours(hours, chrono::Local::now())
            },
            None => DateRange::new(self.start, self.end),
        };

        FilterModel::new()
            .with_methods(self.methods.iter().map(|m| m.to_uppercase()))
            .with_statuses(self.statuses.iter().copied())
            .with_crawler(TextPredicate::from_values(self.crawlers.iter().cloned()))
            .with_path(TextPredicate::from_values(self.paths.iter().cloned()))
            .with_date_range(date_range)
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn print_report(report: &FilterReport<'_>, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Text => {
            print!("{}", format_chips_text(report.chips));
            if let Some(request) = report.request {
                print!("{}", format_request_text(request));
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_request(
    config: &LogQueryConfig,
    model: &FilterModel,
    sort: &SortSpec,
    scope: Option<&str>,
    page: Option<u32>,
    page_size: Option<u32>,
    count: bool,
    histogram: Option<TimeBucket>,
) -> anyhow::Result<QueryRequest> {
    let compiler = QueryCompiler::from_config(config);
    let compiled = if count {
        compiler.compile_count(model, scope)
    } else if let Some(bucket) = histogram {
        compiler.compile_histogram(model, scope, bucket)
    } else if page.is_some() || page_size.is_some() {
        let pagination = Pagination::new(
            page.unwrap_or(1),
            page_size.unwrap_or(config.pagination.default_page_size),
        );
        compiler
            .compile_page(model, sort, scope, pagination)
            .context("Invalid pagination")?
    } else {
        compiler.compile(model, sort, scope)
    };

    tracing::debug!(
        placeholders = compiled.placeholder_count(),
        params = compiled.params.len(),
        "compiled query"
    );

    QueryRequest::new(compiled, config.request.row_limit).context("Compiled query was rejected")
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_logging(cli.verbose, cli.quiet);
    cli.color.apply();

    let config = config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    tracing::info!(profile = %config.profile_name, table = config.table.as_str(), "config ready");

    match &cli.command {
        Commands::Parse { text } => {
            let (model, _) = parse(text);
            if !cli.quiet {
                print_filter_warnings(&model);
            }
            let chips = project(&model);
            let report = FilterReport {
                model: &model,
                chips: &chips,
                request: None,
            };
            print_report(&report, cli.format)?;
        }
        Commands::Compile {
            query,
            methods,
            statuses,
            crawlers,
            paths,
            start,
            end,
            last_hours,
            scope,
            sort,
            order,
            page,
            page_size,
            count,
            histogram,
            bucket,
        } => {
            let controls = ControlState {
                methods,
                statuses,
                crawlers,
                paths,
                start: start.as_deref(),
                end: end.as_deref(),
                last_hours: *last_hours,
            }
            .to_model();
            let model = match query {
                Some(text) => parse_into(&controls, text),
                None => controls,
            };
            if !cli.quiet {
                print_filter_warnings(&model);
            }

            let sort = SortSpec::new(sort.as_deref(), order.as_deref());
            let histogram = histogram.then(|| bucket.unwrap_or(config.histogram.default_bucket));
            let request = build_request(
                &config,
                &model,
                &sort,
                scope.as_deref(),
                *page,
                *page_size,
                *count,
                histogram,
            )?;

            let chips = project(&model);
            let report = FilterReport {
                model: &model,
                chips: &chips,
                request: Some(&request),
            };
            print_report(&report, cli.format)?;
        }
        Commands::Columns => match cli.format {
            OutputFormat::Json => {
                let columns: Vec<&str> = all_columns().iter().map(Column::as_str).collect();
                print_json(&serde_json::json!({
                    "columns": columns,
                    "methods": registry::HTTP_METHODS,
                    "statusPresets": registry::STATUS_PRESETS,
                }))?;
            }
            OutputFormat::Text => print!("{}", format_columns_text()),
        },
    }

    Ok(())
}
