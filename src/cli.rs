mod output;

use crate::query::TimeBucket;
use clap::{ArgAction, Parser, Subcommand};
pub use output::{ColorMode, OutputFormat};
use std::path::PathBuf;

/// Turn dashboard log filters into parameterized SQL for the access log store
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file (table name, page sizes, LIKE escaping)
    #[arg(long, global = true, env = "LOG_QUERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to color text output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a text query and show the resulting filters
    Parse {
        /// Query such as `status=404 OR 500 AND path contains /api`
        text: String,
    },
    /// Build the SQL for a set of filters
    Compile {
        /// Text query merged on top of the individual filter flags
        #[arg(short = 'e', long)]
        query: Option<String>,

        /// HTTP method to include (repeatable)
        #[arg(long = "method", value_name = "METHOD")]
        methods: Vec<String>,

        /// Status code to include (repeatable)
        #[arg(long = "status", value_name = "CODE")]
        statuses: Vec<u16>,

        /// Substring of the crawler name (repeat for OR)
        #[arg(long = "crawler", value_name = "TEXT")]
        crawlers: Vec<String>,

        /// Substring of the request path (repeat for OR)
        #[arg(long = "path", value_name = "TEXT")]
        paths: Vec<String>,

        /// Inclusive lower time bound
        #[arg(long, conflicts_with = "last_hours")]
        start: Option<String>,

        /// Inclusive upper time bound
        #[arg(long)]
        end: Option<String>,

        /// Only rows from the last N hours
        #[arg(long, value_name = "HOURS")]
        last_hours: Option<u32>,

        /// Log file id to scope the query to
        #[arg(long)]
        scope: Option<String>,

        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction (asc or desc)
        #[arg(long)]
        order: Option<String>,

        /// 1-based page number
        #[arg(long)]
        page: Option<u32>,

        /// Rows per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<u32>,

        /// Build the total row count query instead of the row query
        #[arg(long, conflicts_with_all = ["histogram", "page", "page_size"])]
        count: bool,

        /// Build the time histogram query instead of the row query
        #[arg(long, conflicts_with_all = ["page", "page_size"])]
        histogram: bool,

        /// Histogram bucket width (defaults to the configured bucket)
        #[arg(long, value_enum, requires = "histogram")]
        bucket: Option<TimeBucket>,
    },
    /// List filterable columns, HTTP methods and status presets
    Columns,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeatable_filters() {
        let cli = Cli::try_parse_from([
            "log-query",
            "compile",
            "--method",
            "GET",
            "--method",
            "POST",
            "--status",
            "404",
            "--scope",
            "f1",
        ])
        .unwrap();
        match cli.command {
            Commands::Compile {
                methods,
                statuses,
                scope,
                ..
            } => {
                assert_eq!(methods, vec!["GET", "POST"]);
                assert_eq!(statuses, vec![404]);
                assert_eq!(scope.as_deref(), Some("f1"));
            }
            _ => panic!("expected compile command"),
        }
    }

    #[test]
    fn test_count_conflicts_with_page() {
        let result = Cli::try_parse_from(["log-query", "compile", "--count", "--page", "2"]);
        assert!(result.is_err());
    }
}
