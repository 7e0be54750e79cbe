mod chips;
mod model;
mod parser;

pub use chips::{FilterChip, project, remove_chip, to_query_text};
pub use model::{DateRange, FilterKey, FilterModel, STORE_TIME_FORMAT, TextPredicate};
pub use parser::{QueryField, parse, parse_into};
