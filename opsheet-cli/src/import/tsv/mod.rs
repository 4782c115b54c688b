//! Tab-separated import/export of operation collections
//!
//! Format:
//! - Header row `group<TAB>name<TAB>operation_type<TAB>prompt<TAB>description`
//! - One operation per line, same column order
//! - Tabs, newlines, carriage returns and backslashes inside values are
//!   written as `\t`, `\n`, `\r` and `\\` and decoded again on import

mod escape;
mod reader;
mod writer;

pub use escape::{escape_field, unescape_field};
pub use reader::{parse_tsv, ParsedSheet};
pub use writer::{export_snapshot, export_tsv};
