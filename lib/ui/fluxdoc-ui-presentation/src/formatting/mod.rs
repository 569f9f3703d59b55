//! Shared formatting helpers used by reports and CLI.

mod age;
mod report;
mod revision;
mod text;

pub use age::{format_age, format_age_since};
pub use report::TextReport;
pub use revision::{truncate_revision, value_or_none};
pub use text::{diagram_block, header, key_value, sub_header};
