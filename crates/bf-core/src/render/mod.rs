//! Human-facing renderings of pipeline results.

pub mod markdown;
pub mod summary;

pub use markdown::{rule_match_markdown, sheet_markdown, workbook_markdown};
pub use summary::{pipeline_summary, rule_match_summary};
