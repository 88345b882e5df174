//! BF-type pipeline common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - The fixed time phases and BF-type labels
//! - The workbook/sheet/cell interchange model
//! - The unified error type
//! - Output format specifications

pub mod bf_type;
pub mod error;
pub mod output;
pub mod phase;
pub mod workbook;

pub use bf_type::BfType;
pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;
pub use phase::{phase_sort_key, Phase};
pub use workbook::{Cell, Sheet, Workbook};

/// Schema version of the workbook JSON format.
pub const SCHEMA_VERSION: &str = "1.0.0";
