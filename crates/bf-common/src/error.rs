//! Pipeline errors.
//!
//! Every [`Error`] carries a numeric code that never changes between
//! releases, a coarse [`ErrorCategory`] and a one-line fix hint. The CLI
//! prints either the human block
//!
//! ```text
//! ✗ Missing Input Sheet
//!   Reason: required sheet not found: mixture
//!   Fix: Check the sheet names in the workbook, or pick a layout with '--preset'.
//! ```
//!
//! or the [`StructuredError`] JSON object
//!
//! ```json
//! {"code":10,"category":"input","message":"required sheet not found: mixture","context":{"sheet":"mixture"}}
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error grouping; decides the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The workbook does not have the expected shape.
    Input,
    /// The layout could not be resolved.
    Config,
    Pipeline,
    Export,
    Io,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Config => "config",
            ErrorCategory::Pipeline => "pipeline",
            ErrorCategory::Export => "export",
            ErrorCategory::Io => "io",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("required sheet not found: {sheet}")]
    MissingSheet { sheet: String },

    #[error("required column '{column}' not found in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    /// `row` is the 1-based spreadsheet row, header included.
    #[error("empty trend-factor identifier in sheet '{sheet}' at row {row}")]
    EmptyIdentifier { sheet: String, row: usize },

    #[error("malformed workbook: {0}")]
    MalformedWorkbook(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid workbook layout: {0}")]
    InvalidLayout(String),

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable numeric code. Tens digit: 1 input, 2 config, 3 pipeline,
    /// 4 export, 6 I/O.
    pub fn code(&self) -> u32 {
        match self {
            Error::MissingSheet { .. } => 10,
            Error::MissingColumn { .. } => 11,
            Error::EmptyIdentifier { .. } => 12,
            Error::MalformedWorkbook(_) => 13,
            Error::Config(_) => 20,
            Error::InvalidLayout(_) => 21,
            Error::NumericalInstability(_) => 30,
            Error::Export(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.code() / 10 {
            1 => ErrorCategory::Input,
            2 => ErrorCategory::Config,
            3 => ErrorCategory::Pipeline,
            4 => ErrorCategory::Export,
            _ => ErrorCategory::Io,
        }
    }

    /// What the user can do about it.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::MissingSheet { .. } => {
                "Check the sheet names in the workbook, or pick a layout with '--preset'."
            }
            Error::MissingColumn { .. } => {
                "Add the column to the sheet header, or rename it in a layout file."
            }
            Error::EmptyIdentifier { .. } => {
                "Give the row a trend-factor identifier, or delete the row."
            }
            Error::MalformedWorkbook(_) => {
                "Expected an object with a 'sheets' array; see 'bf-core run --help'."
            }
            Error::Config(_) | Error::InvalidLayout(_) => {
                "Inspect the resolved layout with 'bf-core layout show'."
            }
            Error::NumericalInstability(_) => {
                "Look for extreme magnitudes in the mixture sheet."
            }
            Error::Export(_) => "Make sure the Parquet directory is writable.",
            Error::Io(_) => "Check the path and its permissions.",
            Error::Json(_) => "The file is not valid JSON.",
        }
    }

    /// Title line of the human error block.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::MissingSheet { .. } => "Missing Input Sheet",
            Error::MissingColumn { .. } => "Missing Input Column",
            Error::EmptyIdentifier { .. } => "Empty Identifier",
            Error::MalformedWorkbook(_) => "Malformed Workbook",
            Error::Config(_) => "Configuration Error",
            Error::InvalidLayout(_) => "Invalid Layout",
            Error::NumericalInstability(_) => "Numerical Instability",
            Error::Export(_) => "Export Failed",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }

    /// Location fields worth repeating in machine output.
    fn location(&self) -> Vec<(&'static str, Value)> {
        match self {
            Error::MissingSheet { sheet } => vec![("sheet", Value::from(sheet.as_str()))],
            Error::MissingColumn { sheet, column } => vec![
                ("sheet", Value::from(sheet.as_str())),
                ("column", Value::from(column.as_str())),
            ],
            Error::EmptyIdentifier { sheet, row } => vec![
                ("sheet", Value::from(sheet.as_str())),
                ("row", Value::from(*row)),
            ],
            _ => Vec::new(),
        }
    }
}

/// JSON form of an [`Error`], as printed on stderr.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            context: err
                .location()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

impl StructuredError {
    /// Attach an extra context entry. Values that fail to serialize are skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Single-line JSON.
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(_) => format!("{{\"code\":{},\"category\":\"{}\"}}", self.code, self.category),
        }
    }
}

/// Three-line stderr block: headline, reason, fix.
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let paint = |code: &str, text: &str| {
        if use_color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    out.push_str(&paint("31", "✗"));
    out.push(' ');
    out.push_str(err.headline());
    out.push_str("\n  Reason: ");
    out.push_str(&err.to_string());
    out.push_str("\n  ");
    out.push_str(&paint("36", "Fix:"));
    out.push(' ');
    out.push_str(err.remediation());
    out
}
