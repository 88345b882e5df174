//! Process exit codes.
//!
//! 0 is success, 10-19 are problems the user can fix in the arguments,
//! the workbook or the layout, 20-29 are internal or filesystem failures.

use std::fmt;

use bf_common::{Error, ErrorCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Clean = 0,
    /// Command line rejected by the parser.
    ArgsError = 10,
    /// Workbook is missing a sheet, a column or an identifier.
    InputError = 11,
    ConfigError = 12,
    InternalError = 20,
    /// Reading, writing or exporting failed.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Symbolic name reported alongside the number in JSON errors.
    pub fn code_name(self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    pub fn for_error(error: &Error) -> Self {
        match error.category() {
            ErrorCategory::Input => ExitCode::InputError,
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Pipeline => ExitCode::InternalError,
            ErrorCategory::Export | ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
