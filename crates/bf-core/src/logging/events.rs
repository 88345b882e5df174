//! JSONL record shape, stage names and event names.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            Level::Error
        } else if level == tracing::Level::WARN {
            Level::Warn
        } else if level == tracing::Level::INFO {
            Level::Info
        } else if level == tracing::Level::DEBUG {
            Level::Debug
        } else {
            Level::Trace
        }
    }
}

/// Step of a run, recorded on `stage` spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Layout resolution.
    Init,
    /// Workbook parsing into input tables.
    Read,
    Merge,
    Aggregate,
    Normalize,
    Classify,
    /// Output workbook file.
    Write,
    /// Parquet files.
    Export,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Read => "read",
            Stage::Merge => "merge",
            Stage::Aggregate => "aggregate",
            Stage::Normalize => "normalize",
            Stage::Classify => "classify",
            Stage::Write => "write",
            Stage::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of the `event` field.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_FAILED: &str = "run.failed";

    pub const WORKBOOK_LOADED: &str = "workbook.loaded";
    pub const COLUMNS_EXCLUDED: &str = "read.columns_excluded";

    pub const MERGE_FINISHED: &str = "merge.finished";
    pub const MERGE_DUPLICATE_ID: &str = "merge.duplicate_id";
    pub const MERGE_NO_OVERLAP: &str = "merge.no_overlap";
    pub const AGGREGATE_FINISHED: &str = "aggregate.finished";
    pub const NORMALIZE_FINISHED: &str = "normalize.finished";
    pub const CLASSIFY_FINISHED: &str = "classify.finished";

    pub const OUTPUT_WRITTEN: &str = "output.written";
    pub const EXPORT_FINISHED: &str = "export.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
}

/// One line of `--log-format jsonl` output.
///
/// `run_id` and `stage` are filled from the enclosing spans; every other
/// event field lands in `fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: Level,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
}

impl LogEvent {
    pub fn new(level: Level, event: impl Into<String>, message: impl Into<String>) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: None,
            stage: None,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn to_jsonl(&self) -> String {
        match serde_json::to_string(self) {
            Ok(line) => line,
            Err(_) => serde_json::json!({ "event": self.event, "level": self.level }).to_string(),
        }
    }
}
