//! Workbook layout configuration.
//!
//! A layout names the two input sheets, the columns the pipeline reads, and
//! the sheet names and phase labels used for output. Layout files are JSON;
//! any key they omit is taken from the selected preset, so a file holding
//! only `{"mixture_sheet": "data"}` is valid.

pub mod preset;
pub mod resolve;

pub use preset::PresetName;
pub use resolve::{resolve_layout_path, xdg_config_dir, ConfigSource};

use std::path::{Path, PathBuf};

use bf_common::Phase;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::logging::event_names;

/// Errors that can occur while loading a layout.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("layout file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("invalid JSON in layout file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("unknown preset '{0}', available: {available}", available = preset_list())]
    UnknownPreset(String),
}

fn preset_list() -> String {
    PresetName::ALL
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<ConfigError> for bf_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(msg) => bf_common::Error::InvalidLayout(msg),
            other => bf_common::Error::Config(other.to_string()),
        }
    }
}

/// Names of the four output sheets, in write order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSheetNames {
    pub classified: String,
    pub totals: String,
    pub normalized: String,
    pub bf_types: String,
}

impl OutputSheetNames {
    pub fn in_order(&self) -> [&str; 4] {
        [
            self.classified.as_str(),
            self.totals.as_str(),
            self.normalized.as_str(),
            self.bf_types.as_str(),
        ]
    }
}

/// How each phase is written in the phase column of output sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseLabels {
    pub origin: String,
    pub current: String,
    pub aspiration: String,
}

impl PhaseLabels {
    pub fn label(&self, phase: Phase) -> &str {
        match phase {
            Phase::Origin => &self.origin,
            Phase::Current => &self.current,
            Phase::Aspiration => &self.aspiration,
        }
    }
}

/// Sheet and column names for one workbook dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookLayout {
    pub classification_sheet: String,
    pub mixture_sheet: String,
    /// Trend-factor identifier column, in both input sheets.
    pub identifier_column: String,
    pub class_column: String,
    /// Output-only: phase column of the classified and aggregate sheets.
    pub phase_column: String,
    /// Output-only: BF total column of the aggregate sheet.
    pub bf_total_column: String,
    pub output_sheets: OutputSheetNames,
    pub phase_labels: PhaseLabels,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        PresetName::default().layout()
    }
}

impl WorkbookLayout {
    /// Parse a layout document, filling omitted keys from `base`.
    pub fn from_json_over(base: &WorkbookLayout, text: &str) -> Result<Self, serde_json::Error> {
        let overlay: serde_json::Value = serde_json::from_str(text)?;
        let mut merged = serde_json::to_value(base)?;
        merge_json(&mut merged, overlay);
        serde_json::from_value(merged)
    }

    /// Reject layouts the reader or writer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("classification_sheet", &self.classification_sheet),
            ("mixture_sheet", &self.mixture_sheet),
            ("identifier_column", &self.identifier_column),
            ("class_column", &self.class_column),
            ("phase_column", &self.phase_column),
            ("bf_total_column", &self.bf_total_column),
            ("output_sheets.classified", &self.output_sheets.classified),
            ("output_sheets.totals", &self.output_sheets.totals),
            ("output_sheets.normalized", &self.output_sheets.normalized),
            ("output_sheets.bf_types", &self.output_sheets.bf_types),
            ("phase_labels.origin", &self.phase_labels.origin),
            ("phase_labels.current", &self.phase_labels.current),
            ("phase_labels.aspiration", &self.phase_labels.aspiration),
        ];
        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }

        if self.classification_sheet == self.mixture_sheet {
            return Err(ConfigError::Invalid(format!(
                "classification and mixture sheets are both named '{}'",
                self.mixture_sheet
            )));
        }
        if self.class_column == self.identifier_column {
            return Err(ConfigError::Invalid(format!(
                "class column and identifier column are both named '{}'",
                self.class_column
            )));
        }
        if self.phase_column == self.class_column || self.bf_total_column == self.class_column {
            return Err(ConfigError::Invalid(
                "phase and BF total columns must differ from the class column".to_string(),
            ));
        }

        let sheets = self.output_sheets.in_order();
        for (i, name) in sheets.iter().enumerate() {
            if sheets[..i].contains(name) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate output sheet name '{}'",
                    name
                )));
            }
        }

        let labels: Vec<&str> = Phase::all()
            .iter()
            .map(|p| self.phase_labels.label(*p))
            .collect();
        if labels[0] == labels[1] || labels[1] == labels[2] || labels[0] == labels[2] {
            return Err(ConfigError::Invalid(
                "phase labels must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}

fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Load and validate a layout file over a preset.
pub fn load_layout(path: &Path, base: &WorkbookLayout) -> Result<WorkbookLayout, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let layout =
        WorkbookLayout::from_json_over(base, &text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    layout.validate()?;
    Ok(layout)
}

/// A layout together with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLayout {
    pub layout: WorkbookLayout,
    pub preset: PresetName,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
}

/// Resolve the layout for this invocation from the process environment.
pub fn resolve_layout(
    cli_path: Option<&Path>,
    preset: PresetName,
) -> Result<ResolvedLayout, ConfigError> {
    resolve_layout_with(
        cli_path,
        preset,
        |key| std::env::var(key).ok(),
        xdg_config_dir(),
    )
}

/// [`resolve_layout`] with injectable environment and XDG directory.
pub fn resolve_layout_with(
    cli_path: Option<&Path>,
    preset: PresetName,
    env: impl Fn(&str) -> Option<String>,
    xdg_dir: Option<PathBuf>,
) -> Result<ResolvedLayout, ConfigError> {
    let base = preset.layout();
    let (path, source) = resolve_layout_path(cli_path, env, xdg_dir)?;

    let layout = match &path {
        Some(p) => {
            let layout = load_layout(p, &base)?;
            info!(
                event = event_names::CONFIG_LOADED,
                path = %p.display(),
                source = %source,
                "layout loaded"
            );
            layout
        }
        None => {
            debug!(
                event = event_names::CONFIG_DEFAULT_USED,
                preset = %preset,
                "using built-in layout"
            );
            base
        }
    };

    Ok(ResolvedLayout {
        layout,
        preset,
        source,
        path,
    })
}
