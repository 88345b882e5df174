//! Built-in workbook layouts.
//!
//! - `en`: English sheet and column names (default)
//! - `ja`: the Japanese names used by the source workbooks

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ConfigError, OutputSheetNames, PhaseLabels, WorkbookLayout};

/// Available layout presets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// English sheet and column names.
    #[default]
    En,
    /// Japanese sheet names (クラス分け / 配合表).
    Ja,
}

impl PresetName {
    pub const ALL: &'static [PresetName] = &[PresetName::En, PresetName::Ja];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::En => "en",
            PresetName::Ja => "ja",
        }
    }

    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(PresetName::En),
            "ja" | "jp" | "japanese" => Some(PresetName::Ja),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetName::En => "English sheet names: classification, mixture",
            PresetName::Ja => "Japanese sheet names: クラス分け, 配合表",
        }
    }

    /// The layout this preset stands for.
    pub fn layout(&self) -> WorkbookLayout {
        match self {
            PresetName::En => en_layout(),
            PresetName::Ja => ja_layout(),
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

fn en_layout() -> WorkbookLayout {
    WorkbookLayout {
        classification_sheet: "classification".into(),
        mixture_sheet: "mixture".into(),
        identifier_column: "TrendFactor".into(),
        class_column: "class".into(),
        phase_column: "phase".into(),
        bf_total_column: "BF total".into(),
        output_sheets: OutputSheetNames {
            classified: "classified_mixture".into(),
            totals: "class_phase_totals".into(),
            normalized: "class_phase_normalized".into(),
            bf_types: "class_bf_types".into(),
        },
        phase_labels: PhaseLabels {
            origin: "origin".into(),
            current: "current".into(),
            aspiration: "aspiration".into(),
        },
    }
}

fn ja_layout() -> WorkbookLayout {
    WorkbookLayout {
        classification_sheet: "クラス分け".into(),
        mixture_sheet: "配合表".into(),
        identifier_column: "TrendFactor".into(),
        class_column: "class".into(),
        phase_column: "time_category".into(),
        bf_total_column: "BF合計".into(),
        output_sheets: OutputSheetNames {
            classified: "クラス別配合表".into(),
            totals: "クラス別配合時制別合計表".into(),
            normalized: "クラス別時制別正規化配合表".into(),
            bf_types: "クラス別BFタイプ".into(),
        },
        phase_labels: PhaseLabels {
            origin: "本来性".into(),
            current: "現状".into(),
            aspiration: "志向性".into(),
        },
    }
}
