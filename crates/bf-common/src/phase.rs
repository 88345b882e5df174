//! Time phases of a trend factor.
//!
//! Every trend-factor identifier names exactly one of three phases. The
//! phase is recovered from the identifier text by an unanchored substring
//! search over each phase's aliases, tried in canonical order:
//! origin, then current, then aspiration. The first phase with a matching
//! alias wins, so `"origin-vs-current"` is an origin factor.
//!
//! Aliases cover the English names and the labels used in the Japanese
//! source workbooks (本来性 / 現状 / 志向性).

use serde::{Deserialize, Serialize};

/// One of the three fixed time phases.
///
/// The derived ordering (`Origin < Current < Aspiration`) is the display and
/// processing order. It carries no numeric meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The inherent, original state (本来性).
    Origin,
    /// The present state (現状).
    Current,
    /// The aspired state (志向性).
    Aspiration,
}

impl Phase {
    /// Number of phases.
    pub const COUNT: usize = 3;

    /// All phases in canonical order.
    pub fn all() -> &'static [Phase] {
        &[Phase::Origin, Phase::Current, Phase::Aspiration]
    }

    /// Sort rank of this phase (0-based).
    pub fn rank(&self) -> usize {
        match self {
            Phase::Origin => 0,
            Phase::Current => 1,
            Phase::Aspiration => 2,
        }
    }

    /// Phase from its rank.
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::all().get(rank).copied()
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Origin => "origin",
            Phase::Current => "current",
            Phase::Aspiration => "aspiration",
        }
    }

    /// Substrings that mark an identifier as belonging to this phase.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Phase::Origin => &["origin", "本来性"],
            Phase::Current => &["current", "現状"],
            Phase::Aspiration => &["aspiration", "志向性"],
        }
    }

    /// Derive the phase from a trend-factor identifier.
    ///
    /// Returns `None` when no alias of any phase occurs in the text.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|phase| phase.aliases().iter().any(|alias| identifier.contains(alias)))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sort key for an optional phase: ranked phases first, `None` last.
pub fn phase_sort_key(phase: Option<Phase>) -> usize {
    phase.map(|p| p.rank()).unwrap_or(Phase::COUNT)
}
