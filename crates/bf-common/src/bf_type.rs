//! BF-type labels.
//!
//! A BF type summarizes how one component of one class moves across the
//! origin (h), current (c) and aspiration (s) phases. The `d0-*` family marks
//! a single non-zero phase, `d1-*` a signal that skips the current phase,
//! `d2`/`d3` a rising or falling signal, and `s1` a stable one.

use serde::{Deserialize, Serialize};

/// Categorical BF-type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BfType {
    /// No signal in any phase.
    #[serde(rename = "none")]
    None,
    /// Only the origin phase is non-zero.
    #[serde(rename = "d0-1")]
    D0Origin,
    /// Only the aspiration phase is non-zero.
    #[serde(rename = "d0-2")]
    D0Aspiration,
    /// Only the current phase is non-zero.
    #[serde(rename = "d0-3")]
    D0Current,
    /// Current is zero, origin and aspiration are roughly equal.
    #[serde(rename = "d1-eq")]
    D1Equal,
    /// Current is zero, origin exceeds aspiration.
    #[serde(rename = "d1->")]
    D1Greater,
    /// Current is zero, origin is below aspiration.
    #[serde(rename = "d1-<")]
    D1Less,
    /// Rising towards aspiration.
    #[serde(rename = "d2")]
    D2,
    /// Falling away from origin.
    #[serde(rename = "d3")]
    D3,
    /// Stable across phases.
    #[serde(rename = "s1")]
    S1,
    /// No rule matched.
    #[serde(rename = "unknown")]
    Unknown,
}

impl BfType {
    /// All labels, in rule order.
    pub fn all() -> &'static [BfType] {
        &[
            BfType::None,
            BfType::D0Origin,
            BfType::D0Aspiration,
            BfType::D0Current,
            BfType::D1Equal,
            BfType::D1Greater,
            BfType::D1Less,
            BfType::D2,
            BfType::D3,
            BfType::S1,
            BfType::Unknown,
        ]
    }

    /// The label as written to output sheets.
    pub fn label(&self) -> &'static str {
        match self {
            BfType::None => "none",
            BfType::D0Origin => "d0-1",
            BfType::D0Aspiration => "d0-2",
            BfType::D0Current => "d0-3",
            BfType::D1Equal => "d1-eq",
            BfType::D1Greater => "d1->",
            BfType::D1Less => "d1-<",
            BfType::D2 => "d2",
            BfType::D3 => "d3",
            BfType::S1 => "s1",
            BfType::Unknown => "unknown",
        }
    }

    /// Parse an output label back into a BF type.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.label() == label)
    }
}

impl std::fmt::Display for BfType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_eleven_distinct_labels() {
        let labels: HashSet<&str> = BfType::all().iter().map(|t| t.label()).collect();
        assert_eq!(labels.len(), 11);
    }

    #[test]
    fn test_label_lookup() {
        for t in BfType::all() {
            assert_eq!(BfType::from_label(t.label()), Some(*t));
        }
        assert_eq!(BfType::from_label("d4"), None);
    }

    #[test]
    fn test_serde_uses_label() {
        assert_eq!(serde_json::to_string(&BfType::D1Greater).unwrap(), "\"d1->\"");
        let parsed: BfType = serde_json::from_str("\"d0-3\"").unwrap();
        assert_eq!(parsed, BfType::D0Current);
    }
}
