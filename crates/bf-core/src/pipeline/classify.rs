//! Classifier: long-to-wide pivot and the BF-type decision table.
//!
//! The normalized table is pivoted to one row per class, keyed by
//! `(Phase, component index)`. A (class, phase) pair with no normalized row
//! reads as [`MISSING_CELL_DEFAULT`]. Each component's (origin, current,
//! aspiration) triple is then run through [`RULES`] top to bottom; the first
//! rule whose predicate holds assigns the label.

use std::collections::{BTreeMap, HashMap};

use bf_common::{BfType, Phase};
use bf_math::is_equal;
use serde::Serialize;
use tracing::debug;

use crate::pipeline::normalize::NormalizedTable;

/// Value read for a (class, phase, component) cell with no normalized row.
pub const MISSING_CELL_DEFAULT: f64 = 0.0;

/// One component's normalized values across the three phases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseTriple {
    /// h
    pub origin: f64,
    /// c
    pub current: f64,
    /// s
    pub aspiration: f64,
}

impl PhaseTriple {
    pub fn new(origin: f64, current: f64, aspiration: f64) -> Self {
        PhaseTriple {
            origin,
            current,
            aspiration,
        }
    }
}

/// A single entry of the decision table.
pub struct Rule {
    /// 1-based position in the table.
    pub number: usize,
    pub label: BfType,
    /// Human-readable condition, shown by `bf-core classify`.
    pub condition: &'static str,
    pub applies: fn(&PhaseTriple) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("number", &self.number)
            .field("label", &self.label)
            .field("condition", &self.condition)
            .finish()
    }
}

/// The ordered decision table. Rule 10 is kept exactly as written even
/// though its disjunction is weaker than it looks.
pub static RULES: &[Rule] = &[
    Rule {
        number: 1,
        label: BfType::None,
        condition: "h=0, c=0, s=0",
        applies: |t| t.origin == 0.0 && t.current == 0.0 && t.aspiration == 0.0,
    },
    Rule {
        number: 2,
        label: BfType::D0Origin,
        condition: "h!=0, c=0, s=0",
        applies: |t| t.origin != 0.0 && t.current == 0.0 && t.aspiration == 0.0,
    },
    Rule {
        number: 3,
        label: BfType::D0Aspiration,
        condition: "s!=0, h=0, c=0",
        applies: |t| t.aspiration != 0.0 && t.origin == 0.0 && t.current == 0.0,
    },
    Rule {
        number: 4,
        label: BfType::D0Current,
        condition: "c!=0, h=0, s=0",
        applies: |t| t.current != 0.0 && t.origin == 0.0 && t.aspiration == 0.0,
    },
    Rule {
        number: 5,
        label: BfType::D1Equal,
        condition: "c=0 and is_equal(h, s)",
        applies: |t| t.current == 0.0 && is_equal(t.origin, t.aspiration),
    },
    Rule {
        number: 6,
        label: BfType::D1Greater,
        condition: "c=0 and h>s",
        applies: |t| t.current == 0.0 && t.origin > t.aspiration,
    },
    Rule {
        number: 7,
        label: BfType::D1Less,
        condition: "c=0 and h<s",
        applies: |t| t.current == 0.0 && t.origin < t.aspiration,
    },
    Rule {
        number: 8,
        label: BfType::D2,
        condition: "h=0, c!=0, s!=0",
        applies: |t| t.origin == 0.0 && t.current != 0.0 && t.aspiration != 0.0,
    },
    Rule {
        number: 9,
        label: BfType::D3,
        condition: "s=0, c!=0, h!=0",
        applies: |t| t.aspiration == 0.0 && t.current != 0.0 && t.origin != 0.0,
    },
    Rule {
        number: 10,
        label: BfType::S1,
        condition: "is_equal(h, s) and (c=h or c=s or c>h or c>s)",
        applies: |t| {
            is_equal(t.origin, t.aspiration)
                && (t.current == t.origin
                    || t.current == t.aspiration
                    || t.current > t.origin
                    || t.current > t.aspiration)
        },
    },
    Rule {
        number: 11,
        label: BfType::D2,
        condition: "h<s",
        applies: |t| t.origin < t.aspiration,
    },
    Rule {
        number: 12,
        label: BfType::D3,
        condition: "h>s",
        applies: |t| t.origin > t.aspiration,
    },
    Rule {
        number: 13,
        label: BfType::Unknown,
        condition: "otherwise",
        applies: |_| true,
    },
];

/// The rule that fired for a triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleMatch {
    pub triple: PhaseTriple,
    pub label: BfType,
    pub rule: usize,
    pub condition: &'static str,
}

/// Label a triple. Pure: the same triple always yields the same label.
pub fn classify_triple(triple: &PhaseTriple) -> BfType {
    explain_triple(triple).label
}

/// Label a triple and report which rule fired.
pub fn explain_triple(triple: &PhaseTriple) -> RuleMatch {
    // The last rule always applies, so the fallback is never taken.
    let rule = RULES
        .iter()
        .find(|r| (r.applies)(triple))
        .unwrap_or(&RULES[RULES.len() - 1]);
    RuleMatch {
        triple: *triple,
        label: rule.label,
        rule: rule.number,
        condition: rule.condition,
    }
}

/// One class of the wide table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WideRow {
    pub class: String,
    values: BTreeMap<(Phase, usize), f64>,
}

impl WideRow {
    /// Cell value with an explicit default for absent (phase, component).
    pub fn get(&self, phase: Phase, component: usize) -> f64 {
        self.values
            .get(&(phase, component))
            .copied()
            .unwrap_or(MISSING_CELL_DEFAULT)
    }

    /// Whether a normalized row existed for this cell.
    pub fn contains(&self, phase: Phase, component: usize) -> bool {
        self.values.contains_key(&(phase, component))
    }

    pub fn triple(&self, component: usize) -> PhaseTriple {
        PhaseTriple::new(
            self.get(Phase::Origin, component),
            self.get(Phase::Current, component),
            self.get(Phase::Aspiration, component),
        )
    }
}

/// Normalized values pivoted to one row per class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WideTable {
    pub components: Vec<String>,
    pub rows: Vec<WideRow>,
}

/// Pivot the normalized table. Only classes with at least one normalized
/// row appear, in class order.
pub fn pivot(normalized: &NormalizedTable) -> WideTable {
    let mut rows: Vec<WideRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in &normalized.rows {
        let slot = *index.entry(row.class.as_str()).or_insert_with(|| {
            rows.push(WideRow {
                class: row.class.clone(),
                values: BTreeMap::new(),
            });
            rows.len() - 1
        });
        for (component, &value) in row.values.iter().enumerate() {
            rows[slot].values.insert((row.phase, component), value);
        }
    }
    rows.sort_by(|a, b| a.class.cmp(&b.class));

    WideTable {
        components: normalized.components.clone(),
        rows,
    }
}

/// One class of the BF-type matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BfTypeRow {
    pub class: String,
    /// One label per component.
    pub labels: Vec<BfType>,
}

/// Class × component label matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BfTypeMatrix {
    pub components: Vec<String>,
    pub rows: Vec<BfTypeRow>,
}

impl BfTypeMatrix {
    /// Label for a class and component name, if both exist.
    pub fn label(&self, class: &str, component: &str) -> Option<BfType> {
        let col = self.components.iter().position(|c| c == component)?;
        self.rows
            .iter()
            .find(|r| r.class == class)
            .and_then(|r| r.labels.get(col).copied())
    }

    /// Count of each label across the matrix, in rule order.
    pub fn histogram(&self) -> Vec<(BfType, usize)> {
        BfType::all()
            .iter()
            .map(|&t| {
                let n = self
                    .rows
                    .iter()
                    .flat_map(|r| r.labels.iter())
                    .filter(|&&l| l == t)
                    .count();
                (t, n)
            })
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

/// Label every (class, component) of the wide table.
pub fn classify(wide: &WideTable) -> BfTypeMatrix {
    let rows: Vec<BfTypeRow> = wide
        .rows
        .iter()
        .map(|row| BfTypeRow {
            class: row.class.clone(),
            labels: (0..wide.components.len())
                .map(|i| classify_triple(&row.triple(i)))
                .collect(),
        })
        .collect();

    debug!(
        classes = rows.len(),
        components = wide.components.len(),
        "classification complete"
    );

    BfTypeMatrix {
        components: wide.components.clone(),
        rows,
    }
}
