//! Aggregator: per (class, phase) component sums.
//!
//! Rows with a blank class or blank phase form no group key and are dropped
//! without error. Non-numeric columns are not components and are skipped.
//! Blank cells contribute nothing to a sum.

use std::collections::BTreeMap;

use bf_common::{Error, Phase, Result};
use bf_math::euclidean_norm;
use serde::Serialize;
use tracing::debug;

use crate::pipeline::merge::ClassifiedTable;

/// Sums for one (class, phase) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub class: String,
    pub phase: Phase,
    /// One sum per component, in component order.
    pub sums: Vec<f64>,
    /// Euclidean norm of `sums`.
    pub bf_total: f64,
    /// Number of classified rows folded into this group.
    pub row_count: usize,
}

/// Output of the aggregation stage, sorted by (class, phase rank).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateTable {
    pub components: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    /// Distinct classes in sort order.
    pub fn classes(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if out.last() != Some(&row.class.as_str()) {
                out.push(row.class.as_str());
            }
        }
        out
    }
}

/// Group classified rows by (class, phase) and sum each component.
pub fn aggregate(classified: &ClassifiedTable) -> Result<AggregateTable> {
    let component_cols: Vec<usize> = classified
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.numeric)
        .map(|(i, _)| i)
        .collect();
    let components: Vec<String> = component_cols
        .iter()
        .map(|&i| classified.columns[i].name.clone())
        .collect();

    let mut groups: BTreeMap<(&str, Phase), (Vec<f64>, usize)> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in &classified.rows {
        let (Some(class), Some(phase)) = (row.class.as_deref(), row.phase) else {
            skipped += 1;
            continue;
        };
        let (sums, count) = groups
            .entry((class, phase))
            .or_insert_with(|| (vec![0.0; component_cols.len()], 0));
        *count += 1;
        for (slot, &col) in sums.iter_mut().zip(&component_cols) {
            if let Some(v) = row.cells.get(col).and_then(|c| c.as_number()) {
                *slot += v;
            }
        }
    }

    let mut rows = Vec::with_capacity(groups.len());
    for ((class, phase), (sums, row_count)) in groups {
        if sums.iter().any(|v| !v.is_finite()) {
            return Err(Error::NumericalInstability(format!(
                "component sum overflowed for class '{}' phase '{}'",
                class, phase
            )));
        }
        let bf_total = euclidean_norm(&sums);
        rows.push(AggregateRow {
            class: class.to_string(),
            phase,
            sums,
            bf_total,
            row_count,
        });
    }

    debug!(groups = rows.len(), skipped, "aggregation complete");

    Ok(AggregateTable { components, rows })
}
