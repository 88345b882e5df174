//! Merger: join classes onto measurements and derive phases.
//!
//! The join is a left join from the classification table. Every
//! classification row produces at least one output row; a trend factor with
//! no measurement carries blank cells. Measurements without a
//! classification entry are dropped.

use std::collections::HashMap;

use bf_common::{phase_sort_key, Cell, Phase};
use serde::Serialize;
use tracing::{debug, warn};

use crate::logging::event_names;
use crate::table::{ClassificationTable, MeasurementColumn, MeasurementTable};

/// A measurement row enriched with its class and phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifiedRow {
    pub class: Option<String>,
    pub trend_factor: String,
    pub phase: Option<Phase>,
    /// Extra classification-sheet cells, one per [`ClassifiedTable::extra_columns`] entry.
    pub extra: Vec<Cell>,
    /// One cell per measurement column; all blank when unmatched.
    pub cells: Vec<Cell>,
}

impl ClassifiedRow {
    /// Whether the row carries any measurement value.
    pub fn is_matched(&self) -> bool {
        !self.cells.iter().all(|c| matches!(c, Cell::Empty))
    }
}

/// Output of the merge stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifiedTable {
    /// Extra classification-sheet columns, written before the measurements.
    pub extra_columns: Vec<String>,
    pub columns: Vec<MeasurementColumn>,
    pub rows: Vec<ClassifiedRow>,
}

/// Counters reported by the merge stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub matched: usize,
    pub unmatched: usize,
    pub dropped_measurements: usize,
    pub null_phase: usize,
}

/// Left-join `classification` with `measurements` and sort the result.
///
/// Sort order is (class, phase rank, identifier); blank classes and blank
/// phases sort after every present value.
pub fn merge(
    classification: &ClassificationTable,
    measurements: &MeasurementTable,
) -> (ClassifiedTable, MergeStats) {
    let mut by_id: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in measurements.rows.iter().enumerate() {
        by_id.entry(row.trend_factor.as_str()).or_default().push(i);
    }
    for (id, hits) in &by_id {
        if hits.len() > 1 {
            warn!(
                event = event_names::MERGE_DUPLICATE_ID,
                trend_factor = %id,
                count = hits.len(),
                "duplicate trend factor in measurement table"
            );
        }
    }

    let width = measurements.columns.len();
    let extra_width = classification.extra_columns.len();
    let mut stats = MergeStats::default();
    let mut rows = Vec::with_capacity(classification.len());
    let mut used = vec![false; measurements.rows.len()];

    for entry in &classification.rows {
        let phase = Phase::from_identifier(&entry.trend_factor);
        let mut extra = entry.extra.clone();
        extra.resize(extra_width, Cell::Empty);
        match by_id.get(entry.trend_factor.as_str()) {
            Some(hits) => {
                for &i in hits {
                    used[i] = true;
                    let mut cells = measurements.rows[i].cells.clone();
                    cells.resize(width, Cell::Empty);
                    stats.matched += 1;
                    rows.push(ClassifiedRow {
                        class: entry.class.clone(),
                        trend_factor: entry.trend_factor.clone(),
                        phase,
                        extra: extra.clone(),
                        cells,
                    });
                }
            }
            None => {
                stats.unmatched += 1;
                rows.push(ClassifiedRow {
                    class: entry.class.clone(),
                    trend_factor: entry.trend_factor.clone(),
                    phase,
                    extra,
                    cells: vec![Cell::Empty; width],
                });
            }
        }
    }
    stats.dropped_measurements = used.iter().filter(|u| !**u).count();
    stats.null_phase = rows.iter().filter(|r| r.phase.is_none()).count();

    if stats.matched == 0 && !classification.is_empty() && !measurements.rows.is_empty() {
        warn!(
            event = event_names::MERGE_NO_OVERLAP,
            classification_rows = classification.len(),
            measurement_rows = measurements.rows.len(),
            "classification and measurement tables share no trend factor"
        );
    }

    rows.sort_by(|a, b| {
        class_sort_key(&a.class)
            .cmp(&class_sort_key(&b.class))
            .then_with(|| phase_sort_key(a.phase).cmp(&phase_sort_key(b.phase)))
            .then_with(|| a.trend_factor.cmp(&b.trend_factor))
    });

    debug!(
        matched = stats.matched,
        unmatched = stats.unmatched,
        dropped = stats.dropped_measurements,
        null_phase = stats.null_phase,
        "merge complete"
    );

    (
        ClassifiedTable {
            extra_columns: classification.extra_columns.clone(),
            columns: measurements.columns.clone(),
            rows,
        },
        stats,
    )
}

/// Present classes first (lexicographic), blank last.
fn class_sort_key(class: &Option<String>) -> (bool, &str) {
    match class {
        Some(c) => (false, c.as_str()),
        None => (true, ""),
    }
}
