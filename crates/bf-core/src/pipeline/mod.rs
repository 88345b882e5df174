//! The four-stage BF-type pipeline.
//!
//! Merger → Aggregator → Normalizer → Classifier. Each stage reads the
//! previous stage's table and returns a new one; nothing is mutated across
//! stage boundaries.

pub mod aggregate;
pub mod classify;
pub mod merge;
pub mod normalize;

pub use aggregate::{aggregate, AggregateRow, AggregateTable};
pub use classify::{
    classify, classify_triple, explain_triple, pivot, BfTypeMatrix, BfTypeRow, PhaseTriple,
    RuleMatch, WideRow, WideTable, MISSING_CELL_DEFAULT, RULES,
};
pub use merge::{merge, ClassifiedRow, ClassifiedTable, MergeStats};
pub use normalize::{normalize, NormalizedRow, NormalizedTable};

use bf_common::Result;
use serde::Serialize;
use tracing::info;

use crate::logging::{event_names, Stage};
use crate::table::{ClassificationTable, MeasurementTable};

/// Every intermediate and final table of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub classified: ClassifiedTable,
    pub merge_stats: MergeStats,
    pub aggregate: AggregateTable,
    pub normalized: NormalizedTable,
    pub wide: WideTable,
    pub bf_types: BfTypeMatrix,
}

/// Run all four stages.
pub fn run_pipeline(
    classification: &ClassificationTable,
    measurements: &MeasurementTable,
) -> Result<PipelineOutput> {
    let (classified, merge_stats) = {
        let _span = tracing::info_span!("stage", stage = %Stage::Merge).entered();
        let (classified, stats) = merge(classification, measurements);
        info!(
            event = event_names::MERGE_FINISHED,
            rows = classified.rows.len(),
            matched = stats.matched,
            unmatched = stats.unmatched,
            dropped = stats.dropped_measurements,
            null_phase = stats.null_phase,
            "merge finished"
        );
        (classified, stats)
    };

    let aggregate = {
        let _span = tracing::info_span!("stage", stage = %Stage::Aggregate).entered();
        let table = aggregate(&classified)?;
        info!(
            event = event_names::AGGREGATE_FINISHED,
            groups = table.rows.len(),
            components = table.components.len(),
            "aggregation finished"
        );
        table
    };

    let normalized = {
        let _span = tracing::info_span!("stage", stage = %Stage::Normalize).entered();
        let table = normalize(&aggregate);
        info!(
            event = event_names::NORMALIZE_FINISHED,
            rows = table.rows.len(),
            "normalization finished"
        );
        table
    };

    let (wide, bf_types) = {
        let _span = tracing::info_span!("stage", stage = %Stage::Classify).entered();
        let wide = pivot(&normalized);
        let matrix = classify(&wide);
        info!(
            event = event_names::CLASSIFY_FINISHED,
            classes = matrix.rows.len(),
            components = matrix.components.len(),
            "classification finished"
        );
        (wide, matrix)
    };

    Ok(PipelineOutput {
        classified,
        merge_stats,
        aggregate,
        normalized,
        wide,
        bf_types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ClassificationRow;
    use bf_common::{BfType, Phase};

    fn classification(entries: &[(&str, &str)]) -> ClassificationTable {
        ClassificationTable::new(
            entries
                .iter()
                .map(|(id, class)| ClassificationRow::new(*id, Some(class.to_string())))
                .collect(),
        )
    }

    #[test]
    fn stages_chain() {
        let cls = classification(&[
            ("origin-1", "A"),
            ("origin-2", "A"),
            ("aspiration-1", "A"),
            ("misc", "A"),
        ]);
        let mix = MeasurementTable::numeric(
            &["X", "Y"],
            vec![
                ("origin-1", vec![3.0, 0.0]),
                ("origin-2", vec![0.0, 4.0]),
                ("aspiration-1", vec![0.0, 2.0]),
                ("misc", vec![100.0, 100.0]),
            ],
        );
        let out = run_pipeline(&cls, &mix).unwrap();

        assert_eq!(out.classified.rows.len(), 4);
        assert_eq!(out.merge_stats.null_phase, 1);
        assert_eq!(out.aggregate.rows.len(), 2);
        assert_eq!(out.aggregate.rows[0].phase, Phase::Origin);
        assert_eq!(out.aggregate.rows[0].sums, vec![3.0, 4.0]);
        assert_eq!(out.aggregate.rows[0].bf_total, 5.0);
        assert_eq!(out.normalized.rows[0].values, vec![0.6, 0.8]);
        assert_eq!(out.normalized.rows[1].values, vec![0.0, 1.0]);

        // X: (0.6, 0, 0) → d0-1; Y: (0.8, 0, 1.0) → d1-eq
        assert_eq!(out.bf_types.label("A", "X"), Some(BfType::D0Origin));
        assert_eq!(out.bf_types.label("A", "Y"), Some(BfType::D1Equal));
    }

    #[test]
    fn empty_inputs_produce_empty_outputs() {
        let out = run_pipeline(
            &ClassificationTable::default(),
            &MeasurementTable::numeric(&["X"], vec![]),
        )
        .unwrap();
        assert!(out.classified.rows.is_empty());
        assert!(out.aggregate.rows.is_empty());
        assert!(out.bf_types.rows.is_empty());
        assert_eq!(out.bf_types.components, vec!["X"]);
    }
}
