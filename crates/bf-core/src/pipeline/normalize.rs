//! Normalizer: unit-length component vectors with a noise floor.
//!
//! Each aggregate row is divided by its BF total. A zero BF total yields an
//! all-zero row. Values with magnitude below [`bf_math::NOISE_FLOOR`] become
//! exactly 0 afterwards.

use bf_common::Phase;
use bf_math::scale_with_floor;
use serde::Serialize;
use tracing::debug;

use crate::pipeline::aggregate::AggregateTable;

/// Normalized component values for one (class, phase) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub class: String,
    pub phase: Phase,
    pub values: Vec<f64>,
}

/// Output of the normalization stage; same keys and order as the aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedTable {
    pub components: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

pub fn normalize(aggregate: &AggregateTable) -> NormalizedTable {
    let mut degenerate = 0usize;
    let rows = aggregate
        .rows
        .iter()
        .map(|row| {
            if row.bf_total == 0.0 {
                degenerate += 1;
            }
            NormalizedRow {
                class: row.class.clone(),
                phase: row.phase,
                values: scale_with_floor(&row.sums, row.bf_total),
            }
        })
        .collect();

    debug!(degenerate, "normalization complete");

    NormalizedTable {
        components: aggregate.components.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::aggregate::AggregateRow;
    use bf_math::euclidean_norm;

    fn agg(sums: Vec<f64>) -> AggregateTable {
        AggregateTable {
            components: (0..sums.len()).map(|i| format!("c{}", i)).collect(),
            rows: vec![AggregateRow {
                class: "A".into(),
                phase: Phase::Origin,
                bf_total: euclidean_norm(&sums),
                sums,
                row_count: 1,
            }],
        }
    }

    #[test]
    fn unit_vector() {
        let out = normalize(&agg(vec![3.0, 4.0]));
        assert_eq!(out.rows[0].values, vec![0.6, 0.8]);
    }

    #[test]
    fn zero_total_gives_zeros() {
        let out = normalize(&agg(vec![0.0, 0.0, 0.0]));
        assert_eq!(out.rows[0].values, vec![0.0, 0.0, 0.0]);
        assert!(out.rows[0].values.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn small_components_floored() {
        // 1 / sqrt(1 + 400) ~= 0.0499
        let out = normalize(&agg(vec![1.0, 20.0]));
        assert_eq!(out.rows[0].values[0], 0.0);
        assert!(out.rows[0].values[1] > 0.99);
    }

    #[test]
    fn negative_small_components_floored_by_magnitude() {
        let out = normalize(&agg(vec![-1.0, 20.0]));
        assert_eq!(out.rows[0].values[0], 0.0);
    }

    #[test]
    fn keeps_keys_and_components() {
        let input = agg(vec![1.0, 1.0]);
        let out = normalize(&input);
        assert_eq!(out.components, input.components);
        assert_eq!(out.rows[0].class, "A");
        assert_eq!(out.rows[0].phase, Phase::Origin);
    }
}
