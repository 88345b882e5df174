//! Typed input tables.
//!
//! The workbook reader produces these from the two input sheets; the
//! pipeline never looks at raw sheets.

use bf_common::Cell;
use serde::Serialize;

/// One entry of the classification table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationRow {
    pub trend_factor: String,
    /// `None` when the class cell is blank.
    pub class: Option<String>,
    /// One cell per [`ClassificationTable::extra_columns`] entry.
    pub extra: Vec<Cell>,
}

impl ClassificationRow {
    pub fn new(trend_factor: impl Into<String>, class: Option<String>) -> Self {
        ClassificationRow {
            trend_factor: trend_factor.into(),
            class,
            extra: Vec::new(),
        }
    }
}

/// Maps trend factors to classes, in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationTable {
    /// Classification-sheet columns besides the identifier and class.
    /// Carried into the classified sheet, never aggregated.
    pub extra_columns: Vec<String>,
    pub rows: Vec<ClassificationRow>,
}

impl ClassificationTable {
    pub fn new(rows: Vec<ClassificationRow>) -> Self {
        ClassificationTable {
            extra_columns: Vec::new(),
            rows,
        }
    }

    pub fn with_extra_columns(extra_columns: Vec<String>, rows: Vec<ClassificationRow>) -> Self {
        ClassificationTable {
            extra_columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A measurement column and whether it qualifies as a component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementColumn {
    pub name: String,
    /// Every non-blank cell is a finite number.
    pub numeric: bool,
}

/// One row of the measurement table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRow {
    pub trend_factor: String,
    /// One cell per entry of [`MeasurementTable::columns`].
    pub cells: Vec<Cell>,
}

/// Measurement values keyed by trend factor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasurementTable {
    pub columns: Vec<MeasurementColumn>,
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    /// Build a table, marking each column numeric or not from its cells.
    pub fn from_rows(names: Vec<String>, rows: Vec<MeasurementRow>) -> Self {
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let numeric = rows.iter().all(|row| match row.cells.get(i) {
                    None => true,
                    Some(cell) => cell.is_empty() || cell.as_number().is_some(),
                });
                MeasurementColumn { name, numeric }
            })
            .collect();
        MeasurementTable { columns, rows }
    }

    /// Build an all-numeric table from plain values (tests and benches).
    pub fn numeric(components: &[&str], rows: Vec<(&str, Vec<f64>)>) -> Self {
        let names = components.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|(id, values)| MeasurementRow {
                trend_factor: id.to_string(),
                cells: values.into_iter().map(Cell::Number).collect(),
            })
            .collect();
        Self::from_rows(names, rows)
    }

    /// Column indices of the components (numeric columns), in sheet order.
    pub fn component_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.numeric)
            .map(|(i, _)| i)
            .collect()
    }

    /// Names of columns excluded from aggregation.
    pub fn excluded_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.numeric)
            .map(|c| c.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_detection() {
        let rows = vec![
            MeasurementRow {
                trend_factor: "origin-1".into(),
                cells: vec![Cell::Number(1.0), Cell::Text("x".into()), Cell::Empty],
            },
            MeasurementRow {
                trend_factor: "current-1".into(),
                cells: vec![Cell::Text(" ".into()), Cell::Number(2.0)],
            },
        ];
        let table = MeasurementTable::from_rows(vec!["A".into(), "B".into(), "C".into()], rows);
        assert!(table.columns[0].numeric);
        assert!(!table.columns[1].numeric);
        assert!(table.columns[2].numeric);
        assert_eq!(table.component_indices(), vec![0, 2]);
        assert_eq!(table.excluded_columns(), vec!["B"]);
    }

    #[test]
    fn non_finite_is_not_numeric() {
        let rows = vec![MeasurementRow {
            trend_factor: "origin".into(),
            cells: vec![Cell::Number(f64::NAN)],
        }];
        let table = MeasurementTable::from_rows(vec!["X".into()], rows);
        assert!(table.component_indices().is_empty());
    }
}
