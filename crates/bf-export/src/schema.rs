//! Arrow schema definitions for output sheets.
//!
//! Output sheets have data-dependent columns (one per component), so schemas
//! are inferred per sheet instead of declared up front:
//! - a column whose cells are all numbers or blanks becomes nullable `Float64`
//! - any other column becomes nullable `Utf8`
//!
//! Blank or repeated headers are renamed (`column_3`, `X_4`) because Parquet
//! readers disagree on how to treat them.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use bf_common::{Cell, Sheet};

use crate::writer::WriteError;

/// The four output sheets, in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetKind {
    ClassifiedMixture,
    ClassPhaseTotals,
    ClassPhaseNormalized,
    ClassBfTypes,
}

impl SheetKind {
    /// All kinds in write order.
    pub fn all() -> &'static [SheetKind] {
        &[
            SheetKind::ClassifiedMixture,
            SheetKind::ClassPhaseTotals,
            SheetKind::ClassPhaseNormalized,
            SheetKind::ClassBfTypes,
        ]
    }

    /// File stem used for the exported file.
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::ClassifiedMixture => "classified_mixture",
            SheetKind::ClassPhaseTotals => "class_phase_totals",
            SheetKind::ClassPhaseNormalized => "class_phase_normalized",
            SheetKind::ClassBfTypes => "class_bf_types",
        }
    }
}

impl std::fmt::Display for SheetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inferred storage type of a sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Float64,
    Utf8,
}

impl ColumnKind {
    fn data_type(&self) -> DataType {
        match self {
            ColumnKind::Float64 => DataType::Float64,
            ColumnKind::Utf8 => DataType::Utf8,
        }
    }
}

/// Infer the storage type of column `col`.
pub fn infer_column_kind(sheet: &Sheet, col: usize) -> ColumnKind {
    let numeric = (0..sheet.row_count()).all(|row| {
        matches!(sheet.cell(row, col), Cell::Empty | Cell::Number(_))
    });
    if numeric {
        ColumnKind::Float64
    } else {
        ColumnKind::Utf8
    }
}

/// Field names with blanks and duplicates replaced.
fn field_names(sheet: &Sheet) -> Vec<String> {
    let mut seen = HashSet::new();
    sheet
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("column_{}", i)
            } else {
                name.clone()
            };
            let unique = if seen.contains(&base) {
                format!("{}_{}", base, i)
            } else {
                base
            };
            seen.insert(unique.clone());
            unique
        })
        .collect()
}

/// Infer an Arrow schema for a sheet.
pub fn infer_schema(sheet: &Sheet) -> Schema {
    let fields: Vec<Field> = field_names(sheet)
        .into_iter()
        .enumerate()
        .map(|(i, name)| Field::new(name, infer_column_kind(sheet, i).data_type(), true))
        .collect();
    Schema::new(fields)
}

/// Convert a sheet into a single record batch with an inferred schema.
pub fn sheet_to_record_batch(sheet: &Sheet) -> Result<RecordBatch, WriteError> {
    if sheet.columns.is_empty() {
        return Err(WriteError::EmptySheet(sheet.name.clone()));
    }
    let schema = Arc::new(infer_schema(sheet));
    let rows = sheet.row_count();

    let columns: Vec<ArrayRef> = (0..sheet.columns.len())
        .map(|col| -> ArrayRef {
            match infer_column_kind(sheet, col) {
                ColumnKind::Float64 => {
                    let values: Vec<Option<f64>> = (0..rows)
                        .map(|row| match sheet.cell(row, col) {
                            Cell::Number(v) => Some(*v),
                            _ => None,
                        })
                        .collect();
                    Arc::new(Float64Array::from(values))
                }
                ColumnKind::Utf8 => {
                    let values: Vec<Option<String>> = (0..rows)
                        .map(|row| match sheet.cell(row, col) {
                            Cell::Empty => None,
                            Cell::Text(s) => Some(s.clone()),
                            Cell::Number(v) => Some(v.to_string()),
                        })
                        .collect();
                    Arc::new(StringArray::from(values))
                }
            }
        })
        .collect();

    Ok(RecordBatch::try_new(schema, columns)?)
}
