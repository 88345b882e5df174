//! Extract the two input tables from a workbook.

use std::collections::HashSet;

use bf_common::{Cell, Error, Result, Sheet, Workbook};
use tracing::{debug, info};

use crate::config::WorkbookLayout;
use crate::logging::event_names;
use crate::table::{ClassificationRow, ClassificationTable, MeasurementRow, MeasurementTable};

/// Headers that mark an unnamed leading index column.
const UNNAMED_HEADERS: &[&str] = &["", "Unnamed: 0"];

/// The pipeline's two inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTables {
    pub classification: ClassificationTable,
    pub measurements: MeasurementTable,
}

/// Read both input sheets named by `layout`.
pub fn read_inputs(workbook: &Workbook, layout: &WorkbookLayout) -> Result<InputTables> {
    let classification =
        read_classification(workbook.require_sheet(&layout.classification_sheet)?, layout)?;
    let measurements = read_measurements(workbook.require_sheet(&layout.mixture_sheet)?, layout)?;
    check_output_headers(&classification, &measurements, layout)?;

    let excluded = measurements.excluded_columns();
    if !excluded.is_empty() {
        info!(
            event = event_names::COLUMNS_EXCLUDED,
            columns = ?excluded,
            "non-numeric columns excluded from aggregation"
        );
    }

    Ok(InputTables {
        classification,
        measurements,
    })
}

/// Classification sheet: identifier and class columns, plus any other
/// columns kept as pass-through cells.
pub fn read_classification(sheet: &Sheet, layout: &WorkbookLayout) -> Result<ClassificationTable> {
    sheet.validate()?;
    let id_col = sheet.require_column(&layout.identifier_column)?;
    let class_col = sheet.require_column(&layout.class_column)?;
    let extra_cols: Vec<usize> = (0..sheet.columns.len())
        .filter(|&c| c != id_col && c != class_col)
        .collect();

    let mut rows = Vec::with_capacity(sheet.row_count());
    for (i, row) in sheet.rows.iter().enumerate() {
        if is_blank_row(row) {
            continue;
        }
        let trend_factor = identifier(sheet, i, id_col)?;
        let class = sheet.cell(i, class_col).as_label();
        let extra = extra_cols.iter().map(|&c| sheet.cell(i, c).clone()).collect();
        rows.push(ClassificationRow {
            trend_factor,
            class,
            extra,
        });
    }

    debug!(
        sheet = %sheet.name,
        rows = rows.len(),
        extra_columns = extra_cols.len(),
        "classification sheet read"
    );
    let names = extra_cols.iter().map(|&c| sheet.columns[c].clone()).collect();
    Ok(ClassificationTable::with_extra_columns(names, rows))
}

/// Mixture sheet: identifier column plus every other column as a
/// measurement. A class column, if the sheet has one, is not a measurement.
pub fn read_measurements(sheet: &Sheet, layout: &WorkbookLayout) -> Result<MeasurementTable> {
    sheet.validate()?;
    let id_col = mixture_identifier_column(sheet, layout)?;
    let value_cols: Vec<usize> = (0..sheet.columns.len())
        .filter(|&c| c != id_col && sheet.columns[c] != layout.class_column)
        .collect();
    let names = value_cols
        .iter()
        .map(|&c| sheet.columns[c].clone())
        .collect();

    let mut rows = Vec::with_capacity(sheet.row_count());
    for (i, row) in sheet.rows.iter().enumerate() {
        if is_blank_row(row) {
            continue;
        }
        let trend_factor = identifier(sheet, i, id_col)?;
        let cells = value_cols
            .iter()
            .map(|&c| sheet.cell(i, c).clone())
            .collect();
        rows.push(MeasurementRow {
            trend_factor,
            cells,
        });
    }

    debug!(
        sheet = %sheet.name,
        rows = rows.len(),
        columns = value_cols.len(),
        "mixture sheet read"
    );
    Ok(MeasurementTable::from_rows(names, rows))
}

/// The named identifier column, or an unnamed first column.
fn mixture_identifier_column(sheet: &Sheet, layout: &WorkbookLayout) -> Result<usize> {
    if let Some(col) = sheet.column_index(&layout.identifier_column) {
        return Ok(col);
    }
    match sheet.columns.first() {
        Some(first) if UNNAMED_HEADERS.contains(&first.trim()) => Ok(0),
        _ => Err(Error::MissingColumn {
            sheet: sheet.name.clone(),
            column: layout.identifier_column.clone(),
        }),
    }
}

/// Every header of the classified and totals sheets must be unique.
///
/// Pass-through and measurement columns share the classified sheet with the
/// class, identifier and phase headers; components share the totals sheet
/// with the phase and BF total headers.
fn check_output_headers(
    classification: &ClassificationTable,
    measurements: &MeasurementTable,
    layout: &WorkbookLayout,
) -> Result<()> {
    let mut seen: HashSet<&str> = [
        layout.class_column.as_str(),
        layout.identifier_column.as_str(),
        layout.phase_column.as_str(),
        layout.bf_total_column.as_str(),
    ]
    .into_iter()
    .collect();

    let passed_through = classification
        .extra_columns
        .iter()
        .map(|name| (layout.classification_sheet.as_str(), name.as_str()));
    let measured = measurements
        .columns
        .iter()
        .map(|c| (layout.mixture_sheet.as_str(), c.name.as_str()));

    for (sheet, name) in passed_through.chain(measured) {
        if !seen.insert(name) {
            return Err(Error::MalformedWorkbook(format!(
                "column '{}' in sheet '{}' clashes with another output column",
                name, sheet
            )));
        }
    }
    Ok(())
}

fn identifier(sheet: &Sheet, row: usize, col: usize) -> Result<String> {
    sheet
        .cell(row, col)
        .as_label()
        .ok_or_else(|| Error::EmptyIdentifier {
            sheet: sheet.name.clone(),
            // 1-based, counting the header row
            row: row + 2,
        })
}

fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}
