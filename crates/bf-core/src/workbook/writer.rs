//! Build the four output sheets and write the output workbook.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bf_common::{Cell, Phase, Result, Sheet, Workbook};
use bf_export::SheetKind;

use crate::config::WorkbookLayout;
use crate::pipeline::PipelineOutput;

/// The output sheets in write order, tagged with their kind.
pub fn output_sheets(output: &PipelineOutput, layout: &WorkbookLayout) -> Vec<(SheetKind, Sheet)> {
    vec![
        (SheetKind::ClassifiedMixture, classified_sheet(output, layout)),
        (SheetKind::ClassPhaseTotals, totals_sheet(output, layout)),
        (SheetKind::ClassPhaseNormalized, normalized_sheet(output, layout)),
        (SheetKind::ClassBfTypes, bf_type_sheet(output, layout)),
    ]
}

/// All output sheets as a workbook.
pub fn output_workbook(output: &PipelineOutput, layout: &WorkbookLayout) -> Workbook {
    let mut workbook = Workbook::new();
    for (_, sheet) in output_sheets(output, layout) {
        workbook.push_sheet(sheet);
    }
    workbook
}

fn phase_cell(layout: &WorkbookLayout, phase: Option<Phase>) -> Cell {
    match phase {
        Some(p) => Cell::Text(layout.phase_labels.label(p).to_string()),
        None => Cell::Empty,
    }
}

fn class_cell(class: Option<&str>) -> Cell {
    class.map(Cell::from).unwrap_or(Cell::Empty)
}

/// Class, identifier, pass-through classification columns, every
/// measurement column, phase.
pub fn classified_sheet(output: &PipelineOutput, layout: &WorkbookLayout) -> Sheet {
    let table = &output.classified;
    let mut columns = vec![
        layout.class_column.clone(),
        layout.identifier_column.clone(),
    ];
    columns.extend(table.extra_columns.iter().cloned());
    columns.extend(table.columns.iter().map(|c| c.name.clone()));
    columns.push(layout.phase_column.clone());

    let mut sheet = Sheet::new(layout.output_sheets.classified.clone(), columns);
    for row in &table.rows {
        let mut cells = Vec::with_capacity(sheet.columns.len());
        cells.push(class_cell(row.class.as_deref()));
        cells.push(Cell::Text(row.trend_factor.clone()));
        cells.extend(row.extra.iter().cloned());
        cells.extend(row.cells.iter().cloned());
        cells.push(phase_cell(layout, row.phase));
        sheet.push_row(cells);
    }
    sheet
}

/// Class, phase, component sums, BF total.
pub fn totals_sheet(output: &PipelineOutput, layout: &WorkbookLayout) -> Sheet {
    let table = &output.aggregate;
    let mut columns = vec![layout.class_column.clone(), layout.phase_column.clone()];
    columns.extend(table.components.iter().cloned());
    columns.push(layout.bf_total_column.clone());

    let mut sheet = Sheet::new(layout.output_sheets.totals.clone(), columns);
    for row in &table.rows {
        let mut cells = vec![
            Cell::Text(row.class.clone()),
            phase_cell(layout, Some(row.phase)),
        ];
        cells.extend(row.sums.iter().copied().map(Cell::Number));
        cells.push(Cell::Number(row.bf_total));
        sheet.push_row(cells);
    }
    sheet
}

/// Class, phase, normalized components.
pub fn normalized_sheet(output: &PipelineOutput, layout: &WorkbookLayout) -> Sheet {
    let table = &output.normalized;
    let mut columns = vec![layout.class_column.clone(), layout.phase_column.clone()];
    columns.extend(table.components.iter().cloned());

    let mut sheet = Sheet::new(layout.output_sheets.normalized.clone(), columns);
    for row in &table.rows {
        let mut cells = vec![
            Cell::Text(row.class.clone()),
            phase_cell(layout, Some(row.phase)),
        ];
        cells.extend(row.values.iter().copied().map(Cell::Number));
        sheet.push_row(cells);
    }
    sheet
}

/// Class, one BF-type label per component.
pub fn bf_type_sheet(output: &PipelineOutput, layout: &WorkbookLayout) -> Sheet {
    let matrix = &output.bf_types;
    let mut columns = vec![layout.class_column.clone()];
    columns.extend(matrix.components.iter().cloned());

    let mut sheet = Sheet::new(layout.output_sheets.bf_types.clone(), columns);
    for row in &matrix.rows {
        let mut cells = vec![Cell::Text(row.class.clone())];
        cells.extend(row.labels.iter().map(|l| Cell::from(l.label())));
        sheet.push_row(cells);
    }
    sheet
}

/// Write `workbook` as pretty JSON via a temp file in the same directory,
/// then rename it into place.
pub fn write_workbook_atomic(workbook: &Workbook, path: &Path) -> Result<()> {
    let json = workbook.to_json_pretty()?;
    let temp_path = temp_path_for(path);

    let written = fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
