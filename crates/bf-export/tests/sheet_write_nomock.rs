//! No-mock sheet export + read-back tests.
//!
//! Writes real sheets through `export_sheets`, reads the Parquet files back
//! and checks schemas and values survive.

use std::fs::File;

use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use bf_common::{Cell, Sheet};
use bf_export::{export_sheets, SheetKind, WriterConfig};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tempfile::TempDir;

fn normalized_sheet() -> Sheet {
    let mut sheet = Sheet::new(
        "class_phase_normalized",
        vec!["class".into(), "phase".into(), "X".into(), "Y".into()],
    );
    sheet.push_row(vec!["A".into(), "origin".into(), 0.6.into(), 0.8.into()]);
    sheet.push_row(vec!["A".into(), "current".into(), 1.0.into(), 0.0.into()]);
    sheet.push_row(vec!["B".into(), "aspiration".into(), Cell::Empty, 1.0.into()]);
    sheet
}

fn bf_types_sheet() -> Sheet {
    let mut sheet = Sheet::new("class_bf_types", vec!["class".into(), "X".into(), "Y".into()]);
    sheet.push_row(vec!["A".into(), "d0-3".into(), "d1->".into()]);
    sheet.push_row(vec!["B".into(), "none".into(), "d0-2".into()]);
    sheet
}

#[test]
fn export_and_read_back() {
    let dir = TempDir::new().unwrap();
    let normalized = normalized_sheet();
    let bf_types = bf_types_sheet();

    let paths = export_sheets(
        WriterConfig::new(dir.path().to_path_buf()).with_snappy(),
        &[
            (SheetKind::ClassPhaseNormalized, &normalized),
            (SheetKind::ClassBfTypes, &bf_types),
        ],
    )
    .unwrap();
    assert_eq!(paths.len(), 2);

    let file = File::open(&paths[0]).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    let batch = &batches[0];
    assert_eq!(batch.num_rows(), 3);

    let schema = batch.schema();
    assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
    assert_eq!(schema.field(2).data_type(), &DataType::Float64);

    let x = batch
        .column(2)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(x.value(0), 0.6);
    assert!(x.is_null(2));

    let file = File::open(&paths[1]).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batch = reader.into_iter().next().unwrap().unwrap();
    let y = batch
        .column(2)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(y.value(0), "d1->");
    assert_eq!(y.value(1), "d0-2");
}

#[test]
fn export_overwrites_previous_run() {
    let dir = TempDir::new().unwrap();
    let sheet = bf_types_sheet();
    let config = WriterConfig::new(dir.path().to_path_buf());

    let first = export_sheets(config.clone(), &[(SheetKind::ClassBfTypes, &sheet)]).unwrap();
    let second = export_sheets(config, &[(SheetKind::ClassBfTypes, &sheet)]).unwrap();
    assert_eq!(first, second);
    assert!(second[0].exists());
}
