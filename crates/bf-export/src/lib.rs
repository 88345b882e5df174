//! Columnar export of BF-type output sheets.
//!
//! This crate provides:
//! - Arrow schema inference for workbook sheets
//! - Sheet to record batch conversion
//! - An atomic Parquet writer for the four output sheets

pub mod schema;
pub mod writer;

pub use schema::{infer_schema, sheet_to_record_batch, ColumnKind, SheetKind};
pub use writer::{export_sheets, ParquetSheetWriter, WriteError, WriterConfig};

/// Default row group size in rows.
pub const DEFAULT_ROW_GROUP_SIZE: usize = 64 * 1024;
