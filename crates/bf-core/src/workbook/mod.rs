//! Workbook I/O: input table extraction and output sheet assembly.

pub mod reader;
pub mod writer;

pub use reader::{read_classification, read_inputs, read_measurements, InputTables};
pub use writer::{
    bf_type_sheet, classified_sheet, normalized_sheet, output_sheets, output_workbook,
    totals_sheet, write_workbook_atomic,
};
