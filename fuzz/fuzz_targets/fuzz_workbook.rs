//! Fuzz target for workbook JSON ingestion.
//!
//! Arbitrary text is parsed as a workbook and, when it parses, pushed
//! through the whole pipeline. Malformed input must surface as an error.

#![no_main]

use bf_common::Workbook;
use bf_core::config::WorkbookLayout;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(workbook) = Workbook::from_json_str(data) {
        let _ = bf_core::process_workbook(&workbook, &WorkbookLayout::default());
    }
});
