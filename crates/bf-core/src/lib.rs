//! BF-type classification core.
//!
//! This library provides:
//! - The four pipeline stages (merge, aggregate, normalize, classify)
//! - Workbook reading and output sheet assembly
//! - Layout configuration with presets
//! - Structured logging and CLI exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod table;
pub mod workbook;

use std::path::Path;

use bf_common::{Result, Workbook};
use tracing::info;

use crate::config::WorkbookLayout;
use crate::logging::{event_names, Stage};
use crate::pipeline::PipelineOutput;

/// A completed run: pipeline tables plus the output workbook.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub output: PipelineOutput,
    pub workbook: Workbook,
}

/// Read inputs from `input`, run the pipeline and assemble the output.
pub fn process_workbook(input: &Workbook, layout: &WorkbookLayout) -> Result<RunResult> {
    let inputs = {
        let _span = tracing::info_span!("stage", stage = %Stage::Read).entered();
        workbook::read_inputs(input, layout)?
    };

    let output = pipeline::run_pipeline(&inputs.classification, &inputs.measurements)?;

    let out_workbook = {
        let _span = tracing::info_span!("stage", stage = %Stage::Write).entered();
        workbook::output_workbook(&output, layout)
    };

    Ok(RunResult {
        output,
        workbook: out_workbook,
    })
}

/// [`process_workbook`] for a workbook JSON file.
pub fn process_path(path: &Path, layout: &WorkbookLayout) -> Result<RunResult> {
    let input = Workbook::from_path(path)?;
    info!(
        event = event_names::WORKBOOK_LOADED,
        path = %path.display(),
        sheets = input.sheets.len(),
        digest = %input.digest()?,
        "workbook loaded"
    );
    process_workbook(&input, layout)
}
