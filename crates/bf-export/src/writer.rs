//! Parquet writer for output sheets.
//!
//! Each sheet is written to `<base_dir>/<kind>.parquet` through a temp file
//! and renamed into place. [`export_sheets`] stages every file before
//! renaming any of them, so a failure leaves no partial export behind.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::array::RecordBatch;
use bf_common::Sheet;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{WriterProperties, WriterVersion};
use thiserror::Error;
use tracing::debug;

use crate::schema::{sheet_to_record_batch, SheetKind};

/// Errors from export operations.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Sheet has no columns: {0}")]
    EmptySheet(String),
}

impl From<WriteError> for bf_common::Error {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Io(e) => bf_common::Error::Io(e),
            other => bf_common::Error::Export(other.to_string()),
        }
    }
}

/// Configuration for the Parquet writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Directory for exported files.
    pub base_dir: PathBuf,

    /// Compression codec.
    pub compression: Compression,

    /// Maximum rows per row group.
    pub row_group_size: usize,
}

impl WriterConfig {
    /// Create config with defaults (zstd level 3).
    pub fn new(base_dir: PathBuf) -> Self {
        WriterConfig {
            base_dir,
            compression: Compression::ZSTD(ZstdLevel::try_new(3).unwrap_or_default()),
            row_group_size: crate::DEFAULT_ROW_GROUP_SIZE,
        }
    }

    /// Snappy trades file size for faster writes.
    pub fn with_snappy(mut self) -> Self {
        self.compression = Compression::SNAPPY;
        self
    }
}

/// Writes output sheets as Parquet files.
pub struct ParquetSheetWriter {
    config: WriterConfig,
}

impl ParquetSheetWriter {
    pub fn new(config: WriterConfig) -> Self {
        ParquetSheetWriter { config }
    }

    /// Final path for a sheet kind.
    pub fn output_path(&self, kind: SheetKind) -> PathBuf {
        self.config
            .base_dir
            .join(format!("{}.parquet", kind.as_str()))
    }

    /// Write a sheet to its temp path and return `(temp, final)`.
    ///
    /// The caller is responsible for renaming.
    pub fn stage(&self, kind: SheetKind, sheet: &Sheet) -> Result<(PathBuf, PathBuf), WriteError> {
        let batch = sheet_to_record_batch(sheet)?;
        let output_path = self.output_path(kind);
        let temp_path = output_path.with_extension("parquet.tmp");

        fs::create_dir_all(&self.config.base_dir)?;
        if let Err(e) = self.write_batch(&temp_path, &batch) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        debug!(
            sheet = %sheet.name,
            kind = %kind,
            rows = batch.num_rows(),
            "staged parquet sheet"
        );
        Ok((temp_path, output_path))
    }

    fn write_batch(&self, path: &Path, batch: &RecordBatch) -> Result<(), WriteError> {
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_writer_version(WriterVersion::PARQUET_2_0)
            .set_compression(self.config.compression)
            .set_max_row_group_size(self.config.row_group_size)
            .set_dictionary_enabled(true)
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    }
}

/// Export sheets together: stage all, then rename all.
///
/// On any staging failure the already-staged temp files are removed and
/// nothing is renamed.
pub fn export_sheets(
    config: WriterConfig,
    sheets: &[(SheetKind, &Sheet)],
) -> Result<Vec<PathBuf>, WriteError> {
    let writer = ParquetSheetWriter::new(config);
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(sheets.len());

    for (kind, sheet) in sheets {
        match writer.stage(*kind, sheet) {
            Ok(paths) => staged.push(paths),
            Err(e) => {
                for (temp, _) in &staged {
                    let _ = fs::remove_file(temp);
                }
                return Err(e);
            }
        }
    }

    let mut written = Vec::with_capacity(staged.len());
    for (temp, output) in staged {
        commit(&temp, &output)?;
        written.push(output);
    }
    Ok(written)
}

/// Move a staged file over its final name.
fn commit(staged: &Path, target: &Path) -> Result<(), WriteError> {
    fs::rename(staged, target)?;
    Ok(())
}
