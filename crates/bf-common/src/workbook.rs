//! Workbook interchange model.
//!
//! A workbook is an ordered list of named sheets, each a header row plus
//! data rows of loosely typed cells. It is the in-memory stand-in for a
//! spreadsheet file and serializes to JSON:
//!
//! ```json
//! {"sheets": [{"name": "classification",
//!              "columns": ["TrendFactor", "class"],
//!              "rows": [["origin-1", "A"], ["current-1", null]]}]}
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{Error, Result};

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Blank cell (JSON `null`).
    Empty,
    /// Numeric cell.
    Number(f64),
    /// Text cell.
    Text(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Whether the cell is blank. Whitespace-only text counts as blank.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Finite numeric value, if the cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Render the cell as a label string (used for identifiers and classes).
    ///
    /// Text is kept verbatim, so `"origin-1 "` and `"origin-1"` are
    /// different identifiers; whitespace-only text counts as blank.
    /// Integral numbers render without a fractional part, so a class column
    /// holding `1` and `"1"` produces the same label.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    Some(format!("{}", *v as i64))
                } else {
                    Some(v.to_string())
                }
            }
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map(Cell::Number).unwrap_or(Cell::Empty)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// A named sheet: header row plus data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name.
    pub name: String,
    /// Header row.
    pub columns: Vec<String>,
    /// Data rows. Rows shorter than the header are padded with blanks.
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create an empty sheet with the given header.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Sheet {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a data row.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Index of the first column with this exact header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column, or a structural error naming the sheet.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| Error::MissingColumn {
            sheet: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// Cell at (row, column); blank when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check that no data row is wider than the header.
    pub fn validate(&self) -> Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() > self.columns.len() {
                return Err(Error::MalformedWorkbook(format!(
                    "sheet '{}' row {} has {} cells but only {} columns",
                    self.name,
                    i + 1,
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet, keeping insertion order.
    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Look up a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Look up a sheet, failing with a structural error when absent.
    pub fn require_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheet(name).ok_or_else(|| Error::MissingSheet {
            sheet: name.to_string(),
        })
    }

    /// Sheet names in order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Parse a workbook from JSON text and validate row widths.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let workbook: Workbook = serde_json::from_str(text)
            .map_err(|e| Error::MalformedWorkbook(e.to_string()))?;
        for sheet in &workbook.sheets {
            sheet.validate()?;
        }
        Ok(workbook)
    }

    /// Read and parse a workbook file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA-256 of the compact JSON encoding, hex encoded.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}
