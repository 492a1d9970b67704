use crate::utils::error::RowFailure;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt;
use std::sync::Arc;

pub const SKU_COLUMN: &str = "SKU";
pub const IMAGE_COLUMN: &str = "Image";
pub const ALT_TEXT_COLUMN: &str = "Image Alt Text";
pub const PRODUCT_NAME_COLUMN: &str = "Product Name";
pub const REFERER_COLUMN: &str = "Starting Url";

pub const VARIANT_SKU_COLUMN: &str = "Variant SKU";
pub const IMAGE_SRC_COLUMN: &str = "Image Src";

/// A spreadsheet cell with its type kept, so workbooks are written back the
/// way they were read.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date (days since 1899-12-30, time as the fraction).
    DateTime(f64),
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        if text.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text)
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(serial) => match excel_datetime(*serial) {
                Some(dt) if dt.num_seconds_from_midnight() == 0 => {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                }
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", serial),
            },
        }
    }
}

fn excel_datetime(serial: f64) -> Option<NaiveDateTime> {
    // Serials below 60 come before Excel's phantom 1900-02-29.
    let serial = if serial < 60.0 { serial + 1.0 } else { serial };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(chrono::Duration::milliseconds(millis))
}

/// One input record: an ordered mapping of column name to cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    columns: Arc<[String]>,
    cells: Vec<Cell>,
    text: Vec<String>,
    /// Position among data rows, starting at 0.
    pub index: usize,
    header_line: usize,
}

impl SourceRow {
    /// Short rows are padded with empty cells, extra cells are dropped.
    pub fn new<I, C>(columns: Arc<[String]>, values: I, index: usize) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let mut cells: Vec<Cell> = values.into_iter().map(Into::into).collect();
        cells.resize(columns.len(), Cell::Empty);
        let text = cells.iter().map(Cell::to_string).collect();
        Self {
            columns,
            cells,
            text,
            index,
            header_line: 0,
        }
    }

    /// Zero-based sheet line of the header, for sheets that do not start on
    /// the first line.
    pub fn with_header_line(mut self, header_line: usize) -> Self {
        self.header_line = header_line;
        self
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == column)
    }

    /// Raw cell text, `None` if the sheet has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.position(column).map(|i| self.text[i].as_str())
    }

    pub fn cell(&self, column: &str) -> Option<&Cell> {
        self.position(column).map(|i| &self.cells[i])
    }

    /// Trimmed cell text; absent columns read as empty.
    pub fn field(&self, column: &str) -> &str {
        self.get(column).map(str::trim).unwrap_or("")
    }

    pub fn values(&self) -> &[String] {
        &self.text
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row number as shown by spreadsheet software.
    pub fn sheet_row(&self) -> usize {
        self.header_line + self.index + 2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub columns: Arc<[String]>,
    pub rows: Vec<SourceRow>,
}

/// Row stages, in order. `Failed` is reachable from fetching or uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStage {
    Fetching,
    Uploading,
    Transforming,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Done { public_id: String, url: String },
    Failed { stage: RowStage, error: RowFailure },
    /// No SKU or no image URL; nothing was attempted.
    Skipped { reason: String },
}

impl RowOutcome {
    pub fn was_attempted(&self) -> bool {
        !matches!(self, RowOutcome::Skipped { .. })
    }

    pub fn delivery_url(&self) -> Option<&str> {
        match self {
            RowOutcome::Done { url, .. } => Some(url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRow {
    pub source: SourceRow,
    pub variant_sku: Cell,
    pub image_src: String,
    pub outcome: RowOutcome,
}

impl ProcessedRow {
    pub fn new(source: SourceRow, outcome: RowOutcome, failure_marker: Option<&str>) -> Self {
        let variant_sku = source.cell(SKU_COLUMN).cloned().unwrap_or(Cell::Empty);
        let image_src = match outcome.delivery_url() {
            Some(url) => url.to_string(),
            None => failure_marker.unwrap_or_default().to_string(),
        };
        Self {
            source,
            variant_sku,
            image_src,
            outcome,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Done { .. } => {
                self.attempted += 1;
                self.succeeded += 1;
            }
            RowOutcome::Failed { .. } => self.attempted += 1,
            RowOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub columns: Arc<[String]>,
    pub rows: Vec<ProcessedRow>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub output_path: String,
}

/// Raw image bytes plus the content type announced by the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// What the media host reports after a successful upload.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct UploadedAsset {
    pub public_id: String,
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub format: Option<String>,
}
