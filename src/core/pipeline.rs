use crate::adapters::sheet::{decode_sheet, encode_sheet, SheetFormat};
use crate::config::Settings;
use crate::core::delivery::DeliveryUrlBuilder;
use crate::core::naming::{self, NamingHints};
use crate::core::report;
use crate::domain::model::{
    Cell, ProcessedRow, RowOutcome, RowStage, RunReport, RunSummary, Sheet, SourceRow, TransformResult,
    ALT_TEXT_COLUMN, IMAGE_COLUMN, IMAGE_SRC_COLUMN, PRODUCT_NAME_COLUMN, REFERER_COLUMN, SKU_COLUMN,
    VARIANT_SKU_COLUMN,
};
use crate::domain::ports::{ImageSource, MediaHost, Pipeline, Storage};
use crate::utils::error::Result;

/// Spreadsheet in, one fetch and one upload per row, spreadsheet out.
///
/// Rows run strictly one after another. Per-row failures are recorded on the
/// row and never abort the run; only reading the input and writing the output
/// can fail the whole pipeline.
pub struct EnrichPipeline<S: Storage, F: ImageSource, H: MediaHost> {
    storage: S,
    fetcher: F,
    host: H,
    delivery: DeliveryUrlBuilder,
    settings: Settings,
    console: Box<dyn Fn(&str) + Send + Sync>,
}

/// What a row will be uploaded as, shown by `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRow {
    pub sheet_row: usize,
    pub sku: String,
    /// `Err` holds the reason the row would be skipped.
    pub public_id: std::result::Result<String, String>,
}

struct RowJob<'a> {
    image_url: &'a str,
    referer: Option<&'a str>,
    public_id: String,
}

fn prepare(row: &SourceRow, use_alt_text: bool) -> std::result::Result<RowJob<'_>, String> {
    let sku = row.field(SKU_COLUMN);
    if sku.is_empty() {
        return Err("Missing SKU".to_string());
    }

    let image_url = row.field(IMAGE_COLUMN);
    if image_url.is_empty() {
        return Err(format!("Empty Image cell for {}", sku));
    }

    let hints = NamingHints {
        alt_text: row.field(ALT_TEXT_COLUMN),
        product_name: row.field(PRODUCT_NAME_COLUMN),
        sku,
    };
    let referer = Some(row.field(REFERER_COLUMN)).filter(|r| !r.is_empty());

    Ok(RowJob {
        image_url,
        referer,
        public_id: naming::public_id(&hints, use_alt_text),
    })
}

impl<S: Storage, F: ImageSource, H: MediaHost> EnrichPipeline<S, F, H> {
    pub fn new(storage: S, fetcher: F, host: H, delivery: DeliveryUrlBuilder, settings: Settings) -> Self {
        Self {
            storage,
            fetcher,
            host,
            delivery,
            settings,
            console: Box::new(|line| println!("{}", line)),
        }
    }

    /// Sends row status lines and the totals somewhere other than stdout.
    pub fn with_console(mut self, console: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.console = Box::new(console);
        self
    }

    pub fn plan(&self, sheet: &Sheet) -> Vec<PlannedRow> {
        sheet
            .rows
            .iter()
            .map(|row| PlannedRow {
                sheet_row: row.sheet_row(),
                sku: row.field(SKU_COLUMN).to_string(),
                public_id: prepare(row, self.settings.use_alt_text).map(|job| job.public_id),
            })
            .collect()
    }

    /// Runs one row through fetch, upload and URL building. Never fails; the
    /// outcome says how far the row got.
    pub async fn process_row(&self, row: &SourceRow) -> RowOutcome {
        let job = match prepare(row, self.settings.use_alt_text) {
            Ok(job) => job,
            Err(reason) => return RowOutcome::Skipped { reason },
        };
        let sheet_row = row.sheet_row();

        tracing::debug!(sheet_row, stage = ?RowStage::Fetching, "{}", job.image_url);
        let image = match self.fetcher.fetch(job.image_url, job.referer).await {
            Ok(image) => image,
            Err(e) => {
                return RowOutcome::Failed {
                    stage: RowStage::Fetching,
                    error: e.into(),
                }
            }
        };

        tracing::debug!(sheet_row, stage = ?RowStage::Uploading, "{} ({} bytes)", job.public_id, image.bytes.len());
        let asset = match self.host.upload(&image, &job.public_id).await {
            Ok(asset) => asset,
            Err(e) => {
                return RowOutcome::Failed {
                    stage: RowStage::Uploading,
                    error: e.into(),
                }
            }
        };

        tracing::debug!(sheet_row, stage = ?RowStage::Transforming, "{}", asset.public_id);
        let url = self.delivery.build(&asset);

        tracing::debug!(sheet_row, stage = ?RowStage::Done, "{}", url);
        RowOutcome::Done {
            public_id: asset.public_id,
            url,
        }
    }
}

/// Finds `name` in the output header, appending it when the input lacks it.
fn column_slot(columns: &mut Vec<String>, name: &str) -> usize {
    match columns.iter().position(|c| c.trim() == name) {
        Some(index) => index,
        None => {
            columns.push(name.to_string());
            columns.len() - 1
        }
    }
}

/// Output header and cell grid: original columns in order, then Variant SKU and Image Src.
pub fn output_table(columns: &[String], rows: &[ProcessedRow]) -> (Vec<String>, Vec<Vec<Cell>>) {
    let mut header = columns.to_vec();
    let variant_slot = column_slot(&mut header, VARIANT_SKU_COLUMN);
    let src_slot = column_slot(&mut header, IMAGE_SRC_COLUMN);

    let cells = rows
        .iter()
        .map(|row| {
            let mut values = row.source.cells().to_vec();
            values.resize(header.len(), Cell::Empty);
            values[variant_slot] = row.variant_sku.clone();
            values[src_slot] = Cell::from(row.image_src.as_str());
            values
        })
        .collect();

    (header, cells)
}

#[async_trait::async_trait]
impl<S: Storage, F: ImageSource, H: MediaHost> Pipeline for EnrichPipeline<S, F, H> {
    async fn extract(&self) -> Result<Sheet> {
        let path = &self.settings.input_path;
        let format = SheetFormat::from_path(path)?;

        tracing::info!("📥 Reading {}", path);
        let data = self.storage.read_file(path).await?;
        let sheet = decode_sheet(&data, format, self.settings.input_sheet.as_deref())?;

        tracing::info!(
            "📊 Loaded {} rows with {} columns",
            sheet.rows.len(),
            sheet.columns.len()
        );
        Ok(sheet)
    }

    async fn transform(&self, sheet: Sheet) -> Result<TransformResult> {
        let mut summary = RunSummary::default();
        let mut rows = Vec::with_capacity(sheet.rows.len());
        let marker = self.settings.failure_marker.as_deref();

        for source in sheet.rows {
            let outcome = self.process_row(&source).await;
            let attempted = outcome.was_attempted();
            summary.record(&outcome);

            let processed = ProcessedRow::new(source, outcome, marker);
            (self.console)(&report::status_line(&processed));
            rows.push(processed);

            if attempted {
                tokio::time::sleep(self.settings.throttle).await;
            }
        }

        tracing::info!(
            "🔧 Rows attempted: {}, succeeded: {}, failed: {}, skipped: {}",
            summary.attempted,
            summary.succeeded,
            summary.failed(),
            summary.skipped
        );
        (self.console)(&report::summary_line(&summary));

        Ok(TransformResult {
            columns: sheet.columns,
            rows,
            summary,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<RunReport> {
        let path = &self.settings.output_path;
        let format = SheetFormat::from_path(path)?;
        let (header, cells) = output_table(&result.columns, &result.rows);

        let data = encode_sheet(&header, &cells, format, &self.settings.output_sheet)?;
        tracing::debug!("Writing {} rows ({} bytes) to {}", cells.len(), data.len(), path);
        self.storage.write_file(path, &data).await?;

        tracing::info!("💾 Output saved: {}", path);
        Ok(RunReport {
            summary: result.summary,
            output_path: path.clone(),
        })
    }
}
