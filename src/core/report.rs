use crate::domain::model::{ProcessedRow, RowOutcome, RunSummary, SKU_COLUMN};

/// One console line per row, e.g. `✅ Row 2 501 → https://...`.
pub fn status_line(row: &ProcessedRow) -> String {
    let number = row.source.sheet_row();
    let sku = row.source.field(SKU_COLUMN);
    match &row.outcome {
        RowOutcome::Done { url, .. } => format!("✅ Row {} {} → {}", number, sku, url),
        RowOutcome::Failed { error, .. } => format!("❌ Row {} {}: {}", number, sku, error),
        RowOutcome::Skipped { reason } => format!("⏭️ Row {} {} – skipping", number, reason),
    }
}

pub fn summary_line(summary: &RunSummary) -> String {
    format!(
        "Done. Attempted: {}, Processed: {}",
        summary.attempted, summary.succeeded
    )
}

pub fn output_line(output_path: &str) -> String {
    format!("Output written to: {}", output_path)
}
