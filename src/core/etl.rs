use crate::domain::model::RunReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Read, process every row, write. Only the first and last phase can fail.
    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting image enrichment");

        let sheet = self.pipeline.extract().await?;
        let total = sheet.rows.len();

        let result = self.pipeline.transform(sheet).await?;
        tracing::info!(
            "Processed {} of {} rows ({} attempted)",
            result.summary.succeeded,
            total,
            result.summary.attempted
        );

        self.pipeline.load(result).await
    }
}
