use crate::domain::model::{FetchedImage, RunReport, Sheet, TransformResult, UploadedAsset};
use crate::utils::error::{FetchError, Result, UploadError};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Downloads an image from its origin.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str, referer: Option<&str>) -> std::result::Result<FetchedImage, FetchError>;
}

/// Stores an image under a caller-chosen public ID. Re-uploading the same ID overwrites.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(
        &self,
        image: &FetchedImage,
        public_id: &str,
    ) -> std::result::Result<UploadedAsset, UploadError>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Sheet>;
    async fn transform(&self, sheet: Sheet) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<RunReport>;
}
