//! Signed uploads against the Cloudinary upload API.
//!
//! The image travels as a base64 data URL in a form-encoded POST. Uploads are
//! always sent with `overwrite=true` and `unique_filename=false` so a re-run
//! replaces the asset stored under the same public ID.

use crate::config::credentials::Credentials;
use crate::domain::model::{FetchedImage, UploadedAsset};
use crate::domain::ports::MediaHost;
use crate::utils::error::{Result, UploadError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";

#[derive(Debug, Clone)]
pub struct CloudinaryUploader {
    client: Client,
    credentials: Credentials,
    api_base_url: String,
    folder: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryUploader {
    pub fn new(
        credentials: Credentials,
        api_base_url: &str,
        folder: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            folder: folder.filter(|f| !f.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base_url, self.credentials.cloud_name
        )
    }

    /// Parameters covered by the signature, before `api_key` and `signature` are added.
    fn signed_params(&self, public_id: &str, timestamp: i64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("overwrite", "true".to_string());
        params.insert("unique_filename", "false".to_string());
        params.insert("timestamp", timestamp.to_string());
        if !public_id.is_empty() {
            params.insert("public_id", public_id.to_string());
        }
        if let Some(folder) = &self.folder {
            params.insert("folder", folder.clone());
        }
        params
    }
}

/// Hex SHA-1 of `k=v` pairs sorted by key and joined with `&`, followed by the secret.
/// Empty values are left out.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn data_url(image: &FetchedImage) -> String {
    format!(
        "data:{};base64,{}",
        image.content_type,
        BASE64.encode(&image.bytes)
    )
}

#[async_trait]
impl MediaHost for CloudinaryUploader {
    async fn upload(
        &self,
        image: &FetchedImage,
        public_id: &str,
    ) -> std::result::Result<UploadedAsset, UploadError> {
        let timestamp = chrono::Utc::now().timestamp();
        let mut params = self.signed_params(public_id, timestamp);
        let signature = sign_params(&params, &self.credentials.api_secret);

        params.insert("file", data_url(image));
        params.insert("api_key", self.credentials.api_key.clone());
        params.insert("signature", signature);

        let endpoint = self.endpoint();
        tracing::debug!(
            "POST {} (public_id: {}, {} bytes)",
            endpoint,
            public_id,
            image.bytes.len()
        );

        let response = self
            .client
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| UploadError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| UploadError::Transport {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<UploadedAsset>(&body).map_err(|e| UploadError::InvalidResponse {
            reason: e.to_string(),
        })
    }
}
