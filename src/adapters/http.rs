use crate::domain::model::FetchedImage;
use crate::domain::ports::ImageSource;
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Image downloads with a desktop-browser header set.
///
/// Some origins refuse hotlinking unless a matching `Referer` is sent, so the
/// row's starting page is forwarded when one is known.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(browser_headers())
            .build()?;
        Ok(Self { client })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

#[async_trait]
impl ImageSource for HttpImageFetcher {
    async fn fetch(&self, url: &str, referer: Option<&str>) -> std::result::Result<FetchedImage, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let mut request = self.client.get(url);
        if let Some(referer) = referer.filter(|r| !r.trim().is_empty()) {
            request = request.header(REFERER, referer.trim());
        }

        tracing::debug!("GET {} (referer: {:?})", url, referer);
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        tracing::debug!("Origin response status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher() -> HttpImageFetcher {
        HttpImageFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers_and_referer() {
        let server = MockServer::start();
        let origin = server.mock(|when, then| {
            when.method(GET)
                .path("/parts/blade.jpg")
                .header("Referer", "https://shop.example.com/blade")
                .header("Accept", IMAGE_ACCEPT)
                .header_exists("User-Agent");
            then.status(200)
                .header("Content-Type", "image/jpeg")
                .body(vec![0xFF, 0xD8, 0xFF]);
        });

        let image = fetcher()
            .fetch(&server.url("/parts/blade.jpg"), Some("https://shop.example.com/blade"))
            .await
            .unwrap();

        origin.assert();
        assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(image.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_fetch_without_content_type_defaults_to_png() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/raw");
            then.status(200).body("abc");
        });

        let image = fetcher().fetch(&server.url("/raw"), None).await.unwrap();
        assert_eq!(image.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_fetch_non_success_carries_status() {
        let server = MockServer::start();
        let origin = server.mock(|when, then| {
            when.method(GET).path("/missing.jpg");
            then.status(404);
        });

        let url = server.url("/missing.jpg");
        let err = fetcher().fetch(&url, Some("")).await.unwrap_err();

        origin.assert_hits(1);
        assert_eq!(err, FetchError::Status { url, status: 404 });
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let err = fetcher()
            .fetch("http://127.0.0.1:1/unreachable.jpg", None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
