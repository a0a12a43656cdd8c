//! Poster byte retrieval.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rp_core::config::AnnotationConfig;
use rp_core::{Error, Result};
use tracing::{debug, warn};

use super::PosterSource;

/// Downloads posters over HTTP(S).
pub struct HttpPosterSource {
    http: reqwest::Client,
}

impl HttpPosterSource {
    pub fn new(config: &AnnotationConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });
        Self { http }
    }
}

#[async_trait]
impl PosterSource for HttpPosterSource {
    async fn fetch_poster(&self, url: &str) -> Result<Bytes> {
        debug!(url, "Downloading poster");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::upstream("poster", format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::upstream("poster", format!("HTTP {} for {url}", resp.status())));
        }

        let data = resp
            .bytes()
            .await
            .map_err(|e| Error::upstream("poster", format!("body read failed: {e}")))?;

        if data.is_empty() {
            return Err(Error::upstream("poster", format!("empty body for {url}")));
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source() -> HttpPosterSource {
        HttpPosterSource::new(&AnnotationConfig::default())
    }

    #[tokio::test]
    async fn returns_body_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/poster.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let data = source()
            .fetch_poster(&format!("{}/poster.jpg", server.uri()))
            .await
            .unwrap();
        assert_eq!(&data[..], &[1, 2, 3]);
    }

    #[tokio::test]
    async fn non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source()
            .fetch_poster(&format!("{}/missing.jpg", server.uri()))
            .await
            .unwrap_err();
        assert_matches!(err, Error::Upstream { ref service, .. } if service == "poster");
    }

    #[tokio::test]
    async fn unreachable_host_is_error() {
        assert!(source().fetch_poster("http://127.0.0.1:1/poster.jpg").await.is_err());
    }
}
