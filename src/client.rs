//! HTTP client for the remote render service

use crate::config::ServiceOptions;
use crate::error::{Error, Result};
use crate::qr::{Endpoint, GeneratedQr, GenerationRequest};
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, warn};

/// Body and metadata of a successful image fetch
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// HTTP status returned by the server
    pub status: StatusCode,
    /// Reported `Content-Type`, if present
    pub content_type: Option<String>,
    /// Raw response body
    pub bytes: Bytes,
}

/// Client for a QR rendering endpoint
#[derive(Debug, Clone)]
pub struct QrClient {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl QrClient {
    /// Create a client against the public render service with default options
    pub fn new() -> Result<Self> {
        Self::from_options(&ServiceOptions::default())
    }

    /// Create a client from resolved service options
    pub fn from_options(options: &ServiceOptions) -> Result<Self> {
        let endpoint = Endpoint::parse(&options.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs.max(1)))
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    /// Endpoint this client renders against
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Render a QR image for `request`.
    ///
    /// One GET both checks that the service accepts the request and captures
    /// the image body. The returned URL is exactly the one that was fetched.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedQr> {
        let url = self.endpoint.url_for(request);
        debug!(%url, size = %request.size(), ecc = %request.error_correction(), "Requesting QR render");

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(%url, error = %e, "Render request failed");
            Error::Service(format!("request to {} failed: {e}", self.endpoint.base()))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Render service rejected request");
            return Err(Error::Service(format!(
                "render service answered {status}"
            )));
        }

        let content_type = content_type(&response);
        let image = response
            .bytes()
            .await
            .map_err(|e| Error::Service(format!("failed to read render response: {e}")))?;

        Ok(GeneratedQr {
            url: url.to_string(),
            text: request.text().to_string(),
            size: request.size(),
            error_correction: request.error_correction(),
            image,
            content_type,
        })
    }

    /// Fetch an arbitrary image URL for saving.
    ///
    /// Errors are reported as [`Error::Download`]: transport failures,
    /// non-success statuses and bodies that are not binary content.
    pub async fn fetch_image(&self, url: &str) -> Result<FetchedImage> {
        let response = self.http.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "Image fetch failed");
            Error::Download(format!("request to {url} failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(format!("{url} answered {status}")));
        }

        let content_type = content_type(&response);
        if let Some(kind) = content_type.as_deref() {
            if !is_binary_content_type(kind) {
                return Err(Error::Download(format!(
                    "{url} returned non-binary content ({kind})"
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Download(format!("failed to read {url}: {e}")))?;
        if bytes.is_empty() {
            return Err(Error::Download(format!("{url} returned an empty body")));
        }

        Ok(FetchedImage {
            status,
            content_type,
            bytes,
        })
    }
}

fn content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Whether a `Content-Type` describes binary payloads (images or opaque bytes).
pub fn is_binary_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if essence.starts_with("text/") {
        return false;
    }
    !matches!(
        essence.as_str(),
        "application/json" | "application/xml" | "application/xhtml+xml" | "application/javascript"
    ) && !essence.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_content_types() {
        assert!(is_binary_content_type("image/png"));
        assert!(is_binary_content_type("image/svg+xml"));
        assert!(is_binary_content_type("application/octet-stream"));
        assert!(is_binary_content_type(""));
        assert!(!is_binary_content_type("text/html; charset=utf-8"));
        assert!(!is_binary_content_type("Application/JSON"));
        assert!(!is_binary_content_type("application/problem+json"));
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let options = ServiceOptions {
            base_url: "file:///tmp/qr".to_string(),
            ..ServiceOptions::default()
        };
        assert!(matches!(QrClient::from_options(&options), Err(Error::Config(_))));
    }
}
