use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::ai::vendor::{adapter_for, VendorKind};
use crate::config::GenAiConfig;

#[derive(Debug, Error)]
pub enum VendorError {
    #[error("GENAI_API_KEY is not configured")]
    MissingApiKey,

    #[error("GENAI_API_URL is required for the {0} vendor")]
    MissingUrl(VendorKind),

    #[error("Invalid vendor URL {0}")]
    InvalidUrl(String),

    #[error("Failed to encode vendor request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Vendor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vendor returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// One prompt in, reply text out. The seam the suggestion service is tested through.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, VendorError>;
}

/// HTTP client for the configured vendor. One round trip per call, no retry.
pub struct GenAiClient {
    http: reqwest::Client,
    config: GenAiConfig,
}

impl GenAiClient {
    pub fn new(config: GenAiConfig) -> Result<Self, VendorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl TextGenerator for GenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, VendorError> {
        let adapter = adapter_for(&self.config)?;
        let request = adapter.build_request(prompt)?;
        debug!("Calling {} vendor at {}://{}{}", adapter.kind(), request.url.scheme(), request.url.host_str().unwrap_or(""), request.url.path());

        let mut builder = self.http.post(request.url).json(&request.body);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VendorError::Status { status: status.as_u16(), body });
        }

        let body: Value = response.json().await?;
        Ok(adapter.parse_response(&body))
    }
}
