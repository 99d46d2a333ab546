use thiserror::Error;
use tracing::debug;

use flowlens_proto::{EngineConfig, StartAck, StartRequest};

/// HTTP side of the engine: start requests and the one-shot config query.
/// These are plain request/response calls, separate from the event stream.
#[derive(Clone)]
pub struct EngineApi {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Engine rejected the request ({status}): {detail}")]
    Rejected { status: reqwest::StatusCode, detail: String },
}

impl EngineApi {
    pub fn new(base_url: impl Into<String>) -> Self { Self { http: reqwest::Client::new(), base_url: base_url.into() } }

    /// `POST /start-algorithm`. A non-success status is surfaced with the
    /// engine's detail message when the body carries one.
    pub async fn start(&self, request: &StartRequest) -> Result<StartAck, ApiError> {
        debug!("starting {} on {}", request.algorithm, request.graph_file);
        let response = self.http.post(format!("{}/start-algorithm", self.base_url)).json(request).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await.unwrap_or_default())
        } else {
            let detail = response
                .json::<StartAck>()
                .await
                .ok()
                .and_then(|ack| ack.detail)
                .unwrap_or_else(|| status.to_string());
            Err(ApiError::Rejected { status, detail })
        }
    }

    /// `GET /config`, consumed once at startup to populate selectable options.
    pub async fn fetch_config(&self) -> Result<EngineConfig, ApiError> {
        let response = self.http.get(format!("{}/config", self.base_url)).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
