//! Client for the generation pipeline service.
//!
//! The pipeline is an opaque asynchronous worker reachable only over
//! HTTP: the orchestrator requests generation starts, forwards
//! quality-gate decisions, and relays cancellations; everything else
//! flows back through the worker's webhooks. Requests are signed with
//! the shared webhook secret when one is configured, so the worker can
//! authenticate the orchestrator the same way the orchestrator
//! authenticates the worker's callbacks.

use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use reelforge_core::quality_gate::DecisionForward;
use reelforge_core::signature::compute_signature;

/// HTTP request timeout for a single pipeline call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the HMAC-SHA256 body signature.
pub const SIGNATURE_HEADER: &str = "x-pipeline-signature";

/// Errors from pipeline service calls.
#[derive(Debug, thiserror::Error)]
pub enum PipelineClientError {
    /// The underlying HTTP request failed (network, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The pipeline service returned a non-2xx status code.
    #[error("Pipeline service returned HTTP {0}")]
    HttpStatus(u16),
}

/// Payload for requesting a new generation run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGeneration {
    pub job_id: Uuid,
    pub chat_id: Uuid,
    pub avatar_dna: Option<serde_json::Value>,
    pub avatar_ref_images: Option<serde_json::Value>,
    pub generation_settings: Option<serde_json::Value>,
}

/// Configuration handle for the pipeline service.
pub struct PipelineClient {
    http: reqwest::Client,
    base_url: String,
    signing_secret: Option<String>,
}

impl PipelineClient {
    /// Create a client targeting the pipeline service at `base_url`.
    ///
    /// `signing_secret`, when set, is used to sign outbound request
    /// bodies with HMAC-SHA256.
    pub fn new(base_url: impl Into<String>, signing_secret: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            http,
            base_url: base_url.into(),
            signing_secret,
        }
    }

    /// Base URL of the pipeline service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a new generation run for a job.
    pub async fn start_generation(
        &self,
        request: &StartGeneration,
    ) -> Result<(), PipelineClientError> {
        let url = format!("{}/generations", self.base_url);
        self.post_json(&url, request).await?;
        tracing::info!(job_id = %request.job_id, "Generation start requested");
        Ok(())
    }

    /// Forward a quality-gate decision to the pipeline.
    ///
    /// This is the decision engine's only durable effect; the worker's
    /// subsequent webhooks are what advance the job row.
    pub async fn submit_decision(
        &self,
        job_id: Uuid,
        forward: &DecisionForward,
    ) -> Result<(), PipelineClientError> {
        let url = format!("{}/generations/{}/decision", self.base_url, job_id);
        self.post_json(&url, forward).await?;
        tracing::info!(
            job_id = %job_id,
            decision = forward.decision.as_str(),
            scene_count = forward.scene_numbers.len(),
            "Quality-gate decision forwarded",
        );
        Ok(())
    }

    /// Relay a cancellation to the pipeline.
    pub async fn cancel(&self, job_id: Uuid) -> Result<(), PipelineClientError> {
        let url = format!("{}/generations/{}/cancel", self.base_url, job_id);
        self.post_json(&url, &serde_json::json!({})).await?;
        tracing::info!(job_id = %job_id, "Cancellation forwarded");
        Ok(())
    }

    /// Execute a signed POST and check the response status.
    async fn post_json<T: Serialize>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<(), PipelineClientError> {
        let body = serde_json::to_vec(payload).expect("payload serialization is infallible");

        let mut request = self
            .http
            .post(url)
            .header("content-type", "application/json");
        if let Some(secret) = &self.signing_secret {
            request = request.header(SIGNATURE_HEADER, compute_signature(secret, &body));
        }

        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            return Err(PipelineClientError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}
