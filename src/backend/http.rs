//! HTTP implementation of the backend seam.
//!
//! Blocking JSON-over-HTTP client for the generation service. Error
//! bodies are parsed into [`ApiErrorPayload`] and surfaced as typed
//! service errors; transport failures stay distinct so the polling loop
//! can treat them as transient.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use msgen_protocol::{
    ApiErrorPayload, CancelResponse, CreateJobRequest, CreatedJob, JobStatusResponse,
    RenderedDocument, ServiceHealth,
};

use super::{Backend, BackendError};
use crate::statement::export::ExportPayload;

/// Connection settings for the HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Service root, e.g. `https://api.example.com/generation`.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking HTTP client for the generation service.
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, BackendError> {
        let response = self
            .agent
            .post(&self.url(path))
            .send_json(serde_json::to_value(body)?)
            .map_err(map_ureq_error)?;
        Ok(response.into_json::<T>()?)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self
            .agent
            .get(&self.url(path))
            .call()
            .map_err(map_ureq_error)?;
        Ok(response.into_json::<T>()?)
    }
}

fn map_ureq_error(err: ureq::Error) -> BackendError {
    match err {
        ureq::Error::Status(code, response) => match response.into_json::<ApiErrorPayload>() {
            Ok(payload) => BackendError::Service(payload.into()),
            Err(_) => BackendError::Protocol(format!("HTTP {} with unreadable error body", code)),
        },
        ureq::Error::Transport(transport) => BackendError::ConnectionFailed(transport.to_string()),
    }
}

impl Backend for HttpBackend {
    fn health(&self) -> Result<ServiceHealth, BackendError> {
        self.get_json("/health")
    }

    fn create_job(&self, request: &CreateJobRequest) -> Result<CreatedJob, BackendError> {
        self.post_json("/jobs", request)
    }

    fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, BackendError> {
        self.get_json(&format!("/jobs/{}", job_id))
    }

    fn cancel_job(&self, job_id: &str) -> Result<CancelResponse, BackendError> {
        self.post_json(&format!("/jobs/{}/cancel", job_id), &serde_json::json!({}))
    }

    fn render_pdf(&self, payload: &ExportPayload) -> Result<RenderedDocument, BackendError> {
        self.post_json("/render", payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new(HttpBackendConfig {
            base_url: "https://api.example.com/generation/".to_string(),
            ..Default::default()
        });
        assert_eq!(
            backend.url("/jobs/abc"),
            "https://api.example.com/generation/jobs/abc"
        );
    }

    #[test]
    fn test_default_config() {
        let config = HttpBackendConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.base_url.is_empty());
    }
}
