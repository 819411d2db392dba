//! Service seam for the generation backend.
//!
//! [`Backend`] abstracts the four endpoints so the polling controller and
//! the CLI run identically against the HTTP service and the in-process
//! mock.

mod http;

pub use http::{HttpBackend, HttpBackendConfig};

use std::io;

use msgen_protocol::{
    CancelResponse, CreateJobRequest, CreatedJob, JobStatusResponse, RenderedDocument,
    ServiceError, ServiceHealth,
};

use crate::statement::export::ExportPayload;

/// Client-side view of the generation service.
pub trait Backend: Send + Sync {
    /// Check the service is reachable and healthy.
    fn health(&self) -> Result<ServiceHealth, BackendError>;

    /// Start a generation job.
    fn create_job(&self, request: &CreateJobRequest) -> Result<CreatedJob, BackendError>;

    /// Fetch the current status of a job.
    fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, BackendError>;

    /// Request best-effort cancellation of a job.
    fn cancel_job(&self, job_id: &str) -> Result<CancelResponse, BackendError>;

    /// Render an assembled statement to PDF.
    fn render_pdf(&self, payload: &ExportPayload) -> Result<RenderedDocument, BackendError>;
}

/// Backend call errors.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("service rejected the request: {0}")]
    Service(#[from] ServiceError),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl BackendError {
    /// Transient errors do not stop an active polling loop; the service
    /// remains the source of truth and the next tick retries.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::ConnectionFailed(_) | BackendError::Io(_)
        )
    }
}
