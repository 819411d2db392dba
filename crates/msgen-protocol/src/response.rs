//! Responses emitted by the generation service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job status reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job accepted, waiting for a worker.
    Queued,
    /// Generation pipeline is running.
    Processing,
    /// Result payload is available.
    Complete,
    /// Generation failed; `error` carries the reason.
    Failed,
    /// Job was cancelled (by the client or the service).
    Cancelled,
}

impl JobStatus {
    /// Terminal statuses never change again; the client must stop polling.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Complete | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

/// Pipeline stage within a processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Initializing,
    Rag,
    Ai,
    Generation,
    Validation,
    Complete,
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProgressStage::Initializing => "initialising job",
            ProgressStage::Rag => "retrieving regulation context",
            ProgressStage::Ai => "drafting with the model",
            ProgressStage::Generation => "assembling method statement",
            ProgressStage::Validation => "validating output",
            ProgressStage::Complete => "complete",
        };
        write!(f, "{}", label)
    }
}

/// Progress block within a status response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub stage: ProgressStage,

    #[serde(default)]
    pub message: String,
}

/// Response of the job creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedJob {
    /// Opaque job identifier issued by the service.
    #[serde(default)]
    pub job_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response of the status endpoint.
///
/// The body carries no job id; the client pairs each response with the id
/// it polled for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub status: JobStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,

    /// Raw generation result; opaque until `status == complete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<serde_json::Value>,

    /// Failure reason; present iff `status == failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatusResponse {
    /// A queued job with no progress yet.
    pub fn queued() -> Self {
        Self {
            status: JobStatus::Queued,
            progress: None,
            method_data: None,
            quality_metrics: None,
            error: None,
        }
    }

    /// A processing job at the given stage.
    pub fn processing(stage: ProgressStage, message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Processing,
            progress: Some(Progress {
                stage,
                message: message.into(),
            }),
            method_data: None,
            quality_metrics: None,
            error: None,
        }
    }

    /// A completed job carrying its result payload.
    pub fn complete(method_data: serde_json::Value) -> Self {
        Self {
            status: JobStatus::Complete,
            progress: Some(Progress {
                stage: ProgressStage::Complete,
                message: String::new(),
            }),
            method_data: Some(method_data),
            quality_metrics: None,
            error: None,
        }
    }

    /// A failed job with its error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            progress: None,
            method_data: None,
            quality_metrics: None,
            error: Some(error.into()),
        }
    }

    /// A cancelled job.
    pub fn cancelled() -> Self {
        Self {
            status: JobStatus::Cancelled,
            progress: None,
            method_data: None,
            quality_metrics: None,
            error: None,
        }
    }
}

/// Response of the cancel endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    /// Whether the service accepted the cancellation request.
    #[serde(default)]
    pub cancelled: bool,
}

/// Response of the PDF render endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub public_url: String,
}

/// Response of the service health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_time: Option<DateTime<Utc>>,
}

impl ServiceHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
