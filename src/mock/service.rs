//! Mock service implementation.
//!
//! Jobs advance one scripted tick per status call, so tests control the
//! exact sequence of responses a poller observes. The final tick repeats
//! on every further call, which is what lets lifecycle tests replay the
//! duplicate-`complete` race.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Value};

use msgen_protocol::{
    codes, ApiErrorPayload, CancelResponse, CreateJobRequest, CreatedJob, JobStatusResponse,
    ProgressStage, RenderedDocument, ServiceHealth,
};

use super::failure::{Endpoint, FailureInjector, InjectedFailure};
use crate::backend::{Backend, BackendError};
use crate::statement::export::ExportPayload;

#[derive(Debug)]
struct MockJob {
    script: Vec<JobStatusResponse>,
    cursor: usize,
    cancelled: bool,
}

impl MockJob {
    fn current(&self) -> &JobStatusResponse {
        let last = self.script.len() - 1;
        &self.script[self.cursor.min(last)]
    }
}

/// Configurable mock generation service.
pub struct MockService {
    jobs: Mutex<HashMap<String, MockJob>>,
    failures: Mutex<FailureInjector>,
    next_script: Mutex<Option<Vec<JobStatusResponse>>>,
    created: Mutex<Vec<String>>,
    rendered: Mutex<Vec<ExportPayload>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            failures: Mutex::new(FailureInjector::new()),
            next_script: Mutex::new(None),
            created: Mutex::new(Vec::new()),
            rendered: Mutex::new(Vec::new()),
        }
    }

    // === Test configuration ===

    /// Script the status sequence of the next created job. Empty scripts
    /// fall back to a single `queued` tick.
    pub fn script_next_job(&self, script: Vec<JobStatusResponse>) {
        *self.next_script.lock().unwrap() = Some(script);
    }

    /// Queue a failure for the next call to `endpoint`.
    pub fn inject_failure(&self, endpoint: Endpoint, failure: InjectedFailure) {
        self.failures.lock().unwrap().inject(endpoint, failure);
    }

    /// Queue a service rejection for the next call to `endpoint`.
    pub fn inject_service_error(&self, endpoint: Endpoint, code: &str, message: &str) {
        self.inject_failure(
            endpoint,
            InjectedFailure::Service(ApiErrorPayload::new(code, message)),
        );
    }

    /// Queue a network failure for the next call to `endpoint`.
    pub fn inject_connection_error(&self, endpoint: Endpoint) {
        self.inject_failure(
            endpoint,
            InjectedFailure::Connection("connection reset by peer".to_string()),
        );
    }

    /// Job ids in creation order.
    pub fn created_jobs(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    /// Payloads received by the render endpoint.
    pub fn rendered_payloads(&self) -> Vec<ExportPayload> {
        self.rendered.lock().unwrap().clone()
    }

    /// Full pipeline progression ending in `complete` with sample data.
    pub fn default_script() -> Vec<JobStatusResponse> {
        vec![
            JobStatusResponse::queued(),
            JobStatusResponse::processing(ProgressStage::Initializing, "preparing job"),
            JobStatusResponse::processing(ProgressStage::Rag, "retrieving regulation context"),
            JobStatusResponse::processing(ProgressStage::Ai, "drafting steps"),
            JobStatusResponse::processing(ProgressStage::Generation, "assembling method statement"),
            JobStatusResponse::processing(ProgressStage::Validation, "checking output"),
            JobStatusResponse::complete(Self::sample_method_data()),
        ]
    }

    /// Sample result payload. Deliberately mixes legacy and canonical
    /// step field names so the mapper is exercised end to end.
    pub fn sample_method_data() -> Value {
        json!({
            "steps": [
                {
                    "step": 1,
                    "title": "Isolate and prove dead",
                    "description": "Isolate the circuit at the consumer unit.\n1. Safe Isolation\n• Lock off the breaker\n• Prove dead with a GS38 tester\nBS 7671 Section 132 applies.",
                    "safetyNotes": ["Use a voltage indicator proved before and after"],
                    "tools": ["lock-off kit", "two-pole tester"],
                    "riskLevel": "high",
                    "estimatedTime": 20
                },
                {
                    "stepNumber": 2,
                    "title": "First fix wiring",
                    "content": "Run 2.5mm twin and earth between points, clipped at 300mm centres.",
                    "toolsRequired": ["side cutters", "clip gun"],
                    "materialsNeeded": ["2.5mm T&E"],
                    "regulations": ["Table 4D5"],
                    "estimatedDuration": "90 mins"
                }
            ],
            "executiveSummary": "Installation of a new domestic ring final circuit.",
            "materialsList": ["2.5mm T&E", "35mm back boxes"],
            "testingRequirements": {"initialVerification": ["continuity", "insulation resistance"]},
            "regulatoryReferences": ["BS 7671 Section 522", "BS 7671 Section 132"]
        })
    }

    fn take_failure(&self, endpoint: Endpoint) -> Option<BackendError> {
        self.failures
            .lock()
            .unwrap()
            .take(endpoint)
            .map(InjectedFailure::into_error)
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MockService {
    fn health(&self) -> Result<ServiceHealth, BackendError> {
        Ok(ServiceHealth {
            status: "healthy".to_string(),
            version: Some("mock".to_string()),
            boot_time: Some(Utc::now()),
        })
    }

    fn create_job(&self, request: &CreateJobRequest) -> Result<CreatedJob, BackendError> {
        if let Some(err) = self.take_failure(Endpoint::CreateJob) {
            return Err(err);
        }
        if request.query.trim().is_empty() {
            return Err(BackendError::Service(
                ApiErrorPayload::new(codes::INVALID_REQUEST, "query must not be empty").into(),
            ));
        }

        let job_id = ulid::Ulid::new().to_string().to_lowercase();
        let mut script = self
            .next_script
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(Self::default_script);
        if script.is_empty() {
            script.push(JobStatusResponse::queued());
        }

        self.jobs.lock().unwrap().insert(
            job_id.clone(),
            MockJob {
                script,
                cursor: 0,
                cancelled: false,
            },
        );
        self.created.lock().unwrap().push(job_id.clone());

        Ok(CreatedJob {
            job_id,
            created_at: Some(Utc::now()),
        })
    }

    fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, BackendError> {
        if let Some(err) = self.take_failure(Endpoint::JobStatus) {
            return Err(err);
        }

        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(job_id).ok_or_else(|| {
            BackendError::Service(ApiErrorPayload::new(codes::JOB_NOT_FOUND, "no such job").into())
        })?;

        if job.cancelled {
            return Ok(JobStatusResponse::cancelled());
        }

        let response = job.current().clone();
        job.cursor += 1;
        Ok(response)
    }

    fn cancel_job(&self, job_id: &str) -> Result<CancelResponse, BackendError> {
        if let Some(err) = self.take_failure(Endpoint::CancelJob) {
            return Err(err);
        }

        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(job_id).ok_or_else(|| {
            BackendError::Service(ApiErrorPayload::new(codes::JOB_NOT_FOUND, "no such job").into())
        })?;

        // A job whose terminal tick has already been served cannot be
        // cancelled.
        let served_terminal = job.cursor >= job.script.len() && job.current().status.is_terminal();
        if !job.cancelled && served_terminal {
            return Ok(CancelResponse { cancelled: false });
        }

        job.cancelled = true;
        Ok(CancelResponse { cancelled: true })
    }

    fn render_pdf(&self, payload: &ExportPayload) -> Result<RenderedDocument, BackendError> {
        if let Some(err) = self.take_failure(Endpoint::RenderPdf) {
            return Err(err);
        }

        self.rendered.lock().unwrap().push(payload.clone());
        let document_id = ulid::Ulid::new().to_string().to_lowercase();
        Ok(RenderedDocument {
            public_url: format!("https://documents.example/statements/{}.pdf", document_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgen_protocol::JobStatus;

    fn make_request() -> CreateJobRequest {
        CreateJobRequest::new("Install a ring final circuit")
    }

    #[test]
    fn test_default_progression_reaches_complete() {
        let service = MockService::new();
        let created = service.create_job(&make_request()).unwrap();

        let mut statuses = Vec::new();
        for _ in 0..MockService::default_script().len() {
            statuses.push(service.job_status(&created.job_id).unwrap().status);
        }

        assert_eq!(statuses.first(), Some(&JobStatus::Queued));
        assert_eq!(statuses.last(), Some(&JobStatus::Complete));
    }

    #[test]
    fn test_terminal_tick_repeats() {
        let service = MockService::new();
        service.script_next_job(vec![JobStatusResponse::complete(json!({"steps": []}))]);
        let created = service.create_job(&make_request()).unwrap();

        for _ in 0..3 {
            let response = service.job_status(&created.job_id).unwrap();
            assert_eq!(response.status, JobStatus::Complete);
        }
    }

    #[test]
    fn test_unknown_job_is_service_error() {
        let service = MockService::new();
        let err = service.job_status("missing").unwrap_err();
        assert!(matches!(err, BackendError::Service(e) if e.code == codes::JOB_NOT_FOUND));
    }

    #[test]
    fn test_cancel_marks_job_cancelled() {
        let service = MockService::new();
        let created = service.create_job(&make_request()).unwrap();

        let ack = service.cancel_job(&created.job_id).unwrap();
        assert!(ack.cancelled);

        let response = service.job_status(&created.job_id).unwrap();
        assert_eq!(response.status, JobStatus::Cancelled);
    }

    #[test]
    fn test_cancel_after_terminal_tick_declined() {
        let service = MockService::new();
        service.script_next_job(vec![JobStatusResponse::complete(json!({"steps": []}))]);
        let created = service.create_job(&make_request()).unwrap();

        service.job_status(&created.job_id).unwrap();
        let ack = service.cancel_job(&created.job_id).unwrap();
        assert!(!ack.cancelled);
    }

    #[test]
    fn test_empty_query_rejected() {
        let service = MockService::new();
        let err = service
            .create_job(&CreateJobRequest::new("   "))
            .unwrap_err();
        assert!(matches!(err, BackendError::Service(e) if e.code == codes::INVALID_REQUEST));
    }

    #[test]
    fn test_injected_connection_error_is_one_shot() {
        let service = MockService::new();
        let created = service.create_job(&make_request()).unwrap();

        service.inject_connection_error(Endpoint::JobStatus);
        assert!(service.job_status(&created.job_id).unwrap_err().is_transient());
        assert!(service.job_status(&created.job_id).is_ok());
    }
}
