//! Job polling controller.
//!
//! Owns the lifecycle of a single generation job: submit, poll on an
//! interval, interpret status, cancel, and surface the terminal result.
//!
//! Phases: `Idle` → `Polling` → `Terminal{Complete | Failed | Cancelled}`.
//! The polling interval is explicit controller state rather than an OS
//! timer, which makes the at-most-one-loop and supervised-restart rules
//! checkable:
//! - `submit` stops any prior interval before starting the new one;
//! - `tick` restarts a suspended interval while the job is live;
//! - every terminal transition stops the interval.
//!
//! Responses are paired with the job id they were requested for; a late
//! response for another job, or one arriving after a terminal transition,
//! is dropped. Once terminal, local state is authoritative.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use msgen_protocol::{CreateJobRequest, JobStatus, JobStatusResponse, Progress};

use crate::backend::{Backend, BackendError};
use crate::statement::{mapper, MethodStatement};

/// Polling cadence and limits.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between status polls.
    pub poll_interval: Duration,

    /// Hard ceiling on a generation run; matches the service's own
    /// execution limit.
    pub overall_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            overall_timeout: Duration::from_secs(420),
        }
    }
}

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No job in flight.
    Idle,
    /// Actively polling a submitted job.
    Polling,
    /// Job reached a terminal status; polling stopped.
    Terminal(Outcome),
}

/// Terminal outcome of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    Failed,
    Cancelled,
}

/// Result handed to the caller exactly once per completed job.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub job_id: String,
    pub statement: MethodStatement,
    pub quality_metrics: Option<serde_json::Value>,
}

/// What a single tick observed.
#[derive(Debug)]
pub enum Tick {
    /// Nothing to poll.
    Idle,
    /// Job still queued or processing.
    Progress(Option<Progress>),
    /// First (and only) completion for this job.
    Completed(Box<GenerationOutcome>),
    /// Service reported failure.
    Failed(String),
    /// Cancellation confirmed by the service.
    Cancelled(String),
    /// Response for another job id; dropped.
    Stale,
    /// The job is already terminal locally; no side effects.
    AlreadyTerminal,
    /// Poll fetch failed; the loop keeps going.
    TransientError(BackendError),
}

/// Errors from [`JobPoller::submit`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("service accepted the job but returned no job id")]
    MissingJobId,

    #[error("a job is already in flight; cancel it before submitting another")]
    JobInFlight,
}

/// Errors from [`JobPoller::cancel`].
#[derive(Debug, thiserror::Error)]
pub enum CancelError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("no job is being polled")]
    NotPolling,

    #[error("service declined to cancel the job")]
    Declined,
}

/// Terminal errors from [`JobPoller::run`].
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("generation failed: {message}")]
    JobFailed { message: String },

    #[error("generation cancelled: {reason}")]
    Cancelled { reason: String },

    #[error("generation timed out after {seconds}s")]
    TimedOut { seconds: u64 },
}

/// Failure taxonomy for CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport failures (exit code 20)
    Transport = 20,
    /// Job creation rejected (exit code 30)
    Submission = 30,
    /// Service reported generation failure (exit code 40)
    Generation = 40,
    /// Job cancelled (exit code 50)
    Cancelled = 50,
    /// Overall timeout exceeded (exit code 60)
    Timeout = 60,
    /// Export/render failures (exit code 70)
    Export = 70,
}

impl GenerateError {
    /// Map error to failure kind for exit code.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            GenerateError::Submit(SubmitError::Backend(err)) if err.is_transient() => {
                FailureKind::Transport
            }
            GenerateError::Submit(_) => FailureKind::Submission,
            GenerateError::JobFailed { .. } => FailureKind::Generation,
            GenerateError::Cancelled { .. } => FailureKind::Cancelled,
            GenerateError::TimedOut { .. } => FailureKind::Timeout,
        }
    }

    /// Get exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.failure_kind() as i32
    }
}

/// Polling controller for one generation job at a time.
pub struct JobPoller {
    backend: Arc<dyn Backend>,
    config: PollerConfig,
    phase: Phase,
    job_id: Option<String>,
    interval_active: bool,
    completion_fired: bool,
    consecutive_failures: u32,
    last_progress: Option<Progress>,
}

impl JobPoller {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_config(backend, PollerConfig::default())
    }

    pub fn with_config(backend: Arc<dyn Backend>, config: PollerConfig) -> Self {
        Self {
            backend,
            config,
            phase: Phase::Idle,
            job_id: None,
            interval_active: false,
            completion_fired: false,
            consecutive_failures: 0,
            last_progress: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn interval_active(&self) -> bool {
        self.interval_active
    }

    pub fn last_progress(&self) -> Option<&Progress> {
        self.last_progress.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Submit a generation request and start polling.
    ///
    /// On failure (or a response without a job id) the controller stays
    /// `Idle`; job creation is never retried automatically.
    pub fn submit(&mut self, request: &CreateJobRequest) -> Result<String, SubmitError> {
        if self.phase == Phase::Polling {
            return Err(SubmitError::JobInFlight);
        }

        let created = self.backend.create_job(request)?;
        if created.job_id.is_empty() {
            return Err(SubmitError::MissingJobId);
        }

        debug!("job {} submitted", created.job_id);
        self.job_id = Some(created.job_id.clone());
        self.phase = Phase::Polling;
        self.completion_fired = false;
        self.consecutive_failures = 0;
        self.last_progress = None;
        self.stop_interval();
        self.start_interval();
        Ok(created.job_id)
    }

    /// One poll step.
    pub fn tick(&mut self) -> Tick {
        let job_id = match (&self.phase, &self.job_id) {
            (Phase::Polling, Some(id)) => id.clone(),
            (Phase::Terminal(_), _) => return Tick::AlreadyTerminal,
            _ => return Tick::Idle,
        };

        // A live job with a stopped interval means the loop was suspended;
        // resume it instead of stalling.
        if !self.interval_active {
            warn!("job {}: polling interval stopped while job is live; restarting", job_id);
            self.start_interval();
        }

        match self.backend.job_status(&job_id) {
            Ok(response) => self.handle_status(&job_id, response),
            Err(err) => {
                self.consecutive_failures += 1;
                warn!(
                    "job {}: status poll failed ({}); retrying on next tick",
                    job_id, err
                );
                Tick::TransientError(err)
            }
        }
    }

    /// Interpret a status response for `job_id`.
    ///
    /// Exposed so raced or late responses can be replayed directly. A
    /// response for a different job, or one arriving after a terminal
    /// transition, is dropped without side effects.
    pub fn handle_status(&mut self, job_id: &str, response: JobStatusResponse) -> Tick {
        if self.job_id.as_deref() != Some(job_id) {
            debug!("dropping status for stale job {}", job_id);
            return Tick::Stale;
        }
        if matches!(self.phase, Phase::Terminal(_)) {
            return Tick::AlreadyTerminal;
        }

        self.consecutive_failures = 0;

        match response.status {
            JobStatus::Queued | JobStatus::Processing => {
                self.last_progress = response.progress.clone();
                Tick::Progress(response.progress)
            }
            JobStatus::Complete => {
                if self.completion_fired {
                    return Tick::AlreadyTerminal;
                }
                self.completion_fired = true;
                self.stop_interval();
                self.phase = Phase::Terminal(Outcome::Complete);

                let raw = response.method_data.unwrap_or(serde_json::Value::Null);
                let statement = mapper::map_statement(&raw);
                debug!("job {}: complete with {} steps", job_id, statement.steps.len());

                Tick::Completed(Box::new(GenerationOutcome {
                    job_id: job_id.to_string(),
                    statement,
                    quality_metrics: response.quality_metrics,
                }))
            }
            JobStatus::Failed => {
                self.stop_interval();
                self.phase = Phase::Terminal(Outcome::Failed);
                Tick::Failed(
                    response
                        .error
                        .unwrap_or_else(|| "generation failed".to_string()),
                )
            }
            JobStatus::Cancelled => {
                self.stop_interval();
                self.phase = Phase::Terminal(Outcome::Cancelled);
                Tick::Cancelled(
                    response
                        .error
                        .unwrap_or_else(|| "cancelled by the service".to_string()),
                )
            }
        }
    }

    /// Request cancellation of the in-flight job.
    ///
    /// On success the local terminal state is authoritative: any poll
    /// response still in flight for this job is dropped. A failed or
    /// declined cancel call leaves the controller polling.
    pub fn cancel(&mut self) -> Result<(), CancelError> {
        let job_id = match (&self.phase, &self.job_id) {
            (Phase::Polling, Some(id)) => id.clone(),
            _ => return Err(CancelError::NotPolling),
        };

        let ack = self.backend.cancel_job(&job_id)?;
        if !ack.cancelled {
            return Err(CancelError::Declined);
        }

        self.stop_interval();
        self.phase = Phase::Terminal(Outcome::Cancelled);
        debug!("job {}: cancelled on request", job_id);
        Ok(())
    }

    /// Stop the interval without touching the job (the driving loop went
    /// away). The next `tick` restarts it.
    pub fn suspend_interval(&mut self) {
        self.interval_active = false;
    }

    fn start_interval(&mut self) {
        // idempotent; there is never more than one interval per poller
        self.interval_active = true;
    }

    fn stop_interval(&mut self) {
        self.interval_active = false;
    }

    /// Drive a request to a terminal state, sleeping `poll_interval`
    /// between ticks.
    ///
    /// `cancel_requested` is the Ctrl-C bridge: when set, a cancel RPC is
    /// issued before the next poll. `on_progress` receives every non-
    /// terminal update.
    pub fn run(
        &mut self,
        request: &CreateJobRequest,
        cancel_requested: &AtomicBool,
        mut on_progress: impl FnMut(&str, Option<&Progress>),
    ) -> Result<GenerationOutcome, GenerateError> {
        let job_id = self.submit(request)?;
        let started = Instant::now();

        loop {
            if cancel_requested.swap(false, Ordering::SeqCst) {
                match self.cancel() {
                    Ok(()) => {
                        return Err(GenerateError::Cancelled {
                            reason: "cancelled by user".to_string(),
                        })
                    }
                    Err(err) => {
                        warn!("job {}: cancel failed ({}); still polling", job_id, err);
                    }
                }
            }

            if started.elapsed() >= self.config.overall_timeout {
                // tell the service before giving up, best effort
                let _ = self.cancel();
                return Err(GenerateError::TimedOut {
                    seconds: self.config.overall_timeout.as_secs(),
                });
            }

            std::thread::sleep(self.config.poll_interval);

            match self.tick() {
                Tick::Progress(progress) => on_progress(&job_id, progress.as_ref()),
                Tick::Completed(outcome) => return Ok(*outcome),
                Tick::Failed(message) => return Err(GenerateError::JobFailed { message }),
                Tick::Cancelled(reason) => return Err(GenerateError::Cancelled { reason }),
                Tick::TransientError(_) | Tick::Stale => {}
                Tick::Idle | Tick::AlreadyTerminal => {
                    return Err(GenerateError::JobFailed {
                        message: "polling stopped without a terminal status".to_string(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockService;
    use msgen_protocol::ProgressStage;
    use serde_json::json;

    fn make_request() -> CreateJobRequest {
        CreateJobRequest::new("Install a cooker circuit")
    }

    fn poller(service: &Arc<MockService>) -> JobPoller {
        JobPoller::new(Arc::clone(service) as Arc<dyn Backend>)
    }

    #[test]
    fn test_initial_phase_is_idle() {
        let service = Arc::new(MockService::new());
        let poller = poller(&service);
        assert_eq!(poller.phase(), Phase::Idle);
        assert!(!poller.interval_active());
        assert!(poller.job_id().is_none());
    }

    #[test]
    fn test_tick_while_idle_does_nothing() {
        let service = Arc::new(MockService::new());
        let mut poller = poller(&service);
        assert!(matches!(poller.tick(), Tick::Idle));
    }

    #[test]
    fn test_submit_starts_polling() {
        let service = Arc::new(MockService::new());
        let mut poller = poller(&service);

        let job_id = poller.submit(&make_request()).unwrap();
        assert_eq!(poller.phase(), Phase::Polling);
        assert_eq!(poller.job_id(), Some(job_id.as_str()));
        assert!(poller.interval_active());
    }

    #[test]
    fn test_submit_while_polling_rejected() {
        let service = Arc::new(MockService::new());
        let mut poller = poller(&service);

        poller.submit(&make_request()).unwrap();
        assert!(matches!(
            poller.submit(&make_request()),
            Err(SubmitError::JobInFlight)
        ));
    }

    #[test]
    fn test_progress_updates_recorded() {
        let service = Arc::new(MockService::new());
        service.script_next_job(vec![
            JobStatusResponse::processing(ProgressStage::Rag, "searching"),
            JobStatusResponse::complete(json!({"steps": []})),
        ]);
        let mut poller = poller(&service);
        poller.submit(&make_request()).unwrap();

        assert!(matches!(poller.tick(), Tick::Progress(Some(_))));
        let progress = poller.last_progress().unwrap();
        assert_eq!(progress.stage, ProgressStage::Rag);
    }

    #[test]
    fn test_completion_maps_statement() {
        let service = Arc::new(MockService::new());
        let mut poller = poller(&service);
        poller.submit(&make_request()).unwrap();

        let outcome = loop {
            match poller.tick() {
                Tick::Completed(outcome) => break outcome,
                Tick::Progress(_) => {}
                other => panic!("unexpected tick: {:?}", other),
            }
        };

        assert_eq!(outcome.statement.steps.len(), 2);
        assert_eq!(outcome.statement.steps[0].step_number, 1);
        // legacy "tools" alias mapped through
        assert!(!outcome.statement.steps[0].tools_required.is_empty());
        assert_eq!(poller.phase(), Phase::Terminal(Outcome::Complete));
        assert!(!poller.interval_active());
    }

    #[test]
    fn test_failure_kinds_map_to_exit_codes() {
        let failed = GenerateError::JobFailed {
            message: "boom".to_string(),
        };
        assert_eq!(failed.failure_kind(), FailureKind::Generation);
        assert_eq!(failed.exit_code(), 40);

        let cancelled = GenerateError::Cancelled {
            reason: "user".to_string(),
        };
        assert_eq!(cancelled.exit_code(), 50);

        let timed_out = GenerateError::TimedOut { seconds: 420 };
        assert_eq!(timed_out.exit_code(), 60);

        let submit = GenerateError::Submit(SubmitError::MissingJobId);
        assert_eq!(submit.exit_code(), 30);

        let transport = GenerateError::Submit(SubmitError::Backend(
            BackendError::ConnectionFailed("down".to_string()),
        ));
        assert_eq!(transport.exit_code(), 20);
    }

    #[test]
    fn test_run_completes() {
        let service = Arc::new(MockService::new());
        let mut poller = JobPoller::with_config(
            Arc::clone(&service) as Arc<dyn Backend>,
            PollerConfig {
                poll_interval: Duration::from_millis(1),
                overall_timeout: Duration::from_secs(5),
            },
        );

        let cancel = AtomicBool::new(false);
        let mut updates = 0;
        let outcome = poller
            .run(&make_request(), &cancel, |_, _| updates += 1)
            .unwrap();

        assert_eq!(outcome.statement.steps.len(), 2);
        assert!(updates > 0);
    }

    #[test]
    fn test_run_times_out_on_stuck_job() {
        let service = Arc::new(MockService::new());
        // single non-terminal tick repeats forever
        service.script_next_job(vec![JobStatusResponse::processing(
            ProgressStage::Ai,
            "stuck",
        )]);

        let mut poller = JobPoller::with_config(
            Arc::clone(&service) as Arc<dyn Backend>,
            PollerConfig {
                poll_interval: Duration::from_millis(1),
                overall_timeout: Duration::from_millis(30),
            },
        );

        let cancel = AtomicBool::new(false);
        let err = poller.run(&make_request(), &cancel, |_, _| {}).unwrap_err();
        assert!(matches!(err, GenerateError::TimedOut { .. }));
    }

    #[test]
    fn test_run_honors_cancel_flag() {
        let service = Arc::new(MockService::new());
        let mut poller = JobPoller::with_config(
            Arc::clone(&service) as Arc<dyn Backend>,
            PollerConfig {
                poll_interval: Duration::from_millis(1),
                overall_timeout: Duration::from_secs(5),
            },
        );

        let cancel = AtomicBool::new(true);
        let err = poller.run(&make_request(), &cancel, |_, _| {}).unwrap_err();
        assert!(matches!(err, GenerateError::Cancelled { .. }));
        assert_eq!(poller.phase(), Phase::Terminal(Outcome::Cancelled));

        // the stale complete response cannot resurrect the job
        let job_id = poller.job_id().unwrap().to_string();
        let tick = poller.handle_status(
            &job_id,
            JobStatusResponse::complete(json!({"steps": []})),
        );
        assert!(matches!(tick, Tick::AlreadyTerminal));
        assert_eq!(poller.phase(), Phase::Terminal(Outcome::Cancelled));
    }
}
