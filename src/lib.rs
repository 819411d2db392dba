//! msgen - client for BS 7671 method statement generation jobs.
//!
//! Submits generation requests to an external service, polls the job to a
//! terminal state, normalizes the returned steps into a canonical
//! statement, and supports local editing and export to the PDF rendering
//! endpoint.

pub mod backend;
pub mod config;
pub mod mock;
pub mod poll;
pub mod signal;
pub mod statement;

pub use backend::{Backend, BackendError, HttpBackend, HttpBackendConfig};
pub use poll::{GenerationOutcome, JobPoller, Phase, PollerConfig, Tick};
pub use statement::{InstallationStep, MethodStatement, RiskLevel};
