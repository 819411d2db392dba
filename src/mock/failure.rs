//! Failure injection for the mock service.

use std::collections::HashMap;

use msgen_protocol::ApiErrorPayload;

use crate::backend::BackendError;

/// Endpoints that can have failures injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateJob,
    JobStatus,
    CancelJob,
    RenderPdf,
}

/// A failure queued for one call.
#[derive(Debug, Clone)]
pub enum InjectedFailure {
    /// Service-level rejection with a code and message.
    Service(ApiErrorPayload),
    /// Transport-level failure (network blip).
    Connection(String),
}

impl InjectedFailure {
    pub(crate) fn into_error(self) -> BackendError {
        match self {
            InjectedFailure::Service(payload) => BackendError::Service(payload.into()),
            InjectedFailure::Connection(message) => BackendError::ConnectionFailed(message),
        }
    }
}

/// One-shot error queues per endpoint: each injected failure applies to
/// exactly one call, in injection order.
#[derive(Debug, Default)]
pub struct FailureInjector {
    queued: HashMap<Endpoint, Vec<InjectedFailure>>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next call to `endpoint`.
    pub fn inject(&mut self, endpoint: Endpoint, failure: InjectedFailure) {
        self.queued.entry(endpoint).or_default().push(failure);
    }

    /// Take the next queued failure for `endpoint`, if any.
    pub fn take(&mut self, endpoint: Endpoint) -> Option<InjectedFailure> {
        let queue = self.queued.get_mut(&endpoint)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }

    /// Drop all queued failures.
    pub fn clear(&mut self) {
        self.queued.clear();
    }
}
