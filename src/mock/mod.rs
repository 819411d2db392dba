//! In-process mock of the generation service.
//!
//! Used by the lifecycle tests and by `msgen generate --dry-run`.

mod failure;
mod service;

pub use failure::{Endpoint, FailureInjector, InjectedFailure};
pub use service::MockService;
