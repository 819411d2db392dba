//! Ctrl-C handling for the generate loop.
//!
//! First signal requests job cancellation through the service; a second
//! signal exits immediately.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Exit code when the user aborts with a second signal.
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared cancellation state set from the signal handler.
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancel_requested: AtomicBool,
    signal_count: AtomicU8,
}

impl CancelFlag {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record one signal. Returns true when this is the second (or later)
    /// signal and the process should exit immediately.
    pub fn signal(&self) -> bool {
        let count = self.signal_count.fetch_add(1, Ordering::SeqCst);
        self.cancel_requested.store(true, Ordering::SeqCst);
        count >= 1
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// The atomic handed to the polling loop.
    pub fn cancel_requested(&self) -> &AtomicBool {
        &self.cancel_requested
    }
}

/// Install the Ctrl-C handler. The returned flag is shared with the
/// polling loop; a second signal exits the process directly.
pub fn install() -> Result<Arc<CancelFlag>, ctrlc::Error> {
    let flag = CancelFlag::new();
    let handler_flag = Arc::clone(&flag);

    ctrlc::set_handler(move || {
        if handler_flag.signal() {
            eprintln!("Interrupted again; exiting without waiting for cancellation.");
            std::process::exit(EXIT_CODE_INTERRUPTED);
        }
        eprintln!("Cancellation requested; waiting for the service (Ctrl-C again to exit now).");
    })?;

    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_signal_requests_cancel() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancel_requested());

        let immediate = flag.signal();
        assert!(!immediate);
        assert!(flag.is_cancel_requested());
    }

    #[test]
    fn test_second_signal_requests_exit() {
        let flag = CancelFlag::new();
        assert!(!flag.signal());
        assert!(flag.signal());
        assert!(flag.signal());
    }
}
