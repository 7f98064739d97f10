//! Cooperative cancellation for long replays and forecast scans.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use persona_core::errors::{PersonaError, PersonaResult};

/// Shared cancel flag with an optional deadline.
///
/// Clones share the flag, so a host can hand one clone to a query and keep
/// another to call [`cancel`](Self::cancel).
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancelled automatically once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// `Err(Cancelled)` if the signal fired.
    pub fn check(&self, operation: &str) -> PersonaResult<()> {
        if self.is_cancelled() {
            Err(PersonaError::cancelled(operation))
        } else {
            Ok(())
        }
    }
}
