//! Shared cancellation and running state.
//!
//! A [`CancellationMonitor`] bundles the two flags spanning the UI-facing
//! trigger and the batch driver behind one mutex, so invariants touching
//! both (`cancelled` is only meaningful while `running`) can be checked in a
//! single transaction. Workers never see the monitor itself; they get an
//! owned [`CancelToken`] that can only read the cancelled flag.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use dimf_types::BatchError;

/// The record guarded by the monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchState {
    pub cancelled: bool,
    pub running: bool,
}

/// Mutex-guarded shared state cell. Cloning yields another handle to the
/// same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationMonitor {
    state: Arc<Mutex<BatchState>>,
}

impl CancellationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the state. Transactions are
    /// serialized; `f` must not block on I/O.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut BatchState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub fn is_cancelled(&self) -> bool {
        self.with_state(|s| s.cancelled)
    }

    pub fn is_running(&self) -> bool {
        self.with_state(|s| s.running)
    }

    /// Request cancellation of the running batch. Returns true when the
    /// request took effect, false when no batch was running or cancellation
    /// was already requested.
    pub fn request_cancel(&self) -> bool {
        let effective = self.with_state(|s| {
            if s.running && !s.cancelled {
                s.cancelled = true;
                true
            } else {
                false
            }
        });
        if effective {
            debug!("batch cancellation requested");
        }
        effective
    }

    /// Atomically claim the running slot: fails fast with
    /// [`BatchError::AlreadyRunning`] if a batch is active, otherwise resets
    /// the cancelled flag and marks the batch running. The returned guard
    /// releases the slot on drop, on every exit path.
    pub fn try_begin(&self) -> Result<RunGuard, BatchError> {
        self.with_state(|s| {
            if s.running {
                return Err(BatchError::AlreadyRunning);
            }
            s.cancelled = false;
            s.running = true;
            Ok(())
        })?;
        Ok(RunGuard {
            monitor: self.clone(),
        })
    }

    /// An owned, cloneable read-only handle for units of work.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            monitor: self.clone(),
        }
    }
}

/// Scoped release of the running flag.
#[derive(Debug)]
pub struct RunGuard {
    monitor: CancellationMonitor,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.monitor.with_state(|s| s.running = false);
    }
}

/// Read-only cancellation handle passed by value into each unit of work.
#[derive(Debug, Clone)]
pub struct CancelToken {
    monitor: CancellationMonitor,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.monitor.is_cancelled()
    }
}
