//! Re-entrancy guards for the export pipelines.
//!
//! Each pipeline owns one [`ExportGate`]. Starting a run acquires the
//! gate and returns a [`BusyGuard`]; the gate reopens when the guard is
//! dropped, whether the run succeeded, failed, or returned early.

use std::cell::Cell;
use std::rc::Rc;

use crate::types::BatchError;

/// Shared busy flag for one export control.
///
/// Cloning yields another handle to the same flag, so a UI task can
/// hold the gate across `.await` points without borrowing the session.
#[derive(Debug, Clone, Default)]
pub struct ExportGate(Rc<Cell<bool>>);

impl ExportGate {
    /// Create an open gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a run holds the gate.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.get()
    }

    /// Acquire the gate for one run.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Busy`] if a run already holds it.
    pub fn try_acquire(&self) -> Result<BusyGuard, BatchError> {
        if self.0.replace(true) {
            return Err(BatchError::Busy);
        }
        Ok(BusyGuard(Rc::clone(&self.0)))
    }
}

/// Holds an [`ExportGate`] closed until dropped.
#[derive(Debug)]
#[must_use = "the gate reopens as soon as the guard is dropped"]
pub struct BusyGuard(Rc<Cell<bool>>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
