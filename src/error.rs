//! Error types for the chrome controller

use thiserror::Error;

use crate::shared::Geometry;

/// Errors surfaced by the controller, its commands and its configuration
#[derive(Debug, Error)]
pub enum ChromeError {
    /// A configuration value is out of range
    #[error("invalid chrome config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: String },

    /// A rectangle whose edges fall outside root coordinates
    #[error("geometry out of range: {0:?}")]
    InvalidGeometry(Geometry),

    /// The bound window has been dropped or has reported that it closed
    #[error("target window is no longer available")]
    TargetUnavailable,

    /// Execute was called on a command whose predicate currently refuses it
    #[error("command `{0}` is disabled")]
    CommandDisabled(&'static str),

    /// One or more listeners failed while a change was being published
    #[error(transparent)]
    Listeners(#[from] NotifyError),
}

/// A single listener failure captured during a notification sweep
#[derive(Debug)]
pub struct ListenerFault {
    /// Registration index of the failing listener
    pub index: usize,
    /// Debug rendering of the change that was being delivered
    pub change: String,
    /// What the listener returned
    pub error: anyhow::Error,
}

/// Aggregated listener failures; delivery to the other listeners still happened
#[derive(Debug, Default, Error)]
#[error("{} listener(s) failed during change notification", .faults.len())]
pub struct NotifyError {
    pub faults: Vec<ListenerFault>,
}

impl NotifyError {
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Fold another sweep's failures into this one
    pub fn merge(&mut self, other: NotifyError) {
        self.faults.extend(other.faults);
    }

    /// `Ok(())` when nothing failed
    pub fn into_result(self) -> Result<(), NotifyError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}
