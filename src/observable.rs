//! Change notification
//!
//! `ChangeNotifier` lets an owner announce "this attribute changed" to any
//! number of listeners. Delivery is synchronous, on the calling thread, in
//! registration order. It does not remember values; it only fans out.

use std::fmt;

use tracing::warn;

use crate::error::{ListenerFault, NotifyError};

/// Callback invoked for every published change
pub type Listener<E> = Box<dyn FnMut(&E) -> anyhow::Result<()>>;

/// Fan-out of change events to registered listeners
pub struct ChangeNotifier<E> {
    listeners: Vec<Listener<E>>,
}

impl<E> Default for ChangeNotifier<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for ChangeNotifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E: fmt::Debug> ChangeNotifier<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Duplicates are allowed and each gets called.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&E) -> anyhow::Result<()> + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `change` to every listener.
    ///
    /// A failing listener does not stop delivery to the ones after it; all
    /// failures are collected and handed back once every listener ran.
    /// With no listeners this is a no-op.
    pub fn notify_changed(&mut self, change: &E) -> Result<(), NotifyError> {
        let mut failed = NotifyError::default();

        for (index, listener) in self.listeners.iter_mut().enumerate() {
            if let Err(error) = listener(change) {
                warn!("Listener {} failed handling {:?}: {:#}", index, change, error);
                failed.faults.push(ListenerFault {
                    index,
                    change: format!("{:?}", change),
                    error,
                });
            }
        }

        failed.into_result()
    }
}
