//! Relay commands
//!
//! A `RelayCommand` wraps one zero-argument operation so a presentation
//! layer can trigger it without knowing who implements it.

use std::fmt;

use tracing::debug;

use crate::error::{ChromeError, NotifyError};
use crate::observable::ChangeNotifier;

type Action = Box<dyn FnMut() -> Result<(), ChromeError>>;
type Predicate = Box<dyn Fn() -> bool>;

/// Published when a command's enablement may have changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanExecuteChanged {
    pub command: &'static str,
}

pub struct RelayCommand {
    name: &'static str,
    action: Action,
    predicate: Option<Predicate>,
    can_execute_changed: ChangeNotifier<CanExecuteChanged>,
}

impl fmt::Debug for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayCommand")
            .field("name", &self.name)
            .field("conditional", &self.predicate.is_some())
            .finish()
    }
}

impl RelayCommand {
    /// Always-enabled command running `action`
    pub fn new<F>(name: &'static str, action: F) -> Self
    where
        F: FnMut() -> Result<(), ChromeError> + 'static,
    {
        Self {
            name,
            action: Box::new(action),
            predicate: None,
            can_execute_changed: ChangeNotifier::new(),
        }
    }

    /// Gate the command behind `predicate`
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn() -> bool + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn can_execute(&self) -> bool {
        self.predicate.as_ref().is_none_or(|p| p())
    }

    /// Run the wrapped operation once. Its error is returned as-is.
    pub fn execute(&mut self) -> Result<(), ChromeError> {
        if !self.can_execute() {
            return Err(ChromeError::CommandDisabled(self.name));
        }
        debug!("Executing command {}", self.name);
        (self.action)()
    }

    pub fn subscribe_can_execute_changed<F>(&mut self, listener: F)
    where
        F: FnMut(&CanExecuteChanged) -> anyhow::Result<()> + 'static,
    {
        self.can_execute_changed.subscribe(listener);
    }

    /// Tell subscribers to re-query `can_execute`
    pub fn raise_can_execute_changed(&mut self) -> Result<(), NotifyError> {
        let change = CanExecuteChanged { command: self.name };
        self.can_execute_changed.notify_changed(&change)
    }
}
