//! The window capability the controller is bound to
//!
//! Implementors push `WindowEvent`s to whoever drives the controller rather
//! than holding callbacks into it.

use serde::{Deserialize, Serialize};

use crate::chrome::state::{DockPosition, WindowState};
use crate::error::ChromeError;
use crate::shared::Point;

/// Operations the controller needs from a native window.
///
/// Methods take `&self`; implementations hold whatever interior state they
/// need, the same way a display connection does.
pub trait NativeWindow {
    /// Current native state
    fn state(&self) -> WindowState;

    fn set_state(&self, state: WindowState) -> Result<(), ChromeError>;

    /// Request closure. The window reports `WindowEvent::Closed` once gone.
    fn close(&self) -> Result<(), ChromeError>;

    /// Pointer position relative to the window's top-left corner
    fn pointer_position(&self) -> Point;

    /// Translate a window-relative point to screen coordinates
    fn point_to_screen(&self, point: Point) -> Point;

    /// Open the OS system menu at a screen point
    fn show_system_menu(&self, at: Point) -> Result<(), ChromeError>;
}

/// Signals consumed by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WindowEvent {
    /// Native state changed; re-read it from the window
    StateChanged,

    /// Dock detector reported a new position
    DockChanged { position: DockPosition },

    /// Window has been torn down
    Closed,
}
