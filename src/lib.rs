//! Area Chrome
//!
//! Presentation state for Area's chromeless windows: derives shadow margin,
//! corner radius, resize grips and titlebar extent from the window's native
//! state and dock position, and exposes the caption buttons as commands.

pub mod chrome;
pub mod command;
pub mod config;
pub mod dock;
pub mod error;
pub mod observable;
pub mod script;
pub mod shared;

pub use chrome::{
    ChromeAttribute, ChromeChange, ChromeCommand, ChromeController, ChromeSnapshot, DockPosition,
    NativeWindow, WindowEvent, WindowId, WindowState,
};
pub use command::RelayCommand;
pub use config::{ChromeConfig, Config, NotifyPolicy};
pub use dock::DockDetector;
pub use error::{ChromeError, NotifyError};
pub use observable::ChangeNotifier;
