//! Headless replay harness
//!
//! Drives a chrome controller bound to an in-memory window from a JSON-lines
//! script. Every step yields zero or more output records; the binary prints
//! them as JSON lines.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::chrome::{
    ChromeChange, ChromeCommand, ChromeController, ChromeSnapshot, DockPosition, NativeWindow,
    WindowEvent, WindowId, WindowState,
};
use crate::config::Config;
use crate::dock::DockDetector;
use crate::error::ChromeError;
use crate::shared::{Geometry, Point};

/// One input line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptStep {
    /// Invoke a caption command
    Command { command: ChromeCommand },
    /// OS-initiated state change
    SetState { state: WindowState },
    /// Explicit dock signal
    Dock { position: DockPosition },
    /// Window moved or resized; runs dock detection
    Move { x: i32, y: i32, width: u32, height: u32 },
    /// Pointer position relative to the window
    Pointer { x: i32, y: i32 },
    /// Print all derived values
    Snapshot,
}

/// One output line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ScriptOutput {
    Changed(ChromeChange),
    Snapshot {
        window: WindowId,
        state: WindowState,
        dock: DockPosition,
        chrome: ChromeSnapshot,
    },
    SystemMenu { x: i32, y: i32 },
    Closed { window: WindowId },
    Error { message: String },
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> serde_json::Result<Option<ScriptStep>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// In-memory window raising its signals over a channel
pub struct ScriptedWindow {
    state: Cell<WindowState>,
    geometry: Cell<Geometry>,
    pointer: Cell<Point>,
    closed: Cell<bool>,
    menus: RefCell<Vec<Point>>,
    signals: UnboundedSender<WindowEvent>,
}

impl ScriptedWindow {
    pub fn new(geometry: Geometry, signals: UnboundedSender<WindowEvent>) -> Self {
        Self {
            state: Cell::new(WindowState::Normal),
            geometry: Cell::new(geometry),
            pointer: Cell::new(Point::default()),
            closed: Cell::new(false),
            menus: RefCell::new(Vec::new()),
            signals,
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry.get()
    }

    pub fn set_geometry(&self, geometry: Geometry) {
        self.geometry.set(geometry);
    }

    pub fn set_pointer(&self, pointer: Point) {
        self.pointer.set(pointer);
    }

    pub fn take_menu_requests(&self) -> Vec<Point> {
        self.menus.borrow_mut().drain(..).collect()
    }

    fn raise(&self, event: WindowEvent) -> Result<(), ChromeError> {
        self.signals.send(event).map_err(|_| ChromeError::TargetUnavailable)
    }

    fn ensure_open(&self) -> Result<(), ChromeError> {
        if self.closed.get() {
            return Err(ChromeError::TargetUnavailable);
        }
        Ok(())
    }
}

impl NativeWindow for ScriptedWindow {
    fn state(&self) -> WindowState {
        self.state.get()
    }

    fn set_state(&self, state: WindowState) -> Result<(), ChromeError> {
        self.ensure_open()?;
        self.state.set(state);
        self.raise(WindowEvent::StateChanged)
    }

    fn close(&self) -> Result<(), ChromeError> {
        self.ensure_open()?;
        self.closed.set(true);
        self.raise(WindowEvent::Closed)
    }

    fn pointer_position(&self) -> Point {
        self.pointer.get()
    }

    fn point_to_screen(&self, point: Point) -> Point {
        let geom = self.geometry.get();
        point.offset_by(Point::new(geom.x, geom.y))
    }

    fn show_system_menu(&self, at: Point) -> Result<(), ChromeError> {
        self.ensure_open()?;
        self.menus.borrow_mut().push(at);
        Ok(())
    }
}

/// Controller, window and dock detector wired together
pub struct Harness {
    window: Rc<ScriptedWindow>,
    controller: ChromeController<ScriptedWindow>,
    detector: DockDetector,
    signals: UnboundedReceiver<WindowEvent>,
    changes: Rc<RefCell<Vec<ChromeChange>>>,
}

impl Harness {
    pub const WINDOW_ID: WindowId = 1;

    pub fn new(config: &Config) -> Result<Self, ChromeError> {
        config.dock.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let area = config.dock.work_area;
        let initial = Geometry::new(
            area.x + (area.width / 4) as i32,
            area.y + (area.height / 4) as i32,
            area.width / 2,
            area.height / 2,
        );
        let window = Rc::new(ScriptedWindow::new(initial, tx));

        let mut controller = ChromeController::new(
            Self::WINDOW_ID,
            &window,
            config.chrome.clone(),
            config.notify.policy,
        )?;

        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        controller.subscribe(move |change| {
            sink.borrow_mut().push(*change);
            Ok(())
        });

        Ok(Self {
            window,
            controller,
            detector: DockDetector::new(area, config.dock.snap_distance),
            signals: rx,
            changes,
        })
    }

    pub fn controller(&self) -> &ChromeController<ScriptedWindow> {
        &self.controller
    }

    pub fn window(&self) -> &ScriptedWindow {
        &self.window
    }

    /// Apply one step and collect everything it produced
    pub fn step(&mut self, step: ScriptStep) -> Vec<ScriptOutput> {
        debug!("Script step: {:?}", step);
        let mut out = Vec::new();

        if let Err(err) = self.apply(&step, &mut out) {
            warn!("Step {:?} failed: {}", step, err);
            out.push(ScriptOutput::Error {
                message: err.to_string(),
            });
        }
        self.drain_signals(&mut out);

        out.extend(
            self.window
                .take_menu_requests()
                .into_iter()
                .map(|p| ScriptOutput::SystemMenu { x: p.x, y: p.y }),
        );
        out.extend(self.changes.borrow_mut().drain(..).map(ScriptOutput::Changed));
        out
    }

    fn apply(&mut self, step: &ScriptStep, out: &mut Vec<ScriptOutput>) -> Result<(), ChromeError> {
        match *step {
            ScriptStep::Command { command } => self.controller.execute(command),
            ScriptStep::SetState { state } => self.window.set_state(state),
            ScriptStep::Dock { position } => {
                self.controller.dispatch(WindowEvent::DockChanged { position })
            }
            ScriptStep::Move { x, y, width, height } => {
                let geometry = Geometry::new(x, y, width, height);
                geometry.validate()?;
                self.window.set_geometry(geometry);
                match self.detector.observe(&geometry)? {
                    Some(event) => self.controller.dispatch(event),
                    None => Ok(()),
                }
            }
            ScriptStep::Pointer { x, y } => {
                self.window.set_pointer(Point::new(x, y));
                Ok(())
            }
            ScriptStep::Snapshot => {
                out.push(ScriptOutput::Snapshot {
                    window: self.controller.id(),
                    state: self.window.state(),
                    dock: self.controller.dock_position(),
                    chrome: self.controller.snapshot(),
                });
                Ok(())
            }
        }
    }

    fn drain_signals(&mut self, out: &mut Vec<ScriptOutput>) {
        while let Ok(event) = self.signals.try_recv() {
            if event == WindowEvent::Closed {
                out.push(ScriptOutput::Closed {
                    window: self.controller.id(),
                });
            }
            if let Err(err) = self.controller.dispatch(event) {
                out.push(ScriptOutput::Error {
                    message: err.to_string(),
                });
            }
        }
    }
}
