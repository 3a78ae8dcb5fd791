//! Window chrome controller
//!
//! Binds to one native window, listens for its state and dock signals, and
//! publishes which derived presentation attributes changed. Also exposes the
//! caption-button intents (minimize, maximize/restore, close, system menu) as
//! relay commands.

pub mod state;
pub mod window;

use std::cell::Cell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::command::RelayCommand;
use crate::config::{ChromeConfig, NotifyPolicy};
use crate::error::{ChromeError, NotifyError};
use crate::observable::ChangeNotifier;
use crate::shared::Thickness;

pub use state::{
    AttributeSet, ChromeAttribute, ChromeInputs, ChromeSnapshot, DockPosition, Transition,
    WindowState, transition,
};
pub use window::{NativeWindow, WindowEvent};

/// Identifier of the bound window, passed along with every change
pub type WindowId = u32;

/// Caption intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChromeCommand {
    Minimize,
    MaximizeOrRestore,
    Close,
    ShowSystemMenu,
}

/// One published attribute change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChromeChange {
    pub window: WindowId,
    pub attribute: ChromeAttribute,
    /// All derived values right after the transition was applied
    pub chrome: ChromeSnapshot,
}

/// The four caption commands
#[derive(Debug)]
pub struct ChromeCommands {
    pub minimize: RelayCommand,
    pub maximize_or_restore: RelayCommand,
    pub close: RelayCommand,
    pub show_system_menu: RelayCommand,
}

impl ChromeCommands {
    fn bind<W: NativeWindow + 'static>(window: &Weak<W>, detached: &Rc<Cell<bool>>) -> Self {
        let (w, d) = (window.clone(), detached.clone());
        let minimize = RelayCommand::new("minimize", move || {
            upgrade(&w, &d)?.set_state(WindowState::Minimized)
        });

        let (w, d) = (window.clone(), detached.clone());
        let maximize_or_restore = RelayCommand::new("maximize_or_restore", move || {
            let window = upgrade(&w, &d)?;
            let next = window.state().toggled_maximized();
            debug!("Maximize/restore toggling to {:?}", next);
            window.set_state(next)
        });

        let (w, d) = (window.clone(), detached.clone());
        let close = RelayCommand::new("close", move || {
            info!("Close requested");
            upgrade(&w, &d)?.close()
        });

        let (w, d) = (window.clone(), detached.clone());
        let show_system_menu = RelayCommand::new("show_system_menu", move || {
            let window = upgrade(&w, &d)?;
            let at = window.point_to_screen(window.pointer_position());
            debug!("System menu at ({}, {})", at.x, at.y);
            window.show_system_menu(at)
        });

        Self {
            minimize,
            maximize_or_restore,
            close,
            show_system_menu,
        }
    }

    pub fn get_mut(&mut self, command: ChromeCommand) -> &mut RelayCommand {
        match command {
            ChromeCommand::Minimize => &mut self.minimize,
            ChromeCommand::MaximizeOrRestore => &mut self.maximize_or_restore,
            ChromeCommand::Close => &mut self.close,
            ChromeCommand::ShowSystemMenu => &mut self.show_system_menu,
        }
    }
}

fn upgrade<W>(window: &Weak<W>, detached: &Cell<bool>) -> Result<Rc<W>, ChromeError> {
    if detached.get() {
        warn!("Command on a closed window ignored");
        return Err(ChromeError::TargetUnavailable);
    }
    window.upgrade().ok_or_else(|| {
        warn!("Command on a dropped window ignored");
        ChromeError::TargetUnavailable
    })
}

/// Presentation-state controller bound 1:1 to a native window
pub struct ChromeController<W: NativeWindow + 'static> {
    id: WindowId,
    window: Weak<W>,
    config: ChromeConfig,
    policy: NotifyPolicy,
    /// Native state as of the last signal, plus the last reported dock
    inputs: ChromeInputs,
    detached: Rc<Cell<bool>>,
    changes: ChangeNotifier<ChromeChange>,
    commands: ChromeCommands,
}

impl<W: NativeWindow + 'static> ChromeController<W> {
    /// Bind to `window`. Fails fast on an invalid config.
    pub fn new(
        id: WindowId,
        window: &Rc<W>,
        config: ChromeConfig,
        policy: NotifyPolicy,
    ) -> Result<Self, ChromeError> {
        config.validate()?;

        let weak = Rc::downgrade(window);
        let detached = Rc::new(Cell::new(false));
        let commands = ChromeCommands::bind(&weak, &detached);
        let inputs = ChromeInputs::new(window.state(), DockPosition::Undocked);

        debug!("Chrome controller bound to window {} ({:?})", id, inputs.state);

        Ok(Self {
            id,
            window: weak,
            config,
            policy,
            inputs,
            detached,
            changes: ChangeNotifier::new(),
            commands,
        })
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn config(&self) -> &ChromeConfig {
        &self.config
    }

    pub fn dock_position(&self) -> DockPosition {
        self.inputs.dock
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ChromeChange) -> anyhow::Result<()> + 'static,
    {
        self.changes.subscribe(listener);
    }

    pub fn commands(&self) -> &ChromeCommands {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut ChromeCommands {
        &mut self.commands
    }

    pub fn execute(&mut self, command: ChromeCommand) -> Result<(), ChromeError> {
        self.commands.get_mut(command).execute()
    }

    /// Feed one window signal into the controller.
    ///
    /// Listener failures are reported after every listener has seen every
    /// change and after the new dock position has been stored.
    pub fn dispatch(&mut self, event: WindowEvent) -> Result<(), ChromeError> {
        if self.detached.get() {
            warn!("Window {} already closed, ignoring {:?}", self.id, event);
            return Ok(());
        }

        debug!("Window {}: {:?}", self.id, event);

        match event {
            WindowEvent::StateChanged => {
                let after = ChromeInputs::new(self.native_state(), self.inputs.dock);
                self.apply(after)
            }
            WindowEvent::DockChanged { position } => {
                let after = ChromeInputs::new(self.native_state(), position);
                self.apply(after)
            }
            WindowEvent::Closed => {
                info!("Window {} closed, detaching chrome controller", self.id);
                self.detached.set(true);
                Ok(())
            }
        }
    }

    fn apply(&mut self, after: ChromeInputs) -> Result<(), ChromeError> {
        let Transition { inputs, notify } = transition(self.inputs, after, &self.config, self.policy);
        self.inputs = inputs;
        self.publish(notify)
    }

    fn publish(&mut self, attributes: AttributeSet) -> Result<(), ChromeError> {
        let chrome = self.snapshot();
        let mut failed = NotifyError::default();

        for attribute in attributes.ordered() {
            let change = ChromeChange {
                window: self.id,
                attribute,
                chrome,
            };
            if let Err(err) = self.changes.notify_changed(&change) {
                failed.merge(err);
            }
        }

        failed.into_result().map_err(ChromeError::from)
    }

    /// Live native state, or the last one seen once the window is gone
    fn native_state(&self) -> WindowState {
        if self.detached.get() {
            return self.inputs.state;
        }
        self.window
            .upgrade()
            .map_or(self.inputs.state, |window| window.state())
    }

    /// Every derived attribute, computed now
    pub fn snapshot(&self) -> ChromeSnapshot {
        let inputs = ChromeInputs::new(self.native_state(), self.inputs.dock);
        ChromeSnapshot::derive(inputs, &self.config)
    }

    pub fn is_borderless(&self) -> bool {
        self.snapshot().is_borderless
    }

    pub fn effective_outer_margin(&self) -> i32 {
        self.snapshot().effective_outer_margin
    }

    pub fn effective_corner_radius(&self) -> i32 {
        self.snapshot().effective_corner_radius
    }

    pub fn resize_border_thickness(&self) -> Thickness {
        self.snapshot().resize_border_thickness
    }

    pub fn outer_margin_thickness(&self) -> Thickness {
        self.snapshot().outer_margin_thickness
    }

    pub fn inner_content_padding(&self) -> Thickness {
        self.snapshot().inner_content_padding
    }

    pub fn title_bar_extent(&self) -> i32 {
        self.snapshot().title_bar_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Point;
    use std::cell::RefCell;

    /// In-memory window that queues the signals a real one would raise
    struct FakeWindow {
        state: Cell<WindowState>,
        origin: Point,
        pointer: Cell<Point>,
        menus: RefCell<Vec<Point>>,
        close_requests: Cell<u32>,
        events: RefCell<Vec<WindowEvent>>,
    }

    impl FakeWindow {
        fn new(state: WindowState) -> Rc<Self> {
            Rc::new(Self {
                state: Cell::new(state),
                origin: Point::new(100, 50),
                pointer: Cell::new(Point::new(12, 8)),
                menus: RefCell::new(Vec::new()),
                close_requests: Cell::new(0),
                events: RefCell::new(Vec::new()),
            })
        }

        /// OS-side state change, bypassing the controller
        fn os_set_state(&self, state: WindowState) {
            self.state.set(state);
            self.events.borrow_mut().push(WindowEvent::StateChanged);
        }

        fn take_events(&self) -> Vec<WindowEvent> {
            self.events.borrow_mut().drain(..).collect()
        }
    }

    impl NativeWindow for FakeWindow {
        fn state(&self) -> WindowState {
            self.state.get()
        }

        fn set_state(&self, state: WindowState) -> Result<(), ChromeError> {
            self.os_set_state(state);
            Ok(())
        }

        fn close(&self) -> Result<(), ChromeError> {
            self.close_requests.set(self.close_requests.get() + 1);
            self.events.borrow_mut().push(WindowEvent::Closed);
            Ok(())
        }

        fn pointer_position(&self) -> Point {
            self.pointer.get()
        }

        fn point_to_screen(&self, point: Point) -> Point {
            point.offset_by(self.origin)
        }

        fn show_system_menu(&self, at: Point) -> Result<(), ChromeError> {
            self.menus.borrow_mut().push(at);
            Ok(())
        }
    }

    fn config() -> ChromeConfig {
        ChromeConfig {
            min_width: 400.0,
            min_height: 400.0,
            resize_border_width: 6,
            base_outer_margin: 10,
            base_corner_radius: 10,
            title_bar_height: 42,
        }
    }

    fn controller(window: &Rc<FakeWindow>) -> ChromeController<FakeWindow> {
        ChromeController::new(7, window, config(), NotifyPolicy::Always).unwrap()
    }

    fn pump(ctl: &mut ChromeController<FakeWindow>, window: &FakeWindow) {
        for event in window.take_events() {
            ctl.dispatch(event).unwrap();
        }
    }

    fn record(ctl: &mut ChromeController<FakeWindow>) -> Rc<RefCell<Vec<ChromeChange>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        ctl.subscribe(move |change| {
            sink.borrow_mut().push(*change);
            Ok(())
        });
        log
    }

    fn attributes(log: &RefCell<Vec<ChromeChange>>) -> Vec<ChromeAttribute> {
        log.borrow().iter().map(|c| c.attribute).collect()
    }

    #[test]
    fn test_initial_state_from_window() {
        let window = FakeWindow::new(WindowState::Maximized);
        let ctl = controller(&window);
        assert_eq!(ctl.dock_position(), DockPosition::Undocked);
        assert!(ctl.is_borderless());
        assert_eq!(ctl.resize_border_thickness(), Thickness::uniform(6));
    }

    #[test]
    fn test_normal_scenario() {
        let window = FakeWindow::new(WindowState::Normal);
        let ctl = controller(&window);
        assert_eq!(ctl.resize_border_thickness(), Thickness::uniform(16));
        assert_eq!(ctl.inner_content_padding(), Thickness::uniform(6));
        assert_eq!(ctl.outer_margin_thickness(), Thickness::uniform(10));
        assert_eq!(ctl.title_bar_extent(), 48);
        assert_eq!(ctl.effective_outer_margin(), 10);
        assert_eq!(ctl.effective_corner_radius(), 10);
        assert!(!ctl.is_borderless());
    }

    #[test]
    fn test_state_changed_notifies_fixed_set_once_each() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);
        let log = record(&mut ctl);

        window.os_set_state(WindowState::Maximized);
        pump(&mut ctl, &window);

        assert_eq!(attributes(&log), ChromeAttribute::STATE_DEPENDENT.to_vec());
        assert!(log.borrow().iter().all(|c| c.window == 7));
        assert_eq!(ctl.effective_corner_radius(), 0);
    }

    #[test]
    fn test_redundant_state_report_still_notifies() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);
        let log = record(&mut ctl);

        ctl.dispatch(WindowEvent::StateChanged).unwrap();
        ctl.dispatch(WindowEvent::StateChanged).unwrap();

        assert_eq!(log.borrow().len(), 2 * ChromeAttribute::STATE_DEPENDENT.len());
    }

    #[test]
    fn test_on_change_policy_skips_redundant_reports() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = ChromeController::new(1, &window, config(), NotifyPolicy::OnChange).unwrap();
        let log = record(&mut ctl);

        ctl.dispatch(WindowEvent::StateChanged).unwrap();
        assert!(log.borrow().is_empty());

        window.os_set_state(WindowState::Maximized);
        pump(&mut ctl, &window);
        assert_eq!(attributes(&log), ChromeAttribute::STATE_DEPENDENT.to_vec());
    }

    #[test]
    fn test_listener_sees_consistent_snapshot() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);
        let log = record(&mut ctl);

        ctl.dispatch(WindowEvent::DockChanged { position: DockPosition::Left }).unwrap();

        for change in log.borrow().iter() {
            assert!(change.chrome.is_borderless);
            assert_eq!(change.chrome.resize_border_thickness, Thickness::uniform(6));
        }
        assert_eq!(ctl.dock_position(), DockPosition::Left);
    }

    #[test]
    fn test_dock_changed_notifies_fixed_set_in_order() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);
        let log = record(&mut ctl);

        ctl.dispatch(WindowEvent::DockChanged { position: DockPosition::Right }).unwrap();
        assert_eq!(attributes(&log), ChromeAttribute::STATE_DEPENDENT.to_vec());

        log.borrow_mut().clear();
        ctl.dispatch(WindowEvent::DockChanged { position: DockPosition::Right }).unwrap();
        assert_eq!(attributes(&log), ChromeAttribute::STATE_DEPENDENT.to_vec());
    }

    #[test]
    fn test_docked_left_matches_maximized() {
        let docked_window = FakeWindow::new(WindowState::Normal);
        let mut docked = controller(&docked_window);
        docked.dispatch(WindowEvent::DockChanged { position: DockPosition::Left }).unwrap();

        let max_window = FakeWindow::new(WindowState::Maximized);
        let maximized = controller(&max_window);

        assert_eq!(docked.snapshot(), maximized.snapshot());

        docked.dispatch(WindowEvent::DockChanged { position: DockPosition::Undocked }).unwrap();
        assert!(!docked.is_borderless());
    }

    #[test]
    fn test_maximized_and_docked_stays_borderless() {
        let window = FakeWindow::new(WindowState::Maximized);
        let mut ctl = controller(&window);
        ctl.dispatch(WindowEvent::DockChanged { position: DockPosition::Right }).unwrap();
        assert!(ctl.is_borderless());

        window.os_set_state(WindowState::Normal);
        pump(&mut ctl, &window);
        assert!(ctl.is_borderless());
    }

    #[test]
    fn test_maximize_or_restore_toggles() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);

        ctl.execute(ChromeCommand::MaximizeOrRestore).unwrap();
        pump(&mut ctl, &window);
        assert_eq!(window.state(), WindowState::Maximized);
        assert!(ctl.is_borderless());

        ctl.execute(ChromeCommand::MaximizeOrRestore).unwrap();
        pump(&mut ctl, &window);
        assert_eq!(window.state(), WindowState::Normal);
        assert!(!ctl.is_borderless());
    }

    #[test]
    fn test_minimize_then_maximize() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);

        ctl.commands_mut().minimize.execute().unwrap();
        assert_eq!(window.state(), WindowState::Minimized);

        ctl.execute(ChromeCommand::MaximizeOrRestore).unwrap();
        assert_eq!(window.state(), WindowState::Maximized);
    }

    #[test]
    fn test_commands_always_enabled() {
        let window = FakeWindow::new(WindowState::Normal);
        let ctl = controller(&window);
        let cmds = ctl.commands();
        assert!(cmds.minimize.can_execute());
        assert!(cmds.maximize_or_restore.can_execute());
        assert!(cmds.close.can_execute());
        assert!(cmds.show_system_menu.can_execute());
    }

    #[test]
    fn test_system_menu_at_screen_pointer_without_notifications() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);
        let log = record(&mut ctl);

        ctl.execute(ChromeCommand::ShowSystemMenu).unwrap();

        assert_eq!(*window.menus.borrow(), vec![Point::new(112, 58)]);
        assert!(window.take_events().is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_close_detaches_controller() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);
        let log = record(&mut ctl);

        ctl.execute(ChromeCommand::Close).unwrap();
        assert_eq!(window.close_requests.get(), 1);
        pump(&mut ctl, &window);
        assert!(ctl.is_detached());

        ctl.dispatch(WindowEvent::DockChanged { position: DockPosition::Left }).unwrap();
        assert_eq!(ctl.dock_position(), DockPosition::Undocked);
        assert!(log.borrow().is_empty());

        assert!(matches!(
            ctl.execute(ChromeCommand::Minimize),
            Err(ChromeError::TargetUnavailable)
        ));
    }

    #[test]
    fn test_dropped_window_is_unavailable() {
        let window = FakeWindow::new(WindowState::Maximized);
        let mut ctl = controller(&window);
        drop(window);

        assert!(matches!(
            ctl.execute(ChromeCommand::MaximizeOrRestore),
            Err(ChromeError::TargetUnavailable)
        ));
        // last observed state still drives the derived values
        assert!(ctl.is_borderless());
        ctl.dispatch(WindowEvent::DockChanged { position: DockPosition::Left }).unwrap();
        assert_eq!(ctl.dock_position(), DockPosition::Left);
    }

    #[test]
    fn test_listener_failure_is_surfaced_after_full_delivery() {
        let window = FakeWindow::new(WindowState::Normal);
        let mut ctl = controller(&window);
        ctl.subscribe(|change| {
            if change.attribute == ChromeAttribute::EffectiveOuterMargin {
                anyhow::bail!("binding rejected margin");
            }
            Ok(())
        });
        let log = record(&mut ctl);

        let err = ctl
            .dispatch(WindowEvent::DockChanged { position: DockPosition::TopBottom })
            .unwrap_err();

        match err {
            ChromeError::Listeners(failed) => {
                assert_eq!(failed.faults.len(), 1);
                assert_eq!(failed.faults[0].index, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(log.borrow().len(), ChromeAttribute::STATE_DEPENDENT.len());
        assert_eq!(ctl.dock_position(), DockPosition::TopBottom);
        assert!(ctl.is_borderless());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let window = FakeWindow::new(WindowState::Normal);
        let bad = ChromeConfig {
            base_outer_margin: -1,
            ..config()
        };
        let err = ChromeController::new(1, &window, bad, NotifyPolicy::Always).err();
        assert!(matches!(
            err,
            Some(ChromeError::InvalidConfig { field: "base_outer_margin", .. })
        ));
    }
}
