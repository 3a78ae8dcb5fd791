//! Dock Detection
//!
//! Watches window geometry against the work area and reports when the
//! window becomes aligned to (or leaves) screen edges. Edge tolerance
//! follows the same snap-distance rule used for interactive moves.

use tracing::debug;

use crate::chrome::{DockPosition, WindowEvent};
use crate::error::ChromeError;
use crate::shared::Geometry;

/// Which work-area edges a window touches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Edges {
    left: bool,
    right: bool,
    top: bool,
    bottom: bool,
}

impl Edges {
    fn classify(self) -> DockPosition {
        let Edges { left, right, top, bottom } = self;

        match (top && bottom, left, right) {
            // filling the whole work area is maximize territory, not a dock
            (true, true, true) => DockPosition::Undocked,
            (true, true, false) => DockPosition::Left,
            (true, false, true) => DockPosition::Right,
            (true, false, false) => DockPosition::TopBottom,
            _ if top && left && !right => DockPosition::TopLeft,
            _ if top && right && !left => DockPosition::TopRight,
            _ if bottom && left && !right => DockPosition::BottomLeft,
            _ if bottom && right && !left => DockPosition::BottomRight,
            _ => DockPosition::Undocked,
        }
    }
}

/// Dock detector for one window
#[derive(Debug, Clone)]
pub struct DockDetector {
    /// Usable screen area (excludes panels)
    pub work_area: Geometry,

    /// Snap distance (pixels)
    pub snap_distance: i32,

    last: DockPosition,
}

impl DockDetector {
    pub fn new(work_area: Geometry, snap_distance: i32) -> Self {
        Self {
            work_area,
            snap_distance,
            last: DockPosition::Undocked,
        }
    }

    /// Last position reported
    pub fn position(&self) -> DockPosition {
        self.last
    }

    /// Dock position for `window` without updating detector state
    pub fn detect(&self, window: &Geometry) -> DockPosition {
        let area = &self.work_area;
        let near = |a: i64, b: i64| (a - b).abs() <= i64::from(self.snap_distance);

        Edges {
            left: near(window.x.into(), area.x.into()),
            right: near(window.right(), area.right()),
            top: near(window.y.into(), area.y.into()),
            bottom: near(window.bottom(), area.bottom()),
        }
        .classify()
    }

    /// Feed a new window geometry. Returns a dock signal only when the
    /// position differs from the last one reported. Out-of-range rectangles
    /// are rejected and leave the last position untouched.
    pub fn observe(&mut self, window: &Geometry) -> Result<Option<WindowEvent>, ChromeError> {
        window.validate()?;

        let position = self.detect(window);
        if position == self.last {
            return Ok(None);
        }

        debug!("Dock position {:?} -> {:?} for {:?}", self.last, position, window);
        self.last = position;
        Ok(Some(WindowEvent::DockChanged { position }))
    }
}
