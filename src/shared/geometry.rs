//! Plain geometry values
//!
//! Screen rectangles, points and per-side thicknesses. None of these carry
//! behavior beyond construction and a couple of edge helpers.

use serde::{Deserialize, Serialize};

use crate::error::ChromeError;

/// Window or work-area rectangle (root coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge, widened so any `x + width` is representable
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Reject rectangles whose size or far edges do not fit in root coordinates
    pub fn validate(&self) -> Result<(), ChromeError> {
        let max = i64::from(i32::MAX);
        if i64::from(self.width) > max
            || i64::from(self.height) > max
            || self.right() > max
            || self.bottom() > max
        {
            return Err(ChromeError::InvalidGeometry(*self));
        }
        Ok(())
    }
}

/// A point, either window-relative or in screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate a window-relative point by the window's origin
    pub fn offset_by(self, origin: Point) -> Self {
        Self {
            x: self.x + origin.x,
            y: self.y + origin.y,
        }
    }
}

/// Per-side thickness (margins, paddings, resize grips)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thickness {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Thickness {
    /// Same value on all four sides
    pub fn uniform(value: i32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.left == self.top && self.top == self.right && self.right == self.bottom
    }
}
