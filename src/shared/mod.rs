//! Shared value types used by the chrome controller and the dock detector

pub mod geometry;

pub use geometry::{Geometry, Point, Thickness};
