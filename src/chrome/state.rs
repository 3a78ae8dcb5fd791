//! Chrome state and derived presentation values
//!
//! Everything here is a pure function of the native window state, the last
//! reported dock position and the chrome config. Nothing is cached.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::config::{ChromeConfig, NotifyPolicy};
use crate::shared::Thickness;

/// Native window state, owned by the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

impl WindowState {
    /// Target of the maximize/restore toggle
    pub fn toggled_maximized(self) -> Self {
        if self == WindowState::Maximized {
            WindowState::Normal
        } else {
            WindowState::Maximized
        }
    }
}

/// Alignment of the window against work-area edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DockPosition {
    #[default]
    Undocked,
    Left,
    Right,
    TopBottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl DockPosition {
    pub fn is_docked(self) -> bool {
        self != DockPosition::Undocked
    }
}

/// Identifiers of the derived presentation attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChromeAttribute {
    IsBorderless,
    ResizeBorderThickness,
    EffectiveOuterMargin,
    OuterMarginThickness,
    EffectiveCornerRadius,
    InnerContentPadding,
    TitleBarExtent,
}

impl ChromeAttribute {
    /// Publication order for a state or dock transition
    pub const STATE_DEPENDENT: [ChromeAttribute; 5] = [
        ChromeAttribute::IsBorderless,
        ChromeAttribute::ResizeBorderThickness,
        ChromeAttribute::EffectiveOuterMargin,
        ChromeAttribute::OuterMarginThickness,
        ChromeAttribute::EffectiveCornerRadius,
    ];

    fn flag(self) -> AttributeSet {
        match self {
            ChromeAttribute::IsBorderless => AttributeSet::IS_BORDERLESS,
            ChromeAttribute::ResizeBorderThickness => AttributeSet::RESIZE_BORDER_THICKNESS,
            ChromeAttribute::EffectiveOuterMargin => AttributeSet::EFFECTIVE_OUTER_MARGIN,
            ChromeAttribute::OuterMarginThickness => AttributeSet::OUTER_MARGIN_THICKNESS,
            ChromeAttribute::EffectiveCornerRadius => AttributeSet::EFFECTIVE_CORNER_RADIUS,
            ChromeAttribute::InnerContentPadding => AttributeSet::INNER_CONTENT_PADDING,
            ChromeAttribute::TitleBarExtent => AttributeSet::TITLE_BAR_EXTENT,
        }
    }
}

bitflags! {
    /// Set of attributes touched by one transition
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttributeSet: u8 {
        const IS_BORDERLESS            = 1 << 0;
        const RESIZE_BORDER_THICKNESS  = 1 << 1;
        const EFFECTIVE_OUTER_MARGIN   = 1 << 2;
        const OUTER_MARGIN_THICKNESS   = 1 << 3;
        const EFFECTIVE_CORNER_RADIUS  = 1 << 4;
        const INNER_CONTENT_PADDING    = 1 << 5;
        const TITLE_BAR_EXTENT         = 1 << 6;
    }
}

impl AttributeSet {
    /// Everything whose formula reads the window state or dock position
    pub fn state_dependent() -> Self {
        Self::IS_BORDERLESS
            | Self::RESIZE_BORDER_THICKNESS
            | Self::EFFECTIVE_OUTER_MARGIN
            | Self::OUTER_MARGIN_THICKNESS
            | Self::EFFECTIVE_CORNER_RADIUS
    }

    pub fn has(&self, attribute: ChromeAttribute) -> bool {
        self.contains(attribute.flag())
    }

    /// Members in publication order
    pub fn ordered(&self) -> Vec<ChromeAttribute> {
        ChromeAttribute::STATE_DEPENDENT
            .into_iter()
            .chain([ChromeAttribute::InnerContentPadding, ChromeAttribute::TitleBarExtent])
            .filter(|attr| self.has(*attr))
            .collect()
    }
}

/// Inputs every derived attribute is computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChromeInputs {
    pub state: WindowState,
    pub dock: DockPosition,
}

impl ChromeInputs {
    pub fn new(state: WindowState, dock: DockPosition) -> Self {
        Self { state, dock }
    }

    pub fn is_borderless(&self) -> bool {
        self.state == WindowState::Maximized || self.dock.is_docked()
    }
}

/// All derived presentation attributes at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChromeSnapshot {
    pub is_borderless: bool,
    pub effective_outer_margin: i32,
    pub effective_corner_radius: i32,
    pub resize_border_thickness: Thickness,
    pub outer_margin_thickness: Thickness,
    pub inner_content_padding: Thickness,
    pub title_bar_extent: i32,
}

impl ChromeSnapshot {
    pub fn derive(inputs: ChromeInputs, config: &ChromeConfig) -> Self {
        let is_borderless = inputs.is_borderless();
        let margin = if is_borderless { 0 } else { config.base_outer_margin };
        let radius = if is_borderless { 0 } else { config.base_corner_radius };

        Self {
            is_borderless,
            effective_outer_margin: margin,
            effective_corner_radius: radius,
            resize_border_thickness: Thickness::uniform(config.resize_border_width + margin),
            outer_margin_thickness: Thickness::uniform(margin),
            inner_content_padding: Thickness::uniform(config.resize_border_width),
            title_bar_extent: config.title_bar_height + config.resize_border_width,
        }
    }

    /// Attributes whose value differs between two snapshots
    pub fn diff(&self, other: &ChromeSnapshot) -> AttributeSet {
        let mut changed = AttributeSet::empty();
        changed.set(AttributeSet::IS_BORDERLESS, self.is_borderless != other.is_borderless);
        changed.set(
            AttributeSet::RESIZE_BORDER_THICKNESS,
            self.resize_border_thickness != other.resize_border_thickness,
        );
        changed.set(
            AttributeSet::EFFECTIVE_OUTER_MARGIN,
            self.effective_outer_margin != other.effective_outer_margin,
        );
        changed.set(
            AttributeSet::OUTER_MARGIN_THICKNESS,
            self.outer_margin_thickness != other.outer_margin_thickness,
        );
        changed.set(
            AttributeSet::EFFECTIVE_CORNER_RADIUS,
            self.effective_corner_radius != other.effective_corner_radius,
        );
        changed.set(
            AttributeSet::INNER_CONTENT_PADDING,
            self.inner_content_padding != other.inner_content_padding,
        );
        changed.set(AttributeSet::TITLE_BAR_EXTENT, self.title_bar_extent != other.title_bar_extent);
        changed
    }
}

/// Outcome of applying one signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub inputs: ChromeInputs,
    pub notify: AttributeSet,
}

/// Apply a state or dock signal: `before` is what the controller last saw,
/// `after` is the state re-read from the window plus the (possibly new) dock.
pub fn transition(
    before: ChromeInputs,
    after: ChromeInputs,
    config: &ChromeConfig,
    policy: NotifyPolicy,
) -> Transition {
    let notify = match policy {
        NotifyPolicy::Always => AttributeSet::state_dependent(),
        NotifyPolicy::OnChange => {
            let old = ChromeSnapshot::derive(before, config);
            let new = ChromeSnapshot::derive(after, config);
            old.diff(&new) & AttributeSet::state_dependent()
        }
    };

    Transition { inputs: after, notify }
}
