use windowed_list::{AnchorMode, DEFAULT_OVERSCAN_THROTTLE_MS};

use crate::Easing;

/// Default scroll-to duration, in milliseconds.
pub const DEFAULT_SCROLL_DURATION_MS: f64 = 300.0;

/// Configuration for [`crate::Virtualizer`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualizerOptions {
    /// Velocity samples further apart than this are ignored by the overscan estimator.
    pub overscan_throttle_ms: f64,
    pub anchor_scroll_position: AnchorMode,
    /// Used by `scroll_to` when the call does not pass a duration.
    pub scroll_duration_ms: f64,
    /// Used by `scroll_to` when the call does not pass an easing.
    pub easing: Easing,
    /// How many times one reload pass may re-enter itself to restore an anchored offset.
    ///
    /// Past this depth the pass settles for the current offset and only refreshes views.
    pub max_reload_depth: u32,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self {
            overscan_throttle_ms: DEFAULT_OVERSCAN_THROTTLE_MS,
            anchor_scroll_position: AnchorMode::Enabled,
            scroll_duration_ms: DEFAULT_SCROLL_DURATION_MS,
            easing: Easing::EaseOut,
            max_reload_depth: 4,
        }
    }
}

impl VirtualizerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overscan_throttle_ms(mut self, overscan_throttle_ms: f64) -> Self {
        self.overscan_throttle_ms = overscan_throttle_ms;
        self
    }

    pub fn with_anchor_scroll_position(mut self, anchor: impl Into<AnchorMode>) -> Self {
        self.anchor_scroll_position = anchor.into();
        self
    }

    pub fn with_scroll_duration_ms(mut self, scroll_duration_ms: f64) -> Self {
        self.scroll_duration_ms = scroll_duration_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_max_reload_depth(mut self, max_reload_depth: u32) -> Self {
        self.max_reload_depth = max_reload_depth;
        self
    }
}

/// Per-call overrides for `Virtualizer::scroll_to`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollToOptions {
    pub duration_ms: Option<f64>,
    pub easing: Option<Easing>,
}

impl ScrollToOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump without animating.
    pub fn immediate() -> Self {
        Self::default().with_duration_ms(0.0)
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }
}

/// Options for `Virtualizer::scroll_to_item`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollToItemOptions {
    pub scroll: ScrollToOptions,
    pub should_scroll_x: bool,
    pub should_scroll_y: bool,
    /// Distance kept between the viewport's leading edge and the item, per axis.
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ScrollToItemOptions {
    fn default() -> Self {
        Self {
            scroll: ScrollToOptions::default(),
            should_scroll_x: true,
            should_scroll_y: true,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ScrollToItemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scroll(mut self, scroll: ScrollToOptions) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_axes(mut self, should_scroll_x: bool, should_scroll_y: bool) -> Self {
        self.should_scroll_x = should_scroll_x;
        self.should_scroll_y = should_scroll_y;
        self
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}
