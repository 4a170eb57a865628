//! A headless windowed list virtualization engine.
//!
//! For the frame-driven orchestrator (reload passes, scroll animations, change events), see the
//! `windowed-list-driver` crate.
//!
//! This crate holds the clock-free building blocks: a lazily consolidated position function over
//! item indexes, a per-axis list layout store with estimated sizes, a velocity-driven overscan
//! estimator, a view record pool, and scroll anchoring.
//!
//! It is UI-agnostic. A presentation layer is expected to provide:
//! - the viewport rectangle in content coordinates
//! - the item array
//! - measured item sizes, as they become known
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod assemble;
mod key;
mod layout;
mod list;
mod math;
mod options;
mod overscan;
mod rolling;
mod state;
mod types;
mod view;


pub use anchor::{AnchorMode, ScrollAnchor, capture_scroll_anchor, restore_scroll_anchor};
pub use assemble::{Assembler, PositionSource, PositionTrack};
pub use key::{ByIdentity, ItemKey};
pub use layout::{Layout, LayoutKey, Layouts, ReloadContext, VisibleItem};
pub use list::ListLayouts;
pub use options::{DEFAULT_ESTIMATED_ITEM_SIZE, ListLayoutsOptions};
pub use overscan::{DEFAULT_OVERSCAN_THROTTLE_MS, OverscanEstimator};
pub use rolling::RollingAverage;
pub use state::FrameState;
pub use types::{Axis, Point, Rect, RectCorner, Size};
pub use view::{ReuseView, View, ViewKey, ViewPool};
