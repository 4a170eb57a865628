//! Frame-driven orchestrator for the `windowed-list` engine.
//!
//! `windowed-list` holds the clock-free pieces (layouts, overscan, anchoring, view pooling).
//! This crate wires them to a host's clock and "next frame" primitive:
//!
//! - coalesced reload passes, one per frame
//! - scroll anchoring across size and data changes
//! - tweened `scroll_to` / `scroll_to_item` with cancellation
//! - change notifications for the visible rect, content size, visible views and scrolling state
//!
//! Everything is single-threaded and callback based. Hosts supply a [`Clock`] and a
//! [`FrameScheduler`]; [`ManualClock`] and [`ManualFrames`] drive the engine by hand in tests
//! and headless tools.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod animation;
mod emitter;
mod frame;
mod math;
mod options;
mod tween;
mod virtualizer;

#[cfg(test)]
mod tests;

pub use animation::{Animation, AnimationDriver, AnimationStatus};
pub use emitter::{Emitter, EventKind, Listener, ListenerId, VirtualizerEvent};
#[cfg(feature = "std")]
pub use frame::StdClock;
pub use frame::{Clock, FrameCallback, FrameHandle, FrameScheduler, ManualClock, ManualFrames};
pub use options::{
    DEFAULT_SCROLL_DURATION_MS, ScrollToItemOptions, ScrollToOptions, VirtualizerOptions,
};
pub use tween::{Easing, Tween};
pub use virtualizer::{SharedLayouts, Virtualizer};

pub use windowed_list;
