use crate::{Rect, Size};

/// A lightweight, serializable snapshot of the viewport and scroll state.
///
/// Useful for restoring a list's position across sessions without persisting any layouts.
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameState {
    pub visible_rect: Rect,
    pub content_size: Size,
    pub is_scrolling: bool,
}
