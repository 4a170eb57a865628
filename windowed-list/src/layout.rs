use alloc::vec::Vec;

use crate::{Rect, Size};

/// Stable identity of a [`Layout`].
///
/// Keys are generational: when an item is dropped its slot may be reused, but never with the
/// same generation, so a key never refers to two different items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutKey {
    pub slot: u32,
    pub generation: u32,
}

/// Computed geometry for one item.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub key: LayoutKey,
    pub rect: Rect,
    /// `true` until a real measurement arrives.
    pub estimated: bool,
}

/// Why a reload pass is running. Contexts from coalesced requests are OR-ed together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReloadContext {
    pub data_changed: bool,
    pub offset_changed: bool,
    pub size_changed: bool,
    /// Layout parameters (axis, size hints) changed; every layout must be re-derived.
    pub layout_changed: bool,
}

impl ReloadContext {
    pub fn data_changed() -> Self {
        Self {
            data_changed: true,
            ..Self::default()
        }
    }

    pub fn layout_changed() -> Self {
        Self {
            layout_changed: true,
            ..Self::default()
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            data_changed: self.data_changed || other.data_changed,
            offset_changed: self.offset_changed || other.offset_changed,
            size_changed: self.size_changed || other.size_changed,
            layout_changed: self.layout_changed || other.layout_changed,
        }
    }

    /// Whether every layout has to be rebuilt from scratch.
    pub fn needs_reindex(&self) -> bool {
        self.data_changed || self.layout_changed
    }
}

/// One item reported by [`Layouts::for_each_visible_item`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleItem {
    pub index: usize,
    pub layout: Layout,
}

/// A layout strategy: maps items to [`Layout`]s and answers visibility queries.
pub trait Layouts<T> {
    /// Recomputes layouts for `data` around `visible_rect`.
    fn reload(&mut self, data: &[T], visible_rect: Rect, context: ReloadContext);

    fn item(&self, item: &T) -> Option<Layout>;

    fn layout(&self, key: LayoutKey) -> Option<Layout>;

    /// Records a measured size. Returns `true` when a reload is needed.
    fn update_item_size(&mut self, item: &T, size: Size) -> bool;

    /// Emits items intersecting `rect`, in ascending index order.
    fn for_each_visible_item(&mut self, rect: Rect, f: &mut dyn FnMut(VisibleItem));

    fn content_size(&self) -> Size;

    /// Collects [`Layouts::for_each_visible_item`] into a `Vec`.
    fn visible_items(&mut self, rect: Rect) -> Vec<VisibleItem> {
        let mut out = Vec::new();
        self.for_each_visible_item(rect, &mut |it| out.push(it));
        out
    }
}
