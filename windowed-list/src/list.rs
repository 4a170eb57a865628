use alloc::vec::Vec;

use crate::assemble::{Assembler, PositionSource, PositionTrack};
use crate::key::{ItemKey, KeyMap};
use crate::math;
use crate::{
    Axis, Layout, LayoutKey, Layouts, ListLayoutsOptions, Rect, ReloadContext, Size, VisibleItem,
};

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    layout: Option<Layout>,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    slot: u32,
    index: usize,
}

/// Arena view handed to the [`Assembler`]: index → slot → layout position along one axis.
///
/// `S` is `&[Slot]` for queries and `&mut [Slot]` for consolidation.
struct Track<'a, S> {
    order: &'a [u32],
    slots: S,
    axis: Axis,
}

impl<S: AsRef<[Slot]>> Track<'_, S> {
    fn layout(&self, index: usize) -> Option<&Layout> {
        let slot = *self.order.get(index)?;
        self.slots.as_ref().get(slot as usize)?.layout.as_ref()
    }
}

impl<S: AsRef<[Slot]>> PositionSource for Track<'_, S> {
    fn size_at(&self, index: usize) -> Option<f64> {
        self.layout(index).map(|l| l.rect.extent_on(self.axis))
    }

    fn position_at(&self, index: usize) -> Option<f64> {
        self.layout(index).map(|l| l.rect.offset_on(self.axis))
    }
}

impl<S: AsRef<[Slot]> + AsMut<[Slot]>> PositionTrack for Track<'_, S> {
    fn set_position(&mut self, index: usize, value: f64) {
        let Some(&slot) = self.order.get(index) else {
            return;
        };
        if let Some(layout) = self
            .slots
            .as_mut()
            .get_mut(slot as usize)
            .and_then(|s| s.layout.as_mut())
        {
            layout.rect.set_offset_on(self.axis, value);
        }
    }
}

/// A [`Layouts`] strategy for a flat list along one axis.
///
/// Layouts live in a generational arena keyed by item identity; they survive data replacement
/// for items that are still present and are swept for items that are gone.
#[derive(Clone, Debug)]
pub struct ListLayouts<T> {
    options: ListLayoutsOptions,
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<u32>,
    entries: KeyMap<T, Entry>,
    duplicates: Vec<u32>,
    assembler: Assembler,
    content_size: Size,
    loaded: bool,
}

impl<T: ItemKey> Default for ListLayouts<T> {
    fn default() -> Self {
        Self::new(ListLayoutsOptions::default())
    }
}

impl<T: ItemKey> ListLayouts<T> {
    pub fn new(options: ListLayoutsOptions) -> Self {
        Self {
            options,
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            entries: KeyMap::default(),
            duplicates: Vec::new(),
            assembler: Assembler::new(),
            content_size: Size::ZERO,
            loaded: false,
        }
    }

    pub fn options(&self) -> &ListLayoutsOptions {
        &self.options
    }

    pub fn axis(&self) -> Axis {
        self.options.axis
    }

    pub fn set_axis(&mut self, axis: Axis) {
        self.options.axis = axis;
    }

    pub fn set_item_size(&mut self, item_size: Option<f64>) {
        self.options.item_size = item_size;
    }

    pub fn set_estimated_item_size(&mut self, estimated_item_size: f64) {
        self.options.estimated_item_size = estimated_item_size;
    }

    /// Number of items laid out by the last reindex.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of live layouts in the arena.
    pub fn layout_count(&self) -> usize {
        self.entries.len() + self.duplicates.len()
    }

    /// Size of the slot arena, live and free slots together.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn layout_at(&self, index: usize) -> Option<Layout> {
        let slot = *self.order.get(index)?;
        self.slots.get(slot as usize)?.layout
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.entries.get(item).map(|e| e.index)
    }

    /// Position of `index` as the assembler currently sees it (possibly extrapolated).
    pub fn position_at(&self, index: usize) -> Option<f64> {
        self.assembler.position_at(&self.track(), index)
    }

    /// Greatest index whose position is `<= offset`.
    pub fn index_at(&self, offset: f64) -> usize {
        self.assembler.index_at(&self.track(), offset)
    }

    fn track(&self) -> Track<'_, &[Slot]> {
        Track {
            order: &self.order,
            slots: &self.slots,
            axis: self.options.axis,
        }
    }

    fn seed_extent(&self, prev: Option<&Layout>) -> (f64, bool) {
        if let Some(layout) = prev {
            if !layout.estimated {
                return (layout.rect.extent_on(self.options.axis), false);
            }
        }
        if let Some(size) = self.options.item_size {
            return (math::non_negative(size), false);
        }
        (math::non_negative(self.options.estimated_item_size), true)
    }

    fn alloc_slot(&mut self) -> u32 {
        if let Some(slot) = self.free.pop() {
            return slot;
        }
        self.slots.push(Slot {
            generation: 0,
            layout: None,
        });
        (self.slots.len() - 1) as u32
    }

    fn release_slot(&mut self, slot: u32) {
        if let Some(s) = self.slots.get_mut(slot as usize) {
            s.layout = None;
            s.generation = s.generation.wrapping_add(1);
            self.free.push(slot);
        }
    }

    fn reindex(&mut self, data: &[T], visible_rect: Rect) {
        let axis = self.options.axis;
        let cross_extent = visible_rect.extent_on(axis.cross());
        for slot in core::mem::take(&mut self.duplicates) {
            self.release_slot(slot);
        }
        let mut previous = core::mem::take(&mut self.entries);
        let mut entries: KeyMap<T, Entry> = KeyMap::default();
        let mut order = Vec::with_capacity(data.len());
        let mut position = 0.0;

        for (index, item) in data.iter().enumerate() {
            let duplicate = entries.contains_key(item);
            let prev = if duplicate {
                vwarn!(index, "ListLayouts: duplicate item in data, laying it out separately");
                None
            } else {
                previous.remove(item)
            };
            let prev_layout = prev
                .and_then(|e| self.slots.get(e.slot as usize))
                .and_then(|s| s.layout);
            let (extent, estimated) = self.seed_extent(prev_layout.as_ref());
            let slot = match prev {
                Some(e) => e.slot,
                None => self.alloc_slot(),
            };

            let mut rect = prev_layout.map(|l| l.rect).unwrap_or_default();
            rect.set_offset_on(axis, position);
            rect.set_offset_on(axis.cross(), 0.0);
            rect.set_extent_on(axis, extent);
            rect.set_extent_on(axis.cross(), cross_extent);
            if let Some(target) = self.slots.get_mut(slot as usize) {
                target.layout = Some(Layout {
                    key: LayoutKey {
                        slot,
                        generation: target.generation,
                    },
                    rect,
                    estimated,
                });
            }

            // Later copies of an item own their slot until the next reindex; lookups by item
            // resolve to the first copy.
            if duplicate {
                self.duplicates.push(slot);
            } else {
                entries.insert(item.clone(), Entry { slot, index });
            }
            order.push(slot);
            position = rect.max_on(axis);
        }

        vdebug!(
            count = data.len(),
            dropped = previous.len(),
            duplicates = self.duplicates.len(),
            "ListLayouts::reindex"
        );
        for (_, entry) in previous {
            self.release_slot(entry.slot);
        }

        self.entries = entries;
        self.order = order;
        self.assembler.reset(data.len());
        self.loaded = true;
    }

    fn fill(&mut self, rect: Rect) {
        let axis = self.options.axis;
        let min = rect.offset_on(axis).max(0.0);
        let max = min + rect.extent_on(axis);
        let mut track = Track {
            order: &self.order,
            slots: self.slots.as_mut_slice(),
            axis,
        };
        self.assembler.consolidate(&mut track, min, max);
    }

    fn update_content_size(&mut self, visible_rect: Rect) {
        let axis = self.options.axis;
        let main = match self.order.len().checked_sub(1) {
            Some(last) => {
                let size = self.layout_at(last).map_or(0.0, |l| l.rect.extent_on(axis));
                self.position_at(last).unwrap_or(0.0) + size
            }
            None => 0.0,
        };
        let cross = visible_rect.extent_on(axis.cross());
        self.content_size = match axis {
            Axis::X => Size::new(main, cross),
            Axis::Y => Size::new(cross, main),
        };
    }
}

impl<T: ItemKey> Layouts<T> for ListLayouts<T> {
    fn reload(&mut self, data: &[T], visible_rect: Rect, context: ReloadContext) {
        // A strategy swapped back in may still hold an older array.
        let stale = data.len() != self.order.len();
        if context.needs_reindex() || !self.loaded || stale {
            if stale && self.loaded && !context.needs_reindex() {
                vdebug!(
                    len = data.len(),
                    laid_out = self.order.len(),
                    "ListLayouts::reload: data length changed, reindexing"
                );
            }
            self.reindex(data, visible_rect);
        }
        self.fill(visible_rect);
        self.update_content_size(visible_rect);
    }

    fn item(&self, item: &T) -> Option<Layout> {
        let entry = self.entries.get(item)?;
        self.slots.get(entry.slot as usize)?.layout
    }

    fn layout(&self, key: LayoutKey) -> Option<Layout> {
        let slot = self.slots.get(key.slot as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.layout
    }

    fn update_item_size(&mut self, item: &T, size: Size) -> bool {
        let Some(entry) = self.entries.get(item).copied() else {
            vwarn!("ListLayouts::update_item_size: unknown item");
            return false;
        };
        let size = size.sanitized();
        let axis = self.options.axis;
        let Some(layout) = self
            .slots
            .get_mut(entry.slot as usize)
            .and_then(|s| s.layout.as_mut())
        else {
            return false;
        };

        if layout.rect.size() == size && !layout.estimated {
            return false;
        }

        layout.estimated = false;
        layout.rect.width = size.width;
        layout.rect.height = size.height;
        self.assembler.update(entry.index, size.extent_on(axis));
        vtrace!(index = entry.index, extent = size.extent_on(axis), "update_item_size");
        true
    }

    fn for_each_visible_item(&mut self, rect: Rect, f: &mut dyn FnMut(VisibleItem)) {
        if !self.loaded {
            return;
        }
        let axis = self.options.axis;
        self.fill(rect);

        let start = self.index_at(rect.offset_on(axis));
        vtrace!(
            start,
            offset = rect.offset_on(axis),
            extent = rect.extent_on(axis),
            "for_each_visible_item"
        );

        let mut i = start;
        while let Some(layout) = self.layout_at(i) {
            if !layout.rect.intersects_on(&rect, axis) {
                break;
            }
            f(VisibleItem { index: i, layout });
            i += 1;
        }
    }

    fn content_size(&self) -> Size {
        self.content_size
    }
}
