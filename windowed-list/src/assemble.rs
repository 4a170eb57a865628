use alloc::collections::BTreeMap;
use core::mem;

use crate::RollingAverage;

/// Storage the [`Assembler`] reads sizes and positions from.
///
/// Returning `None` means "no item at this index"; the assembler skips such indexes instead of
/// failing.
pub trait PositionSource {
    fn size_at(&self, index: usize) -> Option<f64>;
    fn position_at(&self, index: usize) -> Option<f64>;
}

/// A [`PositionSource`] the [`Assembler`] can also write settled positions into.
pub trait PositionTrack: PositionSource {
    fn set_position(&mut self, index: usize, value: f64);
}

/// Lazily corrected prefix positions over item indexes.
///
/// Size changes are recorded with [`Assembler::update`] and only propagated on
/// [`Assembler::consolidate`], which walks forward no further than the requested bound. Indexes
/// past the settled point are extrapolated from the average observed size, so lookups far ahead
/// never force a walk over the whole list.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    average: RollingAverage,
    pending: BTreeMap<usize, f64>,
    len: usize,
    last_index: Option<usize>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest index whose position is known to be settled.
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Average of every size recorded through [`Assembler::update`] since the last reset.
    pub fn average_size(&self) -> f64 {
        self.average.get()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Records a new size for `index`. Nothing moves until the next consolidation.
    pub fn update(&mut self, index: usize, size: f64) {
        self.average.add(size);
        self.pending.insert(index, size);
    }

    /// Flushes pending updates, then settles positions forward until they pass `max`.
    pub fn consolidate(&mut self, track: &mut impl PositionTrack, min: f64, max: f64) {
        debug_assert!(min <= max, "consolidate: min ({min}) > max ({max})");
        self.flush_pending(track);

        let Some(mut last) = self.last_index else {
            return;
        };

        let mut pos = track.position_at(last);
        while let Some(p) = pos {
            if p > max {
                break;
            }
            push_next(track, last);
            last += 1;
            pos = track.position_at(last);
        }
        if pos.is_none() {
            last = last.saturating_sub(1);
        }
        vtrace!(min, max, last, "consolidate");
        self.last_index = Some(last);
    }

    fn flush_pending(&mut self, track: &mut impl PositionTrack) {
        let mut prev: Option<usize> = None;
        // BTreeMap iterates in ascending index order.
        for (index, size) in mem::take(&mut self.pending) {
            let next = match (self.last_index, prev) {
                (None, _) => index,
                // Extending a run cascaded in this same flush keeps the settled point contiguous.
                (Some(last), Some(p)) if last == p && p + 1 == index => index,
                (Some(last), _) => last.min(index),
            };
            self.last_index = Some(next);
            prev = Some(index);

            if let Some(pos) = track.position_at(index) {
                track.set_position(index + 1, pos + size);
            }
        }
    }

    /// Position of `index`, extrapolated with the average size past the settled point.
    pub fn position_at(&self, track: &impl PositionSource, index: usize) -> Option<f64> {
        if let Some(last) = self.last_index {
            if index > last {
                if let Some(pos) = track.position_at(last) {
                    return Some(pos + (index - last) as f64 * self.average.get());
                }
            }
        }
        track.position_at(index)
    }

    /// Greatest index whose position is `<= offset`, clamped to `0`.
    pub fn index_at(&self, track: &impl PositionSource, offset: f64) -> usize {
        let mut low: isize = 0;
        let mut high: isize = self.len as isize - 1;

        while low <= high {
            let middle = low + (high - low) / 2;
            let middle_offset = self.position_at(track, middle as usize).unwrap_or(0.0);

            if middle_offset == offset {
                return middle as usize;
            } else if middle_offset < offset {
                low = middle + 1;
            } else {
                high = middle - 1;
            }
        }

        (low - 1).max(0) as usize
    }

    /// Forgets all settled state. Call whenever the item sequence is rebuilt.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.last_index = None;
        self.pending.clear();
        self.average.reset();
    }
}

fn push_next(track: &mut impl PositionTrack, index: usize) {
    let (Some(pos), Some(size)) = (track.position_at(index), track.size_at(index)) else {
        return;
    };
    track.set_position(index + 1, pos + size);
}
