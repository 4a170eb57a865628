use alloc::vec::Vec;

use crate::Layout;

/// Identity of a recycled view record. Stable for the lifetime of the record, across reuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewKey(pub u64);

/// A display-ready projection of one visible item.
#[derive(Clone, Debug, PartialEq)]
pub struct View<T> {
    pub key: ViewKey,
    pub index: usize,
    pub data: T,
    pub layout: Layout,
}

/// A view record stripped of its item, waiting in a [`ViewPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReuseView {
    pub key: ViewKey,
}

/// Free-list of view records.
///
/// Keys come from a counter owned by the pool and start at 1.
#[derive(Clone, Debug, Default)]
pub struct ViewPool {
    free: Vec<ReuseView>,
    next_key: u64,
}

impl ViewPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strips `view` and keeps its record for later.
    pub fn reuse<T>(&mut self, view: View<T>) -> ReuseView {
        let record = ReuseView { key: view.key };
        self.free.push(record);
        record
    }

    /// Refills a pooled record, or allocates a new one when the pool is empty.
    pub fn create_or_reuse<T>(&mut self, index: usize, data: T, layout: Layout) -> View<T> {
        let key = match self.free.pop() {
            Some(record) => record.key,
            None => {
                self.next_key += 1;
                ViewKey(self.next_key)
            }
        };
        View {
            key,
            index,
            data,
            layout,
        }
    }

    /// Records currently waiting for reuse.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Total number of records ever allocated by this pool.
    pub fn allocated(&self) -> u64 {
        self.next_key
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}
