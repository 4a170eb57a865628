use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use windowed_list::{Rect, Size, View};

/// Which change a listener subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    VisibleRectChanged,
    ContentSizeChanged,
    VisibleViewsChanged,
    ScrollingChanged,
}

/// A change notification.
#[derive(Clone, Debug, PartialEq)]
pub enum VirtualizerEvent<T> {
    VisibleRectChanged(Rect),
    ContentSizeChanged(Size),
    /// The full visible view set, sorted by index.
    VisibleViewsChanged(Vec<View<T>>),
    ScrollingChanged(bool),
}

impl<T> VirtualizerEvent<T> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::VisibleRectChanged(_) => EventKind::VisibleRectChanged,
            Self::ContentSizeChanged(_) => EventKind::ContentSizeChanged,
            Self::VisibleViewsChanged(_) => EventKind::VisibleViewsChanged,
            Self::ScrollingChanged(_) => EventKind::ScrollingChanged,
        }
    }
}

/// Returned by `Virtualizer::on`; pass it to `Virtualizer::off` to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub type Listener<T> = Rc<dyn Fn(&VirtualizerEvent<T>)>;

/// Listener registry. Delivery order is registration order.
pub struct Emitter<T> {
    next_id: u64,
    listeners: Vec<(ListenerId, EventKind, Listener<T>)>,
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: EventKind, listener: Listener<T>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, kind, listener));
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Snapshot of the listeners for `kind`, so dispatch can run without holding the registry.
    pub fn listeners_for(&self, kind: EventKind) -> Vec<Listener<T>> {
        self.listeners
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, l)| Rc::clone(l))
            .collect()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
