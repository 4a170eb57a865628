use crate::Axis;

/// Size used for items that have neither a fixed size nor a measurement.
pub const DEFAULT_ESTIMATED_ITEM_SIZE: f64 = 48.0;

/// Configuration for [`crate::ListLayouts`].
///
/// Changing a field on a live store only takes effect on the next reindex
/// (a reload whose context has `data_changed` or `layout_changed`).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListLayoutsOptions {
    /// The virtualized axis.
    pub axis: Axis,
    /// Fixed extent for every unmeasured item. Items seeded from it are not estimated.
    pub item_size: Option<f64>,
    /// Placeholder extent for unmeasured items when `item_size` is unset.
    pub estimated_item_size: f64,
}

impl Default for ListLayoutsOptions {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            item_size: None,
            estimated_item_size: DEFAULT_ESTIMATED_ITEM_SIZE,
        }
    }
}

impl ListLayoutsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_item_size(mut self, item_size: Option<f64>) -> Self {
        self.item_size = item_size;
        self
    }

    pub fn with_estimated_item_size(mut self, estimated_item_size: f64) -> Self {
        self.estimated_item_size = estimated_item_size;
        self
    }
}
