use crate::{Layout, LayoutKey, Point, Rect, RectCorner};

/// When the viewport is pinned to a visible item across reloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorMode {
    Disabled,
    /// Anchor everywhere except when the viewport sits at the content origin.
    #[default]
    Enabled,
    /// Anchor even at the content origin, so content inserted above pushes the viewport down.
    Top,
}

impl From<bool> for AnchorMode {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Enabled } else { Self::Disabled }
    }
}

/// One corner of one layout, and where it sat relative to the viewport origin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor {
    pub layout: LayoutKey,
    pub corner: RectCorner,
    pub offset: Point,
}

/// Picks the visible corner closest to the viewport's leading edge.
///
/// For every layout with a non-zero area, the first of its corners inside `visible_rect` is
/// considered; a candidate wins when it is nearer on either axis.
pub fn capture_scroll_anchor<'a>(
    layouts: impl IntoIterator<Item = &'a Layout>,
    visible_rect: Rect,
    mode: AnchorMode,
) -> Option<ScrollAnchor> {
    match mode {
        AnchorMode::Disabled => return None,
        AnchorMode::Enabled if visible_rect.x == 0.0 && visible_rect.y == 0.0 => return None,
        _ => {}
    }

    let mut best: Option<ScrollAnchor> = None;
    for layout in layouts {
        if layout.rect.area() <= 0.0 {
            continue;
        }
        let Some(corner) = layout.rect.corner_in(&visible_rect) else {
            continue;
        };
        let point = layout.rect.corner(corner);
        let offset = Point::new(point.x - visible_rect.x, point.y - visible_rect.y);
        let closer = best.is_none_or(|b| offset.y < b.offset.y || offset.x < b.offset.x);
        if closer {
            best = Some(ScrollAnchor {
                layout: layout.key,
                corner,
                offset,
            });
        }
    }
    best
}

/// Content offset that puts the anchored corner of `layout_rect` back at its captured offset.
pub fn restore_scroll_anchor(anchor: &ScrollAnchor, layout_rect: Rect) -> Point {
    let point = layout_rect.corner(anchor.corner);
    Point::new(point.x - anchor.offset.x, point.y - anchor.offset.y)
}
