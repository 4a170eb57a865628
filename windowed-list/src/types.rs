use crate::math;

/// The axis a list is virtualized along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    #[default]
    Y,
}

impl Axis {
    /// The other axis.
    pub fn cross(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along `axis` (width for X, height for Y).
    pub fn extent_on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Returns a copy with non-finite or negative extents replaced by zero.
    pub fn sanitized(self) -> Self {
        Self {
            width: math::non_negative(self.width),
            height: math::non_negative(self.height),
        }
    }
}

/// The four corners of a [`Rect`], in the order they are probed by
/// [`Rect::corner_in`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RectCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl RectCorner {
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];
}

/// An axis-aligned rectangle in content coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Leading-edge coordinate along `axis`.
    pub fn offset_on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn extent_on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Trailing-edge coordinate along `axis`.
    pub fn max_on(&self, axis: Axis) -> f64 {
        self.offset_on(axis) + self.extent_on(axis)
    }

    pub fn set_offset_on(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }

    pub fn set_extent_on(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.width = value,
            Axis::Y => self.height = value,
        }
    }

    /// Closed-interval overlap test restricted to one axis. Touching edges intersect.
    pub fn intersects_on(&self, other: &Self, axis: Axis) -> bool {
        self.offset_on(axis) <= other.max_on(axis) && other.offset_on(axis) <= self.max_on(axis)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.x <= p.x && self.y <= p.y && self.max_x() >= p.x && self.max_y() >= p.y
    }

    pub fn corner(&self, corner: RectCorner) -> Point {
        match corner {
            RectCorner::TopLeft => Point::new(self.x, self.y),
            RectCorner::TopRight => Point::new(self.max_x(), self.y),
            RectCorner::BottomLeft => Point::new(self.x, self.max_y()),
            RectCorner::BottomRight => Point::new(self.max_x(), self.max_y()),
        }
    }

    /// Returns the first of `self`'s corners that lies inside `other`.
    pub fn corner_in(&self, other: &Self) -> Option<RectCorner> {
        RectCorner::ALL
            .into_iter()
            .find(|&c| other.contains_point(self.corner(c)))
    }

    /// Returns a copy with non-finite coordinates zeroed and negative extents clamped.
    pub fn sanitized(self) -> Self {
        Self {
            x: math::finite(self.x),
            y: math::finite(self.y),
            width: math::non_negative(self.width),
            height: math::non_negative(self.height),
        }
    }
}
