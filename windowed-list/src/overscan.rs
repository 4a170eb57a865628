use crate::math;
use crate::{Point, Rect, RollingAverage};

/// Default throttle window for velocity sampling, in milliseconds.
pub const DEFAULT_OVERSCAN_THROTTLE_MS: f64 = 500.0;

/// Samples slower than this are not counted towards the collection preference.
const PREFERENCE_WINDOW_MS: f64 = 500.0;

/// Velocity assumed before any movement has been observed (units per ms).
const INITIAL_VELOCITY: Point = Point { x: 5.0, y: 5.0 };

/// Overscan magnitudes are rounded to multiples of this many units.
const BUCKET: f64 = 100.0;

/// Share of the margin placed behind the direction of travel.
const TRAILING_SHARE: f64 = 0.2;

/// Velocity-driven prefetch margin around the viewport.
///
/// Timestamps are passed in explicitly (milliseconds, any monotonic origin). The estimator keeps
/// no clock of its own.
#[derive(Clone, Debug)]
pub struct OverscanEstimator {
    throttle_ms: f64,
    last_rect_ms: f64,
    last_collect_ms: f64,
    interval: RollingAverage,
    preference: RollingAverage,
    velocity: Point,
    overscan_x: RollingAverage,
    overscan_y: RollingAverage,
    visible_rect: Rect,
}

impl Default for OverscanEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_OVERSCAN_THROTTLE_MS)
    }
}

impl OverscanEstimator {
    pub fn new(throttle_ms: f64) -> Self {
        Self {
            throttle_ms,
            last_rect_ms: 0.0,
            last_collect_ms: 0.0,
            interval: RollingAverage::new(),
            preference: RollingAverage::new(),
            velocity: INITIAL_VELOCITY,
            overscan_x: RollingAverage::new(),
            overscan_y: RollingAverage::new(),
            visible_rect: Rect::default(),
        }
    }

    pub fn throttle_ms(&self) -> f64 {
        self.throttle_ms
    }

    pub fn set_throttle_ms(&mut self, throttle_ms: f64) {
        self.throttle_ms = throttle_ms;
    }

    /// Current per-axis velocity estimate, in units per millisecond.
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// The last rectangle passed to [`OverscanEstimator::set_visible_rect`].
    pub fn visible_rect(&self) -> Rect {
        self.visible_rect
    }

    /// Records a viewport move at `now_ms`.
    ///
    /// Velocity only updates when the previous sample is inside the throttle window, the time
    /// delta is positive, and the offset actually changed on that axis.
    pub fn set_visible_rect(&mut self, rect: Rect, now_ms: f64) {
        let elapsed = now_ms - self.last_rect_ms;

        if elapsed < self.throttle_ms {
            self.interval.add(elapsed);

            if elapsed > 0.0 {
                if rect.x != self.visible_rect.x {
                    self.velocity.x = (rect.x - self.visible_rect.x) / elapsed;
                }
                if rect.y != self.visible_rect.y {
                    self.velocity.y = (rect.y - self.visible_rect.y) / elapsed;
                }
            }
        }

        self.last_rect_ms = now_ms;
        self.visible_rect = rect;
    }

    /// Per-frame sample: folds the reaction time into each axis' overscan average.
    pub fn collect(&mut self, now_ms: f64) {
        let elapsed = now_ms - self.last_collect_ms;
        if elapsed < PREFERENCE_WINDOW_MS {
            self.preference.add(elapsed);
        }
        self.last_collect_ms = now_ms;

        let reaction = self.interval.get() + self.preference.get();
        if self.visible_rect.height > 0.0 {
            self.overscan_y.add(math::abs(self.velocity.y * reaction));
        }
        if self.visible_rect.width > 0.0 {
            self.overscan_x.add(math::abs(self.velocity.x * reaction));
        }
        vtrace!(
            overscan_x = self.overscan_x.get(),
            overscan_y = self.overscan_y.get(),
            "overscan collect"
        );
    }

    /// The viewport grown by the current margins, biased toward the direction of travel.
    pub fn rect(&self) -> Rect {
        let mut out = self.visible_rect;

        let over_y = margin(self.visible_rect.height, self.overscan_y.get());
        out.y -= if self.velocity.y > 0.0 {
            over_y * TRAILING_SHARE
        } else {
            over_y
        };
        out.height += over_y + over_y * TRAILING_SHARE;

        let over_x = margin(self.visible_rect.width, self.overscan_x.get());
        out.x -= if self.velocity.x > 0.0 {
            over_x * TRAILING_SHARE
        } else {
            over_x
        };
        out.width += over_x + over_x * TRAILING_SHARE;

        out
    }
}

/// Overscan magnitude bucketed to [`BUCKET`] and capped at twice the viewport extent.
fn margin(extent: f64, overscan: f64) -> f64 {
    let cap = extent * 2.0;
    let bucketed = math::round(overscan.min(cap) / BUCKET) * BUCKET;
    // Rounding up to the next bucket must not break the cap.
    math::non_negative(bucketed.min(cap))
}
