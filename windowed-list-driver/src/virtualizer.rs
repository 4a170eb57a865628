use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::mem;

use windowed_list::{
    AnchorMode, FrameState, ItemKey, LayoutKey, Layouts, OverscanEstimator, Point, Rect,
    ReloadContext, Size, View, ViewPool, VisibleItem, capture_scroll_anchor,
    restore_scroll_anchor,
};

use crate::emitter::{Emitter, EventKind, ListenerId, VirtualizerEvent};
use crate::math;
use crate::{
    Animation, AnimationDriver, Clock, FrameHandle, FrameScheduler, ScrollToItemOptions,
    ScrollToOptions, VirtualizerOptions,
};

/// A layout strategy shared between the host and a [`Virtualizer`].
pub type SharedLayouts<T> = Rc<RefCell<dyn Layouts<T>>>;

/// Restored offsets closer than this to the current one count as unchanged.
const OFFSET_EPSILON: f64 = 1e-6;

/// The orchestrator: owns the data, the viewport, the active layout strategy and the visible
/// view set, and runs reload passes and scroll animations against an injected clock and frame
/// scheduler.
///
/// `Virtualizer` is a cheap handle; clones drive the same instance. Change notifications are
/// delivered synchronously, after the internal state is released, so listeners may call back
/// into the virtualizer.
///
/// The frame scheduler must not run callbacks from inside `register`.
pub struct Virtualizer<T: ItemKey + 'static> {
    shared: Rc<Shared<T>>,
}

struct Shared<T: ItemKey + 'static> {
    core: RefCell<Core<T>>,
    emitter: RefCell<Emitter<T>>,
}

struct Core<T: ItemKey + 'static> {
    this: Weak<Shared<T>>,
    options: VirtualizerOptions,
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn FrameScheduler>,
    driver: AnimationDriver,
    overscan: OverscanEstimator,

    visible_rect: Rect,
    content_size: Size,
    data: Option<Vec<T>>,
    layouts: Option<SharedLayouts<T>>,

    visible: Vec<VisibleItem>,
    views: BTreeMap<LayoutKey, View<T>>,
    pool: ViewPool,

    pending: Option<ReloadContext>,
    pending_frame: Option<FrameHandle>,
    // Reloads requested while an animation owns the viewport.
    deferred: Option<ReloadContext>,
    // Data replaced mid-animation; the settle reload still returns to the origin.
    data_replaced: bool,
    reload_depth: u32,

    is_scrolling: bool,
    animation: Option<(u64, Animation)>,
    next_animation_id: u64,
    size_queue: Vec<(T, Size)>,

    destroyed: bool,
    events: Vec<VirtualizerEvent<T>>,
}

impl<T: ItemKey + 'static> Clone for Virtualizer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: ItemKey + 'static> Virtualizer<T> {
    pub fn new(
        options: VirtualizerOptions,
        clock: Rc<dyn Clock>,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Self {
        vdebug!(
            overscan_throttle_ms = options.overscan_throttle_ms,
            scroll_duration_ms = options.scroll_duration_ms,
            "Virtualizer::new"
        );
        let shared = Rc::new_cyclic(|this| Shared {
            core: RefCell::new(Core {
                this: this.clone(),
                driver: AnimationDriver::new(Rc::clone(&clock), Rc::clone(&scheduler)),
                overscan: OverscanEstimator::new(options.overscan_throttle_ms),
                options,
                clock,
                scheduler,
                visible_rect: Rect::default(),
                content_size: Size::ZERO,
                data: None,
                layouts: None,
                visible: Vec::new(),
                views: BTreeMap::new(),
                pool: ViewPool::new(),
                pending: None,
                pending_frame: None,
                deferred: None,
                data_replaced: false,
                reload_depth: 0,
                is_scrolling: false,
                animation: None,
                next_animation_id: 0,
                size_queue: Vec::new(),
                destroyed: false,
                events: Vec::new(),
            }),
            emitter: RefCell::new(Emitter::new()),
        });
        Self { shared }
    }

    fn from_shared(shared: Rc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Runs `f` against the internal state, then delivers the events it raised.
    fn with_core<R>(&self, f: impl FnOnce(&mut Core<T>) -> R) -> R {
        let (out, events) = {
            let mut core = self.shared.core.borrow_mut();
            let out = f(&mut core);
            (out, mem::take(&mut core.events))
        };
        self.dispatch(events);
        out
    }

    fn dispatch(&self, events: Vec<VirtualizerEvent<T>>) {
        for event in events {
            let listeners = self.shared.emitter.borrow().listeners_for(event.kind());
            for listener in listeners {
                if self.shared.core.borrow().destroyed {
                    return;
                }
                listener(&event);
            }
        }
    }

    pub fn on(
        &self,
        kind: EventKind,
        listener: impl Fn(&VirtualizerEvent<T>) + 'static,
    ) -> ListenerId {
        self.shared.emitter.borrow_mut().on(kind, Rc::new(listener))
    }

    /// Returns `false` when `id` was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        self.shared.emitter.borrow_mut().off(id)
    }

    pub fn options(&self) -> VirtualizerOptions {
        self.shared.core.borrow().options
    }

    /// Clones the current options, applies `f`, then applies the result.
    pub fn update_options(&self, f: impl FnOnce(&mut VirtualizerOptions)) {
        self.with_core(|c| {
            let mut next = c.options;
            f(&mut next);
            c.overscan.set_throttle_ms(next.overscan_throttle_ms);
            c.options = next;
        });
    }

    /// Replaces the item array. Layouts are re-derived and the viewport returns to the origin
    /// on the next frame.
    pub fn set_data(&self, items: Vec<T>) {
        self.with_core(|c| {
            if c.destroyed {
                return;
            }
            vdebug!(len = items.len(), "Virtualizer::set_data");
            c.visible.clear();
            c.size_queue.clear();
            c.data = Some(items);
            c.trigger_reload(ReloadContext::data_changed());
        });
    }

    /// Swaps the layout strategy. Setting the current strategy again is a no-op.
    pub fn set_layouts(&self, layouts: SharedLayouts<T>) {
        self.with_core(|c| {
            if c.destroyed {
                return;
            }
            if c.layouts.as_ref().is_some_and(|cur| Rc::ptr_eq(cur, &layouts)) {
                return;
            }
            // Layout keys from another strategy mean nothing to the new one.
            for (_, view) in mem::take(&mut c.views) {
                c.pool.reuse(view);
            }
            c.visible.clear();
            c.layouts = Some(layouts);
            // The incoming strategy may have been laid out against another array.
            c.trigger_reload(ReloadContext::layout_changed());
        });
    }

    pub fn layouts(&self) -> Option<SharedLayouts<T>> {
        self.shared.core.borrow().layouts.clone()
    }

    /// Schedules a reload that re-derives every layout, keeping the scroll offset.
    ///
    /// Call this after changing axis or size hints on the active strategy.
    pub fn invalidate_layouts(&self) {
        self.with_core(|c| c.trigger_reload(ReloadContext::layout_changed()));
    }

    pub fn visible_rect(&self) -> Rect {
        self.shared.core.borrow().visible_rect
    }

    /// Reports the viewport. With `immediate`, the reload runs now instead of on the next frame.
    pub fn set_visible_rect(&self, rect: Rect, immediate: bool) {
        self.with_core(|c| {
            if c.destroyed {
                return;
            }
            c.set_visible_rect(rect.sanitized(), immediate);
        });
    }

    pub fn content_size(&self) -> Size {
        self.shared.core.borrow().content_size
    }

    /// The visible views, sorted by index.
    pub fn visible_views(&self) -> Vec<View<T>> {
        self.shared.core.borrow().sorted_views()
    }

    pub fn is_scrolling(&self) -> bool {
        self.shared.core.borrow().is_scrolling
    }

    /// Host-driven scrolling flag. Ignored while a scroll animation runs.
    pub fn set_is_scrolling(&self, value: bool) {
        self.with_core(|c| c.set_is_scrolling(value));
    }

    pub fn is_animating(&self) -> bool {
        self.shared.core.borrow().animation.is_some()
    }

    /// Whether a reload is waiting for the next frame.
    pub fn has_pending_reload(&self) -> bool {
        self.shared.core.borrow().pending.is_some()
    }

    pub fn frame_state(&self) -> FrameState {
        let core = self.shared.core.borrow();
        FrameState {
            visible_rect: core.visible_rect,
            content_size: core.content_size,
            is_scrolling: core.is_scrolling,
        }
    }

    /// Moves the viewport back to a saved [`FrameState`] on the next frame.
    pub fn restore_frame_state(&self, state: FrameState) {
        self.set_visible_rect(state.visible_rect, false);
    }

    /// Records a measured item size.
    ///
    /// While a scroll animation runs the update is queued, and applied when the animation ends.
    pub fn update_item_size(&self, item: &T, size: Size) {
        self.with_core(|c| c.update_item_size(item, size));
    }

    pub fn set_anchor_scroll_position(&self, mode: impl Into<AnchorMode>) {
        let mode = mode.into();
        self.with_core(|c| c.options.anchor_scroll_position = mode);
    }

    pub fn set_overscan_throttle(&self, throttle_ms: f64) {
        self.with_core(|c| {
            c.options.overscan_throttle_ms = throttle_ms;
            c.overscan.set_throttle_ms(throttle_ms);
        });
    }

    /// Samples frame timing for the overscan estimator. Call once per rendered frame.
    pub fn collect(&self) {
        self.with_core(|c| {
            let now = c.clock.now_ms();
            c.overscan.collect(now);
        });
    }

    /// Scrolls the viewport to `offset`, clamped to the content.
    ///
    /// Any running scroll animation is cancelled first. A zero duration (or an offset equal to
    /// the current one) applies synchronously and returns a completed [`Animation`].
    pub fn scroll_to(&self, offset: Point, options: ScrollToOptions) -> Animation {
        let previous = self.with_core(|c| c.animation.take());
        let interrupted = previous.is_some();
        if let Some((_, animation)) = previous {
            // Its settle hook sees a stale id and leaves the state alone.
            animation.cancel();
        }

        let (animation, id) = self.with_core(|c| c.start_scroll(offset, options, interrupted));
        if let Some(id) = id {
            let this = Rc::downgrade(&self.shared);
            animation.on_settle(move |_| {
                if let Some(shared) = this.upgrade() {
                    Virtualizer::from_shared(shared).finish_animation(id);
                }
            });
        }
        animation
    }

    /// Scrolls just enough to bring `item` into view. Returns `None` for an unknown item.
    pub fn scroll_to_item(&self, item: &T, options: ScrollToItemOptions) -> Option<Animation> {
        let target = self.with_core(|c| c.item_scroll_target(item, &options))?;
        Some(self.scroll_to(target, options.scroll))
    }

    /// Cancels pending work and drops every listener. The virtualizer is inert afterwards.
    pub fn destroy(&self) {
        let animation = self.with_core(|c| {
            vdebug!("Virtualizer::destroy");
            c.destroyed = true;
            c.cancel_pending_frame();
            c.deferred = None;
            c.data_replaced = false;
            c.size_queue.clear();
            c.events.clear();
            c.animation.take()
        });
        if let Some((_, animation)) = animation {
            animation.cancel();
        }
        self.shared.emitter.borrow_mut().clear();
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.core.borrow().destroyed
    }

    fn run_pending_reload(&self) {
        self.with_core(|c| {
            c.pending_frame = None;
            let context = c.pending.take().unwrap_or_default();
            c.reload(context);
        });
    }

    fn apply_animation_frame(&self, id: u64, point: Point) {
        self.with_core(|c| c.apply_animation_frame(id, point));
    }

    fn finish_animation(&self, id: u64) {
        self.with_core(|c| {
            if c.animation.as_ref().is_none_or(|(current, _)| *current != id) {
                return;
            }
            c.animation = None;
            vdebug!(id, "scroll animation settled");
            c.settle_scroll();
        });
    }
}

impl<T: ItemKey + 'static> fmt::Debug for Virtualizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core.borrow();
        f.debug_struct("Virtualizer")
            .field("visible_rect", &core.visible_rect)
            .field("content_size", &core.content_size)
            .field("views", &core.views.len())
            .field("is_scrolling", &core.is_scrolling)
            .field("animating", &core.animation.is_some())
            .field("destroyed", &core.destroyed)
            .finish()
    }
}

impl<T: ItemKey + 'static> Core<T> {
    fn trigger_reload(&mut self, context: ReloadContext) {
        if self.destroyed {
            return;
        }
        if self.animation.is_some() {
            self.deferred = Some(self.deferred.unwrap_or_default().merge(context));
            return;
        }
        if let Some(pending) = self.pending {
            self.pending = Some(pending.merge(context));
            return;
        }

        self.pending = Some(context);
        let this = self.this.clone();
        let handle = self.scheduler.register(Box::new(move |_| {
            if let Some(shared) = this.upgrade() {
                Virtualizer::from_shared(shared).run_pending_reload();
            }
        }));
        self.pending_frame = Some(handle);
    }

    fn cancel_pending_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// The reload pass: anchor, relayout, restore, refresh views.
    fn reload(&mut self, mut context: ReloadContext) {
        self.cancel_pending_frame();
        if let Some(pending) = self.pending.take() {
            context = pending.merge(context);
        }

        if self.destroyed {
            return;
        }
        if self.animation.is_some() {
            self.deferred = Some(self.deferred.unwrap_or_default().merge(context));
            return;
        }
        let (Some(layouts), Some(data)) = (self.layouts.clone(), self.data.as_ref()) else {
            return;
        };
        vdebug!(?context, depth = self.reload_depth, "reload");

        let anchor = if context.data_changed {
            None
        } else {
            // Visible layouts are re-read so the anchor sees the current geometry.
            let current: Vec<_> = {
                let store = layouts.borrow();
                self.visible
                    .iter()
                    .filter_map(|it| store.layout(it.layout.key))
                    .collect()
            };
            capture_scroll_anchor(
                &current,
                self.visible_rect,
                self.options.anchor_scroll_position,
            )
        };

        layouts
            .borrow_mut()
            .reload(data, self.visible_rect, context);
        let content_size = layouts.borrow().content_size();
        self.set_content_size(content_size);

        let origin = self.visible_rect.origin();
        let target = if context.data_changed {
            Point::ZERO
        } else {
            anchor
                .and_then(|a| {
                    let rect = layouts.borrow().layout(a.layout)?.rect;
                    Some(restore_scroll_anchor(&a, rect))
                })
                .unwrap_or(origin)
        };
        let target = self.clamp_offset(target);

        if same_offset(target, origin) {
            self.update_views();
        } else if self.reload_depth >= self.options.max_reload_depth {
            vwarn!(
                depth = self.reload_depth,
                "reload: anchor restore depth limit reached, keeping the current offset"
            );
            self.update_views();
        } else {
            self.reload_depth += 1;
            self.set_content_offset(target);
            self.reload_depth -= 1;
        }
    }

    fn set_visible_rect(&mut self, rect: Rect, immediate: bool) {
        let offset_changed = rect.origin() != self.visible_rect.origin();
        let size_changed = rect.size() != self.visible_rect.size();
        if !offset_changed && !size_changed {
            return;
        }

        let now = self.clock.now_ms();
        self.overscan.set_visible_rect(rect, now);
        self.visible_rect = rect;

        let context = ReloadContext {
            offset_changed,
            size_changed,
            ..ReloadContext::default()
        };
        if immediate {
            self.reload(context);
        } else {
            self.trigger_reload(context);
        }
    }

    fn set_content_offset(&mut self, offset: Point) {
        let rect = Rect::from_origin_size(offset, self.visible_rect.size());
        self.set_visible_rect(rect, true);
        self.events.push(VirtualizerEvent::VisibleRectChanged(rect));
    }

    fn set_content_size(&mut self, size: Size) {
        if self.content_size == size {
            return;
        }
        self.content_size = size;
        self.events.push(VirtualizerEvent::ContentSizeChanged(size));
    }

    fn set_is_scrolling(&mut self, value: bool) {
        if self.animation.is_some() || self.is_scrolling == value {
            return;
        }
        self.is_scrolling = value;
        self.events.push(VirtualizerEvent::ScrollingChanged(value));
    }

    fn clamp_offset(&self, p: Point) -> Point {
        let max_x = self.content_size.width - self.visible_rect.width;
        let max_y = self.content_size.height - self.visible_rect.height;
        Point::new(p.x.min(max_x).max(0.0), p.y.min(max_y).max(0.0))
    }

    /// Diffs the overscanned visible set against the current views, recycling the ones that
    /// left and refreshing the ones that stayed.
    fn update_views(&mut self) {
        let (Some(layouts), Some(data)) = (self.layouts.clone(), self.data.as_ref()) else {
            return;
        };
        let rect = self.overscan.rect();
        let items = layouts.borrow_mut().visible_items(rect);
        vtrace!(
            count = items.len(),
            first = items.first().map(|it| it.index),
            "update_views"
        );

        let keys: BTreeSet<LayoutKey> = items.iter().map(|it| it.layout.key).collect();
        let stale: Vec<LayoutKey> = self
            .views
            .keys()
            .filter(|k| !keys.contains(k))
            .copied()
            .collect();
        let mut changed = !stale.is_empty();
        for key in stale {
            if let Some(view) = self.views.remove(&key) {
                self.pool.reuse(view);
            }
        }

        for item in &items {
            let Some(value) = data.get(item.index) else {
                debug_assert!(false, "update_views: index {} out of data", item.index);
                continue;
            };
            match self.views.get_mut(&item.layout.key) {
                Some(view) => {
                    if view.index != item.index || view.layout != item.layout || view.data != *value
                    {
                        view.index = item.index;
                        view.layout = item.layout;
                        view.data = value.clone();
                        changed = true;
                    }
                }
                None => {
                    let view = self
                        .pool
                        .create_or_reuse(item.index, value.clone(), item.layout);
                    self.views.insert(item.layout.key, view);
                    changed = true;
                }
            }
        }
        self.visible = items;

        if changed {
            let views = self.sorted_views();
            self.events.push(VirtualizerEvent::VisibleViewsChanged(views));
        }
    }

    fn sorted_views(&self) -> Vec<View<T>> {
        let mut views: Vec<View<T>> = self.views.values().cloned().collect();
        views.sort_by_key(|v| v.index);
        views
    }

    fn update_item_size(&mut self, item: &T, size: Size) {
        if self.destroyed {
            return;
        }
        let Some(layouts) = self.layouts.clone() else {
            return;
        };
        if self.animation.is_some() {
            match self.size_queue.iter_mut().find(|(queued, _)| queued == item) {
                Some(entry) => entry.1 = size,
                None => self.size_queue.push((item.clone(), size)),
            }
            return;
        }

        self.size_queue.retain(|(queued, _)| queued != item);
        if layouts.borrow_mut().update_item_size(item, size) {
            self.trigger_reload(ReloadContext::default());
        }
    }

    fn start_scroll(
        &mut self,
        offset: Point,
        options: ScrollToOptions,
        interrupted: bool,
    ) -> (Animation, Option<u64>) {
        if self.destroyed {
            return (Animation::completed(), None);
        }
        let duration_ms = options.duration_ms.unwrap_or(self.options.scroll_duration_ms);
        let easing = options.easing.unwrap_or(self.options.easing);
        let from = self.visible_rect.origin();
        let target = self.clamp_offset(Point::new(
            finite_or(offset.x, from.x),
            finite_or(offset.y, from.y),
        ));

        if duration_ms.is_nan() || duration_ms <= 0.0 || target == from {
            self.set_content_offset(target);
            if interrupted {
                self.settle_scroll();
            }
            return (Animation::completed(), None);
        }

        self.set_is_scrolling(true);
        self.next_animation_id += 1;
        let id = self.next_animation_id;
        vdebug!(id, ?from, ?target, duration_ms, "scroll_to");

        let this = self.this.clone();
        let animation = self.driver.run(from, target, duration_ms, easing, move |point| {
            if let Some(shared) = this.upgrade() {
                Virtualizer::from_shared(shared).apply_animation_frame(id, point);
            }
        });
        self.animation = Some((id, animation.clone()));
        (animation, Some(id))
    }

    /// One animation frame: move the viewport and refresh layouts and views, without anchoring.
    fn apply_animation_frame(&mut self, id: u64, point: Point) {
        if self.destroyed || self.animation.as_ref().is_none_or(|(current, _)| *current != id) {
            return;
        }
        let rect = Rect::from_origin_size(point, self.visible_rect.size());
        if rect == self.visible_rect {
            return;
        }
        let now = self.clock.now_ms();
        self.overscan.set_visible_rect(rect, now);
        self.visible_rect = rect;
        self.events.push(VirtualizerEvent::VisibleRectChanged(rect));

        let (Some(layouts), Some(data)) = (self.layouts.clone(), self.data.as_ref()) else {
            return;
        };
        let mut context = ReloadContext {
            offset_changed: true,
            ..ReloadContext::default()
        };
        // Data or layout changes can't wait for the animation: views index into the new data.
        if let Some(deferred) = self.deferred.as_mut() {
            if deferred.needs_reindex() {
                context.data_changed = mem::take(&mut deferred.data_changed);
                context.layout_changed = mem::take(&mut deferred.layout_changed);
            }
        }
        self.data_replaced |= context.data_changed;
        layouts.borrow_mut().reload(data, rect, context);
        let content_size = layouts.borrow().content_size();
        self.set_content_size(content_size);
        self.update_views();
    }

    /// Leaves the animating state: applies queued sizes in arrival order, then one reload.
    fn settle_scroll(&mut self) {
        if self.destroyed {
            return;
        }
        let queued = mem::take(&mut self.size_queue);
        if let Some(layouts) = self.layouts.clone() {
            let mut store = layouts.borrow_mut();
            for (item, size) in &queued {
                store.update_item_size(item, *size);
            }
        }
        let mut context = self.deferred.take().unwrap_or_default();
        context.data_changed |= mem::take(&mut self.data_replaced);
        self.trigger_reload(context);
        self.set_is_scrolling(false);
    }

    fn item_scroll_target(&self, item: &T, options: &ScrollToItemOptions) -> Option<Point> {
        let layout = self.layouts.as_ref()?.borrow().item(item)?;
        let rect = layout.rect;
        let vr = self.visible_rect;

        let mut x = vr.x;
        let mut y = vr.y;
        if options.should_scroll_x {
            let min = rect.x - options.offset_x;
            let max = x + vr.width;
            if min <= x || max == 0.0 {
                x = min;
            } else if rect.max_x() > max {
                x += rect.max_x() - max;
            }
        }
        if options.should_scroll_y {
            let min = rect.y - options.offset_y;
            let max = y + vr.height;
            if min <= y || max == 0.0 {
                y = min;
            } else if rect.max_y() > max {
                y += rect.max_y() - max;
            }
        }
        Some(Point::new(x, y))
    }
}

fn same_offset(a: Point, b: Point) -> bool {
    math::abs(a.x - b.x) <= OFFSET_EPSILON && math::abs(a.y - b.y) <= OFFSET_EPSILON
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}
