use crate::*;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use windowed_list::{
    AnchorMode, Layout, LayoutKey, Layouts, ListLayouts, Point, Rect, ReloadContext, Size,
    VisibleItem,
};

const ITEM_HEIGHTS: [f64; 3] = [65.0, 80.0, 110.0];

fn viewport(y: f64) -> Rect {
    Rect::new(0.0, y, 120.0, 500.0)
}

/// `ListLayouts` that counts reload passes.
#[derive(Default)]
struct CountingLayouts {
    inner: ListLayouts<u32>,
    reloads: usize,
}

impl Layouts<u32> for CountingLayouts {
    fn reload(&mut self, data: &[u32], visible_rect: Rect, context: ReloadContext) {
        self.reloads += 1;
        self.inner.reload(data, visible_rect, context);
    }

    fn item(&self, item: &u32) -> Option<Layout> {
        self.inner.item(item)
    }

    fn layout(&self, key: LayoutKey) -> Option<Layout> {
        self.inner.layout(key)
    }

    fn update_item_size(&mut self, item: &u32, size: Size) -> bool {
        self.inner.update_item_size(item, size)
    }

    fn for_each_visible_item(&mut self, rect: Rect, f: &mut dyn FnMut(VisibleItem)) {
        self.inner.for_each_visible_item(rect, f);
    }

    fn content_size(&self) -> Size {
        self.inner.content_size()
    }
}

struct Harness {
    v: Virtualizer<u32>,
    clock: ManualClock,
    frames: ManualFrames,
    layouts: Rc<RefCell<CountingLayouts>>,
}

impl Harness {
    fn new(options: VirtualizerOptions) -> Self {
        let clock = ManualClock::new(0.0);
        let frames = ManualFrames::new();
        let v = Virtualizer::new(options, Rc::new(clock.clone()), Rc::new(frames.clone()));
        Self {
            v,
            clock,
            frames,
            layouts: Rc::new(RefCell::new(CountingLayouts::default())),
        }
    }

    /// Layouts, a 120x500 viewport at the origin and items `0..100`, then one frame.
    fn load(&self) {
        self.v.set_layouts(self.layouts.clone());
        self.v.set_visible_rect(viewport(0.0), false);
        self.v.set_data((0..100).collect());
        self.frame();
    }

    /// Reports real sizes for the first window, then one frame.
    fn measure_first_window(&self) {
        for i in 0..=10u32 {
            self.v
                .update_item_size(&i, Size::new(120.0, ITEM_HEIGHTS[i as usize % 3]));
        }
        self.frame();
    }

    fn frame(&self) -> usize {
        self.frames.run_frame(self.clock.now())
    }

    fn reloads(&self) -> usize {
        self.layouts.borrow().reloads
    }

    fn view_indexes(&self) -> Vec<usize> {
        self.v.visible_views().iter().map(|v| v.index).collect()
    }

    fn record(&self, kind: EventKind) -> Rc<RefCell<Vec<VirtualizerEvent<u32>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        self.v.on(kind, move |e| sink.borrow_mut().push(e.clone()));
        log
    }
}

fn loaded() -> Harness {
    let h = Harness::new(VirtualizerOptions::new());
    h.load();
    h
}

fn measured() -> Harness {
    let h = loaded();
    h.measure_first_window();
    h
}

#[test]
fn first_frame_lays_out_the_estimated_window() {
    let h = Harness::new(VirtualizerOptions::new());
    let sizes = h.record(EventKind::ContentSizeChanged);
    let views = h.record(EventKind::VisibleViewsChanged);
    h.load();

    assert_eq!(h.reloads(), 1);
    assert_eq!(h.frames.pending(), 0);
    assert_eq!(h.view_indexes(), (0..=10).collect::<Vec<_>>());
    assert_eq!(h.v.content_size(), Size::new(120.0, 4800.0));
    assert_eq!(
        *sizes.borrow(),
        vec![VirtualizerEvent::ContentSizeChanged(Size::new(120.0, 4800.0))]
    );
    assert_eq!(views.borrow().len(), 1);
    assert!(h.v.visible_views().iter().all(|v| v.data == v.index as u32));
}

#[test]
fn measurements_shrink_the_window_on_the_next_frame() {
    let h = loaded();
    for i in 0..=10u32 {
        h.v
            .update_item_size(&i, Size::new(120.0, ITEM_HEIGHTS[i as usize % 3]));
    }
    // Coalesced into a single pending reload.
    assert_eq!(h.frames.pending(), 1);
    assert!(h.v.has_pending_reload());
    assert_eq!(h.view_indexes().len(), 11);

    h.frame();
    assert_eq!(h.reloads(), 2);
    assert_eq!(h.view_indexes(), (0..=5).collect::<Vec<_>>());
    assert_eq!(h.v.visible_rect(), viewport(0.0));
}

#[test]
fn scrolling_moves_the_window() {
    let h = measured();
    h.v.set_visible_rect(viewport(500.0), false);
    h.frame();

    assert_eq!(h.view_indexes(), (5..=12).collect::<Vec<_>>());
    let views = h.v.visible_views();
    assert_eq!(views[7].layout.rect.y, 958.0);
    assert_eq!(h.v.visible_rect(), viewport(500.0));
}

#[test]
fn jumping_past_the_content_end_clamps_to_the_bottom() {
    let h = measured();
    h.v.set_visible_rect(viewport(500.0), false);
    h.frame();
    let rects = h.record(EventKind::VisibleRectChanged);

    // The estimated content is longer than the real one; the pass settles every item, then
    // clamps the offset back inside.
    let estimated = h.v.content_size().height;
    assert!(estimated > 5182.0);
    h.v.set_visible_rect(viewport(estimated - 500.0), true);

    assert_eq!(h.v.content_size().height, 5182.0);
    assert_eq!(h.v.visible_rect(), viewport(4682.0));
    assert_eq!(h.view_indexes(), (89..=99).collect::<Vec<_>>());
    assert_eq!(
        *rects.borrow(),
        vec![VirtualizerEvent::VisibleRectChanged(viewport(4682.0))]
    );
    assert_eq!(h.frames.pending(), 0);
}

#[test]
fn immediate_scroll_to_applies_synchronously() {
    let h = measured();
    let rects = h.record(EventKind::VisibleRectChanged);
    let scrolling = h.record(EventKind::ScrollingChanged);

    let animation = h.v.scroll_to(Point::new(0.0, 1000.0), ScrollToOptions::immediate());

    assert_eq!(animation.status(), AnimationStatus::Completed);
    assert_eq!(h.v.visible_rect(), viewport(1000.0));
    assert_eq!(h.frames.pending(), 0);
    assert!(!h.v.is_animating());
    assert_eq!(
        *rects.borrow(),
        vec![VirtualizerEvent::VisibleRectChanged(viewport(1000.0))]
    );
    assert!(scrolling.borrow().is_empty());
    assert!(h.view_indexes().first().is_some_and(|&i| i > 5));
}

#[test]
fn scroll_to_clamps_the_target() {
    let h = loaded();
    h.v.scroll_to(Point::new(-50.0, -10.0), ScrollToOptions::immediate());
    assert_eq!(h.v.visible_rect(), viewport(0.0));

    h.v.scroll_to(Point::new(30.0, 1e9), ScrollToOptions::immediate());
    let bottom = h.v.content_size().height - 500.0;
    assert_eq!(h.v.visible_rect().x, 0.0);
    assert_eq!(h.v.visible_rect().y, bottom);
}

#[test]
fn cancelled_animation_flushes_queued_sizes_and_reloads_once() {
    let h = Harness::new(VirtualizerOptions::new().with_anchor_scroll_position(AnchorMode::Disabled));
    h.load();
    h.measure_first_window();
    let scrolling = h.record(EventKind::ScrollingChanged);

    let animation = h.v.scroll_to(Point::new(0.0, 2000.0), ScrollToOptions::new());
    assert_eq!(animation.status(), AnimationStatus::Running);
    assert!(h.v.is_animating());
    assert!(h.v.is_scrolling());

    let completed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&completed);
    animation.on_complete(move || flag.set(true));

    let now = h.clock.advance(16.0);
    h.frames.run_frame(now);
    let y = h.v.visible_rect().y;
    assert!(y > 0.0 && y < 2000.0, "y={y}");

    // Sizes reported mid-flight wait for the animation to end.
    h.v.update_item_size(&99, Size::new(120.0, 300.0));
    assert_eq!(h.layouts.borrow().item(&99).map(|l| l.rect.height), Some(48.0));
    let before = h.reloads();

    animation.cancel();

    assert_eq!(animation.status(), AnimationStatus::Cancelled);
    assert!(!completed.get());
    assert!(!h.v.is_animating());
    assert!(!h.v.is_scrolling());
    assert_eq!(h.layouts.borrow().item(&99).map(|l| l.rect.height), Some(300.0));
    assert_eq!(h.frames.pending(), 1);
    assert_eq!(h.reloads(), before);

    h.frame();
    assert_eq!(h.reloads(), before + 1);
    assert_eq!(h.frames.pending(), 0);
    assert_eq!(h.v.visible_rect().y, y);
    assert_eq!(
        *scrolling.borrow(),
        vec![
            VirtualizerEvent::ScrollingChanged(true),
            VirtualizerEvent::ScrollingChanged(false),
        ]
    );
}

#[test]
fn animation_reaches_the_target_and_completes() {
    let h = measured();
    let scrolling = h.record(EventKind::ScrollingChanged);
    let rects = h.record(EventKind::VisibleRectChanged);

    let animation = h.v.scroll_to(
        Point::new(0.0, 1000.0),
        ScrollToOptions::new().with_duration_ms(300.0),
    );
    let completed = Rc::new(Cell::new(0));
    let count = Rc::clone(&completed);
    animation.on_complete(move || count.set(count.get() + 1));

    let frames = h.frames.pump(&h.clock, 16.0, 100);
    assert!(frames < 100);
    assert_eq!(h.frames.pending(), 0);

    assert_eq!(animation.status(), AnimationStatus::Completed);
    assert_eq!(completed.get(), 1);
    assert_eq!(h.v.visible_rect(), viewport(1000.0));
    assert!(!h.v.is_animating());
    assert_eq!(
        *scrolling.borrow(),
        vec![
            VirtualizerEvent::ScrollingChanged(true),
            VirtualizerEvent::ScrollingChanged(false),
        ]
    );

    let ys: Vec<f64> = rects
        .borrow()
        .iter()
        .filter_map(|e| match e {
            VirtualizerEvent::VisibleRectChanged(r) => Some(r.y),
            _ => None,
        })
        .collect();
    assert!(ys.windows(2).all(|w| w[0] <= w[1]), "{ys:?}");
    assert_eq!(ys.last(), Some(&1000.0));
    assert!(h.view_indexes().contains(&20));
}

#[test]
fn new_scroll_to_replaces_the_running_one() {
    let h = measured();
    let scrolling = h.record(EventKind::ScrollingChanged);

    let first = h.v.scroll_to(Point::new(0.0, 2000.0), ScrollToOptions::new());
    let now = h.clock.advance(16.0);
    h.frames.run_frame(now);

    let second = h.v.scroll_to(Point::new(0.0, 300.0), ScrollToOptions::new());
    assert_eq!(first.status(), AnimationStatus::Cancelled);
    assert_eq!(second.status(), AnimationStatus::Running);
    assert!(h.v.is_scrolling());

    h.frames.pump(&h.clock, 16.0, 100);
    assert_eq!(second.status(), AnimationStatus::Completed);
    assert_eq!(h.v.visible_rect(), viewport(300.0));
    assert_eq!(
        *scrolling.borrow(),
        vec![
            VirtualizerEvent::ScrollingChanged(true),
            VirtualizerEvent::ScrollingChanged(false),
        ]
    );
}

#[test]
fn reloads_requested_during_animation_are_deferred() {
    let h = measured();
    let animation = h.v.scroll_to(Point::new(0.0, 600.0), ScrollToOptions::new());

    h.v.invalidate_layouts();
    h.v.set_visible_rect(viewport(50.0), false);
    // Only the animation frame is queued.
    assert_eq!(h.frames.pending(), 1);
    assert!(!h.v.has_pending_reload());

    h.frames.pump(&h.clock, 16.0, 100);
    assert_eq!(animation.status(), AnimationStatus::Completed);
    assert!(!h.v.has_pending_reload());
    assert_eq!(h.frames.pending(), 0);
}

#[test]
fn repeated_viewport_is_a_no_op() {
    let h = measured();
    let all: Vec<_> = [
        EventKind::VisibleRectChanged,
        EventKind::ContentSizeChanged,
        EventKind::VisibleViewsChanged,
        EventKind::ScrollingChanged,
    ]
    .into_iter()
    .map(|k| h.record(k))
    .collect();

    h.v.set_visible_rect(viewport(0.0), false);
    h.v.set_visible_rect(viewport(0.0), true);
    h.v.set_is_scrolling(false);
    h.v.set_layouts(h.layouts.clone());

    assert_eq!(h.frames.pending(), 0);
    assert!(all.iter().all(|log| log.borrow().is_empty()));
}

#[test]
fn anchor_keeps_the_viewport_stable_when_content_above_grows() {
    let h = measured();
    h.v.set_visible_rect(viewport(500.0), false);
    h.frame();

    let item5 = h.layouts.borrow().item(&5).map(|l| l.rect);
    assert_eq!(item5.map(|r| r.max_y() - 500.0), Some(10.0));

    let rects = h.record(EventKind::VisibleRectChanged);
    h.v.update_item_size(&3, Size::new(120.0, 165.0));
    h.frame();

    let item5 = h.layouts.borrow().item(&5).map(|l| l.rect);
    assert_eq!(item5.map(|r| r.y), Some(500.0));
    assert_eq!(h.v.visible_rect(), viewport(600.0));
    assert_eq!(item5.map(|r| r.max_y() - 600.0), Some(10.0));
    assert_eq!(
        *rects.borrow(),
        vec![VirtualizerEvent::VisibleRectChanged(viewport(600.0))]
    );
    assert_eq!(h.view_indexes().first(), Some(&5));
}

#[test]
fn anchoring_disabled_keeps_the_raw_offset() {
    let h = Harness::new(VirtualizerOptions::new().with_anchor_scroll_position(false));
    h.load();
    h.measure_first_window();
    h.v.set_visible_rect(viewport(500.0), false);
    h.frame();

    h.v.update_item_size(&3, Size::new(120.0, 165.0));
    h.frame();
    assert_eq!(h.v.visible_rect(), viewport(500.0));
}

#[test]
fn new_data_returns_to_the_origin() {
    let h = measured();
    h.v.set_visible_rect(viewport(500.0), false);
    h.frame();

    h.v.set_data((1000..1050).collect());
    h.frame();

    assert_eq!(h.v.visible_rect(), viewport(0.0));
    assert_eq!(h.v.content_size(), Size::new(120.0, 50.0 * 48.0));
    let views = h.v.visible_views();
    assert_eq!(views.first().map(|v| v.data), Some(1000));
    assert_eq!(views.len(), 11);
}

#[test]
fn new_data_during_animation_returns_to_the_origin_when_it_settles() {
    let h = measured();
    h.v.scroll_to(Point::new(0.0, 2000.0), ScrollToOptions::new());
    let now = h.clock.advance(16.0);
    h.frames.run_frame(now);
    assert!(h.v.visible_rect().y > 0.0);

    h.v.set_data((1000..1050).collect());
    h.frames.pump(&h.clock, 16.0, 100);

    assert!(!h.v.is_animating());
    assert_eq!(h.frames.pending(), 0);
    assert_eq!(h.v.visible_rect(), viewport(0.0));
    assert_eq!(h.v.content_size(), Size::new(120.0, 50.0 * 48.0));
    assert_eq!(h.v.visible_views().first().map(|v| v.data), Some(1000));
}

#[test]
fn swapping_back_to_an_older_strategy_relayouts_the_current_data() {
    let h = loaded();
    let other = Rc::new(RefCell::new(ListLayouts::<u32>::default()));

    h.v.set_layouts(other.clone());
    h.v.set_data((0..10).collect());
    h.frame();
    assert_eq!(other.borrow().content_size(), Size::new(120.0, 480.0));

    h.v.set_layouts(h.layouts.clone());
    h.frame();

    assert_eq!(h.reloads(), 2);
    assert_eq!(h.v.content_size(), Size::new(120.0, 480.0));
    assert_eq!(h.view_indexes(), (0..10).collect::<Vec<_>>());
    assert!(h.layouts.borrow().item(&50).is_none());
}

#[test]
fn reload_depth_limit_keeps_the_offset_but_refreshes_views() {
    let h = Harness::new(VirtualizerOptions::new().with_max_reload_depth(0));
    h.load();
    h.measure_first_window();
    h.v.set_visible_rect(viewport(500.0), false);
    h.frame();

    let rects = h.record(EventKind::VisibleRectChanged);
    let views = h.record(EventKind::VisibleViewsChanged);
    h.v.update_item_size(&3, Size::new(120.0, 165.0));
    h.frame();

    // Anchoring would move to 600; the limit leaves the offset alone.
    assert_eq!(h.v.visible_rect(), viewport(500.0));
    assert!(rects.borrow().is_empty());
    assert_eq!(views.borrow().len(), 1);
    let item5 = h.v.visible_views().into_iter().find(|v| v.index == 5);
    assert_eq!(item5.map(|v| v.layout.rect.y), Some(500.0));
}

/// Collapses item 0, then grows it back to 100 while the viewport sits at the origin.
fn grow_first_item_at_origin(mode: AnchorMode) -> f64 {
    let h = Harness::new(VirtualizerOptions::new().with_anchor_scroll_position(mode));
    h.load();
    h.v.update_item_size(&0, Size::new(120.0, 0.0));
    h.frame();
    assert_eq!(h.v.visible_rect(), viewport(0.0));

    h.v.update_item_size(&0, Size::new(120.0, 100.0));
    h.frame();
    h.v.visible_rect().y
}

#[test]
fn top_anchoring_follows_content_inserted_above_the_origin() {
    assert_eq!(grow_first_item_at_origin(AnchorMode::Top), 100.0);
    assert_eq!(grow_first_item_at_origin(AnchorMode::Enabled), 0.0);
}

#[test]
fn scroll_to_item_brings_the_item_into_view() {
    let h = loaded();

    // Below the viewport: align its trailing edge.
    let animation = h.v.scroll_to_item(
        &20,
        ScrollToItemOptions::new().with_scroll(ScrollToOptions::immediate()),
    );
    assert!(animation.is_some_and(|a| a.is_settled()));
    assert_eq!(h.v.visible_rect(), viewport(20.0 * 48.0 + 48.0 - 500.0));

    // Above it: align its leading edge, minus the offset.
    h.v.scroll_to_item(
        &2,
        ScrollToItemOptions::new()
            .with_scroll(ScrollToOptions::immediate())
            .with_offset(0.0, 10.0),
    );
    assert_eq!(h.v.visible_rect(), viewport(2.0 * 48.0 - 10.0));

    // Already inside: stays put.
    h.v.scroll_to_item(
        &4,
        ScrollToItemOptions::new().with_scroll(ScrollToOptions::immediate()),
    );
    assert_eq!(h.v.visible_rect(), viewport(86.0));

    assert!(h.v.scroll_to_item(&5000, ScrollToItemOptions::new()).is_none());
}

#[test]
fn listeners_may_call_back_into_the_virtualizer() {
    let h = Harness::new(VirtualizerOptions::new());
    let seen = Rc::new(Cell::new(0));
    let moved = Rc::new(Cell::new(false));
    {
        let inner = h.v.clone();
        let seen = Rc::clone(&seen);
        let moved = Rc::clone(&moved);
        h.v.on(EventKind::VisibleViewsChanged, move |_| {
            seen.set(inner.visible_views().len());
            if !moved.replace(true) {
                inner.set_visible_rect(viewport(500.0), false);
            }
        });
    }

    h.load();
    assert_eq!(seen.get(), 11);
    assert_eq!(h.frames.pending(), 1);

    h.frame();
    assert_eq!(h.v.visible_rect(), viewport(500.0));
    assert_eq!(h.view_indexes(), (10..=20).collect::<Vec<_>>());
    assert_eq!(seen.get(), 11);
}

#[test]
fn listeners_run_in_registration_order_and_can_unsubscribe() {
    let h = Harness::new(VirtualizerOptions::new());
    let order = Rc::new(RefCell::new(Vec::new()));
    let first = {
        let order = Rc::clone(&order);
        h.v.on(EventKind::ContentSizeChanged, move |_| order.borrow_mut().push(1))
    };
    {
        let order = Rc::clone(&order);
        h.v.on(EventKind::ContentSizeChanged, move |_| order.borrow_mut().push(2));
    }
    h.load();
    assert_eq!(*order.borrow(), vec![1, 2]);

    assert!(h.v.off(first));
    assert!(!h.v.off(first));
    h.v.set_data((0..10).collect());
    h.frame();
    assert_eq!(*order.borrow(), vec![1, 2, 2]);
}

#[test]
fn destroy_stops_all_work() {
    let h = measured();
    let views = h.record(EventKind::VisibleViewsChanged);
    let animation = h.v.scroll_to(Point::new(0.0, 1000.0), ScrollToOptions::new());
    h.v.update_item_size(&0, Size::new(120.0, 10.0));

    h.v.destroy();
    assert!(h.v.is_destroyed());
    assert_eq!(animation.status(), AnimationStatus::Cancelled);
    assert_eq!(h.frames.pending(), 0);

    h.v.set_data((0..5).collect());
    h.v.set_visible_rect(viewport(300.0), false);
    h.v.invalidate_layouts();
    assert_eq!(h.frames.pending(), 0);
    assert!(h
        .v
        .scroll_to(Point::new(0.0, 10.0), ScrollToOptions::new())
        .is_settled());
    assert_eq!(h.frames.pump(&h.clock, 16.0, 10), 0);
    assert!(views.borrow().is_empty());
}

#[test]
fn views_are_recycled_while_scrolling() {
    let h = loaded();
    let mut max_key = 0;
    let mut y = 0.0;
    while y <= 4300.0 {
        h.v.set_visible_rect(viewport(y), true);
        for view in h.v.visible_views() {
            max_key = max_key.max(view.key.0);
        }
        y += 200.0;
    }
    h.v.set_visible_rect(viewport(4300.0), true);
    assert!(h.view_indexes().contains(&99));
    // Never more records than the largest simultaneous window.
    assert!(max_key <= 12, "max_key={max_key}");
}

#[test]
fn retained_views_keep_their_keys() {
    let h = loaded();
    let before = h.v.visible_views();
    h.v.set_visible_rect(viewport(96.0), true);
    let after = h.v.visible_views();

    for view in &after {
        if let Some(old) = before.iter().find(|b| b.index == view.index) {
            assert_eq!(old.key, view.key);
        }
    }
    assert_eq!(after.first().map(|v| v.index), Some(2));
}

#[test]
fn frame_state_round_trips() {
    let h = measured();
    h.v.set_visible_rect(viewport(500.0), false);
    h.frame();
    let state = h.v.frame_state();
    assert_eq!(state.visible_rect, viewport(500.0));
    assert!(!state.is_scrolling);

    h.v.set_visible_rect(viewport(0.0), false);
    h.frame();
    h.v.restore_frame_state(state);
    h.frame();
    assert_eq!(h.v.frame_state(), state);
}

#[test]
fn options_can_be_updated_in_place() {
    let h = loaded();
    h.v.update_options(|o| {
        o.scroll_duration_ms = 0.0;
        o.overscan_throttle_ms = 100.0;
    });
    h.v.set_anchor_scroll_position(AnchorMode::Top);
    let options = h.v.options();
    assert_eq!(options.scroll_duration_ms, 0.0);
    assert_eq!(options.overscan_throttle_ms, 100.0);
    assert_eq!(options.anchor_scroll_position, AnchorMode::Top);

    // A zero default duration makes plain `scroll_to` immediate.
    let animation = h.v.scroll_to(Point::new(0.0, 200.0), ScrollToOptions::new());
    assert!(animation.is_settled());
    assert_eq!(h.v.visible_rect(), viewport(200.0));
}

#[test]
fn overscan_grows_the_window_after_collect() {
    let h = loaded();
    let now = h.clock.advance(16.0);
    h.v.set_visible_rect(viewport(100.0), true);
    let plain = h.view_indexes().len();

    h.clock.set(now + 16.0);
    h.v.collect();
    h.clock.advance(16.0);
    h.v.set_visible_rect(viewport(200.0), true);
    let overscanned = h.view_indexes();

    assert!(overscanned.len() > plain, "{overscanned:?}");
    // Travelling forward: most of the margin is ahead.
    assert!(overscanned.last().is_some_and(|&i| i > 14));
}

#[test]
fn animation_future_resolves_when_done() {
    let h = measured();
    let mut animation = h.v.scroll_to(Point::new(0.0, 400.0), ScrollToOptions::new());
    let mut cx = Context::from_waker(Waker::noop());

    assert_eq!(Pin::new(&mut animation).poll(&mut cx), Poll::Pending);
    h.frames.pump(&h.clock, 16.0, 100);
    assert_eq!(
        Pin::new(&mut animation).poll(&mut cx),
        Poll::Ready(AnimationStatus::Completed)
    );
}

#[test]
fn driver_ignores_frame_times_from_another_clock() {
    let clock = ManualClock::new(0.0);
    let frames = ManualFrames::new();
    let driver = AnimationDriver::new(Rc::new(clock.clone()), Rc::new(frames.clone()));

    let points = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&points);
    let animation = driver.run(
        Point::ZERO,
        Point::new(0.0, 100.0),
        100.0,
        Easing::Linear,
        move |p| sink.borrow_mut().push(p),
    );

    // Epoch-style timestamps against a clock that starts at zero.
    clock.set(50.0);
    frames.run_frame(1.7e12);
    assert_eq!(*points.borrow(), vec![Point::new(0.0, 50.0)]);

    clock.set(100.0);
    frames.run_frame(1.7e12 + 50.0);
    assert_eq!(points.borrow().last(), Some(&Point::new(0.0, 100.0)));
    assert_eq!(animation.status(), AnimationStatus::Completed);
}

#[test]
fn driver_with_zero_duration_jumps_to_the_end() {
    let clock = ManualClock::new(0.0);
    let frames = ManualFrames::new();
    let driver = AnimationDriver::new(Rc::new(clock.clone()), Rc::new(frames.clone()));

    let last = Rc::new(Cell::new(Point::ZERO));
    let sink = Rc::clone(&last);
    let animation = driver.run(
        Point::ZERO,
        Point::new(3.0, 4.0),
        0.0,
        Easing::EaseOut,
        move |p| sink.set(p),
    );
    assert_eq!(last.get(), Point::new(3.0, 4.0));
    assert_eq!(animation.status(), AnimationStatus::Completed);
    assert_eq!(frames.pending(), 0);

    let settled = Rc::new(Cell::new(None));
    let flag = Rc::clone(&settled);
    animation.on_settle(move |s| flag.set(Some(s)));
    assert_eq!(settled.get(), Some(AnimationStatus::Completed));
}

#[test]
fn manual_frames_defer_callbacks_registered_mid_frame() {
    let frames = ManualFrames::new();
    let ran = Rc::new(RefCell::new(Vec::new()));
    {
        let ran = Rc::clone(&ran);
        let inner = frames.clone();
        frames.register(Box::new(move |t| {
            ran.borrow_mut().push(t);
            let ran = Rc::clone(&ran);
            inner.register(Box::new(move |t| ran.borrow_mut().push(t)));
        }));
    }
    assert_eq!(frames.run_frame(1.0), 1);
    assert_eq!(frames.pending(), 1);
    assert_eq!(frames.run_frame(2.0), 1);
    assert_eq!(*ran.borrow(), vec![1.0, 2.0]);

    let handle = frames.register(Box::new(|_| panic!("cancelled frame ran")));
    frames.cancel(handle);
    frames.cancel(handle);
    assert_eq!(frames.run_frame(3.0), 0);
}

#[test]
fn easings_hit_both_endpoints() {
    for easing in [
        Easing::Linear,
        Easing::EaseOut,
        Easing::SmoothStep,
        Easing::EaseInOutCubic,
        Easing::Custom(|t| t * t),
    ] {
        assert!(easing.sample(0.0).abs() < 1e-12, "{easing:?}");
        assert!((easing.sample(1.0) - 1.0).abs() < 1e-12, "{easing:?}");
        assert!((easing.sample(2.0) - 1.0).abs() < 1e-12, "{easing:?}");
    }
    assert!(Easing::EaseOut.sample(0.5) > 0.5);
    assert_eq!(Easing::default(), Easing::EaseOut);
    assert_ne!(Easing::Linear, Easing::SmoothStep);
}

#[test]
fn tween_samples_between_endpoints() {
    let tween = Tween::new(
        Point::ZERO,
        Point::new(100.0, 200.0),
        1000.0,
        100.0,
        Easing::Linear,
    );
    assert_eq!(tween.sample(900.0), Point::ZERO);
    assert_eq!(tween.sample(1050.0), Point::new(50.0, 100.0));
    assert!(!tween.is_done(1099.0));
    assert!(tween.is_done(1100.0));
    assert_eq!(tween.sample(5000.0), Point::new(100.0, 200.0));
}
