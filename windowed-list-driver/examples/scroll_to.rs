// Example: a headless host driving frames by hand.
use std::cell::RefCell;
use std::rc::Rc;

use windowed_list::{ListLayouts, Point, Rect};
use windowed_list_driver::{
    EventKind, ManualClock, ManualFrames, ScrollToOptions, Virtualizer, VirtualizerEvent,
    VirtualizerOptions,
};

fn main() {
    let clock = ManualClock::new(0.0);
    let frames = ManualFrames::new();
    let v = Virtualizer::new(
        VirtualizerOptions::new(),
        Rc::new(clock.clone()),
        Rc::new(frames.clone()),
    );

    v.on(EventKind::VisibleViewsChanged, |e| {
        if let VirtualizerEvent::VisibleViewsChanged(views) = e {
            println!(
                "views: {}..={}",
                views.first().map_or(0, |v| v.index),
                views.last().map_or(0, |v| v.index)
            );
        }
    });
    v.on(EventKind::ScrollingChanged, |e| println!("{e:?}"));

    v.set_layouts(Rc::new(RefCell::new(ListLayouts::<u32>::default())));
    v.set_visible_rect(Rect::new(0.0, 0.0, 320.0, 600.0), false);
    v.set_data((0..1_000).collect());
    frames.run_frame(clock.now());

    let animation = v.scroll_to(Point::new(0.0, 5_000.0), ScrollToOptions::new());
    let ran = frames.pump(&clock, 16.0, 1_000);
    println!(
        "status={:?} after {ran} frames, visible_rect={:?}",
        animation.status(),
        v.visible_rect()
    );
}
