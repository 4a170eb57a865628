// Example: measured rows above the viewport grow; anchoring keeps the visible rows in place.
use std::cell::RefCell;
use std::rc::Rc;

use windowed_list::{Layouts, ListLayouts, Rect, Size};
use windowed_list_driver::{ManualClock, ManualFrames, Virtualizer, VirtualizerOptions};

fn main() {
    let clock = ManualClock::new(0.0);
    let frames = ManualFrames::new();
    let v = Virtualizer::new(
        VirtualizerOptions::new(),
        Rc::new(clock.clone()),
        Rc::new(frames.clone()),
    );
    let layouts = Rc::new(RefCell::new(ListLayouts::<u32>::default()));

    v.set_layouts(layouts.clone());
    v.set_visible_rect(Rect::new(0.0, 0.0, 320.0, 400.0), false);
    v.set_data((0..200).collect());
    frames.run_frame(clock.now());

    v.set_visible_rect(Rect::new(0.0, 1_000.0, 320.0, 400.0), false);
    frames.run_frame(clock.now());
    let first = v.visible_views().first().map(|view| view.data);
    let before = first.and_then(|item| layouts.borrow().item(&item));
    println!("before: offset={} first={first:?} layout={before:?}", v.visible_rect().y);

    // Rows 0..5 turn out to be twice as tall as estimated.
    for item in 0..5u32 {
        v.update_item_size(&item, Size::new(320.0, 96.0));
    }
    frames.run_frame(clock.now());

    let after = first.and_then(|item| layouts.borrow().item(&item));
    println!("after: offset={} layout={after:?}", v.visible_rect().y);
}
