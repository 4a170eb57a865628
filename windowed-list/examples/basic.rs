// Example: lay out a list, measure the first window, scroll.
use windowed_list::{Layouts, ListLayouts, Rect, ReloadContext, Size};

fn main() {
    let data: Vec<u32> = (0..10_000).collect();
    let mut list = ListLayouts::<u32>::default();

    let viewport = Rect::new(0.0, 0.0, 320.0, 600.0);
    list.reload(&data, viewport, ReloadContext::data_changed());
    println!("content_size={:?}", list.content_size());

    // Pretend the presentation layer measured what it rendered.
    for item in list.visible_items(viewport) {
        let height = 40.0 + (item.index % 4) as f64 * 15.0;
        list.update_item_size(&data[item.index], Size::new(320.0, height));
    }
    list.reload(&data, viewport, ReloadContext::default());

    let visible = list.visible_items(viewport);
    println!(
        "visible={}..={} content_size={:?}",
        visible.first().map_or(0, |it| it.index),
        visible.last().map_or(0, |it| it.index),
        list.content_size()
    );

    let scrolled = Rect::new(0.0, 250_000.0, 320.0, 600.0);
    list.reload(
        &data,
        scrolled,
        ReloadContext {
            offset_changed: true,
            ..ReloadContext::default()
        },
    );
    let first = list.visible_items(scrolled).first().copied();
    println!("after scroll: first_visible={first:?}");
}
