// Example: the overscan margin follows scroll velocity.
use windowed_list::{OverscanEstimator, Rect};

fn main() {
    let mut overscan = OverscanEstimator::default();
    let mut now = 0.0;

    // Scroll down 30 units per 16ms frame.
    for frame in 0..10 {
        now += 16.0;
        overscan.set_visible_rect(Rect::new(0.0, frame as f64 * 30.0, 320.0, 600.0), now);
        overscan.collect(now);
    }
    println!("velocity={:?}", overscan.velocity());
    println!("visible={:?}", overscan.visible_rect());
    println!("overscanned={:?}", overscan.rect());
}
