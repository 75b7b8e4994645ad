// Example: pool sizing and the spacer heights after the collection shrinks.
use core::num::NonZeroU32;

use view_window::BufferSizer;

fn main() {
    let sizer = BufferSizer::default();
    let item_height = NonZeroU32::new(20).expect("non-zero");

    for viewport in [0u32, 100, 500, 1080] {
        println!("viewport={viewport} sizing={:?}", sizer.sizing(item_height, viewport));
    }

    let scrolled = sizer.recompute_on_items_changed(1_000, item_height, 500, 943, 18_860);
    println!("1000 items, scrolled to the end: {scrolled:?}");

    let shrunk = sizer.recompute_on_items_changed(
        500,
        item_height,
        500,
        scrolled.first_index,
        scrolled.top_buffer_height,
    );
    println!("shrunk to 500 items: {shrunk:?}");
}
