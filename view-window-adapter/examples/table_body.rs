// Example: a table body below a header, shrunk while scrolled to the end.
use view_window::WindowOptions;
use view_window_adapter::{HostLoop, SimLayout, TableBodyContainer};

fn main() {
    let layout = SimLayout::new(400, 20)
        .with_distance_to_top(64)
        .with_header_height(32);
    let rows: Vec<u32> = (0..5_000).collect();
    let mut host: HostLoop<u32> = HostLoop::new(WindowOptions::new(), rows, layout)
        .with_scroll_container(TableBodyContainer);
    host.attach(&()).expect("valid options");

    host.scroll_to_index(2_500);
    host.tick(16);
    println!("at row 2500: offset={} window={:?}", host.scroll_offset(), host.engine().window());

    host.scroll_to(u64::MAX);
    host.tick(32);
    println!("at the end: offset={} window={:?}", host.scroll_offset(), host.engine().window());

    host.truncate(1_000);
    host.tick(48);
    println!("after truncate: offset={} window={:?}", host.scroll_offset(), host.engine().window());
    println!("snapshot={:?}", host.engine().snapshot());
}
