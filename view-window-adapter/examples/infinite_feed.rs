// Example: an infinite feed that appends a page whenever the window reaches the bottom.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use view_window::{LoadMoreReply, LoadMoreRequest, WindowOptions};
use view_window_adapter::{HostLoop, SimLayout};

const PAGE: u32 = 200;

fn main() {
    let wants_page = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&wants_page);
    let options = WindowOptions::new().with_load_more(Some(move |request: LoadMoreRequest| {
        println!("  load-more requested: {request:?}");
        flag.store(true, Ordering::Release);
        LoadMoreReply::Done
    }));

    let mut host: HostLoop<u32> =
        HostLoop::new(options, (0..PAGE).collect::<Vec<_>>(), SimLayout::new(600, 30));
    host.attach(&()).expect("valid options");

    let mut now_ms = 0;
    for step in 0..40 {
        host.scroll_by(900);
        now_ms += 16;
        let report = host.tick(now_ms);

        if wants_page.swap(false, Ordering::AcqRel) {
            let start = host.items().as_slice().len() as u32;
            host.extend(start..start + PAGE);
        }
        println!(
            "step={step} offset={} window={:?} frame={} items={}",
            host.scroll_offset(),
            host.engine().window(),
            report.frame,
            host.items().as_slice().len(),
        );
    }
    println!("pool={:?}", host.engine().pool().stats());
}
