// Example: a window over a plain Vec, driven by hand.
use view_window::{LayoutProbe, ViewPool, WindowOptions, WindowingEngine};

struct Rows {
    created: usize,
}

impl ViewPool<String> for Rows {
    type View = (Option<usize>, String);

    fn create(&mut self) -> Self::View {
        self.created += 1;
        (None, String::new())
    }

    fn bind(&mut self, view: &mut Self::View, index: usize, item: &String) {
        *view = (Some(index), item.clone());
    }

    fn bound_index(&self, view: &Self::View) -> Option<usize> {
        view.0
    }

    fn dispose(&mut self, _view: Self::View) {}
}

#[derive(Default)]
struct Viewport {
    scroll: u64,
    spacers: (u64, u64),
}

impl LayoutProbe for Viewport {
    type View = (Option<usize>, String);

    fn viewport_height(&self) -> u32 {
        480
    }

    fn element_height(&self, _view: &Self::View) -> u32 {
        24
    }

    fn scroll_offset(&self) -> u64 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll = offset;
    }

    fn distance_to_top(&self) -> u64 {
        0
    }

    fn set_buffer_heights(&mut self, top: u64, bottom: u64) {
        self.spacers = (top, bottom);
    }

    fn listen(&mut self) {}

    fn unlisten(&mut self) {}
}

fn main() {
    let items: Vec<String> = (0..100_000).map(|i| format!("row #{i}")).collect();
    let mut engine: WindowingEngine<Vec<String>, Rows, Viewport> =
        WindowingEngine::new(WindowOptions::new(), Rows { created: 0 }, Viewport::default());
    engine.attach(&items, &()).expect("default options are valid");

    println!("sizing={:?}", engine.sizing());
    println!("window={:?}", engine.window());
    println!("views created={}", engine.pool().created);

    for offset in [2_400u64, 2_430, 1_200, 1_000_000, 0] {
        engine.layout_mut().scroll = offset;
        if engine.on_scroll_event() {
            engine.on_animation_frame(&items);
        }
        let first = engine.views().next().map(|view| view.1.as_str());
        println!(
            "offset={offset} window={:?} spacers={:?} first_view={first:?}",
            engine.window(),
            engine.layout().spacers,
        );
    }
    println!("views created={}", engine.pool().created);
}
