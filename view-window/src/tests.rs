use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::num::NonZeroU32;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct TestView {
    id: usize,
    index: Option<usize>,
    label: u32,
}

#[derive(Debug, Default)]
struct TestPool {
    created: usize,
    disposed: usize,
    binds: usize,
}

impl ViewPool<u32> for TestPool {
    type View = TestView;

    fn create(&mut self) -> TestView {
        self.created += 1;
        TestView {
            id: self.created,
            index: None,
            label: 0,
        }
    }

    fn bind(&mut self, view: &mut TestView, index: usize, item: &u32) {
        self.binds += 1;
        view.index = Some(index);
        view.label = *item;
    }

    fn bound_index(&self, view: &TestView) -> Option<usize> {
        view.index
    }

    fn dispose(&mut self, _view: TestView) {
        self.disposed += 1;
    }
}

#[derive(Debug)]
struct TestLayout {
    viewport: u32,
    item_height: u32,
    laid_out: bool,
    scroll: u64,
    distance_to_top: u64,
    buffers: (u64, u64),
    listening: bool,
    scroll_writes: Vec<u64>,
}

impl TestLayout {
    fn new(viewport: u32, item_height: u32) -> Self {
        Self {
            viewport,
            item_height,
            laid_out: true,
            scroll: 0,
            distance_to_top: 0,
            buffers: (0, 0),
            listening: false,
            scroll_writes: Vec::new(),
        }
    }
}

impl LayoutProbe for TestLayout {
    type View = TestView;

    fn viewport_height(&self) -> u32 {
        self.viewport
    }

    fn element_height(&self, _view: &TestView) -> u32 {
        if self.laid_out { self.item_height } else { 0 }
    }

    fn scroll_offset(&self) -> u64 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll = offset;
        self.scroll_writes.push(offset);
    }

    fn distance_to_top(&self) -> u64 {
        self.distance_to_top
    }

    fn set_buffer_heights(&mut self, top: u64, bottom: u64) {
        self.buffers = (top, bottom);
    }

    fn listen(&mut self) {
        self.listening = true;
    }

    fn unlisten(&mut self) {
        self.listening = false;
    }
}

type Engine = WindowingEngine<Vec<u32>, TestPool, TestLayout>;

fn items(len: usize) -> Vec<u32> {
    (0..len as u32).collect()
}

fn engine_with(options: WindowOptions, layout: TestLayout, items: &Vec<u32>) -> Engine {
    let mut engine = Engine::new(options, TestPool::default(), layout);
    engine.attach(items, &()).unwrap();
    engine
}

fn attached(len: usize) -> (Engine, Vec<u32>) {
    let items = items(len);
    let engine = engine_with(WindowOptions::new(), TestLayout::new(500, 20), &items);
    (engine, items)
}

fn scroll_to(engine: &mut Engine, items: &Vec<u32>, offset: u64) {
    engine.layout_mut().scroll = offset;
    if engine.on_scroll_event() {
        engine.on_animation_frame(items);
    }
}

fn bound(engine: &Engine) -> Vec<usize> {
    engine.views().filter_map(|view| view.index).collect()
}

fn recording_callback() -> (
    impl Fn(LoadMoreRequest) -> LoadMoreReply + Send + Sync + 'static,
    Arc<Mutex<Vec<LoadMoreRequest>>>,
) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&requests);
    let callback = move |request: LoadMoreRequest| {
        sink.lock().unwrap().push(request);
        LoadMoreReply::Done
    };
    (callback, requests)
}

fn assert_window_invariants(engine: &Engine, items: &[u32]) {
    let n = items.len();
    let window = engine.window();
    if n == 0 {
        assert_eq!(engine.views().count(), 0);
        assert_eq!(window, Window::default());
        return;
    }
    let Some(h) = engine.item_height().get() else {
        return;
    };
    let h = h as u64;
    let sizing = engine.sizing();

    assert_eq!(window.view_count, sizing.views_length.min(n));
    assert!(window.first_index <= n - window.view_count);
    assert_eq!(window.top_buffer_height, window.first_index as u64 * h);
    assert_eq!(
        window.top_buffer_height + window.bottom_buffer_height + window.view_count as u64 * h,
        n as u64 * h
    );
    let expected: Vec<usize> = (window.first_index..window.end_index()).collect();
    assert_eq!(bound(engine), expected);
    for view in engine.views() {
        let index = view.index.unwrap();
        assert_eq!(view.label, items[index]);
    }
    assert_eq!(
        engine.layout().buffers,
        (window.top_buffer_height, window.bottom_buffer_height)
    );
}

#[test]
fn sizing_counts_partial_rows_and_buffer() {
    let sizer = BufferSizer::new(5);
    let h = NonZeroU32::new(20).unwrap();
    assert_eq!(
        sizer.sizing(h, 500),
        Sizing {
            elements_in_view: 26,
            views_length: 57
        }
    );
    assert_eq!(sizer.sizing(h, 510).elements_in_view, 27);
    assert_eq!(sizer.sizing(h, 0).views_length, 7);
}

#[test]
fn recompute_from_top_of_large_list() {
    let sizer = BufferSizer::default();
    let h = NonZeroU32::new(20).unwrap();
    let window = sizer.recompute_on_items_changed(1000, h, 500, 0, 0);
    assert_eq!(
        window,
        Window {
            first_index: 0,
            view_count: 57,
            top_buffer_height: 0,
            bottom_buffer_height: 18860,
        }
    );
}

#[test]
fn recompute_small_list_has_no_spacers() {
    let sizer = BufferSizer::default();
    let h = NonZeroU32::new(20).unwrap();
    let window = sizer.recompute_on_items_changed(10, h, 500, 0, 0);
    assert_eq!(
        window,
        Window {
            first_index: 0,
            view_count: 10,
            top_buffer_height: 0,
            bottom_buffer_height: 0,
        }
    );
}

#[test]
fn recompute_pins_to_end_when_scrolled_past_new_length() {
    let sizer = BufferSizer::default();
    let h = NonZeroU32::new(20).unwrap();
    let window = sizer.recompute_on_items_changed(500, h, 500, 943, 18860);
    assert_eq!(window.first_index, 443);
    assert_eq!(window.top_buffer_height, 8860);
    assert_eq!(window.bottom_buffer_height, 0);
}

proptest! {
    #[test]
    fn recompute_is_idempotent_and_balanced(
        n in 0usize..5000,
        h in 1u32..200,
        viewport in 0u32..4000,
        first in 0usize..6000,
        top in 0u64..1_000_000,
        buffer in 0usize..20,
    ) {
        let sizer = BufferSizer::new(buffer);
        let h = NonZeroU32::new(h).unwrap();
        let window = sizer.recompute_on_items_changed(n, h, viewport, first, top);
        let again = sizer.recompute_on_items_changed(
            n,
            h,
            viewport,
            window.first_index,
            window.top_buffer_height,
        );
        prop_assert_eq!(window, again);

        let hh = h.get() as u64;
        prop_assert_eq!(window.top_buffer_height, window.first_index as u64 * hh);
        prop_assert!(window.first_index <= n - window.view_count);
        prop_assert_eq!(
            window.top_buffer_height + window.bottom_buffer_height + window.view_count as u64 * hh,
            n as u64 * hh
        );
    }
}

#[test]
fn estimator_polls_until_layout_settles() {
    let mut estimator = SizeEstimator::new(500);
    assert_eq!(estimator.measure(0, 100), ItemHeight::Unknown);
    assert_eq!(estimator.next_poll_ms(), Some(600));

    assert!(!estimator.poll(20, 599));
    assert!(!estimator.poll(0, 600));
    assert_eq!(estimator.next_poll_ms(), Some(1100));

    // Missed intervals are skipped, not replayed.
    assert!(!estimator.poll(0, 2300));
    assert_eq!(estimator.next_poll_ms(), Some(2600));

    assert!(estimator.poll(20, 2600));
    assert_eq!(estimator.height().get(), Some(20));
    assert!(!estimator.is_polling());
    assert!(!estimator.poll(20, 5000));
}

#[test]
fn estimator_known_measurement_clears_poll() {
    let mut estimator = SizeEstimator::default();
    estimator.measure(0, 0);
    assert!(estimator.is_polling());
    assert!(estimator.measure(18, 10).is_known());
    assert!(!estimator.is_polling());

    // A later zero reading keeps the known height while polling.
    assert_eq!(estimator.measure(0, 20).get(), Some(18));
    assert_eq!(estimator.next_poll_ms(), Some(520));

    estimator.reset();
    assert_eq!(estimator.height(), ItemHeight::Unknown);
}

#[test]
fn direction_classification() {
    let window = Window {
        first_index: 10,
        view_count: 57,
        top_buffer_height: 200,
        bottom_buffer_height: 1000,
    };
    let mut scroll = ScrollState {
        direction: ScrollDirection::Down,
        previous_first_index: 10,
        ..ScrollState::default()
    };

    let c = ScrollDirectionTracker::classify(12, &scroll, &window);
    assert_eq!(c.direction, ScrollDirection::Down);
    assert!(!c.switched_direction);

    let c = ScrollDirectionTracker::classify(9, &scroll, &window);
    assert_eq!(c.direction, ScrollDirection::Up);
    assert!(c.switched_direction);
    ScrollDirectionTracker::record(&mut scroll, c);
    assert_eq!(scroll.direction, ScrollDirection::Up);

    // None keeps the last movement direction.
    let c = ScrollDirectionTracker::classify(10, &scroll, &window);
    assert_eq!(c.direction, ScrollDirection::None);
    assert!(!c.switched_direction);
    ScrollDirectionTracker::record(&mut scroll, c);
    assert_eq!(scroll.direction, ScrollDirection::Up);
    assert!(scroll.switched_direction);
}

#[test]
fn direction_ignores_overscroll_at_bottom() {
    let window = Window {
        first_index: 943,
        view_count: 57,
        top_buffer_height: 18860,
        bottom_buffer_height: 0,
    };
    let scroll = ScrollState {
        direction: ScrollDirection::Down,
        previous_first_index: 943,
        is_last_index: true,
        ..ScrollState::default()
    };
    let c = ScrollDirectionTracker::classify(950, &scroll, &window);
    assert_eq!(c.direction, ScrollDirection::None);
}

#[test]
fn recycler_moves_views_between_edges() {
    let items = items(20);
    let mut pool = TestPool::default();
    let mut recycler = ViewRecycler::new();
    recycler.rebind_all(&mut pool, &items, 0, 5);
    let ids: Vec<usize> = recycler.iter().map(|v| v.id).collect();

    let mut window = Window {
        view_count: 5,
        ..Window::default()
    };
    let moved = recycler.move_views(&mut pool, &items, &mut window, 2, ScrollDirection::Down);
    assert_eq!(moved, 2);
    assert_eq!(window.first_index, 2);
    let indices: Vec<usize> = recycler.iter().filter_map(|v| v.index).collect();
    assert_eq!(indices, alloc::vec![2, 3, 4, 5, 6]);
    // The two leading views were recycled to the trailing edge.
    let moved_ids: Vec<usize> = recycler.iter().map(|v| v.id).collect();
    assert_eq!(moved_ids, alloc::vec![ids[2], ids[3], ids[4], ids[0], ids[1]]);
    assert_eq!(pool.created, 5);

    let moved = recycler.move_views(&mut pool, &items, &mut window, 1, ScrollDirection::Up);
    assert_eq!(moved, 1);
    assert_eq!(recycler.first_bound_index(&pool), Some(1));
    assert_eq!(recycler.last_bound_index(&pool), Some(5));
}

#[test]
fn recycler_stops_at_collection_boundary() {
    let items = items(8);
    let mut pool = TestPool::default();
    let mut recycler = ViewRecycler::new();
    recycler.rebind_all(&mut pool, &items, 0, 5);
    let mut window = Window {
        view_count: 5,
        ..Window::default()
    };

    assert_eq!(
        recycler.move_views(&mut pool, &items, &mut window, 10, ScrollDirection::Up),
        0
    );
    assert_eq!(
        recycler.move_views(&mut pool, &items, &mut window, 10, ScrollDirection::Down),
        3
    );
    assert_eq!(recycler.last_bound_index(&pool), Some(7));
}

#[test]
fn recycler_rebinds_whole_pool_once_for_long_jumps() {
    let items = items(1000);
    let mut pool = TestPool::default();
    let mut recycler = ViewRecycler::new();
    recycler.rebind_all(&mut pool, &items, 0, 10);
    let binds_before = pool.binds;

    let mut window = Window {
        view_count: 10,
        ..Window::default()
    };
    let moved = recycler.move_views(&mut pool, &items, &mut window, 500, ScrollDirection::Down);
    assert_eq!(moved, 500);
    assert_eq!(window.first_index, 500);
    assert_eq!(pool.binds - binds_before, 10);
    let indices: Vec<usize> = recycler.iter().filter_map(|v| v.index).collect();
    assert_eq!(indices, (500..510).collect::<Vec<_>>());
}

#[test]
fn recycler_release_disposes_everything() {
    let items = items(10);
    let mut pool = TestPool::default();
    let mut recycler = ViewRecycler::new();
    recycler.rebind_all(&mut pool, &items, 0, 6);
    recycler.rebind_all(&mut pool, &items, 0, 4);
    assert_eq!(pool.disposed, 2);
    recycler.release(&mut pool);
    assert!(recycler.is_empty());
    assert_eq!(pool.disposed, pool.created);
}

#[test]
fn trigger_fires_only_at_edges_and_defers() {
    let (callback, requests) = recording_callback();
    let callback: LoadMoreFn = Arc::new(callback);
    let mut trigger = InfiniteScrollTrigger::new(Some(callback));
    let request = LoadMoreRequest {
        top_index: 3,
        is_at_bottom: false,
        is_at_top: false,
    };

    assert!(!trigger.maybe_trigger(false, false, false, request));
    assert!(trigger.maybe_trigger(false, true, false, request));
    assert!(trigger.is_pending());
    assert_eq!(trigger.invocations(), 0);
    assert!(requests.lock().unwrap().is_empty());

    // Dropped, not queued.
    assert!(!trigger.maybe_trigger(true, false, false, request));

    assert!(trigger.run_deferred());
    assert!(!trigger.run_deferred());
    assert_eq!(trigger.invocations(), 1);
    assert_eq!(requests.lock().unwrap().as_slice(), &[request]);
    assert!(!trigger.is_pending());

    assert!(trigger.maybe_trigger(false, false, true, request));
}

#[test]
fn trigger_waits_for_pending_completion() {
    let completions: Arc<Mutex<Vec<Completion>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completions);
    let callback: LoadMoreFn = Arc::new(move |_: LoadMoreRequest| {
        let completion = Completion::new();
        sink.lock().unwrap().push(completion.clone());
        LoadMoreReply::Pending(completion)
    });
    let mut trigger = InfiniteScrollTrigger::new(Some(callback));
    let request = LoadMoreRequest {
        top_index: 0,
        is_at_bottom: false,
        is_at_top: true,
    };

    assert!(trigger.maybe_trigger(true, false, false, request));
    assert!(trigger.run_deferred());
    assert!(trigger.is_pending());
    assert!(!trigger.maybe_trigger(true, false, false, request));

    completions.lock().unwrap()[0].settle();
    assert!(!trigger.is_pending());
    assert!(trigger.maybe_trigger(true, false, false, request));
    assert!(trigger.run_deferred());
    assert_eq!(trigger.invocations(), 2);
}

#[test]
fn trigger_settled_reply_frees_guard() {
    let callback: LoadMoreFn = Arc::new(|_: LoadMoreRequest| {
        let completion = Completion::new();
        completion.settle();
        LoadMoreReply::Pending(completion)
    });
    let mut trigger = InfiniteScrollTrigger::new(Some(callback));
    let request = LoadMoreRequest {
        top_index: 0,
        is_at_bottom: true,
        is_at_top: false,
    };
    assert!(trigger.maybe_trigger(false, true, false, request));
    assert!(trigger.run_deferred());
    assert!(!trigger.is_pending());
}

#[test]
fn trigger_without_callback_is_inert() {
    let mut trigger = InfiniteScrollTrigger::new(None);
    let request = LoadMoreRequest {
        top_index: 0,
        is_at_bottom: true,
        is_at_top: true,
    };
    assert!(!trigger.has_callback());
    assert!(!trigger.maybe_trigger(true, true, true, request));
    assert!(!trigger.run_deferred());
}

#[test]
fn change_handler_plans() {
    let mut handler = CollectionChangeHandler::new();
    let plan = handler.plan(&CollectionChange::Replaced { len: 10 });
    assert!(plan.resubscribe);
    assert_eq!(plan.reconcile, Reconcile::ScrollDown);

    let plan = handler.plan(&CollectionChange::Mutated {
        len: 12,
        splices: alloc::vec![Splice::insert(10, 2)],
    });
    assert!(!plan.resubscribe);
    assert_eq!(plan.reconcile, Reconcile::ScrollDown);
    assert_eq!((plan.previous_len, plan.len), (10, 12));

    let plan = handler.plan(&CollectionChange::Mutated {
        len: 12,
        splices: alloc::vec![Splice::remove(0, 1), Splice::insert(11, 1)],
    });
    assert_eq!(plan.reconcile, Reconcile::Rebind);

    let plan = handler.plan(&CollectionChange::Replaced { len: 3 });
    assert!(plan.resubscribe);
    assert_eq!(plan.reconcile, Reconcile::Rebind);
    assert_eq!(Splice::remove(0, 4).net(), -4);
}

#[test]
fn options_validation_and_resolution() {
    assert_eq!(
        WindowOptions::new().with_poll_interval_ms(0).validate(),
        Err(ConfigError::ZeroPollInterval)
    );

    let items = items(10);
    let mut engine = Engine::new(
        WindowOptions::new().with_load_more_method("loadMore"),
        TestPool::default(),
        TestLayout::new(500, 20),
    );
    assert_eq!(
        engine.attach(&items, &()),
        Err(ConfigError::UnresolvedMethod {
            name: "loadMore".into()
        })
    );
    assert!(!engine.is_attached());
    assert!(!engine.layout().listening);

    let mut engine = Engine::new(
        WindowOptions::new().with_load_more_expression("items.length > 0"),
        TestPool::default(),
        TestLayout::new(500, 20),
    );
    let err = engine.attach(&items, &()).unwrap_err();
    assert_eq!(
        err,
        ConfigError::NotCallable {
            expression: "items.length > 0".into()
        }
    );
    assert!(err.to_string().contains("items.length > 0"));
}

struct Host {
    calls: Arc<AtomicUsize>,
}

impl HostContext for Host {
    fn method(&self, name: &str) -> Option<LoadMoreFn> {
        (name == "loadMore").then(|| {
            let calls = Arc::clone(&self.calls);
            Arc::new(move |_: LoadMoreRequest| {
                calls.fetch_add(1, Ordering::SeqCst);
                LoadMoreReply::Done
            }) as LoadMoreFn
        })
    }

    fn evaluate(&self, expression: &str) -> Option<LoadMoreFn> {
        match expression {
            "vm.loadMore" => self.method("loadMore"),
            _ => None,
        }
    }
}

#[test]
fn named_method_resolves_once_at_attach() {
    let calls = Arc::new(AtomicUsize::new(0));
    let host = Host {
        calls: Arc::clone(&calls),
    };
    let items = items(1000);
    let mut engine = Engine::new(
        WindowOptions::new().with_load_more_method("loadMore"),
        TestPool::default(),
        TestLayout::new(500, 20),
    );
    engine.attach(&items, &host).unwrap();
    assert!(engine.trigger().has_callback());

    assert!(engine.request_load_more());
    assert!(engine.run_microtasks());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn expression_resolves_through_host() {
    let calls = Arc::new(AtomicUsize::new(0));
    let host = Host {
        calls: Arc::clone(&calls),
    };
    let items = items(1000);
    let mut engine = Engine::new(
        WindowOptions::new().with_load_more_expression("vm.loadMore"),
        TestPool::default(),
        TestLayout::new(500, 20),
    );
    engine.attach(&items, &host).unwrap();
    assert!(engine.trigger().has_callback());

    assert!(engine.request_load_more());
    assert!(engine.run_microtasks());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let mut engine = Engine::new(
        WindowOptions::new().with_load_more_expression("vm.missing"),
        TestPool::default(),
        TestLayout::new(500, 20),
    );
    assert!(matches!(
        engine.attach(&items, &host),
        Err(ConfigError::NotCallable { .. })
    ));
}

#[test]
fn attach_builds_initial_window() {
    let (engine, _items) = attached(1000);
    assert!(engine.is_attached());
    assert!(engine.layout().listening);
    assert_eq!(engine.item_height().get(), Some(20));
    assert_eq!(
        engine.sizing(),
        Sizing {
            elements_in_view: 26,
            views_length: 57
        }
    );
    assert_eq!(
        engine.window(),
        Window {
            first_index: 0,
            view_count: 57,
            top_buffer_height: 0,
            bottom_buffer_height: 18860,
        }
    );
    assert_eq!(engine.layout().buffers, (0, 18860));
    assert_eq!(bound(&engine), (0..57).collect::<Vec<_>>());
    assert_eq!(engine.pool().created, 57);
    assert!(!engine.has_pending_timers());
    assert!(engine.scroll_state().is_at_top);
}

#[test]
fn scrolling_down_recycles_leading_views() {
    let (mut engine, items) = attached(1000);
    let created = engine.pool().created;

    scroll_to(&mut engine, &items, 200);
    let window = engine.window();
    assert_eq!(window.first_index, 10);
    assert_eq!(window.top_buffer_height, 200);
    assert_eq!(window.bottom_buffer_height, 18660);
    assert_eq!(bound(&engine), (10..67).collect::<Vec<_>>());
    assert_eq!(engine.pool().created, created);
    assert!(!engine.scroll_state().is_at_top);
}

#[test]
fn reversing_keeps_buffer_above_viewport() {
    let (mut engine, items) = attached(1000);
    scroll_to(&mut engine, &items, 260);
    assert_eq!(engine.window().first_index, 13);

    scroll_to(&mut engine, &items, 240);
    let window = engine.window();
    assert_eq!(engine.scroll_state().direction, ScrollDirection::Up);
    assert_eq!(window.first_index, 7);
    assert_eq!(window.top_buffer_height, 140);

    scroll_to(&mut engine, &items, 300);
    let window = engine.window();
    assert_eq!(engine.scroll_state().direction, ScrollDirection::Down);
    assert_eq!(window.first_index, 15);
    assert_eq!(window.top_buffer_height, 300);
    assert_window_invariants(&engine, &items);
}

#[test]
fn jump_to_bottom_and_back() {
    let (mut engine, items) = attached(1000);
    let binds = engine.pool().binds;

    scroll_to(&mut engine, &items, 19500);
    let window = engine.window();
    assert_eq!(window.first_index, 943);
    assert_eq!(window.top_buffer_height, 18860);
    assert_eq!(window.bottom_buffer_height, 0);
    assert!(engine.scroll_state().is_last_index);
    assert_eq!(engine.pool().binds - binds, 57);

    scroll_to(&mut engine, &items, 18000);
    let window = engine.window();
    assert_eq!(window.first_index, 895);
    assert_eq!(window.top_buffer_height, 17900);
    assert_window_invariants(&engine, &items);

    scroll_to(&mut engine, &items, 0);
    assert_eq!(engine.window().first_index, 0);
    assert_eq!(engine.window().top_buffer_height, 0);
    assert_window_invariants(&engine, &items);
}

#[test]
fn load_more_fires_once_per_bottom_approach() {
    let items = items(1000);
    let (callback, requests) = recording_callback();
    let mut engine = engine_with(
        WindowOptions::new().with_load_more(Some(callback)),
        TestLayout::new(500, 20),
        &items,
    );

    scroll_to(&mut engine, &items, 19500);
    assert!(engine.is_load_more_pending());
    assert!(requests.lock().unwrap().is_empty());
    assert!(engine.run_microtasks());
    assert_eq!(
        requests.lock().unwrap().as_slice(),
        &[LoadMoreRequest {
            top_index: 943,
            is_at_bottom: true,
            is_at_top: false,
        }]
    );

    scroll_to(&mut engine, &items, 19600);
    assert!(!engine.run_microtasks());

    scroll_to(&mut engine, &items, 0);
    assert!(engine.run_microtasks());
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].top_index, 0);
    assert!(requests[1].is_at_top);
}

#[test]
fn load_more_dropped_while_pending() {
    let items = items(1000);
    let completions: Arc<Mutex<Vec<Completion>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completions);
    let mut engine = engine_with(
        WindowOptions::new().with_load_more(Some(move |_: LoadMoreRequest| {
            let completion = Completion::new();
            sink.lock().unwrap().push(completion.clone());
            LoadMoreReply::Pending(completion)
        })),
        TestLayout::new(500, 20),
        &items,
    );

    scroll_to(&mut engine, &items, 19500);
    assert!(engine.run_microtasks());
    scroll_to(&mut engine, &items, 0);
    assert!(!engine.run_microtasks());
    assert_eq!(engine.trigger().invocations(), 1);

    completions.lock().unwrap()[0].settle();
    scroll_to(&mut engine, &items, 400);
    scroll_to(&mut engine, &items, 0);
    assert!(engine.run_microtasks());
    assert_eq!(engine.trigger().invocations(), 2);
}

#[test]
fn scroll_events_coalesce_into_one_frame() {
    let (mut engine, items) = attached(1000);
    engine.layout_mut().scroll = 200;
    assert!(engine.on_scroll_event());
    assert!(!engine.on_scroll_event());
    assert!(!engine.on_resize_event());
    assert_eq!(engine.tick_phase(), TickPhase::Scheduled);

    engine.on_animation_frame(&items);
    assert_eq!(engine.tick_phase(), TickPhase::Idle);
    assert_eq!(engine.window().first_index, 10);

    // A frame without a scheduled tick does nothing.
    engine.layout_mut().scroll = 400;
    engine.on_animation_frame(&items);
    assert_eq!(engine.window().first_index, 10);
    assert!(engine.on_scroll_event());
}

#[test]
fn offsets_are_relative_to_the_list() {
    let items = items(1000);
    let mut layout = TestLayout::new(500, 20);
    layout.distance_to_top = 100;
    let mut engine = engine_with(WindowOptions::new(), layout, &items);

    scroll_to(&mut engine, &items, 300);
    assert_eq!(engine.window().first_index, 10);

    assert!(engine.scroll_to_index(100));
    assert_eq!(engine.layout().scroll, 2100);
    assert!(engine.scroll_to_index(5000));
    assert_eq!(engine.layout().scroll, 19980 + 100);
}

#[test]
fn resize_recomputes_pool() {
    let (mut engine, items) = attached(1000);
    scroll_to(&mut engine, &items, 200);

    engine.layout_mut().viewport = 1000;
    assert!(engine.on_resize_event());
    engine.on_animation_frame(&items);
    assert_eq!(
        engine.sizing(),
        Sizing {
            elements_in_view: 51,
            views_length: 107
        }
    );
    assert_eq!(engine.window().view_count, 107);
    assert_eq!(engine.window().first_index, 10);
    assert_window_invariants(&engine, &items);
}

#[test]
fn shrinking_below_scroll_depth_pins_to_end() {
    let (mut engine, mut items) = attached(1000);
    scroll_to(&mut engine, &items, 19500);

    items.truncate(500);
    engine.items_or_collection_changed(
        &items,
        &CollectionChange::Mutated {
            len: 500,
            splices: alloc::vec![Splice::remove(500, 500)],
        },
    );
    assert_eq!(
        engine.window(),
        Window {
            first_index: 443,
            view_count: 57,
            top_buffer_height: 8860,
            bottom_buffer_height: 0,
        }
    );
    assert_eq!(engine.layout().scroll_writes.last(), Some(&18360));
    assert!(engine.scroll_state().is_last_index);
    assert_window_invariants(&engine, &items);

    // The scroll event caused by the mutation is absorbed.
    assert!(engine.is_handling_mutation());
    assert!(!engine.on_scroll_event());
    assert!(engine.on_scroll_event());
}

#[test]
fn growing_reconciles_as_scroll_down() {
    let (mut engine, mut items) = attached(100);
    scroll_to(&mut engine, &items, 1000);
    assert_eq!(engine.window().first_index, 43);
    assert_eq!(engine.window().bottom_buffer_height, 0);

    items.extend(100..150);
    engine.items_or_collection_changed(
        &items,
        &CollectionChange::Mutated {
            len: 150,
            splices: alloc::vec![Splice::insert(100, 50)],
        },
    );
    let window = engine.window();
    assert_eq!(window.first_index, 50);
    assert_eq!(window.top_buffer_height, 1000);
    assert_eq!(window.bottom_buffer_height, 860);
    assert!(!engine.scroll_state().is_last_index);
    assert_window_invariants(&engine, &items);
}

#[test]
fn unknown_height_polls_then_recomputes_once() {
    let items = items(1000);
    let mut layout = TestLayout::new(500, 20);
    layout.laid_out = false;
    let mut engine = engine_with(WindowOptions::new(), layout, &items);

    assert_eq!(engine.item_height(), ItemHeight::Unknown);
    assert_eq!(engine.views().count(), 1);
    assert_eq!(engine.next_timer_deadline(), Some(500));

    engine.advance_time(499, &items);
    assert_eq!(engine.views().count(), 1);
    engine.advance_time(500, &items);
    assert_eq!(engine.next_timer_deadline(), Some(1000));

    engine.layout_mut().laid_out = true;
    engine.advance_time(1000, &items);
    assert_eq!(engine.item_height().get(), Some(20));
    assert!(!engine.has_pending_timers());
    assert_eq!(engine.views().count(), 57);
    assert_window_invariants(&engine, &items);

    let binds = engine.pool().binds;
    engine.advance_time(5000, &items);
    assert_eq!(engine.pool().binds, binds);
}

#[test]
fn hidden_view_keeps_last_height_through_a_shrink() {
    let (mut engine, mut items) = attached(1000);
    scroll_to(&mut engine, &items, 19500);
    assert_eq!(engine.window().first_index, 943);

    engine.layout_mut().laid_out = false;
    items.truncate(10);
    engine.items_or_collection_changed(
        &items,
        &CollectionChange::Mutated {
            len: 10,
            splices: alloc::vec![Splice::remove(10, 990)],
        },
    );
    assert_eq!(engine.item_height().get(), Some(20));
    assert_eq!(
        engine.window(),
        Window {
            first_index: 0,
            view_count: 10,
            top_buffer_height: 0,
            bottom_buffer_height: 0,
        }
    );
    assert_eq!(engine.views().count(), 10);
    assert_eq!(engine.pool().created - engine.pool().disposed, 10);
    assert_window_invariants(&engine, &items);
    assert_eq!(engine.next_timer_deadline(), Some(500));

    engine.layout_mut().laid_out = true;
    engine.advance_time(500, &items);
    assert!(!engine.has_pending_timers());
    assert_window_invariants(&engine, &items);
}

#[test]
fn empty_collection_renders_nothing() {
    let mut items = items(0);
    let mut engine = engine_with(WindowOptions::new(), TestLayout::new(500, 20), &items);
    assert_eq!(engine.views().count(), 0);
    assert!(!engine.has_pending_timers());
    assert_eq!(engine.window(), Window::default());

    items.extend(0..100);
    engine.items_or_collection_changed(&items, &CollectionChange::Replaced { len: 100 });
    assert_eq!(engine.views().count(), 57);

    items.clear();
    engine.items_or_collection_changed(&items, &CollectionChange::Replaced { len: 0 });
    assert_eq!(engine.views().count(), 0);
    assert_eq!(engine.layout().buffers, (0, 0));
    assert_eq!(engine.pool().disposed, engine.pool().created);
}

#[test]
fn detach_releases_everything() {
    let items = items(1000);
    let mut layout = TestLayout::new(500, 20);
    layout.laid_out = false;
    let mut engine = engine_with(WindowOptions::new(), layout, &items);
    assert!(engine.has_pending_timers());

    engine.detach();
    assert!(!engine.is_attached());
    assert!(!engine.layout().listening);
    assert!(!engine.has_pending_timers());
    assert_eq!(engine.views().count(), 0);
    assert_eq!(engine.pool().disposed, engine.pool().created);
    assert!(!engine.on_scroll_event());

    engine.layout_mut().laid_out = true;
    engine.attach(&items, &()).unwrap();
    assert_eq!(engine.views().count(), 57);
}

struct Tracked {
    items: Vec<u32>,
    subscriptions: Cell<usize>,
}

impl Collection for Tracked {
    type Item = u32;
    type Subscription = ();

    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Option<&u32> {
        self.items.get(index)
    }

    fn subscribe(&self) {
        self.subscriptions.set(self.subscriptions.get() + 1);
    }
}

#[test]
fn resubscribes_only_on_replacement() {
    let tracked = Tracked {
        items: items(100),
        subscriptions: Cell::new(0),
    };
    let mut engine: WindowingEngine<Tracked, TestPool, TestLayout> = WindowingEngine::new(
        WindowOptions::new(),
        TestPool::default(),
        TestLayout::new(500, 20),
    );
    engine.attach(&tracked, &()).unwrap();
    assert_eq!(tracked.subscriptions.get(), 1);

    engine.items_or_collection_changed(
        &tracked,
        &CollectionChange::Mutated {
            len: 100,
            splices: Vec::new(),
        },
    );
    assert_eq!(tracked.subscriptions.get(), 1);

    engine.items_or_collection_changed(&tracked, &CollectionChange::Replaced { len: 100 });
    assert_eq!(tracked.subscriptions.get(), 2);
}

#[test]
fn random_scrolling_keeps_window_consistent() {
    let (mut engine, items) = attached(2000);
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..500 {
        let offset = rng.gen_range_u64(0, 42_000);
        scroll_to(&mut engine, &items, offset);
        assert_window_invariants(&engine, &items);

        let index = (offset / 20) as usize;
        let window = engine.window();
        let max_first = items.len() - window.view_count;
        // The viewport's first item is always rendered.
        assert!(window.contains(index.min(max_first)));
    }
}

#[derive(Clone, Debug)]
enum Op {
    ScrollTo(u64),
    Push(usize),
    Truncate(usize),
    Replace(usize),
    Resize(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..40_000).prop_map(Op::ScrollTo),
        1 => (1usize..300).prop_map(Op::Push),
        1 => (0usize..1200).prop_map(Op::Truncate),
        1 => (0usize..1500).prop_map(Op::Replace),
        1 => (100u32..1200).prop_map(Op::Resize),
    ]
}

proptest! {
    #[test]
    fn random_ops_keep_window_consistent(
        initial in 0usize..1500,
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut items = items(initial);
        let mut engine = engine_with(WindowOptions::new(), TestLayout::new(500, 20), &items);
        assert_window_invariants(&engine, &items);

        for op in ops {
            match op {
                Op::ScrollTo(offset) => scroll_to(&mut engine, &items, offset),
                Op::Push(count) => {
                    let start = items.len() as u32;
                    items.extend(start..start + count as u32);
                    let change = CollectionChange::Mutated {
                        len: items.len(),
                        splices: alloc::vec![Splice::insert(start as usize, count)],
                    };
                    engine.items_or_collection_changed(&items, &change);
                }
                Op::Truncate(len) => {
                    let removed = items.len().saturating_sub(len);
                    items.truncate(len);
                    let change = CollectionChange::Mutated {
                        len: items.len(),
                        splices: alloc::vec![Splice::remove(items.len(), removed)],
                    };
                    engine.items_or_collection_changed(&items, &change);
                }
                Op::Replace(len) => {
                    items = (0..len as u32).map(|i| i + 10_000).collect();
                    engine.items_or_collection_changed(
                        &items,
                        &CollectionChange::Replaced { len },
                    );
                }
                Op::Resize(viewport) => {
                    engine.layout_mut().viewport = viewport;
                    if engine.on_resize_event() {
                        engine.on_animation_frame(&items);
                    }
                }
            }
            assert_window_invariants(&engine, &items);
            prop_assert_eq!(engine.item_count(), items.len());
        }

        engine.detach();
        prop_assert_eq!(engine.pool().disposed, engine.pool().created);
        prop_assert!(!engine.has_pending_timers());
    }
}
