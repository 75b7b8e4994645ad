use alloc::boxed::Box;
use core::marker::PhantomData;
use core::mem;

use crate::collection::{CollectionChangeHandler, Reconcile};
use crate::{
    BufferSizer, Collection, CollectionChange, ConfigError, EngineSnapshot, HostContext,
    InfiniteScrollTrigger, ItemHeight, LayoutProbe, ListContainer, LoadMoreRequest,
    ScrollContainer, ScrollDirection, ScrollDirectionTracker, ScrollState, SizeEstimator, Sizing,
    TickPhase, ViewPool, ViewRecycler, Window, WindowOptions,
};

/// A headless view-recycling window over a linear collection.
///
/// The engine owns a small pool of views and rebinds them as the viewport scrolls, while two
/// spacer heights stand in for everything outside the window. It never owns a clock or a
/// thread; the host drives it:
/// - `on_scroll_event` / `on_resize_event` when the platform reports them, requesting an
///   animation frame whenever they return `true`
/// - `on_animation_frame` once that frame runs
/// - `advance_time(now_ms)` from its timer loop (item-height polling)
/// - `run_microtasks` at each microtask checkpoint (deferred load-more calls)
/// - `items_or_collection_changed` for every collection notification
///
/// The collection is borrowed per call; it is observed, never owned.
pub struct WindowingEngine<C, P, L>
where
    C: Collection + ?Sized,
    P: ViewPool<C::Item>,
    L: LayoutProbe<View = P::View>,
{
    options: WindowOptions,
    pool: P,
    layout: L,
    container: Box<dyn ScrollContainer<L>>,

    sizer: BufferSizer,
    estimator: SizeEstimator,
    recycler: ViewRecycler<P::View>,
    trigger: InfiniteScrollTrigger,
    changes: CollectionChangeHandler,
    subscription: Option<C::Subscription>,

    window: Window,
    scroll: ScrollState,
    sizing: Sizing,

    phase: TickPhase,
    attached: bool,
    resize_pending: bool,
    skip_next_scroll_handle: bool,
    // Set by an in-place mutation, consumed by the next scroll event.
    handling_mutation: bool,
    now_ms: u64,

    _collection: PhantomData<fn(&C)>,
}

impl<C, P, L> WindowingEngine<C, P, L>
where
    C: Collection + ?Sized,
    P: ViewPool<C::Item>,
    L: LayoutProbe<View = P::View>,
{
    pub fn new(options: WindowOptions, pool: P, layout: L) -> Self {
        Self {
            sizer: BufferSizer::new(options.buffer_size),
            estimator: SizeEstimator::new(options.poll_interval_ms),
            options,
            pool,
            layout,
            container: Box::new(ListContainer),
            recycler: ViewRecycler::new(),
            trigger: InfiniteScrollTrigger::default(),
            changes: CollectionChangeHandler::new(),
            subscription: None,
            window: Window::default(),
            scroll: ScrollState::default(),
            sizing: Sizing::default(),
            phase: TickPhase::Idle,
            attached: false,
            resize_pending: false,
            skip_next_scroll_handle: false,
            handling_mutation: false,
            now_ms: 0,
            _collection: PhantomData,
        }
    }

    /// Replaces the scroll container strategy (the default is [`ListContainer`]).
    pub fn with_scroll_container(mut self, container: impl ScrollContainer<L> + 'static) -> Self {
        self.container = Box::new(container);
        self
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }

    pub fn sizing(&self) -> Sizing {
        self.sizing
    }

    pub fn item_height(&self) -> ItemHeight {
        self.estimator.height()
    }

    /// The item count as of the last handled change.
    pub fn item_count(&self) -> usize {
        self.changes.item_count()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn tick_phase(&self) -> TickPhase {
        self.phase
    }

    pub fn is_handling_mutation(&self) -> bool {
        self.handling_mutation
    }

    pub fn is_load_more_pending(&self) -> bool {
        self.trigger.is_pending()
    }

    pub fn trigger(&self) -> &InfiniteScrollTrigger {
        &self.trigger
    }

    pub fn has_pending_timers(&self) -> bool {
        self.estimator.is_polling()
    }

    pub fn next_timer_deadline(&self) -> Option<u64> {
        self.estimator.next_poll_ms()
    }

    /// The live views, ordered by bound index.
    pub fn views(&self) -> impl Iterator<Item = &P::View> {
        self.recycler.iter()
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut P {
        &mut self.pool
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            window: self.window,
            scroll: self.scroll,
            item_height: self.estimator.height(),
            item_count: self.changes.item_count(),
            sizing: self.sizing,
        }
    }

    /// Attaches to the host: resolves the load-more target, installs listeners and builds
    /// the initial window.
    pub fn attach(&mut self, items: &C, host: &dyn HostContext) -> Result<(), ConfigError> {
        if self.attached {
            return Ok(());
        }
        self.options.validate()?;
        let callback = self
            .options
            .load_more
            .as_ref()
            .map(|target| target.resolve(host))
            .transpose()?;

        vdebug!(
            len = items.len(),
            buffer_size = self.options.buffer_size,
            load_more = callback.is_some(),
            "attach"
        );
        self.sizer = BufferSizer::new(self.options.buffer_size);
        self.estimator = SizeEstimator::new(self.options.poll_interval_ms);
        self.trigger = InfiniteScrollTrigger::new(callback);
        self.layout.listen();
        self.attached = true;

        self.items_or_collection_changed(items, &CollectionChange::Replaced { len: items.len() });
        Ok(())
    }

    /// Releases listeners, the height poll, the subscription and every pooled view.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        vdebug!(views = self.recycler.len(), "detach");
        self.layout.unlisten();
        self.estimator.reset();
        self.trigger.cancel();
        self.recycler.release(&mut self.pool);
        self.subscription = None;
        self.changes.reset();
        self.window = Window::default();
        self.scroll = ScrollState::default();
        self.sizing = Sizing::default();
        self.phase = TickPhase::Idle;
        self.resize_pending = false;
        self.skip_next_scroll_handle = false;
        self.handling_mutation = false;
        self.attached = false;
    }

    /// Handles a full replacement or an in-place mutation of the collection.
    pub fn items_or_collection_changed(&mut self, items: &C, change: &CollectionChange) {
        if !self.attached {
            return;
        }
        if change.len() != items.len() {
            vwarn!(
                reported = change.len(),
                actual = items.len(),
                "change length disagrees with the collection"
            );
        }
        let plan = self.changes.plan(change);
        vdebug!(
            previous = plan.previous_len,
            len = plan.len,
            resubscribe = plan.resubscribe,
            reconcile = ?plan.reconcile,
            "collection changed"
        );
        if plan.resubscribe {
            self.subscription = None;
            self.subscription = Some(items.subscribe());
        }
        if change.is_mutation() {
            self.handling_mutation = true;
        }
        self.reconcile_items(items, plan.reconcile);
    }

    /// Notes a scroll event. Returns `true` when the host should request an animation frame.
    pub fn on_scroll_event(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        if mem::take(&mut self.handling_mutation) {
            vtrace!("scroll event absorbed by collection change");
            return false;
        }
        self.schedule_tick()
    }

    /// Notes a viewport resize. Returns `true` when the host should request an animation frame.
    pub fn on_resize_event(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.resize_pending = true;
        self.schedule_tick()
    }

    /// Runs the scheduled tick, if any.
    pub fn on_animation_frame(&mut self, items: &C) {
        if self.phase != TickPhase::Scheduled {
            return;
        }
        self.phase = TickPhase::Handling;
        if mem::take(&mut self.resize_pending) && self.recompute_window(items) {
            self.rebind_window(items);
            self.scroll.previous_first_index = self.window.first_index;
            self.refresh_edges(items.len());
        }
        self.handle_scroll(items);
        self.phase = TickPhase::Idle;
    }

    /// Advances the host clock and services the item-height poll.
    pub fn advance_time(&mut self, now_ms: u64, items: &C) {
        self.now_ms = self.now_ms.max(now_ms);
        if !self.attached || !self.estimator.poll_due(self.now_ms) {
            return;
        }
        let measured = self.measure_first_view();
        if self.estimator.poll(measured, self.now_ms) {
            self.reconcile_items(items, Reconcile::Rebind);
        }
    }

    /// Runs the deferred load-more invocation. Returns `true` when the callback ran.
    pub fn run_microtasks(&mut self) -> bool {
        self.attached && self.trigger.run_deferred()
    }

    /// Fires the load-more callback regardless of edges (still subject to the pending guard).
    pub fn request_load_more(&mut self) -> bool {
        self.attached && self.request_more(self.scroll.previous_first_index, true)
    }

    /// Scrolls the container so that `index` is at the top of the viewport.
    ///
    /// The window itself is reconciled by the scroll event the host reports afterwards.
    pub fn scroll_to_index(&mut self, index: usize) -> bool {
        let Some(h) = self.estimator.height().get() else {
            return false;
        };
        let count = self.changes.item_count();
        if !self.attached || count == 0 {
            return false;
        }
        let index = index.min(count - 1);
        let offset = (index as u64).saturating_mul(h as u64);
        self.container.scroll_to_in_list(&mut self.layout, offset);
        true
    }

    fn schedule_tick(&mut self) -> bool {
        if self.phase != TickPhase::Idle {
            return false;
        }
        self.phase = TickPhase::Scheduled;
        true
    }

    fn measure_first_view(&self) -> u32 {
        self.recycler
            .first()
            .map_or(0, |view| self.layout.element_height(view))
    }

    fn reconcile_items(&mut self, items: &C, reconcile: Reconcile) {
        let item_count = items.len();
        let previous_last = self.recycler.last_bound_index(&self.pool);
        let reducing = reconcile == Reconcile::Rebind;

        if item_count > 0 && self.recycler.is_empty() {
            // Representative view for measuring.
            self.recycler.rebind_all(&mut self.pool, items, 0, 1);
        }
        if reducing {
            self.skip_next_scroll_handle = true;
        }

        if self.recompute_window(items) {
            self.rebind_window(items);
            if reducing && previous_last.is_some_and(|last| last >= item_count) {
                self.pin_to_bottom();
            }
            if !reducing {
                self.scroll.previous_first_index = self.window.first_index;
                self.scroll.direction = ScrollDirection::Down;
                self.scroll.switched_direction = false;
            }
        }
        self.refresh_edges(item_count);
        self.handle_scroll(items);
    }

    /// Recomputes sizing and the window from scratch. Returns `false` when there is nothing
    /// to lay out yet (empty collection or unknown item height).
    fn recompute_window(&mut self, items: &C) -> bool {
        let item_count = items.len();
        if item_count == 0 {
            self.recycler.release(&mut self.pool);
            self.estimator.cancel();
            self.window = Window::default();
            self.apply_buffer_heights();
            return false;
        }

        let measured = self.measure_first_view();
        let ItemHeight::Measured(item_height) = self.estimator.measure(measured, self.now_ms)
        else {
            return false;
        };
        let viewport_height = self.layout.viewport_height();
        let current_first = self.recycler.first_bound_index(&self.pool).unwrap_or(0);

        self.sizing = self.sizer.sizing(item_height, viewport_height);
        self.window = self.sizer.recompute_on_items_changed(
            item_count,
            item_height,
            viewport_height,
            current_first,
            self.window.top_buffer_height,
        );
        vdebug!(
            item_count,
            item_height = item_height.get(),
            viewport_height,
            first = self.window.first_index,
            views = self.window.view_count,
            top = self.window.top_buffer_height,
            bottom = self.window.bottom_buffer_height,
            "window recomputed"
        );
        self.apply_buffer_heights();
        true
    }

    fn rebind_window(&mut self, items: &C) {
        self.recycler.rebind_all(
            &mut self.pool,
            items,
            self.window.first_index,
            self.window.view_count,
        );
        self.scroll.last_rebind_index = self.window.first_index;
    }

    fn pin_to_bottom(&mut self) {
        let Some(h) = self.estimator.height().get() else {
            return;
        };
        let delta = (self.window.view_count as u64).saturating_mul(h as u64);
        let offset = self.container.offset_in_list(&self.layout);
        vdebug!(offset, delta, "pinning viewport to the new end of the list");
        self.container
            .scroll_to_in_list(&mut self.layout, offset.saturating_sub(delta));
    }

    fn handle_scroll(&mut self, items: &C) {
        if mem::take(&mut self.skip_next_scroll_handle) {
            vtrace!("scroll pass skipped after collection change");
            return;
        }
        let Some(item_height) = self.estimator.height().get() else {
            return;
        };
        let item_count = items.len();
        if item_count == 0 || self.window.is_empty() {
            return;
        }

        let h = item_height as u64;
        let offset = self.container.offset_in_list(&self.layout);
        let max_first = item_count.saturating_sub(self.window.view_count);
        let first = usize::try_from(offset / h)
            .unwrap_or(usize::MAX)
            .min(max_first);

        let classification = ScrollDirectionTracker::classify(first, &self.scroll, &self.window);
        ScrollDirectionTracker::record(&mut self.scroll, classification);
        vtrace!(
            offset,
            first,
            previous = self.scroll.previous_first_index,
            direction = ?classification.direction,
            switched = classification.switched_direction,
            "scroll tick"
        );

        match classification.direction {
            ScrollDirection::Down => self.scroll_down(items, first, h),
            ScrollDirection::Up => self.scroll_up(items, first, h),
            ScrollDirection::None => {}
        }
        self.scroll.previous_first_index = first;
    }

    fn scroll_down(&mut self, items: &C, first: usize, h: u64) {
        let bound_first = self.window.first_index;
        let wanted = if !self.scroll.switched_direction {
            first.saturating_sub(self.scroll.last_rebind_index)
        } else if self.scroll.is_at_top {
            first.saturating_sub(bound_first)
        } else {
            (self.sizer.buffer_size() + first).saturating_sub(self.scroll.last_rebind_index)
        };
        // Never bind past the candidate.
        let requested = wanted.min(first.saturating_sub(bound_first));
        self.scroll.last_rebind_index = first;

        let moved = self.recycler.move_views(
            &mut self.pool,
            items,
            &mut self.window,
            requested,
            ScrollDirection::Down,
        );
        let adjust = if moved < requested {
            self.window.bottom_buffer_height
        } else {
            h.saturating_mul(moved as u64)
        };
        vtrace!(wanted, requested, moved, adjust, "moved views down");

        self.window.top_buffer_height = self.window.top_buffer_height.saturating_add(adjust);
        self.window.bottom_buffer_height = self.window.bottom_buffer_height.saturating_sub(adjust);
        self.scroll.switched_direction = false;
        self.apply_buffer_heights();
        self.refresh_edges(items.len());
        if wanted > 0 {
            self.request_more(first, false);
        }
    }

    fn scroll_up(&mut self, items: &C, first: usize, h: u64) {
        let bound_first = self.window.first_index;
        let buffer_size = self.sizer.buffer_size();
        let floor = first.saturating_sub(buffer_size);
        let wanted = if !self.scroll.switched_direction {
            self.scroll.last_rebind_index.saturating_sub(first)
        } else if self.scroll.is_last_index {
            bound_first.saturating_sub(floor)
        } else {
            (buffer_size + self.scroll.last_rebind_index).saturating_sub(first)
        };
        // Keep at most `buffer_size` views above the candidate.
        let requested = wanted.min(bound_first.saturating_sub(floor));
        self.scroll.last_rebind_index = first;

        let moved = self.recycler.move_views(
            &mut self.pool,
            items,
            &mut self.window,
            requested,
            ScrollDirection::Up,
        );
        let adjust = if moved < requested {
            self.window.top_buffer_height
        } else {
            h.saturating_mul(moved as u64)
        };
        vtrace!(wanted, requested, moved, adjust, "moved views up");

        self.window.top_buffer_height = self.window.top_buffer_height.saturating_sub(adjust);
        self.window.bottom_buffer_height = self.window.bottom_buffer_height.saturating_add(adjust);
        self.scroll.switched_direction = false;
        self.apply_buffer_heights();
        self.refresh_edges(items.len());
        if wanted > 0 {
            self.request_more(first, false);
        }
    }

    fn request_more(&mut self, first: usize, force: bool) -> bool {
        let request = LoadMoreRequest {
            top_index: first,
            is_at_bottom: self.window.bottom_buffer_height == 0,
            is_at_top: self.scroll.is_at_top,
        };
        self.trigger
            .maybe_trigger(first == 0, self.scroll.is_last_index, force, request)
    }

    fn refresh_edges(&mut self, item_count: usize) {
        self.scroll.is_at_top = self.window.touches_start();
        self.scroll.is_last_index = self.window.touches_end(item_count);
    }

    fn apply_buffer_heights(&mut self) {
        self.layout.set_buffer_heights(
            self.window.top_buffer_height,
            self.window.bottom_buffer_height,
        );
    }
}

impl<C, P, L> core::fmt::Debug for WindowingEngine<C, P, L>
where
    C: Collection + ?Sized,
    P: ViewPool<C::Item>,
    L: LayoutProbe<View = P::View>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowingEngine")
            .field("options", &self.options)
            .field("window", &self.window)
            .field("scroll", &self.scroll)
            .field("sizing", &self.sizing)
            .field("item_height", &self.estimator.height())
            .field("phase", &self.phase)
            .field("attached", &self.attached)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}
