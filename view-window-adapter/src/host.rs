use core::mem;

use view_window::{
    Collection, CollectionChange, ConfigError, HostContext, LayoutProbe, ScrollContainer,
    WindowOptions, WindowingEngine,
};

use crate::{ObservableVec, PooledView, RecordingPool, SimLayout};

/// The engine as wired by [`HostLoop`].
pub type SimEngine<T> =
    WindowingEngine<ObservableVec<T>, RecordingPool<T>, SimLayout<PooledView<T>>>;

/// What one [`HostLoop::tick`] ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub frame: bool,
    pub load_more: bool,
}

/// A single-threaded host event loop that owns an engine and the collection it observes.
///
/// This type plays the part of the platform. It turns user actions into the events the
/// engine expects (scroll, resize, collection changes) and runs the queued work on each
/// `tick(now_ms)`, in platform order: due timers, then the animation frame, then
/// microtasks.
///
/// A layout change caused by a collection edit (moved spacers, clamped offset) is reported
/// as a scroll event, the way a reflow would.
#[derive(Debug)]
pub struct HostLoop<T: Clone> {
    engine: SimEngine<T>,
    items: ObservableVec<T>,
    frame_requested: bool,
}

impl<T: Clone> HostLoop<T> {
    pub fn new(
        options: WindowOptions,
        items: impl Into<ObservableVec<T>>,
        layout: SimLayout<PooledView<T>>,
    ) -> Self {
        Self {
            engine: WindowingEngine::new(options, RecordingPool::new(), layout),
            items: items.into(),
            frame_requested: false,
        }
    }

    pub fn with_scroll_container(
        mut self,
        container: impl ScrollContainer<SimLayout<PooledView<T>>> + 'static,
    ) -> Self {
        self.engine = self.engine.with_scroll_container(container);
        self
    }

    pub fn attach(&mut self, host: &dyn HostContext) -> Result<(), ConfigError> {
        self.engine.attach(&self.items, host)?;
        self.sync_layout();
        Ok(())
    }

    pub fn detach(&mut self) {
        self.engine.detach();
        self.frame_requested = false;
        self.sync_layout();
    }

    pub fn engine(&self) -> &SimEngine<T> {
        &self.engine
    }

    pub fn items(&self) -> &ObservableVec<T> {
        &self.items
    }

    pub fn layout(&self) -> &SimLayout<PooledView<T>> {
        self.engine.layout()
    }

    pub fn layout_mut(&mut self) -> &mut SimLayout<PooledView<T>> {
        self.engine.layout_mut()
    }

    pub fn is_frame_requested(&self) -> bool {
        self.frame_requested
    }

    pub fn scroll_offset(&self) -> u64 {
        self.engine.layout().scroll_offset()
    }

    /// Scrolls like the user would. Returns the applied (clamped) offset.
    pub fn scroll_to(&mut self, offset: u64) -> u64 {
        if self.engine.layout_mut().user_scroll_to(offset) {
            self.scroll_event();
        }
        self.scroll_offset()
    }

    pub fn scroll_by(&mut self, delta: i64) -> u64 {
        let current = self.scroll_offset();
        let target = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.scroll_to(target)
    }

    pub fn scroll_to_index(&mut self, index: usize) -> bool {
        let before = self.scroll_offset();
        if !self.engine.scroll_to_index(index) {
            return false;
        }
        if self.scroll_offset() != before {
            self.scroll_event();
        }
        true
    }

    pub fn resize(&mut self, viewport_height: u32) {
        self.engine.layout_mut().set_viewport_height(viewport_height);
        if self.engine.on_resize_event() {
            self.frame_requested = true;
        }
        if self.engine.layout_mut().clamp_scroll() {
            self.scroll_event();
        }
    }

    /// Applies an in-place edit and reports its diff to the engine.
    pub fn mutate(&mut self, edit: impl FnOnce(&mut ObservableVec<T>) -> CollectionChange) {
        let change = edit(&mut self.items);
        self.notify(&change);
    }

    pub fn push(&mut self, item: T) {
        self.mutate(|items| items.push(item));
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        self.mutate(|list| list.extend(items));
    }

    pub fn truncate(&mut self, len: usize) {
        self.mutate(|items| items.truncate(len));
    }

    /// Swaps in a different collection. Returns the previous one.
    pub fn replace(&mut self, items: impl Into<ObservableVec<T>>) -> ObservableVec<T> {
        let previous = mem::replace(&mut self.items, items.into());
        let change = CollectionChange::Replaced { len: self.items.len() };
        self.notify(&change);
        previous
    }

    /// Runs due timers, the pending animation frame and the microtask checkpoint.
    pub fn tick(&mut self, now_ms: u64) -> TickReport {
        self.engine.advance_time(now_ms, &self.items);
        let frame = mem::take(&mut self.frame_requested);
        if frame {
            self.engine.on_animation_frame(&self.items);
        }
        let load_more = self.engine.run_microtasks();
        self.sync_layout();
        TickReport { frame, load_more }
    }

    fn notify(&mut self, change: &CollectionChange) {
        let offset = self.scroll_offset();
        let buffers = self.engine.layout().buffer_heights();

        self.engine.items_or_collection_changed(&self.items, change);
        self.sync_layout();

        let clamped = self.engine.layout_mut().clamp_scroll();
        if clamped
            || self.scroll_offset() != offset
            || self.engine.layout().buffer_heights() != buffers
        {
            self.scroll_event();
        }
    }

    fn scroll_event(&mut self) {
        if self.engine.on_scroll_event() {
            self.frame_requested = true;
        }
    }

    fn sync_layout(&mut self) {
        let rendered = self.engine.views().count();
        self.engine.layout_mut().set_rendered_views(rendered);
    }
}
