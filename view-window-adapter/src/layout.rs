use core::marker::PhantomData;

use view_window::{LayoutProbe, ScrollContainer};

/// A simulated scroll container holding one list of uniform rows.
///
/// Scroll writes are clamped to the content height, which is derived from the spacer
/// heights and the number of rendered views the host last reported.
#[derive(Clone, Debug)]
pub struct SimLayout<V> {
    viewport_height: u32,
    item_height: u32,
    laid_out: bool,
    scroll_offset: u64,
    distance_to_top: u64,
    header_height: u64,
    buffer_heights: (u64, u64),
    rendered_views: usize,
    listening: bool,
    scroll_writes: u64,
    _view: PhantomData<fn(&V)>,
}

impl<V> SimLayout<V> {
    pub fn new(viewport_height: u32, item_height: u32) -> Self {
        Self {
            viewport_height,
            item_height,
            laid_out: true,
            scroll_offset: 0,
            distance_to_top: 0,
            header_height: 0,
            buffer_heights: (0, 0),
            rendered_views: 0,
            listening: false,
            scroll_writes: 0,
            _view: PhantomData,
        }
    }

    /// Content above the list inside the same scroll container.
    pub fn with_distance_to_top(mut self, distance_to_top: u64) -> Self {
        self.distance_to_top = distance_to_top;
        self
    }

    /// A table header rendered between the container top and the first row.
    pub fn with_header_height(mut self, header_height: u64) -> Self {
        self.header_height = header_height;
        self
    }

    /// Starts not laid out: every element measures `0` until [`SimLayout::set_laid_out`].
    pub fn hidden(mut self) -> Self {
        self.laid_out = false;
        self
    }

    pub fn set_header_height(&mut self, header_height: u64) {
        self.header_height = header_height;
    }

    pub fn set_laid_out(&mut self, laid_out: bool) {
        self.laid_out = laid_out;
    }

    pub fn set_viewport_height(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height;
    }

    pub fn item_height(&self) -> u32 {
        self.item_height
    }

    pub fn buffer_heights(&self) -> (u64, u64) {
        self.buffer_heights
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Scroll writes issued through [`LayoutProbe::set_scroll_offset`].
    pub fn scroll_writes(&self) -> u64 {
        self.scroll_writes
    }

    pub fn set_rendered_views(&mut self, rendered_views: usize) {
        self.rendered_views = rendered_views;
    }

    /// Spacers plus rendered rows.
    pub fn list_height(&self) -> u64 {
        let (top, bottom) = self.buffer_heights;
        let rows = (self.rendered_views as u64).saturating_mul(self.item_height as u64);
        top.saturating_add(rows).saturating_add(bottom)
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.distance_to_top
            .saturating_add(self.header_height)
            .saturating_add(self.list_height())
            .saturating_sub(self.viewport_height as u64)
    }

    /// Moves the scroll position the way the user would (no write is recorded).
    ///
    /// Returns `true` when the offset changed.
    pub fn user_scroll_to(&mut self, offset: u64) -> bool {
        let offset = offset.min(self.max_scroll_offset());
        let changed = offset != self.scroll_offset;
        self.scroll_offset = offset;
        changed
    }

    /// Re-applies the clamp after the content shrank. Returns `true` when the offset moved.
    pub fn clamp_scroll(&mut self) -> bool {
        let current = self.scroll_offset;
        self.user_scroll_to(current)
    }
}

impl<V> LayoutProbe for SimLayout<V> {
    type View = V;

    fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    fn element_height(&self, _view: &V) -> u32 {
        if self.laid_out { self.item_height } else { 0 }
    }

    fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_writes += 1;
        self.scroll_offset = offset.min(self.max_scroll_offset());
    }

    fn distance_to_top(&self) -> u64 {
        self.distance_to_top
    }

    fn set_buffer_heights(&mut self, top: u64, bottom: u64) {
        self.buffer_heights = (top, bottom);
    }

    fn listen(&mut self) {
        self.listening = true;
    }

    fn unlisten(&mut self) {
        self.listening = false;
    }
}

/// A layout whose list is the body of a table with a header row.
pub trait TableLayout: LayoutProbe {
    /// Height of the header between the container top and the first row.
    fn header_height(&self) -> u64;
}

impl<V> TableLayout for SimLayout<V> {
    fn header_height(&self) -> u64 {
        self.header_height
    }
}

/// The list is the body of a table: the header scrolls with it and sits above the first row.
///
/// The header height is read from the layout on every call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableBodyContainer;

impl TableBodyContainer {
    fn list_start<L: TableLayout + ?Sized>(&self, layout: &L) -> u64 {
        layout.distance_to_top().saturating_add(layout.header_height())
    }
}

impl<L: TableLayout + ?Sized> ScrollContainer<L> for TableBodyContainer {
    fn offset_in_list(&self, layout: &L) -> u64 {
        layout.scroll_offset().saturating_sub(self.list_start(layout))
    }

    fn scroll_to_in_list(&self, layout: &mut L, offset_in_list: u64) {
        let offset = offset_in_list.saturating_add(self.list_start(layout));
        layout.set_scroll_offset(offset);
    }
}
