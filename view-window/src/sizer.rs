use core::num::NonZeroU32;

use crate::Window;

/// View-pool dimensions derived from the viewport and the item height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sizing {
    /// Items that fit in the viewport, rounded up, plus one for partial visibility.
    pub elements_in_view: usize,
    /// Target pool size: two viewports plus the buffer.
    pub views_length: usize,
}

/// Computes pool size and the two spacer heights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSizer {
    buffer_size: usize,
}

impl BufferSizer {
    pub fn new(buffer_size: usize) -> Self {
        Self { buffer_size }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn sizing(&self, item_height: NonZeroU32, viewport_height: u32) -> Sizing {
        let elements_in_view = viewport_height.div_ceil(item_height.get()) as usize + 1;
        Sizing {
            elements_in_view,
            views_length: elements_in_view
                .saturating_mul(2)
                .saturating_add(self.buffer_size),
        }
    }

    /// Recomputes the window after the item count (or the viewport) changed.
    ///
    /// `current_first_index` is the index bound to the first live view. When the collection
    /// shrank below the current scroll depth the window is pinned to the new end.
    pub fn recompute_on_items_changed(
        &self,
        item_count: usize,
        item_height: NonZeroU32,
        viewport_height: u32,
        current_first_index: usize,
        current_top_buffer_height: u64,
    ) -> Window {
        let h = item_height.get() as u64;
        let views_length = self.sizing(item_height, viewport_height).views_length;
        let view_count = views_length.min(item_count);
        let last_first = item_count.saturating_sub(views_length);

        let new_bottom_buffer_height = h
            .saturating_mul(item_count as u64)
            .saturating_sub(h.saturating_mul(views_length as u64));

        if current_top_buffer_height >= new_bottom_buffer_height {
            return Window {
                first_index: last_first,
                view_count,
                top_buffer_height: new_bottom_buffer_height,
                bottom_buffer_height: 0,
            };
        }

        let first_index = current_first_index.min(last_first);
        let top_buffer_height = h.saturating_mul(first_index as u64);
        Window {
            first_index,
            view_count,
            top_buffer_height,
            bottom_buffer_height: new_bottom_buffer_height.saturating_sub(top_buffer_height),
        }
    }
}

impl Default for BufferSizer {
    fn default() -> Self {
        Self::new(crate::DEFAULT_BUFFER_SIZE)
    }
}
