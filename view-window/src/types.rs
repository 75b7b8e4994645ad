use core::num::NonZeroU32;

/// Direction of a classified scroll sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Down,
    Up,
    /// No net movement at this sample granularity.
    #[default]
    None,
}

/// The representative height shared by every view.
///
/// A non-positive measurement means the view is not laid out yet (hidden, mid-transition),
/// so it is kept as `Unknown` rather than folded into zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemHeight {
    #[default]
    Unknown,
    Measured(NonZeroU32),
}

impl ItemHeight {
    pub fn from_measurement(height: u32) -> Self {
        NonZeroU32::new(height).map_or(Self::Unknown, Self::Measured)
    }

    pub fn get(self) -> Option<u32> {
        match self {
            Self::Measured(h) => Some(h.get()),
            Self::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Self::Measured(_))
    }
}

/// The contiguous index range backed by live views, plus the spacer heights standing in
/// for the unrendered items above and below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub first_index: usize,
    pub view_count: usize,
    pub top_buffer_height: u64,
    pub bottom_buffer_height: u64,
}

impl Window {
    /// One past the last bound index.
    pub fn end_index(&self) -> usize {
        self.first_index.saturating_add(self.view_count)
    }

    pub fn last_index(&self) -> Option<usize> {
        (self.view_count > 0).then(|| self.end_index() - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.view_count == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.first_index && index < self.end_index()
    }

    pub fn touches_start(&self) -> bool {
        self.first_index == 0
    }

    pub fn touches_end(&self, item_count: usize) -> bool {
        self.view_count > 0 && self.end_index() >= item_count
    }

    /// Spacers plus rendered views, in pixels.
    pub fn total_height(&self, item_height: u32) -> u64 {
        let views = (self.view_count as u64).saturating_mul(item_height as u64);
        self.top_buffer_height
            .saturating_add(views)
            .saturating_add(self.bottom_buffer_height)
    }
}

/// Arguments handed to the load-more callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadMoreRequest {
    pub top_index: usize,
    pub is_at_bottom: bool,
    pub is_at_top: bool,
}
