use crate::{ItemHeight, ScrollDirection, Sizing, Window};

/// Scroll bookkeeping carried between ticks.
///
/// `direction` is the last direction the window actually moved in; it stays put across
/// ticks that classify as [`ScrollDirection::None`], which is what makes reversal detection
/// possible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub direction: ScrollDirection,
    pub previous_first_index: usize,
    /// Candidate first index at the most recent rebind.
    pub last_rebind_index: usize,
    pub switched_direction: bool,
    pub is_at_top: bool,
    pub is_last_index: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            direction: ScrollDirection::None,
            previous_first_index: 0,
            last_rebind_index: 0,
            switched_direction: false,
            is_at_top: true,
            is_last_index: false,
        }
    }
}

/// Where the scroll-tick state machine currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickPhase {
    #[default]
    Idle,
    /// A frame was requested and has not run yet.
    Scheduled,
    Handling,
}

/// A lightweight, serializable snapshot of the engine.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineSnapshot {
    pub window: Window,
    pub scroll: ScrollState,
    pub item_height: ItemHeight,
    pub item_count: usize,
    pub sizing: Sizing,
}
