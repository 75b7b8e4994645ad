use crate::{ScrollDirection, ScrollState, Window};

/// Result of classifying one scroll sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub direction: ScrollDirection,
    pub switched_direction: bool,
}

/// Classifies scroll samples and detects reversals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollDirectionTracker;

impl ScrollDirectionTracker {
    pub fn classify(
        new_first_index: usize,
        scroll: &ScrollState,
        window: &Window,
    ) -> Classification {
        let previous = scroll.previous_first_index;
        let pinned_at_bottom = window.bottom_buffer_height == 0 && scroll.is_last_index;

        let direction = if new_first_index > previous && !pinned_at_bottom {
            ScrollDirection::Down
        } else if new_first_index < previous {
            ScrollDirection::Up
        } else {
            ScrollDirection::None
        };

        Classification {
            direction,
            switched_direction: direction != ScrollDirection::None
                && direction != scroll.direction,
        }
    }

    /// Stores a classification. `None` samples keep the last movement direction.
    pub fn record(scroll: &mut ScrollState, classification: Classification) {
        if classification.direction == ScrollDirection::None {
            return;
        }
        scroll.direction = classification.direction;
        scroll.switched_direction = classification.switched_direction;
    }
}
