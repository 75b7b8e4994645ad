use crate::ItemHeight;

/// Measures the representative item height and polls until layout settles.
///
/// Layout completion is not synchronously observable, so a non-positive measurement arms a
/// fixed-period poll. The poll stops on the first positive sample; the caller then runs a
/// single full recompute. A known height survives later zero readings until the poll settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeEstimator {
    poll_interval_ms: u64,
    next_poll_ms: Option<u64>,
    height: ItemHeight,
}

impl SizeEstimator {
    pub fn new(poll_interval_ms: u64) -> Self {
        Self {
            poll_interval_ms: poll_interval_ms.max(1),
            next_poll_ms: None,
            height: ItemHeight::Unknown,
        }
    }

    pub fn height(&self) -> ItemHeight {
        self.height
    }

    pub fn is_polling(&self) -> bool {
        self.next_poll_ms.is_some()
    }

    pub fn next_poll_ms(&self) -> Option<u64> {
        self.next_poll_ms
    }

    /// Records a measurement taken at `now_ms`.
    ///
    /// A zero reading keeps the last known height and arms the poll.
    pub fn measure(&mut self, measured: u32, now_ms: u64) -> ItemHeight {
        let height = ItemHeight::from_measurement(measured);
        if height.is_known() {
            self.height = height;
            self.next_poll_ms = None;
        } else if self.next_poll_ms.is_none() {
            let due = now_ms.saturating_add(self.poll_interval_ms);
            vdebug!(due, "item height unknown, polling");
            self.next_poll_ms = Some(due);
        }
        self.height
    }

    pub fn poll_due(&self, now_ms: u64) -> bool {
        self.next_poll_ms.is_some_and(|due| now_ms >= due)
    }

    /// Feeds a poll sample.
    ///
    /// Returns `true` exactly once, when a due poll observes a positive height.
    pub fn poll(&mut self, measured: u32, now_ms: u64) -> bool {
        let Some(due) = self.next_poll_ms else {
            return false;
        };
        if now_ms < due {
            return false;
        }
        let height = ItemHeight::from_measurement(measured);
        if height.is_known() {
            vdebug!(measured, "item height settled");
            self.height = height;
            self.next_poll_ms = None;
            return true;
        }
        let missed = (now_ms - due) / self.poll_interval_ms + 1;
        self.next_poll_ms = Some(due.saturating_add(missed.saturating_mul(self.poll_interval_ms)));
        false
    }

    pub fn cancel(&mut self) {
        self.next_poll_ms = None;
    }

    pub fn reset(&mut self) {
        self.cancel();
        self.height = ItemHeight::Unknown;
    }
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self::new(crate::DEFAULT_POLL_INTERVAL_MS)
    }
}
