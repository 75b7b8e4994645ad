use core::marker::PhantomData;

use view_window::ViewPool;

/// A headless view: the item it was last bound to, plus bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PooledView<T> {
    pub id: u64,
    pub index: Option<usize>,
    pub item: Option<T>,
    /// Times this particular view has been rebound.
    pub binds: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStats {
    pub created: u64,
    pub disposed: u64,
    pub binds: u64,
}

impl PoolStats {
    /// Views created and not yet disposed.
    pub fn live(&self) -> u64 {
        self.created.saturating_sub(self.disposed)
    }
}

/// A [`ViewPool`] that binds clones of the items and counts what it did.
#[derive(Clone, Debug)]
pub struct RecordingPool<T> {
    stats: PoolStats,
    _item: PhantomData<fn(&T)>,
}

impl<T> Default for RecordingPool<T> {
    fn default() -> Self {
        Self {
            stats: PoolStats::default(),
            _item: PhantomData,
        }
    }
}

impl<T> RecordingPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T: Clone> ViewPool<T> for RecordingPool<T> {
    type View = PooledView<T>;

    fn create(&mut self) -> PooledView<T> {
        self.stats.created += 1;
        PooledView {
            id: self.stats.created,
            index: None,
            item: None,
            binds: 0,
        }
    }

    fn bind(&mut self, view: &mut PooledView<T>, index: usize, item: &T) {
        self.stats.binds += 1;
        view.index = Some(index);
        view.item = Some(item.clone());
        view.binds += 1;
    }

    fn bound_index(&self, view: &PooledView<T>) -> Option<usize> {
        view.index
    }

    fn dispose(&mut self, _view: PooledView<T>) {
        self.stats.disposed += 1;
    }
}
