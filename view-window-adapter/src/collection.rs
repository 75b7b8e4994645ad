use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::{Bound, RangeBounds};
use core::sync::atomic::{AtomicUsize, Ordering};

use view_window::{Collection, CollectionChange, Splice};

/// Subscription to an [`ObservableVec`]; dropping it unsubscribes.
#[derive(Debug)]
pub struct Observer(Arc<AtomicUsize>);

impl Drop for Observer {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A `Vec` whose edits report themselves as [`CollectionChange::Mutated`] diffs.
///
/// Every editing method returns the change to hand to
/// `WindowingEngine::items_or_collection_changed`. Indices out of range are clamped, not
/// panicked on.
#[derive(Debug)]
pub struct ObservableVec<T> {
    items: Vec<T>,
    observers: Arc<AtomicUsize>,
}

impl<T> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::from_vec(Vec::new())
    }
}

/// A clone is a distinct collection with its own observers.
impl<T: Clone> Clone for ObservableVec<T> {
    fn clone(&self) -> Self {
        Self::from_vec(self.items.clone())
    }
}

impl<T> From<Vec<T>> for ObservableVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T> FromIterator<T> for ObservableVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> ObservableVec<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            observers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Live subscriptions.
    pub fn observers(&self) -> usize {
        self.observers.load(Ordering::Acquire)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn push(&mut self, item: T) -> CollectionChange {
        let index = self.items.len();
        self.items.push(item);
        self.mutated(alloc::vec![Splice::insert(index, 1)])
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) -> CollectionChange {
        let index = self.items.len();
        self.items.extend(items);
        let added = self.items.len() - index;
        self.mutated(alloc::vec![Splice::insert(index, added)])
    }

    pub fn insert(&mut self, index: usize, item: T) -> CollectionChange {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.mutated(alloc::vec![Splice::insert(index, 1)])
    }

    pub fn remove(&mut self, index: usize) -> Option<(T, CollectionChange)> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        Some((item, self.mutated(alloc::vec![Splice::remove(index, 1)])))
    }

    /// Replaces one item in place.
    pub fn set(&mut self, index: usize, item: T) -> Option<CollectionChange> {
        let slot = self.items.get_mut(index)?;
        *slot = item;
        Some(self.mutated(alloc::vec![Splice {
            index,
            removed: 1,
            added: 1,
        }]))
    }

    pub fn truncate(&mut self, len: usize) -> CollectionChange {
        let removed = self.items.len().saturating_sub(len);
        self.items.truncate(len);
        let splices = if removed > 0 {
            alloc::vec![Splice::remove(self.items.len(), removed)]
        } else {
            Vec::new()
        };
        self.mutated(splices)
    }

    pub fn clear(&mut self) -> CollectionChange {
        self.truncate(0)
    }

    pub fn splice(
        &mut self,
        range: impl RangeBounds<usize>,
        replace_with: impl IntoIterator<Item = T>,
    ) -> CollectionChange {
        let len = self.items.len();
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        }
        .clamp(start, len);

        self.items.splice(start..end, replace_with).for_each(drop);
        let removed = end - start;
        let added = self.items.len() + removed - len;
        self.mutated(alloc::vec![Splice {
            index: start,
            removed,
            added,
        }])
    }

    fn mutated(&self, splices: Vec<Splice>) -> CollectionChange {
        CollectionChange::Mutated {
            len: self.items.len(),
            splices,
        }
    }
}

impl<T> Collection for ObservableVec<T> {
    type Item = T;
    type Subscription = Observer;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    fn subscribe(&self) -> Observer {
        self.observers.fetch_add(1, Ordering::AcqRel);
        Observer(Arc::clone(&self.observers))
    }
}
