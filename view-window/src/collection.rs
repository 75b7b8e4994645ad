use alloc::vec::Vec;

/// One structural edit: `removed` items at `index` were replaced by `added` items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Splice {
    pub index: usize,
    pub removed: usize,
    pub added: usize,
}

impl Splice {
    pub fn insert(index: usize, added: usize) -> Self {
        Self {
            index,
            removed: 0,
            added,
        }
    }

    pub fn remove(index: usize, removed: usize) -> Self {
        Self {
            index,
            removed,
            added: 0,
        }
    }

    pub fn net(&self) -> isize {
        self.added as isize - self.removed as isize
    }
}

/// A change notification from the collection adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionChange {
    /// The source collection reference itself changed.
    Replaced { len: usize },
    /// The collection was edited in place.
    Mutated { len: usize, splices: Vec<Splice> },
}

impl CollectionChange {
    pub fn len(&self) -> usize {
        match self {
            Self::Replaced { len } | Self::Mutated { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Mutated { .. })
    }
}

/// How the window is reconciled after a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconcile {
    /// The collection did not grow: rebind the pool in place and skip the next scroll pass.
    Rebind,
    /// The collection grew: recompute, then reconcile as if scrolling down.
    ScrollDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangePlan {
    pub resubscribe: bool,
    pub reconcile: Reconcile,
    pub previous_len: usize,
    pub len: usize,
}

/// Decides, per change notification, how much of the window has to be recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectionChangeHandler {
    item_count: usize,
}

impl CollectionChangeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The item count as of the last handled change.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn plan(&mut self, change: &CollectionChange) -> ChangePlan {
        let previous_len = self.item_count;
        let len = change.len();
        self.item_count = len;
        ChangePlan {
            resubscribe: !change.is_mutation(),
            reconcile: if len > previous_len {
                Reconcile::ScrollDown
            } else {
                Reconcile::Rebind
            },
            previous_len,
            len,
        }
    }

    pub fn reset(&mut self) {
        self.item_count = 0;
    }
}
