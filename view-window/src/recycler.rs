use alloc::collections::VecDeque;

use crate::{Collection, ScrollDirection, ViewPool, Window};

/// The live pool of views, ordered by bound index.
///
/// Views are moved from the trailing edge to the leading edge and rebound in place; they
/// are only created or disposed when the pool is resized.
#[derive(Clone, Debug)]
pub struct ViewRecycler<V> {
    views: VecDeque<V>,
}

impl<V> Default for ViewRecycler<V> {
    fn default() -> Self {
        Self {
            views: VecDeque::new(),
        }
    }
}

impl<V> ViewRecycler<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn first(&self) -> Option<&V> {
        self.views.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.views.iter()
    }

    pub fn first_bound_index<T: ?Sized, P: ViewPool<T, View = V>>(
        &self,
        pool: &P,
    ) -> Option<usize> {
        self.views.front().and_then(|v| pool.bound_index(v))
    }

    pub fn last_bound_index<T: ?Sized, P: ViewPool<T, View = V>>(&self, pool: &P) -> Option<usize> {
        self.views.back().and_then(|v| pool.bound_index(v))
    }

    /// Resizes the pool to `count` views and rebinds them to `first..first + count`.
    pub fn rebind_all<C, P>(&mut self, pool: &mut P, items: &C, first: usize, count: usize)
    where
        C: Collection + ?Sized,
        P: ViewPool<C::Item, View = V>,
    {
        while self.views.len() > count {
            if let Some(view) = self.views.pop_back() {
                pool.dispose(view);
            }
        }
        while self.views.len() < count {
            self.views.push_back(pool.create());
        }
        for (offset, view) in self.views.iter_mut().enumerate() {
            bind(pool, items, view, first + offset);
        }
    }

    /// Moves up to `requested` views towards `direction` and updates `window.first_index`.
    ///
    /// Stops at the collection boundary and returns the number of positions actually moved.
    /// When the move spans the whole pool, every view is rebound once instead of cycling.
    pub fn move_views<C, P>(
        &mut self,
        pool: &mut P,
        items: &C,
        window: &mut Window,
        requested: usize,
        direction: ScrollDirection,
    ) -> usize
    where
        C: Collection + ?Sized,
        P: ViewPool<C::Item, View = V>,
    {
        let len = self.views.len();
        let available = match direction {
            ScrollDirection::Down => items.len().saturating_sub(window.first_index + len),
            ScrollDirection::Up => window.first_index,
            ScrollDirection::None => 0,
        };
        let count = requested.min(available);
        if count == 0 {
            return 0;
        }

        if count >= len {
            window.first_index = match direction {
                ScrollDirection::Up => window.first_index - count,
                _ => window.first_index + count,
            };
            let first = window.first_index;
            for (offset, view) in self.views.iter_mut().enumerate() {
                bind(pool, items, view, first + offset);
            }
            vtrace!(count, "rebound whole pool");
            return count;
        }

        for _ in 0..count {
            match direction {
                ScrollDirection::Down => {
                    let index = window.first_index + len;
                    let Some(mut view) = self.views.pop_front() else {
                        break;
                    };
                    bind(pool, items, &mut view, index);
                    self.views.push_back(view);
                    window.first_index += 1;
                }
                _ => {
                    let index = window.first_index - 1;
                    let Some(mut view) = self.views.pop_back() else {
                        break;
                    };
                    bind(pool, items, &mut view, index);
                    self.views.push_front(view);
                    window.first_index -= 1;
                }
            }
        }
        count
    }

    /// Disposes every view.
    pub fn release<T: ?Sized, P: ViewPool<T, View = V>>(&mut self, pool: &mut P) {
        for view in self.views.drain(..) {
            pool.dispose(view);
        }
    }
}

fn bind<C, P, V>(pool: &mut P, items: &C, view: &mut V, index: usize)
where
    C: Collection + ?Sized,
    P: ViewPool<C::Item, View = V>,
{
    match items.get(index) {
        Some(item) => pool.bind(view, index, item),
        None => {
            vwarn!(index, len = items.len(), "rebind past the end of the collection");
        }
    }
}
