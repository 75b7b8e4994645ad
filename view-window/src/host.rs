//! Contracts for the collaborators the engine drives but does not own.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::LoadMoreFn;

/// An externally owned, index-addressable sequence of items.
///
/// The engine only observes it. `subscribe` is called on attach and whenever the source is
/// replaced; dropping the returned value must stop change notifications.
pub trait Collection {
    type Item;
    type Subscription;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&Self::Item>;

    fn subscribe(&self) -> Self::Subscription;
}

impl<T> Collection for [T] {
    type Item = T;
    type Subscription = ();

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        <[T]>::get(self, index)
    }

    fn subscribe(&self) {}
}

impl<T> Collection for Vec<T> {
    type Item = T;
    type Subscription = ();

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn subscribe(&self) {}
}

impl<T> Collection for VecDeque<T> {
    type Item = T;
    type Subscription = ();

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    fn subscribe(&self) {}
}

/// Creates, binds and disposes view instances.
///
/// Binding is expected to be deterministic: binding the same view to the same index and item
/// twice must leave it in the same state.
pub trait ViewPool<T: ?Sized> {
    type View;

    fn create(&mut self) -> Self::View;

    fn bind(&mut self, view: &mut Self::View, index: usize, item: &T);

    /// The collection index the view currently represents.
    fn bound_index(&self, view: &Self::View) -> Option<usize>;

    fn dispose(&mut self, view: Self::View);
}

/// Measurement and scroll primitives of the host platform.
///
/// All values are pixel-equivalent units.
pub trait LayoutProbe {
    type View;

    fn viewport_height(&self) -> u32;

    /// Outer height of a rendered view; `0` while it is not laid out.
    fn element_height(&self, view: &Self::View) -> u32;

    fn scroll_offset(&self) -> u64;

    fn set_scroll_offset(&mut self, offset: u64);

    /// Distance from the top of the scrolled content to the top of the list.
    fn distance_to_top(&self) -> u64;

    fn set_buffer_heights(&mut self, top: u64, bottom: u64);

    /// Installs the scroll and resize listeners.
    fn listen(&mut self);

    fn unlisten(&mut self);
}

/// Resolves the scroll offset relative to the list for a particular container shape.
pub trait ScrollContainer<L: ?Sized> {
    fn offset_in_list(&self, layout: &L) -> u64;

    fn scroll_to_in_list(&self, layout: &mut L, offset_in_list: u64);
}

/// The list scrolls inside a plain container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListContainer;

impl<L: LayoutProbe + ?Sized> ScrollContainer<L> for ListContainer {
    fn offset_in_list(&self, layout: &L) -> u64 {
        layout.scroll_offset().saturating_sub(layout.distance_to_top())
    }

    fn scroll_to_in_list(&self, layout: &mut L, offset_in_list: u64) {
        let offset = offset_in_list.saturating_add(layout.distance_to_top());
        layout.set_scroll_offset(offset);
    }
}

/// Host-side lookup for named load-more targets.
pub trait HostContext {
    fn method(&self, name: &str) -> Option<LoadMoreFn>;

    fn evaluate(&self, expression: &str) -> Option<LoadMoreFn>;
}

/// The empty host context: nothing resolves.
impl HostContext for () {
    fn method(&self, _name: &str) -> Option<LoadMoreFn> {
        None
    }

    fn evaluate(&self, _expression: &str) -> Option<LoadMoreFn> {
        None
    }
}
