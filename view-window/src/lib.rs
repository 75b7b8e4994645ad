//! A headless view-recycling window for virtual scrolling.
//!
//! For host-side utilities (an observable collection, a simulated layout, a frame loop), see
//! the `view-window-adapter` crate.
//!
//! The engine renders only the items near the viewport using a fixed pool of reusable views.
//! Everything outside the window is represented by two spacer heights, so the scrollbar and
//! the scroll position behave as if the whole collection were laid out. Items are assumed to
//! share one height, measured once from a representative view.
//!
//! It is UI-agnostic. A host layer is expected to provide:
//! - a [`Collection`] to observe
//! - a [`ViewPool`] that creates and binds views
//! - a [`LayoutProbe`] for measurements, scroll offsets and spacer heights
//! - the event loop: scroll/resize events, animation frames, timers and microtasks
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod collection;
mod direction;
mod engine;
mod error;
mod estimator;
mod host;
mod options;
mod recycler;
mod sizer;
mod state;
mod trigger;
mod types;

#[cfg(test)]
mod tests;

pub use collection::{ChangePlan, CollectionChange, CollectionChangeHandler, Reconcile, Splice};
pub use direction::{Classification, ScrollDirectionTracker};
pub use engine::WindowingEngine;
pub use error::ConfigError;
pub use estimator::SizeEstimator;
pub use host::{Collection, HostContext, LayoutProbe, ListContainer, ScrollContainer, ViewPool};
pub use options::{DEFAULT_BUFFER_SIZE, DEFAULT_POLL_INTERVAL_MS, LoadMoreTarget, WindowOptions};
pub use recycler::ViewRecycler;
pub use sizer::{BufferSizer, Sizing};
pub use state::{EngineSnapshot, ScrollState, TickPhase};
pub use trigger::{Completion, InfiniteScrollTrigger, LoadMoreFn, LoadMoreReply};
pub use types::{ItemHeight, LoadMoreRequest, ScrollDirection, Window};
