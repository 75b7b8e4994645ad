//! Host-side helpers for the `view-window` crate.
//!
//! The `view-window` engine is headless: it drives collaborators through traits and never
//! owns a clock. This crate provides framework-neutral implementations of those
//! collaborators, useful for tests, demos and as a template for real adapters:
//!
//! - `ObservableVec`, a collection that reports its edits as diffs
//! - `RecordingPool`, a view pool that binds item clones and counts its work
//! - `SimLayout`, a simulated scroll container, plus `TableBodyContainer`
//!   for layouts implementing `TableLayout`
//! - `HostLoop`, a single-threaded event loop (frames, timers, microtasks)
//!
//! This crate is intentionally framework-agnostic (no DOM/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod collection;
mod host;
mod layout;
mod pool;


pub use collection::{ObservableVec, Observer};
pub use host::{HostLoop, SimEngine, TickReport};
pub use layout::{SimLayout, TableBodyContainer, TableLayout};
pub use pool::{PoolStats, PooledView, RecordingPool};
