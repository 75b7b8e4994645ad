use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::LoadMoreRequest;

/// The host's load-more callback.
pub type LoadMoreFn = Arc<dyn Fn(LoadMoreRequest) -> LoadMoreReply + Send + Sync>;

/// What a load-more callback hands back.
#[derive(Clone, Debug)]
pub enum LoadMoreReply {
    /// Finished synchronously; the trigger is free again immediately.
    Done,
    /// The trigger stays held until the completion settles.
    Pending(Completion),
}

/// A settle-once signal shared between the host and the trigger.
#[derive(Clone, Debug, Default)]
pub struct Completion(Arc<AtomicBool>);

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settle(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_settled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone, Debug, Default)]
enum Guard {
    #[default]
    Idle,
    /// Waiting for the next microtask checkpoint.
    Queued(LoadMoreRequest),
    InFlight(Completion),
}

/// Fires the load-more callback at collection edges, one invocation at a time.
///
/// Attempts made while a previous invocation is queued or in flight are dropped, not queued.
#[derive(Clone, Default)]
pub struct InfiniteScrollTrigger {
    callback: Option<LoadMoreFn>,
    guard: Guard,
    invocations: u64,
}

impl InfiniteScrollTrigger {
    pub fn new(callback: Option<LoadMoreFn>) -> Self {
        Self {
            callback,
            guard: Guard::Idle,
            invocations: 0,
        }
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// How many times the callback has run.
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    pub fn is_pending(&self) -> bool {
        match &self.guard {
            Guard::Idle => false,
            Guard::Queued(_) => true,
            Guard::InFlight(completion) => !completion.is_settled(),
        }
    }

    /// Queues an invocation for the next microtask checkpoint.
    ///
    /// Returns `true` when the attempt was accepted.
    pub fn maybe_trigger(
        &mut self,
        is_at_top: bool,
        is_last_index: bool,
        force: bool,
        request: LoadMoreRequest,
    ) -> bool {
        if !(is_at_top || is_last_index || force) || self.callback.is_none() {
            return false;
        }
        self.reap_settled();
        if self.is_pending() {
            vtrace!(?request, "load-more dropped while pending");
            return false;
        }
        self.guard = Guard::Queued(request);
        true
    }

    /// Runs a queued invocation, if any.
    ///
    /// Returns `true` when the callback ran.
    pub fn run_deferred(&mut self) -> bool {
        let Guard::Queued(request) = self.guard else {
            self.reap_settled();
            return false;
        };
        let Some(callback) = self.callback.as_ref() else {
            self.guard = Guard::Idle;
            return false;
        };
        vdebug!(?request, "invoking load-more");
        self.invocations = self.invocations.saturating_add(1);
        self.guard = match callback(request) {
            LoadMoreReply::Done => Guard::Idle,
            LoadMoreReply::Pending(completion) if completion.is_settled() => Guard::Idle,
            LoadMoreReply::Pending(completion) => Guard::InFlight(completion),
        };
        true
    }

    pub fn cancel(&mut self) {
        self.guard = Guard::Idle;
    }

    fn reap_settled(&mut self) {
        if matches!(&self.guard, Guard::InFlight(completion) if completion.is_settled()) {
            self.guard = Guard::Idle;
        }
    }
}

impl core::fmt::Debug for InfiniteScrollTrigger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InfiniteScrollTrigger")
            .field("has_callback", &self.callback.is_some())
            .field("guard", &self.guard)
            .field("invocations", &self.invocations)
            .finish()
    }
}
