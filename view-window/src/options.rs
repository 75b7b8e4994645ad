use alloc::string::String;
use alloc::sync::Arc;

use crate::{ConfigError, HostContext, LoadMoreFn, LoadMoreReply, LoadMoreRequest};

/// Extra views kept in the pool beyond two viewports' worth.
pub const DEFAULT_BUFFER_SIZE: usize = 5;

/// Period of the item-height poll while the representative view is not laid out.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Where the load-more callback comes from.
///
/// Named and expression targets are resolved once per attach against the host context and
/// never re-inspected per call.
#[derive(Clone)]
pub enum LoadMoreTarget {
    Callback(LoadMoreFn),
    NamedHostMethod(String),
    Expression(String),
}

impl LoadMoreTarget {
    pub(crate) fn resolve(&self, host: &dyn HostContext) -> Result<LoadMoreFn, ConfigError> {
        match self {
            Self::Callback(f) => Ok(Arc::clone(f)),
            Self::NamedHostMethod(name) => {
                host.method(name)
                    .ok_or_else(|| ConfigError::UnresolvedMethod { name: name.clone() })
            }
            Self::Expression(expression) => {
                host.evaluate(expression)
                    .ok_or_else(|| ConfigError::NotCallable {
                        expression: expression.clone(),
                    })
            }
        }
    }
}

impl core::fmt::Debug for LoadMoreTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::NamedHostMethod(name) => f.debug_tuple("NamedHostMethod").field(name).finish(),
            Self::Expression(src) => f.debug_tuple("Expression").field(src).finish(),
        }
    }
}

/// Configuration for [`crate::WindowingEngine`].
///
/// Cheap to clone: the callback, if any, lives behind an `Arc`.
#[derive(Clone)]
pub struct WindowOptions {
    /// Views kept beyond `elements_in_view * 2` to absorb small scroll jitters.
    pub buffer_size: usize,

    /// Retry period for measuring the item height while it is unknown.
    pub poll_interval_ms: u64,

    /// Optional infinite-scroll target, fired when the window reaches a collection edge.
    pub load_more: Option<LoadMoreTarget>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            load_more: None,
        }
    }
}

impl WindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn with_load_more(
        mut self,
        load_more: Option<impl Fn(LoadMoreRequest) -> LoadMoreReply + Send + Sync + 'static>,
    ) -> Self {
        self.load_more = load_more.map(|f| LoadMoreTarget::Callback(Arc::new(f)));
        self
    }

    /// Resolves the callback by name from the host context at attach time.
    pub fn with_load_more_method(mut self, name: impl Into<String>) -> Self {
        self.load_more = Some(LoadMoreTarget::NamedHostMethod(name.into()));
        self
    }

    /// Has the host context evaluate `expression` at attach time.
    pub fn with_load_more_expression(mut self, expression: impl Into<String>) -> Self {
        self.load_more = Some(LoadMoreTarget::Expression(expression.into()));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl core::fmt::Debug for WindowOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("buffer_size", &self.buffer_size)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("load_more", &self.load_more)
            .finish()
    }
}
