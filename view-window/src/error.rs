use alloc::string::String;

/// Setup errors surfaced by [`crate::WindowingEngine::attach`].
///
/// These are detected once per attach and never retried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("load-more target `{name}` does not name a method on the host context")]
    UnresolvedMethod { name: String },
    #[error("load-more expression `{expression}` does not evaluate to a callable")]
    NotCallable { expression: String },
    #[error("height poll interval must be greater than zero")]
    ZeroPollInterval,
}
