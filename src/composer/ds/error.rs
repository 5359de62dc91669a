use thiserror::Error;

/// Errors raised by the composer. Every operation here is a synchronous,
/// pure computation, so each of these is a programming error at the call
/// site and is surfaced immediately.
#[derive(Debug, Error)]
pub enum ClassError {
    /// A compose source was neither a member bag nor a callable. The
    /// message names the offending value.
    #[error("cannot apply properties of {0}")]
    InvalidSource(String),
    /// A value passed to `use_value` was not callable.
    #[error("cannot use {0} as a plugin")]
    InvalidPlugin(String),
    /// A super reference was invoked but no ancestor member of that name
    /// exists in the chain.
    #[error("no superior method '{0}' in the ancestor chain")]
    NoSuperMethod(String),
    /// A member was invoked as a method but is missing or holds data.
    #[error("'{0}' is not a callable member")]
    NotCallable(String),
}
