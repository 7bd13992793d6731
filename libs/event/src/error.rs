use thiserror::Error;

/// Raised when a [`NormalizedEvent`](crate::NormalizedEvent) cannot be constructed.
///
/// This is the only failure the event model surfaces; every accessor on a built
/// event reports problems with the payload as `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event method must not be empty")]
    MissingMethod,
    #[error("event path must not be empty")]
    MissingPath,
}
