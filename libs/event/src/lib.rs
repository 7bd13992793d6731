//! Normalized event model for HTTP-triggered multicloud functions.
//!
//! Platform adapters translate a native invocation into a [`NormalizedEvent`]; function
//! code then reads headers, query parameters and the body through accessors that never
//! fail on payload content. A missing or malformed payload is reported as `None`.
//! Classification is driven by the `Content-Type` header alone.
pub mod body;
pub mod error;
pub mod event;
pub mod headers;
pub mod media_type;
pub mod query;
pub mod source;
pub mod xml;

pub use body::{Body, Structured};
pub use error::EventError;
pub use event::{EventBuilder, NormalizedEvent};
pub use headers::Headers;
pub use media_type::{ContentClass, MediaType, classify};
pub use source::Source;
