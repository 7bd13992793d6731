//! Knative Serving integration for multicloud functions.
//!
//! [`KnativeAdapter`] turns an incoming HTTP request into a
//! [`NormalizedEvent`](mcf_event::NormalizedEvent), [`Function`] is the contract a
//! hosted function implements, and [`FunctionOutput`] renders its result.

pub mod adapter;
pub mod cloud_event;
pub mod function;

pub use adapter::{
    DEFAULT_BODY_LIMIT, ERROR_HEADER, EventAdapter, KnativeAdapter, adapt_parts, convert_body,
};
pub use cloud_event::{CloudEventAttributes, adapt_cloud_event};
pub use function::{Function, FunctionOutput, Probe, error_response};
