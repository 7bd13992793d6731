//! Binary-mode CloudEvents delivered by Knative Eventing.
//!
//! The payload travels as the HTTP body and the context attributes as `ce-*` headers,
//! so the request is adapted exactly like a plain HTTP call and the attributes are
//! read back from the event's headers.

use axum::body::Body;
use http::Request;
use mcf_event::{EventError, NormalizedEvent};
use serde::{Deserialize, Serialize};

use crate::adapter::EventAdapter;

/// CloudEvents context attributes carried in `ce-*` headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudEventAttributes {
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "specversion")]
    pub spec_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(
        default,
        rename = "datacontenttype",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_content_type: Option<String>,
}

impl CloudEventAttributes {
    /// Reads the attributes from an event's headers. `None` unless `ce-id`,
    /// `ce-source`, `ce-type` and `ce-specversion` are all present.
    pub fn from_event(event: &NormalizedEvent) -> Option<Self> {
        let header = |name: &str| event.get_header(name).map(str::to_string);
        Some(Self {
            id: header("ce-id")?,
            source: header("ce-source")?,
            event_type: header("ce-type")?,
            spec_version: header("ce-specversion")?,
            subject: header("ce-subject"),
            time: header("ce-time"),
            data_content_type: header("content-type"),
        })
    }
}

/// Adapts a CloudEvent request, returning the event and its attributes when the
/// request carries them.
pub async fn adapt_cloud_event<A: EventAdapter + ?Sized>(
    adapter: &A,
    req: Request<Body>,
) -> Result<(NormalizedEvent, Option<CloudEventAttributes>), EventError> {
    let event = adapter.adapt(req).await?;
    let attributes = CloudEventAttributes::from_event(&event);
    Ok((event, attributes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_core_attributes() {
        let partial = NormalizedEvent::new(
            "POST",
            "/",
            [("ce-id", "1"), ("ce-source", "/orders"), ("ce-type", "order.created")],
        )
        .unwrap();
        assert_eq!(CloudEventAttributes::from_event(&partial), None);

        let full = NormalizedEvent::new(
            "POST",
            "/",
            [
                ("Ce-Id", "1"),
                ("Ce-Source", "/orders"),
                ("Ce-Type", "order.created"),
                ("Ce-Specversion", "1.0"),
                ("Content-Type", "application/json"),
            ],
        )
        .unwrap();
        let attributes = CloudEventAttributes::from_event(&full).expect("attributes");
        assert_eq!(attributes.event_type, "order.created");
        assert_eq!(attributes.data_content_type.as_deref(), Some("application/json"));
        assert_eq!(attributes.subject, None);
    }
}
