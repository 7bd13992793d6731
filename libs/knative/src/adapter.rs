use std::error::Error as StdError;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use bytes::Bytes;
use http::{HeaderMap, Request, request::Parts};
use http_body_util::LengthLimitError;
use mcf_event::{Body as EventBody, EventError, Headers, NormalizedEvent, Source};
use tracing::{debug, error, warn};

/// Default cap on buffered request bodies (10 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Header carrying the reason when an adapter had to give up on a request.
pub const ERROR_HEADER: &str = "x-error";

/// Content types whose bodies are handed to functions as text.
const TEXTUAL_PREFIXES: &[&str] = &[
    "text/",
    "application/json",
    "application/xml",
    "application/x-www-form-urlencoded",
    "multipart/",
];

/// Translates a platform request into a [`NormalizedEvent`].
///
/// Transport problems do not surface as errors: the adapter returns an event carrying
/// an [`ERROR_HEADER`] instead, so the function still runs and can report it. Only an
/// event that cannot be constructed at all is an `Err`.
#[async_trait]
pub trait EventAdapter: Send + Sync {
    async fn adapt(&self, req: Request<Body>) -> Result<NormalizedEvent, EventError>;
}

/// Adapter for Knative Serving HTTP requests.
#[derive(Debug, Clone)]
pub struct KnativeAdapter {
    body_limit: usize,
}

impl Default for KnativeAdapter {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl KnativeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body_limit(body_limit: usize) -> Self {
        Self { body_limit }
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }
}

#[async_trait]
impl EventAdapter for KnativeAdapter {
    async fn adapt(&self, req: Request<Body>) -> Result<NormalizedEvent, EventError> {
        let (parts, body) = req.into_parts();
        match to_bytes(body, self.body_limit).await {
            Ok(bytes) => adapt_parts(&parts, bytes),
            Err(err) if exceeds_limit(&err) => {
                warn!(limit = self.body_limit, "knative request body exceeds limit");
                fallback_event(&parts, format!("Payload too large: {err}"))
            }
            Err(err) => {
                error!(error = %err, "connection error while receiving knative request");
                fallback_event(&parts, format!("Connection error: {err}"))
            }
        }
    }
}

/// Builds the event from already-buffered request parts.
///
/// Header values must be UTF-8; otherwise the event only carries the
/// [`ERROR_HEADER`] describing the failure.
pub fn adapt_parts(parts: &Parts, body: Bytes) -> Result<NormalizedEvent, EventError> {
    let headers = match decode_headers(&parts.headers) {
        Ok(headers) => headers,
        Err(err) => {
            error!(error = %err, "encoding error in knative request headers");
            return fallback_event(parts, format!("Encoding error: {err}"));
        }
    };

    let body = convert_body(body, headers.get("content-type").unwrap_or(""));
    debug!(
        method = %parts.method,
        path = %parts.uri.path(),
        body = body.kind(),
        "adapted knative request"
    );

    NormalizedEvent::builder(parts.method.as_str(), request_path(parts))
        .headers(headers)
        .query_string(parts.uri.query().unwrap_or(""))
        .body(body)
        .source(Source::Knative)
        .build()
}

/// Chooses the body variant for raw request bytes.
///
/// Empty bodies are absent. Textual content types are decoded as UTF-8 and fall back
/// to bytes when decoding fails; everything else stays bytes.
pub fn convert_body(body: Bytes, content_type: &str) -> EventBody {
    if body.is_empty() {
        return EventBody::Absent;
    }

    let content_type = content_type.trim().to_ascii_lowercase();
    if !TEXTUAL_PREFIXES
        .iter()
        .any(|prefix| content_type.starts_with(prefix))
    {
        return EventBody::Bytes(body);
    }

    match std::str::from_utf8(&body) {
        Ok(text) => EventBody::Text(text.to_string()),
        Err(err) => {
            warn!(
                error = %err,
                content_type = %content_type,
                "failed to decode text content as UTF-8, keeping as bytes"
            );
            EventBody::Bytes(body)
        }
    }
}

fn decode_headers(map: &HeaderMap) -> Result<Headers, std::str::Utf8Error> {
    let mut headers = Headers::new();
    for (name, value) in map {
        let value = std::str::from_utf8(value.as_bytes())?;
        headers.insert(name.as_str(), value);
    }
    Ok(headers)
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err as &(dyn StdError + 'static));
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

fn request_path(parts: &Parts) -> &str {
    match parts.uri.path() {
        "" => "/",
        path => path,
    }
}

fn fallback_event(parts: &Parts, reason: String) -> Result<NormalizedEvent, EventError> {
    NormalizedEvent::builder(parts.method.as_str(), request_path(parts))
        .header(ERROR_HEADER, reason)
        .source(Source::Knative)
        .build()
}
