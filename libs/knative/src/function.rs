use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use mcf_event::NormalizedEvent;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Outcome of a liveness or readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Probe {
    pub healthy: bool,
    pub message: String,
}

impl Probe {
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            healthy: true,
            message: message.into(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: message.into(),
        }
    }
}

/// User function hosted by a runtime.
///
/// Only `handle` is required. The lifecycle hooks default to logging and the probes
/// report healthy.
#[async_trait]
pub trait Function: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn handle(&self, event: NormalizedEvent) -> anyhow::Result<FunctionOutput>;

    /// Called once before the runtime starts serving, with the process environment.
    fn start(&self, _config: &HashMap<String, String>) {
        info!(function = self.name(), "function starting");
    }

    /// Called once after the runtime stopped serving.
    fn stop(&self) {
        info!(function = self.name(), "function stopping");
    }

    fn alive(&self) -> Probe {
        Probe::healthy("Alive")
    }

    fn ready(&self) -> Probe {
        Probe::healthy("Ready")
    }
}

/// Value returned by a function, rendered into an HTTP response by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionOutput {
    /// Rendered as `application/json`.
    Json(Value),
    /// Rendered as `text/plain; charset=utf-8`.
    Text(String),
    Bytes {
        content_type: String,
        body: Bytes,
    },
    /// `204 No Content`.
    Empty,
}

impl From<Value> for FunctionOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) => FunctionOutput::Json(value),
            Value::String(text) => FunctionOutput::Text(text),
            Value::Null => FunctionOutput::Empty,
            scalar => FunctionOutput::Text(scalar.to_string()),
        }
    }
}

impl From<String> for FunctionOutput {
    fn from(value: String) -> Self {
        FunctionOutput::Text(value)
    }
}

impl From<&str> for FunctionOutput {
    fn from(value: &str) -> Self {
        FunctionOutput::Text(value.to_string())
    }
}

impl IntoResponse for FunctionOutput {
    fn into_response(self) -> Response {
        match self {
            FunctionOutput::Json(value) => Json(value).into_response(),
            FunctionOutput::Text(text) => text.into_response(),
            FunctionOutput::Bytes { content_type, body } => {
                let content_type = HeaderValue::from_str(&content_type)
                    .unwrap_or(HeaderValue::from_static("application/octet-stream"));
                ([(header::CONTENT_TYPE, content_type)], body).into_response()
            }
            FunctionOutput::Empty => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `500` response reporting a failed invocation.
pub fn error_response(err: &anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error: {err:#}"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_string(response: Response) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(FunctionOutput::from(json!(42)), FunctionOutput::Text("42".into()));
        assert_eq!(FunctionOutput::from(json!(true)), FunctionOutput::Text("true".into()));
        assert_eq!(FunctionOutput::from(json!(null)), FunctionOutput::Empty);
        assert_eq!(
            FunctionOutput::from(json!(["a"])),
            FunctionOutput::Json(json!(["a"]))
        );
    }

    #[tokio::test]
    async fn json_output_sets_content_type() {
        let response = FunctionOutput::Json(json!({"ok": true})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn bytes_output_falls_back_to_octet_stream() {
        let response = FunctionOutput::Bytes {
            content_type: "bad\nvalue".into(),
            body: Bytes::from_static(b"\x00\x01"),
        }
        .into_response();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn errors_render_as_plain_text_500() {
        let response = error_response(&anyhow::anyhow!("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Error: boom");
    }

    #[test]
    fn default_probes_are_healthy() {
        struct Noop;

        #[async_trait]
        impl Function for Noop {
            fn name(&self) -> &str {
                "noop"
            }

            async fn handle(&self, _event: NormalizedEvent) -> anyhow::Result<FunctionOutput> {
                Ok(FunctionOutput::Empty)
            }
        }

        assert_eq!(Noop.alive(), Probe::healthy("Alive"));
        assert_eq!(Noop.ready(), Probe::healthy("Ready"));
    }
}
