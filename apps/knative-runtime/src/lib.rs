//! HTTP runtime hosting one [`Function`] behind Knative Serving.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Extension, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use mcf_knative::{EventAdapter, Function, KnativeAdapter, Probe, error_response};
use tracing::{Instrument, error, info, info_span};

pub mod config;
pub mod echo;
mod reqid;

pub use config::RuntimeConfig;
pub use echo::EchoFunction;
pub use reqid::{REQUEST_ID_HEADER, RequestId, with_request_id};

#[derive(Clone)]
pub struct RuntimeState {
    pub adapter: Arc<dyn EventAdapter>,
    pub function: Arc<dyn Function>,
}

impl RuntimeState {
    pub fn new(function: Arc<dyn Function>, max_body_bytes: usize) -> Self {
        Self {
            adapter: Arc::new(KnativeAdapter::with_body_limit(max_body_bytes)),
            function,
        }
    }
}

/// Functions compiled into the runtime, selected by `FUNCTION_NAME`.
pub fn function_by_name(name: &str) -> Option<Arc<dyn Function>> {
    match name {
        "echo" => Some(Arc::new(EchoFunction)),
        _ => None,
    }
}

pub fn build_router(state: RuntimeState) -> Router {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .fallback(invoke)
        .layer(middleware::from_fn(with_request_id))
        .with_state(state)
}

async fn liveness(State(state): State<RuntimeState>) -> Response {
    probe_response(state.function.alive())
}

async fn readiness(State(state): State<RuntimeState>) -> Response {
    probe_response(state.function.ready())
}

fn probe_response(probe: Probe) -> Response {
    let status = if probe.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, probe.message).into_response()
}

async fn invoke(
    State(state): State<RuntimeState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    req: Request<Body>,
) -> Response {
    let span = info_span!(
        "invoke",
        function = state.function.name(),
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    );

    async move {
        let event = match state.adapter.adapt(req).await {
            Ok(event) => event,
            Err(err) => {
                error!(error = %err, "request could not be adapted");
                return (StatusCode::BAD_REQUEST, format!("Error: {err}")).into_response();
            }
        };

        match state.function.handle(event).await {
            Ok(output) => {
                let response = output.into_response();
                info!(status = %response.status(), "function invoked");
                response
            }
            Err(err) => {
                error!(error = %err, "function failed");
                error_response(&err)
            }
        }
    }
    .instrument(span)
    .await
}
