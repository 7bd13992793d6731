use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request, header::HeaderName},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Identifier of one invocation, stored in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Propagates the caller's `x-request-id` (as set by Knative's activator or a
/// mesh sidecar) or mints a UUID v4, and echoes it on the response.
pub async fn with_request_id(mut req: Request<Body>, next: Next) -> Response {
    let rid = incoming_request_id(req.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(rid.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&rid) {
        res.headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    res
}

fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let usable = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    usable.then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn keeps_well_formed_ids() {
        assert_eq!(
            incoming_request_id(&headers(" abc-123 ")).as_deref(),
            Some("abc-123")
        );
    }

    #[test]
    fn ignores_blank_spaced_or_oversized_ids() {
        assert_eq!(incoming_request_id(&HeaderMap::new()), None);
        assert_eq!(incoming_request_id(&headers("")), None);
        assert_eq!(incoming_request_id(&headers("two words")), None);
        assert_eq!(incoming_request_id(&headers(&"x".repeat(129))), None);
    }
}
