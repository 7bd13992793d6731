use axum::body::Body;
use bytes::Bytes;
use http::{HeaderValue, Request};
use mcf_event::{Body as EventBody, Source};
use mcf_knative::{
    CloudEventAttributes, ERROR_HEADER, EventAdapter, KnativeAdapter, adapt_cloud_event,
};
use serde_json::json;

fn request(method: &str, uri: &str) -> http::request::Builder {
    Request::builder().method(method).uri(uri)
}

#[tokio::test]
async fn get_request_with_query() {
    let req = request("GET", "/items?page=2&tag=a&tag=b")
        .header("Accept", "application/json")
        .body(Body::empty())
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert_eq!(event.method(), "GET");
    assert_eq!(event.path(), "/items");
    assert_eq!(event.query_string(), "page=2&tag=a&tag=b");
    assert_eq!(event.get_query_param("page").as_deref(), Some("2"));
    assert_eq!(event.get_query_params("tag"), vec!["a", "b"]);
    assert_eq!(event.get_header("accept"), Some("application/json"));
    assert_eq!(event.body(), &EventBody::Absent);
    assert_eq!(event.source(), &Source::Knative);
}

#[tokio::test]
async fn json_post_is_text_and_parses() {
    let req = request("POST", "/users")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"name":"Ana","age":31}"#))
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert!(event.is_json());
    assert_eq!(event.body(), &EventBody::Text(r#"{"name":"Ana","age":31}"#.into()));
    assert_eq!(event.get_json(), Some(json!({"name": "Ana", "age": 31})));
}

#[tokio::test]
async fn malformed_json_keeps_text() {
    let req = request("POST", "/")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert_eq!(event.get_json(), None);
    assert_eq!(event.get_text().as_deref(), Some("{not json"));
}

#[tokio::test]
async fn form_post_exposes_fields() {
    let req = request("POST", "/submit")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from("name=Ana+Lima&city=S%C3%A3o+Paulo"))
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert!(event.is_form_data());
    assert_eq!(event.get_form_param("name").as_deref(), Some("Ana Lima"));
    assert_eq!(event.get_form_param("city").as_deref(), Some("São Paulo"));
}

#[tokio::test]
async fn multipart_stays_text() {
    let payload = "--xyz\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n--xyz--\r\n";
    let req = request("POST", "/upload")
        .header("Content-Type", "multipart/form-data; boundary=xyz")
        .body(Body::from(payload))
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert!(event.is_multipart());
    assert_eq!(event.get_text().as_deref(), Some(payload));
}

#[tokio::test]
async fn image_upload_stays_binary() {
    let png = Bytes::from_static(b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR");
    let req = request("PUT", "/avatar")
        .header("Content-Type", "image/png")
        .body(Body::from(png.clone()))
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert!(event.is_binary());
    assert_eq!(event.get_binary(), Some(png));
    assert_eq!(event.get_text(), None);
}

#[tokio::test]
async fn unicode_text_survives() {
    let text = "héllo wörld ✓ 日本";
    let req = request("POST", "/echo")
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Body::from(text))
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert_eq!(event.get_text().as_deref(), Some(text));
    assert_eq!(event.charset().as_deref(), Some("utf-8"));
}

#[tokio::test]
async fn oversized_body_becomes_payload_error() {
    let req = request("POST", "/big")
        .header("Content-Type", "text/plain")
        .body(Body::from("0123456789"))
        .unwrap();

    let event = KnativeAdapter::with_body_limit(4).adapt(req).await.unwrap();

    assert_eq!(event.method(), "POST");
    assert_eq!(event.path(), "/big");
    assert!(
        event
            .get_header(ERROR_HEADER)
            .is_some_and(|reason| reason.starts_with("Payload too large: "))
    );
    assert_eq!(event.body(), &EventBody::Absent);
    assert_eq!(event.get_header("content-type"), None);
}

#[tokio::test]
async fn non_utf8_header_becomes_encoding_error() {
    let req = request("POST", "/latin1")
        .header("X-Name", HeaderValue::from_bytes(b"caf\xe9").unwrap())
        .body(Body::from("ignored"))
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert!(
        event
            .get_header(ERROR_HEADER)
            .is_some_and(|reason| reason.starts_with("Encoding error: "))
    );
    assert_eq!(event.get_header("x-name"), None);
    assert_eq!(event.body(), &EventBody::Absent);
}

#[tokio::test]
async fn method_is_uppercased_and_root_path_kept() {
    let req = request("DELETE", "http://svc.default.example.com")
        .body(Body::empty())
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert_eq!(event.method(), "DELETE");
    assert_eq!(event.path(), "/");
    assert_eq!(event.to_string(), "DELETE /");
}

#[tokio::test]
async fn cloud_event_attributes_are_read_from_headers() {
    let req = request("POST", "/")
        .header("Content-Type", "application/json")
        .header("ce-id", "a1")
        .header("ce-source", "/orders")
        .header("ce-type", "order.created")
        .header("ce-specversion", "1.0")
        .header("ce-subject", "order/42")
        .body(Body::from(r#"{"id":42}"#))
        .unwrap();

    let (event, attributes) = adapt_cloud_event(&KnativeAdapter::new(), req).await.unwrap();

    assert_eq!(event.get_json(), Some(json!({"id": 42})));
    assert_eq!(
        attributes,
        Some(CloudEventAttributes {
            id: "a1".into(),
            source: "/orders".into(),
            event_type: "order.created".into(),
            spec_version: "1.0".into(),
            subject: Some("order/42".into()),
            time: None,
            data_content_type: Some("application/json".into()),
        })
    );
}

#[tokio::test]
#[tracing_test::traced_test]
async fn undecodable_text_is_logged() {
    let req = request("POST", "/")
        .header("Content-Type", "text/plain")
        .body(Body::from(vec![0xffu8, 0xfe, 0x41]))
        .unwrap();

    let event = KnativeAdapter::new().adapt(req).await.unwrap();

    assert_eq!(
        event.body(),
        &EventBody::Bytes(Bytes::from_static(&[0xff, 0xfe, 0x41]))
    );
    assert!(logs_contain("failed to decode text content as UTF-8"));
}
