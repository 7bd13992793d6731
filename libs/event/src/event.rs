use std::fmt::{self, Display, Formatter};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use bytes::Bytes;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::body::Body;
use crate::error::EventError;
use crate::headers::Headers;
use crate::media_type::{ContentClass, MediaType, classify};
use crate::query;
use crate::source::Source;
use crate::xml;

const CONTENT_TYPE: &str = "content-type";
const DEFAULT_ENCODING: &str = "utf-8";

/// Platform-independent view of one HTTP-triggered invocation.
///
/// Built once by an adapter and read by function code. All fields are fixed after
/// construction; accessors derive their answers from the stored headers and body on
/// every call and hand back owned values.
///
/// ```
/// use mcf_event::NormalizedEvent;
/// use serde_json::json;
///
/// let event = NormalizedEvent::builder("post", "/api/users")
///     .header("Content-Type", "application/json")
///     .query_string("limit=10")
///     .body(json!({"name": "John", "age": 30}))
///     .build()
///     .unwrap();
///
/// assert_eq!(event.method(), "POST");
/// assert!(event.is_json());
/// assert_eq!(event.get_json(), Some(json!({"name": "John", "age": 30})));
/// assert_eq!(event.get_query_param("limit").as_deref(), Some("10"));
/// assert_eq!(event.get_xml(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct NormalizedEvent {
    method: String,
    path: String,
    headers: Headers,
    query_string: String,
    body: Body,
    source: Source,
}

/// Unvalidated serde shape, routed through the builder on deserialization.
#[derive(Deserialize)]
struct RawEvent {
    method: String,
    path: String,
    #[serde(default)]
    headers: Headers,
    #[serde(default)]
    query_string: String,
    #[serde(default)]
    body: Body,
    #[serde(default)]
    source: Source,
}

impl TryFrom<RawEvent> for NormalizedEvent {
    type Error = EventError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        NormalizedEvent::builder(raw.method, raw.path)
            .headers(raw.headers)
            .query_string(raw.query_string)
            .body(raw.body)
            .source(raw.source)
            .build()
    }
}

/// Assembles a [`NormalizedEvent`]; only `build` can fail.
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    method: String,
    path: String,
    headers: Headers,
    query_string: String,
    body: Body,
    source: Source,
}

impl EventBuilder {
    /// Replaces the header set.
    pub fn headers(mut self, headers: impl Into<Headers>) -> Self {
        self.headers = headers.into();
        self
    }

    /// Adds one header; a later call with the same name in any casing wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.source = source.into();
        self
    }

    pub fn build(self) -> Result<NormalizedEvent, EventError> {
        let method = self.method.trim();
        if method.is_empty() {
            return Err(EventError::MissingMethod);
        }
        if self.path.trim().is_empty() {
            return Err(EventError::MissingPath);
        }
        Ok(NormalizedEvent {
            method: method.to_ascii_uppercase(),
            path: self.path,
            headers: self.headers,
            query_string: self.query_string,
            body: self.body,
            source: self.source,
        })
    }
}

impl NormalizedEvent {
    pub fn builder(method: impl Into<String>, path: impl Into<String>) -> EventBuilder {
        EventBuilder {
            method: method.into(),
            path: path.into(),
            ..EventBuilder::default()
        }
    }

    /// Shorthand for an event without query string, body or source.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        headers: impl Into<Headers>,
    ) -> Result<Self, EventError> {
        Self::builder(method, path).headers(headers).build()
    }

    /// Uppercased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Raw, undecoded query string.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// The body exactly as the adapter supplied it.
    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn get_header_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get_header(name).unwrap_or(default)
    }

    /// Decoded query parameter. When a key repeats, the last occurrence wins.
    pub fn get_query_param(&self, name: &str) -> Option<String> {
        query::last_value(&self.query_string, name)
    }

    pub fn get_query_param_or(&self, name: &str, default: &str) -> String {
        self.get_query_param(name)
            .unwrap_or_else(|| default.to_string())
    }

    /// Every decoded value recorded for a repeated query key, in order.
    pub fn get_query_params(&self, name: &str) -> Vec<String> {
        query::all_values(&self.query_string, name)
    }

    /// All decoded query pairs in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        query::parse_pairs(&self.query_string)
    }

    /// Field from an `application/x-www-form-urlencoded` body, last occurrence wins.
    pub fn get_form_param(&self, name: &str) -> Option<String> {
        if !self.is_form_data() {
            return None;
        }
        query::last_value(self.body.as_utf8()?, name)
    }

    /// Every decoded field of a form body, in order.
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        match self.body.as_utf8() {
            Some(text) if self.is_form_data() => query::parse_pairs(text),
            _ => Vec::new(),
        }
    }

    /// Parsed `Content-Type` header, if present and well formed.
    pub fn media_type(&self) -> Option<MediaType> {
        self.get_header(CONTENT_TYPE).and_then(MediaType::parse)
    }

    /// The single MIME family the `Content-Type` header places this event in.
    pub fn content_class(&self) -> ContentClass {
        classify(self.get_header(CONTENT_TYPE))
    }

    /// `charset` parameter of the `Content-Type` header.
    pub fn charset(&self) -> Option<String> {
        self.media_type()
            .and_then(|media| media.charset().map(str::to_string))
    }

    pub fn is_json(&self) -> bool {
        self.content_class() == ContentClass::Json
    }

    pub fn is_xml(&self) -> bool {
        self.content_class() == ContentClass::Xml
    }

    pub fn is_form_data(&self) -> bool {
        self.content_class() == ContentClass::Form
    }

    pub fn is_multipart(&self) -> bool {
        self.content_class() == ContentClass::Multipart
    }

    /// True for declared non-textual payloads (images, audio, octet streams, unknown
    /// `application/*` subtypes). False when the header is missing.
    pub fn is_binary(&self) -> bool {
        self.content_class() == ContentClass::Binary
    }

    /// Body as JSON when the content type is JSON. Structured bodies are copied;
    /// text and bytes are decoded. Decode failures yield `None`.
    pub fn get_json(&self) -> Option<Value> {
        if !self.is_json() {
            return None;
        }
        match &self.body {
            Body::Structured(structured) => Some(structured.to_value()),
            Body::Text(text) => serde_json::from_str(text).ok(),
            Body::Bytes(bytes) => serde_json::from_slice(bytes).ok(),
            Body::Absent => None,
        }
    }

    /// Body parsed as XML and flattened (see [`xml::flatten`]) when the content type
    /// is XML and the body is text or UTF-8 bytes.
    pub fn get_xml(&self) -> Option<Value> {
        if !self.is_xml() {
            return None;
        }
        xml::flatten(self.body.as_utf8()?)
    }

    /// Raw bytes whenever the stored body is a byte sequence, whatever the declared
    /// content type, so multipart uploads are reachable too.
    pub fn get_binary(&self) -> Option<Bytes> {
        match &self.body {
            Body::Bytes(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// Body as UTF-8 text.
    pub fn get_text(&self) -> Option<String> {
        self.get_text_with_encoding(DEFAULT_ENCODING)
    }

    /// Body as text. Byte bodies are decoded with the WHATWG encoding named by
    /// `label`; text bodies are returned unchanged. Malformed input or an unknown
    /// label yields `None`.
    pub fn get_text_with_encoding(&self, label: &str) -> Option<String> {
        match &self.body {
            Body::Text(text) => Some(text.clone()),
            Body::Bytes(bytes) => decode_with_label(bytes, label),
            Body::Absent | Body::Structured(_) => None,
        }
    }

    /// Body as text using the `Content-Type` charset, falling back to UTF-8.
    pub fn get_text_from_charset(&self) -> Option<String> {
        let charset = self.charset();
        self.get_text_with_encoding(charset.as_deref().unwrap_or(DEFAULT_ENCODING))
    }

    /// Standard base64 of a byte body. Text bodies are returned unchanged.
    pub fn get_base64(&self) -> Option<String> {
        match &self.body {
            Body::Bytes(bytes) => Some(B64.encode(bytes)),
            Body::Text(text) => Some(text.clone()),
            Body::Absent | Body::Structured(_) => None,
        }
    }
}

/// The WHATWG table maps ASCII and Latin-1 labels to windows-1252, so those are
/// decoded here: ASCII rejects bytes above 0x7F and Latin-1 maps each byte to
/// U+0000..=U+00FF.
fn decode_with_label(bytes: &[u8], label: &str) -> Option<String> {
    let label = label.trim().to_ascii_lowercase().replace('_', "-");
    match label.as_str() {
        "ascii" | "us-ascii" => bytes
            .is_ascii()
            .then(|| bytes.iter().map(|&b| char::from(b)).collect()),
        "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" | "l1" => {
            Some(bytes.iter().map(|&b| char::from(b)).collect())
        }
        _ => Encoding::for_label(label.as_bytes())?
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned()),
    }
}

impl Display for NormalizedEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if !self.query_string.is_empty() {
            write!(f, "?{}", self.query_string)?;
        }
        Ok(())
    }
}
