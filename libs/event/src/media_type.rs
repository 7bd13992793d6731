//! `Content-Type` parsing and MIME family classification.

use serde::{Deserialize, Serialize};

/// `application/*` subtypes that carry text even though they sit outside the
/// JSON/XML/form families.
const TEXTUAL_APPLICATION_SUBTYPES: &[&str] = &[
    "javascript",
    "ecmascript",
    "x-javascript",
    "yaml",
    "x-yaml",
    "toml",
    "graphql",
    "x-ndjson",
    "sql",
];

/// MIME family of a request payload, derived from its `Content-Type` header only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    Json,
    Xml,
    Form,
    Multipart,
    /// `text/*` or a known textual `application/*` subtype.
    Text,
    Binary,
    /// Header missing or not a `type/subtype` value.
    Unknown,
}

impl ContentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentClass::Json => "json",
            ContentClass::Xml => "xml",
            ContentClass::Form => "form",
            ContentClass::Multipart => "multipart",
            ContentClass::Text => "text",
            ContentClass::Binary => "binary",
            ContentClass::Unknown => "unknown",
        }
    }
}

/// A parsed `Content-Type` value: lowercased `type/subtype` plus its parameters.
///
/// ```
/// use mcf_event::{ContentClass, MediaType};
///
/// let media = MediaType::parse("Application/Problem+JSON; charset=UTF-8").unwrap();
/// assert_eq!(media.essence(), "application/problem+json");
/// assert_eq!(media.param("charset"), Some("UTF-8"));
/// assert_eq!(media.class(), ContentClass::Json);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    top: String,
    sub: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    /// Parses a header value. Returns `None` when the primary part is not of the form
    /// `type/subtype` with both halves non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut segments = raw.split(';');
        let essence = segments.next()?.trim().to_ascii_lowercase();
        let (top, sub) = essence.split_once('/')?;
        let (top, sub) = (top.trim(), sub.trim());
        if top.is_empty() || sub.is_empty() || sub.contains('/') {
            return None;
        }

        let params = segments
            .filter_map(|segment| {
                let (name, value) = segment.split_once('=')?;
                let name = name.trim().to_ascii_lowercase();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim().trim_matches('"').to_string();
                Some((name, value))
            })
            .collect();

        Some(Self {
            top: top.to_string(),
            sub: sub.to_string(),
            params,
        })
    }

    /// Top-level type, e.g. `application`.
    pub fn top_level(&self) -> &str {
        &self.top
    }

    /// Subtype including any structured suffix, e.g. `vnd.api+json`.
    pub fn subtype(&self) -> &str {
        &self.sub
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.top, self.sub)
    }

    /// Structured syntax suffix (`json` for `application/ld+json`).
    pub fn suffix(&self) -> Option<&str> {
        self.sub.rsplit_once('+').map(|(_, suffix)| suffix)
    }

    /// Parameter value by case-insensitive name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }

    pub fn boundary(&self) -> Option<&str> {
        self.param("boundary")
    }

    pub fn class(&self) -> ContentClass {
        let top = self.top.as_str();
        let sub = self.sub.as_str();
        match (top, sub) {
            ("application", "json") | ("text", "json") => ContentClass::Json,
            ("application", _) if self.suffix() == Some("json") => ContentClass::Json,
            ("application" | "text", "xml") => ContentClass::Xml,
            _ if self.suffix() == Some("xml") => ContentClass::Xml,
            ("application", "x-www-form-urlencoded") => ContentClass::Form,
            ("multipart", _) => ContentClass::Multipart,
            ("text", _) => ContentClass::Text,
            ("application", sub) if TEXTUAL_APPLICATION_SUBTYPES.contains(&sub) => {
                ContentClass::Text
            }
            _ => ContentClass::Binary,
        }
    }
}

/// Classifies an optional `Content-Type` header value.
pub fn classify(content_type: Option<&str>) -> ContentClass {
    content_type
        .and_then(MediaType::parse)
        .map(|media| media.class())
        .unwrap_or(ContentClass::Unknown)
}
