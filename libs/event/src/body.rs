use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Structured payload already decoded by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    Map(Map<String, Value>),
    List(Vec<Value>),
}

impl Structured {
    /// Owned JSON copy of the payload.
    pub fn to_value(&self) -> Value {
        match self {
            Structured::Map(map) => Value::Object(map.clone()),
            Structured::List(items) => Value::Array(items.clone()),
        }
    }
}

impl From<Structured> for Value {
    fn from(value: Structured) -> Self {
        match value {
            Structured::Map(map) => Value::Object(map),
            Structured::List(items) => Value::Array(items),
        }
    }
}

/// Request payload in the representation the adapter received it.
///
/// ```
/// use mcf_event::Body;
/// use serde_json::json;
///
/// assert_eq!(Body::from(json!({"a": 1})).kind(), "structured");
/// assert_eq!(Body::from("hello"), Body::Text("hello".into()));
/// assert_eq!(Body::from(json!(null)), Body::Absent);
/// assert_eq!(Body::from(json!(30)), Body::Text("30".into()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Absent,
    Bytes(Bytes),
    Text(String),
    Structured(Structured),
}

impl Body {
    pub fn is_absent(&self) -> bool {
        matches!(self, Body::Absent)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Body::Absent => "absent",
            Body::Bytes(_) => "bytes",
            Body::Text(_) => "text",
            Body::Structured(_) => "structured",
        }
    }

    /// Text view of the payload when it is text or UTF-8 bytes.
    pub(crate) fn as_utf8(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            Body::Absent | Body::Structured(_) => None,
        }
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Body::Bytes(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(value))
    }
}

impl From<&[u8]> for Body {
    fn from(value: &[u8]) -> Self {
        Body::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Text(value.to_string())
    }
}

impl From<Map<String, Value>> for Body {
    fn from(value: Map<String, Value>) -> Self {
        Body::Structured(Structured::Map(value))
    }
}

impl From<Vec<Value>> for Body {
    fn from(value: Vec<Value>) -> Self {
        Body::Structured(Structured::List(value))
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Body::Absent,
            Value::String(text) => Body::Text(text),
            Value::Array(items) => Body::Structured(Structured::List(items)),
            Value::Object(map) => Body::Structured(Structured::Map(map)),
            scalar @ (Value::Bool(_) | Value::Number(_)) => Body::Text(scalar.to_string()),
        }
    }
}

impl<T: Into<Body>> From<Option<T>> for Body {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Wire form: `{"kind": "...", "value": ...}` with bytes as standard base64.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum WireBody {
    Absent,
    Bytes(String),
    Text(String),
    Structured(Value),
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Body::Absent => WireBody::Absent,
            Body::Bytes(bytes) => WireBody::Bytes(B64.encode(bytes)),
            Body::Text(text) => WireBody::Text(text.clone()),
            Body::Structured(structured) => WireBody::Structured(structured.to_value()),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match WireBody::deserialize(deserializer)? {
            WireBody::Absent => Ok(Body::Absent),
            WireBody::Bytes(encoded) => B64
                .decode(encoded.as_bytes())
                .map(|raw| Body::Bytes(Bytes::from(raw)))
                .map_err(D::Error::custom),
            WireBody::Text(text) => Ok(Body::Text(text)),
            WireBody::Structured(Value::Object(map)) => Ok(map.into()),
            WireBody::Structured(Value::Array(items)) => Ok(items.into()),
            WireBody::Structured(other) => Err(D::Error::custom(format!(
                "structured body must be an object or array, got {other}"
            ))),
        }
    }
}
