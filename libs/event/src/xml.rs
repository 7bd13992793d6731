//! Flattens an XML document into a JSON value.
//!
//! The root element is flattened and its tag is dropped:
//! `<user><name>John</name></user>` becomes `{"name": "John"}`. Text-only elements
//! collapse to their trimmed text, repeated siblings become arrays, attributes are
//! grouped under `"@attributes"` and mixed text lands under `"text"`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

const ATTRIBUTES_KEY: &str = "@attributes";
const TEXT_KEY: &str = "text";

#[derive(Default)]
struct Frame {
    name: String,
    attributes: Map<String, Value>,
    text: Vec<String>,
    children: Vec<(String, Value)>,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Option<Self> {
        let name = std::str::from_utf8(start.name().as_ref()).ok()?.to_string();
        let mut attributes = Map::new();
        for attr in start.attributes() {
            let attr = attr.ok()?;
            let key = std::str::from_utf8(attr.key.as_ref()).ok()?.to_string();
            let value = attr.unescape_value().ok()?.into_owned();
            attributes.insert(key, Value::String(value));
        }
        Some(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    fn push_text(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.text.push(text.to_string());
        }
    }

    fn finish(self) -> (String, Value) {
        let text = self.text.join(" ");
        if self.children.is_empty() && self.attributes.is_empty() && !text.is_empty() {
            return (self.name, Value::String(text));
        }

        let mut out = Map::new();
        if !self.attributes.is_empty() {
            out.insert(ATTRIBUTES_KEY.to_string(), Value::Object(self.attributes));
        }
        if !text.is_empty() {
            out.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        for (tag, value) in self.children {
            insert_child(&mut out, tag, value);
        }
        (self.name, Value::Object(out))
    }
}

fn insert_child(out: &mut Map<String, Value>, tag: String, value: Value) {
    match out.get_mut(&tag) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            out.insert(tag, value);
        }
    }
}

/// Parses `xml` and flattens its root element. Returns `None` for malformed input,
/// a document without a root element, or content after the root element.
///
/// ```
/// use serde_json::json;
///
/// let value = mcf_event::xml::flatten("<user><name>John</name></user>").unwrap();
/// assert_eq!(value, json!({"name": "John"}));
/// assert!(mcf_event::xml::flatten("<user><name>John</user>").is_none());
/// ```
pub fn flatten(xml: &str) -> Option<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if root.is_some() {
                    return None;
                }
                stack.push(Frame::open(&start)?);
            }
            Ok(Event::Empty(start)) => {
                if root.is_some() {
                    return None;
                }
                let (tag, value) = Frame::open(&start)?.finish();
                attach(&mut stack, &mut root, tag, value);
            }
            Ok(Event::End(_)) => {
                let (tag, value) = stack.pop()?.finish();
                attach(&mut stack, &mut root, tag, value);
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().ok()?;
                match stack.last_mut() {
                    Some(frame) => frame.push_text(&text),
                    None if text.trim().is_empty() => {}
                    None => return None,
                }
            }
            Ok(Event::CData(cdata)) => {
                let raw = cdata.into_inner();
                let text = std::str::from_utf8(&raw).ok()?;
                stack.last_mut()?.push_text(text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    if !stack.is_empty() {
        return None;
    }
    root
}

fn attach(stack: &mut [Frame], root: &mut Option<Value>, tag: String, value: Value) {
    match stack.last_mut() {
        Some(parent) => parent.children.push((tag, value)),
        None => *root = Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_document() {
        assert_eq!(
            flatten("<user><name>John</name><age>30</age></user>"),
            Some(json!({"name": "John", "age": "30"}))
        );
    }

    #[test]
    fn text_only_root_is_a_string() {
        assert_eq!(flatten("<greeting> hi </greeting>"), Some(json!("hi")));
    }

    #[test]
    fn empty_elements_become_empty_objects() {
        assert_eq!(flatten("<a><b/><c></c></a>"), Some(json!({"b": {}, "c": {}})));
    }

    #[test]
    fn entities_and_cdata_are_decoded() {
        assert_eq!(
            flatten("<a><b>Tom &amp; Jerry</b><c><![CDATA[<raw>]]></c></a>"),
            Some(json!({"b": "Tom & Jerry", "c": "<raw>"}))
        );
    }

    #[test]
    fn rejects_trailing_content_and_missing_root() {
        assert_eq!(flatten("<a/><b/>"), None);
        assert_eq!(flatten("<a/>junk"), None);
        assert_eq!(flatten(""), None);
        assert_eq!(flatten("just text"), None);
        assert_eq!(flatten("<a><b></a>"), None);
        assert_eq!(flatten("<a>"), None);
    }

    #[test]
    fn ignores_declaration_and_comments() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
            <!-- payload -->
            <order><id>7</id></order>"#;
        assert_eq!(flatten(doc), Some(json!({"id": "7"})));
    }
}
