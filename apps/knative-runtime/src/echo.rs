use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as B64};
use mcf_event::{Body, ContentClass, NormalizedEvent};
use mcf_knative::{ERROR_HEADER, Function, FunctionOutput};
use serde_json::{Map, Value, json};

/// Replies with a JSON description of the event it received.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoFunction;

#[async_trait]
impl Function for EchoFunction {
    fn name(&self) -> &str {
        "echo"
    }

    async fn handle(&self, event: NormalizedEvent) -> anyhow::Result<FunctionOutput> {
        let query: Vec<Value> = event
            .query_pairs()
            .into_iter()
            .map(|(key, value)| json!([key, value]))
            .collect();

        let mut summary = json!({
            "method": event.method(),
            "path": event.path(),
            "source": event.source().as_str(),
            "query": query,
            "content_class": event.content_class().as_str(),
            "body": materialize(&event),
        });
        if let Some(reason) = event.get_header(ERROR_HEADER) {
            summary["error"] = Value::String(reason.to_string());
        }
        Ok(FunctionOutput::Json(summary))
    }
}

/// Body in the richest form its content type allows.
fn materialize(event: &NormalizedEvent) -> Value {
    let parsed = match event.content_class() {
        ContentClass::Json => event.get_json(),
        ContentClass::Xml => event.get_xml(),
        ContentClass::Form => Some(Value::Object(
            event
                .form_pairs()
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect::<Map<_, _>>(),
        )),
        _ => None,
    };
    if let Some(value) = parsed {
        return value;
    }

    match event.body() {
        Body::Absent => Value::Null,
        Body::Text(text) => Value::String(text.clone()),
        Body::Structured(structured) => structured.to_value(),
        Body::Bytes(bytes) => match event.get_text_from_charset() {
            Some(text) if !event.is_binary() => Value::String(text),
            _ => json!({ "base64": B64.encode(bytes) }),
        },
    }
}
