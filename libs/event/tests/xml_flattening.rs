use mcf_event::NormalizedEvent;
use serde_json::Value;

fn xml(body: &str) -> Option<Value> {
    NormalizedEvent::builder("POST", "/xml")
        .header("Content-Type", "application/xml")
        .body(body)
        .build()
        .unwrap()
        .get_xml()
}

#[test]
fn nested_elements_become_objects() {
    let value = xml("<user><name>John</name><address><city>Oslo</city><zip>0150</zip></address></user>")
        .expect("xml");
    insta::assert_json_snapshot!(value, @r#"
    {
      "address": {
        "city": "Oslo",
        "zip": "0150"
      },
      "name": "John"
    }
    "#);
}

#[test]
fn repeated_siblings_become_arrays() {
    let value = xml("<cart><item>apple</item><item>pear</item><item>plum</item><owner>ana</owner></cart>")
        .expect("xml");
    insta::assert_json_snapshot!(value, @r#"
    {
      "item": [
        "apple",
        "pear",
        "plum"
      ],
      "owner": "ana"
    }
    "#);
}

#[test]
fn attributes_are_grouped() {
    let value = xml(r#"<order id="42" status="open"><line sku="A-1">2</line><note>rush &amp; wrap</note></order>"#)
        .expect("xml");
    insta::assert_json_snapshot!(value, @r#"
    {
      "@attributes": {
        "id": "42",
        "status": "open"
      },
      "line": {
        "@attributes": {
          "sku": "A-1"
        },
        "text": "2"
      },
      "note": "rush & wrap"
    }
    "#);
}

#[test]
fn mixed_content_keeps_text() {
    let value = xml("<msg>hello <b>world</b></msg>").expect("xml");
    insta::assert_json_snapshot!(value, @r#"
    {
      "b": "world",
      "text": "hello"
    }
    "#);
}

#[test]
fn non_xml_content_type_is_ignored() {
    let event = NormalizedEvent::builder("POST", "/xml")
        .header("Content-Type", "text/plain")
        .body("<user><name>John</name></user>")
        .build()
        .unwrap();
    assert_eq!(event.get_xml(), None);
}

#[test]
fn structured_body_is_not_xml() {
    let event = NormalizedEvent::builder("POST", "/xml")
        .header("Content-Type", "text/xml")
        .body(serde_json::json!({"name": "John"}))
        .build()
        .unwrap();
    assert_eq!(event.get_xml(), None);
}
