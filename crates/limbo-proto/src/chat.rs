//! Text components.
//!
//! Components are held as JSON and serialized either as a JSON string
//! (before 1.20.3) or as a nameless NBT tag (1.20.3 and later). From 1.21.5
//! the NBT form names its events in snake_case with typed fields.

use std::fmt;

use bytes::BufMut;
use limbo_nbt::{NbtCompound, NbtTag};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::codec::write_string;
use crate::error::ProtoError;

/// Wire representation of a text component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFormat {
    Json,
    Nbt,
    /// `click_event` / `hover_event` with `url`, `command` and `page`
    /// instead of a generic `value`.
    NbtSnakeEvents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Component(pub Value);

impl Component {
    /// A plain text component.
    pub fn text(text: impl Into<String>) -> Self {
        Component(json!({ "text": text.into() }))
    }

    pub fn empty() -> Self {
        Self::text("")
    }

    pub fn parse(s: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(s)
            .map(Component)
            .map_err(|e| ProtoError::JsonParse(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        self.0.to_string()
    }

    /// Append a child component to `extra`.
    pub fn push(&mut self, child: Component) {
        let Value::Object(map) = &mut self.0 else {
            let own = std::mem::replace(&mut self.0, Value::Null);
            self.0 = json!({ "text": "", "extra": [own, child.0] });
            return;
        };
        match map.get_mut("extra") {
            Some(Value::Array(extra)) => extra.push(child.0),
            _ => {
                map.insert("extra".into(), Value::Array(vec![child.0]));
            }
        }
    }

    /// Join components with a newline between each.
    pub fn join_lines<'a>(lines: impl IntoIterator<Item = &'a Component>) -> Component {
        let mut extra = Vec::new();
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                extra.push(json!({ "text": "\n" }));
            }
            extra.push(line.0.clone());
        }
        Component(json!({ "text": "", "extra": extra }))
    }

    pub fn to_nbt(&self) -> NbtTag {
        json_to_nbt(&self.0)
    }

    /// The component with its events in the 1.21.5 shape.
    pub fn with_snake_events(&self) -> Component {
        Component(snake_events(&self.0))
    }

    /// Write in the given wire format.
    pub fn write(&self, buf: &mut impl BufMut, format: ChatFormat) {
        match format {
            ChatFormat::Json => write_string(buf, &self.to_json()),
            ChatFormat::Nbt => limbo_nbt::write_nbt_nameless(buf, &self.to_nbt()),
            ChatFormat::NbtSnakeEvents => {
                limbo_nbt::write_nbt_nameless(buf, &self.with_snake_events().to_nbt())
            }
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Value> for Component {
    fn from(v: Value) -> Self {
        Component(v)
    }
}

fn snake_events(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(snake_events).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| match k.as_str() {
                    "clickEvent" => ("click_event".to_owned(), click_event(v)),
                    "hoverEvent" => ("hover_event".to_owned(), hover_event(v)),
                    _ => (k.clone(), snake_events(v)),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn click_event(event: &Value) -> Value {
    let action = event["action"].as_str().unwrap_or_default();
    let field = match action {
        "open_url" => "url",
        "run_command" | "suggest_command" => "command",
        "change_page" => "page",
        _ => "value",
    };
    let value = match (field, &event["value"]) {
        ("page", Value::String(s)) => s.parse::<i32>().map_or(json!(s), |n| json!(n)),
        (_, v) => v.clone(),
    };
    let mut out = Map::new();
    out.insert("action".into(), json!(action));
    out.insert(field.into(), value);
    Value::Object(out)
}

fn hover_event(event: &Value) -> Value {
    let action = event["action"].as_str().unwrap_or_default();
    let value = match (&event["contents"], &event["value"]) {
        (Value::Null, v) => v,
        (contents, _) => contents,
    };
    json!({ "action": action, "value": snake_events(value) })
}

fn json_to_nbt(value: &Value) -> NbtTag {
    match value {
        Value::Null => NbtTag::String(String::new()),
        Value::Bool(b) => NbtTag::Byte(*b as i8),
        Value::Number(n) => match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => NbtTag::Int(i as i32),
            Some(i) => NbtTag::Long(i),
            None => NbtTag::Double(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => NbtTag::String(s.clone()),
        Value::Array(items) => NbtTag::List(list_to_nbt(items)),
        Value::Object(map) => NbtTag::Compound(object_to_nbt(map)),
    }
}

fn object_to_nbt(map: &Map<String, Value>) -> NbtCompound {
    map.iter()
        .map(|(k, v)| (k.clone(), json_to_nbt(v)))
        .collect()
}

/// NBT lists are homogeneous. Mixed component lists (`extra`, `with`) get
/// every element promoted to a compound.
fn list_to_nbt(items: &[Value]) -> Vec<NbtTag> {
    let tags: Vec<NbtTag> = items.iter().map(json_to_nbt).collect();
    let homogeneous = tags
        .windows(2)
        .all(|w| w[0].id() == w[1].id());
    if homogeneous {
        return tags;
    }
    tags.into_iter()
        .map(|tag| match tag {
            NbtTag::Compound(c) => NbtTag::Compound(c),
            NbtTag::String(s) => {
                let mut c = NbtCompound::new();
                c.insert("text".into(), NbtTag::String(s));
                NbtTag::Compound(c)
            }
            other => {
                let mut c = NbtCompound::new();
                c.insert(String::new(), other);
                NbtTag::Compound(c)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn text_json() {
        let c = Component::text("Waiting Server");
        assert_eq!(c.to_json(), r#"{"text":"Waiting Server"}"#);
    }

    #[test]
    fn json_wire_format_is_string() {
        let mut buf = BytesMut::new();
        Component::text("a").write(&mut buf, ChatFormat::Json);
        assert_eq!(buf[0] as usize, buf.len() - 1);
        assert_eq!(&buf[1..], br#"{"text":"a"}"#);
    }

    #[test]
    fn nbt_conversion() {
        let c = Component(json!({"text": "hi", "bold": true, "color": "gold"}));
        let tag = c.to_nbt();
        let compound = tag.as_compound().unwrap();
        assert_eq!(compound["text"], NbtTag::String("hi".into()));
        assert_eq!(compound["bold"], NbtTag::Byte(1));
        assert_eq!(compound["color"], NbtTag::String("gold".into()));
    }

    #[test]
    fn nbt_wire_format_is_nameless() {
        let mut buf = BytesMut::new();
        Component(json!("plain")).write(&mut buf, ChatFormat::Nbt);
        assert_eq!(&buf[..], &[0x08, 0x00, 0x05, b'p', b'l', b'a', b'i', b'n']);
    }

    #[test]
    fn events_renamed_for_snake_format() {
        let c = Component(json!({
            "text": "",
            "extra": [
                {"text": "[Vote]", "clickEvent": {"action": "open_url", "value": "https://v"}},
                {"text": "[Next]", "clickEvent": {"action": "run_command", "value": "/next"},
                 "hoverEvent": {"action": "show_text", "contents": {"text": "go"}}},
            ]
        }));
        let snake = c.with_snake_events().0;
        let extra = snake["extra"].as_array().unwrap();
        assert_eq!(extra[0]["click_event"], json!({"action": "open_url", "url": "https://v"}));
        assert!(extra[0].get("clickEvent").is_none());
        assert_eq!(extra[1]["click_event"], json!({"action": "run_command", "command": "/next"}));
        assert_eq!(
            extra[1]["hover_event"],
            json!({"action": "show_text", "value": {"text": "go"}})
        );

        let mut old = BytesMut::new();
        c.write(&mut old, ChatFormat::Nbt);
        let mut new = BytesMut::new();
        c.write(&mut new, ChatFormat::NbtSnakeEvents);
        assert_ne!(old, new);
    }

    #[test]
    fn mixed_extra_promoted_to_compounds() {
        let c = Component(json!({"text": "", "extra": ["a", {"text": "b"}]}));
        let tag = c.to_nbt();
        let extra = tag.as_compound().unwrap()["extra"].as_list().unwrap();
        assert!(extra.iter().all(|t| t.id() == 10));
        assert_eq!(
            extra[0].as_compound().unwrap()["text"],
            NbtTag::String("a".into())
        );
    }

    #[test]
    fn push_appends_extra() {
        let mut c = Component::text("a");
        c.push(Component::text("b"));
        c.push(Component::text("c"));
        assert_eq!(c.0["extra"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn join_lines_inserts_newlines() {
        let joined = Component::join_lines([&Component::text("a"), &Component::text("b")]);
        let extra = joined.0["extra"].as_array().unwrap();
        assert_eq!(extra.len(), 3);
        assert_eq!(extra[1], json!({"text": "\n"}));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Component::parse("{not json").is_err());
        assert!(Component::parse(r#"{"text":"ok"}"#).is_ok());
    }
}
