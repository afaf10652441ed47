use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of the `process_stdout` channel event. The `string` field carries
/// the text to display; no further schema is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    #[serde(default)]
    pub string: Option<Value>,
}

impl LogMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            string: Some(Value::String(text.into())),
        }
    }

    /// Display text of the payload. A missing or null `string` field falls
    /// back to the empty string; non-string values render as compact JSON.
    pub fn text(&self) -> String {
        match &self.string {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_of_string_payload() {
        let msg = LogMessage::from_json(r#"{"string":"frame 42 processed"}"#).unwrap();
        assert_eq!(msg.text(), "frame 42 processed");
    }

    #[test]
    fn missing_field_falls_back_to_empty() {
        let msg = LogMessage::from_json("{}").unwrap();
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn null_field_falls_back_to_empty() {
        let msg = LogMessage::from_json(r#"{"string":null}"#).unwrap();
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn non_string_payload_renders_as_json() {
        let msg = LogMessage::from_json(r#"{"string":42}"#).unwrap();
        assert_eq!(msg.text(), "42");

        let msg = LogMessage::from_json(r#"{"string":{"a":1}}"#).unwrap();
        assert_eq!(msg.text(), r#"{"a":1}"#);
    }

    #[test]
    fn json_round_trip() {
        let msg = LogMessage::new("hello");
        assert_eq!(LogMessage::from_json(&msg.to_json()).unwrap(), msg);
    }
}
