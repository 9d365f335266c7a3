//! Request envelopes and positional arguments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key marking a JSON object as an envelope the pipeline must process.
pub const FOR_SELECTION_KEY: &str = "forSelection";

/// Part of the envelope a selection searches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionSource {
    /// Search the whole envelope.
    #[default]
    None,
    /// Search the query parameters only.
    Params,
    /// Search the request body only.
    Body,
}

/// Inbound request data awaiting selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,
    /// Query parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl RequestEnvelope {
    /// Create an empty envelope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body.
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the query parameters.
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    /// Parse a JSON object carrying `"forSelection": true`.
    ///
    /// Returns `None` for any other value.
    pub fn from_marked(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.get(FOR_SELECTION_KEY) != Some(&Value::Bool(true)) {
            return None;
        }
        let section = |key: &str| object.get(key).and_then(Value::as_object).cloned();
        Some(Self {
            body: section("body"),
            params: section("params"),
        })
    }

    /// Search root for a selection source.
    ///
    /// A missing section yields an empty object.
    pub fn search_root(&self, source: SelectionSource) -> Value {
        match source {
            SelectionSource::None => serde_json::to_value(self).unwrap_or(Value::Null),
            SelectionSource::Params => Value::Object(self.params.clone().unwrap_or_default()),
            SelectionSource::Body => Value::Object(self.body.clone().unwrap_or_default()),
        }
    }
}

/// One positional argument of an adapter method call.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Argument {
    /// Request data the pipeline selects from.
    Envelope(RequestEnvelope),
    /// Already-shaped value passed through untouched.
    Value(Value),
    /// Slot not supplied by the caller.
    #[default]
    Absent,
}

impl Argument {
    /// Classify a JSON value: marked objects become envelopes and `null`
    /// becomes an absent slot.
    pub fn from_json(value: Value) -> Self {
        if let Some(envelope) = RequestEnvelope::from_marked(&value) {
            return Self::Envelope(envelope);
        }
        match value {
            Value::Null => Self::Absent,
            other => Self::Value(other),
        }
    }

    /// Returns true for an envelope.
    pub fn is_envelope(&self) -> bool {
        matches!(self, Self::Envelope(_))
    }

    /// Returns true for an absent slot.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Plain value of the argument; envelopes render as their JSON form.
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Envelope(envelope) => serde_json::to_value(envelope).unwrap_or(Value::Null),
            Self::Absent => Value::Null,
        }
    }
}

impl From<RequestEnvelope> for Argument {
    fn from(envelope: RequestEnvelope) -> Self {
        Self::Envelope(envelope)
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marked_object_is_envelope() {
        let arg = Argument::from_json(json!({
            "forSelection": true,
            "body": {"id": 1},
            "params": {"chainId": "eip155:1"}
        }));
        let Argument::Envelope(envelope) = arg else {
            panic!("expected envelope");
        };
        assert_eq!(envelope.body.unwrap()["id"], json!(1));
        assert_eq!(envelope.params.unwrap()["chainId"], json!("eip155:1"));
    }

    #[test]
    fn test_unmarked_values() {
        assert_eq!(
            Argument::from_json(json!({"body": {"id": 1}})),
            Argument::Value(json!({"body": {"id": 1}}))
        );
        assert_eq!(
            Argument::from_json(json!({"forSelection": false})),
            Argument::Value(json!({"forSelection": false}))
        );
        assert!(Argument::from_json(Value::Null).is_absent());
    }

    #[test]
    fn test_search_root() {
        let envelope = RequestEnvelope::new()
            .with_body(json!({"id": 1}).as_object().unwrap().clone());
        assert_eq!(envelope.search_root(SelectionSource::Body), json!({"id": 1}));
        assert_eq!(envelope.search_root(SelectionSource::Params), json!({}));
        assert_eq!(
            envelope.search_root(SelectionSource::None),
            json!({"body": {"id": 1}})
        );
    }
}
