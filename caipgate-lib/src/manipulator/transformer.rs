//! Transformers reshape a selection into the value handed to the method.

use super::selector::{SelectorOutput, SINGLE_SELECTION_KEY};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type TransformFn = dyn Fn(&SelectorOutput) -> Result<Value> + Send + Sync;

/// Template for [`Transformer::to_object`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectTemplate {
    /// Copy the selection value under this key.
    Key(String),
    /// Build a list from the templates.
    Array(Vec<ObjectTemplate>),
    /// Build a nested object from the templates.
    Object(BTreeMap<String, ObjectTemplate>),
}

impl ObjectTemplate {
    fn render(&self, source: &SelectorOutput) -> Value {
        match self {
            Self::Key(key) => source.get(key).cloned().unwrap_or(Value::Null),
            Self::Array(items) => Value::Array(items.iter().map(|t| t.render(source)).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, t)| (name.clone(), t.render(source)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// A selection-to-value function.
#[derive(Clone)]
pub struct Transformer(Arc<TransformFn>);

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transformer").finish()
    }
}

impl Transformer {
    /// Wrap a function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&SelectorOutput) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Apply to a selection.
    pub fn apply(&self, output: &SelectorOutput) -> Result<Value> {
        (self.0)(output)
    }

    /// Default transformer: unwrap a single selection, otherwise pass the
    /// keyed selection through as an object.
    pub fn auto() -> Self {
        Self::from_fn(|output| {
            Ok(match output {
                SelectorOutput::Single(value) => value.clone().unwrap_or(Value::Null),
                keyed => keyed.to_value(),
            })
        })
    }

    /// Take one value. `None` takes the single-selection value.
    pub fn to_value(key: Option<&str>) -> Self {
        let key = key.unwrap_or(SINGLE_SELECTION_KEY).to_string();
        Self::from_fn(move |output| Ok(output.get(&key).cloned().unwrap_or(Value::Null)))
    }

    /// Build an object from a template. Without a template the selection is
    /// returned as an object.
    pub fn to_object(template: Option<BTreeMap<String, ObjectTemplate>>) -> Self {
        Self::from_fn(move |output| {
            Ok(match &template {
                Some(fields) => ObjectTemplate::Object(fields.clone()).render(output),
                None => output.to_value(),
            })
        })
    }

    /// Build an array of the values under `keys`.
    pub fn to_array<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Self::from_fn(move |output| {
            Ok(Value::Array(
                keys.iter()
                    .map(|key| output.get(key).cloned().unwrap_or(Value::Null))
                    .collect(),
            ))
        })
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::auto()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyed() -> SelectorOutput {
        SelectorOutput::Keyed(
            [
                ("firstName", Some(json!("Sonoo"))),
                ("lastName", Some(json!("Jaiswal"))),
                ("age", Some(json!(27))),
                ("address", Some(json!({"city": "Ghaziabad"}))),
                ("karma", None),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }

    #[test]
    fn test_to_value() {
        let output = keyed();
        assert_eq!(Transformer::to_value(Some("firstName")).apply(&output).unwrap(), json!("Sonoo"));
        assert_eq!(Transformer::to_value(Some("karma")).apply(&output).unwrap(), Value::Null);
        assert_eq!(
            Transformer::to_value(Some("address")).apply(&output).unwrap(),
            json!({"city": "Ghaziabad"})
        );
        let single = SelectorOutput::Single(Some(json!("Agent")));
        assert_eq!(Transformer::to_value(None).apply(&single).unwrap(), json!("Agent"));
    }

    #[test]
    fn test_to_object() {
        let template: BTreeMap<String, ObjectTemplate> = serde_json::from_value(json!({
            "age": "age",
            "name": {"firstName": "firstName", "lastName": "lastName"},
            "tags": ["firstName", {"years": "age"}]
        }))
        .unwrap();
        assert_eq!(
            Transformer::to_object(Some(template)).apply(&keyed()).unwrap(),
            json!({
                "age": 27,
                "name": {"firstName": "Sonoo", "lastName": "Jaiswal"},
                "tags": ["Sonoo", {"years": 27}]
            })
        );
        assert_eq!(
            Transformer::to_object(None).apply(&keyed()).unwrap(),
            keyed().to_value()
        );
    }

    #[test]
    fn test_to_array() {
        assert_eq!(
            Transformer::to_array(["age", "firstName"]).apply(&keyed()).unwrap(),
            json!([27, "Sonoo"])
        );
    }

    #[test]
    fn test_auto() {
        let auto = Transformer::auto();
        assert_eq!(auto.apply(&SelectorOutput::Single(Some(json!(5)))).unwrap(), json!(5));
        assert_eq!(auto.apply(&SelectorOutput::Single(None)).unwrap(), Value::Null);
        assert_eq!(auto.apply(&keyed()).unwrap()["age"], json!(27));
    }
}
