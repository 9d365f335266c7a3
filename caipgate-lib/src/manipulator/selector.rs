//! Breadth-first property selection.
//!
//! A selector name is a key, or a dotted path of keys (`studies.college.name`)
//! matched against successively deeper objects. The search is breadth-first,
//! so the shallowest match wins and ties go to the key that appears first.
//! Arrays are searched with their indices as keys.

use super::envelope::{RequestEnvelope, SelectionSource, FOR_SELECTION_KEY};
use crate::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};

/// Output key of a single-name selection.
pub const SINGLE_SELECTION_KEY: &str = "__default__";

/// Keys never descended into.
const IGNORED_KEYS: &[&str] = &[FOR_SELECTION_KEY];

/// What to select from an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    /// One name.
    Name(String),
    /// Several names, each becoming an output key.
    Names(Vec<String>),
    /// Output key to source name.
    Paths(BTreeMap<String, String>),
}

impl SelectorSpec {
    /// Build from a JSON string, array of strings or object of strings.
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|_| GatewayError::UnsupportedSelectorSpec(value.to_string()))
    }

    /// Shorthand for a list of names.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// Shorthand for an output-key to source-name map.
    pub fn paths<I, K, V>(paths: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Paths(
            paths
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for SelectorSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for SelectorSpec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Vec<&str>> for SelectorSpec {
    fn from(names: Vec<&str>) -> Self {
        Self::names(names)
    }
}

/// Result of a selection. Unresolved names are explicit `None`s.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectorOutput {
    /// Result of a single-name selection.
    Single(Option<Value>),
    /// Results keyed by name or output key.
    Keyed(BTreeMap<String, Option<Value>>),
}

impl SelectorOutput {
    /// Value under `key`. A single selection answers to
    /// [`SINGLE_SELECTION_KEY`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Single(value) if key == SINGLE_SELECTION_KEY => value.as_ref(),
            Self::Single(_) => None,
            Self::Keyed(values) => values.get(key).and_then(Option::as_ref),
        }
    }

    /// JSON object form; unresolved names become `null`.
    pub fn to_value(&self) -> Value {
        let object: Map<String, Value> = match self {
            Self::Single(value) => [(
                SINGLE_SELECTION_KEY.to_string(),
                value.clone().unwrap_or(Value::Null),
            )]
            .into_iter()
            .collect(),
            Self::Keyed(values) => values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().unwrap_or(Value::Null)))
                .collect(),
        };
        Value::Object(object)
    }
}

fn children(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(object) => object.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Find the first value matching a dotted name, breadth-first.
///
/// Each visited object may advance the path by at most one segment.
pub fn find_property(root: &Value, name: &str) -> Option<Value> {
    let segments: Vec<&str> = name.split('.').collect();
    let mut cursor = 0;
    let mut queue = VecDeque::from([root]);

    while let Some(chunk) = queue.pop_front() {
        let mut advanced = false;
        for (key, value) in children(chunk) {
            if !advanced && key == segments[cursor] {
                advanced = true;
                cursor += 1;
                if cursor == segments.len() {
                    return Some(value.clone());
                }
            }
            if (value.is_object() || value.is_array()) && !IGNORED_KEYS.contains(&key.as_str())
            {
                queue.push_back(value);
            }
        }
    }
    None
}

/// Select from an envelope.
pub fn select(
    envelope: &RequestEnvelope,
    spec: &SelectorSpec,
    source: SelectionSource,
) -> SelectorOutput {
    select_from(&envelope.search_root(source), spec)
}

/// Select from an arbitrary JSON root.
pub fn select_from(root: &Value, spec: &SelectorSpec) -> SelectorOutput {
    match spec {
        SelectorSpec::Name(name) => SelectorOutput::Single(find_property(root, name)),
        SelectorSpec::Names(names) => SelectorOutput::Keyed(
            names
                .iter()
                .map(|name| (name.clone(), find_property(root, name)))
                .collect(),
        ),
        SelectorSpec::Paths(paths) => SelectorOutput::Keyed(
            paths
                .iter()
                .map(|(key, name)| (key.clone(), find_property(root, name)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn student() -> Value {
        json!({
            "firstName": "Sonoo",
            "lastName": "Jaiswal",
            "age": 27,
            "address": {
                "streetAddress": "Plot-6, Mohan Nagar",
                "city": "Ghaziabad",
                "state": "UP",
                "postalCode": "201007"
            },
            "studies": {
                "college": {
                    "department": {"name": "Mechatronics", "year": 2022},
                    "student": {"name": "Sonoo", "age": 29}
                }
            }
        })
    }

    #[test]
    fn test_find_property() {
        let root = student();
        let cases = [
            ("firstName", Some(json!("Sonoo"))),
            ("age", Some(json!(27))),
            ("state", Some(json!("UP"))),
            ("studies.college.name", Some(json!("Mechatronics"))),
            ("studies.college.age", Some(json!(29))),
            ("student.age", Some(json!(29))),
            ("agri", None),
            ("student.agri", None),
        ];
        for (name, expected) in cases {
            assert_eq!(find_property(&root, name), expected, "{name}");
        }
    }

    #[test]
    fn test_siblings_do_not_chain() {
        let root = json!({"a": 1, "b": 2});
        assert_eq!(find_property(&root, "a.b"), None);
    }

    #[test]
    fn test_arrays_are_searched() {
        let root = json!({"txs": [{"hash": "0x1"}, {"hash": "0x2"}]});
        assert_eq!(find_property(&root, "hash"), Some(json!("0x1")));
        assert_eq!(find_property(&root, "txs.1"), Some(json!({"hash": "0x2"})));
    }

    #[test]
    fn test_for_selection_is_not_descended() {
        let root = json!({"forSelection": {"id": 1}});
        assert_eq!(find_property(&root, "id"), None);
    }

    #[test]
    fn test_select_names_and_paths() {
        let root = student();
        let output = select_from(&root, &SelectorSpec::names(["firstName", "age", "state"]));
        assert_eq!(
            output.to_value(),
            json!({"firstName": "Sonoo", "age": 27, "state": "UP"})
        );

        let output = select_from(
            &root,
            &SelectorSpec::paths([("name", "firstName"), ("from", "state"), ("age", "age")]),
        );
        assert_eq!(output.to_value(), json!({"name": "Sonoo", "from": "UP", "age": 27}));
    }

    #[test]
    fn test_absent_is_explicit() {
        let output = select_from(&student(), &SelectorSpec::names(["agri"]));
        let SelectorOutput::Keyed(values) = &output else {
            panic!("expected keyed output");
        };
        assert_eq!(values.get("agri"), Some(&None));
        assert_eq!(output.to_value(), json!({"agri": null}));
    }

    #[test]
    fn test_select_by_source() {
        let envelope = RequestEnvelope::new()
            .with_body(json!({"id": 1}).as_object().unwrap().clone())
            .with_params(json!({"id": 2}).as_object().unwrap().clone());
        assert_eq!(
            select(&envelope, &"id".into(), SelectionSource::Params),
            SelectorOutput::Single(Some(json!(2)))
        );
        assert_eq!(
            select(&envelope, &"id".into(), SelectionSource::Body),
            SelectorOutput::Single(Some(json!(1)))
        );
    }

    #[test]
    fn test_unsupported_spec() {
        let err = SelectorSpec::from_value(&json!(42)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Selection against the spec is not supported, spec: 42"
        );
        assert_eq!(
            SelectorSpec::from_value(&json!(["id", "hash"])).unwrap(),
            SelectorSpec::names(["id", "hash"])
        );
    }
}
