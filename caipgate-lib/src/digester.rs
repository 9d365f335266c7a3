//! Payload Digester
//!
//! Encodes and decodes request values of the form `"<algorithm>.<data>"`.
//! Payloads nest: the data of one layer may itself be an encoded payload,
//! e.g. `base64.<base64 of "json.{...}">`.
//!
//! Base64 uses the URL-safe alphabet without padding so encoded values can
//! travel in query strings and identifier paths. Decoding also accepts the
//! standard alphabet and padded input.
//!
//! # Example
//!
//! ```ignore
//! use caipgate_lib::digester::{self, Algorithm};
//! use serde_json::json;
//!
//! let inner = digester::encode(&json!({"chainId": "eip155:1"}), Algorithm::Json)?;
//! let outer = digester::encode(&json!(inner), Algorithm::Base64)?;
//! assert_eq!(digester::decode_recursive(&outer)?, json!({"chainId": "eip155:1"}));
//! ```

use crate::identifier::{Identifier, SpecName};
use crate::{GatewayError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Separator between the algorithm name and the data.
pub const ALGORITHM_DELIMITER: char = '.';

/// Keys copied verbatim into the CAIP subset.
const PASS_THROUGH_KEYS: [&str; 2] = ["address", "tokenId"];

/// Supported payload encodings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// URL-safe base64 of a UTF-8 string
    #[default]
    Base64,
    /// JSON text of any value
    Json,
}

impl Algorithm {
    /// Prefix used in the encoded form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "base64" => Ok(Self::Base64),
            "json" => Ok(Self::Json),
            other => Err(GatewayError::IncompatibleEncoding {
                algorithm: other.to_string(),
                data: String::new(),
            }),
        }
    }
}

/// Encode a value and prefix it with the algorithm name.
///
/// Base64 only accepts string values.
pub fn encode(value: &Value, algorithm: Algorithm) -> Result<String> {
    let data = match algorithm {
        Algorithm::Base64 => match value {
            Value::String(s) => URL_SAFE_NO_PAD.encode(s.as_bytes()),
            other => {
                return Err(GatewayError::EncodeFailed {
                    data: other.to_string(),
                    reason: "base64 encodes string values only".to_string(),
                })
            }
        },
        Algorithm::Json => {
            serde_json::to_string(value).map_err(|e| GatewayError::EncodeFailed {
                data: value.to_string(),
                reason: e.to_string(),
            })?
        }
    };
    Ok(format!("{algorithm}{ALGORITHM_DELIMITER}{data}"))
}

/// Decode one layer of a payload.
///
/// A string without the delimiter is returned unchanged. Otherwise the text
/// before the first delimiter must name a known algorithm.
pub fn decode(payload: &str) -> Result<Value> {
    let Some((prefix, data)) = payload.split_once(ALGORITHM_DELIMITER) else {
        return Ok(Value::String(payload.to_string()));
    };
    let algorithm = prefix
        .parse::<Algorithm>()
        .map_err(|_| GatewayError::IncompatibleEncoding {
            algorithm: prefix.to_string(),
            data: payload.to_string(),
        })?;
    let decode_failed = |reason: String| GatewayError::DecodeFailed {
        data: data.to_string(),
        reason,
    };
    match algorithm {
        Algorithm::Base64 => {
            let bytes = decode_base64_lenient(data).map_err(|e| decode_failed(e.to_string()))?;
            let text = String::from_utf8(bytes).map_err(|e| decode_failed(e.to_string()))?;
            Ok(Value::String(text))
        }
        Algorithm::Json => serde_json::from_str(data).map_err(|e| decode_failed(e.to_string())),
    }
}

fn decode_base64_lenient(data: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = data
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized)
}

/// Decode layers until the result is no longer a delimited string.
#[cfg_attr(feature = "tracing", tracing::instrument)]
pub fn decode_recursive(payload: &str) -> Result<Value> {
    let mut current = Value::String(payload.to_string());
    while let Value::String(s) = &current {
        if !s.contains(ALGORITHM_DELIMITER) {
            break;
        }
        current = decode(s)?;
    }
    Ok(current)
}

/// Recursively decode every string value of a map. Other values are kept.
pub fn decode_map(map: &Map<String, Value>) -> Result<Map<String, Value>> {
    map.iter()
        .map(|(key, value)| {
            let decoded = match value {
                Value::String(s) => decode_recursive(s)?,
                other => other.clone(),
            };
            Ok((key.clone(), decoded))
        })
        .collect()
}

/// Decode a flat parameter map and pick out its CAIP values.
///
/// Returns `(caip, full)`. Values under identifier spec names are parsed as
/// that spec and replaced by their structured JSON form in both maps. `address` and
/// `tokenId` are copied into the CAIP subset as they are.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(params)))]
pub fn select_caip_data(
    params: &Map<String, Value>,
) -> Result<(Map<String, Value>, Map<String, Value>)> {
    let mut full = decode_map(params)?;
    let mut caip = Map::new();
    for (key, value) in full.iter_mut() {
        if PASS_THROUGH_KEYS.contains(&key.as_str()) {
            caip.insert(key.clone(), value.clone());
        } else if let Ok(name) = key.parse::<SpecName>() {
            let structured = Identifier::from_value_as(value, name)?.to_json();
            *value = structured.clone();
            caip.insert(key.clone(), structured);
        }
    }
    Ok((caip, full))
}
