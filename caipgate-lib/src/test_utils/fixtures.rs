//! Identifier and envelope fixtures.

use crate::manipulator::RequestEnvelope;
use serde_json::{Map, Value};

/// Ethereum mainnet chain id.
pub const MAINNET: &str = "eip155:1";

/// Account on Ethereum mainnet.
pub const ACCOUNT: &str = "eip155:1:0xab16a96d359ec26a11e2c2b3d8f8b8942d5bfcdb";

/// ERC-20 asset type on Ethereum mainnet.
pub const ASSET_TYPE: &str = "eip155:1/erc20:0x6b175474e89094c44da98b954eedeac495271d0f";

/// ERC-721 token on Ethereum mainnet.
pub const ASSET_ID: &str =
    "eip155:1/erc721:0x06012c8cf97BEaD5deAe237070F9587f8E7A266d/771769";

/// Valid identifiers of every kind.
pub const VALID_IDENTIFIERS: &[&str] = &[MAINNET, ACCOUNT, ASSET_TYPE, ASSET_ID];

/// Identifiers that fail validation.
pub const INVALID_IDENTIFIERS: &[&str] = &[
    "eip155",
    "eip155:#",
    "EIP155:1",
    "eip155:1:0x#",
    "eip155:1/erc,:0xabc",
    "a:b:c:d:e:f",
];

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Envelope with the given body. Non-object values give an empty body.
pub fn envelope(body: Value) -> RequestEnvelope {
    RequestEnvelope::new().with_body(as_map(body))
}

/// Envelope with the given query parameters.
pub fn params_envelope(params: Value) -> RequestEnvelope {
    RequestEnvelope::new().with_params(as_map(params))
}
