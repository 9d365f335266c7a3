//! Integration tests for encoded payloads and CAIP data extraction.

use caipgate_lib::digester::{self, Algorithm};
use caipgate_lib::GatewayError;
use serde_json::{json, Map, Value};

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn test_layered_payload_unwraps() {
    let value = json!({"chainId": "eip155:1", "amount": 5});
    let json_layer = digester::encode(&value, Algorithm::Json).unwrap();
    let base64_layer = digester::encode(&json!(json_layer), Algorithm::Base64).unwrap();
    let outer = digester::encode(&json!(base64_layer), Algorithm::Base64).unwrap();

    assert!(outer.starts_with("base64."));
    assert_eq!(digester::decode_recursive(&outer).unwrap(), value);
    // One layer only
    assert_eq!(digester::decode(&outer).unwrap(), json!(base64_layer));
}

#[test]
fn test_algorithm_names() {
    assert_eq!("json".parse::<Algorithm>().unwrap(), Algorithm::Json);
    assert_eq!(Algorithm::default(), Algorithm::Base64);
    assert!(matches!(
        "hex".parse::<Algorithm>(),
        Err(GatewayError::IncompatibleEncoding { .. })
    ));
}

#[test]
fn test_select_caip_data() {
    let account = digester::encode(&json!("eip155:1:0xabc"), Algorithm::Base64).unwrap();
    let input = params(json!({
        "chainId": "eip155:1",
        "accountId": account,
        "address": "0xabc",
        "amount": "json.42",
        "memo": "rent",
    }));

    let (caip, full) = digester::select_caip_data(&input).unwrap();

    assert_eq!(
        caip,
        params(json!({
            "chainId": {"namespace": "eip155", "reference": "1"},
            "accountId": {"chainId": {"namespace": "eip155", "reference": "1"}, "address": "0xabc"},
            "address": "0xabc",
        }))
    );
    assert_eq!(full["amount"], json!(42));
    assert_eq!(full["memo"], json!("rent"));
    assert_eq!(full["accountId"], caip["accountId"]);
    assert!(!caip.contains_key("memo"));
}

#[test]
fn test_select_caip_data_rejects_bad_identifier() {
    let input = params(json!({"assetType": "eip155:1/erc20"}));
    assert!(matches!(
        digester::select_caip_data(&input),
        Err(GatewayError::MissingArgument(_))
    ));
}

#[test]
fn test_decode_map_propagates_errors() {
    let input = params(json!({"ok": "json.true", "bad": "zip.abc"}));
    assert!(matches!(
        digester::decode_map(&input),
        Err(GatewayError::IncompatibleEncoding { .. })
    ));

    let decoded = digester::decode_map(&params(json!({"n": 1, "flag": "json.true"}))).unwrap();
    assert_eq!(decoded["n"], json!(1));
    assert_eq!(decoded["flag"], json!(true));
}
