//! Payload commands - encode, decode and extract CAIP data

use anyhow::{bail, Result};
use caipgate_lib::digester::{self, Algorithm};
use serde_json::{Map, Value};

use crate::ui;

/// Encode `data`. With the JSON algorithm `data` is parsed as JSON when it
/// is valid JSON and taken as a string otherwise.
pub async fn encode(data: &str, algorithm: Algorithm) -> Result<()> {
    let value = match algorithm {
        Algorithm::Json => {
            serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_string()))
        }
        Algorithm::Base64 => Value::String(data.to_string()),
    };
    println!("{}", digester::encode(&value, algorithm)?);
    Ok(())
}

pub async fn decode(payload: &str) -> Result<()> {
    let value = digester::decode_recursive(payload)?;
    ui::json(&value);
    Ok(())
}

pub async fn select(pairs: &[String]) -> Result<()> {
    let params = parse_pairs(pairs)?;
    let (caip, full) = digester::select_caip_data(&params)?;
    tracing::debug!(caip = caip.len(), total = full.len(), "selected CAIP data");

    ui::header("CAIP data");
    ui::json(&Value::Object(caip));
    ui::header("Decoded params");
    ui::json(&Value::Object(full));
    Ok(())
}

/// Parse `key=value` arguments into a flat parameter map.
pub fn parse_pairs(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected key=value, got '{pair}'");
        };
        if key.is_empty() {
            bail!("empty key in '{pair}'");
        }
        params.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let pairs = vec!["chainId=eip155:1".to_string(), "memo=a=b".to_string()];
        let params = parse_pairs(&pairs).unwrap();
        assert_eq!(params["chainId"], "eip155:1");
        assert_eq!(params["memo"], "a=b");

        assert!(parse_pairs(&["chainId".to_string()]).is_err());
        assert!(parse_pairs(&["=1".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_commands_surface_errors() {
        assert!(decode("rot13.abc").await.is_err());
        assert!(encode("{\"a\":1}", Algorithm::Json).await.is_ok());
        assert!(select(&["chainId=eip155".to_string()]).await.is_err());
    }
}
