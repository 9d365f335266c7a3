//! Identifier commands - parse and match CAIP identifiers

use anyhow::Result;
use caipgate_lib::Identifier;

use crate::ui;

pub async fn parse(input: &str, verbose: bool) -> Result<()> {
    let id = Identifier::parse(input)?;
    tracing::debug!(kind = %id.kind(), "parsed identifier");

    ui::header("Identifier");
    ui::key_value("Kind", &id.kind().to_string());
    ui::key_value("Canonical", &id.format()?);
    ui::key_value("Chain", &id.chain_id_string()?);
    if let Some(address) = id.address() {
        ui::key_value("Address", address);
    }
    if let Some(asset_name) = id.asset_name() {
        ui::key_value("Asset", &asset_name.to_string());
    }
    if let Some(token_id) = id.token_id() {
        ui::key_value("Token", token_id);
    }
    if verbose {
        ui::key_value("Fragments", &id.to_fragments().join(" "));
    }

    println!();
    ui::json(&id.to_json());
    Ok(())
}

/// Returns whether the identifier matched.
pub async fn matches(input: &str, pattern: &str) -> Result<bool> {
    let id = Identifier::parse(input)?;
    let matched = id.match_pattern(pattern);
    if matched {
        ui::success(&format!("{input} matches {pattern}"));
    } else {
        ui::error(&format!("{input} does not match {pattern}"));
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_rejects_invalid() {
        assert!(parse("eip155:1:0x#", false).await.is_err());
        assert!(parse("eip155:1:0xabc", true).await.is_ok());
    }

    #[tokio::test]
    async fn test_matches() {
        assert!(matches("eip155:1:0xabc", "eip155:*:*").await.unwrap());
        assert!(!matches("eip155:1:0xabc", "cosmos:*:*").await.unwrap());
        assert!(matches("eip155", "*").await.is_err());
    }
}
