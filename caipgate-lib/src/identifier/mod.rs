//! Chain-Agnostic Identifiers
//!
//! Parsing, validation, formatting and pattern matching of CAIP-2 chain ids,
//! CAIP-10 account ids and CAIP-19 asset types and asset ids.
//!
//! # Wire Form
//!
//! `:` joins sibling leaves within one composite and `/` joins composites:
//!
//! ```text
//! eip155:1                                   chainId
//! eip155:1:0xab16a96d359ec26a11e2c2b3d8f8b894 accountId
//! eip155:1/erc721:0x06012c8cf97bead5deae237   assetType
//! eip155:1/erc721:0x06012c8cf97bead5deae237/7 assetId
//! ```
//!
//! # Example
//!
//! ```ignore
//! use caipgate_lib::identifier::Identifier;
//!
//! let id = Identifier::parse("eip155:1:0xabc")?;
//! assert_eq!(id.kind(), IdentifierKind::AccountId);
//! assert!(id.match_pattern("eip155:*:0xabc"));
//! ```

mod input;
pub mod spec;

pub use input::{Component, IdentifierInput, RawIdentifierObject};
pub use spec::{
    spec, spec_by_name, IdentifierSpec, LeafSpec, SpecName, ValidationOptions, WILDCARD,
};

use crate::{GatewayError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Split on the composite delimiter `/`.
pub fn split_on_slash(s: &str) -> Vec<&str> {
    s.split('/').collect()
}

/// Split every part on the leaf delimiter `:`.
pub fn split_on_colon<'a>(parts: &[&'a str]) -> Vec<&'a str> {
    parts.iter().flat_map(|part| part.split(':')).collect()
}

/// Split an identifier string into its leaf fragments.
///
/// Total: the empty string yields a single empty fragment.
pub fn fragment(s: &str) -> Vec<String> {
    split_on_colon(&split_on_slash(s))
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// A `namespace:reference` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId {
    /// Chain namespace, e.g. `eip155`
    pub namespace: String,
    /// Chain reference, e.g. `1`
    pub reference: String,
}

impl ChainId {
    /// Create a chain id without validation.
    pub fn new(namespace: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            reference: reference.into(),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

/// Asset namespace and reference, e.g. `erc20:0x6b17...`.
pub type AssetName = ChainId;

/// Kind of an identifier, derived from which fields are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// CAIP-2 chain id
    ChainId,
    /// CAIP-10 account id
    AccountId,
    /// CAIP-19 asset type
    AssetType,
    /// CAIP-19 asset id
    AssetId,
}

impl IdentifierKind {
    /// The canonical spec for this kind.
    pub fn spec(&self) -> &'static IdentifierSpec {
        spec(self.spec_name())
    }

    /// Name of the canonical spec for this kind.
    pub fn spec_name(&self) -> SpecName {
        match self {
            Self::ChainId => SpecName::ChainId,
            Self::AccountId => SpecName::AccountId,
            Self::AssetType => SpecName::AssetType,
            Self::AssetId => SpecName::AssetId,
        }
    }

    /// Pick the kind whose leaf count equals the fragment count.
    ///
    /// Counts that match no kind fall back to a chain id, except counts
    /// above the largest spec which are rejected.
    fn for_fragment_count(count: usize, joined: impl FnOnce() -> String) -> Result<Self> {
        const BY_SIZE: [IdentifierKind; 3] = [
            IdentifierKind::AssetId,
            IdentifierKind::AssetType,
            IdentifierKind::AccountId,
        ];
        if count > Self::AssetId.spec().required_arg_count() {
            return Err(GatewayError::invalid_argument("identifier", joined()));
        }
        Ok(BY_SIZE
            .into_iter()
            .find(|kind| kind.spec().required_arg_count() == count)
            .unwrap_or(Self::ChainId))
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec_name().as_str())
    }
}

/// A validated chain-agnostic identifier.
///
/// Fields are only assigned after the whole fragment list has validated, so
/// an identifier is never observed half-populated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    chain_id: ChainId,
    address: Option<String>,
    asset_name: Option<AssetName>,
    token_id: Option<String>,
}

impl Identifier {
    /// Parse a delimited identifier string.
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_with(s, &ValidationOptions::default())
    }

    /// Parse a delimited identifier string with custom validation options.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(options)))]
    pub fn parse_with(s: &str, options: &ValidationOptions) -> Result<Self> {
        let slots: Vec<Option<String>> = fragment(s).into_iter().map(Some).collect();
        Self::from_slots(&slots, options)
    }

    /// Build from a pre-split fragment array.
    pub fn from_fragments<S: AsRef<str>>(fragments: &[S]) -> Result<Self> {
        let slots: Vec<Option<String>> = fragments
            .iter()
            .map(|f| Some(f.as_ref().to_string()))
            .collect();
        Self::from_slots(&slots, &ValidationOptions::default())
    }

    /// Build from an object-form input.
    pub fn from_input(input: IdentifierInput) -> Result<Self> {
        Self::from_input_with(input, &ValidationOptions::default())
    }

    /// Build from an object-form input with custom validation options.
    pub fn from_input_with(input: IdentifierInput, options: &ValidationOptions) -> Result<Self> {
        Self::from_slots(&input.into_slots()?, options)
    }

    /// Build from any JSON form: a string, an array of strings or an object.
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::from_value_with(value, &ValidationOptions::default())
    }

    /// Build from any JSON form with custom validation options.
    pub fn from_value_with(value: &Value, options: &ValidationOptions) -> Result<Self> {
        match value {
            Value::String(s) => Self::parse_with(s, options),
            Value::Array(items) => {
                let slots = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(Some(s.clone())),
                        Value::Null => Ok(None),
                        other => Err(GatewayError::invalid_argument(
                            "identifier",
                            other.to_string(),
                        )),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Self::from_slots(&slots, options)
            }
            Value::Object(_) => {
                let raw: RawIdentifierObject = serde_json::from_value(value.clone())?;
                Self::from_input_with(IdentifierInput::try_from(raw)?, options)
            }
            other => Err(GatewayError::invalid_argument(
                "identifier",
                other.to_string(),
            )),
        }
    }

    /// Build from any JSON form that must be of the spec `name`.
    ///
    /// A string is validated against that spec first, so a short value
    /// reports the leaf it is missing. A value that parses as another kind
    /// fails with `InvalidArgument` naming the spec. An asset name is read
    /// as a `namespace:reference` pair.
    pub fn from_value_as(value: &Value, name: SpecName) -> Result<Self> {
        if let Value::String(s) = value {
            let slots: Vec<Option<String>> = fragment(s).into_iter().map(Some).collect();
            spec(name).validate(&slots)?;
        }
        let identifier = Self::from_value(value)?;
        let expected = match name {
            SpecName::ChainId | SpecName::AssetName => IdentifierKind::ChainId,
            SpecName::AccountId => IdentifierKind::AccountId,
            SpecName::AssetType => IdentifierKind::AssetType,
            SpecName::AssetId => IdentifierKind::AssetId,
        };
        if identifier.kind() != expected {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(GatewayError::invalid_argument(name.as_str(), rendered));
        }
        Ok(identifier)
    }

    fn from_slots(slots: &[Option<String>], options: &ValidationOptions) -> Result<Self> {
        let kind = IdentifierKind::for_fragment_count(slots.len(), || {
            slots
                .iter()
                .map(|s| s.as_deref().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(":")
        })?;
        kind.spec().validate_with(slots, options)?;

        let at = |i: usize| slots[i].clone().unwrap_or_default();
        let chain_id = ChainId::new(at(0), at(1));
        let identifier = match kind {
            IdentifierKind::ChainId => Self {
                chain_id,
                address: None,
                asset_name: None,
                token_id: None,
            },
            IdentifierKind::AccountId => Self {
                chain_id,
                address: Some(at(2)),
                asset_name: None,
                token_id: None,
            },
            IdentifierKind::AssetType => Self {
                chain_id,
                address: None,
                asset_name: Some(AssetName::new(at(2), at(3))),
                token_id: None,
            },
            IdentifierKind::AssetId => Self {
                chain_id,
                address: None,
                asset_name: Some(AssetName::new(at(2), at(3))),
                token_id: Some(at(4)),
            },
        };
        Ok(identifier)
    }

    /// Derived kind: asset id if a token id is set, else asset type if an
    /// asset name is set, else account id if an address is set.
    pub fn kind(&self) -> IdentifierKind {
        if self.token_id.is_some() {
            IdentifierKind::AssetId
        } else if self.asset_name.is_some() {
            IdentifierKind::AssetType
        } else if self.address.is_some() {
            IdentifierKind::AccountId
        } else {
            IdentifierKind::ChainId
        }
    }

    /// Chain namespace.
    pub fn namespace(&self) -> &str {
        &self.chain_id.namespace
    }

    /// Chain reference.
    pub fn reference(&self) -> &str {
        &self.chain_id.reference
    }

    /// The chain this identifier lives on.
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Account address, if any.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Asset name, if any.
    pub fn asset_name(&self) -> Option<&AssetName> {
        self.asset_name.as_ref()
    }

    /// Token id, if any.
    pub fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }

    /// `{namespace}:{reference}` of the chain.
    pub fn chain_id_string(&self) -> Result<String> {
        Ok(self.chain_id.to_string())
    }

    /// `{chainId}:{address}`.
    pub fn account_id_string(&self) -> Result<String> {
        let address = self
            .address
            .as_ref()
            .ok_or_else(|| GatewayError::MissingForFormat("address".into()))?;
        Ok(format!("{}:{}", self.chain_id_string()?, address))
    }

    /// `{namespace}:{reference}` of the asset.
    pub fn asset_name_string(&self) -> Result<String> {
        self.asset_name
            .as_ref()
            .map(ToString::to_string)
            .ok_or_else(|| GatewayError::MissingForFormat("assetName".into()))
    }

    /// `{chainId}/{assetName}`.
    pub fn asset_type_string(&self) -> Result<String> {
        Ok(format!(
            "{}/{}",
            self.chain_id_string()?,
            self.asset_name_string()?
        ))
    }

    /// `{chainId}/{assetName}/{tokenId}`.
    pub fn asset_id_string(&self) -> Result<String> {
        let token_id = self
            .token_id
            .as_ref()
            .ok_or_else(|| GatewayError::MissingForFormat("tokenId".into()))?;
        Ok(format!("{}/{}", self.asset_type_string()?, token_id))
    }

    /// Canonical string for the identifier's kind.
    pub fn format(&self) -> Result<String> {
        match self.kind() {
            IdentifierKind::AssetId => self.asset_id_string(),
            IdentifierKind::AssetType => self.asset_type_string(),
            IdentifierKind::AccountId => self.account_id_string(),
            IdentifierKind::ChainId => self.chain_id_string(),
        }
    }

    /// Leaf values in spec order.
    pub fn to_fragments(&self) -> Vec<String> {
        let mut fragments = vec![
            self.chain_id.namespace.clone(),
            self.chain_id.reference.clone(),
        ];
        match self.kind() {
            IdentifierKind::ChainId => {}
            IdentifierKind::AccountId => fragments.extend(self.address.clone()),
            IdentifierKind::AssetType | IdentifierKind::AssetId => {
                if let Some(asset_name) = &self.asset_name {
                    fragments.push(asset_name.namespace.clone());
                    fragments.push(asset_name.reference.clone());
                }
                fragments.extend(self.token_id.clone());
            }
        }
        fragments
    }

    /// Structured JSON form.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Match against a pattern where `*` stands for any valid leaf value.
    ///
    /// Both sides must have the same number of fragments, and every value of
    /// this identifier must satisfy its leaf regex.
    pub fn match_pattern(&self, pattern: &str) -> bool {
        let Ok(current) = self.format() else {
            return false;
        };
        let current = fragment(&current);
        let pattern = fragment(pattern);
        if current.len() != pattern.len() {
            return false;
        }
        let spec = self.kind().spec();
        let leaves = spec.flatten();
        if leaves.len() != current.len() {
            return false;
        }
        current
            .iter()
            .zip(&pattern)
            .zip(&leaves)
            .all(|((value, expected), leaf)| {
                leaf.spec.is_match(value) && (expected == WILDCARD || expected == value)
            })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format() {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromStr for Identifier {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = GatewayError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum IdentifierView<'a> {
    AssetId {
        #[serde(rename = "chainId")]
        chain_id: &'a ChainId,
        #[serde(rename = "assetName")]
        asset_name: &'a AssetName,
        #[serde(rename = "tokenId")]
        token_id: &'a str,
    },
    AssetType {
        #[serde(rename = "chainId")]
        chain_id: &'a ChainId,
        #[serde(rename = "assetName")]
        asset_name: &'a AssetName,
    },
    AccountId {
        #[serde(rename = "chainId")]
        chain_id: &'a ChainId,
        address: &'a str,
    },
    ChainId(&'a ChainId),
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let view = match (&self.asset_name, &self.token_id, &self.address) {
            (Some(asset_name), Some(token_id), _) => IdentifierView::AssetId {
                chain_id: &self.chain_id,
                asset_name,
                token_id,
            },
            (Some(asset_name), None, _) => IdentifierView::AssetType {
                chain_id: &self.chain_id,
                asset_name,
            },
            (None, _, Some(address)) => IdentifierView::AccountId {
                chain_id: &self.chain_id,
                address,
            },
            _ => IdentifierView::ChainId(&self.chain_id),
        };
        view.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
