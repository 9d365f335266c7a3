//! Object-form identifier input.
//!
//! Callers may describe an identifier as an object instead of a string. The
//! raw object is converted into a tagged [`IdentifierInput`] up front so the
//! kind is decided once, and each variant knows how to lay out its fragment
//! slots. Missing pieces become explicit `None` slots and surface later as
//! `MissingArgument` during validation.

use super::fragment;
use super::spec::SpecName;
use crate::{GatewayError, Result};
use serde::{Deserialize, Serialize};

const CHAIN_ID: &str = SpecName::ChainId.as_str();
const ASSET_NAME: &str = SpecName::AssetName.as_str();

/// A `namespace:reference` pair given either encoded or as separate parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Component {
    /// Encoded form, e.g. `"eip155:1"`.
    Encoded(String),
    /// Separate parts; either may be absent.
    Parts {
        /// Namespace part
        #[serde(default)]
        namespace: Option<String>,
        /// Reference part
        #[serde(default)]
        reference: Option<String>,
    },
}

impl Component {
    /// Build a component from separate parts.
    pub fn parts(namespace: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::Parts {
            namespace: Some(namespace.into()),
            reference: Some(reference.into()),
        }
    }

    /// Fragment slots for the component, always two.
    ///
    /// An encoded form with fewer than two fragments is padded with `None`.
    /// One with more fails with `InvalidArgument` naming `role`.
    pub fn slots(&self, role: &str) -> Result<Vec<Option<String>>> {
        match self {
            Self::Encoded(encoded) => {
                let fragments = fragment(encoded);
                if fragments.len() > 2 {
                    return Err(GatewayError::invalid_argument(role, encoded.as_str()));
                }
                let mut slots: Vec<Option<String>> = fragments.into_iter().map(Some).collect();
                slots.resize(2, None);
                Ok(slots)
            }
            Self::Parts {
                namespace,
                reference,
            } => Ok(vec![namespace.clone(), reference.clone()]),
        }
    }
}

fn slots_or_placeholders(component: Option<&Component>, role: &str) -> Result<Vec<Option<String>>> {
    match component {
        Some(component) => component.slots(role),
        None => Ok(vec![None, None]),
    }
}

/// Identifier described as an object, one variant per identifier kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentifierInput {
    /// Chain id only.
    ChainId {
        /// The chain
        chain_id: Component,
    },
    /// Account on a chain.
    AccountId {
        /// The chain, if given
        chain_id: Option<Component>,
        /// Account address
        address: String,
    },
    /// Asset type on a chain.
    AssetType {
        /// The chain, if given
        chain_id: Option<Component>,
        /// The asset name, if given
        asset_name: Option<Component>,
    },
    /// Single token of an asset type.
    AssetId {
        /// The chain, if given
        chain_id: Option<Component>,
        /// The asset name, if given
        asset_name: Option<Component>,
        /// Token id
        token_id: String,
    },
}

impl IdentifierInput {
    /// Positional fragment slots in leaf order of the variant's spec.
    ///
    /// Fails when an encoded component carries more than two fragments.
    pub fn into_slots(self) -> Result<Vec<Option<String>>> {
        let slots = match self {
            Self::ChainId { chain_id } => chain_id.slots(CHAIN_ID)?,
            Self::AccountId { chain_id, address } => {
                let mut slots = slots_or_placeholders(chain_id.as_ref(), CHAIN_ID)?;
                slots.push(Some(address));
                slots
            }
            Self::AssetType {
                chain_id,
                asset_name,
            } => {
                let mut slots = slots_or_placeholders(chain_id.as_ref(), CHAIN_ID)?;
                slots.extend(slots_or_placeholders(asset_name.as_ref(), ASSET_NAME)?);
                slots
            }
            Self::AssetId {
                chain_id,
                asset_name,
                token_id,
            } => {
                let mut slots = slots_or_placeholders(chain_id.as_ref(), CHAIN_ID)?;
                slots.extend(slots_or_placeholders(asset_name.as_ref(), ASSET_NAME)?);
                slots.push(Some(token_id));
                slots
            }
        };
        Ok(slots)
    }
}

/// Loose object shape accepted from JSON requests.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIdentifierObject {
    /// Chain id component
    #[serde(default)]
    pub chain_id: Option<Component>,
    /// Asset name component
    #[serde(default)]
    pub asset_name: Option<Component>,
    /// Top-level namespace
    #[serde(default)]
    pub namespace: Option<String>,
    /// Top-level reference
    #[serde(default)]
    pub reference: Option<String>,
    /// Account address
    #[serde(default)]
    pub address: Option<String>,
    /// Token id
    #[serde(default)]
    pub token_id: Option<String>,
}

impl RawIdentifierObject {
    fn loose_parts(&self) -> Option<Component> {
        (self.namespace.is_some() || self.reference.is_some()).then(|| Component::Parts {
            namespace: self.namespace.clone(),
            reference: self.reference.clone(),
        })
    }
}

impl TryFrom<RawIdentifierObject> for IdentifierInput {
    type Error = GatewayError;

    /// Decide the identifier kind from the fields present.
    ///
    /// `tokenId` selects an asset id, `address` an account id, and
    /// `chainId` together with an asset name an asset type. Top-level
    /// `namespace`/`reference` fill whichever component the kind lacks.
    fn try_from(raw: RawIdentifierObject) -> Result<Self> {
        if raw.address.is_some() && raw.token_id.is_some() {
            return Err(GatewayError::ConflictingIdentifierFields(
                "tokenId and address".to_string(),
            ));
        }
        if raw.address.is_some() && raw.asset_name.is_some() {
            return Err(GatewayError::ConflictingIdentifierFields(
                "assetName and address".to_string(),
            ));
        }

        let loose = raw.loose_parts();
        let RawIdentifierObject {
            chain_id,
            asset_name,
            address,
            token_id,
            ..
        } = raw;

        if let Some(token_id) = token_id {
            return Ok(Self::AssetId {
                chain_id,
                asset_name: asset_name.or(loose),
                token_id,
            });
        }
        if let Some(address) = address {
            return Ok(Self::AccountId {
                chain_id: chain_id.or(loose),
                address,
            });
        }
        match chain_id {
            Some(chain_id) if asset_name.is_some() || loose.is_some() => Ok(Self::AssetType {
                chain_id: Some(chain_id),
                asset_name: asset_name.or(loose),
            }),
            Some(chain_id) => Ok(Self::ChainId { chain_id }),
            None => Ok(Self::ChainId {
                chain_id: loose.unwrap_or(Component::Parts {
                    namespace: None,
                    reference: None,
                }),
            }),
        }
    }
}
