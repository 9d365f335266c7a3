//! Identifier Specs
//!
//! Static, immutable spec tree describing the CAIP identifier family. A spec
//! is either a *leaf* (a single regex-validated fragment) or a composite of
//! ordered child specs joined by a delimiter. Composites share children by
//! reference, so `assetType` embeds the same `chainId` and `assetName` specs
//! that are registered on their own.
//!
//! | Spec        | Leaves                                              |
//! |-------------|-----------------------------------------------------|
//! | `chainId`   | namespace, reference                                |
//! | `accountId` | namespace, reference, address                       |
//! | `assetName` | namespace, reference                                |
//! | `assetType` | chainId (2) + assetName (2)                         |
//! | `assetId`   | chainId (2) + assetName (2) + tokenId               |

use crate::{GatewayError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Fragment value accepted in place of any leaf value.
pub const WILDCARD: &str = "*";

/// Specs whose name is prepended to leaf names in error messages.
const PARENT_NAMES_IN_ERRORS: &[SpecName] = &[SpecName::AssetName];

/// Names of the canonical identifier specs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecName {
    /// CAIP-2 chain id.
    ChainId,
    /// CAIP-10 account id.
    AccountId,
    /// `namespace:reference` asset name inside CAIP-19.
    AssetName,
    /// CAIP-19 asset type.
    AssetType,
    /// CAIP-19 asset id.
    AssetId,
}

impl SpecName {
    /// All canonical spec names, in registration order.
    pub const ALL: [SpecName; 5] = [
        SpecName::ChainId,
        SpecName::AccountId,
        SpecName::AssetName,
        SpecName::AssetType,
        SpecName::AssetId,
    ];

    /// Name as used in request keys and JSON forms.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChainId => "chainId",
            Self::AccountId => "accountId",
            Self::AssetName => "assetName",
            Self::AssetType => "assetType",
            Self::AssetId => "assetId",
        }
    }
}

impl fmt::Display for SpecName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecName {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| GatewayError::invalid_argument("spec name", s))
    }
}

/// Ordered children of a composite spec.
#[derive(Debug)]
pub struct SpecParameters {
    /// Delimiter joining the children in the canonical string.
    pub delimiter: char,
    /// Child specs, keyed by position.
    pub values: Vec<Arc<IdentifierSpec>>,
}

/// A node of the identifier spec tree.
#[derive(Debug)]
pub struct IdentifierSpec {
    name: &'static str,
    pattern: &'static str,
    regex: Regex,
    parameters: Option<SpecParameters>,
}

impl IdentifierSpec {
    fn leaf(name: &'static str, pattern: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            pattern,
            regex: full_match_regex(pattern),
            parameters: None,
        })
    }

    fn composite(
        name: &'static str,
        pattern: &'static str,
        delimiter: char,
        values: Vec<Arc<IdentifierSpec>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            pattern,
            regex: full_match_regex(pattern),
            parameters: Some(SpecParameters { delimiter, values }),
        })
    }

    /// Spec name (`chainId`, `namespace`, `tokenId`, ...).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Regex source, without anchors.
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Children of a composite spec, `None` for a leaf.
    pub fn parameters(&self) -> Option<&SpecParameters> {
        self.parameters.as_ref()
    }

    /// Returns true if this spec has no nested children.
    pub fn is_leaf(&self) -> bool {
        self.parameters.is_none()
    }

    /// Full-string regex match: a partial match is rejected.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Number of leaves reachable from this spec.
    pub fn required_arg_count(&self) -> usize {
        match &self.parameters {
            None => 0,
            Some(params) => params
                .values
                .iter()
                .map(|child| {
                    if child.is_leaf() {
                        1
                    } else {
                        child.required_arg_count()
                    }
                })
                .sum(),
        }
    }

    /// Depth-first, left-to-right leaf list.
    pub fn flatten(&self) -> Vec<LeafSpec<'_>> {
        let mut leaves = Vec::with_capacity(self.required_arg_count());
        self.flatten_into(&mut leaves);
        leaves
    }

    fn flatten_into<'a>(&'a self, leaves: &mut Vec<LeafSpec<'a>>) {
        let Some(params) = &self.parameters else {
            return;
        };
        let parent_name = PARENT_NAMES_IN_ERRORS
            .iter()
            .any(|name| name.as_str() == self.name)
            .then_some(self.name);
        for child in &params.values {
            if child.is_leaf() {
                leaves.push(LeafSpec {
                    spec: child,
                    parent_name,
                });
            } else {
                child.flatten_into(leaves);
            }
        }
    }

    /// Validate fragments positionally with the default options.
    pub fn validate<S: AsRef<str>>(&self, fragments: &[Option<S>]) -> Result<()> {
        self.validate_with(fragments, &ValidationOptions::default())
    }

    /// Validate fragments positionally against the flattened leaves.
    ///
    /// Fails with `MissingArgument` naming the first missing leaf when there
    /// are fewer fragments than leaves or a fragment slot is empty, and with
    /// `InvalidArgument` on the first regex mismatch. The wildcard is
    /// accepted at any position whose leaf is not excluded by `options`.
    /// Fragments beyond the last leaf are not inspected.
    pub fn validate_with<S: AsRef<str>>(
        &self,
        fragments: &[Option<S>],
        options: &ValidationOptions,
    ) -> Result<()> {
        let leaves = self.flatten();
        if let Some(first_missing) = leaves.get(fragments.len()) {
            return Err(GatewayError::MissingArgument(first_missing.qualified_name()));
        }
        for (fragment, leaf) in fragments.iter().zip(&leaves) {
            let Some(value) = fragment.as_ref().map(AsRef::as_ref) else {
                return Err(GatewayError::MissingArgument(leaf.qualified_name()));
            };
            if value == WILDCARD && options.allows_wildcard(leaf.name()) {
                continue;
            }
            if !leaf.spec.is_match(value) {
                return Err(GatewayError::InvalidArgument {
                    property: leaf.name().to_string(),
                    value: value.to_string(),
                    parent: leaf.parent_prefix(),
                });
            }
        }
        Ok(())
    }
}

/// A leaf of a flattened spec, with the composite it was reached through.
#[derive(Clone, Copy, Debug)]
pub struct LeafSpec<'a> {
    /// The leaf spec.
    pub spec: &'a IdentifierSpec,
    /// Parent spec name, set only for parents reported in errors.
    pub parent_name: Option<&'static str>,
}

impl LeafSpec<'_> {
    /// Leaf name.
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// Leaf name qualified by its parent, e.g. `assetName namespace`.
    pub fn qualified_name(&self) -> String {
        match self.parent_name {
            Some(parent) => format!("{parent} {}", self.spec.name),
            None => self.spec.name.to_string(),
        }
    }

    fn parent_prefix(&self) -> String {
        self.parent_name
            .map(|parent| format!("{parent} "))
            .unwrap_or_default()
    }
}

/// Options applied during positional validation.
#[derive(Clone, Debug, Default)]
pub struct ValidationOptions {
    /// Leaf names that do not accept the wildcard fragment.
    pub wildcard_exclusions: HashSet<String>,
}

impl ValidationOptions {
    /// Exclude a leaf name from wildcard support.
    pub fn exclude_wildcard(mut self, leaf_name: impl Into<String>) -> Self {
        self.wildcard_exclusions.insert(leaf_name.into());
        self
    }

    /// Returns true if the wildcard is accepted for the leaf.
    pub fn allows_wildcard(&self, leaf_name: &str) -> bool {
        !self.wildcard_exclusions.contains(leaf_name)
    }
}

fn full_match_regex(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})$")).expect("identifier spec regex is valid")
}

struct SpecTable {
    chain_id: Arc<IdentifierSpec>,
    account_id: Arc<IdentifierSpec>,
    asset_name: Arc<IdentifierSpec>,
    asset_type: Arc<IdentifierSpec>,
    asset_id: Arc<IdentifierSpec>,
}

fn table() -> &'static SpecTable {
    static TABLE: OnceLock<SpecTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let chain_id = IdentifierSpec::composite(
            "chainId",
            "[-:a-zA-Z0-9]{5,41}",
            ':',
            vec![
                IdentifierSpec::leaf("namespace", "[-a-z0-9]{3,8}"),
                IdentifierSpec::leaf("reference", "[-a-zA-Z0-9]{1,32}"),
            ],
        );
        let account_id = IdentifierSpec::composite(
            "accountId",
            "[-:a-zA-Z0-9]{7,106}",
            ':',
            vec![
                IdentifierSpec::leaf("namespace", "[-a-z0-9]{3,8}"),
                IdentifierSpec::leaf("reference", "[-a-zA-Z0-9]{1,32}"),
                IdentifierSpec::leaf("address", "[a-zA-Z0-9]{1,64}"),
            ],
        );
        let asset_name = IdentifierSpec::composite(
            "assetName",
            "[-:a-zA-Z0-9]{5,73}",
            ':',
            vec![
                IdentifierSpec::leaf("namespace", "[-a-z0-9]{3,8}"),
                IdentifierSpec::leaf("reference", "[-a-zA-Z0-9]{1,64}"),
            ],
        );
        let asset_type = IdentifierSpec::composite(
            "assetType",
            "[-:a-zA-Z0-9/]{11,115}",
            '/',
            vec![chain_id.clone(), asset_name.clone()],
        );
        let asset_id = IdentifierSpec::composite(
            "assetId",
            "[-:a-zA-Z0-9/]{13,148}",
            '/',
            vec![
                chain_id.clone(),
                asset_name.clone(),
                IdentifierSpec::leaf("tokenId", "[-a-zA-Z0-9]{1,32}"),
            ],
        );
        SpecTable {
            chain_id,
            account_id,
            asset_name,
            asset_type,
            asset_id,
        }
    })
}

/// Get a canonical spec.
pub fn spec(name: SpecName) -> &'static IdentifierSpec {
    let table = table();
    match name {
        SpecName::ChainId => &table.chain_id,
        SpecName::AccountId => &table.account_id,
        SpecName::AssetName => &table.asset_name,
        SpecName::AssetType => &table.asset_type,
        SpecName::AssetId => &table.asset_id,
    }
}

/// Look up a canonical spec by its request-key name.
pub fn spec_by_name(name: &str) -> Option<&'static IdentifierSpec> {
    name.parse::<SpecName>().ok().map(spec)
}
