//! Gateway configuration.
//!
//! A gateway config lists routes, each naming a chain path, whether the path
//! answers for unregistered sub-chains, the adapter kind serving it and the
//! node that adapter talks to.
//!
//! ```json
//! {
//!   "routes": [
//!     { "path": "eip155", "wildcard": true, "adapter": "evm" },
//!     { "path": "eip155:5", "adapter": "evm", "node": { "baseUrl": "https://goerli.example" } }
//!   ],
//!   "wildcardExclusions": ["address"]
//! }
//! ```
//!
//! # Environment Variables
//!
//! ```bash
//! export CAIPGATE_CONFIG=/etc/caipgate/routes.json
//! export CAIPGATE_NODE_URL=http://localhost:8545
//! export CAIPGATE_NODE_TIMEOUT_MS=5000
//! ```

use crate::identifier::ValidationOptions;
use crate::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names the config file to load.
pub const CONFIG_ENV: &str = "CAIPGATE_CONFIG";
/// Default node URL for routes without a node.
pub const NODE_URL_ENV: &str = "CAIPGATE_NODE_URL";
/// Default node timeout for routes without a node.
pub const NODE_TIMEOUT_ENV: &str = "CAIPGATE_NODE_TIMEOUT_MS";

/// Node endpoint handed to adapter factories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Base URL of the node.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl NodeConfig {
    /// Create a node config with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// One route of the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// Chain path, e.g. `eip155` or `eip155:1`.
    pub path: String,

    /// Whether the route answers for unregistered sub-chains.
    #[serde(default)]
    pub wildcard: bool,

    /// Adapter kind name in the registry.
    pub adapter: String,

    /// Node for this route; the gateway default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeConfig>,
}

impl RouteConfig {
    /// Create a non-wildcard route.
    pub fn new(path: impl Into<String>, adapter: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            wildcard: false,
            adapter: adapter.into(),
            node: None,
        }
    }

    /// Set wildcard support.
    pub fn with_wildcard(mut self, wildcard: bool) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// Set the node.
    pub fn with_node(mut self, node: NodeConfig) -> Self {
        self.node = Some(node);
        self
    }
}

/// Complete gateway configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Routes in registration order.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Node used by routes without their own.
    #[serde(default)]
    pub default_node: NodeConfig,

    /// Identifier leaves that do not accept the wildcard.
    #[serde(default)]
    pub wildcard_exclusions: Vec<String>,
}

impl GatewayConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route.
    pub fn with_route(mut self, route: RouteConfig) -> Self {
        self.routes.push(route);
        self
    }

    /// Set the default node.
    pub fn with_default_node(mut self, node: NodeConfig) -> Self {
        self.default_node = node;
        self
    }

    /// Exclude an identifier leaf from wildcard support.
    pub fn with_wildcard_exclusion(mut self, leaf_name: impl Into<String>) -> Self {
        self.wildcard_exclusions.push(leaf_name.into());
        self
    }

    /// Parse a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GatewayError::Config(e.to_string()))
    }

    /// Load a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&contents)
    }

    /// Load the file named by `CAIPGATE_CONFIG` (or an empty config when
    /// unset), then apply the node overrides from the environment.
    pub fn from_env() -> Result<Self> {
        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply `CAIPGATE_NODE_URL` and `CAIPGATE_NODE_TIMEOUT_MS` from `lookup`
    /// to the default node. Unparseable timeouts are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(NODE_URL_ENV) {
            self.default_node.base_url = url;
        }
        if let Some(timeout) = lookup(NODE_TIMEOUT_ENV) {
            if let Ok(ms) = timeout.parse::<u64>() {
                self.default_node.timeout_ms = ms;
            }
        }
        self
    }

    /// Node used for a route.
    pub fn node_for<'a>(&'a self, route: &'a RouteConfig) -> &'a NodeConfig {
        route.node.as_ref().unwrap_or(&self.default_node)
    }

    /// Identifier validation options derived from the config.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            wildcard_exclusions: self.wildcard_exclusions.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "routes": [
            { "path": "eip155", "wildcard": true, "adapter": "evm" },
            { "path": "eip155:5", "adapter": "evm", "node": { "baseUrl": "https://goerli.example" } }
        ],
        "wildcardExclusions": ["address"]
    }"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = GatewayConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.routes.len(), 2);
        assert!(config.routes[0].wildcard);
        assert!(!config.routes[1].wildcard);
        assert_eq!(config.default_node, NodeConfig::default());

        let goerli = config.node_for(&config.routes[1]);
        assert_eq!(goerli.base_url, "https://goerli.example");
        assert_eq!(goerli.timeout_ms, 30_000);
        assert_eq!(config.node_for(&config.routes[0]), &config.default_node);

        assert!(!config.validation_options().allows_wildcard("address"));
    }

    #[test]
    fn test_invalid_json() {
        let err = GatewayConfig::from_json_str("{\"routes\": [{}]}").unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = GatewayConfig::from_file(file.path()).unwrap();
        assert_eq!(config.routes[0].adapter, "evm");

        assert!(GatewayConfig::from_file("/nonexistent/caipgate.json").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = GatewayConfig::new().with_env_overrides(|key| match key {
            NODE_URL_ENV => Some("http://node:8545".to_string()),
            NODE_TIMEOUT_ENV => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(config.default_node.base_url, "http://node:8545");
        assert_eq!(config.default_node.timeout_ms, 30_000);
    }

    #[test]
    fn test_builders() {
        let config = GatewayConfig::new()
            .with_route(RouteConfig::new("eip155", "evm").with_wildcard(true))
            .with_default_node(NodeConfig::new("http://a").with_timeout_ms(10))
            .with_wildcard_exclusion("tokenId");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GatewayConfig::from_json_str(&json).unwrap(), config);
    }
}
