//! Gateway
//!
//! Ties the pieces together: a frozen router from chain ids to adapters, the
//! identifier validation options, and per-call argument binding through the
//! resolved adapter's descriptor table.
//!
//! ```ignore
//! let registry = AdapterRegistry::new();
//! registry.register("evm", |node| Ok(Arc::new(EvmAdapter::new(node))));
//!
//! let gateway = Gateway::from_config(&GatewayConfig::from_env()?, &registry)?;
//! let response = gateway
//!     .call("eip155:1", ChainMethod::GetBalance, vec![envelope.into()])
//!     .await?;
//! ```

use crate::adapters::{AdapterRegistry, ChainAdapter, ChainMethod, NodeResponse};
use crate::config::GatewayConfig;
use crate::identifier::{Identifier, ValidationOptions};
use crate::manipulator::{Argument, RequestEnvelope};
use crate::routing::{AdapterRouter, RouterBuilder};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

/// Shared adapter instance held by the router.
pub type AdapterHandle = Arc<dyn ChainAdapter>;

/// Builder collecting routes before the router is frozen.
#[derive(Default)]
pub struct GatewayBuilder {
    routes: RouterBuilder<AdapterHandle>,
    options: ValidationOptions,
}

impl GatewayBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a chain path to an adapter.
    pub fn route(mut self, path: &str, wildcard: bool, adapter: AdapterHandle) -> Result<Self> {
        self.routes.add_route(path, wildcard, adapter)?;
        Ok(self)
    }

    /// Set identifier validation options.
    pub fn validation_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Freeze the routes.
    pub fn build(self) -> Gateway {
        Gateway {
            router: self.routes.build(),
            options: self.options,
        }
    }
}

/// Dispatches chain calls to routed adapters.
pub struct Gateway {
    router: AdapterRouter<AdapterHandle>,
    options: ValidationOptions,
}

impl Gateway {
    /// Start building a gateway.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Build a gateway from config, creating one adapter per route.
    pub fn from_config(config: &GatewayConfig, registry: &AdapterRegistry) -> Result<Self> {
        let mut builder = GatewayBuilder::new().validation_options(config.validation_options());
        for route in &config.routes {
            let adapter = registry.create(&route.adapter, config.node_for(route))?;
            builder = builder.route(&route.path, route.wildcard, adapter)?;
        }
        Ok(builder.build())
    }

    /// The frozen router.
    pub fn router(&self) -> &AdapterRouter<AdapterHandle> {
        &self.router
    }

    /// Validation options applied to identifiers.
    pub fn validation_options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Adapter serving the chain of any identifier.
    ///
    /// Account, asset type and asset id identifiers are routed by their
    /// chain id.
    pub fn adapter_for(&self, identifier: &str) -> Result<AdapterHandle> {
        let identifier = Identifier::parse_with(identifier, &self.options)?;
        let chain = identifier.chain_id_string()?;
        self.router.resolve(&chain).cloned()
    }

    /// Bind arguments with the adapter's descriptors and invoke a method.
    ///
    /// Capabilities take a single argument: every declared position is bound
    /// and validated, so a failure at any position aborts the call, but only
    /// the value at position 0 is passed to the adapter.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, args), fields(method = %method))
    )]
    pub async fn call(
        &self,
        identifier: &str,
        method: ChainMethod,
        args: Vec<Argument>,
    ) -> Result<NodeResponse> {
        let adapter = self.adapter_for(identifier)?;
        match adapter.descriptors() {
            Some(table) => {
                table
                    .invoke(method.as_str(), args, |bound| {
                        adapter.call(method, first_argument(bound))
                    })
                    .await
            }
            None => {
                let bound = args.into_iter().map(Argument::into_value).collect();
                adapter.call(method, first_argument(bound)).await
            }
        }
    }

    /// Invoke a method with one request envelope.
    pub async fn call_envelope(
        &self,
        identifier: &str,
        method: ChainMethod,
        envelope: RequestEnvelope,
    ) -> Result<NodeResponse> {
        self.call(identifier, method, vec![Argument::Envelope(envelope)])
            .await
    }
}

fn first_argument(bound: Vec<Value>) -> Value {
    #[cfg(feature = "tracing")]
    if bound.len() > 1 {
        tracing::debug!(dropped = bound.len() - 1, "passing only the first bound argument");
    }
    bound.into_iter().next().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NodeConfig, RouteConfig};
    use crate::test_utils::{fixtures, MockChainAdapter};
    use crate::GatewayError;
    use serde_json::json;

    fn registry() -> AdapterRegistry {
        let registry = AdapterRegistry::new();
        registry.register("mock", |node: &NodeConfig| {
            Ok(Arc::new(MockChainAdapter::new(node.base_url.clone())) as AdapterHandle)
        });
        registry
    }

    fn config() -> GatewayConfig {
        GatewayConfig::new()
            .with_route(RouteConfig::new("eip155", "mock").with_wildcard(true))
            .with_route(
                RouteConfig::new("eip155:5", "mock").with_node(NodeConfig::new("http://goerli")),
            )
    }

    #[test]
    fn test_from_config_routes() {
        let gateway = Gateway::from_config(&config(), &registry()).unwrap();
        assert_eq!(gateway.adapter_for("eip155:5").unwrap().name(), "http://goerli");
        assert_eq!(
            gateway.adapter_for("eip155:1").unwrap().name(),
            "http://localhost:8545"
        );
        // Accounts route by their chain
        assert_eq!(
            gateway.adapter_for("eip155:5:0xabc").unwrap().name(),
            "http://goerli"
        );
        assert!(matches!(
            gateway.adapter_for("cosmos:cosmoshub-3"),
            Err(GatewayError::RouteNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_adapter_kind() {
        let config = GatewayConfig::new().with_route(RouteConfig::new("eip155", "evm"));
        assert!(matches!(
            Gateway::from_config(&config, &registry()),
            Err(GatewayError::UnknownAdapter(_))
        ));
    }

    #[tokio::test]
    async fn test_call_binds_envelope() {
        let gateway = Gateway::from_config(&config(), &registry()).unwrap();
        let response = gateway
            .call_envelope(
                fixtures::MAINNET,
                ChainMethod::GetBalance,
                fixtures::envelope(json!({"id": 1, "address": "0xabc", "tag": "latest"})),
            )
            .await
            .unwrap();
        assert_eq!(
            response.result,
            Some(json!({"id": 1, "address": "0xabc", "tag": "latest", "blockNumber": null}))
        );
    }

    #[tokio::test]
    async fn test_call_validation_failure_skips_method() {
        let adapter = Arc::new(MockChainAdapter::new("mock"));
        let gateway = Gateway::builder()
            .route("eip155", true, adapter.clone())
            .unwrap()
            .build();
        let err = gateway
            .call_envelope(
                fixtures::MAINNET,
                ChainMethod::GetBalance,
                fixtures::envelope(json!({"id": 1, "address": "0xabc"})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::SchemaValidationFailed(_)));
        assert!(adapter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_only_first_bound_argument_reaches_adapter() {
        use crate::manipulator::{DescriptorTable, ManipulationDescriptor, MethodDescriptors, Validator};

        let table = DescriptorTable::new().with_method(
            ChainMethod::GetBlock.as_str(),
            MethodDescriptors::new()
                .with(0, ManipulationDescriptor::body("hash"))
                .with(
                    1,
                    ManipulationDescriptor::body("tag").with_validator(Validator::required()),
                ),
        );
        let adapter = Arc::new(MockChainAdapter::with_descriptors("mock", table));
        let gateway = Gateway::builder()
            .route("eip155", true, adapter.clone())
            .unwrap()
            .build();

        let response = gateway
            .call_envelope(
                fixtures::MAINNET,
                ChainMethod::GetBlock,
                fixtures::envelope(json!({"hash": "0x1", "tag": "latest"})),
            )
            .await
            .unwrap();
        assert_eq!(response.result, Some(json!("0x1")));
        assert_eq!(adapter.calls(), vec![(ChainMethod::GetBlock, json!("0x1"))]);

        // Later positions are still validated before the call
        let err = gateway
            .call_envelope(
                fixtures::MAINNET,
                ChainMethod::GetBlock,
                fixtures::envelope(json!({"hash": "0x2"})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::SchemaValidationFailed(_)));
        assert_eq!(adapter.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_plain_argument_bypasses_pipeline() {
        let adapter = Arc::new(MockChainAdapter::new("mock"));
        let gateway = Gateway::builder()
            .route("eip155", true, adapter.clone())
            .unwrap()
            .build();
        let response = gateway
            .call(
                fixtures::MAINNET,
                ChainMethod::GetBalance,
                vec![Argument::Value(json!("raw"))],
            )
            .await
            .unwrap();
        assert_eq!(response.result, Some(json!("raw")));
        assert_eq!(adapter.calls(), vec![(ChainMethod::GetBalance, json!("raw"))]);
    }
}
