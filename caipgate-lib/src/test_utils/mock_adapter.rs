//! Recording chain adapter for tests.

use crate::adapters::{ChainAdapter, ChainMethod, NodeResponse};
use crate::manipulator::{
    DescriptorTable, ManipulationDescriptor, MethodDescriptors, SelectorSpec, Validator,
};
use crate::{GatewayError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

fn require_string(key: &'static str) -> Validator {
    Validator::from_fn(move |value| match value.get(key) {
        Some(Value::String(_)) => Ok(value),
        _ => Err(GatewayError::validation(format!("\"{key}\" is required"))),
    })
}

fn rpc_selection<const N: usize>(names: [&str; N]) -> ManipulationDescriptor {
    ManipulationDescriptor::new(SelectorSpec::names(names))
}

/// Descriptor table modeled on a JSON-RPC node: every method selects an
/// `id` plus its own fields from anywhere in the envelope.
pub fn mock_descriptors() -> DescriptorTable {
    DescriptorTable::new()
        .with_method(
            ChainMethod::GetBlockNumber.as_str(),
            MethodDescriptors::new().with(0, rpc_selection(["id"])),
        )
        .with_method(
            ChainMethod::GetBlock.as_str(),
            MethodDescriptors::new().with(
                0,
                rpc_selection(["id", "tag", "hash", "blockNumber"])
                    .with_validator(Validator::exactly_one_of(["tag", "blockNumber", "hash"])),
            ),
        )
        .with_method(
            ChainMethod::GetBalance.as_str(),
            MethodDescriptors::new().with(
                0,
                rpc_selection(["id", "address", "tag", "blockNumber"]).with_validator(
                    require_string("address")
                        .and_then(Validator::exactly_one_of(["tag", "blockNumber"])),
                ),
            ),
        )
        .with_method(
            ChainMethod::GetTransactionBySignature.as_str(),
            MethodDescriptors::new().with(
                0,
                rpc_selection(["id", "hash"]).with_validator(require_string("hash")),
            ),
        )
        .with_method(
            ChainMethod::SendRawTransaction.as_str(),
            MethodDescriptors::new().with(
                0,
                rpc_selection(["id", "signature"]).with_validator(require_string("signature")),
            ),
        )
}

/// Adapter that records every call and answers with its bound argument.
pub struct MockChainAdapter {
    name: String,
    descriptors: DescriptorTable,
    calls: Mutex<Vec<(ChainMethod, Value)>>,
}

impl MockChainAdapter {
    /// Create a mock with [`mock_descriptors`].
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_descriptors(name, mock_descriptors())
    }

    /// Create a mock with a custom descriptor table.
    pub fn with_descriptors(name: impl Into<String>, descriptors: DescriptorTable) -> Self {
        Self {
            name: name.into(),
            descriptors,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<(ChainMethod, Value)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn echo(&self, method: ChainMethod, arg: Value) -> Result<NodeResponse> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((method, arg.clone()));
        Ok(NodeResponse::success(arg))
    }
}

#[async_trait]
impl ChainAdapter for MockChainAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptors(&self) -> Option<&DescriptorTable> {
        Some(&self.descriptors)
    }

    fn capabilities(&self) -> Vec<ChainMethod> {
        vec![
            ChainMethod::GetBlockNumber,
            ChainMethod::GetBlock,
            ChainMethod::GetBalance,
            ChainMethod::GetTransactionBySignature,
            ChainMethod::SendRawTransaction,
        ]
    }

    async fn get_block_number(&self, arg: Value) -> Result<NodeResponse> {
        self.echo(ChainMethod::GetBlockNumber, arg)
    }

    async fn get_block(&self, arg: Value) -> Result<NodeResponse> {
        self.echo(ChainMethod::GetBlock, arg)
    }

    async fn get_balance(&self, arg: Value) -> Result<NodeResponse> {
        self.echo(ChainMethod::GetBalance, arg)
    }

    async fn get_transaction_by_signature(&self, arg: Value) -> Result<NodeResponse> {
        self.echo(ChainMethod::GetTransactionBySignature, arg)
    }

    async fn send_raw_transaction(&self, arg: Value) -> Result<NodeResponse> {
        self.echo(ChainMethod::SendRawTransaction, arg)
    }
}
