//! Chain Adapter Capabilities
//!
//! A chain adapter implements some subset of a fixed capability set. Every
//! capability has a default that fails with `MethodNotSupported`, so an
//! adapter only overrides what its chain offers.
//!
//! Adapters receive arguments already bound by the pipeline. An adapter that
//! wants its arguments selected from request envelopes exposes a
//! [`DescriptorTable`] through [`ChainAdapter::descriptors`].
//!
//! # Example
//!
//! ```ignore
//! use caipgate_lib::adapters::{ChainAdapter, ChainMethod, NodeResponse};
//! use async_trait::async_trait;
//!
//! struct BlockHeightOnly;
//!
//! #[async_trait]
//! impl ChainAdapter for BlockHeightOnly {
//!     fn name(&self) -> &str { "height-only" }
//!
//!     fn capabilities(&self) -> Vec<ChainMethod> {
//!         vec![ChainMethod::GetBlockNumber]
//!     }
//!
//!     async fn get_block_number(&self, _arg: Value) -> Result<NodeResponse> {
//!         Ok(NodeResponse::success(json!("0x10d4f")))
//!     }
//! }
//! ```

mod registry;

pub use registry::{global, AdapterFactory, AdapterRegistry};

use crate::manipulator::DescriptorTable;
use crate::{GatewayError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Capabilities a chain adapter may offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChainMethod {
    /// Latest block height
    GetBlockNumber,
    /// Block by tag, number or hash
    GetBlock,
    /// Native balance of an account
    GetBalance,
    /// Transaction by hash/signature
    GetTransactionBySignature,
    /// Confirmation status of a transaction
    GetTransactionStatus,
    /// Transactions of an account
    GetTransactionsByAccount,
    /// Signature verification
    VerifySignature,
    /// Token balance of an account
    GetTokenBalanceOfAccount,
    /// Relay of a signed transaction
    SendRawTransaction,
    /// Wallet creation
    CreateWallet,
}

impl ChainMethod {
    /// Every capability.
    pub const ALL: [ChainMethod; 10] = [
        ChainMethod::GetBlockNumber,
        ChainMethod::GetBlock,
        ChainMethod::GetBalance,
        ChainMethod::GetTransactionBySignature,
        ChainMethod::GetTransactionStatus,
        ChainMethod::GetTransactionsByAccount,
        ChainMethod::VerifySignature,
        ChainMethod::GetTokenBalanceOfAccount,
        ChainMethod::SendRawTransaction,
        ChainMethod::CreateWallet,
    ];

    /// Method name as used in descriptor tables and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetBlockNumber => "getBlockNumber",
            Self::GetBlock => "getBlock",
            Self::GetBalance => "getBalance",
            Self::GetTransactionBySignature => "getTransactionBySignature",
            Self::GetTransactionStatus => "getTransactionStatus",
            Self::GetTransactionsByAccount => "getTransactionsByAccount",
            Self::VerifySignature => "verifySignature",
            Self::GetTokenBalanceOfAccount => "getTokenBalanceOfAccount",
            Self::SendRawTransaction => "sendRawTransaction",
            Self::CreateWallet => "createWallet",
        }
    }

    fn not_supported(&self) -> GatewayError {
        GatewayError::MethodNotSupported(self.as_str().to_string())
    }
}

impl fmt::Display for ChainMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainMethod {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| GatewayError::MethodNotSupported(s.to_string()))
    }
}

/// Error reported by a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Node error code
    pub code: i64,
    /// Node error message
    pub message: String,
}

/// Result/error pair returned by adapters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeResponse<T = Value> {
    /// Result on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Error on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl<T> NodeResponse<T> {
    /// Successful response.
    pub fn success(result: T) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// Failed response.
    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(ResponseError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Returns true if the node reported an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into a `Result`; a node error becomes a transport error.
    pub fn into_result(self) -> Result<Option<T>> {
        match self.error {
            Some(error) => Err(GatewayError::Transport(format!(
                "node error {}: {}",
                error.code, error.message
            ))),
            None => Ok(self.result),
        }
    }
}

/// A per-chain adapter.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Adapter name for diagnostics.
    fn name(&self) -> &str;

    /// Argument descriptors of the adapter's methods, if any.
    fn descriptors(&self) -> Option<&DescriptorTable> {
        None
    }

    /// Capabilities this adapter overrides.
    fn capabilities(&self) -> Vec<ChainMethod> {
        Vec::new()
    }

    /// Returns true if the adapter declares the capability.
    fn supports(&self, method: ChainMethod) -> bool {
        self.capabilities().contains(&method)
    }

    /// Latest block height.
    async fn get_block_number(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::GetBlockNumber.not_supported())
    }

    /// Block by tag, number or hash.
    async fn get_block(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::GetBlock.not_supported())
    }

    /// Native balance of an account.
    async fn get_balance(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::GetBalance.not_supported())
    }

    /// Transaction by hash/signature.
    async fn get_transaction_by_signature(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::GetTransactionBySignature.not_supported())
    }

    /// Confirmation status of a transaction.
    async fn get_transaction_status(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::GetTransactionStatus.not_supported())
    }

    /// Transactions of an account.
    async fn get_transactions_by_account(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::GetTransactionsByAccount.not_supported())
    }

    /// Verify a signature over a message.
    async fn verify_signature(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::VerifySignature.not_supported())
    }

    /// Token balance of an account.
    async fn get_token_balance_of_account(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::GetTokenBalanceOfAccount.not_supported())
    }

    /// Relay a signed transaction.
    async fn send_raw_transaction(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::SendRawTransaction.not_supported())
    }

    /// Create a wallet.
    async fn create_wallet(&self, _arg: Value) -> Result<NodeResponse> {
        Err(ChainMethod::CreateWallet.not_supported())
    }

    /// Dispatch a capability by name.
    async fn call(&self, method: ChainMethod, arg: Value) -> Result<NodeResponse> {
        match method {
            ChainMethod::GetBlockNumber => self.get_block_number(arg).await,
            ChainMethod::GetBlock => self.get_block(arg).await,
            ChainMethod::GetBalance => self.get_balance(arg).await,
            ChainMethod::GetTransactionBySignature => self.get_transaction_by_signature(arg).await,
            ChainMethod::GetTransactionStatus => self.get_transaction_status(arg).await,
            ChainMethod::GetTransactionsByAccount => self.get_transactions_by_account(arg).await,
            ChainMethod::VerifySignature => self.verify_signature(arg).await,
            ChainMethod::GetTokenBalanceOfAccount => self.get_token_balance_of_account(arg).await,
            ChainMethod::SendRawTransaction => self.send_raw_transaction(arg).await,
            ChainMethod::CreateWallet => self.create_wallet(arg).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct HeightOnly;

    #[async_trait]
    impl ChainAdapter for HeightOnly {
        fn name(&self) -> &str {
            "height-only"
        }

        fn capabilities(&self) -> Vec<ChainMethod> {
            vec![ChainMethod::GetBlockNumber]
        }

        async fn get_block_number(&self, _arg: Value) -> Result<NodeResponse> {
            Ok(NodeResponse::success(json!("0x10")))
        }
    }

    #[test]
    fn test_method_names() {
        for method in ChainMethod::ALL {
            assert_eq!(method.as_str().parse::<ChainMethod>().unwrap(), method);
        }
        assert!("mine".parse::<ChainMethod>().is_err());
        assert_eq!(
            serde_json::to_value(ChainMethod::GetTokenBalanceOfAccount).unwrap(),
            json!("getTokenBalanceOfAccount")
        );
    }

    #[tokio::test]
    async fn test_defaults_not_supported() {
        let adapter = HeightOnly;
        assert!(adapter.supports(ChainMethod::GetBlockNumber));
        assert!(!adapter.supports(ChainMethod::GetBalance));

        let response = adapter.call(ChainMethod::GetBlockNumber, Value::Null).await.unwrap();
        assert_eq!(response.result, Some(json!("0x10")));

        let err = adapter.call(ChainMethod::GetBalance, Value::Null).await.unwrap_err();
        assert_eq!(err.to_string(), "Method not supported: getBalance");
    }

    #[test]
    fn test_node_response() {
        let ok: NodeResponse = NodeResponse::success(json!(1));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"result": 1}));
        assert_eq!(ok.into_result().unwrap(), Some(json!(1)));

        let failed: NodeResponse = NodeResponse::failure(-32000, "header not found");
        assert!(failed.is_error());
        let err = failed.into_result().unwrap_err();
        assert!(err.is_retryable());
    }
}
