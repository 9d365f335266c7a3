//! Chain-agnostic protocol gateway core.
//!
//! This crate stays transport-free: concrete chain adapters plug in through
//! the [`adapters::ChainAdapter`] trait and own their node connections.
//!
//! # Features
//!
//! - **Identifiers**: Parse, validate, format and match CAIP-2/10/19 identifiers
//! - **Routing**: Resolve chain ids to adapters with per-namespace wildcard defaults
//! - **Argument Binding**: Select, reshape and validate adapter arguments from request envelopes
//! - **Digester**: Encode and decode `algorithm.payload` strings
//!
//! # Example
//!
//! ```ignore
//! use caipgate_lib::prelude::*;
//!
//! let gateway = Gateway::builder()
//!     .route("eip155", true, Arc::new(EvmAdapter::default()))?
//!     .build();
//!
//! let envelope = RequestEnvelope::new().with_body(body);
//! let response = gateway
//!     .call_envelope("eip155:1", ChainMethod::GetBlock, envelope)
//!     .await?;
//! ```

pub mod adapters;
pub mod config;
pub mod digester;
pub mod errors;
pub mod gateway;
pub mod identifier;
pub mod manipulator;
pub mod prelude;
pub mod routing;

/// Test utilities for adapter and gateway testing.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use errors::{GatewayError, GatewayErrorCode};
pub use gateway::{AdapterHandle, Gateway, GatewayBuilder};
pub use identifier::{ChainId, Identifier, IdentifierKind};

/// Common result alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Well-known chain ids.
///
/// # Example
///
/// ```
/// use caipgate_lib::{chains, Identifier};
///
/// let mainnet = Identifier::parse(chains::ETHEREUM_MAINNET).unwrap();
/// assert_eq!(mainnet.reference(), "1");
/// ```
pub mod chains {
    /// Ethereum mainnet.
    pub const ETHEREUM_MAINNET: &str = "eip155:1";
    /// Ropsten testnet.
    pub const ETHEREUM_ROPSTEN: &str = "eip155:3";
    /// Rinkeby testnet.
    pub const ETHEREUM_RINKEBY: &str = "eip155:4";
    /// Goerli testnet.
    pub const ETHEREUM_GOERLI: &str = "eip155:5";
    /// Kovan testnet.
    pub const ETHEREUM_KOVAN: &str = "eip155:42";
    /// The EVM namespace, for wildcard routes.
    pub const EIP155: &str = "eip155";
}
