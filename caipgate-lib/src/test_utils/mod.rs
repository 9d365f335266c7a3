//! Test utilities for the gateway.
//!
//! - A mock chain adapter that records calls and echoes its bound argument
//! - Identifier and envelope fixtures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caipgate_lib::test_utils::{fixtures, MockChainAdapter};
//!
//! let adapter = Arc::new(MockChainAdapter::new("mock"));
//! let gateway = Gateway::builder().route("eip155", true, adapter.clone())?.build();
//!
//! gateway
//!     .call_envelope(fixtures::MAINNET, ChainMethod::GetBlock, fixtures::envelope(json!({"id": 1, "tag": "latest"})))
//!     .await?;
//! assert_eq!(adapter.calls().len(), 1);
//! ```

pub mod fixtures;
mod mock_adapter;

pub use mock_adapter::{mock_descriptors, MockChainAdapter};
