//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use caipgate_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Identifiers: `Identifier`, `IdentifierKind`, `ChainId`, `ValidationOptions`
//! - Error types: `GatewayError`, `GatewayErrorCode`, `Result`
//! - Adapters: `ChainAdapter`, `ChainMethod`, `NodeResponse`, `AdapterRegistry`
//! - Binding pipeline: descriptors, selectors, transformers, validators
//! - Gateway and its config

// Identifiers
pub use crate::identifier::{ChainId, Identifier, IdentifierInput, IdentifierKind, ValidationOptions};

// Error handling
pub use crate::errors::{GatewayError, GatewayErrorCode};
pub use crate::Result;

// Adapters
pub use crate::adapters::{AdapterRegistry, ChainAdapter, ChainMethod, NodeResponse, ResponseError};

// Routing
pub use crate::routing::{AdapterRouter, RouterBuilder};

// Binding pipeline
pub use crate::manipulator::{
    Argument, ArgumentManipulator, DescriptorTable, ManipulationDescriptor, MethodDescriptors,
    RequestEnvelope, SelectionSource, SelectorSpec, Transformer, Validator,
};

// Digester
pub use crate::digester::Algorithm;

// Gateway
pub use crate::config::{GatewayConfig, NodeConfig, RouteConfig};
pub use crate::gateway::{Gateway, GatewayBuilder};
