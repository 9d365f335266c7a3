//! Error types for gateway operations.
//!
//! Every error raised by the core is a caller-input error: identifier
//! validation, selector/validator failures, payload encoding and routing.
//! None of them are retried by the core. Only [`GatewayError::Transport`],
//! which carries an outcome reported by an adapter's transport, is marked
//! retryable.

/// Error codes for FFI and service integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GatewayErrorCode {
    /// Required identifier leaf absent
    MissingArgument = 1000,
    /// Identifier leaf failed its regex
    InvalidArgument = 1001,
    /// Formatting attempted with an unset field
    MissingForFormat = 1002,
    /// Identifier object carries fields of two different kinds
    ConflictingIdentifierFields = 1003,
    /// Selector descriptor is not a name, list or map
    UnsupportedSelectorSpec = 2000,
    /// Manipulator supplied no selector spec
    MissingSelectorSpec = 2001,
    /// Pipeline validator rejected a value
    SchemaValidationFailed = 2002,
    /// Payload prefix names an unknown algorithm
    IncompatibleEncoding = 3000,
    /// Payload could not be decoded
    DecodeFailed = 3001,
    /// Value could not be encoded
    EncodeFailed = 3002,
    /// No adapter route for the identifier
    RouteNotFound = 4000,
    /// Route registration rejected
    InvalidRoute = 4001,
    /// Adapter kind not registered
    UnknownAdapter = 4002,
    /// Adapter does not implement a capability
    MethodNotSupported = 4003,
    /// Configuration error
    Config = 5000,
    /// Serialization error
    Serialization = 5001,
    /// Transport outcome reported by an adapter
    Transport = 6000,
}

/// Comprehensive error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A required identifier leaf was not provided.
    #[error("Missing argument ({0} not provided)")]
    MissingArgument(String),

    /// An identifier leaf is present but does not satisfy its regex.
    ///
    /// `parent` is either empty or the parent spec name followed by a space.
    #[error("Invalid argument ({parent}{property} does not accept '{value}' as value)")]
    InvalidArgument {
        /// Leaf spec name
        property: String,
        /// Offending fragment
        value: String,
        /// Parent spec prefix used for nested leaves
        parent: String,
    },

    /// Formatting was attempted while a required field is unset.
    #[error("Failed to format, {0} is missing")]
    MissingForFormat(String),

    /// An identifier object mixes fields that select different kinds.
    #[error("Conflicting identifier fields: {0}")]
    ConflictingIdentifierFields(String),

    /// Selector descriptor is neither a name, a name list nor a name map.
    #[error("Selection against the spec is not supported, spec: {0}")]
    UnsupportedSelectorSpec(String),

    /// A manipulator used as selector does not provide a selector spec.
    #[error("Selector spec is missing")]
    MissingSelectorSpec,

    /// The pipeline validator rejected a value.
    #[error("Schema validation failed: {0}")]
    SchemaValidationFailed(String),

    /// A delimited payload names an algorithm the digester does not know.
    #[error("Incompatible encoding '{algorithm}' for data '{data}'")]
    IncompatibleEncoding {
        /// Algorithm prefix found in the payload
        algorithm: String,
        /// The payload
        data: String,
    },

    /// The payload could not be decoded with its algorithm.
    #[error("Failed to decode '{data}': {reason}")]
    DecodeFailed {
        /// Payload data after the algorithm prefix
        data: String,
        /// Underlying decoder message
        reason: String,
    },

    /// The value could not be encoded with the requested algorithm.
    #[error("Failed to encode '{data}': {reason}")]
    EncodeFailed {
        /// Rendering of the value
        data: String,
        /// Underlying encoder message
        reason: String,
    },

    /// No adapter is routed for the identifier.
    #[error("No route found for '{0}'")]
    RouteNotFound(String),

    /// Route registration rejected.
    #[error("Invalid route '{path}': {reason}")]
    InvalidRoute {
        /// Route path as given
        path: String,
        /// Reason for rejection
        reason: String,
    },

    /// Configuration references an adapter kind that is not registered.
    #[error("Adapter kind not registered: {0}")]
    UnknownAdapter(String),

    /// Adapter does not implement the requested capability.
    #[error("Method not supported: {0}")]
    MethodNotSupported(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport outcome bubbled up from an adapter.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Get the error code for FFI/service integration.
    pub fn code(&self) -> GatewayErrorCode {
        match self {
            Self::MissingArgument(_) => GatewayErrorCode::MissingArgument,
            Self::InvalidArgument { .. } => GatewayErrorCode::InvalidArgument,
            Self::MissingForFormat(_) => GatewayErrorCode::MissingForFormat,
            Self::ConflictingIdentifierFields(_) => GatewayErrorCode::ConflictingIdentifierFields,
            Self::UnsupportedSelectorSpec(_) => GatewayErrorCode::UnsupportedSelectorSpec,
            Self::MissingSelectorSpec => GatewayErrorCode::MissingSelectorSpec,
            Self::SchemaValidationFailed(_) => GatewayErrorCode::SchemaValidationFailed,
            Self::IncompatibleEncoding { .. } => GatewayErrorCode::IncompatibleEncoding,
            Self::DecodeFailed { .. } => GatewayErrorCode::DecodeFailed,
            Self::EncodeFailed { .. } => GatewayErrorCode::EncodeFailed,
            Self::RouteNotFound(_) => GatewayErrorCode::RouteNotFound,
            Self::InvalidRoute { .. } => GatewayErrorCode::InvalidRoute,
            Self::UnknownAdapter(_) => GatewayErrorCode::UnknownAdapter,
            Self::MethodNotSupported(_) => GatewayErrorCode::MethodNotSupported,
            Self::Config(_) => GatewayErrorCode::Config,
            Self::Serialization(_) => GatewayErrorCode::Serialization,
            Self::Transport(_) => GatewayErrorCode::Transport,
        }
    }

    /// Get the error message as an owned String.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if this error is potentially recoverable by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Create an invalid argument error for a leaf without parent prefix.
    pub fn invalid_argument(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            property: property.into(),
            value: value.into(),
            parent: String::new(),
        }
    }

    /// Create a schema validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::SchemaValidationFailed(msg.into())
    }

    /// Create a transport error from any error type.
    pub fn transport<E: std::error::Error>(err: E) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = GatewayError::RouteNotFound("cosmos".to_string());
        assert_eq!(err.code(), GatewayErrorCode::RouteNotFound);
        assert!(!err.is_retryable());

        let err = GatewayError::Transport("connection reset".to_string());
        assert_eq!(err.code(), GatewayErrorCode::Transport);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_identifier_error_display() {
        let err = GatewayError::MissingArgument("reference".to_string());
        assert_eq!(err.to_string(), "Missing argument (reference not provided)");

        let err = GatewayError::InvalidArgument {
            property: "namespace".to_string(),
            value: "erc,".to_string(),
            parent: "assetName ".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid argument (assetName namespace does not accept 'erc,' as value)"
        );

        let err = GatewayError::MissingForFormat("address".to_string());
        assert_eq!(err.to_string(), "Failed to format, address is missing");
    }

    #[test]
    fn test_helper_constructors() {
        let err = GatewayError::invalid_argument("reference", "#");
        assert_eq!(err.code(), GatewayErrorCode::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "Invalid argument (reference does not accept '#' as value)"
        );

        let err = GatewayError::validation("\"id\" is required");
        assert_eq!(err.code(), GatewayErrorCode::SchemaValidationFailed);
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: GatewayError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), GatewayErrorCode::Serialization);
    }
}
