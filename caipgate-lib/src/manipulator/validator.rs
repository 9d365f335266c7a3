//! Validators check, and may normalize, the transformed value.

use crate::{GatewayError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ValidateFn = dyn Fn(Value) -> Result<Value> + Send + Sync;

/// A value check returning the accepted value.
#[derive(Clone)]
pub struct Validator(Arc<ValidateFn>);

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").finish()
    }
}

impl Validator {
    /// Wrap a function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Validate a value.
    pub fn validate(&self, value: Value) -> Result<Value> {
        (self.0)(value)
    }

    /// Schema given by a serde type.
    ///
    /// The value is deserialized into `T` and serialized back, so serde
    /// defaults are filled in and unknown fields follow `T`'s serde rules.
    pub fn typed<T>() -> Self
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        Self::from_fn(|value| {
            let typed: T =
                serde_json::from_value(value).map_err(|e| GatewayError::validation(e.to_string()))?;
            serde_json::to_value(typed).map_err(|e| GatewayError::validation(e.to_string()))
        })
    }

    /// Reject `null`.
    pub fn required() -> Self {
        Self::from_fn(|value| {
            if value.is_null() {
                Err(GatewayError::validation("value is required"))
            } else {
                Ok(value)
            }
        })
    }

    /// Require an object with exactly one non-null field among `keys`.
    pub fn exactly_one_of<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Self::from_fn(move |value| {
            let present = keys
                .iter()
                .filter(|key| value.get(key.as_str()).is_some_and(|v| !v.is_null()))
                .count();
            if present == 1 {
                Ok(value)
            } else {
                Err(GatewayError::validation(format!(
                    "exactly one of [{}] must be set, found {present}",
                    keys.join(", ")
                )))
            }
        })
    }

    /// Run `next` on the value accepted by `self`.
    pub fn and_then(self, next: Validator) -> Self {
        Self::from_fn(move |value| next.validate(self.validate(value)?))
    }
}
