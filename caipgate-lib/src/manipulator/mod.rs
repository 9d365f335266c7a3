//! Argument Binding Pipeline
//!
//! Adapter methods declare, per parameter position, how their argument is
//! obtained from an inbound [`RequestEnvelope`]: which properties to select,
//! how to reshape them and how to validate the result. Declarations are
//! [`ManipulationDescriptor`]s collected into a [`DescriptorTable`] once per
//! adapter type and only read afterwards.
//!
//! Binding one call runs every declared position through
//! `select -> transform -> validate`. A failure at any stage aborts the call
//! before the method body runs. Plain values skip the pipeline entirely.
//!
//! # Example
//!
//! ```ignore
//! use caipgate_lib::manipulator::*;
//!
//! let table = DescriptorTable::new().with_method(
//!     "getBalance",
//!     MethodDescriptors::new().with(
//!         0,
//!         ManipulationDescriptor::params(SelectorSpec::names(["id", "address"]))
//!             .with_validator(Validator::typed::<GetBalanceArgs>()),
//!     ),
//! );
//!
//! let args = table.bind("getBalance", vec![envelope.into()])?;
//! ```

mod envelope;
mod selector;
mod transformer;
mod validator;

pub use envelope::{Argument, RequestEnvelope, SelectionSource, FOR_SELECTION_KEY};
pub use selector::{
    find_property, select, select_from, SelectorOutput, SelectorSpec, SINGLE_SELECTION_KEY,
};
pub use transformer::{ObjectTemplate, Transformer};
pub use validator::Validator;

use crate::{GatewayError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

/// An object supplying any of the three pipeline capabilities.
///
/// Every capability is optional; a missing one falls through to the next
/// source in the descriptor's precedence order.
pub trait ArgumentManipulator: Send + Sync {
    /// Properties to select.
    fn selector_spec(&self) -> Option<SelectorSpec> {
        None
    }

    /// Reshaping of the selection.
    fn transformer(&self) -> Option<Transformer> {
        None
    }

    /// Validation of the reshaped value.
    fn validator(&self) -> Option<Validator> {
        None
    }
}

/// Where a descriptor's selector spec comes from.
#[derive(Clone)]
pub enum Selection {
    /// A spec given directly.
    Spec(SelectorSpec),
    /// A manipulator that supplies the spec and possibly more.
    Manipulator(Arc<dyn ArgumentManipulator>),
}

impl From<SelectorSpec> for Selection {
    fn from(spec: SelectorSpec) -> Self {
        Self::Spec(spec)
    }
}

impl From<Arc<dyn ArgumentManipulator>> for Selection {
    fn from(manipulator: Arc<dyn ArgumentManipulator>) -> Self {
        Self::Manipulator(manipulator)
    }
}

/// Optional settings for [`ManipulationDescriptor::resolve`].
#[derive(Clone, Default)]
pub struct DescriptorOptions {
    /// Part of the envelope to search
    pub source: SelectionSource,
    /// Explicit transformer, highest precedence
    pub transformer: Option<Transformer>,
    /// Explicit validator, highest precedence
    pub validator: Option<Validator>,
    /// Composite manipulator, second precedence
    pub manipulator: Option<Arc<dyn ArgumentManipulator>>,
}

/// How one parameter is bound from an envelope.
#[derive(Clone, Debug)]
pub struct ManipulationDescriptor {
    /// Properties to select.
    pub selector_spec: SelectorSpec,
    /// Part of the envelope to search.
    pub source: SelectionSource,
    /// Reshaping applied to the selection.
    pub transformer: Transformer,
    /// Validation applied last, if any.
    pub validator: Option<Validator>,
}

impl ManipulationDescriptor {
    /// Select from the whole envelope with the automatic transformer.
    pub fn new(spec: impl Into<SelectorSpec>) -> Self {
        Self {
            selector_spec: spec.into(),
            source: SelectionSource::None,
            transformer: Transformer::auto(),
            validator: None,
        }
    }

    /// Select from the query parameters.
    pub fn params(spec: impl Into<SelectorSpec>) -> Self {
        Self::new(spec).with_source(SelectionSource::Params)
    }

    /// Select from the request body.
    pub fn body(spec: impl Into<SelectorSpec>) -> Self {
        Self::new(spec).with_source(SelectionSource::Body)
    }

    /// Resolve a descriptor from a selection and options.
    ///
    /// Transformer and validator are taken from, in order: the explicit
    /// option, the composite manipulator option, the selecting manipulator.
    /// Without any, the automatic transformer and no validator are used.
    pub fn resolve(selection: impl Into<Selection>, options: DescriptorOptions) -> Result<Self> {
        let DescriptorOptions {
            source,
            transformer,
            validator,
            manipulator,
        } = options;
        let (selector_spec, selecting) = match selection.into() {
            Selection::Spec(spec) => (spec, None),
            Selection::Manipulator(m) => (
                m.selector_spec().ok_or(GatewayError::MissingSelectorSpec)?,
                Some(m),
            ),
        };
        let fallbacks = [manipulator.as_ref(), selecting.as_ref()];

        let transformer = transformer
            .or_else(|| fallbacks.iter().flatten().find_map(|m| m.transformer()))
            .unwrap_or_else(Transformer::auto);
        let validator =
            validator.or_else(|| fallbacks.iter().flatten().find_map(|m| m.validator()));

        Ok(Self {
            selector_spec,
            source,
            transformer,
            validator,
        })
    }

    /// Resolve a descriptor entirely from one manipulator.
    pub fn from_manipulator(manipulator: Arc<dyn ArgumentManipulator>) -> Result<Self> {
        Self::resolve(manipulator, DescriptorOptions::default())
    }

    /// Set the source.
    pub fn with_source(mut self, source: SelectionSource) -> Self {
        self.source = source;
        self
    }

    /// Set the transformer.
    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Set the validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Select, transform and validate one envelope.
    pub fn apply(&self, envelope: &RequestEnvelope) -> Result<Value> {
        let selected = select(envelope, &self.selector_spec, self.source);
        #[cfg(feature = "tracing")]
        tracing::debug!(spec = ?self.selector_spec, source = ?self.source, "selected");

        let transformed = self.transformer.apply(&selected)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("transformed");

        match &self.validator {
            Some(validator) => {
                let validated = validator.validate(transformed)?;
                #[cfg(feature = "tracing")]
                tracing::debug!("validated");
                Ok(validated)
            }
            None => Ok(transformed),
        }
    }
}

/// Descriptors of one method, keyed by parameter position.
#[derive(Clone, Debug, Default)]
pub struct MethodDescriptors {
    slots: BTreeMap<usize, ManipulationDescriptor>,
}

impl MethodDescriptors {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the descriptor of a position.
    pub fn with(mut self, position: usize, descriptor: ManipulationDescriptor) -> Self {
        self.slots.insert(position, descriptor);
        self
    }

    /// Descriptor of a position.
    pub fn get(&self, position: usize) -> Option<&ManipulationDescriptor> {
        self.slots.get(&position)
    }

    /// Number of declared positions.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no position is declared.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bind a call's arguments.
    ///
    /// Declared positions holding an envelope are run through their
    /// descriptor. The last envelope seen also feeds later declared
    /// positions that are absent. Plain values are never touched.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(slots = self.slots.len())))]
    pub fn bind(&self, mut args: Vec<Argument>) -> Result<Vec<Value>> {
        if !args.is_empty() {
            let mut last_envelope: Option<RequestEnvelope> = None;
            for (&position, descriptor) in &self.slots {
                let envelope = match args.get(position) {
                    Some(Argument::Envelope(envelope)) => {
                        last_envelope = Some(envelope.clone());
                        envelope.clone()
                    }
                    Some(Argument::Value(_)) => continue,
                    Some(Argument::Absent) | None => match &last_envelope {
                        Some(envelope) => envelope.clone(),
                        None => continue,
                    },
                };
                let bound = descriptor.apply(&envelope)?;
                if position >= args.len() {
                    args.resize(position + 1, Argument::Absent);
                }
                args[position] = Argument::Value(bound);
            }
        }
        Ok(args.into_iter().map(Argument::into_value).collect())
    }
}

/// Descriptors of every method of an adapter type, keyed by method name.
#[derive(Clone, Debug, Default)]
pub struct DescriptorTable {
    methods: HashMap<String, MethodDescriptors>,
}

impl DescriptorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the descriptors of a method.
    pub fn with_method(mut self, method: impl Into<String>, descriptors: MethodDescriptors) -> Self {
        self.methods.insert(method.into(), descriptors);
        self
    }

    /// Descriptors of a method.
    pub fn get(&self, method: &str) -> Option<&MethodDescriptors> {
        self.methods.get(method)
    }

    /// Bind arguments for a method. Methods without descriptors receive
    /// their arguments unchanged.
    pub fn bind(&self, method: &str, args: Vec<Argument>) -> Result<Vec<Value>> {
        match self.methods.get(method) {
            Some(descriptors) => descriptors.bind(args),
            None => Ok(args.into_iter().map(Argument::into_value).collect()),
        }
    }

    /// Bind arguments, then run `body` with them.
    ///
    /// `body` is not called when binding fails.
    pub async fn invoke<F, Fut, T>(&self, method: &str, args: Vec<Argument>, body: F) -> Result<T>
    where
        F: FnOnce(Vec<Value>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let bound = self.bind(method, args)?;
        body(bound).await
    }
}
