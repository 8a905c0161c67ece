//! Command parameter descriptions and autocomplete handlers.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::{
    Argument, ArgumentTypeInfo, HandlerError, InteractionContext, NamedValue, OptionValue,
    ParameterPrecondition, TypeConverter,
};
use crate::interactions::ports::ServiceResolver;

/// A fixed value a parameter is restricted to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterChoice {
    /// Display name.
    pub name: String,
    /// Raw value submitted when the choice is picked.
    pub value: OptionValue,
}

impl ParameterChoice {
    /// Creates a choice.
    pub fn new(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns `true` when `raw` selects this choice. Strings compare
    /// case-insensitively.
    #[must_use]
    pub fn matches(&self, raw: &OptionValue) -> bool {
        match (&self.value, raw) {
            (OptionValue::String(expected), OptionValue::String(actual)) => {
                expected.eq_ignore_ascii_case(actual)
            }
            (expected, actual) => expected == actual,
        }
    }
}

/// One suggestion returned for an autocomplete request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocompleteChoice {
    /// Display name.
    pub name: String,
    /// Value filled in when the suggestion is picked.
    pub value: OptionValue,
}

impl AutocompleteChoice {
    /// Creates a suggestion.
    pub fn new(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The focused option of an autocomplete request.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteRequest {
    /// Name of the parameter being typed into.
    pub parameter: String,
    /// What the user has typed so far.
    pub current: OptionValue,
    /// Every option of the request, focused one included.
    pub options: Vec<NamedValue>,
}

/// Produces suggestions for one slash command parameter.
#[async_trait]
pub trait AutocompleteHandler: Send + Sync {
    /// Returns suggestions for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when suggestions cannot be produced.
    async fn suggest(
        &self,
        context: &InteractionContext,
        request: &AutocompleteRequest,
        services: &dyn ServiceResolver,
    ) -> Result<Vec<AutocompleteChoice>, HandlerError>;
}

/// An autocomplete handler backed by a synchronous closure.
pub struct FnAutocomplete<F> {
    suggest: F,
}

impl<F> FnAutocomplete<F>
where
    F: Fn(&AutocompleteRequest) -> Vec<AutocompleteChoice> + Send + Sync,
{
    /// Wraps a suggestion closure.
    pub const fn new(suggest: F) -> Self {
        Self { suggest }
    }
}

#[async_trait]
impl<F> AutocompleteHandler for FnAutocomplete<F>
where
    F: Fn(&AutocompleteRequest) -> Vec<AutocompleteChoice> + Send + Sync,
{
    async fn suggest(
        &self,
        _context: &InteractionContext,
        request: &AutocompleteRequest,
        _services: &dyn ServiceResolver,
    ) -> Result<Vec<AutocompleteChoice>, HandlerError> {
        Ok((self.suggest)(request))
    }
}

/// An immutable, fully resolved parameter of a command.
#[derive(Clone)]
pub struct ParameterInfo {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) argument_type: ArgumentTypeInfo,
    pub(crate) required: bool,
    pub(crate) default_value: Option<Argument>,
    pub(crate) variadic: bool,
    pub(crate) choices: Vec<ParameterChoice>,
    pub(crate) min_value: Option<f64>,
    pub(crate) max_value: Option<f64>,
    pub(crate) preconditions: Vec<Arc<dyn ParameterPrecondition>>,
    pub(crate) converter: Arc<dyn TypeConverter>,
    pub(crate) autocomplete: Option<Arc<dyn AutocompleteHandler>>,
}

impl ParameterInfo {
    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description shown to users.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared argument type.
    #[must_use]
    pub const fn argument_type(&self) -> &ArgumentTypeInfo {
        &self.argument_type
    }

    /// Returns `true` when the option must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the value bound when an optional option is absent.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Argument> {
        self.default_value.as_ref()
    }

    /// Returns `true` when the parameter collects every remaining value.
    #[must_use]
    pub const fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Returns the fixed choices, empty when unrestricted.
    #[must_use]
    pub fn choices(&self) -> &[ParameterChoice] {
        &self.choices
    }

    /// Returns the inclusive lower numeric bound.
    #[must_use]
    pub const fn min_value(&self) -> Option<f64> {
        self.min_value
    }

    /// Returns the inclusive upper numeric bound.
    #[must_use]
    pub const fn max_value(&self) -> Option<f64> {
        self.max_value
    }

    /// Returns the parameter preconditions.
    #[must_use]
    pub fn preconditions(&self) -> &[Arc<dyn ParameterPrecondition>] {
        &self.preconditions
    }

    /// Returns the converter bound at build time.
    #[must_use]
    pub const fn converter(&self) -> &Arc<dyn TypeConverter> {
        &self.converter
    }

    /// Returns the autocomplete handler, if any.
    #[must_use]
    pub const fn autocomplete(&self) -> Option<&Arc<dyn AutocompleteHandler>> {
        self.autocomplete.as_ref()
    }
}

impl fmt::Debug for ParameterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterInfo")
            .field("name", &self.name)
            .field("type", &self.argument_type.name())
            .field("required", &self.required)
            .field("variadic", &self.variadic)
            .field("preconditions", &self.preconditions.len())
            .field("autocomplete", &self.autocomplete.is_some())
            .finish_non_exhaustive()
    }
}
