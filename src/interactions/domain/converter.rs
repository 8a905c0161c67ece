//! Type converter contract.

use async_trait::async_trait;
use thiserror::Error;

use super::{Argument, ArgumentTypeInfo, InteractionContext, OptionValue};

/// Errors returned when a converter declines a raw value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// The converter cannot produce the target from this kind of value.
    #[error("cannot convert a {found} value into {target}")]
    Unsupported {
        /// Variant name of the raw value.
        found: &'static str,
        /// Target type name.
        target: &'static str,
    },

    /// The value has the right shape but is not a valid instance of the
    /// target (unknown choice, integer out of range, unparsable text).
    #[error("'{value}' is not a valid {target}")]
    InvalidValue {
        /// Offending value, rendered for diagnostics.
        value: String,
        /// Target type name.
        target: &'static str,
    },
}

impl ConversionError {
    /// Builds an [`ConversionError::Unsupported`] for `value`.
    #[must_use]
    pub const fn unsupported(value: &OptionValue, target: &ArgumentTypeInfo) -> Self {
        Self::Unsupported {
            found: value.type_name(),
            target: target.name(),
        }
    }

    /// Builds an [`ConversionError::InvalidValue`].
    pub fn invalid(value: impl Into<String>, target: &ArgumentTypeInfo) -> Self {
        Self::InvalidValue {
            value: value.into(),
            target: target.name(),
        }
    }
}

/// Turns a raw option value into a typed handler argument.
///
/// Converters are registered with the type converter registry either for an
/// exact argument type or for a constraint shared by many types.
#[async_trait]
pub trait TypeConverter: Send + Sync {
    /// Returns `true` when this converter can serve `target` even though it
    /// was registered for another type.
    ///
    /// Consulted only when no converter is registered for the exact type.
    fn can_convert_to(&self, _target: &ArgumentTypeInfo) -> bool {
        false
    }

    /// Converts `value` into an instance of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when the value cannot be represented as the
    /// target type.
    async fn convert(
        &self,
        context: &InteractionContext,
        value: &OptionValue,
        target: &ArgumentTypeInfo,
    ) -> Result<Argument, ConversionError>;
}
