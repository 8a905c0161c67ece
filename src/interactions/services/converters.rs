//! Type converter registry.
//!
//! Converters are registered either for an exact argument type or for a
//! constraint from the [`constraint`](crate::interactions::domain::constraint)
//! hierarchy. Resolution tries, in order:
//!
//! 1. the converter registered for the exact type;
//! 2. the first exact converter that reports it can convert to the type;
//! 3. the most specific generic converter whose constraint the type
//!    satisfies, ties going to the earliest registration.
//!
//! Resolved bindings are memoized per type until the next registration.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::trace;

use crate::interactions::domain::{
    Argument, ArgumentType, ArgumentTypeInfo, ConversionError, InteractionContext, Mentionable,
    OptionValue, TypeConstraint, TypeConverter,
    constraint::{ATTACHMENT, CHANNEL, CHOICE, FLOAT, INTEGER, MENTIONABLE, MESSAGE, ROLE, USER},
};

/// Thread-safe registry of type converters.
pub struct TypeConverterRegistry {
    state: RwLock<ConverterState>,
}

#[derive(Default)]
struct ConverterState {
    exact: Vec<(TypeId, Arc<dyn TypeConverter>)>,
    generic: Vec<(&'static TypeConstraint, Arc<dyn TypeConverter>)>,
    memo: HashMap<TypeId, Arc<dyn TypeConverter>>,
}

impl TypeConverterRegistry {
    /// Creates a registry holding the built-in converters.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.add_converter::<String>(StringConverter);
        registry.add_converter::<bool>(BooleanConverter);
        registry.add_converter::<i64>(IntegerConverter);
        registry.add_converter::<f64>(NumberConverter);
        for converter in builtin_generic_converters() {
            registry.add_generic_converter(converter.constraint, converter);
        }
        registry
    }

    /// Creates a registry without any converter.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            state: RwLock::new(ConverterState::default()),
        }
    }

    /// Registers a converter for exactly `T`, replacing a previous one.
    pub fn add_converter<T: ArgumentType>(&self, converter: impl TypeConverter + 'static) {
        let type_id = TypeId::of::<T>();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.exact.retain(|(existing, _)| *existing != type_id);
        state.exact.push((type_id, Arc::new(converter)));
        state.memo.clear();
    }

    /// Registers a converter for every type satisfying `constraint`.
    pub fn add_generic_converter(
        &self,
        constraint: &'static TypeConstraint,
        converter: impl TypeConverter + 'static,
    ) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generic.push((constraint, Arc::new(converter)));
        state.memo.clear();
    }

    /// Returns `true` when a converter is registered for exactly `T`.
    #[must_use]
    pub fn has_converter<T: ArgumentType>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.exact.iter().any(|(existing, _)| *existing == type_id)
    }

    /// Resolves the converter for `target`.
    #[must_use]
    pub fn resolve(&self, target: &ArgumentTypeInfo) -> Option<Arc<dyn TypeConverter>> {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(converter) = state.memo.get(&target.id()) {
                return Some(Arc::clone(converter));
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let resolved = resolve_uncached(&state, target)?;
        trace!(target_type = target.name(), "memoized type converter binding");
        state.memo.insert(target.id(), Arc::clone(&resolved));
        Some(resolved)
    }
}

impl Default for TypeConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("TypeConverterRegistry")
            .field("exact", &state.exact.len())
            .field(
                "generic",
                &state
                    .generic
                    .iter()
                    .map(|(constraint, _)| constraint.name())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

fn resolve_uncached(
    state: &ConverterState,
    target: &ArgumentTypeInfo,
) -> Option<Arc<dyn TypeConverter>> {
    if let Some((_, converter)) = state
        .exact
        .iter()
        .find(|(type_id, _)| *type_id == target.id())
    {
        return Some(Arc::clone(converter));
    }

    if let Some((_, converter)) = state
        .exact
        .iter()
        .find(|(_, converter)| converter.can_convert_to(target))
    {
        return Some(Arc::clone(converter));
    }

    let qualifying: Vec<(&'static TypeConstraint, &Arc<dyn TypeConverter>)> = state
        .generic
        .iter()
        .filter(|(constraint, _)| target.satisfies(constraint))
        .map(|(constraint, converter)| (*constraint, converter))
        .collect();

    // Most specific: fewest other qualifying constraints derived from it.
    qualifying
        .iter()
        .min_by_key(|(constraint, _)| {
            qualifying
                .iter()
                .filter(|(other, _)| other != constraint && constraint.is_assignable_from(other))
                .count()
        })
        .map(|(_, converter)| Arc::clone(converter))
}

struct StringConverter;

#[async_trait]
impl TypeConverter for StringConverter {
    async fn convert(
        &self,
        _context: &InteractionContext,
        value: &OptionValue,
        target: &ArgumentTypeInfo,
    ) -> Result<Argument, ConversionError> {
        let text = match value {
            OptionValue::String(text) => text.clone(),
            OptionValue::Integer(number) => number.to_string(),
            OptionValue::Number(number) => number.to_string(),
            OptionValue::Boolean(flag) => flag.to_string(),
            other => return Err(ConversionError::unsupported(other, target)),
        };
        Ok(Argument::new(text))
    }
}

struct BooleanConverter;

#[async_trait]
impl TypeConverter for BooleanConverter {
    async fn convert(
        &self,
        _context: &InteractionContext,
        value: &OptionValue,
        target: &ArgumentTypeInfo,
    ) -> Result<Argument, ConversionError> {
        match value {
            OptionValue::Boolean(flag) => Ok(Argument::new(*flag)),
            OptionValue::String(text) => text
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .map(Argument::new)
                .map_err(|_| ConversionError::invalid(text.as_str(), target)),
            other => Err(ConversionError::unsupported(other, target)),
        }
    }
}

struct IntegerConverter;

#[async_trait]
impl TypeConverter for IntegerConverter {
    async fn convert(
        &self,
        _context: &InteractionContext,
        value: &OptionValue,
        target: &ArgumentTypeInfo,
    ) -> Result<Argument, ConversionError> {
        normalize_integer(value)
            .and_then(|normalized| match normalized {
                OptionValue::Integer(number) => Some(Argument::new(number)),
                _ => None,
            })
            .ok_or_else(|| decline(value, target))
    }
}

struct NumberConverter;

#[async_trait]
impl TypeConverter for NumberConverter {
    async fn convert(
        &self,
        _context: &InteractionContext,
        value: &OptionValue,
        target: &ArgumentTypeInfo,
    ) -> Result<Argument, ConversionError> {
        normalize_float(value)
            .and_then(|normalized| match normalized {
                OptionValue::Number(number) => Some(Argument::new(number)),
                _ => None,
            })
            .ok_or_else(|| decline(value, target))
    }
}

type Normalizer = fn(&OptionValue) -> Option<OptionValue>;

/// Generic converter that normalizes the raw value for its constraint and
/// lets the target's capability build the concrete argument.
struct CapabilityConverter {
    constraint: &'static TypeConstraint,
    normalize: Normalizer,
}

#[async_trait]
impl TypeConverter for CapabilityConverter {
    async fn convert(
        &self,
        _context: &InteractionContext,
        value: &OptionValue,
        target: &ArgumentTypeInfo,
    ) -> Result<Argument, ConversionError> {
        let capability = target
            .capability_for(self.constraint)
            .ok_or_else(|| ConversionError::unsupported(value, target))?;
        (self.normalize)(value)
            .and_then(|normalized| capability.adapt(&normalized))
            .ok_or_else(|| decline(value, target))
    }
}

fn builtin_generic_converters() -> [CapabilityConverter; 9] {
    [
        CapabilityConverter {
            constraint: &INTEGER,
            normalize: normalize_integer,
        },
        CapabilityConverter {
            constraint: &FLOAT,
            normalize: normalize_float,
        },
        CapabilityConverter {
            constraint: &CHOICE,
            normalize: normalize_text,
        },
        CapabilityConverter {
            constraint: &MENTIONABLE,
            normalize: normalize_mentionable,
        },
        CapabilityConverter {
            constraint: &USER,
            normalize: normalize_user,
        },
        CapabilityConverter {
            constraint: &ROLE,
            normalize: normalize_role,
        },
        CapabilityConverter {
            constraint: &CHANNEL,
            normalize: normalize_entity,
        },
        CapabilityConverter {
            constraint: &MESSAGE,
            normalize: normalize_entity,
        },
        CapabilityConverter {
            constraint: &ATTACHMENT,
            normalize: normalize_entity,
        },
    ]
}

/// Shape errors (wrong variant) become `Unsupported`; well-shaped values the
/// target rejects become `InvalidValue`.
fn decline(value: &OptionValue, target: &ArgumentTypeInfo) -> ConversionError {
    match value {
        OptionValue::String(text) => ConversionError::invalid(text.as_str(), target),
        OptionValue::Integer(number) => ConversionError::invalid(number.to_string(), target),
        OptionValue::Number(number) => ConversionError::invalid(number.to_string(), target),
        other => ConversionError::unsupported(other, target),
    }
}

fn normalize_integer(value: &OptionValue) -> Option<OptionValue> {
    match value {
        OptionValue::Integer(number) => Some(OptionValue::Integer(*number)),
        OptionValue::String(text) => text.trim().parse().ok().map(OptionValue::Integer),
        _ => None,
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integer options widen to floating point by protocol definition"
)]
fn normalize_float(value: &OptionValue) -> Option<OptionValue> {
    match value {
        OptionValue::Number(number) => Some(OptionValue::Number(*number)),
        OptionValue::Integer(number) => Some(OptionValue::Number(*number as f64)),
        OptionValue::String(text) => text.trim().parse().ok().map(OptionValue::Number),
        _ => None,
    }
}

fn normalize_text(value: &OptionValue) -> Option<OptionValue> {
    match value {
        OptionValue::String(_) => Some(value.clone()),
        OptionValue::Integer(number) => Some(OptionValue::String(number.to_string())),
        _ => None,
    }
}

fn normalize_entity(value: &OptionValue) -> Option<OptionValue> {
    Some(value.clone())
}

fn normalize_mentionable(value: &OptionValue) -> Option<OptionValue> {
    match value {
        OptionValue::Mentionable(_) => Some(value.clone()),
        OptionValue::User(user) => Some(OptionValue::Mentionable(Mentionable::User(user.clone()))),
        OptionValue::Role(role) => Some(OptionValue::Mentionable(Mentionable::Role(role.clone()))),
        _ => None,
    }
}

fn normalize_user(value: &OptionValue) -> Option<OptionValue> {
    match value {
        OptionValue::User(_) => Some(value.clone()),
        OptionValue::Mentionable(Mentionable::User(user)) => Some(OptionValue::User(user.clone())),
        _ => None,
    }
}

fn normalize_role(value: &OptionValue) -> Option<OptionValue> {
    match value {
        OptionValue::Role(_) => Some(value.clone()),
        OptionValue::Mentionable(Mentionable::Role(role)) => Some(OptionValue::Role(role.clone())),
        _ => None,
    }
}
