//! Type-erased handler arguments.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A value that can be carried as a bound handler argument.
///
/// Implemented for every `'static` type that is `Debug + PartialEq + Send +
/// Sync`, so argument arrays can be compared for equality after erasure.
pub trait ArgumentValue: Any + fmt::Debug + Send + Sync {
    /// Returns the value as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Compares against another erased value of possibly different type.
    fn dyn_eq(&self, other: &dyn ArgumentValue) -> bool;
}

impl<T> ArgumentValue for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn ArgumentValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other_value| self == other_value)
    }
}

/// One bound handler argument.
///
/// An argument is either a converted value or "missing", which is what an
/// optional parameter without a default binds to when its option is absent.
#[derive(Clone)]
pub struct Argument {
    value: Option<Arc<dyn ArgumentValue>>,
}

impl Argument {
    /// Wraps a converted value.
    pub fn new<T: ArgumentValue>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
        }
    }

    /// Creates a missing argument.
    #[must_use]
    pub const fn missing() -> Self {
        Self { value: None }
    }

    /// Returns `true` when no value was bound.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        self.value.is_none()
    }

    /// Downcasts the bound value.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value
            .as_deref()
            .and_then(|value| value.as_any().downcast_ref::<T>())
    }

    /// Returns the elements of a variadic argument.
    #[must_use]
    pub fn as_variadic(&self) -> Option<&[Self]> {
        self.downcast_ref::<Vec<Self>>().map(Vec::as_slice)
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => fmt::Debug::fmt(value, f),
            None => f.write_str("<missing>"),
        }
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        match (self.value.as_deref(), other.value.as_deref()) {
            (None, None) => true,
            (Some(left), Some(right)) => left.dyn_eq(right),
            _ => false,
        }
    }
}

/// Errors raised when a handler reads its arguments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgumentError {
    /// No argument exists at the index.
    #[error("no argument at position {0}")]
    OutOfRange(usize),

    /// The argument at the index is missing.
    #[error("argument at position {0} was not supplied")]
    Missing(usize),

    /// The argument holds a different type.
    #[error("argument at position {index} is not a {expected}")]
    TypeMismatch {
        /// Argument position.
        index: usize,
        /// Requested type name.
        expected: &'static str,
    },
}

/// The ordered argument array passed to a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Argument>);

impl Arguments {
    /// Creates an argument array.
    #[must_use]
    pub const fn new(arguments: Vec<Argument>) -> Self {
        Self(arguments)
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the erased argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.0.get(index)
    }

    /// Iterates over the arguments in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.0.iter()
    }

    /// Reads a required argument.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError`] when the index is out of range, the argument
    /// is missing, or it holds a different type.
    pub fn required<T: Any>(&self, index: usize) -> Result<&T, ArgumentError> {
        let argument = self.0.get(index).ok_or(ArgumentError::OutOfRange(index))?;
        if argument.is_missing() {
            return Err(ArgumentError::Missing(index));
        }
        argument
            .downcast_ref::<T>()
            .ok_or(ArgumentError::TypeMismatch {
                index,
                expected: type_name::<T>(),
            })
    }

    /// Reads an optional argument, returning `None` when it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError`] when the index is out of range or the
    /// argument holds a different type.
    pub fn optional<T: Any>(&self, index: usize) -> Result<Option<&T>, ArgumentError> {
        let argument = self.0.get(index).ok_or(ArgumentError::OutOfRange(index))?;
        if argument.is_missing() {
            return Ok(None);
        }
        argument
            .downcast_ref::<T>()
            .map(Some)
            .ok_or(ArgumentError::TypeMismatch {
                index,
                expected: type_name::<T>(),
            })
    }

    /// Reads every element of a variadic argument as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError`] when the index is out of range, the argument
    /// is not variadic, or an element holds a different type.
    pub fn variadic<T: Any>(&self, index: usize) -> Result<Vec<&T>, ArgumentError> {
        let argument = self.0.get(index).ok_or(ArgumentError::OutOfRange(index))?;
        let elements = argument.as_variadic().ok_or(ArgumentError::TypeMismatch {
            index,
            expected: type_name::<Vec<Argument>>(),
        })?;
        elements
            .iter()
            .map(|element| {
                element.downcast_ref::<T>().ok_or(ArgumentError::TypeMismatch {
                    index,
                    expected: type_name::<T>(),
                })
            })
            .collect()
    }
}

impl From<Vec<Argument>> for Arguments {
    fn from(arguments: Vec<Argument>) -> Self {
        Self(arguments)
    }
}
