//! Argument type descriptors and their converter capabilities.

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use super::constraint::{
    ATTACHMENT, CHANNEL, CHOICE, FLOAT, INTEGER, MENTIONABLE, MESSAGE, ROLE, TypeConstraint, USER,
};
use super::{
    Argument, ArgumentValue, AttachmentRef, ChannelRef, Mentionable, MessageRef, OptionValue,
    RoleRef, UserRef,
};

type CapabilityAdapter = Arc<dyn Fn(&OptionValue) -> Option<Argument> + Send + Sync>;

/// A monomorphized bridge letting a generic converter produce one concrete
/// type.
///
/// Generic converters normalize the raw value for their constraint (for
/// example parse a string into an integer) and hand it to the adapter, which
/// builds the concrete argument.
#[derive(Clone)]
pub struct Capability {
    constraint: &'static TypeConstraint,
    adapter: CapabilityAdapter,
    choices: &'static [&'static str],
}

impl Capability {
    /// Declares a capability with a custom adapter.
    pub fn new<F>(constraint: &'static TypeConstraint, adapter: F) -> Self
    where
        F: Fn(&OptionValue) -> Option<Argument> + Send + Sync + 'static,
    {
        Self {
            constraint,
            adapter: Arc::new(adapter),
            choices: &[],
        }
    }

    /// Declares an integral capability for any type convertible from `i64`.
    #[must_use]
    pub fn integer<T>() -> Self
    where
        T: TryFrom<i64> + ArgumentValue,
    {
        Self::new(&INTEGER, |value| match value {
            OptionValue::Integer(raw) => T::try_from(*raw).ok().map(Argument::new),
            _ => None,
        })
    }

    /// Declares a choice capability for an enumeration.
    #[must_use]
    pub fn choice<T: ChoiceArgument>() -> Self {
        Self {
            choices: T::CHOICES,
            ..Self::new(&CHOICE, |value| match value {
                OptionValue::String(raw) => T::from_choice(raw).map(Argument::new),
                _ => None,
            })
        }
    }

    /// Returns the constraint this capability satisfies.
    #[must_use]
    pub const fn constraint(&self) -> &'static TypeConstraint {
        self.constraint
    }

    /// Returns the declared choice names (empty unless this is a choice
    /// capability).
    #[must_use]
    pub const fn choices(&self) -> &'static [&'static str] {
        self.choices
    }

    /// Builds the concrete argument from a normalized value.
    #[must_use]
    pub fn adapt(&self, value: &OptionValue) -> Option<Argument> {
        (self.adapter)(value)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("constraint", &self.constraint.name())
            .field("choices", &self.choices)
            .finish_non_exhaustive()
    }
}

/// Runtime description of a handler argument type.
#[derive(Debug, Clone)]
pub struct ArgumentTypeInfo {
    id: TypeId,
    name: &'static str,
    capabilities: Vec<Capability>,
}

impl ArgumentTypeInfo {
    /// Describes the argument type `T`.
    #[must_use]
    pub fn of<T: ArgumentType>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            capabilities: T::capabilities(),
        }
    }

    /// Returns the type identifier.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the Rust type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` when the type is exactly `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns the declared capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns `true` when some capability falls under `constraint`.
    #[must_use]
    pub fn satisfies(&self, constraint: &TypeConstraint) -> bool {
        self.capability_for(constraint).is_some()
    }

    /// Returns the most derived capability falling under `constraint`.
    #[must_use]
    pub fn capability_for(&self, constraint: &TypeConstraint) -> Option<&Capability> {
        self.capabilities
            .iter()
            .filter(|capability| constraint.is_assignable_from(capability.constraint))
            .max_by_key(|capability| capability.constraint.depth())
    }

    /// Returns the declared choice names, if the type is a choice
    /// enumeration.
    #[must_use]
    pub fn choices(&self) -> &'static [&'static str] {
        self.capability_for(&CHOICE)
            .map(Capability::choices)
            .unwrap_or_default()
    }
}

/// A type that handler parameters can be declared with.
pub trait ArgumentType: ArgumentValue + Sized {
    /// Capabilities through which generic converters can build this type.
    ///
    /// Types served by an exact converter need none.
    fn capabilities() -> Vec<Capability> {
        Vec::new()
    }
}

/// An enumeration selectable by choice name.
pub trait ChoiceArgument: ArgumentValue + Sized {
    /// Choice names in declaration order.
    const CHOICES: &'static [&'static str];

    /// Parses a choice name (case-insensitive).
    fn from_choice(name: &str) -> Option<Self>;
}

impl ArgumentType for String {}
impl ArgumentType for bool {}
impl ArgumentType for i64 {}
impl ArgumentType for f64 {}

macro_rules! integer_argument {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ArgumentType for $ty {
                fn capabilities() -> Vec<Capability> {
                    vec![Capability::integer::<$ty>()]
                }
            }
        )*
    };
}

integer_argument!(i8, i16, i32, u8, u16, u32, u64, usize);

impl ArgumentType for f32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "f32 parameters opt into reduced precision"
    )]
    fn capabilities() -> Vec<Capability> {
        vec![Capability::new(&FLOAT, |value| match value {
            OptionValue::Number(raw) => Some(Argument::new(*raw as f32)),
            _ => None,
        })]
    }
}

macro_rules! entity_argument {
    ($ty:ty, $constraint:expr, $variant:ident) => {
        impl ArgumentType for $ty {
            fn capabilities() -> Vec<Capability> {
                vec![Capability::new(&$constraint, |value| match value {
                    OptionValue::$variant(entity) => Some(Argument::new(entity.clone())),
                    _ => None,
                })]
            }
        }
    };
}

entity_argument!(UserRef, USER, User);
entity_argument!(RoleRef, ROLE, Role);
entity_argument!(Mentionable, MENTIONABLE, Mentionable);
entity_argument!(ChannelRef, CHANNEL, Channel);
entity_argument!(MessageRef, MESSAGE, Message);
entity_argument!(AttachmentRef, ATTACHMENT, Attachment);
