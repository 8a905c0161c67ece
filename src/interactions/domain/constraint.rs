//! Constraint hierarchy for generic type converters.
//!
//! A constraint names a family of argument types ("any integer", "any
//! mentionable entity"). Constraints form a single-parent hierarchy; a
//! generic converter registered for a constraint serves every argument type
//! whose declared capabilities fall under it.

use std::fmt;

/// A node in the constraint hierarchy.
#[derive(Debug)]
pub struct TypeConstraint {
    name: &'static str,
    parent: Option<&'static TypeConstraint>,
}

impl TypeConstraint {
    /// Declares a root constraint.
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Declares a constraint derived from `parent`.
    #[must_use]
    pub const fn derived(name: &'static str, parent: &'static Self) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// Returns the constraint name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the parent constraint.
    #[must_use]
    pub const fn parent(&self) -> Option<&'static Self> {
        self.parent
    }

    /// Returns `true` when `other` is this constraint or derives from it.
    #[must_use]
    pub fn is_assignable_from(&self, other: &Self) -> bool {
        let mut current = Some(other);
        while let Some(constraint) = current {
            if constraint == self {
                return true;
            }
            current = constraint.parent;
        }
        false
    }

    /// Returns the number of ancestors above this constraint.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent;
        while let Some(constraint) = current {
            depth += 1;
            current = constraint.parent;
        }
        depth
    }
}

impl PartialEq for TypeConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeConstraint {}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Every argument type.
pub static ANY: TypeConstraint = TypeConstraint::root("any");
/// Scalar values.
pub static SCALAR: TypeConstraint = TypeConstraint::derived("scalar", &ANY);
/// Integral scalars convertible from a 64-bit integer.
pub static INTEGER: TypeConstraint = TypeConstraint::derived("integer", &SCALAR);
/// Floating-point scalars.
pub static FLOAT: TypeConstraint = TypeConstraint::derived("float", &SCALAR);
/// Enumerations selected by choice name.
pub static CHOICE: TypeConstraint = TypeConstraint::derived("choice", &ANY);
/// Platform entities resolved by the transport.
pub static ENTITY: TypeConstraint = TypeConstraint::derived("entity", &ANY);
/// Entities that can be mentioned (users and roles).
pub static MENTIONABLE: TypeConstraint = TypeConstraint::derived("mentionable", &ENTITY);
/// Users.
pub static USER: TypeConstraint = TypeConstraint::derived("user", &MENTIONABLE);
/// Roles.
pub static ROLE: TypeConstraint = TypeConstraint::derived("role", &MENTIONABLE);
/// Channels.
pub static CHANNEL: TypeConstraint = TypeConstraint::derived("channel", &ENTITY);
/// Messages.
pub static MESSAGE: TypeConstraint = TypeConstraint::derived("message", &ENTITY);
/// Attachments.
pub static ATTACHMENT: TypeConstraint = TypeConstraint::derived("attachment", &ENTITY);
