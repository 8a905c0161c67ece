//! Precondition contracts.
//!
//! A precondition is declared on exactly one of a module, a command or a
//! parameter. Module and command preconditions may carry a group label:
//! preconditions sharing a label pass when any one of them passes, while
//! unlabelled preconditions must all pass.

use async_trait::async_trait;
use thiserror::Error;

use super::{Argument, CommandInfo, InteractionContext, ParameterInfo};
use crate::interactions::ports::ServiceResolver;

/// Outcome of a single precondition check.
pub type PreconditionResult = Result<(), PreconditionError>;

/// A rejected precondition check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct PreconditionError {
    reason: String,
}

impl PreconditionError {
    /// Creates a rejection with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the rejection reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A check run before a command executes.
#[async_trait]
pub trait Precondition: Send + Sync {
    /// Returns the group label, if any.
    fn group(&self) -> Option<&str> {
        None
    }

    /// Checks whether `command` may run for `context`.
    async fn check(
        &self,
        context: &InteractionContext,
        command: &CommandInfo,
        services: &dyn ServiceResolver,
    ) -> PreconditionResult;
}

/// A check run against one bound argument.
#[async_trait]
pub trait ParameterPrecondition: Send + Sync {
    /// Checks whether `value` is acceptable for `parameter`.
    async fn check(
        &self,
        context: &InteractionContext,
        parameter: &ParameterInfo,
        value: &Argument,
        services: &dyn ServiceResolver,
    ) -> PreconditionResult;
}

/// A precondition backed by a synchronous closure.
pub struct FnPrecondition<F> {
    group: Option<String>,
    check: F,
}

impl<F> FnPrecondition<F>
where
    F: Fn(&InteractionContext, &CommandInfo) -> PreconditionResult + Send + Sync,
{
    /// Wraps an ungrouped check.
    pub const fn new(check: F) -> Self {
        Self { group: None, check }
    }

    /// Places the check in a named OR group.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

#[async_trait]
impl<F> Precondition for FnPrecondition<F>
where
    F: Fn(&InteractionContext, &CommandInfo) -> PreconditionResult + Send + Sync,
{
    fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    async fn check(
        &self,
        context: &InteractionContext,
        command: &CommandInfo,
        _services: &dyn ServiceResolver,
    ) -> PreconditionResult {
        (self.check)(context, command)
    }
}

/// A parameter precondition backed by a synchronous closure.
pub struct FnParameterPrecondition<F> {
    check: F,
}

impl<F> FnParameterPrecondition<F>
where
    F: Fn(&ParameterInfo, &Argument) -> PreconditionResult + Send + Sync,
{
    /// Wraps a check.
    pub const fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<F> ParameterPrecondition for FnParameterPrecondition<F>
where
    F: Fn(&ParameterInfo, &Argument) -> PreconditionResult + Send + Sync,
{
    async fn check(
        &self,
        _context: &InteractionContext,
        parameter: &ParameterInfo,
        value: &Argument,
        _services: &dyn ServiceResolver,
    ) -> PreconditionResult {
        (self.check)(parameter, value)
    }
}

/// Where an interaction must originate for a command to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequireContext {
    /// Only inside a guild.
    Guild,
    /// Only in direct messages.
    DirectMessage,
}

#[async_trait]
impl Precondition for RequireContext {
    async fn check(
        &self,
        context: &InteractionContext,
        command: &CommandInfo,
        _services: &dyn ServiceResolver,
    ) -> PreconditionResult {
        match (self, context.guild_id()) {
            (Self::Guild, Some(_)) | (Self::DirectMessage, None) => Ok(()),
            (Self::Guild, None) => Err(PreconditionError::new(format!(
                "'{}' can only be used inside a guild",
                command.name()
            ))),
            (Self::DirectMessage, Some(_)) => Err(PreconditionError::new(format!(
                "'{}' can only be used in direct messages",
                command.name()
            ))),
        }
    }
}
