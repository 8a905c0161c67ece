//! Command descriptions.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::{
    ApplicationCommandType, Arguments, CommandOutcome, HandlerError, Interaction, InteractionContext,
    InteractionData, ModuleFactory, ModuleId, ModuleInstance, ParameterInfo, Precondition,
};
use crate::interactions::ports::ServiceResolver;

/// Whether a dispatch awaits the handler or detaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// The dispatch call awaits the handler and returns its real result.
    Sync,
    /// The handler runs as a detached task; the dispatch call returns a
    /// success placeholder.
    Async,
}

/// Target of a context-menu command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCommandKind {
    /// Invoked on a user.
    User,
    /// Invoked on a message.
    Message,
}

/// Command variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Slash (chat input) command.
    Slash,
    /// Context-menu command.
    Context(ContextCommandKind),
    /// Button or select menu handler.
    Component,
    /// Explicitly routed autocomplete handler.
    Autocomplete,
    /// Modal submission handler.
    Modal,
}

impl CommandKind {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slash => "slash",
            Self::Context(ContextCommandKind::User) => "user",
            Self::Context(ContextCommandKind::Message) => "message",
            Self::Component => "component",
            Self::Autocomplete => "autocomplete",
            Self::Modal => "modal",
        }
    }

    /// Returns `true` when a command of this kind can handle `interaction`.
    #[must_use]
    pub const fn accepts(self, interaction: &Interaction) -> bool {
        match (self, &interaction.data) {
            (Self::Slash, InteractionData::Command(data)) => {
                matches!(data.command_type, ApplicationCommandType::ChatInput)
            }
            (Self::Context(ContextCommandKind::User), InteractionData::Command(data)) => {
                matches!(data.command_type, ApplicationCommandType::User)
            }
            (Self::Context(ContextCommandKind::Message), InteractionData::Command(data)) => {
                matches!(data.command_type, ApplicationCommandType::Message)
            }
            (Self::Component, InteractionData::Component(_))
            | (Self::Autocomplete, InteractionData::Autocomplete(_))
            | (Self::Modal, InteractionData::ModalSubmit(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything an erased handler needs for one invocation.
pub struct HandlerInvocation {
    /// The freshly constructed module instance.
    pub module: Arc<dyn ModuleInstance>,
    /// The dispatch context.
    pub context: InteractionContext,
    /// Bound arguments in parameter order.
    pub arguments: Arguments,
    /// Dependency resolver.
    pub services: Arc<dyn ServiceResolver>,
}

/// The type-erased invocation closure stored on a command.
pub type CommandHandler = Arc<
    dyn Fn(HandlerInvocation) -> BoxFuture<'static, Result<CommandOutcome, HandlerError>>
        + Send
        + Sync,
>;

/// What a typed handler receives alongside its module instance.
#[derive(Clone)]
pub struct CommandCall {
    /// The dispatch context.
    pub context: InteractionContext,
    /// Bound arguments in parameter order.
    pub arguments: Arguments,
    /// Dependency resolver.
    pub services: Arc<dyn ServiceResolver>,
}

impl fmt::Debug for CommandCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCall")
            .field("context", &self.context)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// An immutable, fully resolved command.
///
/// Derived properties (routing path, top-level status, the effective module
/// precondition chain) are computed once when the owning module is built.
#[derive(Clone)]
pub struct CommandInfo {
    pub(crate) name: String,
    pub(crate) method_name: String,
    pub(crate) kind: CommandKind,
    pub(crate) description: Option<String>,
    pub(crate) default_permission: bool,
    pub(crate) ignore_group_names: bool,
    pub(crate) run_mode: Option<RunMode>,
    pub(crate) parameters: Vec<ParameterInfo>,
    pub(crate) preconditions: Vec<Arc<dyn Precondition>>,
    pub(crate) module_preconditions: Vec<Arc<dyn Precondition>>,
    pub(crate) group_path: Vec<String>,
    pub(crate) module_id: ModuleId,
    pub(crate) module_name: String,
    pub(crate) factory: ModuleFactory,
    pub(crate) handler: CommandHandler,
}

impl CommandInfo {
    /// Returns the command name, or the identifier pattern for component,
    /// modal and autocomplete commands.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the diagnostic handler name.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Returns the command variant.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Returns the description of a slash command.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the command is enabled for everyone by default.
    #[must_use]
    pub const fn default_permission(&self) -> bool {
        self.default_permission
    }

    /// Returns `true` when the command opts out of group nesting.
    #[must_use]
    pub const fn ignore_group_names(&self) -> bool {
        self.ignore_group_names
    }

    /// Returns the run mode override, if one was declared.
    #[must_use]
    pub const fn run_mode(&self) -> Option<RunMode> {
        self.run_mode
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// Returns the preconditions declared on the command itself.
    #[must_use]
    pub fn preconditions(&self) -> &[Arc<dyn Precondition>] {
        &self.preconditions
    }

    /// Returns the inherited module preconditions, outermost module first.
    #[must_use]
    pub fn module_preconditions(&self) -> &[Arc<dyn Precondition>] {
        &self.module_preconditions
    }

    /// Returns the group tokens the command nests under, outermost first.
    ///
    /// Empty for top-level commands.
    #[must_use]
    pub fn group_path(&self) -> &[String] {
        &self.group_path
    }

    /// Returns `true` when the command registers as a standalone root.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.group_path.is_empty()
    }

    /// Returns the owning module identifier.
    #[must_use]
    pub const fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Returns the owning module name.
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Returns the factory constructing the owning module.
    #[must_use]
    pub const fn factory(&self) -> &ModuleFactory {
        &self.factory
    }

    /// Returns the bound invocation closure.
    #[must_use]
    pub const fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    /// Returns the space-joined path used in logs.
    #[must_use]
    pub fn display_path(&self) -> String {
        let mut tokens: Vec<&str> = self.group_path.iter().map(String::as_str).collect();
        tokens.push(&self.name);
        tokens.join(" ")
    }
}

impl fmt::Debug for CommandInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("group_path", &self.group_path)
            .field("module", &self.module_name)
            .field("run_mode", &self.run_mode)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
