//! Builder API for declaring modules, commands and parameters.
//!
//! Builders produce an erased [`ModuleDefinition`]; the registry validates
//! definitions, binds type converters and freezes them into
//! [`ModuleInfo`](super::ModuleInfo) trees.
//!
//! ```
//! use switchboard::interactions::domain::{
//!     CommandCall, HandlerError, InteractionModule, ModuleBuilder, ParameterBuilder, UserRef,
//! };
//! use switchboard::interactions::ports::ServiceResolver;
//! use std::sync::Arc;
//!
//! struct Moderation;
//!
//! impl InteractionModule for Moderation {
//!     fn construct(_services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
//!         Ok(Self)
//!     }
//! }
//!
//! let definition = ModuleBuilder::<Moderation>::new()
//!     .group("admin", "Administration")
//!     .slash_command("ban", "Ban a user", |command| {
//!         command
//!             .parameter(ParameterBuilder::of::<UserRef>("user"))
//!             .handler(|_module: Arc<Moderation>, _call: CommandCall| async {})
//!     })
//!     .build();
//!
//! assert_eq!(definition.name(), "Moderation");
//! ```

use std::any::{TypeId, type_name};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use super::{
    Argument, ArgumentType, ArgumentTypeInfo, ArgumentValue, AutocompleteHandler, CommandCall,
    CommandHandler, CommandKind, CommandOutcome, ContextCommandKind, HandlerError,
    HandlerInvocation, IntoCommandOutcome, InteractionModule, ModuleFactory, OptionValue,
    ParameterChoice, ParameterPrecondition, Precondition, RunMode, module_factory,
};

/// Erased description of a module, ready to be built by the registry.
pub struct ModuleDefinition {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) name: String,
    pub(crate) group: Option<(String, String)>,
    pub(crate) default_permission: bool,
    pub(crate) preconditions: Vec<Arc<dyn Precondition>>,
    pub(crate) commands: Vec<CommandDefinition>,
    pub(crate) submodules: Vec<ModuleDefinition>,
    pub(crate) factory: ModuleFactory,
}

impl ModuleDefinition {
    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the handler type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the declared commands.
    #[must_use]
    pub fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    /// Returns the declared submodules.
    #[must_use]
    pub fn submodules(&self) -> &[Self] {
        &self.submodules
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("group", &self.group)
            .field("commands", &self.commands)
            .field("submodules", &self.submodules)
            .finish_non_exhaustive()
    }
}

/// Erased description of one command.
pub struct CommandDefinition {
    pub(crate) kind: CommandKind,
    pub(crate) name: String,
    pub(crate) method_name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) default_permission: bool,
    pub(crate) ignore_group_names: bool,
    pub(crate) run_mode: Option<RunMode>,
    pub(crate) parameters: Vec<ParameterDefinition>,
    pub(crate) preconditions: Vec<Arc<dyn Precondition>>,
    pub(crate) handler: Option<CommandHandler>,
}

impl CommandDefinition {
    /// Returns the command name or identifier pattern.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the command variant.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

/// Erased description of one parameter.
pub struct ParameterDefinition {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) argument_type: ArgumentTypeInfo,
    pub(crate) required: bool,
    pub(crate) default_value: Option<Argument>,
    pub(crate) variadic: bool,
    pub(crate) choices: Vec<ParameterChoice>,
    pub(crate) min_value: Option<f64>,
    pub(crate) max_value: Option<f64>,
    pub(crate) preconditions: Vec<Arc<dyn ParameterPrecondition>>,
    pub(crate) autocomplete: Option<Arc<dyn AutocompleteHandler>>,
}

impl fmt::Debug for ParameterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDefinition")
            .field("name", &self.name)
            .field("type", &self.argument_type.name())
            .field("required", &self.required)
            .field("variadic", &self.variadic)
            .finish_non_exhaustive()
    }
}

/// Declares a module owned by handler type `M`.
pub struct ModuleBuilder<M> {
    definition: ModuleDefinition,
    module: PhantomData<fn() -> M>,
}

impl<M: InteractionModule> ModuleBuilder<M> {
    /// Starts a module named after `M`.
    #[must_use]
    pub fn new() -> Self {
        let full_name = type_name::<M>();
        let base = full_name.split('<').next().unwrap_or(full_name);
        let name = base.rsplit("::").next().unwrap_or(base);
        Self {
            definition: ModuleDefinition {
                type_id: TypeId::of::<M>(),
                type_name: full_name,
                name: name.to_owned(),
                group: None,
                default_permission: true,
                preconditions: Vec::new(),
                commands: Vec::new(),
                submodules: Vec::new(),
                factory: module_factory::<M>(),
            },
            module: PhantomData,
        }
    }

    /// Overrides the module name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.definition.name = name.into();
        self
    }

    /// Nests the module's slash commands under a group.
    #[must_use]
    pub fn group(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.definition.group = Some((name.into(), description.into()));
        self
    }

    /// Sets whether the group is enabled for everyone by default.
    #[must_use]
    pub const fn default_permission(mut self, enabled: bool) -> Self {
        self.definition.default_permission = enabled;
        self
    }

    /// Adds a precondition inherited by every command in the module subtree.
    #[must_use]
    pub fn precondition(mut self, precondition: impl Precondition + 'static) -> Self {
        self.definition.preconditions.push(Arc::new(precondition));
        self
    }

    /// Adds a nested module.
    #[must_use]
    pub fn submodule<S: InteractionModule>(mut self, submodule: ModuleBuilder<S>) -> Self {
        self.definition.submodules.push(submodule.build());
        self
    }

    /// Declares a slash command.
    #[must_use]
    pub fn slash_command(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        configure: impl FnOnce(CommandBuilder<M>) -> CommandBuilder<M>,
    ) -> Self {
        let command = CommandBuilder::new(CommandKind::Slash, name.into())
            .with_description(description.into());
        self.command(configure(command))
    }

    /// Declares a user context-menu command.
    #[must_use]
    pub fn user_command(
        self,
        name: impl Into<String>,
        configure: impl FnOnce(CommandBuilder<M>) -> CommandBuilder<M>,
    ) -> Self {
        let command =
            CommandBuilder::new(CommandKind::Context(ContextCommandKind::User), name.into());
        self.command(configure(command))
    }

    /// Declares a message context-menu command.
    #[must_use]
    pub fn message_command(
        self,
        name: impl Into<String>,
        configure: impl FnOnce(CommandBuilder<M>) -> CommandBuilder<M>,
    ) -> Self {
        let command =
            CommandBuilder::new(CommandKind::Context(ContextCommandKind::Message), name.into());
        self.command(configure(command))
    }

    /// Declares a component handler for a custom identifier pattern.
    #[must_use]
    pub fn component_command(
        self,
        custom_id: impl Into<String>,
        configure: impl FnOnce(CommandBuilder<M>) -> CommandBuilder<M>,
    ) -> Self {
        let command = CommandBuilder::new(CommandKind::Component, custom_id.into());
        self.command(configure(command))
    }

    /// Declares a modal handler for a custom identifier pattern.
    #[must_use]
    pub fn modal_command(
        self,
        custom_id: impl Into<String>,
        configure: impl FnOnce(CommandBuilder<M>) -> CommandBuilder<M>,
    ) -> Self {
        let command = CommandBuilder::new(CommandKind::Modal, custom_id.into());
        self.command(configure(command))
    }

    /// Declares an autocomplete handler.
    ///
    /// `pattern` is the space-separated command path followed by the
    /// parameter name, for example `"play song"`.
    #[must_use]
    pub fn autocomplete_command(
        self,
        pattern: impl Into<String>,
        configure: impl FnOnce(CommandBuilder<M>) -> CommandBuilder<M>,
    ) -> Self {
        let command = CommandBuilder::new(CommandKind::Autocomplete, pattern.into());
        self.command(configure(command))
    }

    fn command(mut self, command: CommandBuilder<M>) -> Self {
        self.definition.commands.push(command.definition);
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> ModuleDefinition {
        self.definition
    }
}

impl<M: InteractionModule> Default for ModuleBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: InteractionModule> From<ModuleBuilder<M>> for ModuleDefinition {
    fn from(builder: ModuleBuilder<M>) -> Self {
        builder.build()
    }
}

/// Declares one command of module `M`.
pub struct CommandBuilder<M> {
    definition: CommandDefinition,
    module: PhantomData<fn() -> M>,
}

impl<M: InteractionModule> CommandBuilder<M> {
    const fn new(kind: CommandKind, name: String) -> Self {
        Self {
            definition: CommandDefinition {
                kind,
                name,
                method_name: None,
                description: None,
                default_permission: true,
                ignore_group_names: false,
                run_mode: None,
                parameters: Vec::new(),
                preconditions: Vec::new(),
                handler: None,
            },
            module: PhantomData,
        }
    }

    fn with_description(mut self, description: String) -> Self {
        self.definition.description = Some(description);
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterBuilder) -> Self {
        self.definition.parameters.push(parameter.definition);
        self
    }

    /// Adds a command-tier precondition.
    #[must_use]
    pub fn precondition(mut self, precondition: impl Precondition + 'static) -> Self {
        self.definition.preconditions.push(Arc::new(precondition));
        self
    }

    /// Overrides the configured default run mode.
    #[must_use]
    pub const fn run_mode(mut self, mode: RunMode) -> Self {
        self.definition.run_mode = Some(mode);
        self
    }

    /// Registers the command as a standalone root, ignoring module groups.
    #[must_use]
    pub const fn ignore_group_names(mut self) -> Self {
        self.definition.ignore_group_names = true;
        self
    }

    /// Sets whether the command is enabled for everyone by default.
    #[must_use]
    pub const fn default_permission(mut self, enabled: bool) -> Self {
        self.definition.default_permission = enabled;
        self
    }

    /// Sets the diagnostic handler name.
    #[must_use]
    pub fn method_name(mut self, name: impl Into<String>) -> Self {
        self.definition.method_name = Some(name.into());
        self
    }

    /// Binds the handler body.
    ///
    /// The handler receives the module instance constructed for this
    /// dispatch and the bound call. It may return `()`, an
    /// [`InteractionResult`](super::InteractionResult), an `Option` of
    /// either, or a `Result` whose error converts into [`HandlerError`].
    #[must_use]
    pub fn handler<F, Fut, R>(mut self, handler: F) -> Self
    where
        F: Fn(Arc<M>, CommandCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoCommandOutcome,
    {
        let shared = Arc::new(handler);
        let erased: CommandHandler = Arc::new(
            move |invocation: HandlerInvocation| -> BoxFuture<'static, Result<CommandOutcome, HandlerError>> {
                let body = Arc::clone(&shared);
                Box::pin(async move {
                    let HandlerInvocation {
                        module: instance,
                        context,
                        arguments,
                        services,
                    } = invocation;
                    let Ok(module) = instance.into_any().downcast::<M>() else {
                        return Err(HandlerError::msg(format!(
                            "module instance is not a {}",
                            type_name::<M>()
                        )));
                    };
                    let call = CommandCall {
                        context,
                        arguments,
                        services,
                    };
                    (*body)(module, call).await.into_outcome()
                })
            },
        );
        self.definition.handler = Some(erased);
        self
    }
}

/// Declares one parameter.
pub struct ParameterBuilder {
    definition: ParameterDefinition,
}

impl ParameterBuilder {
    /// Starts a required parameter of type `T`.
    ///
    /// For a variadic parameter `T` is the element type.
    #[must_use]
    pub fn of<T: ArgumentType>(name: impl Into<String>) -> Self {
        Self {
            definition: ParameterDefinition {
                name: name.into(),
                description: None,
                argument_type: ArgumentTypeInfo::of::<T>(),
                required: true,
                default_value: None,
                variadic: false,
                choices: Vec::new(),
                min_value: None,
                max_value: None,
                preconditions: Vec::new(),
                autocomplete: None,
            },
        }
    }

    /// Sets the description shown to users.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.definition.description = Some(description.into());
        self
    }

    /// Makes the parameter optional; it binds a missing argument when
    /// absent.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.definition.required = false;
        self
    }

    /// Makes the parameter optional with a default value.
    #[must_use]
    pub fn default_value(mut self, value: impl ArgumentValue) -> Self {
        self.definition.required = false;
        self.definition.default_value = Some(Argument::new(value));
        self
    }

    /// Collects every remaining value into one array argument.
    #[must_use]
    pub const fn variadic(mut self) -> Self {
        self.definition.variadic = true;
        self
    }

    /// Restricts the raw value to a declared choice.
    #[must_use]
    pub fn choice(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.definition
            .choices
            .push(ParameterChoice::new(name, value));
        self
    }

    /// Sets the inclusive lower numeric bound.
    #[must_use]
    pub const fn min_value(mut self, min: f64) -> Self {
        self.definition.min_value = Some(min);
        self
    }

    /// Sets the inclusive upper numeric bound.
    #[must_use]
    pub const fn max_value(mut self, max: f64) -> Self {
        self.definition.max_value = Some(max);
        self
    }

    /// Adds a precondition checked against the bound argument.
    #[must_use]
    pub fn precondition(mut self, precondition: impl ParameterPrecondition + 'static) -> Self {
        self.definition.preconditions.push(Arc::new(precondition));
        self
    }

    /// Attaches an autocomplete handler.
    #[must_use]
    pub fn autocomplete(mut self, handler: impl AutocompleteHandler + 'static) -> Self {
        self.definition.autocomplete = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for ParameterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.definition, f)
    }
}
