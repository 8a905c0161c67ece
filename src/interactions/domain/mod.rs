//! Domain model for interaction command dispatch.
//!
//! Inbound interaction payloads, the immutable module, command and parameter
//! descriptions built from the builder API, type-erased handler arguments,
//! and the uniform dispatch result. Routing and execution live in the
//! service layer.

mod argument;
mod argument_type;
mod builder;
mod command;
pub mod constraint;
mod context;
mod converter;
mod error;
mod ids;
mod interaction;
mod module;
mod outcome;
mod parameter;
mod precondition;
mod report;
mod result;

pub use argument::{Argument, ArgumentError, ArgumentValue, Arguments};
pub use argument_type::{ArgumentType, ArgumentTypeInfo, Capability, ChoiceArgument};
pub use builder::{
    CommandBuilder, CommandDefinition, ModuleBuilder, ModuleDefinition, ParameterBuilder,
    ParameterDefinition,
};
pub use command::{
    CommandCall, CommandHandler, CommandInfo, CommandKind, ContextCommandKind, HandlerInvocation,
    RunMode,
};
pub use constraint::TypeConstraint;
pub use context::InteractionContext;
pub use converter::{ConversionError, TypeConverter};
pub use error::ModuleBuildError;
pub use ids::{EntityId, ModuleId};
pub use interaction::{
    ApplicationCommandType, AttachmentRef, AutocompleteData, ChannelKind, ChannelRef,
    CommandData, CommandOption, ComponentData, Interaction, InteractionData, InteractionKind,
    Mentionable, MessageRef, ModalField, ModalSubmitData, NamedValue, OptionValue, ResolvedPath,
    RoleRef, UserRef, resolve_option_path,
};
pub use module::{InteractionModule, ModuleFactory, ModuleInfo, ModuleInstance, module_factory};
pub use outcome::{CommandOutcome, IntoCommandOutcome};
pub use parameter::{
    AutocompleteChoice, AutocompleteHandler, AutocompleteRequest, FnAutocomplete, ParameterChoice,
    ParameterInfo,
};
pub use precondition::{
    FnParameterPrecondition, FnPrecondition, ParameterPrecondition, Precondition,
    PreconditionError, PreconditionResult, RequireContext,
};
pub use report::ExecutionReport;
pub use result::{ErrorKind, HandlerError, HandlerPanic, InteractionError, InteractionResult};
