//! Module descriptions and handler-owning module instances.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{
    CommandInfo, HandlerError, InteractionContext, InteractionResult, ModuleId, Precondition,
};
use crate::interactions::ports::ServiceResolver;

/// A type owning a set of command handlers.
///
/// A fresh instance is constructed through [`InteractionModule::construct`]
/// for every dispatch and dropped once the after hook has run; types
/// holding resources release them in `Drop`.
#[async_trait]
pub trait InteractionModule: Send + Sync + 'static {
    /// Builds an instance, pulling dependencies from `services`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when a dependency cannot be resolved.
    fn construct(services: &dyn ServiceResolver) -> Result<Self, HandlerError>
    where
        Self: Sized;

    /// Runs before the handler body.
    ///
    /// # Errors
    ///
    /// A fault skips the handler body and becomes the dispatch result.
    async fn before_execute(
        &self,
        _context: &InteractionContext,
        _command: &CommandInfo,
    ) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Runs after the handler body, whatever its outcome.
    ///
    /// # Errors
    ///
    /// A fault replaces a result that does not already carry one.
    async fn after_execute(
        &self,
        _context: &InteractionContext,
        _command: &CommandInfo,
        _result: &InteractionResult,
    ) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// Object-safe view of an [`InteractionModule`] instance.
#[async_trait]
pub trait ModuleInstance: Send + Sync {
    /// Runs the before hook.
    async fn run_before(
        &self,
        context: &InteractionContext,
        command: &CommandInfo,
    ) -> Result<(), HandlerError>;

    /// Runs the after hook.
    async fn run_after(
        &self,
        context: &InteractionContext,
        command: &CommandInfo,
        result: &InteractionResult,
    ) -> Result<(), HandlerError>;

    /// Erases the instance for downcasting back to its concrete type.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

#[async_trait]
impl<M: InteractionModule> ModuleInstance for M {
    async fn run_before(
        &self,
        context: &InteractionContext,
        command: &CommandInfo,
    ) -> Result<(), HandlerError> {
        self.before_execute(context, command).await
    }

    async fn run_after(
        &self,
        context: &InteractionContext,
        command: &CommandInfo,
        result: &InteractionResult,
    ) -> Result<(), HandlerError> {
        self.after_execute(context, command, result).await
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Constructs module instances through the dependency resolver.
pub type ModuleFactory =
    Arc<dyn Fn(&dyn ServiceResolver) -> Result<Arc<dyn ModuleInstance>, HandlerError> + Send + Sync>;

/// Returns the factory for module type `M`.
#[must_use]
pub fn module_factory<M: InteractionModule>() -> ModuleFactory {
    Arc::new(
        |services: &dyn ServiceResolver| -> Result<Arc<dyn ModuleInstance>, HandlerError> {
            let instance: Arc<dyn ModuleInstance> = Arc::new(M::construct(services)?);
            Ok(instance)
        },
    )
}

/// An immutable, fully built module.
#[derive(Clone)]
pub struct ModuleInfo {
    pub(crate) id: ModuleId,
    pub(crate) name: String,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) group_name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) default_permission: bool,
    pub(crate) parent: Option<ModuleId>,
    pub(crate) group_path: Vec<String>,
    pub(crate) submodules: Vec<Arc<ModuleInfo>>,
    pub(crate) slash_commands: Vec<Arc<CommandInfo>>,
    pub(crate) context_commands: Vec<Arc<CommandInfo>>,
    pub(crate) component_commands: Vec<Arc<CommandInfo>>,
    pub(crate) modal_commands: Vec<Arc<CommandInfo>>,
    pub(crate) autocomplete_commands: Vec<Arc<CommandInfo>>,
    pub(crate) preconditions: Vec<Arc<dyn Precondition>>,
}

impl ModuleInfo {
    /// Returns the module identifier.
    #[must_use]
    pub const fn id(&self) -> ModuleId {
        self.id
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the handler type identifier.
    #[must_use]
    pub const fn handler_type(&self) -> TypeId {
        self.type_id
    }

    /// Returns the handler type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the slash command group name, if the module declares one.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group_name.as_deref()
    }

    /// Returns the group description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the group is enabled for everyone by default.
    #[must_use]
    pub const fn default_permission(&self) -> bool {
        self.default_permission
    }

    /// Returns the parent module identifier.
    #[must_use]
    pub const fn parent(&self) -> Option<ModuleId> {
        self.parent
    }

    /// Returns the group tokens of this module and its ancestors, outermost
    /// first.
    #[must_use]
    pub fn group_path(&self) -> &[String] {
        &self.group_path
    }

    /// Returns `true` when the module carries a group and no ancestor does.
    #[must_use]
    pub fn is_top_level_group(&self) -> bool {
        self.group_name.is_some() && self.group_path.len() == 1
    }

    /// Returns the submodules in declaration order.
    #[must_use]
    pub fn submodules(&self) -> &[Arc<Self>] {
        &self.submodules
    }

    /// Returns the slash commands.
    #[must_use]
    pub fn slash_commands(&self) -> &[Arc<CommandInfo>] {
        &self.slash_commands
    }

    /// Returns the user and message context commands.
    #[must_use]
    pub fn context_commands(&self) -> &[Arc<CommandInfo>] {
        &self.context_commands
    }

    /// Returns the component commands.
    #[must_use]
    pub fn component_commands(&self) -> &[Arc<CommandInfo>] {
        &self.component_commands
    }

    /// Returns the modal commands.
    #[must_use]
    pub fn modal_commands(&self) -> &[Arc<CommandInfo>] {
        &self.modal_commands
    }

    /// Returns the explicitly routed autocomplete commands.
    #[must_use]
    pub fn autocomplete_commands(&self) -> &[Arc<CommandInfo>] {
        &self.autocomplete_commands
    }

    /// Returns the preconditions declared directly on this module.
    #[must_use]
    pub fn preconditions(&self) -> &[Arc<dyn Precondition>] {
        &self.preconditions
    }

    /// Iterates over every command declared directly on this module.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<CommandInfo>> {
        self.slash_commands
            .iter()
            .chain(&self.context_commands)
            .chain(&self.component_commands)
            .chain(&self.modal_commands)
            .chain(&self.autocomplete_commands)
    }

    /// Returns this module and every module below it, depth first.
    #[must_use]
    pub fn descendants(self: &Arc<Self>) -> Vec<Arc<Self>> {
        let mut modules = vec![Arc::clone(self)];
        for submodule in &self.submodules {
            modules.extend(submodule.descendants());
        }
        modules
    }
}

impl fmt::Debug for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInfo")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("group_name", &self.group_name)
            .field("parent", &self.parent)
            .field("submodules", &self.submodules)
            .field("slash_commands", &self.slash_commands.len())
            .field("context_commands", &self.context_commands.len())
            .field("component_commands", &self.component_commands.len())
            .field("modal_commands", &self.modal_commands.len())
            .field("autocomplete_commands", &self.autocomplete_commands.len())
            .finish_non_exhaustive()
    }
}
