//! Registry front door.
//!
//! Provides [`InteractionService`], which owns the loaded module trees and
//! the per-kind routers, serializes structural mutation, and dispatches
//! interactions without taking a lock.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use mockable::Clock;
use thiserror::Error;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use crate::interactions::domain::{
    ApplicationCommandType, AutocompleteData, AutocompleteRequest, CommandInfo, CommandKind,
    ContextCommandKind, ExecutionReport, HandlerError, InteractionContext, InteractionData,
    InteractionModule, InteractionResult, ModuleBuildError, ModuleDefinition, ModuleId,
    ModuleInfo, resolve_option_path,
};
use crate::interactions::ports::ServiceResolver;

use super::assembly::ModuleAssembler;
use super::binding::BindingInputs;
use super::executor::{CommandExecutor, DispatchError, DispatchResult, Reporter, guarded};
use super::router::{CommandRouter, RouteMatch, RouterError};
use super::{InteractionServiceConfig, TypeConverterRegistry};

/// Errors returned by registry mutation.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// A module definition is invalid.
    #[error(transparent)]
    Build(#[from] ModuleBuildError),

    /// Two commands resolve to the same route.
    #[error(transparent)]
    Route(#[from] RouterError),

    /// A module of the same handler type is already loaded.
    #[error("module type {0} is already loaded")]
    AlreadyLoaded(&'static str),

    /// No loaded module has the identifier.
    #[error("module {0} is not loaded")]
    ModuleNotFound(ModuleId),

    /// No loaded module has the handler type.
    #[error("module type {0} is not loaded")]
    TypeNotLoaded(&'static str),

    /// The module is nested inside another module and cannot be unloaded on
    /// its own.
    #[error("module {0} is a submodule; unload its root module instead")]
    NotRootModule(ModuleId),
}

/// Result type for registry mutation.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Per-kind routers built from one set of modules.
struct Routers {
    slash: CommandRouter<CommandInfo>,
    user: CommandRouter<CommandInfo>,
    message: CommandRouter<CommandInfo>,
    component: CommandRouter<CommandInfo>,
    modal: CommandRouter<CommandInfo>,
    autocomplete: CommandRouter<CommandInfo>,
}

impl Routers {
    /// Slash and context paths are already tokenized and never contain
    /// wildcards. Component and modal identifiers split on the configured
    /// delimiters; autocomplete patterns split on spaces.
    fn new(config: &InteractionServiceConfig) -> Self {
        let wildcard = config.wildcard_marker.clone();
        Self {
            slash: CommandRouter::new(Vec::new(), None),
            user: CommandRouter::new(Vec::new(), None),
            message: CommandRouter::new(Vec::new(), None),
            component: CommandRouter::new(config.custom_id_delimiters.clone(), wildcard.clone()),
            modal: CommandRouter::new(config.custom_id_delimiters.clone(), wildcard.clone()),
            autocomplete: CommandRouter::new(vec![' '], wildcard),
        }
    }

    fn build(
        config: &InteractionServiceConfig,
        modules: &[Arc<ModuleInfo>],
    ) -> Result<Self, RouterError> {
        let mut routers = Self::new(config);
        for module in modules.iter().flat_map(ModuleInfo::descendants) {
            for command in module.commands() {
                routers.insert(command)?;
            }
        }
        Ok(routers)
    }

    fn insert(&mut self, command: &Arc<CommandInfo>) -> Result<(), RouterError> {
        let leaf = vec![command.name().to_owned()];
        match command.kind() {
            CommandKind::Slash => {
                let mut path = command.group_path().to_vec();
                path.push(command.name().to_owned());
                self.slash.insert(&path, Arc::clone(command))
            }
            CommandKind::Context(ContextCommandKind::User) => {
                self.user.insert(&leaf, Arc::clone(command))
            }
            CommandKind::Context(ContextCommandKind::Message) => {
                self.message.insert(&leaf, Arc::clone(command))
            }
            CommandKind::Component => {
                let mut path = command.group_path().to_vec();
                path.extend(self.component.tokenize(command.name()));
                self.component.insert(&path, Arc::clone(command))
            }
            CommandKind::Modal => {
                let mut path = command.group_path().to_vec();
                path.extend(self.modal.tokenize(command.name()));
                self.modal.insert(&path, Arc::clone(command))
            }
            CommandKind::Autocomplete => {
                let mut path = command.group_path().to_vec();
                path.extend(self.autocomplete.tokenize(command.name()));
                self.autocomplete.insert(&path, Arc::clone(command))
            }
        }
    }
}

/// Immutable view of everything loaded, swapped atomically on mutation.
struct RegistrySnapshot {
    roots: Vec<Arc<ModuleInfo>>,
    by_id: HashMap<ModuleId, Arc<ModuleInfo>>,
    by_type: HashMap<TypeId, Arc<ModuleInfo>>,
    routers: Routers,
}

impl RegistrySnapshot {
    fn build(
        config: &InteractionServiceConfig,
        roots: Vec<Arc<ModuleInfo>>,
    ) -> RegistryResult<Self> {
        let mut by_id = HashMap::new();
        let mut by_type = HashMap::new();
        for module in roots.iter().flat_map(ModuleInfo::descendants) {
            if by_type
                .insert(module.handler_type(), Arc::clone(&module))
                .is_some()
            {
                return Err(RegistryError::AlreadyLoaded(module.type_name()));
            }
            by_id.insert(module.id(), module);
        }
        let routers = Routers::build(config, &roots)?;
        Ok(Self {
            roots,
            by_id,
            by_type,
            routers,
        })
    }

    fn empty(config: &InteractionServiceConfig) -> Self {
        Self {
            roots: Vec::new(),
            by_id: HashMap::new(),
            by_type: HashMap::new(),
            routers: Routers::new(config),
        }
    }

    fn commands(&self, select: fn(&ModuleInfo) -> &[Arc<CommandInfo>]) -> Vec<Arc<CommandInfo>> {
        self.roots
            .iter()
            .flat_map(ModuleInfo::descendants)
            .flat_map(|module| select(module.as_ref()).to_vec())
            .collect()
    }
}

/// Interaction command registry and dispatcher.
///
/// Loading and unloading are serialized behind one lock and publish a new
/// snapshot atomically. Dispatch reads the current snapshot and may run
/// concurrently without limit.
pub struct InteractionService<C>
where
    C: Clock + Send + Sync + 'static,
{
    config: InteractionServiceConfig,
    converters: TypeConverterRegistry,
    snapshot: ArcSwap<RegistrySnapshot>,
    mutation: Mutex<()>,
    executor: CommandExecutor<C>,
}

impl<C> InteractionService<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates an empty registry with the built-in type converters.
    #[must_use]
    pub fn new(config: InteractionServiceConfig, clock: Arc<C>) -> Self {
        let (sender, _) = broadcast::channel(config.notification_capacity.max(1));
        let executor = CommandExecutor::new(
            Reporter::new(clock, sender),
            config.default_run_mode,
            config.throw_on_error,
        );
        Self {
            snapshot: ArcSwap::from_pointee(RegistrySnapshot::empty(&config)),
            converters: TypeConverterRegistry::new(),
            mutation: Mutex::new(()),
            executor,
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &InteractionServiceConfig {
        &self.config
    }

    /// Returns the type converter registry used when modules are built.
    #[must_use]
    pub const fn converters(&self) -> &TypeConverterRegistry {
        &self.converters
    }

    /// Subscribes to execution reports.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionReport> {
        self.executor.reporter().subscribe()
    }

    /// Builds and loads a batch of modules.
    ///
    /// The batch is atomic: when any module fails to build or route, nothing
    /// from it is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a definition is invalid, a route is
    /// already taken or a handler type is already loaded.
    pub async fn add_modules(
        &self,
        definitions: impl IntoIterator<Item = ModuleDefinition>,
    ) -> RegistryResult<Vec<Arc<ModuleInfo>>> {
        let _guard = self.mutation.lock().await;
        let assembler = ModuleAssembler::new(&self.converters);
        let built = definitions
            .into_iter()
            .map(|definition| assembler.assemble(definition))
            .collect::<Result<Vec<_>, _>>()?;
        self.install(&built)?;
        Ok(built)
    }

    /// Builds and loads one module.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] under the same conditions as
    /// [`InteractionService::add_modules`].
    pub async fn add_module(
        &self,
        definition: impl Into<ModuleDefinition>,
    ) -> RegistryResult<Arc<ModuleInfo>> {
        let _guard = self.mutation.lock().await;
        let module = ModuleAssembler::new(&self.converters).assemble(definition.into())?;
        self.install(std::slice::from_ref(&module))?;
        Ok(module)
    }

    /// Publishes a snapshot extended by `built`. Callers hold the mutation
    /// lock.
    fn install(&self, built: &[Arc<ModuleInfo>]) -> RegistryResult<()> {
        let current = self.snapshot.load();
        let mut roots = current.roots.clone();
        roots.extend(built.iter().cloned());
        let next = RegistrySnapshot::build(&self.config, roots)?;
        self.snapshot.store(Arc::new(next));

        for module in built {
            let commands: usize = module
                .descendants()
                .iter()
                .map(|descendant| descendant.commands().count())
                .sum();
            info!(
                module = module.name(),
                module_id = %module.id(),
                commands,
                "loaded interaction module"
            );
        }
        Ok(())
    }

    /// Unloads a root module and its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ModuleNotFound`] for an unknown identifier
    /// and [`RegistryError::NotRootModule`] for a submodule.
    pub async fn remove_module(&self, id: ModuleId) -> RegistryResult<Arc<ModuleInfo>> {
        let _guard = self.mutation.lock().await;
        let current = self.snapshot.load_full();
        let Some(removed) = current.roots.iter().find(|root| root.id() == id).cloned() else {
            return Err(if current.by_id.contains_key(&id) {
                RegistryError::NotRootModule(id)
            } else {
                RegistryError::ModuleNotFound(id)
            });
        };

        let roots = current
            .roots
            .iter()
            .filter(|root| root.id() != id)
            .cloned()
            .collect();
        let next = RegistrySnapshot::build(&self.config, roots)?;
        self.snapshot.store(Arc::new(next));
        info!(module = removed.name(), module_id = %id, "unloaded interaction module");
        Ok(removed)
    }

    /// Unloads the root module owned by handler type `M`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TypeNotLoaded`] when no module has the type,
    /// and [`RegistryError::NotRootModule`] when it is a submodule.
    pub async fn remove_module_for<M: InteractionModule>(&self) -> RegistryResult<Arc<ModuleInfo>> {
        let Some(module) = self.module_for::<M>() else {
            return Err(RegistryError::TypeNotLoaded(std::any::type_name::<M>()));
        };
        self.remove_module(module.id()).await
    }

    /// Returns the loaded root modules in load order.
    #[must_use]
    pub fn modules(&self) -> Vec<Arc<ModuleInfo>> {
        self.snapshot.load().roots.clone()
    }

    /// Returns the loaded module with the identifier, submodules included.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<Arc<ModuleInfo>> {
        self.snapshot.load().by_id.get(&id).cloned()
    }

    /// Returns the module owned by handler type `M`.
    #[must_use]
    pub fn module_for<M: InteractionModule>(&self) -> Option<Arc<ModuleInfo>> {
        self.snapshot
            .load()
            .by_type
            .get(&TypeId::of::<M>())
            .cloned()
    }

    /// Returns the parent of a loaded module.
    #[must_use]
    pub fn parent_of(&self, module: &ModuleInfo) -> Option<Arc<ModuleInfo>> {
        let parent = module.parent()?;
        self.module(parent)
    }

    /// Returns every loaded slash command.
    #[must_use]
    pub fn slash_commands(&self) -> Vec<Arc<CommandInfo>> {
        self.snapshot.load().commands(ModuleInfo::slash_commands)
    }

    /// Returns every loaded context command.
    #[must_use]
    pub fn context_commands(&self) -> Vec<Arc<CommandInfo>> {
        self.snapshot.load().commands(ModuleInfo::context_commands)
    }

    /// Returns every loaded component command.
    #[must_use]
    pub fn component_commands(&self) -> Vec<Arc<CommandInfo>> {
        self.snapshot.load().commands(ModuleInfo::component_commands)
    }

    /// Returns every loaded modal command.
    #[must_use]
    pub fn modal_commands(&self) -> Vec<Arc<CommandInfo>> {
        self.snapshot.load().commands(ModuleInfo::modal_commands)
    }

    /// Returns every loaded autocomplete command.
    #[must_use]
    pub fn autocomplete_commands(&self) -> Vec<Arc<CommandInfo>> {
        self.snapshot.load().commands(ModuleInfo::autocomplete_commands)
    }

    /// Resolves a slash command path without executing it.
    #[must_use]
    pub fn search_slash_command<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Option<RouteMatch<CommandInfo>> {
        self.snapshot.load().routers.slash.get(tokens)
    }

    /// Resolves a component identifier without executing it.
    #[must_use]
    pub fn search_component_command(&self, custom_id: &str) -> Option<RouteMatch<CommandInfo>> {
        self.snapshot.load().routers.component.get_by_id(custom_id)
    }

    /// Resolves a modal identifier without executing it.
    #[must_use]
    pub fn search_modal_command(&self, custom_id: &str) -> Option<RouteMatch<CommandInfo>> {
        self.snapshot.load().routers.modal.get_by_id(custom_id)
    }

    /// Describes every loaded application command for bulk registration.
    #[must_use]
    pub fn application_commands(&self) -> Vec<super::ApplicationCommandSpec> {
        super::application_commands(&self.snapshot.load().roots)
    }

    /// Routes and executes an interaction.
    ///
    /// Router misses, binding failures and unmet preconditions come back as
    /// error results. In async run mode the returned result is a success
    /// placeholder; subscribe to execution reports for the real outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Fault`] when an inline dispatch faults and
    /// `throw_on_error` is set.
    pub async fn execute(
        &self,
        context: InteractionContext,
        services: Arc<dyn ServiceResolver>,
    ) -> DispatchResult {
        let snapshot = self.snapshot.load_full();
        let interaction = context.interaction();

        let routed = match &interaction.data {
            InteractionData::Command(data) => {
                let router = match data.command_type {
                    ApplicationCommandType::ChatInput => &snapshot.routers.slash,
                    ApplicationCommandType::User => &snapshot.routers.user,
                    ApplicationCommandType::Message => &snapshot.routers.message,
                };
                let tokens = match data.command_type {
                    ApplicationCommandType::ChatInput => {
                        resolve_option_path(&data.name, &data.options).tokens
                    }
                    ApplicationCommandType::User | ApplicationCommandType::Message => {
                        vec![data.name.clone()]
                    }
                };
                router
                    .get(&tokens)
                    .ok_or_else(|| (tokens.join(" "), self.config.delete_unknown_slash_command_ack))
            }
            InteractionData::Component(data) => snapshot
                .routers
                .component
                .get_by_id(&data.custom_id)
                .ok_or_else(|| {
                    (
                        data.custom_id.clone(),
                        self.config.delete_unknown_component_ack,
                    )
                }),
            InteractionData::ModalSubmit(data) => snapshot
                .routers
                .modal
                .get_by_id(&data.custom_id)
                .ok_or_else(|| {
                    (
                        data.custom_id.clone(),
                        self.config.delete_unknown_component_ack,
                    )
                }),
            InteractionData::Autocomplete(data) => {
                let tokens = autocomplete_tokens(data);
                match snapshot.routers.autocomplete.get(&tokens) {
                    Some(found) => Ok(found),
                    None if self.config.enable_autocomplete_handlers => {
                        return self.suggest(&snapshot, data, &context, services).await;
                    }
                    None => Err((tokens.join(" "), false)),
                }
            }
        };

        match routed {
            Ok(RouteMatch { command, captures }) => {
                let inputs = BindingInputs::from_interaction(interaction, captures);
                self.executor
                    .execute(command, context, inputs, services)
                    .await
            }
            Err((path, cleanup)) => Ok(self.unknown_command(&context, &path, cleanup).await),
        }
    }

    /// Executes a known command, bypassing routing.
    ///
    /// Binding and preconditions run exactly as for a routed dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Fault`] under the same conditions as
    /// [`InteractionService::execute`].
    pub async fn execute_command(
        &self,
        command: Arc<CommandInfo>,
        context: InteractionContext,
        services: Arc<dyn ServiceResolver>,
    ) -> DispatchResult {
        let inputs = BindingInputs::from_interaction(context.interaction(), Vec::new());
        self.executor
            .execute(command, context, inputs, services)
            .await
    }

    async fn unknown_command(
        &self,
        context: &InteractionContext,
        path: &str,
        cleanup: bool,
    ) -> InteractionResult {
        debug!(path, kind = %context.kind(), "no command matched interaction");
        if let Some(responder) = context.responder().filter(|_| cleanup)
            && let Err(err) = responder.delete_original().await
        {
            warn!(path, error = %err, "failed to delete acknowledgement of unknown command");
        }
        InteractionResult::unknown_command(format!("unknown command '{path}'"))
    }

    /// Answers an autocomplete request from the focused parameter's handler.
    async fn suggest(
        &self,
        snapshot: &RegistrySnapshot,
        data: &AutocompleteData,
        context: &InteractionContext,
        services: Arc<dyn ServiceResolver>,
    ) -> DispatchResult {
        let resolved = resolve_option_path(&data.name, &data.options);
        let target = snapshot
            .routers
            .slash
            .get(&resolved.tokens)
            .and_then(|found| {
                let focused = resolved.values.iter().find(|value| value.focused)?;
                let parameter = found
                    .command
                    .parameters()
                    .iter()
                    .find(|candidate| candidate.name().eq_ignore_ascii_case(&focused.name))?;
                let autocomplete = Arc::clone(parameter.autocomplete()?);
                let name = parameter.name().to_owned();
                Some((
                    Arc::clone(&found.command),
                    name,
                    focused.value.clone(),
                    autocomplete,
                ))
            });
        let Some((command, parameter, current, handler)) = target else {
            return Ok(self
                .unknown_command(context, &autocomplete_tokens(data).join(" "), false)
                .await);
        };

        let request = AutocompleteRequest {
            parameter,
            current,
            options: resolved.values,
        };
        let suggested = guarded(handler.suggest(context, &request, services.as_ref())).await;
        let delivered = match (suggested, context.responder()) {
            (Ok(choices), Some(responder)) => responder
                .respond_with_choices(choices)
                .await
                .map_err(HandlerError::from),
            (Ok(_), None) => Ok(()),
            (Err(fault), _) => Err(fault),
        };
        match delivered {
            Ok(()) => Ok(InteractionResult::Success),
            Err(fault) => {
                warn!(
                    command = %command.display_path(),
                    parameter = request.parameter.as_str(),
                    error = %fault,
                    "autocomplete handler faulted"
                );
                if self.config.throw_on_error {
                    Err(DispatchError::fault(command.display_path(), fault))
                } else {
                    Ok(InteractionResult::from_fault(fault))
                }
            }
        }
    }
}

/// Command path of an autocomplete request followed by the focused option.
fn autocomplete_tokens(data: &AutocompleteData) -> Vec<String> {
    let resolved = resolve_option_path(&data.name, &data.options);
    let mut tokens = resolved.tokens;
    if let Some(focused) = resolved.values.into_iter().find(|value| value.focused) {
        tokens.push(focused.name);
    }
    tokens
}
