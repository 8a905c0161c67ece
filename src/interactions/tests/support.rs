//! Shared fixtures for interaction service unit tests.

use std::sync::{Arc, Mutex};

use mockable::DefaultClock;
use rstest::fixture;

use crate::interactions::{
    adapters::memory::ServiceCollection,
    domain::{
        ApplicationCommandType, AutocompleteData, CommandBuilder, CommandData, CommandInfo, CommandOption,
        ComponentData, EntityId, HandlerError, Interaction, InteractionContext, InteractionData,
        InteractionModule, InteractionResult, ModalField, ModalSubmitData, OptionValue, UserRef,
    },
    ports::ServiceResolver,
    services::{InteractionService, InteractionServiceConfig},
};

pub type TestService = InteractionService<DefaultClock>;

/// Provides a service that awaits every handler inline.
#[fixture]
pub fn service() -> TestService {
    service_with(InteractionServiceConfig::inline())
}

pub fn service_with(config: InteractionServiceConfig) -> TestService {
    InteractionService::new(config, Arc::new(DefaultClock))
}

/// Provides a resolver holding a fresh journal.
#[fixture]
pub fn journal() -> Arc<Journal> {
    Arc::new(Journal::default())
}

pub fn resolver(journal: &Arc<Journal>) -> Arc<dyn ServiceResolver> {
    let mut services = ServiceCollection::new();
    services.insert(Arc::clone(journal));
    Arc::new(services)
}

pub fn empty_resolver() -> Arc<dyn ServiceResolver> {
    Arc::new(ServiceCollection::new())
}

pub fn invoker() -> UserRef {
    UserRef::new(42, "ada")
}

fn context(data: InteractionData) -> InteractionContext {
    InteractionContext::new(Interaction::new(EntityId::new(1), invoker(), data))
}

pub fn slash(name: &str, options: Vec<CommandOption>) -> InteractionContext {
    context(InteractionData::Command(CommandData {
        name: name.to_owned(),
        command_type: ApplicationCommandType::ChatInput,
        options,
        target: None,
    }))
}

pub fn user_command(name: &str, target: UserRef) -> InteractionContext {
    context(InteractionData::Command(CommandData {
        name: name.to_owned(),
        command_type: ApplicationCommandType::User,
        options: Vec::new(),
        target: Some(OptionValue::User(target)),
    }))
}

pub fn component(custom_id: &str, values: &[&str]) -> InteractionContext {
    context(InteractionData::Component(ComponentData {
        custom_id: custom_id.to_owned(),
        values: values.iter().map(|value| (*value).to_owned()).collect(),
    }))
}

pub fn modal(custom_id: &str, fields: &[(&str, &str)]) -> InteractionContext {
    context(InteractionData::ModalSubmit(ModalSubmitData {
        custom_id: custom_id.to_owned(),
        fields: fields
            .iter()
            .map(|(id, value)| ModalField {
                custom_id: (*id).to_owned(),
                value: (*value).to_owned(),
            })
            .collect(),
    }))
}

pub fn autocomplete(name: &str, options: Vec<CommandOption>) -> InteractionContext {
    context(InteractionData::Autocomplete(AutocompleteData {
        name: name.to_owned(),
        options,
    }))
}

/// Binds a handler that does nothing.
pub fn noop<M: InteractionModule>(command: CommandBuilder<M>) -> CommandBuilder<M> {
    command.handler(|_module, _call| async {})
}

/// Records lifecycle events in order.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().expect("journal lock").push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("journal lock").clone()
    }
}

/// Module without dependencies or hooks.
pub struct Plain;

impl InteractionModule for Plain {
    fn construct(_services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        Ok(Self)
    }
}

/// Second dependency-free module, for tests loading two modules.
pub struct Other;

impl InteractionModule for Other {
    fn construct(_services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        Ok(Self)
    }
}

/// Which lifecycle hook of [`Tracked`] should fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultyHook {
    Before,
    After,
}

/// Configures [`Tracked`] hook faults through the resolver.
#[derive(Debug, Clone, Copy)]
pub struct HookFaults(pub Option<FaultyHook>);

/// Module journaling its whole lifecycle.
pub struct Tracked {
    pub journal: Arc<Journal>,
    faults: Option<FaultyHook>,
}

#[async_trait::async_trait]
impl InteractionModule for Tracked {
    fn construct(services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        let journal = services.resolve::<Journal>()?;
        let faults = services
            .resolve::<HookFaults>()
            .ok()
            .and_then(|configured| configured.0);
        journal.push("construct");
        Ok(Self { journal, faults })
    }

    async fn before_execute(
        &self,
        _context: &InteractionContext,
        _command: &CommandInfo,
    ) -> Result<(), HandlerError> {
        self.journal.push("before");
        if self.faults == Some(FaultyHook::Before) {
            return Err(HandlerError::msg("before hook failed"));
        }
        Ok(())
    }

    async fn after_execute(
        &self,
        _context: &InteractionContext,
        _command: &CommandInfo,
        result: &InteractionResult,
    ) -> Result<(), HandlerError> {
        self.journal.push(format!("after:{}", result.is_success()));
        if self.faults == Some(FaultyHook::After) {
            return Err(HandlerError::msg("after hook failed"));
        }
        Ok(())
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.journal.push("drop");
    }
}

pub fn tracked_resolver(
    journal: &Arc<Journal>,
    faults: Option<FaultyHook>,
) -> Arc<dyn ServiceResolver> {
    let mut services = ServiceCollection::new();
    services.insert(Arc::clone(journal));
    services.insert(Arc::new(HookFaults(faults)));
    Arc::new(services)
}
