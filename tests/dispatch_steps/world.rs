//! Shared world state for interaction dispatch BDD scenarios.

use std::sync::{Arc, Mutex};

use mockable::DefaultClock;
use rstest::fixture;
use switchboard::interactions::{
    adapters::memory::ServiceCollection,
    domain::{
        ApplicationCommandType, CommandData, CommandOption, ComponentData, EntityId,
        HandlerError, Interaction, InteractionContext, InteractionData, InteractionModule,
        UserRef,
    },
    ports::ServiceResolver,
    services::{DispatchResult, InteractionService, InteractionServiceConfig},
};

/// Service type used by the BDD world.
pub type TestInteractionService = InteractionService<DefaultClock>;

/// Values seen by handlers during a scenario.
#[derive(Debug, Default)]
pub struct Calls {
    seen: Mutex<Vec<String>>,
}

impl Calls {
    /// Records one handler invocation.
    pub fn record(&self, value: impl Into<String>) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(value.into());
        }
    }

    /// Returns every recorded invocation.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

/// Module whose handlers record into [`Calls`].
pub struct Recorder {
    /// Shared invocation log.
    pub calls: Arc<Calls>,
}

impl InteractionModule for Recorder {
    fn construct(services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        Ok(Self {
            calls: services.resolve::<Calls>()?,
        })
    }
}

/// Scenario world for interaction dispatch behaviour tests.
pub struct DispatchWorld {
    /// The service under test.
    pub service: TestInteractionService,
    /// Invocations recorded by handlers.
    pub calls: Arc<Calls>,
    /// Result of the last dispatch.
    pub last_result: Option<DispatchResult>,
}

impl DispatchWorld {
    /// Creates a world with an empty inline service.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: InteractionService::new(
                InteractionServiceConfig::inline(),
                Arc::new(DefaultClock),
            ),
            calls: Arc::new(Calls::default()),
            last_result: None,
        }
    }

    /// Returns a resolver exposing the world's invocation log.
    pub fn resolver(&self) -> Arc<dyn ServiceResolver> {
        let mut services = ServiceCollection::new();
        services.insert(Arc::clone(&self.calls));
        Arc::new(services)
    }
}

impl Default for DispatchWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DispatchWorld {
    DispatchWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn context(data: InteractionData) -> InteractionContext {
    InteractionContext::new(Interaction::new(
        EntityId::new(1),
        UserRef::new(42, "ada"),
        data,
    ))
}

/// Builds a slash command interaction from a space-separated path.
pub fn slash_context(path: &str) -> InteractionContext {
    let mut tokens: Vec<&str> = path.split_whitespace().collect();
    let leaf = tokens.pop().unwrap_or_default();
    let name = tokens.first().copied().unwrap_or(leaf);
    let options = match tokens.len() {
        0 => Vec::new(),
        1 => vec![CommandOption::subcommand(leaf, Vec::new())],
        _ => vec![CommandOption::group(
            tokens.get(1).copied().unwrap_or_default(),
            vec![CommandOption::subcommand(leaf, Vec::new())],
        )],
    };
    context(InteractionData::Command(CommandData {
        name: name.to_owned(),
        command_type: ApplicationCommandType::ChatInput,
        options,
        target: None,
    }))
}

/// Builds a component interaction.
pub fn component_context(custom_id: &str) -> InteractionContext {
    context(InteractionData::Component(ComponentData {
        custom_id: custom_id.to_owned(),
        values: Vec::new(),
    }))
}
