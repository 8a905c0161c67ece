//! Shared test helpers for in-memory interaction dispatch tests.

use std::sync::{Arc, Mutex};

use mockable::DefaultClock;
use rstest::fixture;
use switchboard::interactions::{
    adapters::memory::ServiceCollection,
    domain::{
        ApplicationCommandType, CommandData, CommandOption, ComponentData, EntityId,
        HandlerError, Interaction, InteractionContext, InteractionData, ModalField,
        ModalSubmitData, UserRef,
    },
    ports::ServiceResolver,
    services::{InteractionService, InteractionServiceConfig},
};

/// Service type used by the integration tests.
pub type TestService = InteractionService<DefaultClock>;

/// Provides a service that awaits every handler inline.
#[fixture]
pub fn service() -> TestService {
    InteractionService::new(InteractionServiceConfig::inline(), Arc::new(DefaultClock))
}

/// Provides an empty ban list.
#[fixture]
pub fn bans() -> Arc<BanList> {
    Arc::new(BanList::default())
}

/// Guild used by guild-scoped interactions.
pub const GUILD: u64 = 900;

/// A moderation store shared between dispatches.
#[derive(Debug, Default)]
pub struct BanList {
    entries: Mutex<Vec<(u64, String)>>,
}

impl BanList {
    /// Bans `user` with `reason`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn ban(&self, user: u64, reason: &str) -> Result<(), HandlerError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| HandlerError::msg("ban list poisoned"))?;
        entries.push((user, reason.to_owned()));
        Ok(())
    }

    /// Lifts every ban on `user`, returning whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn unban(&self, user: u64) -> Result<bool, HandlerError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| HandlerError::msg("ban list poisoned"))?;
        let before = entries.len();
        entries.retain(|(banned, _)| *banned != user);
        Ok(entries.len() != before)
    }

    /// Returns a snapshot of the current bans.
    pub fn entries(&self) -> Vec<(u64, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

/// Builds a resolver exposing `bans`.
pub fn resolver(bans: &Arc<BanList>) -> Arc<dyn ServiceResolver> {
    let mut services = ServiceCollection::new();
    services.insert(Arc::clone(bans));
    Arc::new(services)
}

fn interaction(data: InteractionData) -> Interaction {
    Interaction::new(EntityId::new(1), UserRef::new(1, "moderator"), data)
}

/// Builds a guild slash interaction for `group subcommand`.
pub fn guild_subcommand(
    group: &str,
    subcommand: &str,
    options: Vec<CommandOption>,
) -> InteractionContext {
    InteractionContext::new(
        interaction(InteractionData::Command(CommandData {
            name: group.to_owned(),
            command_type: ApplicationCommandType::ChatInput,
            options: vec![CommandOption::subcommand(subcommand, options)],
            target: None,
        }))
        .in_guild(EntityId::new(GUILD)),
    )
}

/// Builds a direct-message slash interaction for `group subcommand`.
pub fn direct_subcommand(
    group: &str,
    subcommand: &str,
    options: Vec<CommandOption>,
) -> InteractionContext {
    InteractionContext::new(interaction(InteractionData::Command(CommandData {
        name: group.to_owned(),
        command_type: ApplicationCommandType::ChatInput,
        options: vec![CommandOption::subcommand(subcommand, options)],
        target: None,
    })))
}

/// Builds a guild component interaction.
pub fn click(custom_id: &str) -> InteractionContext {
    InteractionContext::new(
        interaction(InteractionData::Component(ComponentData {
            custom_id: custom_id.to_owned(),
            values: Vec::new(),
        }))
        .in_guild(EntityId::new(GUILD)),
    )
}

/// Builds a guild modal submission.
pub fn submit(custom_id: &str, fields: &[(&str, &str)]) -> InteractionContext {
    InteractionContext::new(
        interaction(InteractionData::ModalSubmit(ModalSubmitData {
            custom_id: custom_id.to_owned(),
            fields: fields
                .iter()
                .map(|(id, value)| ModalField {
                    custom_id: (*id).to_owned(),
                    value: (*value).to_owned(),
                })
                .collect(),
        }))
        .in_guild(EntityId::new(GUILD)),
    )
}
