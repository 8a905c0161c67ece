//! Inbound interaction payloads.
//!
//! These types are the already-decoded shape of an interaction event. Wire
//! decoding happens in the transport layer; the dispatch core only needs the
//! kind discriminant, the option tree or the opaque custom identifier, and the
//! raw option values.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::EntityId;

/// A user referenced by an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    /// User identifier.
    pub id: EntityId,
    /// Display name at the time of the interaction.
    pub name: String,
}

impl UserRef {
    /// Creates a user reference.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(id),
            name: name.into(),
        }
    }
}

/// A role referenced by an interaction option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleRef {
    /// Role identifier.
    pub id: EntityId,
    /// Role name.
    pub name: String,
}

impl RoleRef {
    /// Creates a role reference.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(id),
            name: name.into(),
        }
    }
}

/// Kind of a referenced channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Text channel.
    Text,
    /// Voice channel.
    Voice,
    /// Category container.
    Category,
    /// Thread.
    Thread,
}

/// A channel referenced by an interaction option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    /// Channel identifier.
    pub id: EntityId,
    /// Channel name.
    pub name: String,
    /// Channel kind.
    pub kind: ChannelKind,
}

/// A message targeted by a message context command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Message identifier.
    pub id: EntityId,
    /// Channel the message was posted in.
    pub channel_id: EntityId,
    /// Message text content.
    pub content: String,
}

/// An uploaded file attached to an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Attachment identifier.
    pub id: EntityId,
    /// Original file name.
    pub filename: String,
    /// Download URL.
    pub url: String,
}

/// A user or a role supplied to a mentionable option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mentionable {
    /// A mentioned user.
    User(UserRef),
    /// A mentioned role.
    Role(RoleRef),
}

impl Mentionable {
    /// Returns the identifier of the mentioned entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        match self {
            Self::User(user) => user.id,
            Self::Role(role) => role.id,
        }
    }
}

/// A raw option value as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    /// String value, also used for wildcard captures and component values.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Resolved user.
    User(UserRef),
    /// Resolved role.
    Role(RoleRef),
    /// Resolved user or role.
    Mentionable(Mentionable),
    /// Resolved channel.
    Channel(ChannelRef),
    /// Resolved message (context command target).
    Message(MessageRef),
    /// Uploaded attachment.
    Attachment(AttachmentRef),
}

impl OptionValue {
    /// Returns a short name for the value's variant, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::User(_) => "user",
            Self::Role(_) => "role",
            Self::Mentionable(_) => "mentionable",
            Self::Channel(_) => "channel",
            Self::Message(_) => "message",
            Self::Attachment(_) => "attachment",
        }
    }

    /// Returns the contained string, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<UserRef> for OptionValue {
    fn from(value: UserRef) -> Self {
        Self::User(value)
    }
}

/// One node of a command option tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandOption {
    /// A subcommand group wrapping subcommands.
    SubcommandGroup {
        /// Group name.
        name: String,
        /// Nested subcommands.
        options: Vec<CommandOption>,
    },
    /// A subcommand wrapping parameter values.
    Subcommand {
        /// Subcommand name.
        name: String,
        /// Parameter values.
        options: Vec<CommandOption>,
    },
    /// A parameter value.
    Value {
        /// Parameter name.
        name: String,
        /// Raw value.
        value: OptionValue,
        /// Whether the user is currently typing into this option
        /// (autocomplete only).
        #[serde(default)]
        focused: bool,
    },
}

impl CommandOption {
    /// Creates a parameter value option.
    #[must_use]
    pub fn value(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self::Value {
            name: name.into(),
            value: value.into(),
            focused: false,
        }
    }

    /// Creates a focused parameter value option for autocomplete requests.
    #[must_use]
    pub fn focused(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self::Value {
            name: name.into(),
            value: value.into(),
            focused: true,
        }
    }

    /// Creates a subcommand option.
    #[must_use]
    pub fn subcommand(name: impl Into<String>, options: Vec<Self>) -> Self {
        Self::Subcommand {
            name: name.into(),
            options,
        }
    }

    /// Creates a subcommand group option.
    #[must_use]
    pub fn group(name: impl Into<String>, options: Vec<Self>) -> Self {
        Self::SubcommandGroup {
            name: name.into(),
            options,
        }
    }

    /// Returns the option name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::SubcommandGroup { name, .. }
            | Self::Subcommand { name, .. }
            | Self::Value { name, .. } => name,
        }
    }
}

/// A leaf parameter value extracted from an option tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    /// Parameter name as sent by the platform.
    pub name: String,
    /// Raw value.
    pub value: OptionValue,
    /// Whether this is the focused autocomplete option.
    pub focused: bool,
}

/// A command path resolved from an option tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// Path tokens, outermost group first and command name last.
    pub tokens: Vec<String>,
    /// Parameter values of the leaf.
    pub values: Vec<NamedValue>,
}

/// Descends an option tree through subcommand groups and subcommands until
/// the parameter-bearing leaf is reached.
#[must_use]
pub fn resolve_option_path(command_name: &str, options: &[CommandOption]) -> ResolvedPath {
    let mut tokens = vec![command_name.to_owned()];
    let mut current = options;
    loop {
        match current.first() {
            Some(
                CommandOption::SubcommandGroup { name, options }
                | CommandOption::Subcommand { name, options },
            ) => {
                tokens.push(name.clone());
                current = options;
            }
            _ => break,
        }
    }

    let values = current
        .iter()
        .filter_map(|option| match option {
            CommandOption::Value {
                name,
                value,
                focused,
            } => Some(NamedValue {
                name: name.clone(),
                value: value.clone(),
                focused: *focused,
            }),
            _ => None,
        })
        .collect();

    ResolvedPath { tokens, values }
}

/// Kind of application command an invocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationCommandType {
    /// Slash (chat input) command.
    ChatInput,
    /// User context-menu command.
    User,
    /// Message context-menu command.
    Message,
}

/// Payload of an application command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    /// Top-level command name.
    pub name: String,
    /// Command kind.
    pub command_type: ApplicationCommandType,
    /// Option tree.
    #[serde(default)]
    pub options: Vec<CommandOption>,
    /// Target entity of a context-menu command.
    #[serde(default)]
    pub target: Option<OptionValue>,
}

/// Payload of a message component activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentData {
    /// Developer-defined component identifier.
    pub custom_id: String,
    /// Selected values of a select menu.
    #[serde(default)]
    pub values: Vec<String>,
}

/// One text input of a submitted modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalField {
    /// Text input identifier.
    pub custom_id: String,
    /// Submitted text.
    pub value: String,
}

/// Payload of a modal submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalSubmitData {
    /// Developer-defined modal identifier.
    pub custom_id: String,
    /// Submitted fields.
    #[serde(default)]
    pub fields: Vec<ModalField>,
}

/// Payload of an autocomplete request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteData {
    /// Top-level command name.
    pub name: String,
    /// Option tree with exactly one focused value.
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

/// Interaction payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InteractionData {
    /// Slash or context-menu command invocation.
    Command(CommandData),
    /// Button or select menu activation.
    Component(ComponentData),
    /// Autocomplete request for a slash command option.
    Autocomplete(AutocompleteData),
    /// Modal form submission.
    ModalSubmit(ModalSubmitData),
}

/// Discriminant of an inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Slash or context-menu command.
    ApplicationCommand,
    /// Message component.
    MessageComponent,
    /// Autocomplete request.
    Autocomplete,
    /// Modal submission.
    ModalSubmit,
}

impl InteractionKind {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationCommand => "application_command",
            Self::MessageComponent => "message_component",
            Self::Autocomplete => "autocomplete",
            Self::ModalSubmit => "modal_submit",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single inbound user-triggered event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction identifier.
    pub id: EntityId,
    /// Invoking user.
    pub user: UserRef,
    /// Guild the interaction happened in, absent for direct messages.
    #[serde(default)]
    pub guild_id: Option<EntityId>,
    /// Channel the interaction happened in.
    #[serde(default)]
    pub channel_id: Option<EntityId>,
    /// Kind-specific payload.
    pub data: InteractionData,
}

impl Interaction {
    /// Creates an interaction for the given user and payload.
    #[must_use]
    pub const fn new(id: EntityId, user: UserRef, data: InteractionData) -> Self {
        Self {
            id,
            user,
            guild_id: None,
            channel_id: None,
            data,
        }
    }

    /// Sets the guild the interaction happened in.
    #[must_use]
    pub const fn in_guild(mut self, guild_id: EntityId) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    /// Returns the interaction discriminant.
    #[must_use]
    pub const fn kind(&self) -> InteractionKind {
        match self.data {
            InteractionData::Command(_) => InteractionKind::ApplicationCommand,
            InteractionData::Component(_) => InteractionKind::MessageComponent,
            InteractionData::Autocomplete(_) => InteractionKind::Autocomplete,
            InteractionData::ModalSubmit(_) => InteractionKind::ModalSubmit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn resolve_option_path_descends_groups() {
        let options = vec![CommandOption::group(
            "role",
            vec![CommandOption::subcommand(
                "grant",
                vec![CommandOption::value("name", "mod")],
            )],
        )];

        let resolved = resolve_option_path("admin", &options);

        assert_eq!(resolved.tokens, vec!["admin", "role", "grant"]);
        assert_eq!(resolved.values.len(), 1);
        assert_eq!(
            resolved.values.first().map(|value| value.name.as_str()),
            Some("name")
        );
    }

    #[rstest]
    fn resolve_option_path_keeps_root_values() {
        let options = vec![CommandOption::value("count", 3_i64)];

        let resolved = resolve_option_path("roll", &options);

        assert_eq!(resolved.tokens, vec!["roll"]);
        assert_eq!(
            resolved.values.first().map(|value| &value.value),
            Some(&OptionValue::Integer(3))
        );
    }

    #[rstest]
    fn option_value_round_trips_through_json() {
        let value = OptionValue::User(UserRef::new(7, "ada"));

        let encoded = serde_json::to_string(&value).expect("serialise option value");
        let decoded: OptionValue = serde_json::from_str(&encoded).expect("deserialise value");

        assert_eq!(decoded, value);
    }
}
