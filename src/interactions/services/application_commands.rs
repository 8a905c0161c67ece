//! Application-command descriptions for bulk registration.
//!
//! Grouped slash commands are folded into one top-level command per root
//! group, with subgroups and subcommands nested as options. Uploading the
//! descriptions is left to the transport.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::interactions::domain::{
    ApplicationCommandType, AttachmentRef, ChannelRef, CommandInfo, CommandKind,
    ContextCommandKind, Mentionable, ModuleInfo, OptionValue, ParameterChoice, ParameterInfo,
    RoleRef, UserRef,
    constraint::{ATTACHMENT, CHANNEL, CHOICE, FLOAT, INTEGER, MENTIONABLE, ROLE, USER},
};

/// A top-level application command as uploaded to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationCommandSpec {
    /// Command name.
    pub name: String,
    /// Command kind.
    pub kind: ApplicationCommandType,
    /// Description; empty for context-menu commands.
    pub description: String,
    /// Whether the command is enabled for everyone by default.
    pub default_permission: bool,
    /// Parameters, subcommands or subcommand groups.
    pub options: Vec<CommandOptionSpec>,
}

/// One option of an application command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOptionSpec {
    /// Option name.
    pub name: String,
    /// Option description.
    pub description: String,
    /// Option kind.
    pub kind: OptionSpecKind,
    /// Whether the option must be supplied.
    pub required: bool,
    /// Fixed choices, empty when unrestricted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ParameterChoice>,
    /// Inclusive lower numeric bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Inclusive upper numeric bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Whether the platform should send autocomplete requests.
    pub autocomplete: bool,
    /// Nested options of a subcommand or subcommand group.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionSpec>,
}

/// Kind of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionSpecKind {
    /// Nested subcommand group.
    SubcommandGroup,
    /// Nested subcommand.
    Subcommand,
    /// Free text.
    String,
    /// Integer.
    Integer,
    /// Floating-point number.
    Number,
    /// Boolean.
    Boolean,
    /// User.
    User,
    /// Channel.
    Channel,
    /// Role.
    Role,
    /// User or role.
    Mentionable,
    /// Uploaded file.
    Attachment,
}

impl OptionSpecKind {
    /// Returns the option kind used to upload `parameter`.
    #[must_use]
    pub fn of(parameter: &ParameterInfo) -> Self {
        let info = parameter.argument_type();
        if info.is::<bool>() {
            Self::Boolean
        } else if info.is::<i64>() || info.satisfies(&INTEGER) {
            Self::Integer
        } else if info.is::<f64>() || info.satisfies(&FLOAT) {
            Self::Number
        } else if info.is::<UserRef>() || info.satisfies(&USER) {
            Self::User
        } else if info.is::<RoleRef>() || info.satisfies(&ROLE) {
            Self::Role
        } else if info.is::<Mentionable>() || info.satisfies(&MENTIONABLE) {
            Self::Mentionable
        } else if info.is::<ChannelRef>() || info.satisfies(&CHANNEL) {
            Self::Channel
        } else if info.is::<AttachmentRef>() || info.satisfies(&ATTACHMENT) {
            Self::Attachment
        } else {
            Self::String
        }
    }
}

impl ModuleInfo {
    /// Describes the application commands declared by this module tree.
    #[must_use]
    pub fn to_application_commands(self: &Arc<Self>) -> Vec<ApplicationCommandSpec> {
        application_commands(std::slice::from_ref(self))
    }
}

/// Describes the application commands declared by `modules` and all of
/// their submodules.
///
/// Component, modal and autocomplete commands are not uploaded and are
/// skipped.
#[must_use]
pub fn application_commands(modules: &[Arc<ModuleInfo>]) -> Vec<ApplicationCommandSpec> {
    let all_modules: Vec<Arc<ModuleInfo>> =
        modules.iter().flat_map(ModuleInfo::descendants).collect();
    let autocompleted = autocomplete_paths(&all_modules);
    let mut specs: Vec<ApplicationCommandSpec> = Vec::new();

    for module in &all_modules {
        for command in module.context_commands() {
            specs.push(context_spec(command));
        }
        for command in module.slash_commands() {
            let subcommand = subcommand_option(command, &autocompleted);
            match command.group_path() {
                [] => specs.push(ApplicationCommandSpec {
                    name: command.name().to_owned(),
                    kind: ApplicationCommandType::ChatInput,
                    description: command.description().unwrap_or_default().to_owned(),
                    default_permission: command.default_permission(),
                    options: subcommand.options,
                }),
                [group] => {
                    if let Some(root) = group_spec(&mut specs, &all_modules, group) {
                        root.options.push(subcommand);
                    }
                }
                [group, subgroup, ..] => {
                    let nested = group_spec(&mut specs, &all_modules, group).and_then(|root| {
                        subgroup_option(&mut root.options, &all_modules, group, subgroup)
                    });
                    if let Some(subgroup_spec) = nested {
                        subgroup_spec.options.push(subcommand);
                    }
                }
            }
        }
    }
    specs
}

fn context_spec(command: &CommandInfo) -> ApplicationCommandSpec {
    let kind = match command.kind() {
        CommandKind::Context(ContextCommandKind::Message) => ApplicationCommandType::Message,
        _ => ApplicationCommandType::User,
    };
    ApplicationCommandSpec {
        name: command.name().to_owned(),
        kind,
        description: String::new(),
        default_permission: command.default_permission(),
        options: Vec::new(),
    }
}

fn subcommand_option(
    command: &CommandInfo,
    autocompleted: &HashSet<Vec<String>>,
) -> CommandOptionSpec {
    let mut path: Vec<String> = command
        .group_path()
        .iter()
        .map(|token| token.to_lowercase())
        .collect();
    path.push(command.name().to_lowercase());

    let options = command
        .parameters()
        .iter()
        .map(|parameter| {
            let mut parameter_path = path.clone();
            parameter_path.push(parameter.name().to_lowercase());
            parameter_option(
                parameter,
                parameter.autocomplete().is_some() || autocompleted.contains(&parameter_path),
            )
        })
        .collect();

    CommandOptionSpec {
        name: command.name().to_owned(),
        description: command.description().unwrap_or_default().to_owned(),
        kind: OptionSpecKind::Subcommand,
        required: false,
        choices: Vec::new(),
        min_value: None,
        max_value: None,
        autocomplete: false,
        options,
    }
}

fn parameter_option(parameter: &ParameterInfo, autocomplete: bool) -> CommandOptionSpec {
    let kind = OptionSpecKind::of(parameter);
    let choices = if parameter.choices().is_empty() && parameter.argument_type().satisfies(&CHOICE)
    {
        parameter
            .argument_type()
            .choices()
            .iter()
            .map(|name| ParameterChoice::new(*name, OptionValue::from(*name)))
            .collect()
    } else {
        parameter.choices().to_vec()
    };
    CommandOptionSpec {
        name: parameter.name().to_owned(),
        description: parameter.description().to_owned(),
        kind,
        required: parameter.is_required(),
        choices,
        min_value: parameter.min_value(),
        max_value: parameter.max_value(),
        autocomplete,
        options: Vec::new(),
    }
}

fn group_spec<'a>(
    specs: &'a mut Vec<ApplicationCommandSpec>,
    modules: &[Arc<ModuleInfo>],
    group: &str,
) -> Option<&'a mut ApplicationCommandSpec> {
    let index = specs
        .iter()
        .position(|spec| {
            spec.kind == ApplicationCommandType::ChatInput && spec.name.eq_ignore_ascii_case(group)
        })
        .unwrap_or_else(|| {
            let owner = modules.iter().find(|module| {
                module.is_top_level_group()
                    && module
                        .group_name()
                        .is_some_and(|name| name.eq_ignore_ascii_case(group))
            });
            specs.push(ApplicationCommandSpec {
                name: group.to_owned(),
                kind: ApplicationCommandType::ChatInput,
                description: group_description(modules, &[group]),
                default_permission: owner.is_none_or(|module| module.default_permission()),
                options: Vec::new(),
            });
            specs.len() - 1
        });
    specs.get_mut(index)
}

fn subgroup_option<'a>(
    options: &'a mut Vec<CommandOptionSpec>,
    modules: &[Arc<ModuleInfo>],
    group: &str,
    subgroup: &str,
) -> Option<&'a mut CommandOptionSpec> {
    let index = options
        .iter()
        .position(|option| {
            option.kind == OptionSpecKind::SubcommandGroup
                && option.name.eq_ignore_ascii_case(subgroup)
        })
        .unwrap_or_else(|| {
            options.push(CommandOptionSpec {
                name: subgroup.to_owned(),
                description: group_description(modules, &[group, subgroup]),
                kind: OptionSpecKind::SubcommandGroup,
                required: false,
                choices: Vec::new(),
                min_value: None,
                max_value: None,
                autocomplete: false,
                options: Vec::new(),
            });
            options.len() - 1
        });
    options.get_mut(index)
}

fn group_description(modules: &[Arc<ModuleInfo>], path: &[&str]) -> String {
    modules
        .iter()
        .find(|module| {
            module.group_path().len() == path.len()
                && module
                    .group_path()
                    .iter()
                    .zip(path)
                    .all(|(left, right)| left.eq_ignore_ascii_case(right))
        })
        .and_then(|module| module.description())
        .unwrap_or_default()
        .to_owned()
}

fn autocomplete_paths(modules: &[Arc<ModuleInfo>]) -> HashSet<Vec<String>> {
    modules
        .iter()
        .flat_map(|module| module.autocomplete_commands())
        .map(|command| {
            command
                .group_path()
                .iter()
                .map(String::as_str)
                .chain(command.name().split(' '))
                .map(str::to_lowercase)
                .collect()
        })
        .collect()
}
