//! Validation and freezing of module definitions.
//!
//! [`ModuleAssembler`] turns a [`ModuleDefinition`] tree into an immutable
//! [`ModuleInfo`] tree. It validates names and counts, binds a type
//! converter to every parameter, and precomputes each command's group path
//! and effective module precondition chain. Any invalid command or
//! parameter fails the whole tree.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use crate::interactions::domain::{
    CommandDefinition, CommandInfo, CommandKind, ModuleBuildError, ModuleDefinition, ModuleFactory,
    ModuleId, ModuleInfo, ParameterDefinition, ParameterInfo, Precondition,
};

use super::TypeConverterRegistry;

const MAX_NAME_LEN: usize = 32;
const MAX_DESCRIPTION_LEN: usize = 100;
const MAX_CUSTOM_ID_LEN: usize = 100;
const MAX_PARAMETERS: usize = 25;
const MAX_GROUP_ENTRIES: usize = 25;
const MAX_GROUP_DEPTH: usize = 2;

/// What the enclosing modules contribute to a nested module.
struct Scope<'a> {
    parent: Option<ModuleId>,
    group_path: &'a [String],
    preconditions: &'a [Arc<dyn Precondition>],
}

const ROOT_SCOPE: Scope<'static> = Scope {
    parent: None,
    group_path: &[],
    preconditions: &[],
};

/// Builds frozen module trees against a converter registry.
pub(crate) struct ModuleAssembler<'a> {
    converters: &'a TypeConverterRegistry,
}

impl<'a> ModuleAssembler<'a> {
    pub(crate) const fn new(converters: &'a TypeConverterRegistry) -> Self {
        Self { converters }
    }

    /// Validates and freezes a root module with all of its submodules.
    pub(crate) fn assemble(
        &self,
        definition: ModuleDefinition,
    ) -> Result<Arc<ModuleInfo>, ModuleBuildError> {
        let module = self.build_module(definition, &ROOT_SCOPE)?;
        check_group_sizes(&module)?;
        Ok(module)
    }

    fn build_module(
        &self,
        definition: ModuleDefinition,
        scope: &Scope<'_>,
    ) -> Result<Arc<ModuleInfo>, ModuleBuildError> {
        let ModuleDefinition {
            type_id,
            type_name,
            name,
            group,
            default_permission,
            preconditions,
            commands,
            submodules,
            factory,
        } = definition;

        let id = ModuleId::new();
        let mut group_path = scope.group_path.to_vec();
        let (group_name, description) = match group {
            Some((group_name, description)) => {
                check_slash_name("group", &group_name)?;
                check_description(&group_name, &description)?;
                group_path.push(group_name.clone());
                if group_path.len() > MAX_GROUP_DEPTH {
                    return Err(ModuleBuildError::NestingTooDeep(group_path.join(" ")));
                }
                (Some(group_name), Some(description))
            }
            None => (None, None),
        };

        let mut effective_preconditions = scope.preconditions.to_vec();
        effective_preconditions.extend(preconditions.iter().cloned());

        let mut module = ModuleInfo {
            id,
            name,
            type_id,
            type_name,
            group_name,
            description,
            default_permission,
            parent: scope.parent,
            group_path,
            submodules: Vec::new(),
            slash_commands: Vec::new(),
            context_commands: Vec::new(),
            component_commands: Vec::new(),
            modal_commands: Vec::new(),
            autocomplete_commands: Vec::new(),
            preconditions,
        };

        let mut seen = HashSet::new();
        for command in commands {
            if !seen.insert((command.kind, command.name.to_lowercase())) {
                return Err(ModuleBuildError::DuplicateCommand {
                    module: module.name.clone(),
                    command: command.name,
                });
            }
            let info = Arc::new(self.build_command(
                command,
                &module,
                &effective_preconditions,
                &factory,
            )?);
            match info.kind {
                CommandKind::Slash => module.slash_commands.push(info),
                CommandKind::Context(_) => module.context_commands.push(info),
                CommandKind::Component => module.component_commands.push(info),
                CommandKind::Modal => module.modal_commands.push(info),
                CommandKind::Autocomplete => module.autocomplete_commands.push(info),
            }
        }

        let child_scope = Scope {
            parent: Some(id),
            group_path: &module.group_path,
            preconditions: &effective_preconditions,
        };
        let mut built_submodules = Vec::with_capacity(submodules.len());
        for submodule in submodules {
            built_submodules.push(self.build_module(submodule, &child_scope)?);
        }
        module.submodules = built_submodules;

        Ok(Arc::new(module))
    }

    fn build_command(
        &self,
        definition: CommandDefinition,
        module: &ModuleInfo,
        module_preconditions: &[Arc<dyn Precondition>],
        factory: &ModuleFactory,
    ) -> Result<CommandInfo, ModuleBuildError> {
        let CommandDefinition {
            kind,
            name,
            method_name,
            description,
            default_permission,
            ignore_group_names,
            run_mode,
            parameters,
            preconditions,
            handler: declared_handler,
        } = definition;

        check_command_name(kind, &name, description.as_deref())?;
        if kind == CommandKind::Slash && parameters.len() > MAX_PARAMETERS {
            return Err(ModuleBuildError::TooManyParameters {
                command: name,
                count: parameters.len(),
            });
        }
        let Some(handler) = declared_handler else {
            return Err(ModuleBuildError::MissingHandler(name));
        };
        let parameter_infos = self.build_parameters(kind, &name, parameters)?;

        let group_path = if ignore_group_names {
            Vec::new()
        } else {
            module.group_path.clone()
        };
        let diagnostic_name = method_name.unwrap_or_else(|| format!("{}.{name}", module.name));

        Ok(CommandInfo {
            name,
            method_name: diagnostic_name,
            kind,
            description,
            default_permission,
            ignore_group_names,
            run_mode,
            parameters: parameter_infos,
            preconditions,
            module_preconditions: module_preconditions.to_vec(),
            group_path,
            module_id: module.id,
            module_name: module.name.clone(),
            factory: Arc::clone(factory),
            handler,
        })
    }

    fn build_parameters(
        &self,
        kind: CommandKind,
        command: &str,
        definitions: Vec<ParameterDefinition>,
    ) -> Result<Vec<ParameterInfo>, ModuleBuildError> {
        let count = definitions.len();
        let mut names = HashSet::with_capacity(count);
        let mut seen_optional = false;
        let mut parameters = Vec::with_capacity(count);

        for (index, definition) in definitions.into_iter().enumerate() {
            if kind == CommandKind::Slash {
                check_slash_name("parameter", &definition.name)?;
            } else if definition.name.is_empty() {
                return Err(ModuleBuildError::InvalidName {
                    what: "parameter",
                    name: definition.name,
                });
            }
            if !names.insert(definition.name.to_lowercase()) {
                return Err(ModuleBuildError::DuplicateParameter {
                    command: command.to_owned(),
                    parameter: definition.name,
                });
            }
            if definition.variadic && index + 1 != count {
                return Err(ModuleBuildError::VariadicNotLast {
                    command: command.to_owned(),
                    parameter: definition.name,
                });
            }
            if definition.required && seen_optional {
                return Err(ModuleBuildError::RequiredAfterOptional {
                    command: command.to_owned(),
                    parameter: definition.name,
                });
            }
            seen_optional |= !definition.required;
            if let Some(description) = &definition.description {
                check_description(&definition.name, description)?;
            }
            parameters.push(self.build_parameter(definition)?);
        }
        Ok(parameters)
    }

    fn build_parameter(
        &self,
        definition: ParameterDefinition,
    ) -> Result<ParameterInfo, ModuleBuildError> {
        let ParameterDefinition {
            name,
            description,
            argument_type,
            required,
            default_value,
            variadic,
            choices,
            min_value,
            max_value,
            preconditions,
            autocomplete,
        } = definition;

        let Some(converter) = self.converters.resolve(&argument_type) else {
            return Err(ModuleBuildError::MissingConverter {
                parameter: name,
                type_name: argument_type.name(),
            });
        };

        Ok(ParameterInfo {
            description: description.unwrap_or_else(|| name.clone()),
            name,
            argument_type,
            required,
            default_value,
            variadic,
            choices,
            min_value,
            max_value,
            preconditions,
            converter,
            autocomplete,
        })
    }
}

fn check_command_name(
    kind: CommandKind,
    name: &str,
    description: Option<&str>,
) -> Result<(), ModuleBuildError> {
    match kind {
        CommandKind::Slash => {
            check_slash_name("command", name)?;
            check_description(name, description.unwrap_or_default())
        }
        CommandKind::Context(_) => check_length("command", name, MAX_NAME_LEN),
        CommandKind::Component | CommandKind::Modal => {
            check_length("custom id", name, MAX_CUSTOM_ID_LEN)
        }
        CommandKind::Autocomplete => check_length("autocomplete", name, MAX_CUSTOM_ID_LEN),
    }
}

fn check_slash_name(what: &'static str, name: &str) -> Result<(), ModuleBuildError> {
    let valid = (1..=MAX_NAME_LEN).contains(&name.chars().count())
        && name
            .chars()
            .all(|c| c == '-' || c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ModuleBuildError::InvalidName {
            what,
            name: name.to_owned(),
        })
    }
}

fn check_length(what: &'static str, name: &str, max: usize) -> Result<(), ModuleBuildError> {
    if (1..=max).contains(&name.chars().count()) {
        Ok(())
    } else {
        Err(ModuleBuildError::InvalidName {
            what,
            name: name.to_owned(),
        })
    }
}

fn check_description(owner: &str, description: &str) -> Result<(), ModuleBuildError> {
    if (1..=MAX_DESCRIPTION_LEN).contains(&description.chars().count()) {
        Ok(())
    } else {
        Err(ModuleBuildError::InvalidDescription(owner.to_owned()))
    }
}

/// Counts the subcommands and subgroups under every group of a tree.
fn check_group_sizes(root: &Arc<ModuleInfo>) -> Result<(), ModuleBuildError> {
    let mut entries: BTreeMap<Vec<String>, BTreeSet<String>> = BTreeMap::new();
    for module in root.descendants() {
        for command in module.slash_commands() {
            let mut path = command.group_path().to_vec();
            path.push(command.name().to_owned());
            for depth in 1..path.len() {
                let (prefix, rest) = path.split_at(depth);
                if let Some(child) = rest.first() {
                    entries
                        .entry(prefix.to_vec())
                        .or_default()
                        .insert(child.clone());
                }
            }
        }
    }
    entries
        .into_iter()
        .find(|(_, children)| children.len() > MAX_GROUP_ENTRIES)
        .map_or(Ok(()), |(group, children)| {
            Err(ModuleBuildError::TooManyCommands {
                group: group.join(" "),
                count: children.len(),
            })
        })
}
