//! Error types for module construction.

use thiserror::Error;

/// Errors returned while building modules from their definitions.
///
/// Construction is atomic: when any command or parameter in a batch is
/// invalid, nothing from the batch is installed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModuleBuildError {
    /// A command, group or parameter name is malformed.
    #[error("invalid {what} name '{name}'")]
    InvalidName {
        /// What was being named (command, group, parameter).
        what: &'static str,
        /// Offending name.
        name: String,
    },

    /// A description is empty or longer than 100 characters.
    #[error("description of '{0}' must be between 1 and 100 characters")]
    InvalidDescription(String),

    /// Two commands of the same kind share a name in one module.
    #[error("module '{module}' declares '{command}' more than once")]
    DuplicateCommand {
        /// Module name.
        module: String,
        /// Command name.
        command: String,
    },

    /// Two parameters of one command share a name.
    #[error("command '{command}' declares parameter '{parameter}' more than once")]
    DuplicateParameter {
        /// Command name.
        command: String,
        /// Parameter name.
        parameter: String,
    },

    /// A slash command declares more than 25 parameters.
    #[error("command '{command}' declares {count} parameters (at most 25 allowed)")]
    TooManyParameters {
        /// Command name.
        command: String,
        /// Declared parameter count.
        count: usize,
    },

    /// A group holds more than 25 subcommands and subgroups.
    #[error("group '{group}' holds {count} entries (at most 25 allowed)")]
    TooManyCommands {
        /// Group name.
        group: String,
        /// Subcommand and subgroup count.
        count: usize,
    },

    /// Groups are nested more than two levels deep.
    #[error("group '{0}' nests deeper than two levels")]
    NestingTooDeep(String),

    /// A variadic parameter is not the last parameter.
    #[error("variadic parameter '{parameter}' of '{command}' must be last")]
    VariadicNotLast {
        /// Command name.
        command: String,
        /// Parameter name.
        parameter: String,
    },

    /// A required parameter follows an optional one.
    #[error("required parameter '{parameter}' of '{command}' follows an optional parameter")]
    RequiredAfterOptional {
        /// Command name.
        command: String,
        /// Parameter name.
        parameter: String,
    },

    /// A command has no handler.
    #[error("command '{0}' has no handler")]
    MissingHandler(String),

    /// No converter can produce a parameter's type.
    #[error("no type converter for parameter '{parameter}' of type {type_name}")]
    MissingConverter {
        /// Parameter name.
        parameter: String,
        /// Rust type name.
        type_name: &'static str,
    },
}
