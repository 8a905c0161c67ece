//! Interaction service configuration.

use serde::Deserialize;

use crate::interactions::domain::RunMode;

/// Configuration for [`InteractionService`](super::InteractionService).
///
/// # Examples
///
/// ```
/// use switchboard::interactions::domain::RunMode;
/// use switchboard::interactions::services::InteractionServiceConfig;
///
/// let config = InteractionServiceConfig::default();
/// assert_eq!(config.default_run_mode, RunMode::Async);
///
/// let inline = InteractionServiceConfig::inline();
/// assert_eq!(inline.default_run_mode, RunMode::Sync);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InteractionServiceConfig {
    /// Run mode of commands that declare none.
    pub default_run_mode: RunMode,
    /// Whether handler faults are returned as errors from inline dispatches.
    pub throw_on_error: bool,
    /// Marker compiled into a capture group in component, modal and
    /// autocomplete identifiers. `None` disables wildcards.
    pub wildcard_marker: Option<String>,
    /// Characters splitting component and modal identifiers into tokens.
    pub custom_id_delimiters: Vec<char>,
    /// Whether parameter autocomplete handlers answer autocomplete requests
    /// that no autocomplete command matches.
    pub enable_autocomplete_handlers: bool,
    /// Whether an unknown slash or context command deletes the original
    /// response.
    pub delete_unknown_slash_command_ack: bool,
    /// Whether an unknown component or modal identifier deletes the
    /// original response.
    pub delete_unknown_component_ack: bool,
    /// Buffer size of the execution report channel.
    pub notification_capacity: usize,
}

impl Default for InteractionServiceConfig {
    fn default() -> Self {
        Self {
            default_run_mode: RunMode::Async,
            throw_on_error: true,
            wildcard_marker: Some("*".to_owned()),
            custom_id_delimiters: Vec::new(),
            enable_autocomplete_handlers: true,
            delete_unknown_slash_command_ack: false,
            delete_unknown_component_ack: false,
            notification_capacity: 64,
        }
    }
}

impl InteractionServiceConfig {
    /// Creates a configuration that awaits every handler inline.
    ///
    /// Useful for tests and for hosts that serialize interactions
    /// themselves.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            default_run_mode: RunMode::Sync,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the default run mode.
    #[must_use]
    pub const fn with_run_mode(mut self, mode: RunMode) -> Self {
        self.default_run_mode = mode;
        self
    }

    /// Sets whether inline faults are returned as errors.
    #[must_use]
    pub const fn with_throw_on_error(mut self, throw: bool) -> Self {
        self.throw_on_error = throw;
        self
    }

    /// Sets the wildcard marker.
    #[must_use]
    pub fn with_wildcard_marker(mut self, marker: impl Into<String>) -> Self {
        self.wildcard_marker = Some(marker.into());
        self
    }

    /// Disables wildcard identifiers.
    #[must_use]
    pub fn without_wildcards(mut self) -> Self {
        self.wildcard_marker = None;
        self
    }

    /// Sets the identifier delimiters.
    #[must_use]
    pub fn with_custom_id_delimiters(mut self, delimiters: impl IntoIterator<Item = char>) -> Self {
        self.custom_id_delimiters = delimiters.into_iter().collect();
        self
    }

    /// Sets whether parameter autocomplete handlers are consulted.
    #[must_use]
    pub const fn with_autocomplete_handlers(mut self, enabled: bool) -> Self {
        self.enable_autocomplete_handlers = enabled;
        self
    }

    /// Sets whether unknown command acknowledgements are deleted.
    #[must_use]
    pub const fn with_unknown_command_cleanup(mut self, slash: bool, component: bool) -> Self {
        self.delete_unknown_slash_command_ack = slash;
        self.delete_unknown_component_ack = component;
        self
    }

    /// Sets the execution report buffer size.
    #[must_use]
    pub const fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity;
        self
    }
}
