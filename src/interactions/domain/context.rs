//! Per-dispatch interaction context.

use std::fmt;
use std::sync::Arc;

use super::{EntityId, Interaction, InteractionKind, UserRef};
use crate::interactions::ports::InteractionResponder;

/// The originating interaction plus the handle used to answer it.
///
/// Cloning is cheap; clones share the same interaction.
#[derive(Clone)]
pub struct InteractionContext {
    interaction: Arc<Interaction>,
    responder: Option<Arc<dyn InteractionResponder>>,
}

impl InteractionContext {
    /// Creates a context without a responder.
    #[must_use]
    pub fn new(interaction: Interaction) -> Self {
        Self {
            interaction: Arc::new(interaction),
            responder: None,
        }
    }

    /// Attaches the responder that acknowledges this interaction.
    #[must_use]
    pub fn with_responder(mut self, responder: Arc<dyn InteractionResponder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Returns the interaction.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Returns the interaction discriminant.
    #[must_use]
    pub fn kind(&self) -> InteractionKind {
        self.interaction.kind()
    }

    /// Returns the invoking user.
    #[must_use]
    pub fn user(&self) -> &UserRef {
        &self.interaction.user
    }

    /// Returns the guild, if the interaction happened in one.
    #[must_use]
    pub fn guild_id(&self) -> Option<EntityId> {
        self.interaction.guild_id
    }

    /// Returns the responder, if one is attached.
    #[must_use]
    pub fn responder(&self) -> Option<&Arc<dyn InteractionResponder>> {
        self.responder.as_ref()
    }
}

impl fmt::Debug for InteractionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionContext")
            .field("interaction", &self.interaction)
            .field("has_responder", &self.responder.is_some())
            .finish()
    }
}
