//! Interaction response port.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::interactions::domain::AutocompleteChoice;

/// Result type for responder operations.
pub type ResponderResult<T> = Result<T, ResponderError>;

/// Transport handle that answers one interaction.
///
/// Implemented by the wire transport; the dispatch core only uses it to
/// clean up acknowledgements of unknown commands and to deliver
/// autocomplete suggestions.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Deletes the original (deferred) response.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError`] when the transport rejects the call.
    async fn delete_original(&self) -> ResponderResult<()>;

    /// Answers an autocomplete request with suggestions.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError`] when the transport rejects the call.
    async fn respond_with_choices(&self, choices: Vec<AutocompleteChoice>) -> ResponderResult<()>;
}

/// Errors returned by responder implementations.
#[derive(Debug, Clone, Error)]
pub enum ResponderError {
    /// The interaction was already answered.
    #[error("interaction already answered")]
    AlreadyResponded,

    /// Transport-layer failure.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ResponderError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
