//! Responder that records calls instead of sending them.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::interactions::{
    domain::AutocompleteChoice,
    ports::{InteractionResponder, ResponderError, ResponderResult},
};

/// Everything a [`RecordingResponder`] was asked to send.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedResponses {
    /// Number of `delete_original` calls.
    pub deleted_originals: usize,
    /// Every batch of autocomplete suggestions, in call order.
    pub choices: Vec<Vec<AutocompleteChoice>>,
}

/// Thread-safe in-memory responder.
#[derive(Debug, Clone, Default)]
pub struct RecordingResponder {
    state: Arc<Mutex<RecordedResponses>>,
}

impl RecordingResponder {
    /// Creates a responder with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError::Transport`] when the recording lock is
    /// poisoned.
    pub fn recorded(&self) -> ResponderResult<RecordedResponses> {
        let state = self
            .state
            .lock()
            .map_err(|err| ResponderError::transport(std::io::Error::other(err.to_string())))?;
        Ok(state.clone())
    }

    fn record(&self, apply: impl FnOnce(&mut RecordedResponses)) -> ResponderResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| ResponderError::transport(std::io::Error::other(err.to_string())))?;
        apply(&mut state);
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn delete_original(&self) -> ResponderResult<()> {
        self.record(|state| state.deleted_originals += 1)
    }

    async fn respond_with_choices(&self, choices: Vec<AutocompleteChoice>) -> ResponderResult<()> {
        self.record(|state| state.choices.push(choices))
    }
}
