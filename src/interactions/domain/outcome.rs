//! Handler return values.

use super::{ErrorKind, HandlerError, InteractionResult};

/// What a handler body produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The handler finished normally.
    Completed,
    /// The handler returned an explicit result.
    Result(InteractionResult),
    /// The handler finished without a recognizable result.
    Empty,
}

impl CommandOutcome {
    /// Reduces the outcome to a dispatch result.
    #[must_use]
    pub fn into_result(self) -> InteractionResult {
        match self {
            Self::Completed => InteractionResult::Success,
            Self::Result(result) => result,
            Self::Empty => InteractionResult::error(
                ErrorKind::Unsuccessful,
                "handler finished without a result",
            ),
        }
    }
}

/// Conversion from a typed handler's return value.
pub trait IntoCommandOutcome {
    /// Converts the value.
    ///
    /// # Errors
    ///
    /// Returns the fault carried by an `Err` return value.
    fn into_outcome(self) -> Result<CommandOutcome, HandlerError>;
}

impl IntoCommandOutcome for () {
    fn into_outcome(self) -> Result<CommandOutcome, HandlerError> {
        Ok(CommandOutcome::Completed)
    }
}

impl IntoCommandOutcome for CommandOutcome {
    fn into_outcome(self) -> Result<CommandOutcome, HandlerError> {
        Ok(self)
    }
}

impl IntoCommandOutcome for InteractionResult {
    fn into_outcome(self) -> Result<CommandOutcome, HandlerError> {
        Ok(CommandOutcome::Result(self))
    }
}

impl<T: IntoCommandOutcome> IntoCommandOutcome for Option<T> {
    fn into_outcome(self) -> Result<CommandOutcome, HandlerError> {
        self.map_or(Ok(CommandOutcome::Empty), IntoCommandOutcome::into_outcome)
    }
}

impl<T, E> IntoCommandOutcome for Result<T, E>
where
    T: IntoCommandOutcome,
    E: Into<HandlerError>,
{
    fn into_outcome(self) -> Result<CommandOutcome, HandlerError> {
        match self {
            Ok(value) => value.into_outcome(),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unit_and_none_map_to_completed_and_empty() {
        assert_eq!(().into_outcome().ok(), Some(CommandOutcome::Completed));
        assert_eq!(None::<()>.into_outcome().ok(), Some(CommandOutcome::Empty));
    }

    #[rstest]
    fn err_values_become_faults() {
        let value: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));

        let fault = value.into_outcome().err().map(|fault| fault.to_string());

        assert_eq!(fault.as_deref(), Some("disk full"));
    }

    #[rstest]
    fn empty_outcome_is_unsuccessful() {
        assert_eq!(
            CommandOutcome::Empty.into_result().error_kind(),
            Some(ErrorKind::Unsuccessful)
        );
    }
}
