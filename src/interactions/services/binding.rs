//! Argument binding.

use tracing::trace;

use crate::interactions::domain::{
    Argument, Arguments, CommandInfo, Interaction, InteractionContext, InteractionData,
    InteractionResult, NamedValue, OptionValue, ParameterInfo, resolve_option_path,
};

/// Raw values available to bind a command's parameters.
///
/// Positional values (wildcard captures, component values, context-menu
/// targets) are consumed first, in order. Remaining parameters are then
/// matched against named values (slash options, modal fields) by
/// case-insensitive name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingInputs {
    positional: Vec<OptionValue>,
    named: Vec<(String, OptionValue)>,
}

impl BindingInputs {
    /// Creates empty inputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts the binding inputs carried by `interaction`.
    ///
    /// `captures` are the wildcard captures of the routed identifier; they
    /// precede every other positional value.
    #[must_use]
    pub fn from_interaction(interaction: &Interaction, captures: Vec<String>) -> Self {
        let inputs = Self::new().with_positional(captures.into_iter().map(OptionValue::String));
        match &interaction.data {
            InteractionData::Command(data) => {
                let resolved = resolve_option_path(&data.name, &data.options);
                inputs
                    .with_positional(data.target.clone())
                    .with_named(named_values(resolved.values))
            }
            InteractionData::Autocomplete(data) => {
                let resolved = resolve_option_path(&data.name, &data.options);
                inputs.with_named(named_values(resolved.values))
            }
            InteractionData::Component(data) => inputs.with_positional(
                data.values
                    .iter()
                    .map(|value| OptionValue::String(value.clone())),
            ),
            InteractionData::ModalSubmit(data) => inputs.with_named(
                data.fields
                    .iter()
                    .map(|field| (field.custom_id.clone(), OptionValue::from(field.value.as_str()))),
            ),
        }
    }

    /// Appends positional values.
    #[must_use]
    pub fn with_positional(mut self, values: impl IntoIterator<Item = OptionValue>) -> Self {
        self.positional.extend(values);
        self
    }

    /// Appends named values.
    #[must_use]
    pub fn with_named(mut self, values: impl IntoIterator<Item = (String, OptionValue)>) -> Self {
        self.named.extend(values);
        self
    }

    /// Returns the positional values.
    #[must_use]
    pub fn positional(&self) -> &[OptionValue] {
        &self.positional
    }

    /// Returns the named values.
    #[must_use]
    pub fn named(&self) -> &[(String, OptionValue)] {
        &self.named
    }
}

fn named_values(values: Vec<NamedValue>) -> impl Iterator<Item = (String, OptionValue)> {
    values.into_iter().map(|named| (named.name, named.value))
}

struct InputCursor {
    positional: std::vec::IntoIter<OptionValue>,
    named: Vec<Option<(String, OptionValue)>>,
}

impl InputCursor {
    fn new(inputs: BindingInputs) -> Self {
        Self {
            positional: inputs.positional.into_iter(),
            named: inputs.named.into_iter().map(Some).collect(),
        }
    }

    fn next_for(&mut self, parameter: &ParameterInfo) -> Option<OptionValue> {
        if let Some(value) = self.positional.next() {
            return Some(value);
        }
        self.named
            .iter_mut()
            .find(|slot| {
                slot.as_ref()
                    .is_some_and(|(name, _)| name.eq_ignore_ascii_case(parameter.name()))
            })
            .and_then(Option::take)
            .map(|(_, value)| value)
    }

    fn remaining(&mut self) -> Vec<OptionValue> {
        let positional: Vec<OptionValue> = self.positional.by_ref().collect();
        if !positional.is_empty() {
            return positional;
        }
        self.named
            .iter_mut()
            .filter_map(Option::take)
            .map(|(_, value)| value)
            .collect()
    }
}

/// Binds `inputs` to the parameters of `command`.
///
/// Binding is deterministic: identical inputs produce equal argument arrays.
///
/// # Errors
///
/// Returns a [`BadArgs`](crate::interactions::domain::ErrorKind::BadArgs)
/// result when a required value is absent, a value violates its choices or
/// bounds, or a converter declines it.
pub async fn bind_arguments(
    command: &CommandInfo,
    context: &InteractionContext,
    inputs: BindingInputs,
) -> Result<Arguments, InteractionResult> {
    let mut cursor = InputCursor::new(inputs);
    let mut arguments = Vec::with_capacity(command.parameters().len());

    for parameter in command.parameters() {
        let argument = if parameter.is_variadic() {
            let values = cursor.remaining();
            if values.is_empty() && parameter.is_required() {
                return Err(missing(parameter));
            }
            let mut elements = Vec::with_capacity(values.len());
            for value in &values {
                elements.push(convert(parameter, context, value).await?);
            }
            Argument::new(elements)
        } else {
            match cursor.next_for(parameter) {
                Some(value) => convert(parameter, context, &value).await?,
                None if parameter.is_required() => return Err(missing(parameter)),
                None => parameter
                    .default_value()
                    .cloned()
                    .unwrap_or_else(Argument::missing),
            }
        };
        trace!(
            command = command.name(),
            parameter = parameter.name(),
            value = ?argument,
            "bound argument"
        );
        arguments.push(argument);
    }

    Ok(Arguments::new(arguments))
}

fn missing(parameter: &ParameterInfo) -> InteractionResult {
    InteractionResult::bad_args(format!(
        "missing required parameter '{}'",
        parameter.name()
    ))
}

async fn convert(
    parameter: &ParameterInfo,
    context: &InteractionContext,
    value: &OptionValue,
) -> Result<Argument, InteractionResult> {
    check_choices(parameter, value)?;
    check_bounds(parameter, value)?;
    parameter
        .converter()
        .convert(context, value, parameter.argument_type())
        .await
        .map_err(|err| {
            InteractionResult::bad_args(format!("parameter '{}': {err}", parameter.name()))
        })
}

fn check_choices(parameter: &ParameterInfo, value: &OptionValue) -> Result<(), InteractionResult> {
    if parameter.choices().is_empty() || parameter.choices().iter().any(|c| c.matches(value)) {
        return Ok(());
    }
    Err(InteractionResult::bad_args(format!(
        "parameter '{}' does not accept {value:?}",
        parameter.name()
    )))
}

#[expect(
    clippy::cast_precision_loss,
    reason = "bounds are declared as f64 and compared against widened integers"
)]
fn check_bounds(parameter: &ParameterInfo, value: &OptionValue) -> Result<(), InteractionResult> {
    let number = match value {
        OptionValue::Integer(number) => *number as f64,
        OptionValue::Number(number) => *number,
        _ => return Ok(()),
    };
    let below = parameter.min_value().is_some_and(|min| number < min);
    let above = parameter.max_value().is_some_and(|max| number > max);
    if below || above {
        return Err(InteractionResult::bad_args(format!(
            "parameter '{}' is out of range: {number}",
            parameter.name()
        )));
    }
    Ok(())
}
