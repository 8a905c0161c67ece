//! Precondition evaluation.
//!
//! Tiers run in a fixed order: parameter preconditions against the bound
//! arguments, then the inherited module chain, then the command's own
//! preconditions. Within the module and command tiers, unlabelled checks
//! must all pass and stop at the first failure, while checks sharing a
//! label pass when any one of them does.

use std::sync::Arc;

use tracing::debug;

use crate::interactions::domain::{
    Arguments, CommandInfo, InteractionContext, InteractionResult, Precondition,
};
use crate::interactions::ports::ServiceResolver;

/// Runs every precondition tier for one dispatch.
///
/// Parameter preconditions skip arguments that were not supplied.
///
/// # Errors
///
/// Returns an
/// [`UnmetPrecondition`](crate::interactions::domain::ErrorKind::UnmetPrecondition)
/// result describing the first tier that rejected the dispatch. A failed
/// labelled group carries one nested result per branch.
pub async fn check_preconditions(
    command: &CommandInfo,
    context: &InteractionContext,
    arguments: &Arguments,
    services: &dyn ServiceResolver,
) -> Result<(), InteractionResult> {
    for (parameter, argument) in command.parameters().iter().zip(arguments.iter()) {
        if argument.is_missing() {
            continue;
        }
        for precondition in parameter.preconditions() {
            if let Err(err) = precondition
                .check(context, parameter, argument, services)
                .await
            {
                debug!(
                    command = %command.display_path(),
                    parameter = parameter.name(),
                    reason = err.reason(),
                    "parameter precondition rejected dispatch"
                );
                return Err(InteractionResult::unmet_precondition(err.reason()));
            }
        }
    }

    check_tier(command.module_preconditions(), command, context, services).await?;
    check_tier(command.preconditions(), command, context, services).await
}

/// Evaluates one tier of command-scoped preconditions.
///
/// # Errors
///
/// Returns the failure of the first unlabelled check or the aggregated
/// failure of the first labelled group in which no check passed.
pub async fn check_tier(
    preconditions: &[Arc<dyn Precondition>],
    command: &CommandInfo,
    context: &InteractionContext,
    services: &dyn ServiceResolver,
) -> Result<(), InteractionResult> {
    for (label, members) in group_by_label(preconditions) {
        match label {
            None => {
                for precondition in members {
                    if let Err(err) = precondition.check(context, command, services).await {
                        debug!(
                            command = %command.display_path(),
                            reason = err.reason(),
                            "precondition rejected dispatch"
                        );
                        return Err(InteractionResult::unmet_precondition(err.reason()));
                    }
                }
            }
            Some(group) => {
                let mut branches = Vec::with_capacity(members.len());
                for precondition in members {
                    let branch = match precondition.check(context, command, services).await {
                        Ok(()) => InteractionResult::Success,
                        Err(err) => InteractionResult::unmet_precondition(err.reason()),
                    };
                    branches.push(branch);
                }
                if !branches.iter().any(InteractionResult::is_success) {
                    debug!(
                        command = %command.display_path(),
                        group,
                        "precondition group rejected dispatch"
                    );
                    return Err(InteractionResult::group_failure(
                        format!("precondition group '{group}' failed"),
                        branches,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Buckets preconditions by label, keeping first-appearance order.
fn group_by_label(
    preconditions: &[Arc<dyn Precondition>],
) -> Vec<(Option<&str>, Vec<&Arc<dyn Precondition>>)> {
    let mut groups: Vec<(Option<&str>, Vec<&Arc<dyn Precondition>>)> = Vec::new();
    for precondition in preconditions {
        let label = precondition.group().filter(|name| !name.is_empty());
        let index = groups
            .iter()
            .position(|(existing, _)| *existing == label)
            .unwrap_or_else(|| {
                groups.push((label, Vec::new()));
                groups.len() - 1
            });
        if let Some((_, members)) = groups.get_mut(index) {
            members.push(precondition);
        }
    }
    groups
}
