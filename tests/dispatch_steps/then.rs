//! Then steps for interaction dispatch BDD scenarios.

use super::world::DispatchWorld;
use rstest_bdd_macros::then;
use switchboard::interactions::domain::InteractionResult;

fn last_result(world: &DispatchWorld) -> Result<&InteractionResult, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(result)) => Ok(result),
        Some(Err(err)) => Err(eyre::eyre!("dispatch raised a fault: {err}")),
        None => Err(eyre::eyre!("no dispatch in scenario world")),
    }
}

#[then("the dispatch succeeds")]
fn dispatch_succeeds(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !result.is_success() {
        return Err(eyre::eyre!("expected success, got {result}"));
    }
    Ok(())
}

#[then(r#"the dispatch fails with "{kind}""#)]
fn dispatch_fails_with(world: &DispatchWorld, kind: String) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    let actual = result.error_kind().map(|error_kind| error_kind.as_str());
    if actual != Some(kind.as_str()) {
        return Err(eyre::eyre!("expected {kind} failure, got {result}"));
    }
    Ok(())
}

#[then(r#"the handler recorded "{value}""#)]
fn handler_recorded(world: &DispatchWorld, value: String) -> Result<(), eyre::Report> {
    let seen = world.calls.seen();
    if !seen.contains(&value) {
        return Err(eyre::eyre!("expected '{value}' in {seen:?}"));
    }
    Ok(())
}

#[then("no handler ran")]
fn no_handler_ran(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let seen = world.calls.seen();
    if !seen.is_empty() {
        return Err(eyre::eyre!("expected no invocations, got {seen:?}"));
    }
    Ok(())
}
