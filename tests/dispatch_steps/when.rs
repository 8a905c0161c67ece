//! When steps for interaction dispatch BDD scenarios.

use super::world::{DispatchWorld, Recorder, component_context, run_async, slash_context};
use rstest_bdd_macros::when;

#[when(r#"the slash command "{path}" is dispatched"#)]
fn dispatch_slash(world: &mut DispatchWorld, path: String) {
    let resolver = world.resolver();
    world.last_result = Some(run_async(
        world.service.execute(slash_context(&path), resolver),
    ));
}

#[when(r#"the component "{custom_id}" is clicked"#)]
fn click_component(world: &mut DispatchWorld, custom_id: String) {
    let resolver = world.resolver();
    world.last_result = Some(run_async(
        world.service.execute(component_context(&custom_id), resolver),
    ));
}

#[when("the module is unloaded")]
fn unload_module(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    run_async(world.service.remove_module_for::<Recorder>())
        .map_err(|err| eyre::eyre!("unload failed: {err}"))?;
    Ok(())
}
