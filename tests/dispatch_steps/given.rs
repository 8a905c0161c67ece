//! Given steps for interaction dispatch BDD scenarios.

use std::sync::Arc;

use super::world::{DispatchWorld, Recorder, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use switchboard::interactions::domain::{
    CommandCall, FnPrecondition, HandlerError, ModuleBuilder, ParameterBuilder,
    PreconditionError,
};

#[given(r#"a module in group "{group}" with a slash command "{name}""#)]
fn grouped_slash_command(
    world: &mut DispatchWorld,
    group: String,
    name: String,
) -> Result<(), eyre::Report> {
    let recorded = name.clone();
    let module = ModuleBuilder::<Recorder>::new()
        .group(group, "Scenario group")
        .slash_command(name, "Scenario command", move |command| {
            let label = recorded.clone();
            command.handler(move |module: Arc<Recorder>, _call: CommandCall| {
                let entry = label.clone();
                async move { module.calls.record(entry) }
            })
        });
    run_async(world.service.add_module(module)).wrap_err("load grouped module")?;
    Ok(())
}

#[given(r#"a component handler for "{pattern}""#)]
fn component_handler(world: &mut DispatchWorld, pattern: String) -> Result<(), eyre::Report> {
    let module = ModuleBuilder::<Recorder>::new().component_command(pattern, |command| {
        command
            .parameter(ParameterBuilder::of::<String>("id"))
            .handler(|module: Arc<Recorder>, call: CommandCall| async move {
                let id = call.arguments.required::<String>(0)?;
                module.calls.record(id.as_str());
                Ok::<_, HandlerError>(())
            })
    });
    run_async(world.service.add_module(module)).wrap_err("load component module")?;
    Ok(())
}

#[given(r#"a slash command "{name}" guarded by a failing and a passing "{group}" precondition"#)]
fn guarded_command(
    world: &mut DispatchWorld,
    name: String,
    group: String,
) -> Result<(), eyre::Report> {
    let module = ModuleBuilder::<Recorder>::new().slash_command(name, "Guarded", |command| {
        command
            .precondition(
                FnPrecondition::new(|_context, _command| {
                    Err(PreconditionError::new("not an admin"))
                })
                .in_group(group.clone()),
            )
            .precondition(FnPrecondition::new(|_context, _command| Ok(())).in_group(group))
            .handler(|module: Arc<Recorder>, _call: CommandCall| async move {
                module.calls.record("guarded");
            })
    });
    run_async(world.service.add_module(module)).wrap_err("load guarded module")?;
    Ok(())
}
