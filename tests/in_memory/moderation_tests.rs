//! In-memory integration tests for a grouped moderation module.

use std::sync::Arc;

use crate::in_memory::helpers::{
    BanList, TestService, bans, click, direct_subcommand, guild_subcommand, resolver, service,
    submit,
};
use rstest::rstest;
use switchboard::interactions::{
    domain::{
        CommandCall, CommandOption, ErrorKind, HandlerError, InteractionModule, InteractionResult,
        ModuleBuilder, OptionValue, ParameterBuilder, RequireContext, UserRef,
    },
    ports::ServiceResolver,
};

struct Moderation {
    bans: Arc<BanList>,
}

impl InteractionModule for Moderation {
    fn construct(services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        Ok(Self {
            bans: services.resolve::<BanList>()?,
        })
    }
}

fn moderation() -> ModuleBuilder<Moderation> {
    ModuleBuilder::<Moderation>::new()
        .group("mod", "Moderation tools")
        .precondition(RequireContext::Guild)
        .slash_command("ban", "Ban a member", |command| {
            command
                .parameter(ParameterBuilder::of::<UserRef>("member"))
                .parameter(ParameterBuilder::of::<String>("reason").default_value("no reason".to_owned()))
                .parameter(
                    ParameterBuilder::of::<i64>("days")
                        .min_value(0.0)
                        .max_value(7.0)
                        .default_value(0_i64),
                )
                .handler(|module: Arc<Moderation>, call: CommandCall| async move {
                    let member = call.arguments.required::<UserRef>(0)?;
                    let reason = call.arguments.required::<String>(1)?;
                    module.bans.ban(member.id.get(), reason)
                })
        })
        .component_command("unban:*", |command| {
            command
                .ignore_group_names()
                .parameter(ParameterBuilder::of::<u64>("user"))
                .handler(|module: Arc<Moderation>, call: CommandCall| async move {
                    let user = *call.arguments.required::<u64>(0)?;
                    let lifted = module.bans.unban(user)?;
                    Ok::<_, HandlerError>(if lifted {
                        InteractionResult::Success
                    } else {
                        InteractionResult::bad_args(format!("user {user} is not banned"))
                    })
                })
        })
        .modal_command("appeal:*", |command| {
            command
                .ignore_group_names()
                .parameter(ParameterBuilder::of::<u64>("user"))
                .parameter(ParameterBuilder::of::<String>("statement"))
                .handler(|module: Arc<Moderation>, call: CommandCall| async move {
                    let user = *call.arguments.required::<u64>(0)?;
                    let statement = call.arguments.required::<String>(1)?;
                    if statement.contains("sorry") {
                        module.bans.unban(user)?;
                    }
                    Ok::<_, HandlerError>(())
                })
        })
}

fn member(id: u64) -> CommandOption {
    CommandOption::value("member", OptionValue::User(UserRef::new(id, "troll")))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ban_and_unban_round_trip(service: TestService, bans: Arc<BanList>) {
    service.add_module(moderation()).await.expect("module loads");

    let banned = service
        .execute(
            guild_subcommand("mod", "ban", vec![member(42), CommandOption::value("reason", "spam")]),
            resolver(&bans),
        )
        .await
        .expect("ban dispatch");
    assert!(banned.is_success());
    assert_eq!(bans.entries(), [(42, "spam".to_owned())]);

    let lifted = service
        .execute(click("unban:42"), resolver(&bans))
        .await
        .expect("unban dispatch");
    assert!(lifted.is_success());
    assert!(bans.entries().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn optional_parameters_use_their_defaults(service: TestService, bans: Arc<BanList>) {
    service.add_module(moderation()).await.expect("module loads");

    let result = service
        .execute(guild_subcommand("mod", "ban", vec![member(7)]), resolver(&bans))
        .await
        .expect("ban dispatch");

    assert!(result.is_success());
    assert_eq!(bans.entries(), [(7, "no reason".to_owned())]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn out_of_range_values_never_reach_the_handler(service: TestService, bans: Arc<BanList>) {
    service.add_module(moderation()).await.expect("module loads");

    let result = service
        .execute(
            guild_subcommand("mod", "ban", vec![member(42), CommandOption::value("days", 30_i64)]),
            resolver(&bans),
        )
        .await
        .expect("ban dispatch");

    assert_eq!(result.error_kind(), Some(ErrorKind::BadArgs));
    assert!(bans.entries().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn module_preconditions_cover_every_command(service: TestService, bans: Arc<BanList>) {
    service.add_module(moderation()).await.expect("module loads");

    let result = service
        .execute(direct_subcommand("mod", "ban", vec![member(42)]), resolver(&bans))
        .await
        .expect("ban dispatch");

    assert_eq!(result.error_kind(), Some(ErrorKind::UnmetPrecondition));
    assert!(bans.entries().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handler_results_pass_through(service: TestService, bans: Arc<BanList>) {
    service.add_module(moderation()).await.expect("module loads");

    let result = service
        .execute(click("unban:5"), resolver(&bans))
        .await
        .expect("unban dispatch");

    assert_eq!(result, InteractionResult::bad_args("user 5 is not banned"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn modal_captures_and_fields_bind_together(service: TestService, bans: Arc<BanList>) {
    service.add_module(moderation()).await.expect("module loads");
    bans.ban(42, "spam").expect("seed ban");

    let result = service
        .execute(
            submit("appeal:42", &[("statement", "I am sorry")]),
            resolver(&bans),
        )
        .await
        .expect("appeal dispatch");

    assert!(result.is_success());
    assert!(bans.entries().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unparseable_captures_are_bad_args(service: TestService, bans: Arc<BanList>) {
    service.add_module(moderation()).await.expect("module loads");

    let result = service
        .execute(click("unban:someone"), resolver(&bans))
        .await
        .expect("unban dispatch");

    assert_eq!(result.error_kind(), Some(ErrorKind::BadArgs));
}
