//! In-memory integration tests for configuration-driven routing.

use std::sync::Arc;

use crate::in_memory::helpers::{BanList, bans, click, resolver};
use mockable::DefaultClock;
use rstest::rstest;
use switchboard::interactions::{
    domain::{
        CommandCall, ErrorKind, HandlerError, InteractionModule, ModuleBuilder, ParameterBuilder,
        RunMode,
    },
    ports::ServiceResolver,
    services::{InteractionService, InteractionServiceConfig},
};

struct Tickets {
    bans: Arc<BanList>,
}

impl InteractionModule for Tickets {
    fn construct(services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        Ok(Self {
            bans: services.resolve::<BanList>()?,
        })
    }
}

fn tickets(pattern: &str) -> ModuleBuilder<Tickets> {
    ModuleBuilder::<Tickets>::new().component_command(pattern, |command| {
        command
            .parameter(ParameterBuilder::of::<u64>("ticket"))
            .handler(|module: Arc<Tickets>, call: CommandCall| async move {
                let ticket = *call.arguments.required::<u64>(0)?;
                module.bans.ban(ticket, "closed")
            })
    })
}

fn service_from(json: &str) -> InteractionService<DefaultClock> {
    let config = InteractionServiceConfig::from_json(json).expect("configuration parses");
    InteractionService::new(config, Arc::new(DefaultClock))
}

#[rstest]
fn json_configuration_overrides_defaults() {
    let config = InteractionServiceConfig::from_json(
        r#"{"default_run_mode":"sync","wildcard_marker":"{id}","custom_id_delimiters":[":"]}"#,
    )
    .expect("configuration parses");

    assert_eq!(config.default_run_mode, RunMode::Sync);
    assert_eq!(config.wildcard_marker.as_deref(), Some("{id}"));
    assert_eq!(config.custom_id_delimiters, [':']);
    assert!(config.throw_on_error);
    assert_eq!(config.notification_capacity, 64);
}

#[rstest]
fn malformed_configuration_is_rejected() {
    let outcome = InteractionServiceConfig::from_json(r#"{"default_run_mode":"eventually"}"#);

    assert!(outcome.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn custom_markers_and_delimiters_route_identifiers(bans: Arc<BanList>) {
    let service = service_from(
        r#"{"default_run_mode":"sync","wildcard_marker":"{id}","custom_id_delimiters":[":"]}"#,
    );
    service
        .add_module(tickets("ticket:{id}:close"))
        .await
        .expect("module loads");

    let closed = service
        .execute(click("ticket:9:close"), resolver(&bans))
        .await
        .expect("dispatch succeeds");
    let reopened = service
        .execute(click("ticket:9:reopen"), resolver(&bans))
        .await
        .expect("dispatch completes");

    assert!(closed.is_success());
    assert_eq!(bans.entries(), [(9, "closed".to_owned())]);
    assert_eq!(reopened.error_kind(), Some(ErrorKind::UnknownCommand));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_wildcards_match_identifiers_literally(bans: Arc<BanList>) {
    let service = InteractionService::new(
        InteractionServiceConfig::inline().without_wildcards(),
        Arc::new(DefaultClock),
    );
    service
        .add_module(
            ModuleBuilder::<Tickets>::new().component_command("ticket:*", |command| {
                command.handler(|module: Arc<Tickets>, _call: CommandCall| async move {
                    module.bans.ban(0, "literal")
                })
            }),
        )
        .await
        .expect("module loads");

    let wildcard = service
        .execute(click("ticket:9"), resolver(&bans))
        .await
        .expect("dispatch completes");
    let literal = service
        .execute(click("ticket:*"), resolver(&bans))
        .await
        .expect("dispatch succeeds");

    assert_eq!(wildcard.error_kind(), Some(ErrorKind::UnknownCommand));
    assert!(literal.is_success());
    assert_eq!(bans.entries(), [(0, "literal".to_owned())]);
}
