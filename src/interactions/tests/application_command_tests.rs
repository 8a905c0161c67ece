//! Unit tests for application-command descriptions.

use rstest::rstest;

use super::support::{Other, Plain, TestService, noop, service};
use crate::interactions::{
    domain::{
        ApplicationCommandType, ArgumentType, Capability, ChoiceArgument, HandlerError,
        InteractionModule, ModuleBuilder, OptionValue, ParameterBuilder, ParameterChoice, UserRef,
    },
    ports::ServiceResolver,
    services::{ApplicationCommandSpec, CommandOptionSpec, OptionSpecKind},
};

struct Roles;

impl InteractionModule for Roles {
    fn construct(_services: &dyn ServiceResolver) -> Result<Self, HandlerError> {
        Ok(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    Red,
    Blue,
}

impl ChoiceArgument for Colour {
    const CHOICES: &'static [&'static str] = &["red", "blue"];

    fn from_choice(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            _ => None,
        }
    }
}

impl ArgumentType for Colour {
    fn capabilities() -> Vec<Capability> {
        vec![Capability::choice::<Self>()]
    }
}

async fn load_catalogue(service: &TestService) {
    service
        .add_modules([
            ModuleBuilder::<Plain>::new()
                .group("admin", "Administration")
                .slash_command("ping", "Check latency", noop)
                .submodule(
                    ModuleBuilder::<Roles>::new()
                        .group("role", "Role management")
                        .slash_command("grant", "Grant a role", |command| {
                            noop(command.parameter(
                                ParameterBuilder::of::<UserRef>("member").description("Member"),
                            ))
                        }),
                )
                .build(),
            ModuleBuilder::<Other>::new()
                .slash_command("paint", "Paint something", |command| {
                    noop(
                        command
                            .parameter(ParameterBuilder::of::<Colour>("colour"))
                            .parameter(
                                ParameterBuilder::of::<i64>("coats")
                                    .min_value(1.0)
                                    .max_value(3.0)
                                    .optional(),
                            ),
                    )
                })
                .autocomplete_command("paint colour", noop)
                .user_command("Inspect", noop)
                .component_command("paint:*", noop)
                .build(),
        ])
        .await
        .expect("catalogue loads");
}

fn find<'a>(specs: &'a [ApplicationCommandSpec], name: &str) -> &'a ApplicationCommandSpec {
    specs
        .iter()
        .find(|spec| spec.name == name)
        .unwrap_or_else(|| panic!("expected application command `{name}`"))
}

fn option<'a>(options: &'a [CommandOptionSpec], name: &str) -> &'a CommandOptionSpec {
    options
        .iter()
        .find(|spec| spec.name == name)
        .unwrap_or_else(|| panic!("expected option `{name}`"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn groups_fold_into_one_top_level_command(service: TestService) {
    load_catalogue(&service).await;

    let specs = service.application_commands();

    let names: Vec<&str> = specs.iter().map(|spec| spec.name.as_str()).collect();
    assert_eq!(names, ["admin", "Inspect", "paint"]);
    let admin = find(&specs, "admin");
    assert_eq!(admin.kind, ApplicationCommandType::ChatInput);
    assert_eq!(admin.description, "Administration");
    assert_eq!(option(&admin.options, "ping").kind, OptionSpecKind::Subcommand);

    let role = option(&admin.options, "role");
    assert_eq!(role.kind, OptionSpecKind::SubcommandGroup);
    assert_eq!(role.description, "Role management");
    let grant = option(&role.options, "grant");
    let member = option(&grant.options, "member");
    assert_eq!(member.kind, OptionSpecKind::User);
    assert!(member.required);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parameters_describe_choices_bounds_and_autocomplete(service: TestService) {
    load_catalogue(&service).await;

    let specs = service.application_commands();
    let paint = find(&specs, "paint");

    let colour = option(&paint.options, "colour");
    assert_eq!(colour.kind, OptionSpecKind::String);
    assert!(colour.autocomplete);
    assert_eq!(
        colour.choices,
        [
            ParameterChoice::new("red", OptionValue::from("red")),
            ParameterChoice::new("blue", OptionValue::from("blue")),
        ]
    );

    let coats = option(&paint.options, "coats");
    assert_eq!(coats.kind, OptionSpecKind::Integer);
    assert!(!coats.required);
    assert_eq!((coats.min_value, coats.max_value), (Some(1.0), Some(3.0)));
    assert!(!coats.autocomplete);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn context_commands_carry_no_description(service: TestService) {
    load_catalogue(&service).await;

    let specs = service.application_commands();
    let inspect = find(&specs, "Inspect");

    assert_eq!(inspect.kind, ApplicationCommandType::User);
    assert!(inspect.description.is_empty());
    assert!(inspect.options.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn descriptions_serialize_for_upload(service: TestService) {
    load_catalogue(&service).await;
    let module = service.module_for::<Plain>().expect("admin module");

    let json = serde_json::to_value(module.to_application_commands()).expect("serializes");

    assert_eq!(json[0]["name"], "admin");
    assert_eq!(json[0]["kind"], "chat_input");
    assert_eq!(json[0]["options"][1]["kind"], "subcommand_group");
    assert_eq!(json[0]["options"][1]["options"][0]["options"][0]["kind"], "user");
    assert!(json[0]["options"][0].get("choices").is_none());
}
