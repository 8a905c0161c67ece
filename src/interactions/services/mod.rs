//! Application services for interaction dispatch.
//!
//! [`InteractionService`] is the front door: it builds modules against the
//! [`TypeConverterRegistry`], keeps one [`CommandRouter`] per command kind,
//! and executes routed commands under the configured run mode.

mod application_commands;
mod assembly;
mod binding;
mod config;
mod converters;
mod executor;
mod preconditions;
mod registry;
mod router;

pub use application_commands::{
    ApplicationCommandSpec, CommandOptionSpec, OptionSpecKind, application_commands,
};
pub use binding::{BindingInputs, bind_arguments};
pub use config::InteractionServiceConfig;
pub use converters::TypeConverterRegistry;
pub use executor::{DispatchError, DispatchResult};
pub use preconditions::{check_preconditions, check_tier};
pub use registry::{InteractionService, RegistryError, RegistryResult};
pub use router::{CommandRouter, RouteMatch, RouterError};
