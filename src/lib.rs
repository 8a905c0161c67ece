//! Switchboard: interaction command dispatch.
//!
//! This crate routes inbound platform interactions (slash commands, context
//! menu commands, message components, modal submissions and autocomplete
//! requests) to handlers declared once through a builder API. It authorizes
//! each dispatch through a layered precondition chain, binds typed arguments
//! through pluggable type converters, and executes handlers either inline or
//! as detached tasks.
//!
//! # Architecture
//!
//! Switchboard follows hexagonal architecture principles:
//!
//! - **Domain**: immutable module, command and parameter descriptions
//! - **Ports**: traits for the collaborators the core consumes (dependency
//!   resolution, interaction responses)
//! - **Adapters**: in-memory implementations of those ports
//! - **Services**: routing, converter resolution, precondition evaluation,
//!   execution and the registry front door
//!
//! # Modules
//!
//! - [`interactions`]: the command dispatch core

pub mod interactions;
