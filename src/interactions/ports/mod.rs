//! Port contracts for interaction dispatch.
//!
//! Ports describe the collaborators the dispatch core consumes without
//! owning: dependency resolution for module construction and the transport
//! handle used to answer an interaction.

pub mod responder;
pub mod services;

pub use responder::{InteractionResponder, ResponderError, ResponderResult};
pub use services::{ServiceResolutionError, ServiceResolver};
