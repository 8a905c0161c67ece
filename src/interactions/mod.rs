//! Interaction command dispatch.
//!
//! Modules declared through the builder API are validated into immutable
//! descriptions, routed by kind and executed against inbound interactions.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Routing, binding and execution services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
