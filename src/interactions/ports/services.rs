//! Dependency resolution port.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use thiserror::Error;

/// Resolves shared services by type when module instances are constructed.
pub trait ServiceResolver: Send + Sync {
    /// Returns the service registered for `type_id`.
    fn resolve_any(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

impl<'a> dyn ServiceResolver + 'a {
    /// Resolves the service of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceResolutionError::NotRegistered`] when no service of
    /// that type is registered.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ServiceResolutionError> {
        self.resolve_any(TypeId::of::<T>())
            .and_then(|service| service.downcast::<T>().ok())
            .ok_or(ServiceResolutionError::NotRegistered(type_name::<T>()))
    }
}

/// Errors returned when a service cannot be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceResolutionError {
    /// No service of the requested type is registered.
    #[error("no service registered for {0}")]
    NotRegistered(&'static str),
}
