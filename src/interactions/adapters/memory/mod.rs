//! In-memory adapters for hosts without a dependency container and for
//! tests.

mod responder;
mod services;

pub use responder::{RecordedResponses, RecordingResponder};
pub use services::ServiceCollection;
