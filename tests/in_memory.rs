//! In-memory integration tests for interaction dispatch.
//!
//! Tests are organized into modules by functionality:
//! - `moderation_tests`: A grouped moderation module end to end
//! - `concurrency_tests`: Concurrent dispatch and registry mutation
//! - `configuration_tests`: Configuration loading and identifier routing

mod in_memory {
    pub mod helpers;

    mod concurrency_tests;
    mod configuration_tests;
    mod moderation_tests;
}
