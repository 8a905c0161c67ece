//! Unit tests for interaction dispatch services.

mod application_command_tests;
mod support;
