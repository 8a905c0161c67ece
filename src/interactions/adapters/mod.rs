//! Adapter implementations for interaction dispatch ports.

pub mod memory;
