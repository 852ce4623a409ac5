//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod event_bus;
pub mod memory_store;
pub mod ports;
pub mod settings;
pub mod sqlite_store;
