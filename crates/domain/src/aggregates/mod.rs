//! Aggregates with guarded invariants.

pub mod world;

pub use world::{World, META_COMMIT_SHA, META_GATEWAY_ACTIVE};
