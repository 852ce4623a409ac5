//! Shared vocabulary types for the turn pipeline.
//!
//! Pure data types: no I/O, no async, no side effects.

mod lifecycle;
pub use lifecycle::TurnLifecycleState;
