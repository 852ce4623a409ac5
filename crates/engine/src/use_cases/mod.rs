//! Use cases - orchestration of the turn pipeline.
//!
//! Each module contains use cases for a specific domain area.

pub mod turn;

pub use turn::TurnUseCases;
