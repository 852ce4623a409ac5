//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine besides the trigger traits.
//! Ports exist for:
//! - World storage (could swap SQLite -> Postgres)
//! - Turn notifications (could swap broadcast channel -> WebSocket fan-out)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{WorldRepo, WorldStateRepo};

pub use types::{PersistBatch, WorldRecords};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::GameEventPort;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::MockGameEventPort;
#[cfg(test)]
pub use repos::{MockWorldRepo, MockWorldStateRepo};
#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;
