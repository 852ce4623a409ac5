//! Errors raised inside one turn pass.

use warband_domain::{DomainError, WorldId};

use crate::infrastructure::ports::RepoError;
use crate::trigger::TriggerError;

/// Anything that aborts a pass for one world.
///
/// The coordinator is the only consumer: it logs the error and moves the
/// world to `FAILED`. Variants are kept apart for logging, not for recovery.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("World not found: {0}")]
    WorldNotFound(WorldId),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl TurnError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::WorldNotFound(_) => true,
            Self::Repo(e) => e.is_not_found(),
            Self::Trigger(_) | Self::Domain(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_every_source() {
        assert!(TurnError::WorldNotFound(WorldId::new(42)).is_not_found());
        assert!(TurnError::from(RepoError::not_found("World", 42)).is_not_found());
        assert!(!TurnError::from(RepoError::database("commit", "disk full")).is_not_found());
        assert!(!TurnError::from(TriggerError::action("t1", "boom")).is_not_found());
    }

    #[test]
    fn world_not_found_message_carries_id() {
        assert_eq!(
            TurnError::WorldNotFound(WorldId::new(42)).to_string(),
            "World not found: 42"
        );
    }
}
