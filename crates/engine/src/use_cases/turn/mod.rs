//! Turn use cases.
//!
//! One pass for one world runs `loader -> processor -> persister -> publish`
//! under the [`TurnCoordinator`]; the [`TurnDaemon`] decides which worlds get
//! a pass and when.

mod coordinator;
mod daemon;
mod dirty_tracker;
mod error;
mod loader;
mod persister;
mod processor;
mod state;
mod status;

use std::sync::Arc;

pub use coordinator::TurnCoordinator;
pub use daemon::{DaemonState, TickSummary, TurnDaemon};
pub use dirty_tracker::{DirtyChanges, DirtyTracker, EntityKind};
pub use error::TurnError;
pub use loader::WorldStateLoader;
pub use persister::WorldStatePersister;
pub use processor::InMemoryTurnProcessor;
pub use state::InMemoryWorldState;
pub use status::{StatusChange, TurnStatusService};

/// Container for turn use cases.
pub struct TurnUseCases {
    pub coordinator: Arc<TurnCoordinator>,
    pub daemon: Arc<TurnDaemon>,
    pub status: Arc<TurnStatusService>,
}

impl TurnUseCases {
    pub fn new(
        coordinator: Arc<TurnCoordinator>,
        daemon: Arc<TurnDaemon>,
        status: Arc<TurnStatusService>,
    ) -> Self {
        Self {
            coordinator,
            daemon,
            status,
        }
    }
}
