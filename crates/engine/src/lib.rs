//! Warband turn engine library.
//!
//! Advances persistent turn-based worlds one pass at a time.
//!
//! ## Structure
//!
//! - `trigger/` - Priority-ordered trigger chain and action modifiers
//! - `use_cases/` - Turn pipeline: loader, processor, persister, coordinator, daemon
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod trigger;
pub mod use_cases;

pub use app::App;
