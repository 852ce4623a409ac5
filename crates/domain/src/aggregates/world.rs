//! World aggregate - one independent instance of the simulation
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: the calendar is only moved through `advance_month()`
//! - **Valid by construction**: `new()` rejects months outside `1..=12` and
//!   zero-length ticks
//! - **Builder pattern**: fluent API for optional fields

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{AuxMap, AuxValue};
use crate::WorldId;

/// Meta key holding the build a world is pinned to.
pub const META_COMMIT_SHA: &str = "commitSha";
/// Meta key toggling whether the gateway currently serves the world.
pub const META_GATEWAY_ACTIVE: &str = "gatewayActive";

/// A world's mutable record: calendar, tick interval and free-form blobs.
///
/// # Invariants
///
/// - `current_month` is always in `1..=12`
/// - `tick_seconds` is always positive
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use warband_domain::{World, WorldId};
///
/// let mut world = World::new(WorldId::new(1), 184, 12, 300, Utc::now()).unwrap();
/// world.advance_month();
///
/// assert_eq!((world.current_year(), world.current_month()), (185, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    // Identity
    id: WorldId,

    // Calendar
    current_year: i32,
    current_month: u8,

    // Scheduling
    tick_seconds: u32,
    realtime_mode: bool,

    // Blobs
    config: AuxMap,
    meta: AuxMap,

    // Timestamps
    /// Scheduled instant of the most recently processed turn.
    updated_at: DateTime<Utc>,
}

impl World {
    // =========================================================================
    // Constructor
    // =========================================================================

    pub fn new(
        id: WorldId,
        current_year: i32,
        current_month: u8,
        tick_seconds: u32,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !(1..=12).contains(&current_month) {
            return Err(DomainError::validation(format!(
                "month must be in 1..=12, got {}",
                current_month
            )));
        }
        if tick_seconds == 0 {
            return Err(DomainError::validation("tick interval must be positive"));
        }
        Ok(Self {
            id,
            current_year,
            current_month,
            tick_seconds,
            realtime_mode: false,
            config: AuxMap::new(),
            meta: AuxMap::new(),
            updated_at,
        })
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_realtime_mode(mut self, realtime_mode: bool) -> Self {
        self.realtime_mode = realtime_mode;
        self
    }

    pub fn with_config(mut self, config: AuxMap) -> Self {
        self.config = config;
        self
    }

    pub fn with_meta(mut self, meta: AuxMap) -> Self {
        self.meta = meta;
        self
    }

    // =========================================================================
    // Accessors (read-only)
    // =========================================================================

    #[inline]
    pub fn id(&self) -> WorldId {
        self.id
    }

    #[inline]
    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    #[inline]
    pub fn current_month(&self) -> u8 {
        self.current_month
    }

    #[inline]
    pub fn tick_seconds(&self) -> u32 {
        self.tick_seconds
    }

    /// Length of one turn.
    pub fn tick(&self) -> Duration {
        Duration::seconds(i64::from(self.tick_seconds))
    }

    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.realtime_mode
    }

    #[inline]
    pub fn config(&self) -> &AuxMap {
        &self.config
    }

    #[inline]
    pub fn meta(&self) -> &AuxMap {
        &self.meta
    }

    #[inline]
    pub fn meta_mut(&mut self) -> &mut AuxMap {
        &mut self.meta
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Instant at which the next turn becomes due.
    pub fn next_turn_at(&self) -> DateTime<Utc> {
        self.updated_at + self.tick()
    }

    /// Build the world is pinned to, if any.
    pub fn commit_sha(&self) -> Option<&str> {
        self.meta.get(META_COMMIT_SHA).and_then(AuxValue::as_str)
    }

    /// Whether the gateway currently serves this world.
    ///
    /// Missing means active. Booleans are taken as-is, integers are active
    /// when non-zero and strings when `"true"` (any case) or `"1"`; any
    /// other value is inactive.
    pub fn is_gateway_active(&self) -> bool {
        match self.meta.get(META_GATEWAY_ACTIVE) {
            None => true,
            Some(AuxValue::Bool(v)) => *v,
            Some(AuxValue::Int(v)) => *v != 0,
            Some(AuxValue::Float(v)) => *v != 0.0,
            Some(AuxValue::Str(v)) => v.eq_ignore_ascii_case("true") || v == "1",
            Some(AuxValue::Map(_)) => false,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Move the calendar one month forward, rolling December into the next year.
    pub fn advance_month(&mut self) {
        if self.current_month >= 12 {
            self.current_month = 1;
            self.current_year += 1;
        } else {
            self.current_month += 1;
        }
    }

    pub fn set_updated_at(&mut self, updated_at: DateTime<Utc>) {
        self.updated_at = updated_at;
    }
}
