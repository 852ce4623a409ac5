use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Coarse stage a world's current or most recent turn pass occupies.
///
/// A pass walks `Idle -> Loading -> Processing -> Persisting -> Publishing ->
/// Idle`; any stage may fall to `Failed`, which is always followed by `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnLifecycleState {
    #[default]
    Idle,
    Loading,
    Processing,
    Persisting,
    Publishing,
    Failed,
}

impl TurnLifecycleState {
    pub const ALL: [TurnLifecycleState; 6] = [
        Self::Idle,
        Self::Loading,
        Self::Processing,
        Self::Persisting,
        Self::Publishing,
        Self::Failed,
    ];

    /// Compact encoding for atomic status cells.
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Loading => 1,
            Self::Processing => 2,
            Self::Persisting => 3,
            Self::Publishing => 4,
            Self::Failed => 5,
        }
    }

    /// Inverse of [`as_u8`](Self::as_u8); unknown codes decode as `None`.
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Idle),
            1 => Some(Self::Loading),
            2 => Some(Self::Processing),
            3 => Some(Self::Persisting),
            4 => Some(Self::Publishing),
            5 => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Loading => "LOADING",
            Self::Processing => "PROCESSING",
            Self::Persisting => "PERSISTING",
            Self::Publishing => "PUBLISHING",
            Self::Failed => "FAILED",
        }
    }

    /// True while a pass is in flight for the world.
    pub fn is_busy(self) -> bool {
        !matches!(self, Self::Idle | Self::Failed)
    }
}

impl fmt::Display for TurnLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurnLifecycleState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::parse(format!("Unknown lifecycle state: {}", s)))
    }
}
