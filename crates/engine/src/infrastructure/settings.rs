//! Engine settings loaded from the environment.
//!
//! Supported environment variables:
//! - `WARBAND_DATABASE_URL`: SQLite connection string
//! - `WARBAND_TURN_INTERVAL_MS`: daemon tick period in milliseconds
//! - `WARBAND_COMMIT_SHA`: build tag; only worlds pinned to it (or untagged) run
//! - `WARBAND_SEED_DEMO_WORLD`: seed a demo world on startup when empty
//!
//! Malformed values are logged and replaced by the default.

use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:warband.db?mode=rwc";
pub const DEFAULT_TURN_INTERVAL_MS: u64 = 300_000;
pub const DEFAULT_COMMIT_SHA: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub database_url: String,
    pub turn_interval: Duration,
    pub commit_sha: String,
    pub seed_demo_world: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            turn_interval: Duration::from_millis(DEFAULT_TURN_INTERVAL_MS),
            commit_sha: DEFAULT_COMMIT_SHA.to_string(),
            seed_demo_world: false,
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get("WARBAND_DATABASE_URL") {
            settings.database_url = url;
        }

        if let Some(val) = get("WARBAND_TURN_INTERVAL_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => settings.turn_interval = Duration::from_millis(ms),
                _ => tracing::warn!(
                    val = %val,
                    default_ms = DEFAULT_TURN_INTERVAL_MS,
                    "WARBAND_TURN_INTERVAL_MS is not a positive integer, using default"
                ),
            }
        }

        if let Some(sha) = get("WARBAND_COMMIT_SHA") {
            settings.commit_sha = sha;
        }

        if let Some(val) = get("WARBAND_SEED_DEMO_WORLD") {
            match parse_flag(&val) {
                Some(flag) => settings.seed_demo_world = flag,
                None => tracing::warn!(
                    val = %val,
                    "WARBAND_SEED_DEMO_WORLD is not a boolean, using default"
                ),
            }
        }

        settings
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
