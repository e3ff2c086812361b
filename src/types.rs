//! Core telemetry types shared across all modules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Basic math
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

/// One hostile entity as seen during a single collection cycle.
///
/// Ephemeral – the enemy list is cleared and rebuilt every cycle; nothing
/// here outlives the cycle that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityObservation {
    pub position: Vec3,
    pub team: i32,
    pub health: i32,
    pub max_health: i32,
    /// Resolved display name; `"Unknown"` when the lookup failed.
    pub name: String,
}

/// The controlling viewpoint entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfObservation {
    pub position: Vec3,
    pub team: i32,
}

impl Default for SelfObservation {
    fn default() -> Self {
        Self {
            position: Vec3::zero(),
            team: 0,
        }
    }
}

/// Aggregate world state for one cycle.
///
/// Owned exclusively by the collection loop's [`Collector`]; `enemies` is
/// insertion-ordered and carries no deduplication – an entity the provider
/// reports twice appears twice.
///
/// [`Collector`]: crate::collector::Collector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    pub self_data: SelfObservation,
    pub enemies: Vec<EntityObservation>,
}

// ---------------------------------------------------------------------------
// Stats & config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub cycles: u64,
    pub frames_sent: u64,
    pub send_failures: u64,
    pub enemies_last_cycle: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Remote listener host (name or address).
    pub host: String,
    pub port: u16,
    /// Upgrade request path on the listener.
    pub path: String,
    /// Collection cadence. 100 ms ≈ 10 snapshots/second.
    #[serde(with = "duration_millis")]
    pub interval: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            path: "/ws".into(),
            interval: Duration::from_millis(100),
        }
    }
}

/// Serde adapter: `interval` as integer milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
