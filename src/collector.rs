//! Collector – rebuilds the [`WorldSnapshot`] from one provider sample.
//!
//! Pure and synchronous so the filtering rules are testable without a
//! socket or a runtime; the async cadence lives in [`crate::agent`].

use crate::provider::EntityRecord;
use crate::types::{EntityObservation, SelfObservation, WorldSnapshot};
use log::trace;

/// Substituted when the provider cannot resolve a display name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Owns the process-lifetime snapshot and rebuilds it in place each cycle.
pub struct Collector {
    snapshot: WorldSnapshot,
    cycles: u64,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Self {
            snapshot: WorldSnapshot::default(),
            cycles: 0,
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn snapshot(&self) -> &WorldSnapshot {
        &self.snapshot
    }

    /// Rebuild the snapshot from `records`, in provider order.
    ///
    /// The self record overwrites `self_data`. Every other record becomes
    /// an enemy iff it is hostile, visible and alive; records are never
    /// deduplicated. A missing name degrades to [`UNKNOWN_NAME`].
    pub fn collect(&mut self, records: Vec<EntityRecord>) -> &WorldSnapshot {
        self.cycles += 1;
        self.snapshot.enemies.clear();

        for record in records {
            if record.is_self {
                self.snapshot.self_data = SelfObservation {
                    position: record.position,
                    team: record.team,
                };
                continue;
            }

            if record.friendly || !record.visible || record.health <= 0 {
                continue;
            }

            self.snapshot.enemies.push(EntityObservation {
                position: record.position,
                team: record.team,
                health: record.health,
                max_health: record.max_health,
                name: record.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            });
        }

        trace!(
            "cycle {}: {} enemies tracked",
            self.cycles,
            self.snapshot.enemies.len()
        );
        &self.snapshot
    }
}
