//! World snapshot provider – the boundary to whatever owns the live world.
//!
//! The collection loop never inspects a foreign process itself. It asks an
//! implementation of [`WorldProvider`] for one batched sample per cycle and
//! treats every attribute as fallible: a missing name degrades to a
//! placeholder, a malformed entity is simply skipped by the collector.
//!
//! Production wires an adapter over the actual introspection layer here;
//! tests substitute a scripted provider.

use crate::types::Vec3;

/// One entity as reported by the provider, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub position: Vec3,
    pub team: i32,
    pub health: i32,
    pub max_health: i32,
    /// Currently visible/observable from the self viewpoint.
    pub visible: bool,
    /// This record is the controlled entity itself.
    pub is_self: bool,
    /// Shares the self entity's team, as determined by the provider.
    pub friendly: bool,
    /// Display name; `None` when the lookup failed.
    pub name: Option<String>,
}

impl EntityRecord {
    /// A hostile stub at `position` – the common case in tests and the
    /// simulated world; flags default to a live, visible, nameless enemy.
    pub fn hostile(position: Vec3, team: i32, health: i32, max_health: i32) -> Self {
        Self {
            position,
            team,
            health,
            max_health,
            visible: true,
            is_self: false,
            friendly: false,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Capability interface over the live world.
///
/// `entities` returns every currently tracked entity in the provider's own
/// order. An empty list is a valid answer (nothing tracked, or the source
/// was briefly unreadable) – the loop just publishes an empty snapshot.
pub trait WorldProvider: Send {
    fn entities(&mut self) -> Vec<EntityRecord>;
}
