//! Entity identifiers
//!
//! Entities never hold references to each other; they hold ids into the
//! owning registry. Ids grow monotonically within a round and restart at 1
//! when a round is reset.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projectile#{}", self.0)
    }
}

/// Handle used when notifying the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Player,
    Enemy(EnemyId),
    Projectile(ProjectileId),
}

/// Per-kind monotonically increasing id counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_enemy: u32,
    next_projectile: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next_enemy: 1,
            next_projectile: 1,
        }
    }
}

impl IdAllocator {
    pub fn next_enemy(&mut self) -> EnemyId {
        let id = EnemyId(self.next_enemy);
        self.next_enemy += 1;
        id
    }

    pub fn next_projectile(&mut self) -> ProjectileId {
        let id = ProjectileId(self.next_projectile);
        self.next_projectile += 1;
        id
    }

    /// Restart both counters (new round)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent_and_reset() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next_enemy(), EnemyId(1));
        assert_eq!(ids.next_enemy(), EnemyId(2));
        assert_eq!(ids.next_projectile(), ProjectileId(1));
        ids.reset();
        assert_eq!(ids.next_enemy(), EnemyId(1));
        assert_eq!(ids.next_projectile(), ProjectileId(1));
    }
}
