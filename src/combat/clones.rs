//! Combat domain: bounded pool of short-lived decoy clones.

use bevy::prelude::*;

use crate::combat::attacks::{EntityFactory, SpawnKind, SpawnRequest};
use crate::combat::energy::EnergyPool;
use crate::combat::resources::CloneTuning;

/// Attached to each clone entity. `owner` is a plain id, not ownership.
#[derive(Component, Debug, Clone)]
pub struct BossClone {
    pub owner: Entity,
    pub spawned_at: f32,
    pub lifetime: f32,
    pub remaining: f32,
}

impl BossClone {
    pub fn new(owner: Entity, spawned_at: f32, lifetime: f32) -> Self {
        Self {
            owner,
            spawned_at,
            lifetime,
            remaining: lifetime,
        }
    }

    /// True once the lifetime has elapsed.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// Tracks the live clones of one boss.
#[derive(Component, Debug, Clone)]
pub struct CloneRoster {
    pub max_clones: usize,
    pub clone_duration: f32,
    pub spawn_offset: f32,
    active: Vec<Entity>,
    spawned_total: u32,
}

impl CloneRoster {
    pub fn new(tuning: &CloneTuning) -> Self {
        Self {
            max_clones: tuning.max_clones,
            clone_duration: tuning.clone_duration,
            spawn_offset: tuning.spawn_offset,
            active: Vec::new(),
            spawned_total: 0,
        }
    }

    pub fn active_clones(&self) -> usize {
        self.active.len()
    }

    pub fn is_full(&self) -> bool {
        self.active.len() >= self.max_clones
    }

    /// Spawn a clone beside the owner and drain the pool.
    /// No-op at capacity or when the factory cannot build a clone.
    pub fn create_clone(
        &mut self,
        owner: Entity,
        owner_pos: Vec2,
        owner_rotation: f32,
        energy: &mut EnergyPool,
        factory: &mut impl EntityFactory,
    ) -> Option<Entity> {
        if self.is_full() {
            return None;
        }

        // Alternate sides so consecutive clones do not stack
        let side = if self.spawned_total % 2 == 0 { 1.0 } else { -1.0 };
        let position = owner_pos + Vec2::new(self.spawn_offset * side, 0.0);
        let request = SpawnRequest::new(SpawnKind::Clone, owner, position)
            .with_rotation(owner_rotation)
            .with_lifetime(self.clone_duration);

        let clone = factory.spawn(request)?;
        self.active.push(clone);
        self.spawned_total += 1;
        energy.set(0.0);
        Some(clone)
    }

    /// Forget a destroyed clone. Returns false if it was not tracked.
    pub fn release(&mut self, clone: Entity) -> bool {
        let before = self.active.len();
        self.active.retain(|&e| e != clone);
        self.active.len() != before
    }

    /// Destroy every tracked clone. Safe with zero clones.
    pub fn clear_all_clones(&mut self, factory: &mut impl EntityFactory) -> Vec<Entity> {
        let cleared = std::mem::take(&mut self.active);
        for &clone in &cleared {
            factory.despawn(clone);
        }
        cleared
    }
}
