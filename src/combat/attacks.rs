//! Combat domain: cooldown-gated attack primitives and the entity factory seam.

use bevy::prelude::*;

use crate::combat::energy::EnergyPool;
use crate::combat::laser::{BeamStart, LaserEmitter};
use crate::combat::phases::Phase;
use crate::combat::resources::AbilityTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityKind {
    Bullet,
    Grenade,
    HomingLaser,
    ScytheSweep,
}

/// Kinds of entity the factory knows how to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnKind {
    Bullet,
    Grenade,
    Explosion,
    Clone,
}

/// Everything the factory needs to place a new entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub kind: SpawnKind,
    pub owner: Entity,
    pub position: Vec2,
    /// Rotation around Z, radians
    pub rotation: f32,
    pub velocity: Vec2,
    pub gravity: f32,
    pub lifetime: f32,
}

impl SpawnRequest {
    pub fn new(kind: SpawnKind, owner: Entity, position: Vec2) -> Self {
        Self {
            kind,
            owner,
            position,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            gravity: 0.0,
            lifetime: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self.rotation = velocity.y.atan2(velocity.x);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }
}

/// Spawns projectiles, clones and effects. Returns `None` when the kind
/// has no configured prefab.
pub trait EntityFactory {
    fn spawn(&mut self, request: SpawnRequest) -> Option<Entity>;
    fn despawn(&mut self, entity: Entity);
}

/// Minimum re-trigger interval for one ability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityCooldown {
    pub cooldown: f32,
    last_used_at: Option<f32>,
}

impl AbilityCooldown {
    pub fn new(cooldown: f32) -> Self {
        Self {
            cooldown,
            last_used_at: None,
        }
    }

    pub fn last_used_at(&self) -> Option<f32> {
        self.last_used_at
    }

    pub fn is_ready(&self, now: f32) -> bool {
        match self.last_used_at {
            Some(last) => now - last >= self.cooldown,
            None => true,
        }
    }

    /// Record a successful use.
    pub fn mark_used(&mut self, now: f32) {
        self.last_used_at = Some(now);
    }
}

/// Per-boss attack primitives, each gated by its own cooldown.
#[derive(Component, Debug, Clone)]
pub struct AttackActionSet {
    pub bullet: AbilityCooldown,
    pub grenade: AbilityCooldown,
    pub homing_laser: AbilityCooldown,
    pub scythe_sweep: AbilityCooldown,
    tuning: AbilityTuning,
}

impl AttackActionSet {
    pub fn new(tuning: AbilityTuning) -> Self {
        Self {
            bullet: AbilityCooldown::new(tuning.bullet_cooldown),
            grenade: AbilityCooldown::new(tuning.grenade_cooldown),
            homing_laser: AbilityCooldown::new(tuning.homing_laser_cooldown),
            scythe_sweep: AbilityCooldown::new(tuning.scythe_sweep_cooldown),
            tuning,
        }
    }

    /// Fire one bullet along each heading as a single gated use.
    /// Returns how many bullets were spawned.
    pub fn spawn_bullets(
        &mut self,
        now: f32,
        owner: Entity,
        origin: Vec2,
        headings: &[Vec2],
        factory: &mut impl EntityFactory,
    ) -> usize {
        if !self.bullet.is_ready(now) || headings.is_empty() {
            return 0;
        }

        let mut spawned = 0;
        for heading in headings {
            let velocity = heading.normalize_or_zero() * self.tuning.bullet_speed;
            let request = SpawnRequest::new(SpawnKind::Bullet, owner, origin)
                .with_velocity(velocity)
                .with_lifetime(self.tuning.bullet_lifetime);
            if factory.spawn(request).is_some() {
                spawned += 1;
            }
        }

        if spawned > 0 {
            self.bullet.mark_used(now);
        }
        spawned
    }

    /// Lob a grenade at the player position captured at call time.
    pub fn spawn_grenade(
        &mut self,
        now: f32,
        owner: Entity,
        origin: Vec2,
        target: Vec2,
        factory: &mut impl EntityFactory,
    ) -> Option<Entity> {
        if !self.grenade.is_ready(now) {
            return None;
        }

        let flight = self.tuning.grenade_flight_time.max(0.05);
        let gravity = self.tuning.grenade_gravity;
        // Ballistic launch that lands on the target after `flight` seconds
        let velocity = Vec2::new(
            (target.x - origin.x) / flight,
            (target.y - origin.y) / flight + 0.5 * gravity * flight,
        );

        let request = SpawnRequest::new(SpawnKind::Grenade, owner, origin)
            .with_velocity(velocity)
            .with_gravity(gravity)
            .with_lifetime(self.tuning.grenade_fuse);
        let entity = factory.spawn(request)?;
        self.grenade.mark_used(now);
        Some(entity)
    }

    /// Start the homing beam if off cooldown and the emitter accepts it.
    pub fn execute_homing_laser(
        &mut self,
        now: f32,
        laser: &mut LaserEmitter,
        energy: &EnergyPool,
        phase: Phase,
        origin: Vec2,
        target: Vec2,
    ) -> bool {
        if !self.homing_laser.is_ready(now) {
            return false;
        }

        let started = laser.start_homing(BeamStart {
            origin,
            aim: target - origin,
            phase,
            available_energy: energy.current(),
        });
        if started {
            self.homing_laser.mark_used(now);
        }
        started
    }

    /// Start the scythe sweep if off cooldown and the emitter accepts it.
    pub fn execute_scythe_sweep(
        &mut self,
        now: f32,
        laser: &mut LaserEmitter,
        energy: &EnergyPool,
        phase: Phase,
        origin: Vec2,
        target: Vec2,
    ) -> bool {
        if !self.scythe_sweep.is_ready(now) {
            return false;
        }

        let started = laser.start_sweep(BeamStart {
            origin,
            aim: target - origin,
            phase,
            available_energy: energy.current(),
        });
        if started {
            self.scythe_sweep.mark_used(now);
        }
        started
    }

    /// Headings for a fan of bullets centred on `aim`.
    pub fn volley_headings(&self, aim: Vec2) -> Vec<Vec2> {
        let count = self.tuning.volley_count.max(1);
        let base = aim.y.atan2(aim.x);
        let spread = self.tuning.volley_spread_degrees.to_radians();

        if count == 1 {
            return vec![Vec2::new(base.cos(), base.sin())];
        }

        let step = spread / (count - 1) as f32;
        (0..count)
            .map(|i| {
                let angle = base - spread * 0.5 + step * i as f32;
                Vec2::new(angle.cos(), angle.sin())
            })
            .collect()
    }
}

/// Unit heading for a spin-shot angle in degrees.
pub fn heading_from_degrees(angle_degrees: f32) -> Vec2 {
    let radians = angle_degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}
