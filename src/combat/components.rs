//! Combat domain: marker and hitbox components shared by combat systems.

use bevy::prelude::*;

/// Marks the boss entity
#[derive(Component, Debug)]
pub struct Boss;

/// Marks an entity as a combat participant
#[derive(Component, Debug)]
pub struct Combatant;

/// Hitbox - deals damage on contact with combatants of the other team
#[derive(Component, Debug)]
pub struct Hitbox {
    pub damage: f32,
    pub knockback: f32,
    pub owner: Entity,
    pub hit_entities: Vec<Entity>,
}

impl Hitbox {
    pub fn new(owner: Entity, damage: f32, knockback: f32) -> Self {
        Self {
            damage,
            knockback,
            owner,
            hit_entities: Vec::new(),
        }
    }
}

/// Team affiliation to prevent friendly fire
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Player,
    Boss,
}

/// Entity lifetime for temporary hitboxes
#[derive(Component)]
pub struct HitboxLifetime(pub f32);

/// Invulnerability frames - entity cannot take damage
#[derive(Component, Debug, Default)]
pub struct Invulnerable {
    pub timer: f32,
}

impl Invulnerable {
    pub fn is_invulnerable(&self) -> bool {
        self.timer > 0.0
    }
}

/// Straight or ballistic motion integrated by the combat systems
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub velocity: Vec2,
    pub gravity: f32,
}

/// Fused explosive. `exploded` guarantees a single detonation.
#[derive(Component, Debug, Clone)]
pub struct Grenade {
    pub owner: Entity,
    pub fuse: f32,
    pub exploded: bool,
}

impl Grenade {
    pub fn new(owner: Entity, fuse: f32) -> Self {
        Self {
            owner,
            fuse,
            exploded: false,
        }
    }

    /// Burn the fuse; true exactly once, on the tick it runs out.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.exploded {
            return false;
        }
        self.fuse -= dt;
        if self.fuse <= 0.0 {
            self.exploded = true;
            true
        } else {
            false
        }
    }
}

/// Sprite stretched along a boss's active beam
#[derive(Component, Debug)]
pub struct LaserBeamVisual {
    pub owner: Entity,
}

/// Cooldown on the player's thrown strike
#[derive(Component, Debug, Default)]
pub struct PlayerStrike {
    pub cooldown_timer: f32,
}

/// Direction a strike flies: straight at a boss inside `lock_on_range`,
/// otherwise along the player's facing.
pub fn strike_heading(
    player: Vec2,
    facing_sign: f32,
    boss: Option<Vec2>,
    lock_on_range: f32,
) -> Vec2 {
    boss.map(|boss| boss - player)
        .filter(|offset| offset.length() <= lock_on_range)
        .and_then(|offset| offset.try_normalize())
        .unwrap_or(Vec2::new(facing_sign, 0.0))
}
