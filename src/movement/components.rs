//! Movement domain: components and physics layers for locomotion.

use avian2d::prelude::*;
use bevy::prelude::*;

/// Physics layers for collision filtering
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Default,
    /// Ground surfaces (floors, platforms); beams stop here
    Ground,
    /// Player character
    Player,
    /// Boss and its clones
    Boss,
    /// Torches and other triggers - should not block movement
    Sensor,
    /// Player hitboxes (damage the boss)
    PlayerHitbox,
    /// Boss projectiles and explosions (damage the player)
    BossHitbox,
}

#[derive(Component, Debug)]
pub struct Player;

/// Grounded/airborne bookkeeping for the player controller.
#[derive(Component, Debug, Default)]
pub struct MovementState {
    pub on_ground: bool,
    pub facing: Facing,
    pub coyote_timer: f32,
    pub jump_buffer_timer: f32,
    /// Steering is ignored while positive so knockback carries the player
    pub hitstun_timer: f32,
}

impl MovementState {
    pub fn stagger(&mut self, duration: f32) {
        self.hitstun_timer = self.hitstun_timer.max(duration);
        self.jump_buffer_timer = 0.0;
    }

    pub fn is_staggered(&self) -> bool {
        self.hitstun_timer > 0.0
    }

    /// Clear airborne timers after a checkpoint reload.
    pub fn reset(&mut self) {
        *self = Self {
            facing: self.facing,
            ..default()
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// Marker for ground colliders
#[derive(Component, Debug)]
pub struct Ground;
