//! Core domain: checkpoint reload strategy.

use bevy::prelude::*;

use crate::combat::Health;

/// Mutable view of the player handed to a checkpoint reloader.
pub struct RespawnTarget<'a> {
    pub translation: &'a mut Vec3,
    pub velocity: &'a mut Vec2,
    pub health: &'a mut Health,
}

/// Strategy invoked when the player is defeated.
pub trait CheckpointReloader: Send + Sync + 'static {
    /// Where the player appears on a fresh spawn or reload.
    fn spawn_point(&self) -> Vec2;
    fn reload_last_checkpoint(&self, target: RespawnTarget<'_>);
}

/// Teleports the player back to a fixed checkpoint at full health.
#[derive(Debug, Clone)]
pub struct RespawnAtCheckpoint {
    pub position: Vec2,
}

impl CheckpointReloader for RespawnAtCheckpoint {
    fn spawn_point(&self) -> Vec2 {
        self.position
    }

    fn reload_last_checkpoint(&self, target: RespawnTarget<'_>) {
        target.translation.x = self.position.x;
        target.translation.y = self.position.y;
        *target.velocity = Vec2::ZERO;
        target.health.restore();
    }
}

/// The injected checkpoint strategy.
#[derive(Resource)]
pub struct Checkpoints(pub Box<dyn CheckpointReloader>);

impl Checkpoints {
    pub fn new(reloader: impl CheckpointReloader) -> Self {
        Self(Box::new(reloader))
    }

    pub fn position(&self) -> Vec2 {
        self.0.spawn_point()
    }

    pub fn reload(&self, target: RespawnTarget<'_>) {
        self.0.reload_last_checkpoint(target);
    }
}

impl Default for Checkpoints {
    fn default() -> Self {
        Self::new(RespawnAtCheckpoint {
            position: Vec2::new(-420.0, -120.0),
        })
    }
}
