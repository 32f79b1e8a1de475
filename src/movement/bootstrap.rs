//! Movement domain: spawning the player at the active checkpoint.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::combat::{Combatant, Health, Invulnerable, PlayerStrike, Team};
use crate::core::Checkpoints;
use crate::movement::{GameLayer, MovementState, Player};

const PLAYER_MAX_HEALTH: f32 = 100.0;
const PLAYER_SIZE: Vec2 = Vec2::new(24.0, 48.0);

/// Dynamic body with gravity disabled; the movement systems integrate it.
pub fn player_bundle(position: Vec2) -> impl Bundle {
    (
        (
            Player,
            Combatant,
            Team::Player,
            MovementState::default(),
            Health::new(PLAYER_MAX_HEALTH),
            Invulnerable::default(),
            PlayerStrike::default(),
        ),
        Sprite {
            color: Color::srgb(0.9, 0.9, 0.85),
            custom_size: Some(PLAYER_SIZE),
            ..default()
        },
        Transform::from_xyz(position.x, position.y, 0.0),
        (
            RigidBody::Dynamic,
            Collider::rectangle(PLAYER_SIZE.x, PLAYER_SIZE.y),
            LockedAxes::ROTATION_LOCKED,
            LinearVelocity::default(),
            GravityScale(0.0),
            Friction::new(0.0),
            CollisionEventsEnabled,
            CollisionLayers::new(
                GameLayer::Player,
                [GameLayer::Ground, GameLayer::BossHitbox, GameLayer::Sensor],
            ),
        ),
    )
}

pub(crate) fn spawn_player(
    mut commands: Commands,
    checkpoints: Res<Checkpoints>,
    existing: Query<(), With<Player>>,
) {
    if !existing.is_empty() {
        return;
    }

    let position = checkpoints.position();
    commands.spawn(player_bundle(position));
    info!("Spawned player at checkpoint {:?}", position);
}
