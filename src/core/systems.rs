//! Core domain: arena setup and player respawn.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::combat::{Health, Invulnerable};
use crate::core::events::PlayerDefeatedEvent;
use crate::core::resources::{Checkpoints, RespawnTarget};
use crate::movement::{GameLayer, Ground, MovementState, Player};

const ARENA_WIDTH: f32 = 1400.0;
const FLOOR_Y: f32 = -200.0;

pub(crate) fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

pub(crate) fn spawn_arena(mut commands: Commands) {
    let floor = Vec2::new(ARENA_WIDTH, 40.0);
    let wall = Vec2::new(40.0, 600.0);

    let pieces = [
        (Vec2::new(0.0, FLOOR_Y), floor),
        (Vec2::new(-ARENA_WIDTH * 0.5, FLOOR_Y + 280.0), wall),
        (Vec2::new(ARENA_WIDTH * 0.5, FLOOR_Y + 280.0), wall),
        (Vec2::new(-250.0, FLOOR_Y + 150.0), Vec2::new(220.0, 20.0)),
        (Vec2::new(250.0, FLOOR_Y + 150.0), Vec2::new(220.0, 20.0)),
    ];

    for (position, size) in pieces {
        commands.spawn((
            Ground,
            Sprite {
                color: Color::srgb(0.25, 0.22, 0.2),
                custom_size: Some(size),
                ..default()
            },
            Transform::from_xyz(position.x, position.y, 0.0),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            CollisionLayers::new(
                GameLayer::Ground,
                [GameLayer::Player, GameLayer::Boss, GameLayer::BossHitbox],
            ),
        ));
    }
}

/// Reload the last checkpoint when the player is defeated
pub(crate) fn handle_player_defeated(
    mut events: MessageReader<PlayerDefeatedEvent>,
    checkpoints: Res<Checkpoints>,
    mut player_query: Query<
        (
            &mut Transform,
            &mut LinearVelocity,
            &mut Health,
            &mut Invulnerable,
            &mut MovementState,
        ),
        With<Player>,
    >,
) {
    for event in events.read() {
        let Ok((mut transform, mut velocity, mut health, mut invuln, mut movement)) =
            player_query.get_mut(event.player)
        else {
            warn!("Defeated player {:?} no longer exists", event.player);
            continue;
        };

        checkpoints.reload(RespawnTarget {
            translation: &mut transform.translation,
            velocity: &mut velocity.0,
            health: &mut health,
        });
        invuln.timer = 1.0;
        movement.reset();

        info!("Player defeated, reloaded last checkpoint");
    }
}
