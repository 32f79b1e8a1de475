//! Camera domain: systems driving the main camera.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::camera::components::ArenaAnchor;
use crate::camera::director::{CameraDirector, CameraMode, CameraPose, FollowTargets};
use crate::camera::events::CameraCommand;
use crate::camera::resources::CameraTuning;
use crate::combat::{AggroEndedEvent, AggroStartedEvent, Boss, BossDeathEvent};
use crate::content::BossSpawn;
use crate::movement::Player;

const NORMAL_FOLLOW_SHARPNESS: f32 = 8.0;

pub(crate) fn spawn_arena_anchor(mut commands: Commands, spawn: Res<BossSpawn>) {
    commands.spawn((
        ArenaAnchor,
        Transform::from_xyz(spawn.position.x, spawn.position.y - 60.0, 0.0),
    ));
}

fn read_pose(transform: &Transform, projection: &Projection) -> CameraPose {
    let scale = match projection {
        Projection::Orthographic(ortho) => ortho.scale,
        _ => 1.0,
    };
    CameraPose {
        position: transform.translation.truncate(),
        scale,
    }
}

fn write_pose(pose: CameraPose, transform: &mut Transform, projection: &mut Projection) {
    transform.translation.x = pose.position.x;
    transform.translation.y = pose.position.y;
    if let Projection::Orthographic(ortho) = projection {
        ortho.scale = pose.scale;
    }
}

/// Switch framing on aggro and death edges.
pub(crate) fn react_to_encounter(
    mut aggro_started: MessageReader<AggroStartedEvent>,
    mut aggro_ended: MessageReader<AggroEndedEvent>,
    mut deaths: MessageReader<BossDeathEvent>,
    mut director: ResMut<CameraDirector>,
    camera_query: Query<(&Transform, &Projection), With<Camera2d>>,
) {
    let started = aggro_started.read().count() > 0;
    let ended = aggro_ended.read().count() > 0 || deaths.read().count() > 0;

    if started {
        let Some((transform, projection)) = camera_query.iter().next() else {
            warn!("No camera to frame the boss fight");
            return;
        };
        if director.activate(read_pose(transform, projection)) {
            info!("Boss camera activating");
        }
    }

    if ended && director.deactivate() {
        info!("Boss camera deactivating");
    }
}

pub(crate) fn drive_camera(
    time: Res<Time>,
    tuning: Res<CameraTuning>,
    mut director: ResMut<CameraDirector>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
    player_query: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    boss_query: Query<&Transform, (With<Boss>, Without<Camera2d>)>,
    anchor_query: Query<&Transform, (With<ArenaAnchor>, Without<Camera2d>)>,
) {
    let Some((mut transform, mut projection)) = camera_query.iter_mut().next() else {
        return;
    };
    let dt = time.delta_secs();
    let player = player_query.iter().next().map(|t| t.translation.truncate());

    if director.mode() == CameraMode::Normal {
        // Plain player follow outside the fight
        if let Some(target) = player {
            let blend = 1.0 - (-NORMAL_FOLLOW_SHARPNESS * dt).exp();
            let position = transform.translation.truncate().lerp(target, blend);
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
        return;
    }

    let targets = FollowTargets {
        player,
        boss: boss_query.iter().next().map(|t| t.translation.truncate()),
        anchor: anchor_query.iter().next().map(|t| t.translation.truncate()),
    };

    if let Some(pose) = director.tick(dt, &tuning, targets) {
        write_pose(pose, &mut transform, &mut projection);
        if director.mode() == CameraMode::Normal {
            info!("Boss camera restored");
        }
    }
}

/// Apply a hard restore requested outside the normal event flow.
pub(crate) fn apply_camera_command(
    mut camera_commands: MessageReader<CameraCommand>,
    mut director: ResMut<CameraDirector>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
) {
    for command in camera_commands.read() {
        let Some((mut transform, mut projection)) = camera_query.iter_mut().next() else {
            warn!("No camera to {:?}", command);
            continue;
        };

        match command {
            CameraCommand::RestoreOriginal => {
                if let Some(pose) = director.restore_original() {
                    write_pose(pose, &mut transform, &mut projection);
                }
                info!("Camera restored to original framing");
            }
            CameraCommand::Reset => {
                director.reset();
                if let Projection::Orthographic(ortho) = projection.as_mut() {
                    ortho.scale = 1.0;
                }
                info!("Camera system reset");
            }
        }
    }
}
