//! Movement domain: player locomotion plugin and public exports.

mod bootstrap;
mod components;
mod resources;
mod systems;


pub use components::{Facing, GameLayer, Ground, MovementState, Player};
pub use resources::{MovementInput, MovementTuning};

use bevy::prelude::*;

use crate::movement::bootstrap::spawn_player;
use crate::movement::systems::{
    apply_gravity, apply_horizontal_movement, apply_jump, detect_ground, read_input,
    update_facing, update_timers,
};

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MovementTuning>()
            .init_resource::<MovementInput>()
            .add_systems(Startup, spawn_player)
            .add_systems(
                Update,
                (
                    read_input,
                    detect_ground,
                    update_timers,
                    update_facing,
                    apply_horizontal_movement,
                    apply_jump,
                    apply_gravity,
                )
                    .chain(),
            );
    }
}
