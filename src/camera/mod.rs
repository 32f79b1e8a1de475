//! Camera domain: boss-fight framing.

mod components;
mod director;
mod events;
mod resources;
mod systems;


pub use events::CameraCommand;
pub use resources::CameraTuning;

use bevy::prelude::*;

use crate::camera::director::CameraDirector;
use crate::camera::systems::{
    apply_camera_command, drive_camera, react_to_encounter, spawn_arena_anchor,
};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraTuning>()
            .init_resource::<CameraDirector>()
            .add_message::<CameraCommand>()
            .add_systems(Startup, spawn_arena_anchor)
            .add_systems(
                Update,
                (apply_camera_command, react_to_encounter, drive_camera).chain(),
            );
    }
}
