//! Core domain: camera, arena, and checkpoint plumbing.

mod events;
mod resources;
mod systems;

pub use events::PlayerDefeatedEvent;
pub use resources::{Checkpoints, RespawnAtCheckpoint};

use bevy::prelude::*;

use crate::core::systems::{handle_player_defeated, setup_camera, spawn_arena};

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Checkpoints>()
            .add_message::<PlayerDefeatedEvent>()
            .add_systems(Startup, (setup_camera, spawn_arena))
            .add_systems(Update, handle_player_defeated);
    }
}
