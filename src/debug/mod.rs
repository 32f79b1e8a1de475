//! Debug domain: Ctrl-hotkeys for driving the encounter during development.
//!
//! - Ctrl+I: toggle player invincibility
//! - Ctrl+K: force a recorded hit on the boss
//! - Ctrl+T: open the torch window
//! - Ctrl+F: fill the boss energy pool
//! - Ctrl+E: empty the boss energy pool
//! - Ctrl+A: toggle ambient heating
//! - Ctrl+R: restore the original camera
//! - Ctrl+X: hard-reset the camera system

mod systems;

use bevy::prelude::*;

use crate::debug::systems::{apply_invincibility, handle_debug_hotkeys};

/// Toggles flipped by the hotkeys
#[derive(Resource, Debug, Default)]
pub struct DebugState {
    pub invincible: bool,
}

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>()
            .add_systems(Update, (handle_debug_hotkeys, apply_invincibility).chain());
    }
}
