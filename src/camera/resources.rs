//! Camera domain: framing tuning.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Orthographic scale multiplier applied during the boss fight
    pub boss_zoom_scale: f32,
    pub transition_duration: f32,
    /// Share of the framing given to the player, the rest goes to the boss
    pub player_weight: f32,
    pub max_anchor_distance: f32,
    pub follow_sharpness: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            boss_zoom_scale: 1.4,
            transition_duration: 1.2,
            player_weight: 0.6,
            max_anchor_distance: 300.0,
            follow_sharpness: 6.0,
        }
    }
}
