//! Movement domain: controller tuning and sampled input.

use bevy::prelude::*;

/// Platformer feel for the player. The arena is tuned around these values:
/// a full jump clears the side platforms from the floor.
#[derive(Resource, Debug, Clone)]
pub struct MovementTuning {
    pub max_speed: f32,
    pub accel: f32,
    pub decel: f32,
    /// Fraction of `accel` available while airborne
    pub air_control: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            max_speed: 300.0,
            accel: 2800.0,
            decel: 2600.0,
            air_control: 0.65,
            jump_velocity: 700.0,
            gravity: 1800.0,
            max_fall_speed: 900.0,
            coyote_time: 0.1,
            jump_buffer_time: 0.12,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct MovementInput {
    /// -1 left, +1 right, 0 when neither or both are held
    pub horizontal: f32,
    pub jump_just_pressed: bool,
    pub jump_held: bool,
}
