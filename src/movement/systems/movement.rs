//! Movement domain: locomotion systems for timers and physics.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::movement::{Facing, MovementInput, MovementState, MovementTuning, Player};

pub(crate) fn update_timers(time: Res<Time>, mut query: Query<&mut MovementState, With<Player>>) {
    let dt = time.delta_secs();

    for mut state in &mut query {
        if !state.on_ground {
            state.coyote_timer += dt;
        }
        if state.jump_buffer_timer > 0.0 {
            state.jump_buffer_timer -= dt;
        }
        if state.hitstun_timer > 0.0 {
            state.hitstun_timer = (state.hitstun_timer - dt).max(0.0);
        }
    }
}

/// Ramp toward `target` by at most `step`.
pub(crate) fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

pub(crate) fn apply_horizontal_movement(
    time: Res<Time>,
    input: Res<MovementInput>,
    tuning: Res<MovementTuning>,
    mut query: Query<(&MovementState, &mut LinearVelocity), With<Player>>,
) {
    let dt = time.delta_secs();

    for (state, mut velocity) in &mut query {
        // Knockback owns the velocity until the stagger wears off
        if state.is_staggered() {
            continue;
        }

        let control = if state.on_ground { 1.0 } else { tuning.air_control };
        let step = if input.horizontal != 0.0 {
            tuning.accel * control * dt
        } else {
            tuning.decel * control * dt
        };
        velocity.x = approach(velocity.x, input.horizontal * tuning.max_speed, step);
    }
}

pub(crate) fn apply_jump(
    input: Res<MovementInput>,
    tuning: Res<MovementTuning>,
    mut query: Query<(&mut MovementState, &mut LinearVelocity), With<Player>>,
) {
    for (mut state, mut velocity) in &mut query {
        if state.is_staggered() {
            continue;
        }

        if input.jump_just_pressed {
            state.jump_buffer_timer = tuning.jump_buffer_time;
        }

        let wants_jump = state.jump_buffer_timer > 0.0;
        let can_jump = state.on_ground || state.coyote_timer < tuning.coyote_time;

        if wants_jump && can_jump {
            velocity.y = tuning.jump_velocity;
            state.jump_buffer_timer = 0.0;
            state.coyote_timer = tuning.coyote_time;
        }

        // Short hop when jump is released early
        if !input.jump_held && velocity.y > 0.0 && !state.on_ground {
            velocity.y *= 0.5;
        }
    }
}

pub(crate) fn apply_gravity(
    time: Res<Time>,
    tuning: Res<MovementTuning>,
    mut query: Query<(&MovementState, &mut LinearVelocity), With<Player>>,
) {
    let dt = time.delta_secs();

    for (state, mut velocity) in &mut query {
        if state.on_ground && velocity.y <= 0.0 {
            continue;
        }
        velocity.y = (velocity.y - tuning.gravity * dt).max(-tuning.max_fall_speed);
    }
}

pub(crate) fn update_facing(
    input: Res<MovementInput>,
    mut query: Query<&mut MovementState, With<Player>>,
) {
    for mut state in &mut query {
        if state.is_staggered() {
            continue;
        }
        if input.horizontal > 0.0 {
            state.facing = Facing::Right;
        } else if input.horizontal < 0.0 {
            state.facing = Facing::Left;
        }
    }
}

