//! Movement domain: keyboard sampling for the player controller.

use bevy::prelude::*;

use crate::movement::MovementInput;

const LEFT_KEYS: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT_KEYS: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];
const JUMP_KEYS: [KeyCode; 3] = [KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp];

pub(crate) fn read_input(keyboard: Res<ButtonInput<KeyCode>>, mut input: ResMut<MovementInput>) {
    let left = keyboard.any_pressed(LEFT_KEYS);
    let right = keyboard.any_pressed(RIGHT_KEYS);

    input.horizontal = match (left, right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    input.jump_just_pressed = keyboard.any_just_pressed(JUMP_KEYS);
    input.jump_held = keyboard.any_pressed(JUMP_KEYS);
}
