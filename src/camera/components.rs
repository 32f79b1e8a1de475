//! Camera domain: components.

use bevy::prelude::*;

/// Point the boss-fight framing stays tethered to
#[derive(Component, Debug)]
pub struct ArenaAnchor;
