//! Core domain: events for the player lifecycle.

use bevy::ecs::message::Message;
use bevy::prelude::*;

/// Event fired when the player's health reaches zero
#[derive(Debug)]
pub struct PlayerDefeatedEvent {
    pub player: Entity,
}

impl Message for PlayerDefeatedEvent {}
