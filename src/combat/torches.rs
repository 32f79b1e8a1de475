//! Combat domain: torches, the ignition sources the boss listens to.
//!
//! A torch only reacts to the player while its phase's window is open.
//! Opening the window hands the torch to the boss that opened it; closing
//! it takes the torch back and puts out the flame.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::combat::events::{TorchIgnitedEvent, TorchWindowClosedEvent, TorchWindowOpenedEvent};
use crate::combat::phases::Phase;
use crate::movement::{GameLayer, Player};

const UNLIT_COLOR: Color = Color::srgb(0.3, 0.25, 0.2);
const READY_COLOR: Color = Color::srgb(0.7, 0.55, 0.3);
const LIT_COLOR: Color = Color::srgb(1.0, 0.6, 0.1);

#[derive(Component, Debug, Clone)]
pub struct Torch {
    /// Phase whose window activates this torch
    pub phase: Phase,
    pub active: bool,
    pub lit: bool,
    /// Boss currently listening, set while active
    pub owner: Option<Entity>,
}

impl Torch {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            active: false,
            lit: false,
            owner: None,
        }
    }

    pub fn set_active(&mut self, owner: Option<Entity>) {
        self.active = owner.is_some();
        self.owner = owner;
        self.lit = false;
    }

    /// Light the torch. Returns the listening boss on the first lighting only.
    pub fn ignite(&mut self) -> Option<Entity> {
        if !self.active || self.lit {
            return None;
        }
        self.lit = true;
        self.owner
    }

    fn color(&self) -> Color {
        match (self.active, self.lit) {
            (_, true) => LIT_COLOR,
            (true, false) => READY_COLOR,
            (false, false) => UNLIT_COLOR,
        }
    }
}

pub fn torch_bundle(phase: Phase, position: Vec2) -> impl Bundle {
    let size = Vec2::new(16.0, 28.0);
    (
        Torch::new(phase),
        Sprite {
            color: UNLIT_COLOR,
            custom_size: Some(size),
            ..default()
        },
        Transform::from_xyz(position.x, position.y, -0.5),
        Collider::rectangle(size.x, size.y),
        Sensor,
        CollisionEventsEnabled,
        CollisionLayers::new(GameLayer::Sensor, [GameLayer::Player]),
    )
}

pub(crate) fn ignite_torches_on_contact(
    mut collision_events: MessageReader<CollisionStart>,
    mut ignited_events: MessageWriter<TorchIgnitedEvent>,
    mut torch_query: Query<(&mut Torch, &mut Sprite)>,
    player_query: Query<(), With<Player>>,
) {
    for event in collision_events.read() {
        let pairs = [
            (event.collider1, event.collider2),
            (event.collider2, event.collider1),
        ];

        for (torch_entity, other) in pairs {
            if !player_query.contains(other) {
                continue;
            }
            let Ok((mut torch, mut sprite)) = torch_query.get_mut(torch_entity) else {
                continue;
            };

            if let Some(boss) = torch.ignite() {
                sprite.color = torch.color();
                debug!("Torch {:?} lit for boss {:?}", torch_entity, boss);
                ignited_events.write(TorchIgnitedEvent {
                    boss,
                    torch: torch_entity,
                });
            }
        }
    }
}

/// Hand torches to the boss while its window is open.
pub(crate) fn sync_torch_sources(
    mut opened_events: MessageReader<TorchWindowOpenedEvent>,
    mut closed_events: MessageReader<TorchWindowClosedEvent>,
    mut torch_query: Query<(&mut Torch, &mut Sprite)>,
) {
    for event in opened_events.read() {
        for (mut torch, mut sprite) in &mut torch_query {
            if torch.phase == event.phase && torch.owner.is_none() {
                torch.set_active(Some(event.boss));
                sprite.color = torch.color();
            }
        }
    }

    for event in closed_events.read() {
        for (mut torch, mut sprite) in &mut torch_query {
            if torch.owner == Some(event.boss) {
                torch.set_active(None);
                sprite.color = torch.color();
            }
        }
    }
}
