//! Combat domain: messages raised by the boss encounter.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::combat::attacks::AbilityKind;
use crate::combat::laser::LaserKind;
use crate::combat::phases::Phase;

/// Discrete hits grant invulnerability frames; sustained contact does not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    Hit,
    Sustained,
}

/// Hitbox contact resolved against a combatant
#[derive(Debug)]
pub struct DamageEvent {
    pub source: Entity,
    pub target: Entity,
    pub amount: f32,
    pub knockback: Vec2,
    pub kind: DamageKind,
}

impl Message for DamageEvent {}

#[derive(Debug)]
pub struct DamageTakenEvent {
    pub boss: Entity,
    pub amount: f32,
}

impl Message for DamageTakenEvent {}

/// Fired exactly once per boss
#[derive(Debug)]
pub struct BossDeathEvent {
    pub boss: Entity,
}

impl Message for BossDeathEvent {}

#[derive(Debug)]
pub struct PlayerDetectedEvent {
    pub boss: Entity,
}

impl Message for PlayerDetectedEvent {}

#[derive(Debug)]
pub struct PlayerLostEvent {
    pub boss: Entity,
}

impl Message for PlayerLostEvent {}

#[derive(Debug)]
pub struct AggroStartedEvent {
    pub boss: Entity,
}

impl Message for AggroStartedEvent {}

#[derive(Debug)]
pub struct AggroEndedEvent {
    pub boss: Entity,
}

impl Message for AggroEndedEvent {}

#[derive(Debug)]
pub struct PhaseChangedEvent {
    pub boss: Entity,
    pub phase: Phase,
}

impl Message for PhaseChangedEvent {}

#[derive(Debug)]
pub struct Phase1StartedEvent {
    pub boss: Entity,
}

impl Message for Phase1StartedEvent {}

#[derive(Debug)]
pub struct Phase2StartedEvent {
    pub boss: Entity,
}

impl Message for Phase2StartedEvent {}

#[derive(Debug)]
pub struct PhaseTransitionStartedEvent {
    pub boss: Entity,
}

impl Message for PhaseTransitionStartedEvent {}

#[derive(Debug)]
pub struct PhaseTransitionCompletedEvent {
    pub boss: Entity,
}

impl Message for PhaseTransitionCompletedEvent {}

#[derive(Debug)]
pub struct TorchWindowOpenedEvent {
    pub boss: Entity,
    pub phase: Phase,
}

impl Message for TorchWindowOpenedEvent {}

#[derive(Debug)]
pub struct TorchWindowClosedEvent {
    pub boss: Entity,
}

impl Message for TorchWindowClosedEvent {}

#[derive(Debug)]
pub struct TorchIgnitedEvent {
    pub boss: Entity,
    pub torch: Entity,
}

impl Message for TorchIgnitedEvent {}

#[derive(Debug)]
pub struct EnergyGainedEvent {
    pub boss: Entity,
    pub amount: f32,
}

impl Message for EnergyGainedEvent {}

#[derive(Debug)]
pub struct EnergyFullEvent {
    pub boss: Entity,
}

impl Message for EnergyFullEvent {}

#[derive(Debug)]
pub struct CloneCreatedEvent {
    pub boss: Entity,
    pub clone: Entity,
}

impl Message for CloneCreatedEvent {}

#[derive(Debug)]
pub struct CloneDestroyedEvent {
    pub boss: Entity,
    pub clone: Entity,
}

impl Message for CloneDestroyedEvent {}

#[derive(Debug)]
pub struct LaserStartedEvent {
    pub boss: Entity,
    pub kind: LaserKind,
}

impl Message for LaserStartedEvent {}

#[derive(Debug)]
pub struct LaserEndedEvent {
    pub boss: Entity,
    pub kind: LaserKind,
}

impl Message for LaserEndedEvent {}

#[derive(Debug)]
pub struct LaserHitGroundEvent {
    pub boss: Entity,
    pub point: Vec2,
}

impl Message for LaserHitGroundEvent {}

#[derive(Debug)]
pub struct LaserHitPlayerEvent {
    pub boss: Entity,
    pub target: Entity,
    /// Beam damage accumulated over this tick
    pub damage: f32,
}

impl Message for LaserHitPlayerEvent {}

/// Feedback hook for audio/VFX when an ability actually fires
#[derive(Debug)]
pub struct AbilityUsedEvent {
    pub boss: Entity,
    pub ability: AbilityKind,
}

impl Message for AbilityUsedEvent {}
