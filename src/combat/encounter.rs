//! Combat domain: encounter core (health, senses, hover movement, death).

use bevy::prelude::*;

use crate::combat::components::Invulnerable;
use crate::combat::events::DamageKind;
use crate::combat::resources::{HoverTuning, SensesTuning};

/// Health component for damageable entities
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Apply damage, clamped to zero. Returns the damage actually applied.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.current);
        self.current -= actual;
        actual
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// Result of a damage application against the encounter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub applied: f32,
    /// True only on the application that drained health to zero
    pub died: bool,
}

/// Edges produced by a detection scan. `None` means no flip happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenseEdges {
    pub detected: Option<bool>,
    pub aggro: Option<bool>,
}

impl SenseEdges {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.detected.is_none() && self.aggro.is_none()
    }
}

/// What a scan observed about the player this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSighting {
    pub distance: f32,
    pub line_of_sight: bool,
}

/// Aggregate root of the boss: health plus detection/aggro/death flags.
#[derive(Component, Debug, Clone)]
pub struct Encounter {
    pub health: Health,
    detected: bool,
    aggro: bool,
    dead: bool,
}

impl Encounter {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: Health::new(max_health),
            detected: false,
            aggro: false,
            dead: false,
        }
    }

    #[cfg(test)]
    pub fn is_detected(&self) -> bool {
        self.detected
    }

    pub fn is_aggro(&self) -> bool {
        self.aggro
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Reduce health. Returns `None` when the encounter is already dead.
    pub fn take_damage(&mut self, amount: f32) -> Option<DamageOutcome> {
        if self.dead {
            return None;
        }

        let applied = self.health.take_damage(amount);
        let died = self.health.is_dead();
        if died {
            self.dead = true;
            self.detected = false;
            self.aggro = false;
        }

        Some(DamageOutcome { applied, died })
    }

    /// Force death by draining whatever health remains.
    pub fn kill(&mut self) -> Option<DamageOutcome> {
        let remaining = self.health.current;
        self.take_damage(remaining)
    }

    /// Fold one scan result into the detection/aggro flags.
    /// A missing sighting fails closed.
    pub fn apply_scan(
        &mut self,
        sighting: Option<PlayerSighting>,
        senses: &SensesTuning,
    ) -> SenseEdges {
        if self.dead {
            return SenseEdges::default();
        }

        let (detected, aggro) = match sighting {
            Some(s) => {
                let in_range = s.distance <= senses.detection_radius;
                let visible = !senses.require_line_of_sight || s.line_of_sight;
                let detected = in_range && visible;
                (detected, detected && s.distance <= senses.aggro_radius)
            }
            None => (false, false),
        };

        let mut edges = SenseEdges::default();
        if detected != self.detected {
            self.detected = detected;
            edges.detected = Some(detected);
        }
        if aggro != self.aggro {
            self.aggro = aggro;
            edges.aggro = Some(aggro);
        }
        edges
    }
}

/// Countdown for the periodic detection scan.
#[derive(Component, Debug, Default)]
pub struct SenseTimer {
    pub elapsed: f32,
}

impl SenseTimer {
    /// Advance the timer; true when a scan is due this tick.
    pub fn tick(&mut self, dt: f32, interval: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

/// Apply damage to the player unless invulnerable or already dead.
/// Hits grant `iframes` of invulnerability; sustained damage never does.
pub fn damage_player(
    health: &mut Health,
    invuln: &mut Invulnerable,
    amount: f32,
    kind: DamageKind,
    iframes: f32,
) -> bool {
    if invuln.is_invulnerable() || health.is_dead() {
        return false;
    }

    health.take_damage(amount);
    if kind == DamageKind::Hit {
        invuln.timer = iframes;
    }
    true
}

/// Velocity that holds the boss inside the preferred distance band around
/// the player, using separate acceleration and deceleration rates.
pub fn hover_velocity(
    boss_pos: Vec2,
    player_pos: Vec2,
    current: Vec2,
    tuning: &HoverTuning,
    dt: f32,
) -> Vec2 {
    let to_player = player_pos - boss_pos;
    let distance = to_player.length();
    let dir = to_player.normalize_or_zero();

    let target = if distance > tuning.preferred_distance + tuning.stop_distance {
        dir * tuning.max_speed
    } else if distance < tuning.preferred_distance - tuning.stop_distance {
        -dir * tuning.max_speed
    } else {
        Vec2::ZERO
    };

    approach(current, target, tuning, dt)
}

/// Pull a position back inside the arena box, cancelling any velocity
/// that would carry it further out.
pub fn confine_to_arena(position: Vec2, velocity: Vec2, min: Vec2, max: Vec2) -> (Vec2, Vec2) {
    let clamped = position.clamp(min, max);
    let mut velocity = velocity;
    if (clamped.x > position.x && velocity.x < 0.0) || (clamped.x < position.x && velocity.x > 0.0)
    {
        velocity.x = 0.0;
    }
    if (clamped.y > position.y && velocity.y < 0.0) || (clamped.y < position.y && velocity.y > 0.0)
    {
        velocity.y = 0.0;
    }
    (clamped, velocity)
}

/// Slow to a stop at the deceleration rate, used while not aggroed.
pub fn brake_velocity(current: Vec2, tuning: &HoverTuning, dt: f32) -> Vec2 {
    approach(current, Vec2::ZERO, tuning, dt)
}

fn approach(current: Vec2, target: Vec2, tuning: &HoverTuning, dt: f32) -> Vec2 {
    let rate = if target.length() > current.length() {
        tuning.acceleration
    } else {
        tuning.deceleration
    };

    let delta = target - current;
    let step = rate * dt;
    let next = if delta.length() <= step {
        target
    } else {
        current + delta.normalize_or_zero() * step
    };

    next.clamp_length_max(tuning.max_speed)
}
