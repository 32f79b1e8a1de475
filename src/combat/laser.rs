//! Combat domain: time-extended beam abilities (homing beam, scythe sweep).
//!
//! At most one beam exists per emitter. The emitter stays active from the
//! moment a beam starts until its fade-out completes, so `is_active` covers
//! the whole interval between the started and ended messages.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::energy::EnergyPool;
use crate::combat::phases::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaserKind {
    Homing,
    Sweep,
}

/// Numeric parameters for one beam kind in one phase.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BeamProfile {
    pub duration: f32,
    pub drain_per_second: f32,
    pub turn_rate_degrees: f32,
    pub sweep_span_degrees: f32,
    pub width: f32,
    pub range: f32,
    pub damage_per_second: f32,
    pub color: [f32; 4],
}

impl Default for BeamProfile {
    fn default() -> Self {
        Self {
            duration: 3.0,
            drain_per_second: 6.0,
            turn_rate_degrees: 45.0,
            sweep_span_degrees: 90.0,
            width: 10.0,
            range: 900.0,
            damage_per_second: 20.0,
            color: [1.0, 0.3, 0.1, 0.9],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LaserProfile {
    pub homing: BeamProfile,
    pub sweep: BeamProfile,
}

impl Default for LaserProfile {
    fn default() -> Self {
        Self {
            homing: BeamProfile {
                duration: 3.0,
                drain_per_second: 6.0,
                turn_rate_degrees: 40.0,
                sweep_span_degrees: 0.0,
                width: 8.0,
                ..default()
            },
            sweep: BeamProfile {
                duration: 2.0,
                drain_per_second: 8.0,
                turn_rate_degrees: 0.0,
                sweep_span_degrees: 100.0,
                width: 12.0,
                ..default()
            },
        }
    }
}

/// Phase-dependent laser parameters.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LaserTuning {
    pub phase1: LaserProfile,
    pub phase2: LaserProfile,
    pub fade_duration: f32,
    pub min_start_energy: f32,
}

impl Default for LaserTuning {
    fn default() -> Self {
        let phase1 = LaserProfile::default();
        let phase2 = LaserProfile {
            homing: BeamProfile {
                drain_per_second: 10.0,
                turn_rate_degrees: 75.0,
                width: 12.0,
                damage_per_second: 30.0,
                color: [1.0, 0.15, 0.35, 0.95],
                ..phase1.homing.clone()
            },
            sweep: BeamProfile {
                drain_per_second: 12.0,
                sweep_span_degrees: 160.0,
                width: 16.0,
                damage_per_second: 35.0,
                color: [1.0, 0.15, 0.35, 0.95],
                ..phase1.sweep.clone()
            },
        };
        Self {
            phase1,
            phase2,
            fade_duration: 0.25,
            min_start_energy: 10.0,
        }
    }
}

impl LaserTuning {
    pub fn profile(&self, phase: Phase) -> &LaserProfile {
        match phase {
            Phase::Phase2 => &self.phase2,
            _ => &self.phase1,
        }
    }
}

/// Raycasts the beam needs from the physics world.
pub trait BeamProbe {
    /// Distance to the first ground surface along `direction`, if any.
    fn ground_hit(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<f32>;
    /// The player entity if it lies on the beam segment.
    fn player_hit(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<Entity>;
}

/// Request to start a beam.
#[derive(Debug, Clone, Copy)]
pub struct BeamStart {
    pub origin: Vec2,
    /// Initial aim; for the sweep this is the centre of the arc
    pub aim: Vec2,
    pub phase: Phase,
    pub available_energy: f32,
}

/// Live beam state.
#[derive(Debug, Clone, PartialEq)]
pub struct LaserBeam {
    pub kind: LaserKind,
    pub origin: Vec2,
    pub direction: Vec2,
    pub elapsed: f32,
    pub duration_limit: f32,
    pub drain_per_second: f32,
    pub turn_rate_degrees: f32,
    pub sweep_start_degrees: f32,
    pub sweep_span_degrees: f32,
    pub range: f32,
    pub width: f32,
    pub damage_per_second: f32,
    pub color: [f32; 4],
    /// Current visible end of the beam
    pub end: Vec2,
}

impl LaserBeam {
    pub fn length(&self) -> f32 {
        (self.end - self.origin).length()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LaserState {
    Idle,
    Firing(LaserBeam),
    Fading { beam: LaserBeam, remaining: f32 },
}

/// What happened to the beam during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaserTickReport {
    pub ground_point: Option<Vec2>,
    pub player_hit: Option<(Entity, f32)>,
    pub drained: f32,
    pub ended: Option<LaserKind>,
}

#[derive(Component, Debug, Clone)]
pub struct LaserEmitter {
    state: LaserState,
    tuning: LaserTuning,
}

impl LaserEmitter {
    pub fn new(tuning: LaserTuning) -> Self {
        Self {
            state: LaserState::Idle,
            tuning,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, LaserState::Idle)
    }

    #[cfg(test)]
    pub fn state(&self) -> &LaserState {
        &self.state
    }

    pub fn beam(&self) -> Option<&LaserBeam> {
        match &self.state {
            LaserState::Idle => None,
            LaserState::Firing(beam) => Some(beam),
            LaserState::Fading { beam, .. } => Some(beam),
        }
    }

    /// Visual opacity multiplier: 1 while firing, falling to 0 while fading.
    pub fn fade_alpha(&self) -> f32 {
        match &self.state {
            LaserState::Idle => 0.0,
            LaserState::Firing(_) => 1.0,
            LaserState::Fading { remaining, .. } => {
                if self.tuning.fade_duration <= 0.0 {
                    0.0
                } else {
                    (remaining / self.tuning.fade_duration).clamp(0.0, 1.0)
                }
            }
        }
    }

    pub fn start_homing(&mut self, start: BeamStart) -> bool {
        self.start(LaserKind::Homing, start)
    }

    pub fn start_sweep(&mut self, start: BeamStart) -> bool {
        self.start(LaserKind::Sweep, start)
    }

    fn start(&mut self, kind: LaserKind, start: BeamStart) -> bool {
        if self.is_active() || start.available_energy < self.tuning.min_start_energy {
            return false;
        }

        let profile = self.tuning.profile(start.phase);
        let profile = match kind {
            LaserKind::Homing => &profile.homing,
            LaserKind::Sweep => &profile.sweep,
        };

        let aim = start.aim.normalize_or(Vec2::X);
        let aim_degrees = aim.y.atan2(aim.x).to_degrees();
        let sweep_start_degrees = aim_degrees - profile.sweep_span_degrees * 0.5;
        let direction = match kind {
            LaserKind::Homing => aim,
            LaserKind::Sweep => heading(sweep_start_degrees),
        };

        self.state = LaserState::Firing(LaserBeam {
            kind,
            origin: start.origin,
            direction,
            elapsed: 0.0,
            duration_limit: profile.duration,
            drain_per_second: profile.drain_per_second,
            turn_rate_degrees: profile.turn_rate_degrees,
            sweep_start_degrees,
            sweep_span_degrees: profile.sweep_span_degrees,
            range: profile.range,
            width: profile.width,
            damage_per_second: profile.damage_per_second,
            color: profile.color,
            end: start.origin + direction * profile.range,
        });
        true
    }

    /// Begin fading the beam. Safe to call when idle or already fading.
    pub fn stop(&mut self) -> bool {
        let LaserState::Firing(beam) = &self.state else {
            return false;
        };

        self.state = LaserState::Fading {
            beam: beam.clone(),
            remaining: self.tuning.fade_duration,
        };
        true
    }

    /// Drop the beam immediately, skipping the fade.
    /// Returns the kind that was released so its end can still be announced.
    pub fn release(&mut self) -> Option<LaserKind> {
        let kind = self.beam().map(|beam| beam.kind);
        self.state = LaserState::Idle;
        kind
    }

    /// Advance the beam by one tick: steer, cast, and drain energy.
    pub fn tick(
        &mut self,
        dt: f32,
        origin: Vec2,
        player_pos: Option<Vec2>,
        probe: &impl BeamProbe,
        energy: &mut EnergyPool,
    ) -> LaserTickReport {
        let mut report = LaserTickReport::default();

        match &mut self.state {
            LaserState::Idle => {}
            LaserState::Fading { remaining, .. } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    report.ended = self.release();
                }
            }
            LaserState::Firing(beam) => {
                beam.elapsed += dt;
                beam.origin = origin;

                match beam.kind {
                    LaserKind::Homing => {
                        if let Some(target) = player_pos {
                            beam.direction = steer_towards(
                                beam.direction,
                                target - origin,
                                beam.turn_rate_degrees * dt,
                            );
                        }
                    }
                    LaserKind::Sweep => {
                        let t = if beam.duration_limit > 0.0 {
                            (beam.elapsed / beam.duration_limit).min(1.0)
                        } else {
                            1.0
                        };
                        beam.direction =
                            heading(beam.sweep_start_degrees + beam.sweep_span_degrees * t);
                    }
                }

                let reach = match probe.ground_hit(origin, beam.direction, beam.range) {
                    Some(distance) => {
                        let point = origin + beam.direction * distance;
                        report.ground_point = Some(point);
                        distance
                    }
                    None => beam.range,
                };
                beam.end = origin + beam.direction * reach;

                if let Some(player) = probe.player_hit(origin, beam.direction, reach) {
                    report.player_hit = Some((player, beam.damage_per_second * dt));
                }

                report.drained = energy.consume(beam.drain_per_second * dt);

                if beam.elapsed >= beam.duration_limit || energy.is_empty() {
                    self.stop();
                }
            }
        }

        report
    }
}

fn heading(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Rotate `current` toward `desired` by at most `max_degrees`.
pub fn steer_towards(current: Vec2, desired: Vec2, max_degrees: f32) -> Vec2 {
    if desired.length_squared() <= f32::EPSILON {
        return current;
    }

    let from = current.y.atan2(current.x);
    let to = desired.y.atan2(desired.x);
    let mut delta = to - from;
    while delta > std::f32::consts::PI {
        delta -= std::f32::consts::TAU;
    }
    while delta < -std::f32::consts::PI {
        delta += std::f32::consts::TAU;
    }

    let max = max_degrees.max(0.0).to_radians();
    let angle = from + delta.clamp(-max, max);
    Vec2::new(angle.cos(), angle.sin())
}
