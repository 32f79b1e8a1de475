//! Combat domain: two-phase boss state machine and its attack loops.

use bevy::prelude::*;
use rand::Rng;

use crate::combat::resources::PhaseTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Phase {
    /// Spawned but not yet aggroed
    #[default]
    Dormant,
    Phase1,
    Transitioning,
    Phase2,
    Dead,
}

/// Phase 1 repertoire, picked uniformly after each random wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase1Attack {
    Volley,
    Grenade,
    /// Calls the torches: requests the torch window
    Summon,
}

impl Phase1Attack {
    pub const ALL: [Phase1Attack; 3] = [
        Phase1Attack::Volley,
        Phase1Attack::Grenade,
        Phase1Attack::Summon,
    ];
}

/// Long-duration specials between phase 2 spin bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSkill {
    HomingBeam,
    ScytheSweep,
    Kindle,
}

impl ChannelSkill {
    pub const ALL: [ChannelSkill; 3] = [
        ChannelSkill::HomingBeam,
        ChannelSkill::ScytheSweep,
        ChannelSkill::Kindle,
    ];
}

/// Work the phase loop asks the attack layer to perform this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseAction {
    Attack(Phase1Attack),
    SpinShot { angle_degrees: f32 },
    Channel(ChannelSkill),
    TransitionCompleted,
}

/// Result of a hit being recorded against the active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Dormant, transitioning, dead, or threshold already reached
    Ignored,
    Counted,
    AdvanceTriggered,
    KillThresholdReached,
}

/// Resumable task driving the active phase.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PhaseTask {
    Idle,
    Phase1Loop { until_next: f32 },
    Transition { remaining: f32 },
    SpinBurst { elapsed: f32, until_shot: f32, angle: f32 },
    Channel { skill: ChannelSkill, remaining: f32 },
}

#[derive(Component, Debug, Clone)]
pub struct PhaseMachine {
    phase: Phase,
    phase1_hits: u32,
    phase2_hits: u32,
    transitioning: bool,
    task: PhaseTask,
    tuning: PhaseTuning,
}

impl PhaseMachine {
    pub fn new(tuning: PhaseTuning) -> Self {
        Self {
            phase: Phase::Dormant,
            phase1_hits: 0,
            phase2_hits: 0,
            transitioning: false,
            task: PhaseTask::Idle,
            tuning,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase1_hits(&self) -> u32 {
        self.phase1_hits
    }

    pub fn phase2_hits(&self) -> u32 {
        self.phase2_hits
    }

    #[cfg(test)]
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Begin the phase 1 loop. Only valid from `Dormant`.
    pub fn start_phase1<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.phase != Phase::Dormant {
            return false;
        }

        self.phase = Phase::Phase1;
        self.phase1_hits = 0;
        self.task = PhaseTask::Phase1Loop {
            until_next: self.roll_attack_wait(rng),
        };
        true
    }

    /// Count a hit on the boss against the active phase threshold.
    pub fn record_hit(&mut self) -> HitOutcome {
        match self.phase {
            Phase::Phase1 => {
                if self.phase1_hits >= self.tuning.phase1_hits_to_advance {
                    return HitOutcome::Ignored;
                }
                self.phase1_hits += 1;
                if self.phase1_hits == self.tuning.phase1_hits_to_advance
                    && self.advance_to_next_phase()
                {
                    HitOutcome::AdvanceTriggered
                } else {
                    HitOutcome::Counted
                }
            }
            Phase::Phase2 => {
                if self.phase2_hits >= self.tuning.phase2_hits_to_kill {
                    return HitOutcome::Ignored;
                }
                self.phase2_hits += 1;
                if self.phase2_hits == self.tuning.phase2_hits_to_kill {
                    HitOutcome::KillThresholdReached
                } else {
                    HitOutcome::Counted
                }
            }
            Phase::Dormant | Phase::Transitioning | Phase::Dead => HitOutcome::Ignored,
        }
    }

    /// Stop the phase 1 loop and start the transition countdown.
    pub fn advance_to_next_phase(&mut self) -> bool {
        if self.transitioning || self.phase != Phase::Phase1 {
            return false;
        }

        self.transitioning = true;
        self.phase = Phase::Transitioning;
        self.task = PhaseTask::Transition {
            remaining: self.tuning.transition_duration,
        };
        true
    }

    /// Enter phase 2. Only valid at the end of a transition.
    pub fn start_phase2(&mut self) -> bool {
        if self.phase != Phase::Transitioning {
            return false;
        }

        self.transitioning = false;
        self.phase = Phase::Phase2;
        self.phase2_hits = 0;
        self.task = Self::fresh_spin_burst();
        true
    }

    /// Cancel every phase task. Idempotent; returns whether anything changed.
    pub fn stop_all_phases(&mut self) -> bool {
        if self.phase == Phase::Dead {
            return false;
        }

        self.phase = Phase::Dead;
        self.transitioning = false;
        self.task = PhaseTask::Idle;
        true
    }

    /// Resume the active task by one tick.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Option<PhaseAction> {
        match self.task {
            PhaseTask::Idle => None,
            PhaseTask::Phase1Loop { until_next } => {
                let until_next = until_next - dt;
                if until_next > 0.0 {
                    self.task = PhaseTask::Phase1Loop { until_next };
                    return None;
                }

                let attack = Phase1Attack::ALL[rng.random_range(0..Phase1Attack::ALL.len())];
                self.task = PhaseTask::Phase1Loop {
                    until_next: self.roll_attack_wait(rng),
                };
                Some(PhaseAction::Attack(attack))
            }
            PhaseTask::Transition { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.task = PhaseTask::Transition { remaining };
                    return None;
                }

                if self.start_phase2() {
                    Some(PhaseAction::TransitionCompleted)
                } else {
                    None
                }
            }
            PhaseTask::SpinBurst {
                elapsed,
                until_shot,
                angle,
            } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.tuning.spin_burst_duration {
                    let skill = ChannelSkill::ALL[rng.random_range(0..ChannelSkill::ALL.len())];
                    self.task = PhaseTask::Channel {
                        skill,
                        remaining: self.tuning.channel_duration,
                    };
                    return Some(PhaseAction::Channel(skill));
                }

                let until_shot = until_shot - dt;
                if until_shot > 0.0 {
                    self.task = PhaseTask::SpinBurst {
                        elapsed,
                        until_shot,
                        angle,
                    };
                    return None;
                }

                // Carry the overshoot so the cadence holds at any frame rate
                self.task = PhaseTask::SpinBurst {
                    elapsed,
                    until_shot: (until_shot + self.tuning.spin_shot_interval).max(0.0),
                    angle: (angle + self.tuning.spin_step_degrees) % 360.0,
                };
                Some(PhaseAction::SpinShot {
                    angle_degrees: angle,
                })
            }
            PhaseTask::Channel { skill, remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.task = PhaseTask::Channel { skill, remaining };
                } else {
                    self.task = Self::fresh_spin_burst();
                }
                None
            }
        }
    }

    fn fresh_spin_burst() -> PhaseTask {
        PhaseTask::SpinBurst {
            elapsed: 0.0,
            until_shot: 0.0,
            angle: 0.0,
        }
    }

    fn roll_attack_wait<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (a, b) = self.tuning.phase1_attack_interval;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        rng.random_range(lo..=hi)
    }
}
