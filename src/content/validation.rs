//! Content domain: sanity checks on loaded tuning.

use super::data::BossTuning;
use crate::combat::{BeamProfile, LaserKind};

/// A tuning value that cannot drive a sensible encounter.
#[derive(Debug, PartialEq)]
pub struct ValidationError {
    pub section: &'static str,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.section, self.field, self.message)
    }
}

/// Helper macro for checking a value is strictly positive
macro_rules! check_positive {
    ($errors:expr, $section:expr, $field:ident, $value:expr) => {
        if !($value > Default::default()) {
            $errors.push(ValidationError {
                section: $section,
                field: stringify!($field),
                message: format!("must be positive, got {:?}", $value),
            });
        }
    };
}

/// Validate the tuning document.
/// Returns a list of validation errors, empty if everything is usable.
pub fn validate_boss_tuning(tuning: &BossTuning) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_positive!(errors, "boss", boss_max_health, tuning.boss_max_health);

    // Senses
    let senses = &tuning.senses;
    check_positive!(errors, "senses", detection_radius, senses.detection_radius);
    check_positive!(errors, "senses", scan_interval, senses.scan_interval);
    if senses.aggro_radius > senses.detection_radius {
        errors.push(ValidationError {
            section: "senses",
            field: "aggro_radius",
            message: format!(
                "{} exceeds detection_radius {}, aggro would need detection first",
                senses.aggro_radius, senses.detection_radius
            ),
        });
    }

    // Phases
    let phases = &tuning.phases;
    check_positive!(errors, "phases", phase1_hits_to_advance, phases.phase1_hits_to_advance);
    check_positive!(errors, "phases", phase2_hits_to_kill, phases.phase2_hits_to_kill);
    check_positive!(errors, "phases", spin_shot_interval, phases.spin_shot_interval);
    let (lo, hi) = phases.phase1_attack_interval;
    if lo < 0.0 || hi < 0.0 || lo.max(hi) <= 0.0 {
        errors.push(ValidationError {
            section: "phases",
            field: "phase1_attack_interval",
            message: format!("range ({}, {}) leaves no positive wait", lo, hi),
        });
    }

    // Energy
    check_positive!(errors, "energy", max_energy, tuning.energy.max_energy);
    check_positive!(errors, "energy", torch_window_duration, tuning.energy.torch_window_duration);

    // Clones
    check_positive!(errors, "clones", max_clones, tuning.clones.max_clones);

    // Lasers: phase 2 must hit harder than phase 1
    let lasers = &tuning.lasers;
    check_escalation(
        &mut errors,
        LaserKind::Homing,
        &lasers.phase1.homing,
        &lasers.phase2.homing,
    );
    check_escalation(&mut errors, LaserKind::Sweep, &lasers.phase1.sweep, &lasers.phase2.sweep);

    errors
}

fn check_escalation(
    errors: &mut Vec<ValidationError>,
    kind: LaserKind,
    phase1: &BeamProfile,
    phase2: &BeamProfile,
) {
    // Homing beams escalate by turning faster, sweeps by covering more arc
    let (field, steering, steers_harder) = match kind {
        LaserKind::Homing => (
            "homing",
            "turn rate",
            phase2.turn_rate_degrees > phase1.turn_rate_degrees,
        ),
        LaserKind::Sweep => (
            "sweep",
            "sweep span",
            phase2.sweep_span_degrees > phase1.sweep_span_degrees,
        ),
    };

    let weaker = phase2.damage_per_second <= phase1.damage_per_second
        || phase2.drain_per_second <= phase1.drain_per_second
        || phase2.width <= phase1.width
        || !steers_harder;
    if weaker {
        errors.push(ValidationError {
            section: "lasers",
            field,
            message: format!(
                "phase2 profile must exceed phase1 in damage, drain, width and {steering}"
            ),
        });
    }
}
