//! Combat domain: tuning resources and shared encounter state.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Detection and aggro ranges for the boss senses.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SensesTuning {
    pub detection_radius: f32,
    pub aggro_radius: f32,
    /// Seconds of simulated time between detection scans
    pub scan_interval: f32,
    pub require_line_of_sight: bool,
}

impl Default for SensesTuning {
    fn default() -> Self {
        Self {
            detection_radius: 560.0,
            aggro_radius: 440.0,
            scan_interval: 0.1,
            require_line_of_sight: true,
        }
    }
}

/// Seek/flee band the boss tries to hold around the player.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HoverTuning {
    pub preferred_distance: f32,
    pub stop_distance: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Lower-left corner of the box the boss may occupy
    pub arena_min: [f32; 2],
    /// Upper-right corner of the box the boss may occupy
    pub arena_max: [f32; 2],
}

impl HoverTuning {
    pub fn arena(&self) -> (Vec2, Vec2) {
        (Vec2::from(self.arena_min), Vec2::from(self.arena_max))
    }
}

impl Default for HoverTuning {
    fn default() -> Self {
        Self {
            preferred_distance: 260.0,
            stop_distance: 40.0,
            max_speed: 180.0,
            acceleration: 600.0,
            deceleration: 900.0,
            arena_min: [-640.0, -120.0],
            arena_max: [640.0, 260.0],
        }
    }
}

/// Hit thresholds and loop timings for the two combat phases.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PhaseTuning {
    pub phase1_hits_to_advance: u32,
    pub phase2_hits_to_kill: u32,
    pub transition_duration: f32,
    /// Random wait range between phase 1 attacks, inclusive
    pub phase1_attack_interval: (f32, f32),
    pub spin_burst_duration: f32,
    pub spin_shot_interval: f32,
    pub spin_step_degrees: f32,
    pub channel_duration: f32,
}

impl Default for PhaseTuning {
    fn default() -> Self {
        Self {
            phase1_hits_to_advance: 6,
            phase2_hits_to_kill: 8,
            transition_duration: 2.5,
            phase1_attack_interval: (1.2, 2.4),
            spin_burst_duration: 3.0,
            spin_shot_interval: 0.1,
            spin_step_degrees: 17.0,
            channel_duration: 4.0,
        }
    }
}

/// Cooldowns and projectile parameters for the discrete attacks.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AbilityTuning {
    pub bullet_cooldown: f32,
    pub grenade_cooldown: f32,
    pub homing_laser_cooldown: f32,
    pub scythe_sweep_cooldown: f32,
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    pub volley_count: u32,
    pub volley_spread_degrees: f32,
    pub grenade_flight_time: f32,
    pub grenade_gravity: f32,
    pub grenade_fuse: f32,
    pub explosion_lifetime: f32,
}

impl Default for AbilityTuning {
    fn default() -> Self {
        Self {
            bullet_cooldown: 0.08,
            grenade_cooldown: 1.5,
            homing_laser_cooldown: 2.0,
            scythe_sweep_cooldown: 3.0,
            bullet_speed: 420.0,
            bullet_lifetime: 3.0,
            volley_count: 5,
            volley_spread_degrees: 40.0,
            grenade_flight_time: 1.0,
            grenade_gravity: 900.0,
            grenade_fuse: 1.0,
            explosion_lifetime: 0.25,
        }
    }
}

/// Energy pool, torch window and ambient heating parameters.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnergyTuning {
    pub max_energy: f32,
    pub energy_gain_per_torch: f32,
    pub torch_window_duration: f32,
    pub torch_cooldown: f32,
    pub ambient_heating_rate: f32,
    pub ambient_heating_interval: f32,
    pub ambient_heating_enabled: bool,
}

impl Default for EnergyTuning {
    fn default() -> Self {
        Self {
            max_energy: 100.0,
            energy_gain_per_torch: 50.0,
            torch_window_duration: 8.0,
            torch_cooldown: 4.0,
            ambient_heating_rate: 2.0,
            ambient_heating_interval: 1.0,
            ambient_heating_enabled: true,
        }
    }
}

/// Bounded decoy pool.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CloneTuning {
    pub max_clones: usize,
    pub clone_duration: f32,
    /// Horizontal offset from the owner at which clones appear
    pub spawn_offset: f32,
}

impl Default for CloneTuning {
    fn default() -> Self {
        Self {
            max_clones: 2,
            clone_duration: 10.0,
            spawn_offset: 80.0,
        }
    }
}

/// The player's melee strike against the boss.
#[derive(Resource, Debug, Clone)]
pub struct StrikeTuning {
    pub damage: f32,
    pub knockback: f32,
    pub cooldown: f32,
    pub duration: f32,
    pub reach: f32,
    pub size: Vec2,
    /// Speed of the thrown strike; `duration` bounds how far it flies
    pub bolt_speed: f32,
    /// Bosses closer than this are aimed at instead of striking along facing
    pub lock_on_range: f32,
}

impl Default for StrikeTuning {
    fn default() -> Self {
        Self {
            damage: 12.0,
            knockback: 0.0,
            cooldown: 0.35,
            duration: 0.5,
            reach: 36.0,
            size: Vec2::new(44.0, 32.0),
            bolt_speed: 900.0,
            lock_on_range: 420.0,
        }
    }
}

/// Keys the player strikes with
#[derive(Resource, Debug, Default)]
pub struct CombatInput {
    pub strike: bool,
}

/// Sprite and hitbox parameters for one spawnable kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrefabDef {
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub damage: f32,
    pub knockback: f32,
}

impl Default for PrefabDef {
    fn default() -> Self {
        Self {
            size: [12.0, 12.0],
            color: [1.0, 0.5, 0.1, 1.0],
            damage: 10.0,
            knockback: 200.0,
        }
    }
}

impl PrefabDef {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.size[0], self.size[1])
    }

    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.color;
        Color::srgba(r, g, b, a)
    }
}

/// Prefab handles the entity factory can instantiate.
/// A missing entry makes the corresponding spawn a logged no-op.
#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrefabCatalog {
    pub bullet: Option<PrefabDef>,
    pub grenade: Option<PrefabDef>,
    pub explosion: Option<PrefabDef>,
    pub clone: Option<PrefabDef>,
}

impl Default for PrefabCatalog {
    fn default() -> Self {
        Self {
            bullet: Some(PrefabDef {
                size: [10.0, 10.0],
                color: [1.0, 0.55, 0.15, 1.0],
                damage: 8.0,
                knockback: 150.0,
            }),
            grenade: Some(PrefabDef {
                size: [16.0, 16.0],
                color: [0.45, 0.3, 0.2, 1.0],
                damage: 0.0,
                knockback: 0.0,
            }),
            explosion: Some(PrefabDef {
                size: [110.0, 110.0],
                color: [1.0, 0.35, 0.05, 0.55],
                damage: 22.0,
                knockback: 450.0,
            }),
            clone: Some(PrefabDef {
                size: [56.0, 56.0],
                color: [0.55, 0.15, 0.1, 0.6],
                damage: 0.0,
                knockback: 0.0,
            }),
        }
    }
}

/// Deterministic RNG used by the phase loops.
#[derive(Resource)]
pub struct EncounterRng(pub ChaCha8Rng);

impl EncounterRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for EncounterRng {
    fn default() -> Self {
        Self::from_seed(rand::random::<u64>())
    }
}

/// One-shot warnings that should only surface once per session.
#[derive(Resource, Debug, Default)]
pub struct EncounterDiagnostics {
    pub player_missing_warned: bool,
}
