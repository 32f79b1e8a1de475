//! Content domain: the boss tuning document read from RON.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::CameraTuning;
use crate::combat::{
    AbilityTuning, CloneTuning, EnergyTuning, HoverTuning, LaserTuning, PhaseTuning,
    PrefabCatalog, SensesTuning,
};

/// Everything configurable about one boss encounter.
/// Missing fields fall back to their compiled defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BossTuning {
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
    pub boss_max_health: f32,
    pub boss_spawn: [f32; 2],
    pub checkpoint: [f32; 2],
    pub senses: SensesTuning,
    pub hover: HoverTuning,
    pub phases: PhaseTuning,
    pub abilities: AbilityTuning,
    pub lasers: LaserTuning,
    pub energy: EnergyTuning,
    pub clones: CloneTuning,
    pub camera: CameraTuning,
    pub prefabs: PrefabCatalog,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            seed: None,
            boss_max_health: 400.0,
            boss_spawn: [300.0, 80.0],
            checkpoint: [-420.0, -120.0],
            senses: SensesTuning::default(),
            hover: HoverTuning::default(),
            phases: PhaseTuning::default(),
            abilities: AbilityTuning::default(),
            lasers: LaserTuning::default(),
            energy: EnergyTuning::default(),
            clones: CloneTuning::default(),
            camera: CameraTuning::default(),
            prefabs: PrefabCatalog::default(),
        }
    }
}

impl BossTuning {
    pub fn boss_spawn(&self) -> Vec2 {
        Vec2::from(self.boss_spawn)
    }

    pub fn checkpoint(&self) -> Vec2 {
        Vec2::from(self.checkpoint)
    }
}

/// Spawn parameters for the boss, kept as a resource for startup systems.
#[derive(Resource, Debug, Clone)]
pub struct BossSpawn {
    pub position: Vec2,
    pub max_health: f32,
}
