//! Content domain: boss tuning loaded from `assets/data`.

mod data;
mod loader;
mod validation;


pub use data::BossSpawn;

use bevy::prelude::*;
use std::path::Path;

use crate::combat::EncounterRng;
use crate::content::data::BossTuning;
use crate::content::loader::load_boss_tuning;
use crate::content::validation::validate_boss_tuning;
use crate::core::{Checkpoints, RespawnAtCheckpoint};

const TUNING_PATH: &str = "assets/data/boss_tuning.ron";

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        let tuning = match load_boss_tuning(Path::new(TUNING_PATH)) {
            Ok(tuning) => {
                info!("Loaded boss tuning from {}", TUNING_PATH);
                tuning
            }
            Err(e) => {
                error!("{}", e);
                warn!("Falling back to default boss tuning");
                BossTuning::default()
            }
        };

        for problem in validate_boss_tuning(&tuning) {
            warn!("Invalid boss tuning: {}", problem);
        }

        let rng = match tuning.seed {
            Some(seed) => {
                info!("Encounter RNG seeded with {}", seed);
                EncounterRng::from_seed(seed)
            }
            None => EncounterRng::default(),
        };

        app.insert_resource(BossSpawn {
            position: tuning.boss_spawn(),
            max_health: tuning.boss_max_health,
        })
        .insert_resource(Checkpoints::new(RespawnAtCheckpoint {
            position: tuning.checkpoint(),
        }))
        .insert_resource(rng)
        .insert_resource(tuning.senses)
        .insert_resource(tuning.hover)
        .insert_resource(tuning.phases)
        .insert_resource(tuning.abilities)
        .insert_resource(tuning.lasers)
        .insert_resource(tuning.energy)
        .insert_resource(tuning.clones)
        .insert_resource(tuning.camera)
        .insert_resource(tuning.prefabs);
    }
}
