//! Combat domain: the boss encounter and everything it spawns.

mod attacks;
mod clones;
mod components;
mod encounter;
mod energy;
mod events;
mod laser;
mod phases;
mod resources;
mod spawn;
mod systems;
mod torches;

#[cfg(test)]
mod tests;

pub use components::{Boss, Combatant, Invulnerable, PlayerStrike, Team};
pub use encounter::Health;
pub use energy::EnergyEconomy;
pub use events::*;
pub use laser::{BeamProfile, LaserKind, LaserTuning};
pub use phases::PhaseMachine;
pub use resources::{
    AbilityTuning, CloneTuning, EncounterRng, EnergyTuning, HoverTuning, PhaseTuning,
    PrefabCatalog, SensesTuning,
};

use bevy::prelude::*;

use crate::combat::resources::{CombatInput, EncounterDiagnostics, StrikeTuning};
use crate::combat::spawn::{spawn_encounter, validate_encounter_setup};
use crate::combat::systems::{
    apply_damage, begin_phases_on_aggro, cleanup_expired_hitboxes, detect_hitbox_collisions,
    detonate_grenades, expire_clones, handle_boss_death, handle_torch_ignitions,
    hover_towards_player, move_projectiles, process_player_strike, read_combat_input,
    run_phase_loops, scan_for_player, tick_energy_economy, tick_lasers, update_combat_timers,
    update_laser_visuals,
};
use crate::combat::torches::{ignite_torches_on_contact, sync_torch_sources};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SensesTuning>()
            .init_resource::<HoverTuning>()
            .init_resource::<PhaseTuning>()
            .init_resource::<AbilityTuning>()
            .init_resource::<LaserTuning>()
            .init_resource::<EnergyTuning>()
            .init_resource::<CloneTuning>()
            .init_resource::<PrefabCatalog>()
            .init_resource::<StrikeTuning>()
            .init_resource::<CombatInput>()
            .init_resource::<EncounterRng>()
            .init_resource::<EncounterDiagnostics>()
            .add_message::<DamageEvent>()
            .add_message::<DamageTakenEvent>()
            .add_message::<BossDeathEvent>()
            .add_message::<PlayerDetectedEvent>()
            .add_message::<PlayerLostEvent>()
            .add_message::<AggroStartedEvent>()
            .add_message::<AggroEndedEvent>()
            .add_message::<PhaseChangedEvent>()
            .add_message::<Phase1StartedEvent>()
            .add_message::<Phase2StartedEvent>()
            .add_message::<PhaseTransitionStartedEvent>()
            .add_message::<PhaseTransitionCompletedEvent>()
            .add_message::<TorchWindowOpenedEvent>()
            .add_message::<TorchWindowClosedEvent>()
            .add_message::<TorchIgnitedEvent>()
            .add_message::<EnergyGainedEvent>()
            .add_message::<EnergyFullEvent>()
            .add_message::<CloneCreatedEvent>()
            .add_message::<CloneDestroyedEvent>()
            .add_message::<LaserStartedEvent>()
            .add_message::<LaserEndedEvent>()
            .add_message::<LaserHitGroundEvent>()
            .add_message::<LaserHitPlayerEvent>()
            .add_message::<AbilityUsedEvent>()
            .add_systems(Startup, (spawn_encounter, validate_encounter_setup))
            .add_systems(
                Update,
                (
                    // Senses, then damage, so a lethal hit stops the loops this frame
                    (
                        scan_for_player,
                        hover_towards_player,
                        begin_phases_on_aggro,
                        read_combat_input,
                        update_combat_timers,
                        process_player_strike,
                        detect_hitbox_collisions,
                        apply_damage,
                        handle_boss_death,
                    )
                        .chain(),
                    (
                        run_phase_loops,
                        tick_lasers,
                        tick_energy_economy,
                        ignite_torches_on_contact,
                        handle_torch_ignitions,
                        sync_torch_sources,
                        expire_clones,
                    )
                        .chain(),
                    (
                        move_projectiles,
                        detonate_grenades,
                        cleanup_expired_hitboxes,
                        update_laser_visuals,
                    )
                        .chain(),
                )
                    .chain(),
            );
    }
}
