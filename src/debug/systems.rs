//! Debug domain: hotkeys for poking the encounter at runtime.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::camera::CameraCommand;
use crate::combat::{
    Boss, DamageEvent, DamageKind, EnergyEconomy, EnergyFullEvent, EnergyGainedEvent, Health,
    Invulnerable, PhaseMachine, TorchWindowOpenedEvent,
};
use crate::debug::DebugState;
use crate::movement::Player;

/// Handle Ctrl-held keyboard shortcuts for debug actions
#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_debug_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut debug_state: ResMut<DebugState>,
    mut boss_query: Query<(Entity, &mut EnergyEconomy, &PhaseMachine), With<Boss>>,
    player_query: Query<Entity, With<Player>>,
    mut damage_events: MessageWriter<DamageEvent>,
    mut window_opened_events: MessageWriter<TorchWindowOpenedEvent>,
    mut gained_events: MessageWriter<EnergyGainedEvent>,
    mut full_events: MessageWriter<EnergyFullEvent>,
    mut camera_commands: MessageWriter<CameraCommand>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    if !ctrl {
        return;
    }
    let now = time.elapsed_secs();

    // Ctrl+I: Toggle invincibility
    if keyboard.just_pressed(KeyCode::KeyI) {
        debug_state.invincible = !debug_state.invincible;
        info!("[DEBUG] Invincibility {}", if debug_state.invincible { "ON" } else { "OFF" });
    }

    // Ctrl+R / Ctrl+X: camera recovery
    if keyboard.just_pressed(KeyCode::KeyR) {
        info!("[DEBUG] Restoring original camera");
        camera_commands.write(CameraCommand::RestoreOriginal);
    }
    if keyboard.just_pressed(KeyCode::KeyX) {
        info!("[DEBUG] Resetting camera system");
        camera_commands.write(CameraCommand::Reset);
    }

    for (boss, mut economy, phases) in &mut boss_query {
        // Ctrl+K: Count a hit without dealing damage
        if keyboard.just_pressed(KeyCode::KeyK) {
            if let Some(player) = player_query.iter().next() {
                info!("[DEBUG] Forcing a recorded hit on boss {:?}", boss);
                damage_events.write(DamageEvent {
                    source: player,
                    target: boss,
                    amount: 0.0,
                    knockback: Vec2::ZERO,
                    kind: DamageKind::Hit,
                });
            }
        }

        // Ctrl+T: Open the torch window for the current phase
        if keyboard.just_pressed(KeyCode::KeyT) {
            if economy.open_torch_window(now) {
                info!("[DEBUG] Opened torch window for boss {:?}", boss);
                window_opened_events.write(TorchWindowOpenedEvent {
                    boss,
                    phase: phases.phase(),
                });
            } else {
                info!("[DEBUG] Torch window is open or cooling down");
            }
        }

        // Ctrl+E: Empty the energy pool
        if keyboard.just_pressed(KeyCode::KeyE) {
            let max = economy.pool.max();
            let drained = economy.consume_energy(max);
            info!("[DEBUG] Drained boss {:?} energy (-{:.1})", boss, drained);
        }

        // Ctrl+F: Fill the energy pool
        if keyboard.just_pressed(KeyCode::KeyF) {
            let before = economy.pool.current();
            let max = economy.pool.max();
            economy.set_energy(max);
            let gained = economy.pool.current() - before;
            info!("[DEBUG] Filled boss {:?} energy (+{:.1})", boss, gained);
            if gained > 0.0 {
                gained_events.write(EnergyGainedEvent {
                    boss,
                    amount: gained,
                });
                full_events.write(EnergyFullEvent { boss });
            }
        }

        // Ctrl+A: Toggle ambient heating
        if keyboard.just_pressed(KeyCode::KeyA) {
            let enabled = !economy.ambient.enabled;
            economy.set_ambient_heating(enabled);
            info!(
                "[DEBUG] Ambient heating {}",
                if enabled { "ON" } else { "OFF" }
            );
        }
    }
}

/// Apply invincibility effect to player
pub(crate) fn apply_invincibility(
    debug_state: Res<DebugState>,
    mut player_query: Query<(&mut Health, &mut Invulnerable), With<Player>>,
) {
    if !debug_state.invincible {
        return;
    }

    for (mut health, mut invuln) in &mut player_query {
        // Keep invulnerability frames active
        invuln.timer = 1.0;
        health.restore();
    }
}
