//! Combat domain: systems translating encounter logic into messages.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::combat::attacks::{
    AbilityKind, AttackActionSet, EntityFactory, SpawnKind, SpawnRequest, heading_from_degrees,
};
use crate::combat::clones::{BossClone, CloneRoster};
use crate::combat::components::{
    Boss, Combatant, Grenade, Hitbox, HitboxLifetime, Invulnerable, LaserBeamVisual,
    PlayerStrike, Projectile, Team, strike_heading,
};
use crate::combat::encounter::{
    Encounter, Health, PlayerSighting, SenseTimer, brake_velocity, confine_to_arena,
    damage_player, hover_velocity,
};
use crate::combat::energy::EnergyEconomy;
use crate::combat::events::*;
use crate::combat::laser::{BeamProbe, LaserEmitter, LaserKind};
use crate::combat::phases::{
    ChannelSkill, HitOutcome, Phase, Phase1Attack, PhaseAction, PhaseMachine,
};
use crate::combat::resources::{
    AbilityTuning, CombatInput, EncounterDiagnostics, EncounterRng, HoverTuning, PrefabCatalog,
    SensesTuning, StrikeTuning,
};
use crate::combat::spawn::CommandsFactory;
use crate::core::PlayerDefeatedEvent;
use crate::movement::{GameLayer, MovementState, Player};

/// Invulnerability granted to the player after a hit
const PLAYER_IFRAMES: f32 = 0.6;
/// Maximum velocity the player can have after knockback
const MAX_KNOCKBACK_VELOCITY: f32 = 800.0;
/// Minimum upward knockback to give a small lift
const MIN_VERTICAL_KNOCKBACK: f32 = 100.0;
/// Seconds of lost steering after a knockback hit
const PLAYER_HITSTUN: f32 = 0.2;

/// Raycasts against the avian spatial query pipeline.
pub struct PhysicsBeamProbe<'a, 'w, 's> {
    spatial: &'a SpatialQuery<'w, 's>,
}

impl BeamProbe for PhysicsBeamProbe<'_, '_, '_> {
    fn ground_hit(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<f32> {
        let dir = Dir2::new(direction).ok()?;
        self.spatial
            .cast_ray(
                origin,
                dir,
                max_distance,
                true,
                &SpatialQueryFilter::from_mask(GameLayer::Ground),
            )
            .map(|hit| hit.distance)
    }

    fn player_hit(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<Entity> {
        let dir = Dir2::new(direction).ok()?;
        self.spatial
            .cast_ray(
                origin,
                dir,
                max_distance,
                true,
                &SpatialQueryFilter::from_mask(GameLayer::Player),
            )
            .map(|hit| hit.entity)
    }
}

/// True when no ground surface blocks the segment between the two points.
fn has_line_of_sight(spatial: &SpatialQuery, from: Vec2, to: Vec2) -> bool {
    let offset = to - from;
    let Ok(dir) = Dir2::new(offset) else {
        return true;
    };
    spatial
        .cast_ray(
            from,
            dir,
            offset.length(),
            true,
            &SpatialQueryFilter::from_mask(GameLayer::Ground),
        )
        .is_none()
}

// ---------------------------------------------------------------------------
// Senses and movement
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub(crate) fn scan_for_player(
    time: Res<Time>,
    senses: Res<SensesTuning>,
    mut diagnostics: ResMut<EncounterDiagnostics>,
    spatial: SpatialQuery,
    player_query: Query<&Transform, With<Player>>,
    mut boss_query: Query<(Entity, &Transform, &mut Encounter, &mut SenseTimer), With<Boss>>,
    mut detected_events: MessageWriter<PlayerDetectedEvent>,
    mut lost_events: MessageWriter<PlayerLostEvent>,
    mut aggro_started_events: MessageWriter<AggroStartedEvent>,
    mut aggro_ended_events: MessageWriter<AggroEndedEvent>,
) {
    let dt = time.delta_secs();
    let player_pos = player_query.iter().next().map(|t| t.translation.truncate());

    for (boss, transform, mut encounter, mut timer) in &mut boss_query {
        if encounter.is_dead() || !timer.tick(dt, senses.scan_interval) {
            continue;
        }

        let boss_pos = transform.translation.truncate();
        let sighting = match player_pos {
            Some(player_pos) => {
                diagnostics.player_missing_warned = false;
                Some(PlayerSighting {
                    distance: boss_pos.distance(player_pos),
                    line_of_sight: !senses.require_line_of_sight
                        || has_line_of_sight(&spatial, boss_pos, player_pos),
                })
            }
            None => {
                if !diagnostics.player_missing_warned {
                    warn!("Boss {:?} cannot find a player; detection fails closed", boss);
                    diagnostics.player_missing_warned = true;
                }
                None
            }
        };

        let edges = encounter.apply_scan(sighting, &senses);
        match edges.detected {
            Some(true) => {
                debug!("Boss {:?} detected the player", boss);
                detected_events.write(PlayerDetectedEvent { boss });
            }
            Some(false) => {
                debug!("Boss {:?} lost the player", boss);
                lost_events.write(PlayerLostEvent { boss });
            }
            None => {}
        }
        match edges.aggro {
            Some(true) => {
                info!("Boss {:?} aggroed", boss);
                aggro_started_events.write(AggroStartedEvent { boss });
            }
            Some(false) => {
                info!("Boss {:?} dropped aggro", boss);
                aggro_ended_events.write(AggroEndedEvent { boss });
            }
            None => {}
        }
    }
}

pub(crate) fn hover_towards_player(
    time: Res<Time>,
    hover: Res<HoverTuning>,
    player_query: Query<&Transform, (With<Player>, Without<Boss>)>,
    mut boss_query: Query<(&mut Transform, &Encounter, &mut LinearVelocity), With<Boss>>,
) {
    let dt = time.delta_secs();
    let player_pos = player_query.iter().next().map(|t| t.translation.truncate());
    let (arena_min, arena_max) = hover.arena();

    for (mut transform, encounter, mut velocity) in &mut boss_query {
        if encounter.is_dead() {
            velocity.0 = Vec2::ZERO;
            continue;
        }

        let position = transform.translation.truncate();
        let desired = match (encounter.is_aggro(), player_pos) {
            (true, Some(player_pos)) => {
                hover_velocity(position, player_pos, velocity.0, &hover, dt)
            }
            _ => brake_velocity(velocity.0, &hover, dt),
        };

        // Kinematic bodies ignore the walls, so the arena box is enforced here
        let (confined, desired) = confine_to_arena(position, desired, arena_min, arena_max);
        transform.translation.x = confined.x;
        transform.translation.y = confined.y;
        velocity.0 = desired;
    }
}

pub(crate) fn begin_phases_on_aggro(
    mut aggro_events: MessageReader<AggroStartedEvent>,
    mut rng: ResMut<EncounterRng>,
    mut boss_query: Query<&mut PhaseMachine, With<Boss>>,
    mut phase_changed_events: MessageWriter<PhaseChangedEvent>,
    mut phase1_events: MessageWriter<Phase1StartedEvent>,
) {
    for event in aggro_events.read() {
        let Ok(mut phases) = boss_query.get_mut(event.boss) else {
            continue;
        };

        if phases.start_phase1(&mut rng.0) {
            info!("Boss {:?} entering phase 1", event.boss);
            phase1_events.write(Phase1StartedEvent { boss: event.boss });
            phase_changed_events.write(PhaseChangedEvent {
                boss: event.boss,
                phase: Phase::Phase1,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Player strike and damage resolution
// ---------------------------------------------------------------------------

pub(crate) fn read_combat_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut input: ResMut<CombatInput>,
) {
    input.strike = keyboard.just_pressed(KeyCode::KeyJ) || keyboard.just_pressed(KeyCode::KeyZ);
}

pub(crate) fn update_combat_timers(
    time: Res<Time>,
    mut invuln_query: Query<&mut Invulnerable>,
    mut strike_query: Query<&mut PlayerStrike>,
) {
    let dt = time.delta_secs();
    for mut invuln in &mut invuln_query {
        if invuln.timer > 0.0 {
            invuln.timer -= dt;
        }
    }
    for mut strike in &mut strike_query {
        if strike.cooldown_timer > 0.0 {
            strike.cooldown_timer -= dt;
        }
    }
}

pub(crate) fn process_player_strike(
    mut commands: Commands,
    input: Res<CombatInput>,
    tuning: Res<StrikeTuning>,
    boss_query: Query<(&Transform, &Encounter), (With<Boss>, Without<Player>)>,
    mut query: Query<(Entity, &Transform, &MovementState, &mut PlayerStrike), With<Player>>,
) {
    if !input.strike {
        return;
    }

    for (entity, transform, movement, mut strike) in &mut query {
        if strike.cooldown_timer > 0.0 {
            continue;
        }
        strike.cooldown_timer = tuning.cooldown;

        let origin = transform.translation.truncate();
        let nearest_boss = boss_query
            .iter()
            .filter(|(_, encounter)| !encounter.is_dead())
            .map(|(boss, _)| boss.translation.truncate())
            .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)));
        let heading = strike_heading(
            origin,
            movement.facing.sign(),
            nearest_boss,
            tuning.lock_on_range,
        );
        let position = origin + heading * tuning.reach;

        commands.spawn((
            Hitbox::new(entity, tuning.damage, tuning.knockback),
            Team::Player,
            HitboxLifetime(tuning.duration),
            Projectile {
                velocity: heading * tuning.bolt_speed,
                gravity: 0.0,
            },
            Sprite {
                color: Color::srgba(1.0, 1.0, 0.6, 0.5),
                custom_size: Some(tuning.size),
                ..default()
            },
            Transform::from_xyz(position.x, position.y, 1.0),
            Collider::rectangle(tuning.size.x, tuning.size.y),
            Sensor,
            CollisionEventsEnabled,
            CollisionLayers::new(GameLayer::PlayerHitbox, [GameLayer::Boss]),
        ));
    }
}

pub(crate) fn detect_hitbox_collisions(
    mut collision_events: MessageReader<CollisionStart>,
    mut damage_events: MessageWriter<DamageEvent>,
    mut hitbox_query: Query<(&mut Hitbox, &Team, &Transform)>,
    target_query: Query<(Entity, &Team, &Invulnerable, &Transform), With<Combatant>>,
) {
    for event in collision_events.read() {
        let pairs = [
            (event.collider1, event.collider2),
            (event.collider2, event.collider1),
        ];

        for (hitbox_entity, target_entity) in pairs {
            let Ok((mut hitbox, hitbox_team, hitbox_transform)) =
                hitbox_query.get_mut(hitbox_entity)
            else {
                continue;
            };
            let Ok((target, target_team, invuln, target_transform)) =
                target_query.get(target_entity)
            else {
                continue;
            };

            if hitbox_team == target_team
                || hitbox.owner == target
                || hitbox.hit_entities.contains(&target)
                || invuln.is_invulnerable()
            {
                continue;
            }

            hitbox.hit_entities.push(target);

            // Push from hitbox to target, defaulting right when overlapping exactly
            let dir = (target_transform.translation.truncate()
                - hitbox_transform.translation.truncate())
            .normalize_or(Vec2::X);

            damage_events.write(DamageEvent {
                source: hitbox.owner,
                target,
                amount: hitbox.damage,
                knockback: dir * hitbox.knockback,
                kind: DamageKind::Hit,
            });
        }
    }
}

/// Route damage into the boss encounter or the player's health.
/// Boss damage is applied before the hit is counted, so a lethal blow
/// always dies through health first.
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_damage(
    mut damage_events: MessageReader<DamageEvent>,
    mut boss_query: Query<(&mut Encounter, &mut PhaseMachine), (With<Boss>, Without<Player>)>,
    mut player_query: Query<
        (
            &mut Health,
            &mut Invulnerable,
            &mut MovementState,
            &mut LinearVelocity,
        ),
        (With<Player>, Without<Boss>),
    >,
    mut damage_taken_events: MessageWriter<DamageTakenEvent>,
    mut death_events: MessageWriter<BossDeathEvent>,
    mut transition_events: MessageWriter<PhaseTransitionStartedEvent>,
    mut phase_changed_events: MessageWriter<PhaseChangedEvent>,
    mut defeated_events: MessageWriter<PlayerDefeatedEvent>,
) {
    for event in damage_events.read() {
        if let Ok((mut encounter, mut phases)) = boss_query.get_mut(event.target) {
            let boss = event.target;
            let Some(outcome) = encounter.take_damage(event.amount) else {
                continue;
            };
            damage_taken_events.write(DamageTakenEvent {
                boss,
                amount: outcome.applied,
            });
            if outcome.died {
                info!("Boss {:?} died from damage", boss);
                death_events.write(BossDeathEvent { boss });
                continue;
            }

            match phases.record_hit() {
                HitOutcome::AdvanceTriggered => {
                    info!("Boss {:?} transitioning to phase 2", boss);
                    transition_events.write(PhaseTransitionStartedEvent { boss });
                    phase_changed_events.write(PhaseChangedEvent {
                        boss,
                        phase: Phase::Transitioning,
                    });
                }
                HitOutcome::KillThresholdReached => {
                    if let Some(kill) = encounter.kill() {
                        damage_taken_events.write(DamageTakenEvent {
                            boss,
                            amount: kill.applied,
                        });
                        if kill.died {
                            info!("Boss {:?} died from phase 2 hit count", boss);
                            death_events.write(BossDeathEvent { boss });
                        }
                    }
                }
                HitOutcome::Counted | HitOutcome::Ignored => {}
            }
            continue;
        }

        if let Ok((mut health, mut invuln, mut movement, mut velocity)) =
            player_query.get_mut(event.target)
        {
            if !damage_player(
                &mut health,
                &mut invuln,
                event.amount,
                event.kind,
                PLAYER_IFRAMES,
            ) {
                continue;
            }

            if event.kind == DamageKind::Hit && event.knockback != Vec2::ZERO {
                velocity.x += event.knockback.x;
                velocity.y += event.knockback.y.max(MIN_VERTICAL_KNOCKBACK);
                velocity.0 = velocity.0.clamp_length_max(MAX_KNOCKBACK_VELOCITY);
                movement.stagger(PLAYER_HITSTUN);
            }

            debug!(
                "Player took {:.1} damage, {:.1} left",
                event.amount, health.current
            );

            if health.is_dead() {
                defeated_events.write(PlayerDefeatedEvent {
                    player: event.target,
                });
            }
        }
    }
}

/// Tear down everything the boss was running once it dies.
#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_boss_death(
    mut commands: Commands,
    time: Res<Time>,
    catalog: Res<PrefabCatalog>,
    mut death_events: MessageReader<BossDeathEvent>,
    mut boss_query: Query<
        (
            &mut PhaseMachine,
            &mut LaserEmitter,
            &mut EnergyEconomy,
            &mut CloneRoster,
            &mut LinearVelocity,
            &mut Sprite,
        ),
        With<Boss>,
    >,
    mut phase_changed_events: MessageWriter<PhaseChangedEvent>,
    mut window_closed_events: MessageWriter<TorchWindowClosedEvent>,
    mut clone_destroyed_events: MessageWriter<CloneDestroyedEvent>,
) {
    let now = time.elapsed_secs();

    for event in death_events.read() {
        let boss = event.boss;
        let Ok((mut phases, mut laser, mut economy, mut clones, mut velocity, mut sprite)) =
            boss_query.get_mut(boss)
        else {
            continue;
        };

        if phases.stop_all_phases() {
            phase_changed_events.write(PhaseChangedEvent {
                boss,
                phase: Phase::Dead,
            });
        }

        // The fade still runs so the end of the beam is announced
        laser.stop();

        if economy.close_torch_window() {
            window_closed_events.write(TorchWindowClosedEvent { boss });
        }
        economy.set_ambient_heating(false);

        let mut factory = CommandsFactory::new(&mut commands, &catalog, now);
        for clone in clones.clear_all_clones(&mut factory) {
            clone_destroyed_events.write(CloneDestroyedEvent { boss, clone });
        }

        velocity.0 = Vec2::ZERO;
        sprite.color = Color::srgba(0.3, 0.3, 0.3, 0.6);
    }
}

// ---------------------------------------------------------------------------
// Phase loops and abilities
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub(crate) fn run_phase_loops(
    mut commands: Commands,
    time: Res<Time>,
    catalog: Res<PrefabCatalog>,
    mut rng: ResMut<EncounterRng>,
    player_query: Query<&Transform, With<Player>>,
    mut boss_query: Query<
        (
            Entity,
            &Transform,
            &mut PhaseMachine,
            &mut AttackActionSet,
            &mut LaserEmitter,
            &mut EnergyEconomy,
        ),
        With<Boss>,
    >,
    mut phase_changed_events: MessageWriter<PhaseChangedEvent>,
    mut phase2_events: MessageWriter<Phase2StartedEvent>,
    mut transition_done_events: MessageWriter<PhaseTransitionCompletedEvent>,
    mut ability_events: MessageWriter<AbilityUsedEvent>,
    mut laser_started_events: MessageWriter<LaserStartedEvent>,
    mut window_opened_events: MessageWriter<TorchWindowOpenedEvent>,
) {
    let dt = time.delta_secs();
    let now = time.elapsed_secs();
    let player_pos = player_query.iter().next().map(|t| t.translation.truncate());

    for (boss, transform, mut phases, mut attacks, mut laser, mut economy) in &mut boss_query {
        let Some(action) = phases.tick(dt, &mut rng.0) else {
            continue;
        };

        let origin = transform.translation.truncate();
        // Snapshot of the player at call time; aim straight down without one
        let target = player_pos.unwrap_or(origin - Vec2::Y);
        let phase = phases.phase();
        let mut factory = CommandsFactory::new(&mut commands, &catalog, now);

        match action {
            PhaseAction::Attack(Phase1Attack::Volley) => {
                let headings = attacks.volley_headings(target - origin);
                if attacks.spawn_bullets(now, boss, origin, &headings, &mut factory) > 0 {
                    debug!("Boss {:?} fired a volley", boss);
                    ability_events.write(AbilityUsedEvent {
                        boss,
                        ability: AbilityKind::Bullet,
                    });
                }
            }
            PhaseAction::Attack(Phase1Attack::Grenade) => {
                if attacks
                    .spawn_grenade(now, boss, origin, target, &mut factory)
                    .is_some()
                {
                    debug!("Boss {:?} lobbed a grenade", boss);
                    ability_events.write(AbilityUsedEvent {
                        boss,
                        ability: AbilityKind::Grenade,
                    });
                }
            }
            PhaseAction::Attack(Phase1Attack::Summon) | PhaseAction::Channel(ChannelSkill::Kindle) => {
                if !economy.can_open_torch_window(now) {
                    debug!("Boss {:?} torch window is open or cooling down", boss);
                } else if economy.open_torch_window(now) {
                    info!("Boss {:?} opened the torch window in {:?}", boss, phase);
                    window_opened_events.write(TorchWindowOpenedEvent { boss, phase });
                }
            }
            PhaseAction::SpinShot { angle_degrees } => {
                let heading = heading_from_degrees(angle_degrees);
                if attacks.spawn_bullets(now, boss, origin, &[heading], &mut factory) > 0 {
                    ability_events.write(AbilityUsedEvent {
                        boss,
                        ability: AbilityKind::Bullet,
                    });
                }
            }
            PhaseAction::Channel(ChannelSkill::HomingBeam) => {
                if attacks.execute_homing_laser(now, &mut laser, &economy.pool, phase, origin, target)
                {
                    info!("Boss {:?} started a homing beam", boss);
                    laser_started_events.write(LaserStartedEvent {
                        boss,
                        kind: LaserKind::Homing,
                    });
                    ability_events.write(AbilityUsedEvent {
                        boss,
                        ability: AbilityKind::HomingLaser,
                    });
                }
            }
            PhaseAction::Channel(ChannelSkill::ScytheSweep) => {
                if attacks.execute_scythe_sweep(now, &mut laser, &economy.pool, phase, origin, target)
                {
                    info!("Boss {:?} started a scythe sweep", boss);
                    laser_started_events.write(LaserStartedEvent {
                        boss,
                        kind: LaserKind::Sweep,
                    });
                    ability_events.write(AbilityUsedEvent {
                        boss,
                        ability: AbilityKind::ScytheSweep,
                    });
                }
            }
            PhaseAction::TransitionCompleted => {
                info!("Boss {:?} entering phase 2", boss);
                transition_done_events.write(PhaseTransitionCompletedEvent { boss });
                phase2_events.write(Phase2StartedEvent { boss });
                phase_changed_events.write(PhaseChangedEvent {
                    boss,
                    phase: Phase::Phase2,
                });
            }
        }
    }
}

pub(crate) fn tick_lasers(
    time: Res<Time>,
    spatial: SpatialQuery,
    player_query: Query<&Transform, With<Player>>,
    mut boss_query: Query<(Entity, &Transform, &mut LaserEmitter, &mut EnergyEconomy), With<Boss>>,
    mut ground_events: MessageWriter<LaserHitGroundEvent>,
    mut player_hit_events: MessageWriter<LaserHitPlayerEvent>,
    mut ended_events: MessageWriter<LaserEndedEvent>,
    mut damage_events: MessageWriter<DamageEvent>,
) {
    let dt = time.delta_secs();
    let player_pos = player_query.iter().next().map(|t| t.translation.truncate());
    let probe = PhysicsBeamProbe { spatial: &spatial };

    for (boss, transform, mut laser, mut economy) in &mut boss_query {
        if !laser.is_active() {
            continue;
        }

        let origin = transform.translation.truncate();
        let report = laser.tick(dt, origin, player_pos, &probe, &mut economy.pool);

        if let Some(point) = report.ground_point {
            ground_events.write(LaserHitGroundEvent { boss, point });
        }
        if let Some((target, damage)) = report.player_hit {
            player_hit_events.write(LaserHitPlayerEvent {
                boss,
                target,
                damage,
            });
            damage_events.write(DamageEvent {
                source: boss,
                target,
                amount: damage,
                knockback: Vec2::ZERO,
                kind: DamageKind::Sustained,
            });
        }
        if let Some(kind) = report.ended {
            info!("Boss {:?} {:?} beam ended", boss, kind);
            ended_events.write(LaserEndedEvent { boss, kind });
        }
    }
}

// ---------------------------------------------------------------------------
// Energy economy and clones
// ---------------------------------------------------------------------------

pub(crate) fn tick_energy_economy(
    time: Res<Time>,
    mut boss_query: Query<(Entity, &mut EnergyEconomy), With<Boss>>,
    mut window_closed_events: MessageWriter<TorchWindowClosedEvent>,
    mut gained_events: MessageWriter<EnergyGainedEvent>,
    mut full_events: MessageWriter<EnergyFullEvent>,
) {
    let dt = time.delta_secs();

    for (boss, mut economy) in &mut boss_query {
        let tick = economy.tick(dt);

        if tick.window_timed_out {
            info!("Boss {:?} torch window timed out", boss);
            window_closed_events.write(TorchWindowClosedEvent { boss });
        }
        if tick.ambient_gained > 0.0 {
            gained_events.write(EnergyGainedEvent {
                boss,
                amount: tick.ambient_gained,
            });
        }
        if tick.became_full {
            full_events.write(EnergyFullEvent { boss });
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_torch_ignitions(
    mut commands: Commands,
    time: Res<Time>,
    catalog: Res<PrefabCatalog>,
    mut ignited_events: MessageReader<TorchIgnitedEvent>,
    mut boss_query: Query<(&Transform, &mut EnergyEconomy, &mut CloneRoster), With<Boss>>,
    mut gained_events: MessageWriter<EnergyGainedEvent>,
    mut full_events: MessageWriter<EnergyFullEvent>,
    mut clone_created_events: MessageWriter<CloneCreatedEvent>,
) {
    let now = time.elapsed_secs();

    for event in ignited_events.read() {
        let boss = event.boss;
        let Ok((transform, mut economy, mut clones)) = boss_query.get_mut(boss) else {
            continue;
        };
        let Some(outcome) = economy.handle_torch_ignited(now) else {
            continue;
        };

        debug!(
            "Boss {:?} gained {:.1} energy from torch {:?}",
            boss, outcome.gained, event.torch
        );
        if outcome.gained > 0.0 {
            gained_events.write(EnergyGainedEvent {
                boss,
                amount: outcome.gained,
            });
        }
        if outcome.became_full {
            full_events.write(EnergyFullEvent { boss });
        }
        if !outcome.saturated {
            continue;
        }

        let mut factory = CommandsFactory::new(&mut commands, &catalog, now);
        let rotation = transform.rotation.to_euler(EulerRot::XYZ).2;
        if let Some(clone) = clones.create_clone(
            boss,
            transform.translation.truncate(),
            rotation,
            &mut economy.pool,
            &mut factory,
        ) {
            info!(
                "Boss {:?} spawned clone {:?} ({}/{})",
                boss,
                clone,
                clones.active_clones(),
                clones.max_clones
            );
            clone_created_events.write(CloneCreatedEvent { boss, clone });
        }
    }
}

/// Expire clones on their own timers and drop any destroyed elsewhere.
pub(crate) fn expire_clones(
    mut commands: Commands,
    time: Res<Time>,
    mut removed_clones: RemovedComponents<BossClone>,
    mut clone_query: Query<(Entity, &mut BossClone)>,
    mut roster_query: Query<(Entity, &mut CloneRoster), With<Boss>>,
    mut destroyed_events: MessageWriter<CloneDestroyedEvent>,
) {
    let dt = time.delta_secs();

    for (clone, mut state) in &mut clone_query {
        if !state.tick(dt) {
            continue;
        }
        commands.entity(clone).despawn();
        if let Ok((boss, mut roster)) = roster_query.get_mut(state.owner)
            && roster.release(clone)
        {
            info!(
                "Clone {:?} of boss {:?} expired after {:.1}s (spawned at {:.1})",
                clone, boss, state.lifetime, state.spawned_at
            );
            destroyed_events.write(CloneDestroyedEvent { boss, clone });
        }
    }

    // Clones already released above were forgotten, so this only
    // catches ones despawned by something else
    for clone in removed_clones.read() {
        for (boss, mut roster) in &mut roster_query {
            if roster.release(clone) {
                destroyed_events.write(CloneDestroyedEvent { boss, clone });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Projectiles, hitboxes and visuals
// ---------------------------------------------------------------------------

pub(crate) fn move_projectiles(time: Res<Time>, mut query: Query<(&mut Transform, &mut Projectile)>) {
    let dt = time.delta_secs();
    for (mut transform, mut projectile) in &mut query {
        projectile.velocity.y -= projectile.gravity * dt;
        transform.translation.x += projectile.velocity.x * dt;
        transform.translation.y += projectile.velocity.y * dt;
    }
}

pub(crate) fn detonate_grenades(
    mut commands: Commands,
    time: Res<Time>,
    catalog: Res<PrefabCatalog>,
    abilities: Res<AbilityTuning>,
    mut query: Query<(Entity, &Transform, &mut Grenade)>,
) {
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    for (entity, transform, mut grenade) in &mut query {
        if !grenade.tick(dt) {
            continue;
        }

        let mut factory = CommandsFactory::new(&mut commands, &catalog, now);
        let request = SpawnRequest::new(
            SpawnKind::Explosion,
            grenade.owner,
            transform.translation.truncate(),
        )
        .with_lifetime(abilities.explosion_lifetime);
        factory.spawn(request);
        factory.despawn(entity);
        debug!("Grenade {:?} exploded", entity);
    }
}

pub(crate) fn cleanup_expired_hitboxes(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut HitboxLifetime)>,
) {
    let dt = time.delta_secs();
    for (entity, mut lifetime) in &mut query {
        lifetime.0 -= dt;
        if lifetime.0 <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Stretch a sprite along each live beam, fading with the emitter.
pub(crate) fn update_laser_visuals(
    mut commands: Commands,
    boss_query: Query<(Entity, &LaserEmitter), With<Boss>>,
    mut visual_query: Query<(Entity, &LaserBeamVisual, &mut Transform, &mut Sprite)>,
) {
    for (boss, laser) in &boss_query {
        let Some(beam) = laser.beam() else {
            continue;
        };
        let [r, g, b, a] = beam.color;
        let color = Color::srgba(r, g, b, a * laser.fade_alpha());
        let size = Vec2::new(beam.length(), beam.width);
        let midpoint = (beam.origin + beam.end) * 0.5;
        let transform = Transform::from_xyz(midpoint.x, midpoint.y, 3.0).with_rotation(
            Quat::from_rotation_z(beam.direction.y.atan2(beam.direction.x)),
        );

        let existing = visual_query
            .iter_mut()
            .find(|(_, visual, _, _)| visual.owner == boss);
        match existing {
            Some((_, _, mut visual_transform, mut sprite)) => {
                *visual_transform = transform;
                sprite.color = color;
                sprite.custom_size = Some(size);
            }
            None => {
                commands.spawn((
                    LaserBeamVisual { owner: boss },
                    Sprite {
                        color,
                        custom_size: Some(size),
                        ..default()
                    },
                    transform,
                ));
            }
        }
    }

    for (entity, visual, _, _) in &visual_query {
        let released = boss_query
            .get(visual.owner)
            .map(|(_, laser)| laser.beam().is_none())
            .unwrap_or(true);
        if released {
            commands.entity(entity).despawn();
        }
    }
}
