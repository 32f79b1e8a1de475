//! Combat domain: tests for the encounter logic, independent of any App.

use super::*;
use bevy::prelude::*;

use crate::combat::attacks::*;
use crate::combat::clones::*;
use crate::combat::components::*;
use crate::combat::encounter::*;
use crate::combat::energy::*;
use crate::combat::laser::*;
use crate::combat::phases::*;
use crate::combat::resources::*;
use crate::combat::torches::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// Test doubles
// ============================================================================

/// Factory that hands out real entity ids and remembers every call.
#[derive(Default)]
struct RecordingFactory {
    world: World,
    spawned: Vec<SpawnRequest>,
    despawned: Vec<Entity>,
    refuse: bool,
}

impl RecordingFactory {
    fn refusing() -> Self {
        Self {
            refuse: true,
            ..default()
        }
    }

    fn count(&self, kind: SpawnKind) -> usize {
        self.spawned.iter().filter(|r| r.kind == kind).count()
    }
}

impl EntityFactory for RecordingFactory {
    fn spawn(&mut self, request: SpawnRequest) -> Option<Entity> {
        if self.refuse {
            return None;
        }
        self.spawned.push(request);
        Some(self.world.spawn_empty().id())
    }

    fn despawn(&mut self, entity: Entity) {
        self.despawned.push(entity);
    }
}

/// Probe with fixed answers. Ground beyond the cast distance is ignored.
#[derive(Default)]
struct FakeProbe {
    ground: Option<f32>,
    player: Option<Entity>,
}

impl BeamProbe for FakeProbe {
    fn ground_hit(&self, _origin: Vec2, _direction: Vec2, max_distance: f32) -> Option<f32> {
        self.ground.filter(|d| *d <= max_distance)
    }

    fn player_hit(&self, _origin: Vec2, _direction: Vec2, _max_distance: f32) -> Option<Entity> {
        self.player
    }
}

fn test_entity() -> Entity {
    World::new().spawn_empty().id()
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(0xC1DE)
}

fn degrees(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

fn pool_with(current: f32) -> EnergyPool {
    let mut pool = EnergyPool::new(100.0);
    pool.set(current);
    pool
}

// ============================================================================
// Encounter core
// ============================================================================

#[test]
fn take_damage_clamps_to_zero_for_any_amount() {
    let mut rng = rng();
    for _ in 0..200 {
        let max = rng.random_range(1.0..500.0);
        let before = rng.random_range(0.0..=max);
        let amount = rng.random_range(0.0..1000.0);

        let mut health = Health::new(max);
        health.current = before;
        health.take_damage(amount);

        assert_eq!(health.current, (before - amount).max(0.0));
        assert!(health.current >= 0.0 && health.current <= health.max);
    }
}

#[test]
fn death_fires_once_over_lifetime() {
    let mut encounter = Encounter::new(30.0);
    let mut deaths = 0;

    for _ in 0..10 {
        if let Some(outcome) = encounter.take_damage(7.0)
            && outcome.died
        {
            deaths += 1;
        }
    }

    assert_eq!(deaths, 1);
    assert!(encounter.is_dead());
    assert_eq!(encounter.health.current, 0.0);
}

#[test]
fn lethal_overkill_then_noop() {
    // max 1000, current 50, TakeDamage(120)
    let mut encounter = Encounter::new(1000.0);
    encounter.take_damage(950.0);
    assert_eq!(encounter.health.current, 50.0);

    let outcome = encounter.take_damage(120.0).expect("alive before the blow");
    assert_eq!(encounter.health.current, 0.0);
    assert!(outcome.died);
    assert_eq!(outcome.applied, 50.0);

    assert_eq!(encounter.take_damage(10.0), None);
    assert_eq!(encounter.health.current, 0.0);
}

#[test]
fn kill_drains_remaining_health_once() {
    let mut encounter = Encounter::new(400.0);
    encounter.take_damage(100.0);

    let kill = encounter.kill().expect("alive");
    assert_eq!(kill.applied, 300.0);
    assert!(kill.died);
    assert_eq!(encounter.kill(), None);
}

#[test]
fn death_clears_detection_and_aggro() {
    let senses = SensesTuning::default();
    let mut encounter = Encounter::new(10.0);
    encounter.apply_scan(
        Some(PlayerSighting {
            distance: 100.0,
            line_of_sight: true,
        }),
        &senses,
    );
    assert!(encounter.is_aggro());

    encounter.take_damage(10.0);
    assert!(!encounter.is_detected());
    assert!(!encounter.is_aggro());

    let edges = encounter.apply_scan(
        Some(PlayerSighting {
            distance: 100.0,
            line_of_sight: true,
        }),
        &senses,
    );
    assert!(edges.is_empty());
}

#[test]
fn scan_is_edge_triggered() {
    let senses = SensesTuning::default();
    let mut encounter = Encounter::new(100.0);
    let close = Some(PlayerSighting {
        distance: senses.aggro_radius - 1.0,
        line_of_sight: true,
    });

    let edges = encounter.apply_scan(close, &senses);
    assert_eq!(edges.detected, Some(true));
    assert_eq!(edges.aggro, Some(true));

    assert!(encounter.apply_scan(close, &senses).is_empty());

    let edges = encounter.apply_scan(None, &senses);
    assert_eq!(edges.detected, Some(false));
    assert_eq!(edges.aggro, Some(false));
}

#[test]
fn detection_without_aggro_between_radii() {
    let senses = SensesTuning::default();
    let mut encounter = Encounter::new(100.0);
    let between = (senses.aggro_radius + senses.detection_radius) * 0.5;

    let edges = encounter.apply_scan(
        Some(PlayerSighting {
            distance: between,
            line_of_sight: true,
        }),
        &senses,
    );

    assert_eq!(edges.detected, Some(true));
    assert_eq!(edges.aggro, None);
    assert!(!encounter.is_aggro());
}

#[test]
fn blocked_sight_fails_closed_when_required() {
    let mut senses = SensesTuning::default();
    let blocked = Some(PlayerSighting {
        distance: 10.0,
        line_of_sight: false,
    });

    let mut encounter = Encounter::new(100.0);
    assert!(encounter.apply_scan(blocked, &senses).is_empty());
    assert!(!encounter.is_detected());

    senses.require_line_of_sight = false;
    assert_eq!(encounter.apply_scan(blocked, &senses).aggro, Some(true));
}

#[test]
fn sense_timer_fires_on_interval() {
    let mut timer = SenseTimer::default();
    assert!(!timer.tick(0.06, 0.1));
    assert!(timer.tick(0.06, 0.1));
    assert!(!timer.tick(0.06, 0.1));
}

#[test]
fn hover_holds_the_distance_band() {
    let tuning = HoverTuning::default();
    let boss = Vec2::ZERO;

    // Too far: accelerate toward the player
    let far = Vec2::new(tuning.preferred_distance * 3.0, 0.0);
    let v = hover_velocity(boss, far, Vec2::ZERO, &tuning, 0.1);
    assert!(v.x > 0.0);
    assert!((v.length() - tuning.acceleration * 0.1).abs() < 1e-3);

    // Too close: back away
    let near = Vec2::new(10.0, 0.0);
    assert!(hover_velocity(boss, near, Vec2::ZERO, &tuning, 0.1).x < 0.0);

    // Inside the band: brake at the deceleration rate
    let held = Vec2::new(tuning.preferred_distance, 0.0);
    let v = hover_velocity(boss, held, Vec2::new(100.0, 0.0), &tuning, 0.1);
    assert!((v.x - (100.0 - tuning.deceleration * 0.1)).abs() < 1e-3);
}

#[test]
fn hover_never_exceeds_max_speed() {
    let tuning = HoverTuning::default();
    let mut v = Vec2::ZERO;
    for _ in 0..100 {
        v = hover_velocity(Vec2::ZERO, Vec2::new(5000.0, 0.0), v, &tuning, 0.05);
        assert!(v.length() <= tuning.max_speed + 1e-3);
    }
    assert!((v.length() - tuning.max_speed).abs() < 1e-3);

    for _ in 0..100 {
        v = brake_velocity(v, &tuning, 0.05);
    }
    assert_eq!(v, Vec2::ZERO);
}

#[test]
fn held_beam_deals_its_full_damage_per_second() {
    let mut health = Health::new(200.0);
    let mut invuln = Invulnerable::default();
    let dps = LaserTuning::default().phase2.homing.damage_per_second;
    let dt = 1.0 / 60.0;

    for _ in 0..180 {
        invuln.timer -= dt;
        assert!(damage_player(&mut health, &mut invuln, dps * dt, DamageKind::Sustained, 0.6));
    }

    assert!((health.current - (200.0 - dps * 3.0)).abs() < 1e-2);
    assert!(!invuln.is_invulnerable());
}

#[test]
fn discrete_hits_grant_invulnerability_that_blocks_beams_too() {
    let mut health = Health::new(100.0);
    let mut invuln = Invulnerable::default();

    assert!(damage_player(&mut health, &mut invuln, 10.0, DamageKind::Hit, 0.6));
    assert_eq!(invuln.timer, 0.6);
    assert!(!damage_player(&mut health, &mut invuln, 10.0, DamageKind::Hit, 0.6));
    assert!(!damage_player(&mut health, &mut invuln, 1.0, DamageKind::Sustained, 0.6));
    assert_eq!(health.current, 90.0);

    invuln.timer = 0.0;
    health.take_damage(90.0);
    assert!(!damage_player(&mut health, &mut invuln, 1.0, DamageKind::Sustained, 0.6));
}

#[test]
fn arena_confinement_stops_outward_motion_only() {
    let min = Vec2::new(-100.0, -50.0);
    let max = Vec2::new(100.0, 50.0);

    let (pos, vel) = confine_to_arena(Vec2::new(130.0, 60.0), Vec2::new(40.0, -20.0), min, max);
    assert_eq!(pos, Vec2::new(100.0, 50.0));
    assert_eq!(vel, Vec2::new(0.0, -20.0));

    let (pos, vel) = confine_to_arena(Vec2::new(-120.0, 0.0), Vec2::new(30.0, 10.0), min, max);
    assert_eq!(pos, Vec2::new(-100.0, 0.0));
    assert_eq!(vel, Vec2::new(30.0, 10.0));

    let inside = Vec2::new(10.0, 10.0);
    assert_eq!(
        confine_to_arena(inside, Vec2::splat(5.0), min, max),
        (inside, Vec2::splat(5.0))
    );
}

#[test]
fn strike_aims_at_a_nearby_boss_and_falls_back_to_facing() {
    let player = Vec2::ZERO;
    let heading = strike_heading(player, 1.0, Some(Vec2::new(0.0, 200.0)), 300.0);
    assert!((heading - Vec2::Y).length() < 1e-5);

    assert_eq!(strike_heading(player, -1.0, Some(Vec2::new(500.0, 0.0)), 300.0), Vec2::NEG_X);
    assert_eq!(strike_heading(player, 1.0, None, 300.0), Vec2::X);
    assert_eq!(strike_heading(player, -1.0, Some(player), 300.0), Vec2::NEG_X);
}

#[test]
fn thrown_strike_reaches_the_hovering_boss_with_default_tuning() {
    let hover = HoverTuning::default();
    let strike = StrikeTuning::default();
    let (arena_min, arena_max) = hover.arena();
    let bolt_range = strike.reach + strike.bolt_speed * strike.duration;
    let dt = 1.0 / 60.0;

    // Floor, side platform, jump apex near the wall, and the far corner
    let standpoints = [
        Vec2::new(-420.0, -160.0),
        Vec2::new(-250.0, -110.0),
        Vec2::new(620.0, -24.0),
        Vec2::new(-660.0, -160.0),
    ];

    for player in standpoints {
        let mut boss = Vec2::new(300.0, 80.0);
        let mut velocity = Vec2::ZERO;

        for frame in 0..1800 {
            let desired = hover_velocity(boss, player, velocity, &hover, dt);
            (boss, velocity) = confine_to_arena(boss + desired * dt, desired, arena_min, arena_max);

            assert!(boss.cmpge(arena_min).all() && boss.cmple(arena_max).all());

            // Once the boss has settled, every frame is a strike opportunity
            if frame >= 600 {
                let distance = boss.distance(player);
                assert!(
                    distance <= strike.lock_on_range,
                    "boss at {boss:?} is {distance} from {player:?}"
                );
                assert!(bolt_range >= distance);
                let heading = strike_heading(player, 1.0, Some(boss), strike.lock_on_range);
                assert!((player + heading * distance).distance(boss) < 0.5);
            }
        }
    }
}

// ============================================================================
// Phase state machine
// ============================================================================

fn phase_tuning() -> PhaseTuning {
    PhaseTuning {
        phase1_hits_to_advance: 3,
        phase2_hits_to_kill: 2,
        ..default()
    }
}

#[test]
fn three_hits_transition_then_phase2() {
    let tuning = phase_tuning();
    let mut rng = rng();
    let mut phases = PhaseMachine::new(tuning.clone());
    assert!(phases.start_phase1(&mut rng));

    assert_eq!(phases.record_hit(), HitOutcome::Counted);
    assert_eq!(phases.record_hit(), HitOutcome::Counted);
    assert_eq!(phases.record_hit(), HitOutcome::AdvanceTriggered);
    assert_eq!(phases.phase(), Phase::Transitioning);
    assert!(phases.is_transitioning());

    let action = phases.tick(tuning.transition_duration, &mut rng);
    assert_eq!(action, Some(PhaseAction::TransitionCompleted));
    assert_eq!(phases.phase(), Phase::Phase2);
    assert_eq!(phases.phase2_hits(), 0);
    assert!(!phases.is_transitioning());
}

#[test]
fn hits_during_transition_do_not_retrigger() {
    let tuning = phase_tuning();
    let mut rng = rng();
    let mut phases = PhaseMachine::new(tuning.clone());
    phases.start_phase1(&mut rng);
    for _ in 0..3 {
        phases.record_hit();
    }

    for _ in 0..5 {
        assert_eq!(phases.record_hit(), HitOutcome::Ignored);
        assert!(!phases.advance_to_next_phase());
    }
    assert_eq!(phases.phase1_hits(), 3);

    // Transition timer was not restarted by the extra hits
    let action = phases.tick(tuning.transition_duration, &mut rng);
    assert_eq!(action, Some(PhaseAction::TransitionCompleted));
}

#[test]
fn phase_entry_guards() {
    let mut rng = rng();
    let mut phases = PhaseMachine::new(phase_tuning());

    assert!(!phases.start_phase2());
    assert!(phases.start_phase1(&mut rng));
    assert!(!phases.start_phase1(&mut rng));
    assert!(!phases.start_phase2());

    for _ in 0..3 {
        phases.record_hit();
    }
    phases.tick(10.0, &mut rng);
    assert_eq!(phases.phase(), Phase::Phase2);
    assert!(!phases.start_phase2());
    assert!(!phases.start_phase1(&mut rng));
}

#[test]
fn phase2_kill_threshold_reports_once() {
    let tuning = phase_tuning();
    let mut rng = rng();
    let mut phases = PhaseMachine::new(tuning);
    phases.start_phase1(&mut rng);
    for _ in 0..3 {
        phases.record_hit();
    }
    phases.tick(10.0, &mut rng);

    assert_eq!(phases.record_hit(), HitOutcome::Counted);
    assert_eq!(phases.record_hit(), HitOutcome::KillThresholdReached);
    assert_eq!(phases.record_hit(), HitOutcome::Ignored);
    assert_eq!(phases.phase2_hits(), 2);
}

#[test]
fn hit_count_death_goes_through_encounter_once() {
    let mut rng = rng();
    let mut encounter = Encounter::new(500.0);
    let mut phases = PhaseMachine::new(phase_tuning());
    phases.start_phase1(&mut rng);
    for _ in 0..3 {
        phases.record_hit();
    }
    phases.tick(10.0, &mut rng);

    let mut deaths = 0;
    for _ in 0..4 {
        let Some(outcome) = encounter.take_damage(1.0) else {
            continue;
        };
        if outcome.died {
            deaths += 1;
            continue;
        }
        if phases.record_hit() == HitOutcome::KillThresholdReached
            && encounter.kill().is_some_and(|kill| kill.died)
        {
            deaths += 1;
        }
    }

    assert_eq!(deaths, 1);
    assert!(encounter.is_dead());
}

#[test]
fn stop_all_phases_is_idempotent() {
    let mut rng = rng();
    let mut phases = PhaseMachine::new(phase_tuning());
    phases.start_phase1(&mut rng);

    assert!(phases.stop_all_phases());
    assert!(!phases.stop_all_phases());
    assert_eq!(phases.phase(), Phase::Dead);
    assert_eq!(phases.record_hit(), HitOutcome::Ignored);
    assert_eq!(phases.tick(5.0, &mut rng), None);
}

#[test]
fn stop_during_transition_cancels_phase2() {
    let tuning = phase_tuning();
    let mut rng = rng();
    let mut phases = PhaseMachine::new(tuning.clone());
    phases.start_phase1(&mut rng);
    for _ in 0..3 {
        phases.record_hit();
    }

    phases.stop_all_phases();
    assert!(!phases.is_transitioning());
    assert_eq!(phases.tick(tuning.transition_duration * 2.0, &mut rng), None);
    assert_eq!(phases.phase(), Phase::Dead);
}

#[test]
fn dormant_machine_does_nothing() {
    let mut rng = rng();
    let mut phases = PhaseMachine::new(phase_tuning());
    assert_eq!(phases.phase(), Phase::Dormant);
    assert_eq!(phases.record_hit(), HitOutcome::Ignored);
    assert_eq!(phases.tick(10.0, &mut rng), None);
}

#[test]
fn phase1_attacks_after_random_wait() {
    let tuning = PhaseTuning {
        phase1_attack_interval: (0.5, 1.0),
        ..default()
    };
    let mut rng = rng();

    for _ in 0..20 {
        let mut phases = PhaseMachine::new(tuning.clone());
        phases.start_phase1(&mut rng);

        let mut elapsed = 0.0;
        let attack = loop {
            elapsed += 0.05;
            if let Some(action) = phases.tick(0.05, &mut rng) {
                break action;
            }
            assert!(elapsed < 2.0, "no attack picked");
        };

        assert!(matches!(attack, PhaseAction::Attack(_)));
        assert!(elapsed >= 0.5 - 1e-3 && elapsed <= 1.05 + 1e-3);
    }
}

#[test]
fn phase1_picks_every_attack_kind() {
    let mut rng = rng();
    let mut phases = PhaseMachine::new(PhaseTuning::default());
    phases.start_phase1(&mut rng);

    let mut seen = Vec::new();
    for _ in 0..5000 {
        if let Some(PhaseAction::Attack(attack)) = phases.tick(0.1, &mut rng)
            && !seen.contains(&attack)
        {
            seen.push(attack);
        }
    }

    assert_eq!(seen.len(), Phase1Attack::ALL.len());
}

#[test]
fn phase2_spins_then_channels_then_repeats() {
    let tuning = PhaseTuning {
        phase1_hits_to_advance: 1,
        ..default()
    };
    let mut rng = rng();
    let mut phases = PhaseMachine::new(tuning.clone());
    phases.start_phase1(&mut rng);
    phases.record_hit();
    phases.tick(tuning.transition_duration, &mut rng);

    let mut angles = Vec::new();
    let channel = loop {
        match phases.tick(tuning.spin_shot_interval, &mut rng) {
            Some(PhaseAction::SpinShot { angle_degrees }) => angles.push(angle_degrees),
            Some(PhaseAction::Channel(skill)) => break skill,
            None => {}
            other => panic!("unexpected action {:?}", other),
        }
        assert!(angles.len() < 100, "spin burst never ended");
    };

    let expected = (tuning.spin_burst_duration / tuning.spin_shot_interval).round() as usize;
    assert!(angles.len().abs_diff(expected) <= 1);
    assert_eq!(angles[0], 0.0);
    for pair in angles.windows(2) {
        let step = (pair[1] - pair[0]).rem_euclid(360.0);
        assert!((step - tuning.spin_step_degrees).abs() < 1e-3);
    }
    assert!(ChannelSkill::ALL.contains(&channel));

    // Channel runs silently, then a fresh burst starts at angle zero
    let mut waited = 0.0;
    let next = loop {
        waited += 0.1;
        if let Some(action) = phases.tick(0.1, &mut rng) {
            break action;
        }
        assert!(waited < tuning.channel_duration + 1.0);
    };
    assert!(waited >= tuning.channel_duration - 0.2);
    assert_eq!(next, PhaseAction::SpinShot { angle_degrees: 0.0 });
}

#[test]
fn spin_shots_keep_their_cadence_at_sixty_fps() {
    let tuning = PhaseTuning {
        phase1_hits_to_advance: 1,
        ..default()
    };
    let mut rng = rng();
    let mut phases = PhaseMachine::new(tuning.clone());
    phases.start_phase1(&mut rng);
    phases.record_hit();
    phases.tick(tuning.transition_duration, &mut rng);

    let mut shots: usize = 0;
    for _ in 0..10_000 {
        match phases.tick(1.0 / 60.0, &mut rng) {
            Some(PhaseAction::SpinShot { .. }) => shots += 1,
            Some(PhaseAction::Channel(_)) => break,
            _ => {}
        }
    }

    let expected = (tuning.spin_burst_duration / tuning.spin_shot_interval).round() as usize;
    assert!(shots.abs_diff(expected) <= 1, "{shots} shots, expected {expected}");
}

// ============================================================================
// Attack action set
// ============================================================================

#[test]
fn bullets_within_cooldown_spawn_once() {
    let owner = test_entity();
    let mut factory = RecordingFactory::default();
    let mut attacks = AttackActionSet::new(AbilityTuning::default());

    assert_eq!(attacks.spawn_bullets(0.0, owner, Vec2::ZERO, &[Vec2::X], &mut factory), 1);
    assert_eq!(attacks.spawn_bullets(0.05, owner, Vec2::ZERO, &[Vec2::X], &mut factory), 0);

    assert_eq!(factory.count(SpawnKind::Bullet), 1);
    assert_eq!(attacks.bullet.last_used_at(), Some(0.0));

    assert_eq!(attacks.spawn_bullets(0.08, owner, Vec2::ZERO, &[Vec2::X], &mut factory), 1);
    assert_eq!(attacks.bullet.last_used_at(), Some(0.08));
}

#[test]
fn grenade_within_cooldown_spawns_once() {
    let owner = test_entity();
    let mut factory = RecordingFactory::default();
    let mut attacks = AttackActionSet::new(AbilityTuning::default());
    let target = Vec2::new(200.0, -100.0);

    assert!(attacks.spawn_grenade(1.0, owner, Vec2::ZERO, target, &mut factory).is_some());
    assert!(attacks.spawn_grenade(2.0, owner, Vec2::ZERO, target, &mut factory).is_none());

    assert_eq!(factory.count(SpawnKind::Grenade), 1);
    assert_eq!(attacks.grenade.last_used_at(), Some(1.0));
}

#[test]
fn grenade_arc_lands_on_snapshot_target() {
    let tuning = AbilityTuning::default();
    let mut factory = RecordingFactory::default();
    let mut attacks = AttackActionSet::new(tuning.clone());
    let origin = Vec2::new(50.0, 200.0);
    let target = Vec2::new(-150.0, -180.0);

    attacks.spawn_grenade(0.0, test_entity(), origin, target, &mut factory);
    let request = &factory.spawned[0];
    let t = tuning.grenade_flight_time;
    let landing = origin + request.velocity * t - Vec2::new(0.0, 0.5 * request.gravity * t * t);

    assert!(landing.distance(target) < 1e-2);
    assert_eq!(request.lifetime, tuning.grenade_fuse);
}

#[test]
fn homing_laser_cooldown_timeline() {
    // homingLaserCooldown = 2s: t=0 ok, t=1 rejected, t=2.01 ok
    let tuning = AbilityTuning {
        homing_laser_cooldown: 2.0,
        ..default()
    };
    let mut attacks = AttackActionSet::new(tuning);
    let mut laser = LaserEmitter::new(LaserTuning::default());
    let pool = pool_with(80.0);
    let target = Vec2::new(100.0, 0.0);

    assert!(attacks.execute_homing_laser(0.0, &mut laser, &pool, Phase::Phase2, Vec2::ZERO, target));
    laser.release();

    assert!(!attacks.execute_homing_laser(1.0, &mut laser, &pool, Phase::Phase2, Vec2::ZERO, target));
    assert!(!laser.is_active());
    assert_eq!(attacks.homing_laser.last_used_at(), Some(0.0));

    assert!(attacks.execute_homing_laser(2.01, &mut laser, &pool, Phase::Phase2, Vec2::ZERO, target));
    assert_eq!(attacks.homing_laser.last_used_at(), Some(2.01));
}

#[test]
fn scythe_sweep_within_cooldown_starts_once() {
    let mut attacks = AttackActionSet::new(AbilityTuning::default());
    let mut laser = LaserEmitter::new(LaserTuning::default());
    let pool = pool_with(80.0);

    assert!(attacks.execute_scythe_sweep(0.0, &mut laser, &pool, Phase::Phase2, Vec2::ZERO, Vec2::X));
    laser.release();
    assert!(!attacks.execute_scythe_sweep(1.0, &mut laser, &pool, Phase::Phase2, Vec2::ZERO, Vec2::X));

    assert!(!laser.is_active());
    assert_eq!(attacks.scythe_sweep.last_used_at(), Some(0.0));
}

#[test]
fn rejected_execution_records_no_cooldown() {
    let owner = test_entity();
    let mut attacks = AttackActionSet::new(AbilityTuning::default());

    // Factory without prefabs
    let mut refusing = RecordingFactory::refusing();
    assert_eq!(attacks.spawn_bullets(0.0, owner, Vec2::ZERO, &[Vec2::X], &mut refusing), 0);
    assert!(attacks.spawn_grenade(0.0, owner, Vec2::ZERO, Vec2::X, &mut refusing).is_none());
    assert_eq!(attacks.bullet.last_used_at(), None);
    assert_eq!(attacks.grenade.last_used_at(), None);

    // Laser busy or starved of energy
    let mut laser = LaserEmitter::new(LaserTuning::default());
    let starved = pool_with(1.0);
    assert!(!attacks.execute_homing_laser(0.0, &mut laser, &starved, Phase::Phase1, Vec2::ZERO, Vec2::X));
    assert_eq!(attacks.homing_laser.last_used_at(), None);

    let pool = pool_with(50.0);
    assert!(attacks.execute_homing_laser(0.0, &mut laser, &pool, Phase::Phase1, Vec2::ZERO, Vec2::X));
    assert!(!attacks.execute_scythe_sweep(0.0, &mut laser, &pool, Phase::Phase1, Vec2::ZERO, Vec2::X));
    assert_eq!(attacks.scythe_sweep.last_used_at(), None);
}

#[test]
fn volley_fans_around_aim() {
    let attacks = AttackActionSet::new(AbilityTuning {
        volley_count: 5,
        volley_spread_degrees: 40.0,
        ..default()
    });
    let headings = attacks.volley_headings(Vec2::Y);

    assert_eq!(headings.len(), 5);
    assert!((degrees(headings[0]) - 70.0).abs() < 1e-3);
    assert!((degrees(headings[2]) - 90.0).abs() < 1e-3);
    assert!((degrees(headings[4]) - 110.0).abs() < 1e-3);
}

#[test]
fn bullets_use_configured_speed_and_lifetime() {
    let tuning = AbilityTuning::default();
    let mut factory = RecordingFactory::default();
    let mut attacks = AttackActionSet::new(tuning.clone());
    let headings = [heading_from_degrees(90.0), heading_from_degrees(180.0)];

    attacks.spawn_bullets(0.0, test_entity(), Vec2::ZERO, &headings, &mut factory);

    assert_eq!(factory.spawned.len(), 2);
    for request in &factory.spawned {
        assert!((request.velocity.length() - tuning.bullet_speed).abs() < 1e-2);
        assert_eq!(request.lifetime, tuning.bullet_lifetime);
    }
    assert!((factory.spawned[0].rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
}

// ============================================================================
// Lasers
// ============================================================================

fn beam_start(phase: Phase, energy: f32) -> BeamStart {
    BeamStart {
        origin: Vec2::ZERO,
        aim: Vec2::X,
        phase,
        available_energy: energy,
    }
}

#[test]
fn laser_active_from_start_until_end() {
    let tuning = LaserTuning::default();
    let mut laser = LaserEmitter::new(tuning.clone());
    let mut pool = pool_with(100.0);
    let probe = FakeProbe::default();

    assert!(!laser.is_active());
    assert!(laser.start_homing(beam_start(Phase::Phase1, pool.current())));

    let mut ended = None;
    for _ in 0..200 {
        assert!(laser.is_active());
        assert!(!laser.start_homing(beam_start(Phase::Phase1, 100.0)));
        assert!(!laser.start_sweep(beam_start(Phase::Phase1, 100.0)));

        let report = laser.tick(0.1, Vec2::ZERO, None, &probe, &mut pool);
        if let Some(kind) = report.ended {
            ended = Some(kind);
            break;
        }
    }

    assert_eq!(ended, Some(LaserKind::Homing));
    assert!(!laser.is_active());
    assert!(laser.beam().is_none());
    assert!(laser.start_sweep(beam_start(Phase::Phase1, pool.current())));
}

#[test]
fn laser_drains_energy_per_second() {
    let tuning = LaserTuning::default();
    let mut laser = LaserEmitter::new(tuning.clone());
    let mut pool = pool_with(100.0);

    laser.start_homing(beam_start(Phase::Phase1, pool.current()));
    let report = laser.tick(0.5, Vec2::ZERO, None, &FakeProbe::default(), &mut pool);

    let expected = tuning.phase1.homing.drain_per_second * 0.5;
    assert!((report.drained - expected).abs() < 1e-4);
    assert!((pool.current() - (100.0 - expected)).abs() < 1e-4);
}

#[test]
fn laser_needs_minimum_energy_and_ends_when_empty() {
    let tuning = LaserTuning::default();
    let mut laser = LaserEmitter::new(tuning.clone());

    assert!(!laser.start_homing(beam_start(Phase::Phase1, tuning.min_start_energy - 0.1)));
    assert!(!laser.is_active());

    let mut pool = pool_with(tuning.min_start_energy);
    assert!(laser.start_homing(beam_start(Phase::Phase1, pool.current())));

    let mut firing_time = 0.0;
    while matches!(laser.state(), LaserState::Firing(_)) {
        laser.tick(0.1, Vec2::ZERO, None, &FakeProbe::default(), &mut pool);
        firing_time += 0.1;
    }

    assert!(pool.is_empty());
    assert!(firing_time < tuning.phase1.homing.duration);
    assert!(matches!(laser.state(), LaserState::Fading { .. }));
}

#[test]
fn stop_laser_is_safe_and_still_announces_end() {
    let mut laser = LaserEmitter::new(LaserTuning::default());
    let mut pool = pool_with(100.0);

    assert!(!laser.stop());

    laser.start_sweep(beam_start(Phase::Phase2, pool.current()));
    assert!(laser.stop());
    assert!(!laser.stop());
    assert!(laser.is_active());

    let report = laser.tick(1.0, Vec2::ZERO, None, &FakeProbe::default(), &mut pool);
    assert_eq!(report.ended, Some(LaserKind::Sweep));
    assert_eq!(report.drained, 0.0);
    assert!(!laser.is_active());
}

#[test]
fn homing_turns_at_most_turn_rate() {
    let tuning = LaserTuning::default();
    let mut laser = LaserEmitter::new(tuning.clone());
    let mut pool = pool_with(100.0);
    laser.start_homing(beam_start(Phase::Phase1, pool.current()));

    let player = Some(Vec2::new(0.0, 300.0));
    laser.tick(0.5, Vec2::ZERO, player, &FakeProbe::default(), &mut pool);

    let beam = laser.beam().expect("firing");
    let expected = tuning.phase1.homing.turn_rate_degrees * 0.5;
    assert!((degrees(beam.direction) - expected).abs() < 1e-3);
}

#[test]
fn sweep_crosses_the_span_linearly() {
    let tuning = LaserTuning::default();
    let profile = tuning.phase1.sweep.clone();
    let mut laser = LaserEmitter::new(tuning);
    let mut pool = pool_with(100.0);
    laser.start_sweep(beam_start(Phase::Phase1, pool.current()));

    let start = degrees(laser.beam().expect("firing").direction);
    assert!((start + profile.sweep_span_degrees * 0.5).abs() < 1e-3);

    laser.tick(profile.duration * 0.5, Vec2::ZERO, None, &FakeProbe::default(), &mut pool);
    let mid = degrees(laser.beam().expect("firing").direction);
    assert!(mid.abs() < 1e-3);
}

#[test]
fn beam_stops_at_ground_and_reports_player() {
    let tuning = LaserTuning::default();
    let dps = tuning.phase2.homing.damage_per_second;
    let mut laser = LaserEmitter::new(tuning);
    let mut pool = pool_with(100.0);
    let player = test_entity();
    let probe = FakeProbe {
        ground: Some(200.0),
        player: Some(player),
    };

    laser.start_homing(beam_start(Phase::Phase2, pool.current()));
    let report = laser.tick(0.1, Vec2::ZERO, None, &probe, &mut pool);

    assert_eq!(report.ground_point, Some(Vec2::new(200.0, 0.0)));
    let (hit, damage) = report.player_hit.expect("player on the beam");
    assert_eq!(hit, player);
    assert!((damage - dps * 0.1).abs() < 1e-4);
    assert!((laser.beam().expect("firing").length() - 200.0).abs() < 1e-3);
    assert!(laser.is_active());
}

#[test]
fn phase2_lasers_are_more_aggressive() {
    let tuning = LaserTuning::default();
    let (p1, p2) = (tuning.profile(Phase::Phase1), tuning.profile(Phase::Phase2));

    assert!(p2.homing.turn_rate_degrees > p1.homing.turn_rate_degrees);
    assert!(p2.homing.drain_per_second > p1.homing.drain_per_second);
    assert!(p2.homing.width > p1.homing.width);
    assert!(p2.sweep.sweep_span_degrees > p1.sweep.sweep_span_degrees);
    assert!(p2.sweep.drain_per_second > p1.sweep.drain_per_second);
    assert!(p2.sweep.width > p1.sweep.width);
}

#[test]
fn steer_takes_the_short_way_round() {
    let current = heading_from_degrees(170.0);
    let desired = heading_from_degrees(-170.0);
    let steered = steer_towards(current, desired, 5.0);

    assert!((degrees(steered) - 175.0).abs() < 1e-3);
    assert_eq!(steer_towards(current, Vec2::ZERO, 5.0), current);
}

// ============================================================================
// Energy economy
// ============================================================================

#[test]
fn energy_pool_stays_in_range() {
    let mut rng = rng();
    let mut pool = EnergyPool::new(100.0);

    for _ in 0..1000 {
        let amount = rng.random_range(-1.0e6..1.0e6);
        match rng.random_range(0..3) {
            0 => {
                pool.gain(amount);
            }
            1 => {
                pool.consume(amount);
            }
            _ => pool.set(amount),
        }
        assert!(pool.current() >= 0.0 && pool.current() <= pool.max());
    }

    pool.set(f32::NAN);
    assert_eq!(pool.current(), 0.0);
    pool.set(f32::INFINITY);
    assert_eq!(pool.current(), 100.0);
}

#[test]
fn ignition_at_ninety_saturates_and_spawns_clone() {
    // maxEnergy=100, energyGainPerTorch=50, pool at 90
    let tuning = EnergyTuning {
        max_energy: 100.0,
        energy_gain_per_torch: 50.0,
        ..default()
    };
    let mut economy = EnergyEconomy::new(&tuning);
    let mut clones = CloneRoster::new(&CloneTuning::default());
    let mut factory = RecordingFactory::default();

    economy.set_energy(90.0);
    assert!(economy.open_torch_window(0.0));

    let outcome = economy.handle_torch_ignited(1.0).expect("window open");
    assert_eq!(economy.pool.current(), 100.0);
    assert_eq!(outcome.gained, 10.0);
    assert!(outcome.became_full);
    assert!(outcome.saturated);

    let clone = clones.create_clone(test_entity(), Vec2::ZERO, 0.0, &mut economy.pool, &mut factory);
    assert!(clone.is_some());
    assert_eq!(clones.active_clones(), 1);
    assert_eq!(economy.pool.current(), 0.0);

    // Full fires once: the next grant starts from empty
    let outcome = economy.handle_torch_ignited(2.0).expect("window open");
    assert!(!outcome.became_full);
}

#[test]
fn torch_window_guards_and_timeout() {
    let tuning = EnergyTuning::default();
    let mut economy = EnergyEconomy::new(&tuning);

    assert!(economy.can_open_torch_window(0.0));
    assert!(economy.open_torch_window(0.0));
    assert!(!economy.open_torch_window(0.5));
    assert!(!economy.can_open_torch_window(0.5));

    let tick = economy.tick(tuning.torch_window_duration - 0.1);
    assert!(!tick.window_timed_out);
    let tick = economy.tick(0.2);
    assert!(tick.window_timed_out);
    assert!(!economy.window.is_open());

    assert!(!economy.close_torch_window());
    assert!(!economy.tick(100.0).window_timed_out);
}

#[test]
fn torch_window_respects_cooldown_since_last_ignition() {
    let tuning = EnergyTuning {
        torch_cooldown: 4.0,
        ..default()
    };
    let mut economy = EnergyEconomy::new(&tuning);

    economy.open_torch_window(0.0);
    economy.handle_torch_ignited(5.0);
    assert!(economy.close_torch_window());

    assert!(!economy.can_open_torch_window(6.0));
    assert!(!economy.open_torch_window(8.9));
    assert!(economy.can_open_torch_window(9.0));
    assert!(economy.open_torch_window(9.0));
    assert_eq!(economy.window.opened_at(), Some(9.0));
}

#[test]
fn ignition_with_closed_window_is_ignored() {
    let mut economy = EnergyEconomy::new(&EnergyTuning::default());
    assert_eq!(economy.handle_torch_ignited(1.0), None);
    assert_eq!(economy.pool.current(), 0.0);
    assert_eq!(economy.window.last_ignite_at(), None);
}

#[test]
fn ambient_heating_trickles_until_full() {
    let tuning = EnergyTuning {
        ambient_heating_rate: 2.0,
        ambient_heating_interval: 1.0,
        ..default()
    };
    let mut economy = EnergyEconomy::new(&tuning);

    assert_eq!(economy.tick(0.5).ambient_gained, 0.0);
    assert_eq!(economy.tick(0.5).ambient_gained, 2.0);

    economy.set_energy(99.0);
    let tick = economy.tick(1.0);
    assert_eq!(tick.ambient_gained, 1.0);
    assert!(tick.became_full);

    assert_eq!(economy.tick(1.0).ambient_gained, 0.0);
}

#[test]
fn ambient_heating_can_be_toggled() {
    let mut economy = EnergyEconomy::new(&EnergyTuning::default());
    economy.set_ambient_heating(false);
    for _ in 0..10 {
        assert_eq!(economy.tick(1.0).ambient_gained, 0.0);
    }

    economy.set_ambient_heating(true);
    assert!(economy.tick(1.0).ambient_gained > 0.0);
}

#[test]
fn same_tick_trickle_and_ignition_clamp_to_max() {
    let mut economy = EnergyEconomy::new(&EnergyTuning::default());
    economy.set_energy(99.0);
    economy.open_torch_window(0.0);

    let tick = economy.tick(1.0);
    let outcome = economy.handle_torch_ignited(1.0).expect("window open");

    assert_eq!(economy.pool.current(), 100.0);
    assert_eq!(tick.ambient_gained + outcome.gained, 1.0);
    assert!(tick.became_full);
    assert!(!outcome.became_full);
    assert!(outcome.saturated);
}

#[test]
fn consume_energy_clamps() {
    let mut economy = EnergyEconomy::new(&EnergyTuning::default());
    economy.set_energy(30.0);
    assert_eq!(economy.consume_energy(50.0), 30.0);
    assert_eq!(economy.consume_energy(-5.0), 0.0);
    assert_eq!(economy.pool.current(), 0.0);
}

// ============================================================================
// Clones
// ============================================================================

#[test]
fn clone_pool_caps_at_max() {
    // maxClones=2, three saturated ignitions
    let clone_tuning = CloneTuning {
        max_clones: 2,
        ..default()
    };
    let mut economy = EnergyEconomy::new(&EnergyTuning::default());
    let mut clones = CloneRoster::new(&clone_tuning);
    let mut factory = RecordingFactory::default();
    let boss = test_entity();
    economy.open_torch_window(0.0);

    let mut created = Vec::new();
    for i in 0..3 {
        economy.set_energy(60.0);
        let outcome = economy
            .handle_torch_ignited(i as f32)
            .expect("window open");
        assert!(outcome.saturated);

        let before = economy.pool.current();
        match clones.create_clone(boss, Vec2::ZERO, 0.0, &mut economy.pool, &mut factory) {
            Some(clone) => created.push(clone),
            None => {
                assert_eq!(economy.pool.current(), before);
                assert_eq!(clones.active_clones(), 2);
            }
        }
        assert!(clones.active_clones() <= clone_tuning.max_clones);
    }
    assert_eq!(created.len(), 2);
    assert_eq!(factory.count(SpawnKind::Clone), 2);

    // A clone expiring frees a slot
    assert!(clones.release(created[0]));
    assert!(!clones.release(created[0]));
    economy.set_energy(100.0);
    assert!(
        clones
            .create_clone(boss, Vec2::ZERO, 0.0, &mut economy.pool, &mut factory)
            .is_some()
    );
}

#[test]
fn clones_alternate_sides_and_carry_lifetime() {
    let tuning = CloneTuning::default();
    let mut clones = CloneRoster::new(&tuning);
    let mut factory = RecordingFactory::default();
    let mut pool = pool_with(100.0);
    let owner_pos = Vec2::new(10.0, 20.0);

    clones.create_clone(test_entity(), owner_pos, 0.5, &mut pool, &mut factory);
    pool.set(100.0);
    clones.create_clone(test_entity(), owner_pos, 0.5, &mut pool, &mut factory);

    let [first, second] = [&factory.spawned[0], &factory.spawned[1]];
    assert_eq!(first.position, owner_pos + Vec2::new(tuning.spawn_offset, 0.0));
    assert_eq!(second.position, owner_pos - Vec2::new(tuning.spawn_offset, 0.0));
    assert_eq!(first.rotation, 0.5);
    assert_eq!(first.lifetime, tuning.clone_duration);
}

#[test]
fn refused_clone_keeps_energy() {
    let mut clones = CloneRoster::new(&CloneTuning::default());
    let mut factory = RecordingFactory::refusing();
    let mut pool = pool_with(100.0);

    assert!(
        clones
            .create_clone(test_entity(), Vec2::ZERO, 0.0, &mut pool, &mut factory)
            .is_none()
    );
    assert_eq!(pool.current(), 100.0);
    assert_eq!(clones.active_clones(), 0);
}

#[test]
fn clear_all_clones_destroys_everything() {
    let mut clones = CloneRoster::new(&CloneTuning::default());
    let mut factory = RecordingFactory::default();
    assert!(clones.clear_all_clones(&mut factory).is_empty());

    let mut pool = pool_with(100.0);
    let a = clones.create_clone(test_entity(), Vec2::ZERO, 0.0, &mut pool, &mut factory);
    pool.set(100.0);
    let b = clones.create_clone(test_entity(), Vec2::ZERO, 0.0, &mut pool, &mut factory);

    let cleared = clones.clear_all_clones(&mut factory);
    assert_eq!(cleared.len(), 2);
    assert_eq!(factory.despawned, vec![a.expect("first"), b.expect("second")]);
    assert_eq!(clones.active_clones(), 0);
}

#[test]
fn clone_expires_after_lifetime() {
    let mut clone = BossClone::new(test_entity(), 3.0, 1.0);
    assert!(!clone.tick(0.6));
    assert!(clone.tick(0.6));
}

// ============================================================================
// Projectiles and torches
// ============================================================================

#[test]
fn grenade_explodes_exactly_once() {
    let mut grenade = Grenade::new(test_entity(), 1.0);
    let explosions = (0..30).filter(|_| grenade.tick(0.1)).count();
    assert_eq!(explosions, 1);
    assert!(grenade.exploded);
}

#[test]
fn torch_lights_once_while_active() {
    let boss = test_entity();
    let mut torch = Torch::new(Phase::Phase1);

    assert_eq!(torch.ignite(), None);

    torch.set_active(Some(boss));
    assert_eq!(torch.ignite(), Some(boss));
    assert_eq!(torch.ignite(), None);

    torch.set_active(None);
    assert!(!torch.lit);
    assert_eq!(torch.ignite(), None);
}
