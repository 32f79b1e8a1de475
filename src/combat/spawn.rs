//! Combat domain: boss spawning and the Commands-backed entity factory.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::combat::attacks::{AttackActionSet, EntityFactory, SpawnKind, SpawnRequest};
use crate::combat::clones::{BossClone, CloneRoster};
use crate::combat::components::{
    Boss, Combatant, Grenade, Hitbox, HitboxLifetime, Invulnerable, Projectile, Team,
};
use crate::combat::encounter::{Encounter, SenseTimer};
use crate::combat::energy::EnergyEconomy;
use crate::combat::laser::{LaserEmitter, LaserTuning};
use crate::combat::phases::{Phase, PhaseMachine};
use crate::combat::resources::{
    AbilityTuning, CloneTuning, EnergyTuning, PhaseTuning, PrefabCatalog, PrefabDef,
};
use crate::combat::torches::torch_bundle;
use crate::content::BossSpawn;
use crate::movement::GameLayer;

const BOSS_SIZE: Vec2 = Vec2::new(56.0, 56.0);

/// Phase-tagged torch placements, two per phase
const TORCH_LAYOUT: [(Phase, Vec2); 4] = [
    (Phase::Phase1, Vec2::new(-560.0, -166.0)),
    (Phase::Phase1, Vec2::new(560.0, -166.0)),
    (Phase::Phase2, Vec2::new(-250.0, -26.0)),
    (Phase::Phase2, Vec2::new(250.0, -26.0)),
];

/// Spawns prefab entities through deferred `Commands`.
pub struct CommandsFactory<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    catalog: &'a PrefabCatalog,
    now: f32,
}

impl<'a, 'w, 's> CommandsFactory<'a, 'w, 's> {
    pub fn new(commands: &'a mut Commands<'w, 's>, catalog: &'a PrefabCatalog, now: f32) -> Self {
        Self {
            commands,
            catalog,
            now,
        }
    }

    fn prefab(&self, kind: SpawnKind) -> Option<&'a PrefabDef> {
        match kind {
            SpawnKind::Bullet => self.catalog.bullet.as_ref(),
            SpawnKind::Grenade => self.catalog.grenade.as_ref(),
            SpawnKind::Explosion => self.catalog.explosion.as_ref(),
            SpawnKind::Clone => self.catalog.clone.as_ref(),
        }
    }
}

impl EntityFactory for CommandsFactory<'_, '_, '_> {
    fn spawn(&mut self, request: SpawnRequest) -> Option<Entity> {
        let Some(prefab) = self.prefab(request.kind) else {
            debug!("No prefab configured for {:?}, skipping spawn", request.kind);
            return None;
        };

        let size = prefab.size();
        let sprite = Sprite {
            color: prefab.color(),
            custom_size: Some(size),
            ..default()
        };
        let transform = Transform::from_xyz(request.position.x, request.position.y, 2.0)
            .with_rotation(Quat::from_rotation_z(request.rotation));
        let hitbox_physics = (
            Collider::rectangle(size.x, size.y),
            Sensor,
            CollisionEventsEnabled,
            CollisionLayers::new(GameLayer::BossHitbox, [GameLayer::Player]),
        );

        let entity = match request.kind {
            SpawnKind::Bullet => self
                .commands
                .spawn((
                    sprite,
                    transform,
                    Hitbox::new(request.owner, prefab.damage, prefab.knockback),
                    Team::Boss,
                    HitboxLifetime(request.lifetime),
                    Projectile {
                        velocity: request.velocity,
                        gravity: request.gravity,
                    },
                    hitbox_physics,
                ))
                .id(),
            SpawnKind::Explosion => self
                .commands
                .spawn((
                    sprite,
                    transform,
                    Hitbox::new(request.owner, prefab.damage, prefab.knockback),
                    Team::Boss,
                    HitboxLifetime(request.lifetime),
                    hitbox_physics,
                ))
                .id(),
            SpawnKind::Grenade => self
                .commands
                .spawn((
                    sprite,
                    transform,
                    Grenade::new(request.owner, request.lifetime),
                    Projectile {
                        velocity: request.velocity,
                        gravity: request.gravity,
                    },
                ))
                .id(),
            SpawnKind::Clone => self
                .commands
                .spawn((
                    sprite,
                    transform,
                    BossClone::new(request.owner, self.now, request.lifetime),
                    Collider::rectangle(size.x, size.y),
                    Sensor,
                    CollisionLayers::new(GameLayer::Boss, [GameLayer::PlayerHitbox]),
                ))
                .id(),
        };

        Some(entity)
    }

    fn despawn(&mut self, entity: Entity) {
        self.commands.entity(entity).despawn();
    }
}

/// Everything the boss needs to run its encounter
#[derive(Bundle)]
pub struct BossBundle {
    pub boss: Boss,
    pub combatant: Combatant,
    pub team: Team,
    pub invulnerable: Invulnerable,
    pub encounter: Encounter,
    pub sense_timer: SenseTimer,
    pub phases: PhaseMachine,
    pub attacks: AttackActionSet,
    pub laser: LaserEmitter,
    pub economy: EnergyEconomy,
    pub clones: CloneRoster,
    pub sprite: Sprite,
    pub transform: Transform,
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub collision_layers: CollisionLayers,
    pub velocity: LinearVelocity,
    pub locked_axes: LockedAxes,
}

pub struct BossTuningRefs<'a> {
    pub phases: &'a PhaseTuning,
    pub abilities: &'a AbilityTuning,
    pub lasers: &'a LaserTuning,
    pub energy: &'a EnergyTuning,
    pub clones: &'a CloneTuning,
}

impl BossBundle {
    pub fn new(position: Vec2, max_health: f32, tuning: BossTuningRefs<'_>) -> Self {
        Self {
            boss: Boss,
            combatant: Combatant,
            team: Team::Boss,
            invulnerable: Invulnerable::default(),
            encounter: Encounter::new(max_health),
            sense_timer: SenseTimer::default(),
            phases: PhaseMachine::new(tuning.phases.clone()),
            attacks: AttackActionSet::new(tuning.abilities.clone()),
            laser: LaserEmitter::new(tuning.lasers.clone()),
            economy: EnergyEconomy::new(tuning.energy),
            clones: CloneRoster::new(tuning.clones),
            sprite: Sprite {
                color: Color::srgb(0.75, 0.2, 0.1),
                custom_size: Some(BOSS_SIZE),
                ..default()
            },
            transform: Transform::from_xyz(position.x, position.y, 1.0),
            rigid_body: RigidBody::Kinematic,
            collider: Collider::rectangle(BOSS_SIZE.x, BOSS_SIZE.y),
            collision_layers: CollisionLayers::new(GameLayer::Boss, [GameLayer::PlayerHitbox]),
            velocity: LinearVelocity::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
        }
    }
}

pub(crate) fn spawn_encounter(
    mut commands: Commands,
    spawn: Res<BossSpawn>,
    phases: Res<PhaseTuning>,
    abilities: Res<AbilityTuning>,
    lasers: Res<LaserTuning>,
    energy: Res<EnergyTuning>,
    clones: Res<CloneTuning>,
) {
    let boss = commands
        .spawn(BossBundle::new(
            spawn.position,
            spawn.max_health,
            BossTuningRefs {
                phases: &phases,
                abilities: &abilities,
                lasers: &lasers,
                energy: &energy,
                clones: &clones,
            },
        ))
        .id();

    for (phase, position) in TORCH_LAYOUT {
        commands.spawn(torch_bundle(phase, position));
    }

    info!(
        "Spawned boss {:?} at {:?} with {} health and {} torches",
        boss,
        spawn.position,
        spawn.max_health,
        TORCH_LAYOUT.len()
    );
}

/// Surface unusable factory configuration once instead of per call.
pub(crate) fn validate_encounter_setup(catalog: Res<PrefabCatalog>) {
    let entries = [
        ("bullet", catalog.bullet.is_none()),
        ("grenade", catalog.grenade.is_none()),
        ("explosion", catalog.explosion.is_none()),
        ("clone", catalog.clone.is_none()),
    ];

    for (name, missing) in entries {
        if missing {
            warn!("No {} prefab configured; those spawns will be skipped", name);
        }
    }
}
