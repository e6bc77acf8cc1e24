//! Кунай: метательный снаряд.
//!
//! Flow:
//! 1. Контроллер принял ThrowKunai → если на персонаже есть `KunaiLauncher`,
//!    считает launch (`kunai_launch`) и пишет `KunaiThrown`
//! 2. `spawn_thrown_kunai` создаёт entity `Kunai` (дальше он независим от бросившего)
//! 3. `move_kunai` двигает по прямой, `despawn_expired_kunai` убирает по lifetime
//!
//! Без `KunaiLauncher` анимация броска всё равно играет, снаряда нет.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::controller::ground::RapierGround;
use crate::physics::collision;

/// Базовый поворот куная (градусы): лезвие вдоль X
pub const KUNAI_BASE_EULER_DEG: Vec3 = Vec3::new(0.0, 180.0, 90.0);

/// Точка вылета куная (локально, для facing = +1)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct KunaiLauncher {
    pub fire_point: Vec3,
}

impl Default for KunaiLauncher {
    fn default() -> Self {
        Self {
            fire_point: Vec3::new(0.6, 1.2, 0.0),
        }
    }
}

/// Параметры снарядов
#[derive(Resource, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Сколько секунд кунай живёт после броска
    pub kunai_lifetime: f32,
    /// Радиус sensor-коллайдера (только Rapier backend)
    pub kunai_radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            kunai_lifetime: 3.0,
            kunai_radius: 0.1,
        }
    }
}

/// Начальное состояние куная
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KunaiLaunch {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
}

/// Event: персонаж бросил кунай
#[derive(Event, Debug, Clone, Copy)]
pub struct KunaiThrown {
    pub thrower: Entity,
    pub launch: KunaiLaunch,
}

/// Летящий кунай
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Kunai {
    pub thrower: Entity,
    pub velocity: Vec3,
    /// Оставшееся время жизни (секунды)
    pub remaining: f32,
}

/// Позиция/поворот/скорость куная при броске.
///
/// - позиция: origin + fire point, X зеркалится по facing
/// - поворот: base Euler (0, 180, 90), Y и Z зеркалятся по facing, + offset
/// - скорость: вдоль X в сторону facing
pub fn kunai_launch(origin: Vec3, facing: f32, fire_point: Vec3, speed: f32, rotation_offset_deg: Vec3) -> KunaiLaunch {
    let facing = if facing < 0.0 { -1.0 } else { 1.0 };

    let position = origin + Vec3::new(fire_point.x * facing, fire_point.y, fire_point.z);

    let euler = Vec3::new(
        KUNAI_BASE_EULER_DEG.x,
        KUNAI_BASE_EULER_DEG.y * facing,
        KUNAI_BASE_EULER_DEG.z * facing,
    ) + rotation_offset_deg;

    let rotation = Quat::from_euler(
        EulerRot::YXZ,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    );

    KunaiLaunch {
        position,
        rotation,
        velocity: Vec3::X * facing * speed,
    }
}

/// System: KunaiThrown → Kunai entity
pub fn spawn_thrown_kunai(
    mut commands: Commands,
    mut thrown: EventReader<KunaiThrown>,
    config: Res<ProjectileConfig>,
    rapier: Option<Res<RapierGround>>,
) {
    for event in thrown.read() {
        let launch = event.launch;
        let mut entity = commands.spawn((
            Transform::from_translation(launch.position).with_rotation(launch.rotation),
            Kunai {
                thrower: event.thrower,
                velocity: launch.velocity,
                remaining: config.kunai_lifetime,
            },
        ));

        if rapier.is_some() {
            entity.insert((
                Collider::ball(config.kunai_radius),
                Sensor,
                collision::projectile_groups(),
            ));
        }

        crate::logger::log(&format!(
            "Kunai {:?} thrown by {:?} at {:?}",
            entity.id(),
            event.thrower,
            launch.position
        ));
    }
}

/// System: прямолинейный полёт + старение
pub fn move_kunai(mut query: Query<(&mut Kunai, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut kunai, mut transform) in query.iter_mut() {
        transform.translation += kunai.velocity * delta;
        kunai.remaining -= delta;
    }
}

/// System: убираем отлетавшие кунаи
pub fn despawn_expired_kunai(mut commands: Commands, query: Query<(Entity, &Kunai)>) {
    for (entity, kunai) in query.iter() {
        if kunai.remaining <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
