//! Physics pass персонажей
//!
//! Порядок (после решений контроллера, в `ShinobiSet::Physics`):
//! 1. `apply_character_movement`: горизонтальная скорость от ввода, facing
//! 2. `apply_gravity`: базовая (только Flat) + дополнительная при падении
//! 3. Flat: `integrate_velocity_to_transform` → `resolve_flat_floor`
//!    Rapier: `push_velocity_to_rapier` (интегрирует сам Rapier)
//!
//! Детерминизм: fixed timestep (60Hz), без Rapier forces.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::collision;
use super::{PhysicsBackend, PhysicsBody, WorldGravity};
use crate::controller::ground::{ColliderBounds, FlatGround, RapierGround};
use crate::controller::state::facing_rotation;
use crate::controller::{CharacterConfig, CharacterController};
use crate::ShinobiSet;

/// Капсула персонажа: половина высоты цилиндра / радиус
pub const CAPSULE_HALF_HEIGHT: f32 = 0.5;
pub const CAPSULE_RADIUS: f32 = 0.4;

/// Система: горизонтальная скорость + разворот модели по facing
pub fn apply_character_movement(
    mut query: Query<(
        &mut CharacterController,
        &CharacterConfig,
        &mut PhysicsBody,
        &mut Transform,
    )>,
) {
    for (mut controller, config, mut body, mut transform) in query.iter_mut() {
        controller.apply_movement(config, &mut body);
        transform.rotation = facing_rotation(controller.facing());
    }
}

/// Система: гравитация
///
/// Базовую гравитацию в Rapier-режиме применяет сам Rapier, поэтому здесь
/// только дополнительное ускорение при падении.
pub fn apply_gravity(
    mut query: Query<(&CharacterController, &mut PhysicsBody)>,
    gravity: Res<WorldGravity>,
    flat: Option<Res<FlatGround>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let base = flat.is_some();

    for (controller, mut body) in query.iter_mut() {
        if base {
            body.velocity.y += gravity.acceleration * delta;
        }

        let extra = controller.fall_acceleration(body.velocity.y, gravity.acceleration);
        body.velocity.y += extra * delta;
    }
}

/// Система интеграции velocity → Transform (headless режим, без Rapier)
pub fn integrate_velocity_to_transform(
    mut query: Query<(&PhysicsBody, &mut Transform), With<CharacterController>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        // position += velocity * dt
        transform.translation += body.velocity * delta;
    }
}

/// Система: персонаж не проваливается сквозь пол (headless режим)
///
/// Дно коллайдера (или origin без bounds) не ниже `FlatGround::height`;
/// при контакте вертикальная скорость вниз гасится.
pub fn resolve_flat_floor(
    mut query: Query<(&mut PhysicsBody, &mut Transform, Option<&ColliderBounds>), With<CharacterController>>,
    floor: Res<FlatGround>,
) {
    for (mut body, mut transform, bounds) in query.iter_mut() {
        let feet_offset = bounds
            .map(|b| b.center.y - b.half_extents.y)
            .unwrap_or(0.0);
        let feet = transform.translation.y + feet_offset;

        if feet < floor.height {
            transform.translation.y = floor.height - feet_offset;
            if body.velocity.y < 0.0 {
                body.velocity.y = 0.0;
            }
        }
    }
}

/// Rapier → PhysicsBody (в начале тика, до решений контроллера)
pub fn pull_velocity_from_rapier(mut query: Query<(&mut PhysicsBody, &Velocity), With<CharacterController>>) {
    for (mut body, rapier_velocity) in query.iter_mut() {
        body.velocity = rapier_velocity.linvel;
    }
}

/// PhysicsBody → Rapier (после physics pass; шаг Rapier интегрирует позицию)
pub fn push_velocity_to_rapier(mut query: Query<(&PhysicsBody, &mut Velocity), With<CharacterController>>) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
    }
}

/// Plugin физики персонажей
///
/// Регистрирует систему в `ShinobiSet::Physics` под выбранный backend.
pub struct CharacterPhysicsPlugin {
    pub backend: PhysicsBackend,
}

impl Plugin for CharacterPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldGravity>();

        match self.backend {
            PhysicsBackend::Flat => {
                app.init_resource::<FlatGround>().add_systems(
                    FixedUpdate,
                    (
                        apply_character_movement,
                        apply_gravity,
                        integrate_velocity_to_transform,
                        resolve_flat_floor,
                    )
                        .chain()
                        .in_set(ShinobiSet::Physics),
                );
            }
            PhysicsBackend::Rapier => {
                // Rapier в FixedUpdate: шаг после нашего physics pass (в PostUpdate no-op)
                app.insert_resource(RapierGround)
                    .configure_sets(FixedUpdate, ShinobiSet::Projectiles.before(PhysicsSet::SyncBackend))
                    .add_systems(FixedUpdate, pull_velocity_from_rapier.in_set(ShinobiSet::Sense))
                    .add_systems(
                        FixedUpdate,
                        (apply_character_movement, apply_gravity, push_velocity_to_rapier)
                            .chain()
                            .in_set(ShinobiSet::Physics),
                    );
            }
        }
    }
}

/// Spawn helper: персонаж для headless backend'а
///
/// Полный набор через required components `CharacterController`;
/// якорь ground check синтезируется из `ColliderBounds`.
pub fn spawn_character(commands: &mut Commands, position: Vec3, config: CharacterConfig) -> Entity {
    // Origin: центр капсулы, дно на уровне пола
    let lift = CAPSULE_HALF_HEIGHT + CAPSULE_RADIUS;

    commands
        .spawn((
            Transform::from_translation(position + Vec3::Y * lift),
            CharacterController::default(),
            config,
            ColliderBounds::capsule_y(CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS),
        ))
        .id()
}

/// Spawn helper: персонаж с Rapier телом
///
/// - RigidBody::Dynamic с заблокированным вращением
/// - Capsule коллайдер
/// - Collision groups (player/enemy не толкают друг друга)
pub fn spawn_rapier_character(
    commands: &mut Commands,
    position: Vec3,
    config: CharacterConfig,
    is_player: bool,
) -> Entity {
    let groups = if is_player {
        collision::player_groups()
    } else {
        collision::enemy_groups()
    };

    let entity = spawn_character(commands, position, config);
    commands.entity(entity).insert((
        RigidBody::Dynamic,
        Collider::capsule_y(CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS),
        LockedAxes::ROTATION_LOCKED,
        Velocity::default(),
        groups,
    ));

    entity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_movement_normalizes_diagonal() {
        let mut controller = CharacterController::default();
        let config = CharacterConfig::default();
        let mut body = PhysicsBody::default();

        let mut animator = crate::animation::Animator::default();
        let mut ctx = crate::controller::TickContext {
            now: 0.0,
            grounded: true,
            config: &config,
            body: &mut body,
            animator: &mut animator,
        };
        controller.set_movement(1.0, 1.0, &mut ctx);

        controller.apply_movement(&config, &mut body);
        let horizontal = Vec2::new(body.velocity.x, body.velocity.z);
        assert!((horizontal.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_extra_fall_gravity_only_when_falling() {
        let controller = CharacterController::default();
        // default controller: не на земле
        assert_eq!(controller.fall_acceleration(1.0, -9.81), 0.0);
        assert!((controller.fall_acceleration(-1.0, -9.81) - (-14.715)).abs() < 1e-4);
    }

    #[test]
    fn test_facing_rotation_points_forward_along_x() {
        let right = Transform::from_rotation(facing_rotation(1.0));
        let left = Transform::from_rotation(facing_rotation(-1.0));
        assert!((right.forward().as_vec3() - Vec3::X).length() < 1e-5);
        assert!((left.forward().as_vec3() - Vec3::NEG_X).length() < 1e-5);
    }
}
