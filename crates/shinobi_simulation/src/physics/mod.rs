//! Physics simulation module
//!
//! Kinematic подход: velocity интегрируем сами (`PhysicsBody`), а Rapier
//! только для запросов земли и collision groups.
//!
//! Два backend'а (`PhysicsBackend`):
//! - `Flat`: headless, бесконечный пол, своя интеграция позиции
//! - `Rapier`: bevy_rapier3d, скорость синхронизируется с `Velocity`

pub mod collision;
pub mod movement;

use bevy::prelude::*;

pub use movement::{
    apply_character_movement, apply_gravity, integrate_velocity_to_transform, pull_velocity_from_rapier,
    push_velocity_to_rapier, resolve_flat_floor, spawn_character, spawn_rapier_character, CharacterPhysicsPlugin,
};

/// Скорость персонажа (custom velocity, не Rapier forces)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec3,
}

/// Ускорение свободного падения по Y (m/s²)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct WorldGravity {
    pub acceleration: f32,
}

impl Default for WorldGravity {
    fn default() -> Self {
        Self { acceleration: -9.81 }
    }
}

/// Какой физический backend обслуживает персонажей
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhysicsBackend {
    /// Headless пол на высоте `height` (тесты, сервер)
    #[default]
    Flat,
    /// bevy_rapier3d (хост сам добавляет RapierPhysicsPlugin)
    Rapier,
}
