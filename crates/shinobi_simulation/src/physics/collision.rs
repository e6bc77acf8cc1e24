//! Collision Layers Constants
//!
//! Centralised битовые маски для всего проекта.
//!
//! ## Слои:
//! - Layer 1 (0b0001): Ground (пол, платформы)
//! - Layer 2 (0b0010): Player
//! - Layer 3 (0b0100): Enemies
//! - Layer 4 (0b1000): Projectiles (кунаи)
//!
//! Player и enemies НЕ коллайдят телами друг с другом (beat-'em-up: персонажи
//! проходят друг сквозь друга, контакт только через атаки).

use bevy_rapier3d::prelude::{CollisionGroups, Group};

/// Layer 1: Ground
pub const GROUND_LAYER: u32 = 0b0001;

/// Layer 2: Player
pub const PLAYER_LAYER: u32 = 0b0010;

/// Layer 3: Enemies
pub const ENEMY_LAYER: u32 = 0b0100;

/// Layer 4: Projectiles
pub const PROJECTILE_LAYER: u32 = 0b1000;

/// Mask: player стоит на земле и ловит кунаи, врагов игнорирует
pub const PLAYER_MASK: u32 = GROUND_LAYER | PROJECTILE_LAYER;

/// Mask: враг: то же самое, игрока игнорирует
pub const ENEMY_MASK: u32 = GROUND_LAYER | PROJECTILE_LAYER;

/// Mask: кунай летит сквозь других кунаев
pub const PROJECTILE_MASK: u32 = GROUND_LAYER | PLAYER_LAYER | ENEMY_LAYER;

fn groups(layer: u32, mask: u32) -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(layer), Group::from_bits_truncate(mask))
}

pub fn ground_groups() -> CollisionGroups {
    groups(GROUND_LAYER, PLAYER_LAYER | ENEMY_LAYER | PROJECTILE_LAYER)
}

pub fn player_groups() -> CollisionGroups {
    groups(PLAYER_LAYER, PLAYER_MASK)
}

pub fn enemy_groups() -> CollisionGroups {
    groups(ENEMY_LAYER, ENEMY_MASK)
}

pub fn projectile_groups() -> CollisionGroups {
    groups(PROJECTILE_LAYER, PROJECTILE_MASK)
}

/// Название слоя для debug логов
pub fn layer_name(layer_bits: u32) -> &'static str {
    match layer_bits {
        GROUND_LAYER => "Ground",
        PLAYER_LAYER => "Player",
        ENEMY_LAYER => "Enemy",
        PROJECTILE_LAYER => "Projectile",
        _ => "Unknown",
    }
}
