//! Combat module
//!
//! Решения об атаках принимает `CharacterController` (lock'и, комбо).
//! Здесь: только то, что живёт отдельно от персонажа: снаряды.

use bevy::prelude::*;

pub mod projectile;

pub use projectile::{
    kunai_launch, Kunai, KunaiLaunch, KunaiLauncher, KunaiThrown, ProjectileConfig, KUNAI_BASE_EULER_DEG,
};

use crate::ShinobiSet;

/// Combat Plugin
///
/// Порядок в `ShinobiSet::Projectiles`:
/// 1. spawn_thrown_kunai: KunaiThrown → Kunai entity
/// 2. move_kunai: полёт + lifetime
/// 3. despawn_expired_kunai: cleanup
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<KunaiThrown>()
            .init_resource::<ProjectileConfig>()
            .register_type::<Kunai>()
            .register_type::<KunaiLauncher>();

        app.add_systems(
            FixedUpdate,
            (
                projectile::spawn_thrown_kunai,
                projectile::move_kunai,
                projectile::despawn_expired_kunai,
            )
                .chain()
                .in_set(ShinobiSet::Projectiles),
        );
    }
}
