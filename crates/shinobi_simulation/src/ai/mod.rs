//! AI decision-making module
//!
//! Два адаптера поверх одного CharacterController:
//! - `reactive`: погоня / атака по cooldown / вероятностный блок
//! - `scaled`: политика по уровню интеллекта (0..=100)
//!
//! AI читает чужих персонажей только через read-only поверхность
//! (`TargetView`) и пишет только свой `CharacterInput`.

use bevy::prelude::*;

pub mod reactive;
pub mod scaled;
pub mod target;


pub use reactive::{decide_reactive, ReactiveAiConfig, ReactiveAttack, ReactiveDecision, ReactiveEnemy};
pub use scaled::{decide, decide_scaled, DecisionContext, Intelligence, IntelligenceBand, ScaledAction, ScaledAiConfig};
pub use target::{AiTarget, TargetView};

use crate::adapter::disable_adapters_without_controller;
use crate::ShinobiSet;

/// AI Plugin
///
/// Порядок в `ShinobiSet::Decide`:
/// 1. acquire_ai_targets: очистка/поиск цели
/// 2. reactive_enemy_decisions
/// 3. scaled_enemy_decisions
///
/// Chain ради детерминизма: обе системы тянут из одного `DeterministicRng`.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AiTarget>()
            .register_type::<ReactiveEnemy>()
            .register_type::<ReactiveAiConfig>()
            .register_type::<Intelligence>()
            .register_type::<ScaledAiConfig>();

        app.add_systems(
            PreUpdate,
            (
                disable_adapters_without_controller::<ReactiveEnemy>,
                disable_adapters_without_controller::<Intelligence>,
            ),
        );

        app.add_systems(
            FixedUpdate,
            (
                target::acquire_ai_targets,
                reactive::reactive_enemy_decisions,
                scaled::scaled_enemy_decisions,
            )
                .chain()
                .in_set(ShinobiSet::Decide),
        );
    }
}
