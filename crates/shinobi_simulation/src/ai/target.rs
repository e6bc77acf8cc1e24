//! Цель AI: ближайший Player, с ленивой очисткой despawned entity.

use bevy::prelude::*;

use crate::controller::CharacterController;
use crate::player::Player;

/// За кем охотится AI (None = цели нет, AI стоит)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AiTarget(pub Option<Entity>);

/// Что AI видит о цели (read-only query surface)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub position: Vec3,
    pub facing: f32,
    pub is_attacking: bool,
    pub is_grounded: bool,
    pub is_blocking: bool,
}

impl TargetView {
    pub fn of(transform: &Transform, controller: &CharacterController) -> Self {
        Self {
            position: transform.translation,
            facing: controller.facing(),
            is_attacking: controller.is_attacking(),
            is_grounded: controller.is_grounded(),
            is_blocking: controller.is_blocking(),
        }
    }
}

/// System: чистит исчезнувшие цели и подбирает ближайшего игрока
pub fn acquire_ai_targets(
    mut seekers: Query<(Entity, &Transform, &mut AiTarget)>,
    characters: Query<(), With<CharacterController>>,
    players: Query<(Entity, &Transform), (With<Player>, With<CharacterController>)>,
) {
    for (entity, transform, mut target) in seekers.iter_mut() {
        if let Some(current) = target.0 {
            if characters.get(current).is_ok() {
                continue;
            }
            crate::logger::log(&format!("AI {:?}: target {:?} is gone, dropping", entity, current));
            target.0 = None;
        }

        let nearest = players
            .iter()
            .filter(|(candidate, _)| *candidate != entity)
            .min_by(|(_, a), (_, b)| {
                let da = a.translation.distance_squared(transform.translation);
                let db = b.translation.distance_squared(transform.translation);
                da.total_cmp(&db)
            })
            .map(|(candidate, _)| candidate);

        if let Some(found) = nearest {
            crate::logger::log(&format!("AI {:?}: acquired target {:?}", entity, found));
            target.0 = Some(found);
        }
    }
}
