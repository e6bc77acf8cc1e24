//! ECS системы контроллера: якорь ground check, сенсинг земли, тик контроллера.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::ground::{ColliderBounds, FlatGround, GroundCheck, GroundContact, RapierGroundProbe};
use super::input::{AttackRequest, CharacterInput};
use super::state::{CharacterController, TickContext};
use super::CharacterConfig;
use crate::animation::Animator;
use crate::combat::{kunai_launch, KunaiLauncher, KunaiThrown};
use crate::physics::PhysicsBody;

/// System: якорь ground check из bounds коллайдера, если не задан явно
///
/// Срабатывает при спавне и при замене `ColliderBounds` (смена капсулы).
pub fn derive_ground_anchors(
    mut query: Query<
        (Entity, &mut GroundCheck, Option<&ColliderBounds>),
        Or<(Added<GroundCheck>, Changed<ColliderBounds>)>,
    >,
) {
    for (entity, mut check, bounds) in query.iter_mut() {
        if check.anchor.is_some() && !check.is_derived() {
            continue;
        }

        if let Some(bounds) = bounds {
            let anchor = check.derive_from(bounds);
            crate::logger::log(&format!("Character {:?}: ground check anchor derived at {:?}", entity, anchor));
        }
    }
}

/// System: ground sensing против `FlatGround`
pub fn sense_ground_flat(
    mut query: Query<(&CharacterConfig, &GroundCheck, &Transform, &mut GroundContact)>,
    floor: Res<FlatGround>,
) {
    for (config, check, transform, mut contact) in query.iter_mut() {
        let anchor = check.world_anchor(transform);
        *contact = GroundContact::sample(
            &*floor,
            anchor,
            config.ground_radius,
            config.ground_ray_length,
            config.ground_layer,
        );
    }
}

/// System: ground sensing через Rapier queries
pub fn sense_ground_rapier(
    mut query: Query<(Entity, &CharacterConfig, &GroundCheck, &Transform, &mut GroundContact)>,
    rapier: ReadRapierContext,
) {
    let Ok(context) = rapier.single() else {
        return;
    };

    for (entity, config, check, transform, mut contact) in query.iter_mut() {
        let probe = RapierGroundProbe {
            context: &context,
            owner: entity,
        };
        let anchor = check.world_anchor(transform);
        *contact = GroundContact::sample(
            &probe,
            anchor,
            config.ground_radius,
            config.ground_ray_length,
            config.ground_layer,
        );
    }
}

/// System: один тик контроллера на персонажа
///
/// Потребляет `CharacterInput` (edges сбрасываются после тика), публикует
/// анимационные сигналы и события броска куная.
pub fn run_character_controllers(
    mut query: Query<(
        Entity,
        &mut CharacterController,
        &mut CharacterInput,
        &CharacterConfig,
        &GroundContact,
        &mut PhysicsBody,
        &mut Animator,
        &Transform,
        Option<&KunaiLauncher>,
    )>,
    mut thrown: EventWriter<KunaiThrown>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs_f64();

    for (entity, mut controller, mut input, config, contact, mut body, mut animator, transform, launcher) in
        query.iter_mut()
    {
        animator.begin_tick();

        let outcome = {
            let mut ctx = TickContext {
                now,
                grounded: contact.grounded(),
                config,
                body: &mut *body,
                animator: &mut *animator,
            };
            controller.process_input(&input, &mut ctx)
        };

        input.clear_edges();

        if outcome.attack != Some(AttackRequest::ThrowKunai) {
            continue;
        }

        if let Some(launcher) = launcher {
            thrown.write(KunaiThrown {
                thrower: entity,
                launch: kunai_launch(
                    transform.translation,
                    controller.facing(),
                    launcher.fire_point,
                    config.kunai_speed,
                    config.kunai_rotation_offset(),
                ),
            });
        }
    }
}
