//! Character controller module
//!
//! Общий контроллер персонажа для игрока и врагов:
//! - `lock`: ActionLock (Free / Attacking / DropKicking / Blocking)
//! - `state`: CharacterController: прыжки, coyote time, комбо, пинки, кунай
//! - `ground`: ground sensing (FlatGround / Rapier)
//! - `input`: CharacterInput (снапшот ввода на тик)
//! - `systems`: ECS обвязка

use bevy::prelude::*;

pub mod config;
pub mod ground;
pub mod input;
pub mod lock;
pub mod state;
pub mod systems;


pub use config::CharacterConfig;
pub use ground::{ColliderBounds, FlatGround, GroundCheck, GroundContact, GroundProbe, RapierGround};
pub use input::{AttackRequest, CharacterInput};
pub use lock::{ActionLock, AttackKind};
pub use state::{facing_rotation, CharacterController, TickContext, TickOutcome};

use crate::combat::KunaiThrown;
use crate::ShinobiSet;

/// Controller Plugin
///
/// - PreUpdate: синтез якорей ground check для новых персонажей
/// - FixedUpdate/Sense: ground probe (backend по наличию ресурса)
/// - FixedUpdate/Act: `process_input` для каждого персонажа
pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<KunaiThrown>()
            .register_type::<CharacterController>()
            .register_type::<CharacterConfig>()
            .register_type::<CharacterInput>()
            .register_type::<GroundCheck>()
            .register_type::<GroundContact>();

        app.add_systems(PreUpdate, systems::derive_ground_anchors);

        app.add_systems(
            FixedUpdate,
            (
                systems::sense_ground_flat.run_if(resource_exists::<FlatGround>),
                systems::sense_ground_rapier.run_if(resource_exists::<RapierGround>),
            )
                .in_set(ShinobiSet::Sense),
        );

        app.add_systems(FixedUpdate, systems::run_character_controllers.in_set(ShinobiSet::Act));
    }
}
