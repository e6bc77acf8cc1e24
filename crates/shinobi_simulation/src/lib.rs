//! Shinobi Simulation Core
//!
//! ECS-симуляция персонажей 2.5D beat-'em-up на Bevy 0.16:
//! общий CharacterController (земля, прыжки, комбо, пинки, кунай),
//! которым управляют игрок, reactive AI и intelligence-scaled AI.
//!
//! Тик (FixedUpdate, 60Hz, chained):
//! Sense → Decide → Act → Physics → Projectiles; камера: в PostUpdate.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod adapter;
pub mod ai;
pub mod animation;
pub mod camera;
pub mod combat;
pub mod controller;
pub mod error;
pub mod logger;
pub mod physics;
pub mod player;

// Re-export основных типов
pub use adapter::{AdapterDisabled, DrivesCharacter};
pub use ai::{AIPlugin, AiTarget, Intelligence, ReactiveAiConfig, ReactiveEnemy, ScaledAiConfig};
pub use animation::{
    AnimBool, AnimInt, AnimTrigger, AnimationParameterTable, AnimationPlugin, AnimationSink, Animator,
};
pub use camera::{CameraFollow, CameraFollowConfig, CameraPlugin, CameraView};
pub use combat::{CombatPlugin, Kunai, KunaiLauncher, KunaiThrown};
pub use controller::{
    ActionLock, AttackRequest, CharacterConfig, CharacterController, CharacterInput, ColliderBounds, ControllerPlugin,
    FlatGround, GroundCheck,
};
pub use error::SetupError;
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use physics::{spawn_character, spawn_rapier_character, CharacterPhysicsPlugin, PhysicsBackend, PhysicsBody};
pub use player::{ButtonEdges, HeldButtons, Player, PlayerInputEvent, PlayerPlugin};

/// Частота simulation tick
pub const FIXED_HZ: f64 = 60.0;

/// Длительность одного simulation tick
pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_HZ)
}

/// Фазы simulation tick (выполняются строго по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShinobiSet {
    /// Ground probes, синхронизация скорости из Rapier
    Sense,
    /// Адаптеры (игрок, AI) пишут CharacterInput
    Decide,
    /// CharacterController::process_input
    Act,
    /// Движение, гравитация, интеграция
    Physics,
    /// Кунаи
    Projectiles,
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct ShinobiSimulationPlugin {
    pub backend: PhysicsBackend,
}

impl ShinobiSimulationPlugin {
    pub fn flat() -> Self {
        Self {
            backend: PhysicsBackend::Flat,
        }
    }

    /// Rapier backend: `RapierPhysicsPlugin` хост добавляет сам
    pub fn rapier() -> Self {
        Self {
            backend: PhysicsBackend::Rapier,
        }
    }
}

impl Plugin for ShinobiSimulationPlugin {
    fn build(&self, app: &mut App) {
        // Детерминистичный RNG: не затираем seed, выставленный хостом
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
            .configure_sets(
                FixedUpdate,
                (
                    ShinobiSet::Sense,
                    ShinobiSet::Decide,
                    ShinobiSet::Act,
                    ShinobiSet::Physics,
                    ShinobiSet::Projectiles,
                )
                    .chain(),
            )
            .add_plugins((
                AnimationPlugin,
                ControllerPlugin,
                CharacterPhysicsPlugin { backend: self.backend },
                PlayerPlugin,
                AIPlugin,
                CombatPlugin,
                CameraPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время ручное: каждый `app.update()` = ровно один simulation tick.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick_duration()));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
