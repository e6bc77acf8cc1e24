//! Animation signals (controller → animation sink).
//!
//! Контроллер только пишет: bools, one-shot triggers, стадия комбо.
//! Обратно состояние анимации не читает.
//!
//! Ключи параметров: enum'ы. Имена для хоста резолвятся один раз в
//! [`AnimationParameterTable`] при сборке plugin'а; строки по кадрам не хешируются.

use bevy::prelude::*;
use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::player::Player;
use crate::ShinobiSet;

// ============================================================================
// Parameter keys
// ============================================================================

/// Bool параметры (удерживаемое состояние)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
pub enum AnimBool {
    #[strum(serialize = "isRunning")]
    Running,
    #[strum(serialize = "isGrounded")]
    Grounded,
    #[strum(serialize = "isDropKicking")]
    DropKicking,
    #[strum(serialize = "isFlipping")]
    Flipping,
    #[strum(serialize = "isBlocking")]
    Blocking,
}

/// One-shot triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
pub enum AnimTrigger {
    #[strum(serialize = "Jump")]
    Jump,
    #[strum(serialize = "Flip")]
    Flip,
    #[strum(serialize = "Punch")]
    Punch,
    #[strum(serialize = "Kunai")]
    Kunai,
    #[strum(serialize = "KickGround")]
    KickGround,
    #[strum(serialize = "KickAir")]
    KickAir,
}

/// Integer параметры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter, IntoStaticStr)]
pub enum AnimInt {
    #[strum(serialize = "PunchStage")]
    PunchStage,
}

// ============================================================================
// Sink
// ============================================================================

/// Приёмник анимационных сигналов контроллера
pub trait AnimationSink {
    fn set_bool(&mut self, param: AnimBool, value: bool);
    fn set_trigger(&mut self, trigger: AnimTrigger);
    fn set_integer(&mut self, param: AnimInt, value: i32);
}

/// Handle animation controller'а хоста (для симуляции непрозрачен)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnimationControllerId(pub String);

/// Animator: последние значения сигналов для render слоя.
///
/// Triggers хранятся двумя способами:
/// - `fired_this_tick()`: triggers последнего тика контроллера
/// - `trigger_count()`: монотонные счётчики; хост, рендерящий реже fixed tick,
///   сравнивает их и не теряет one-shot'ы
#[derive(Component, Debug, Clone, Default)]
pub struct Animator {
    /// None: controller'а нет, персонаж рендерится без анимации
    pub controller: Option<AnimationControllerId>,
    bools: [bool; AnimBool::COUNT],
    integers: [i32; AnimInt::COUNT],
    fired: Vec<AnimTrigger>,
    trigger_counts: [u32; AnimTrigger::COUNT],
}

impl Animator {
    pub fn with_controller(id: impl Into<String>) -> Self {
        Self {
            controller: Some(AnimationControllerId(id.into())),
            ..default()
        }
    }

    pub fn has_controller(&self) -> bool {
        self.controller.is_some()
    }

    pub fn get_bool(&self, param: AnimBool) -> bool {
        self.bools[param as usize]
    }

    pub fn get_integer(&self, param: AnimInt) -> i32 {
        self.integers[param as usize]
    }

    /// Triggers последнего тика контроллера
    pub fn fired_this_tick(&self) -> &[AnimTrigger] {
        &self.fired
    }

    pub fn trigger_count(&self, trigger: AnimTrigger) -> u32 {
        self.trigger_counts[trigger as usize]
    }

    /// Всего triggers с момента спавна
    pub fn total_triggers(&self) -> u32 {
        self.trigger_counts.iter().sum()
    }

    /// Bool параметры под именами хоста
    pub fn named_bools<'t>(&self, table: &'t AnimationParameterTable) -> impl Iterator<Item = (&'static str, bool)> + 't {
        let bools = self.bools;
        AnimBool::iter().map(move |param| (table.bool_name(param), bools[param as usize]))
    }

    /// Имена triggers последнего тика (в порядке срабатывания)
    pub fn fired_names(&self, table: &AnimationParameterTable) -> Vec<&'static str> {
        self.fired.iter().map(|&trigger| table.trigger_name(trigger)).collect()
    }

    /// Integer параметры под именами хоста
    pub fn named_integers<'t>(&self, table: &'t AnimationParameterTable) -> impl Iterator<Item = (&'static str, i32)> + 't {
        let integers = self.integers;
        AnimInt::iter().map(move |param| (table.integer_name(param), integers[param as usize]))
    }

    /// Вызывается контроллером в начале каждого тика
    pub fn begin_tick(&mut self) {
        self.fired.clear();
    }
}

impl AnimationSink for Animator {
    fn set_bool(&mut self, param: AnimBool, value: bool) {
        self.bools[param as usize] = value;
    }

    fn set_trigger(&mut self, trigger: AnimTrigger) {
        self.fired.push(trigger);
        let count = &mut self.trigger_counts[trigger as usize];
        *count = count.wrapping_add(1);
    }

    fn set_integer(&mut self, param: AnimInt, value: i32) {
        self.integers[param as usize] = value;
    }
}

// ============================================================================
// Parameter table (resolved once)
// ============================================================================

/// Имена параметров на стороне хоста (индекс: enum ключ)
#[derive(Resource, Debug, Clone)]
pub struct AnimationParameterTable {
    bools: [&'static str; AnimBool::COUNT],
    triggers: [&'static str; AnimTrigger::COUNT],
    integers: [&'static str; AnimInt::COUNT],
}

impl AnimationParameterTable {
    pub fn resolve() -> Self {
        let mut bools = [""; AnimBool::COUNT];
        for param in AnimBool::iter() {
            bools[param as usize] = param.into();
        }

        let mut triggers = [""; AnimTrigger::COUNT];
        for trigger in AnimTrigger::iter() {
            triggers[trigger as usize] = trigger.into();
        }

        let mut integers = [""; AnimInt::COUNT];
        for param in AnimInt::iter() {
            integers[param as usize] = param.into();
        }

        Self {
            bools,
            triggers,
            integers,
        }
    }

    pub fn bool_name(&self, param: AnimBool) -> &'static str {
        self.bools[param as usize]
    }

    pub fn trigger_name(&self, trigger: AnimTrigger) -> &'static str {
        self.triggers[trigger as usize]
    }

    pub fn integer_name(&self, param: AnimInt) -> &'static str {
        self.integers[param as usize]
    }
}

impl Default for AnimationParameterTable {
    fn default() -> Self {
        Self::resolve()
    }
}

// ============================================================================
// Systems
// ============================================================================

/// System: враг без animation controller'а берёт controller игрока.
///
/// Если и у игрока нет: остаётся без controller'а (без анимации, не ошибка).
pub fn borrow_missing_animation_controllers(
    mut animators: Query<(Entity, &mut Animator), (Added<Animator>, Without<Player>)>,
    players: Query<&Animator, With<Player>>,
) {
    let reference = players.iter().find_map(|animator| animator.controller.clone());

    for (entity, mut animator) in animators.iter_mut() {
        if animator.controller.is_some() {
            continue;
        }

        if let Some(controller) = reference.clone() {
            crate::logger::log(&format!(
                "Animator {:?}: borrowing controller '{}' from player",
                entity, controller.0
            ));
            animator.controller = Some(controller);
        }
    }
}

/// System: debug лог сработавших triggers (имена из таблицы)
pub fn log_fired_triggers(animators: Query<(Entity, &Animator)>, table: Res<AnimationParameterTable>) {
    for (entity, animator) in animators.iter() {
        if animator.fired_this_tick().is_empty() {
            continue;
        }
        crate::logger::log(&format!("Animator {:?}: {}", entity, animator.fired_names(&table).join(", ")));
    }
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AnimationParameterTable::resolve())
            .add_systems(PreUpdate, borrow_missing_animation_controllers)
            .add_systems(FixedUpdate, log_fired_triggers.in_set(ShinobiSet::Physics));
    }
}
