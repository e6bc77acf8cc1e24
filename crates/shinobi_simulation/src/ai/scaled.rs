//! Intelligence-scaled enemy AI.
//!
//! Один скаляр `Intelligence` (0..=100) выбирает политику:
//!
//! | band      | атаки                                                        |
//! |-----------|--------------------------------------------------------------|
//! | < 10      | d > 3.5 → кунай, иначе удар; держит дистанцию (отступает < 3) |
//! | 10..30    | d > 5 → кунай; изредка прыжок (i ≥ 15); иначе удар           |
//! | 30..50    | d > 5 → кунай; пинок; прыжок; иначе удар                     |
//! | 50..=80   | d > 5 → кунай; пинок; иначе удар; НЕ прыгает                 |
//! | > 80      | кунай/пинок с вероятностью; уворот прыжком только при 100    |
//!
//! Решение: чистая функция `decide`, ECS система только собирает контекст
//! и пишет `CharacterInput`.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::target::{AiTarget, TargetView};
use crate::adapter::{AdapterDisabled, DrivesCharacter};
use crate::controller::{CharacterConfig, CharacterController, CharacterInput};
use crate::DeterministicRng;

pub const MAX_INTELLIGENCE: u8 = 100;

/// Уровень интеллекта врага, всегда в 0..=100
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(from = "i32", into = "i32")]
#[require(AiTarget, ScaledAiConfig)]
pub struct Intelligence(u8);

impl Intelligence {
    /// Значения вне диапазона зажимаются (с предупреждением в лог)
    pub fn new(value: i32) -> Self {
        let clamped = value.clamp(0, MAX_INTELLIGENCE as i32);
        if clamped != value {
            crate::logger::log_warning(&format!(
                "Intelligence {} out of range 0..={}, clamped to {}",
                value, MAX_INTELLIGENCE, clamped
            ));
        }
        Self(clamped as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn band(&self) -> IntelligenceBand {
        match self.0 {
            0..=9 => IntelligenceBand::Novice,
            10..=29 => IntelligenceBand::Low,
            30..=49 => IntelligenceBand::Medium,
            50..=80 => IntelligenceBand::High,
            _ => IntelligenceBand::Elite,
        }
    }

    /// 1.0 при 0 → 1.5 при 100
    pub fn speed_multiplier(&self) -> f32 {
        1.0 + (self.0 as f32 / 100.0) * 0.5
    }

    pub fn can_block(&self) -> bool {
        self.0 >= 50
    }

    pub fn jump_allowed(&self) -> bool {
        !(50..=80).contains(&self.0)
    }
}

impl Default for Intelligence {
    fn default() -> Self {
        Self(50)
    }
}

impl From<i32> for Intelligence {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<Intelligence> for i32 {
    fn from(value: Intelligence) -> Self {
        value.0 as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntelligenceBand {
    /// < 10
    Novice,
    /// 10..30
    Low,
    /// 30..50
    Medium,
    /// 50..=80
    High,
    /// > 80
    Elite,
}

/// Действие, выбранное на тик
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaledAction {
    ThrowKunai,
    /// Наземный или drop-kick: решает контроллер по земле
    Kick,
    Punch,
    Jump,
}

/// Состояние персонажа, влияющее на выбор
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionContext {
    /// Атака/drop-kick/блок в процессе → никаких решений
    pub busy: bool,
    /// Прыжок разрешён и контроллером, и полосой интеллекта
    pub can_jump: bool,
}

/// Чистая функция выбора действия.
///
/// RNG тратится строго в порядке проверок, с коротким замыканием:
/// бросок делается, только если все условия слева от него выполнены.
pub fn decide(intelligence: Intelligence, distance: f32, ctx: DecisionContext, rng: &mut impl Rng) -> Option<ScaledAction> {
    if ctx.busy {
        return None;
    }

    let i = intelligence.value();
    let d = distance;

    let action = match intelligence.band() {
        IntelligenceBand::Novice => {
            if d > 3.5 {
                ScaledAction::ThrowKunai
            } else {
                ScaledAction::Punch
            }
        }
        IntelligenceBand::Low => {
            if d > 5.0 {
                ScaledAction::ThrowKunai
            } else if d > 2.0 && i >= 15 && ctx.can_jump && rng.gen::<f32>() < 0.1 {
                ScaledAction::Jump
            } else {
                ScaledAction::Punch
            }
        }
        IntelligenceBand::Medium => {
            if d > 5.0 {
                ScaledAction::ThrowKunai
            } else if d > 2.0 && rng.gen::<f32>() < 0.4 {
                ScaledAction::Kick
            } else if ctx.can_jump && rng.gen::<f32>() < 0.2 {
                ScaledAction::Jump
            } else {
                ScaledAction::Punch
            }
        }
        IntelligenceBand::High => {
            if d > 5.0 {
                ScaledAction::ThrowKunai
            } else if d > 2.0 && rng.gen::<f32>() < 0.5 {
                ScaledAction::Kick
            } else {
                ScaledAction::Punch
            }
        }
        IntelligenceBand::Elite => {
            if d > 5.0 && rng.gen::<f32>() < 0.7 {
                ScaledAction::ThrowKunai
            } else if d > 2.0 && rng.gen::<f32>() < 0.6 {
                ScaledAction::Kick
            } else if i == MAX_INTELLIGENCE && ctx.can_jump && rng.gen::<f32>() < 0.3 {
                ScaledAction::Jump
            } else {
                ScaledAction::Punch
            }
        }
    };

    Some(action)
}

/// Направление движения (X/Z, до speed scaling).
///
/// Novice держит дистанцию: ближе `retreat_distance`: отступает.
pub fn movement_direction(intelligence: Intelligence, to_target: Vec3, retreat_distance: f32, busy: bool) -> Vec2 {
    if busy {
        return Vec2::ZERO;
    }

    let mut direction = Vec3::new(to_target.x, 0.0, to_target.z);
    if direction.length() > 0.1 {
        direction = direction.normalize();
    }

    if intelligence.band() == IntelligenceBand::Novice && to_target.length() < retreat_distance {
        direction = -direction;
    }

    Vec2::new(direction.x.clamp(-1.0, 1.0), direction.z.clamp(-1.0, 1.0))
}

/// Конфиг scaled AI (пороги, не зависящие от интеллекта)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct ScaledAiConfig {
    /// Атакующая цель ближе этого → бросок блока
    pub block_range: f32,
    /// Вероятность блока за тик
    pub block_chance: f32,
    /// Novice отступает ближе этого
    pub retreat_distance: f32,
}

impl Default for ScaledAiConfig {
    fn default() -> Self {
        Self {
            block_range: 2.5,
            block_chance: 0.5,
            retreat_distance: 3.0,
        }
    }
}

impl DrivesCharacter for Intelligence {
    const ADAPTER_NAME: &'static str = "ScaledEnemy";
}

/// Полное решение scaled AI на тик (движение + блок + действие)
pub fn decide_scaled(
    intelligence: Intelligence,
    config: &ScaledAiConfig,
    my_position: Vec3,
    target: &TargetView,
    controller_busy: bool,
    controller_can_jump: bool,
    rng: &mut impl Rng,
) -> (CharacterInput, Option<ScaledAction>) {
    let to_target = target.position - my_position;
    let distance = to_target.length();

    // Блок первым: если решили блокировать, в этом тике больше ничего
    let blocking = intelligence.can_block()
        && target.is_attacking
        && distance < config.block_range
        && rng.gen::<f32>() < config.block_chance;

    let busy = controller_busy || blocking;
    let ctx = DecisionContext {
        busy,
        can_jump: intelligence.jump_allowed() && controller_can_jump,
    };

    let direction = movement_direction(intelligence, to_target, config.retreat_distance, busy);
    let mut input = CharacterInput::move_only(direction.x, direction.y)
        .with_speed_scale(intelligence.speed_multiplier())
        .with_block(blocking);

    let action = decide(intelligence, distance, ctx, rng);
    match action {
        Some(ScaledAction::ThrowKunai) => input.throw_kunai(),
        Some(ScaledAction::Kick) => input.kick(),
        Some(ScaledAction::Punch) => input.punch(),
        Some(ScaledAction::Jump) => input.jump(),
        None => {}
    }

    (input, action)
}

/// System: scaled AI → CharacterInput
pub fn scaled_enemy_decisions(
    mut enemies: Query<
        (
            &Transform,
            &Intelligence,
            &ScaledAiConfig,
            &AiTarget,
            &CharacterController,
            &CharacterConfig,
            &mut CharacterInput,
        ),
        Without<AdapterDisabled>,
    >,
    targets: Query<(&Transform, &CharacterController)>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs_f64();

    for (transform, intelligence, config, target, controller, character_config, mut input) in enemies.iter_mut() {
        let Some(view) = target
            .0
            .and_then(|entity| targets.get(entity).ok())
            .map(|(t, c)| TargetView::of(t, c))
        else {
            *input = CharacterInput::default();
            continue;
        };

        let (decided, _) = decide_scaled(
            *intelligence,
            config,
            transform.translation,
            &view,
            controller.is_busy(),
            controller.can_jump(now, character_config),
            &mut rng.rng,
        );

        *input = decided;
    }
}
