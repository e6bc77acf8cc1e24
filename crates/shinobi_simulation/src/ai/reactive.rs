//! Reactive enemy: преследует цель, атакует вблизи, иногда блокирует.
//!
//! Полосы дистанции (по горизонтали X/Z):
//! - d > attack_distance → бежим на полной chase_speed
//! - stop_distance < d ≤ attack_distance → половина chase_speed
//! - d ≤ stop_distance → стоим, атакуем по cooldown (weighted roll)
//!
//! Никогда не прыгает.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::target::{AiTarget, TargetView};
use crate::adapter::{AdapterDisabled, DrivesCharacter};
use crate::controller::{ActionLock, CharacterController, CharacterInput};
use crate::DeterministicRng;

/// Конфиг reactive AI
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct ReactiveAiConfig {
    /// Дальше: бежим на полной скорости
    pub attack_distance: f32,
    /// Ближе: стоим и бьём
    pub stop_distance: f32,
    /// Множитель скорости погони
    pub chase_speed: f32,
    /// Минимальный интервал между атаками (секунды)
    pub attack_cooldown: f32,
    /// Доля куная в броске атаки
    pub kunai_chance: f32,
    /// Доля пинка (после куная); остальное: удар рукой
    pub kick_chance: f32,
    /// Вероятность блока за тик, когда цель атакует рядом
    pub block_chance: f32,
}

impl Default for ReactiveAiConfig {
    fn default() -> Self {
        Self {
            attack_distance: 1.5,
            stop_distance: 1.0,
            chase_speed: 1.0,
            attack_cooldown: 0.8,
            kunai_chance: 0.15,
            kick_chance: 0.35,
            block_chance: 0.3,
        }
    }
}

impl ReactiveAiConfig {
    /// Радиус, в котором атакующая цель провоцирует блок
    pub fn block_range(&self) -> f32 {
        self.attack_distance * 1.5
    }
}

/// Reactive enemy adapter (состояние между тиками)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(AiTarget, ReactiveAiConfig)]
pub struct ReactiveEnemy {
    pub last_attack_time: f64,
}

impl Default for ReactiveEnemy {
    fn default() -> Self {
        Self {
            last_attack_time: f64::NEG_INFINITY,
        }
    }
}

impl ReactiveEnemy {
    /// Cooldown стартует, только если контроллер действительно примет атаку
    pub fn record_attack(&mut self, decision: &ReactiveDecision, lock: ActionLock, now: f64) {
        if decision.attack.is_some() && lock.admits_attack(now, decision.input.block) {
            self.last_attack_time = now;
        }
    }
}

impl DrivesCharacter for ReactiveEnemy {
    const ADAPTER_NAME: &'static str = "ReactiveEnemy";
}

/// Выбор атаки по weighted roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactiveAttack {
    Kunai,
    Kick,
    Punch,
}

/// Решение на один тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactiveDecision {
    pub input: CharacterInput,
    pub attack: Option<ReactiveAttack>,
}

/// Что AI знает о себе в этом тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactiveSelf {
    pub position: Vec3,
    pub is_attacking: bool,
    pub last_attack_time: f64,
}

/// Чистая функция решения reactive AI.
///
/// Порядок RNG: сначала бросок блока (если цель атакует в радиусе),
/// потом бросок атаки (если стоим вплотную и cooldown готов).
/// Блок в этом тике исключает атаку.
pub fn decide_reactive(
    config: &ReactiveAiConfig,
    me: ReactiveSelf,
    target: Option<TargetView>,
    now: f64,
    rng: &mut impl Rng,
) -> ReactiveDecision {
    let Some(target) = target else {
        return ReactiveDecision {
            input: CharacterInput::default(),
            attack: None,
        };
    };

    let to_target = target.position - me.position;
    let horizontal = Vec3::new(to_target.x, 0.0, to_target.z);
    let distance = horizontal.length();
    let direction = horizontal.normalize_or_zero();

    let mut input = CharacterInput::default();

    if distance > config.attack_distance {
        input = input.with_axes(direction.x, direction.z).with_speed_scale(config.chase_speed);
    } else if distance > config.stop_distance {
        input = input.with_axes(direction.x, direction.z).with_speed_scale(config.chase_speed * 0.5);
    }

    let blocking =
        target.is_attacking && distance <= config.block_range() && rng.gen::<f32>() < config.block_chance;
    input.block = blocking;

    let mut attack = None;
    let cooldown_ready = now - me.last_attack_time >= config.attack_cooldown as f64;

    if !blocking && distance <= config.stop_distance && !me.is_attacking && cooldown_ready {
        let roll = rng.gen::<f32>();
        let chosen = if roll < config.kunai_chance {
            ReactiveAttack::Kunai
        } else if roll < config.kunai_chance + config.kick_chance {
            ReactiveAttack::Kick
        } else {
            ReactiveAttack::Punch
        };

        match chosen {
            ReactiveAttack::Kunai => input.throw_kunai(),
            ReactiveAttack::Kick => input.kick(),
            ReactiveAttack::Punch => input.punch(),
        }
        attack = Some(chosen);
    }

    ReactiveDecision { input, attack }
}

/// System: reactive AI → CharacterInput
pub fn reactive_enemy_decisions(
    mut enemies: Query<
        (
            &Transform,
            &ReactiveAiConfig,
            &mut ReactiveEnemy,
            &AiTarget,
            &CharacterController,
            &mut CharacterInput,
        ),
        Without<AdapterDisabled>,
    >,
    targets: Query<(&Transform, &CharacterController)>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs_f64();

    for (transform, config, mut enemy, target, controller, mut input) in enemies.iter_mut() {
        let view = target
            .0
            .and_then(|entity| targets.get(entity).ok())
            .map(|(t, c)| TargetView::of(t, c));

        let me = ReactiveSelf {
            position: transform.translation,
            is_attacking: controller.is_attacking(),
            last_attack_time: enemy.last_attack_time,
        };

        let decision = decide_reactive(config, me, view, now, &mut rng.rng);
        enemy.record_attack(&decision, controller.lock(), now);

        *input = decision.input;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn me_at(x: f32) -> ReactiveSelf {
        ReactiveSelf {
            position: Vec3::new(x, 0.0, 0.0),
            is_attacking: false,
            last_attack_time: f64::NEG_INFINITY,
        }
    }

    fn target_at(x: f32, attacking: bool) -> TargetView {
        TargetView {
            position: Vec3::new(x, 0.0, 0.0),
            facing: -1.0,
            is_attacking: attacking,
            is_grounded: true,
            is_blocking: false,
        }
    }

    #[test]
    fn test_no_target_idles() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let decision = decide_reactive(&ReactiveAiConfig::default(), me_at(0.0), None, 0.0, &mut rng);
        assert_eq!(decision.input, CharacterInput::default());
        assert_eq!(decision.attack, None);
    }

    #[test]
    fn test_distance_bands_scale_chase() {
        let config = ReactiveAiConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let far = decide_reactive(&config, me_at(0.0), Some(target_at(5.0, false)), 0.0, &mut rng);
        assert_eq!(far.input.move_x, 1.0);
        assert_eq!(far.input.speed_scale, 1.0);
        assert_eq!(far.attack, None);

        let closing = decide_reactive(&config, me_at(0.0), Some(target_at(-1.2, false)), 0.0, &mut rng);
        assert_eq!(closing.input.move_x, -1.0);
        assert_eq!(closing.input.speed_scale, 0.5);
        assert_eq!(closing.attack, None);

        let close = decide_reactive(&config, me_at(0.0), Some(target_at(0.8, false)), 0.0, &mut rng);
        assert_eq!(close.input.move_x, 0.0);
        assert!(close.attack.is_some());
        assert!(close.input.has_edges());
    }

    #[test]
    fn test_cooldown_blocks_repeat_attacks() {
        let config = ReactiveAiConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut me = me_at(0.0);
        me.last_attack_time = 1.0;

        let early = decide_reactive(&config, me, Some(target_at(0.5, false)), 1.5, &mut rng);
        assert_eq!(early.attack, None);

        let ready = decide_reactive(&config, me, Some(target_at(0.5, false)), 1.9, &mut rng);
        assert!(ready.attack.is_some());
    }

    #[test]
    fn test_refused_attack_keeps_cooldown_ready() {
        let config = ReactiveAiConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut enemy = ReactiveEnemy::default();

        // Пинок в воздухе ещё идёт: контроллер откажет, cooldown не тратим
        let decision = decide_reactive(&config, me_at(0.0), Some(target_at(0.5, false)), 2.0, &mut rng);
        assert!(decision.attack.is_some());
        enemy.record_attack(&decision, ActionLock::DropKicking { until: 2.3 }, 2.0);
        assert_eq!(enemy.last_attack_time, f64::NEG_INFINITY);

        // Следующий тик после приземления: атака проходит сразу
        let me = ReactiveSelf {
            last_attack_time: enemy.last_attack_time,
            ..me_at(0.0)
        };
        let retry = decide_reactive(&config, me, Some(target_at(0.5, false)), 2.02, &mut rng);
        assert!(retry.attack.is_some());
        enemy.record_attack(&retry, ActionLock::Free, 2.02);
        assert_eq!(enemy.last_attack_time, 2.02);
    }

    #[test]
    fn test_never_jumps() {
        let config = ReactiveAiConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for i in 0..500 {
            let x = (i % 50) as f32 * 0.1;
            let decision = decide_reactive(&config, me_at(0.0), Some(target_at(x, i % 3 == 0)), i as f64, &mut rng);
            assert!(!decision.input.jump);
        }
    }

    #[test]
    fn test_block_is_probabilistic() {
        let config = ReactiveAiConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut blocks = 0;
        const TRIALS: usize = 2000;

        for _ in 0..TRIALS {
            let mut me = me_at(0.0);
            me.is_attacking = true;
            let decision = decide_reactive(&config, me, Some(target_at(2.0, true)), 0.0, &mut rng);
            if decision.input.block {
                blocks += 1;
            }
        }

        let ratio = blocks as f32 / TRIALS as f32;
        assert!((ratio - 0.3).abs() < 0.05, "block ratio = {ratio}");
    }

    #[test]
    fn test_no_block_outside_range_or_when_target_idle() {
        let config = ReactiveAiConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let far = decide_reactive(&config, me_at(0.0), Some(target_at(2.3, true)), 0.0, &mut rng);
            assert!(!far.input.block);
            let idle = decide_reactive(&config, me_at(0.0), Some(target_at(1.2, false)), 0.0, &mut rng);
            assert!(!idle.input.block);
        }
    }

    #[test]
    fn test_attack_weights() {
        let config = ReactiveAiConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut counts = [0usize; 3];
        const TRIALS: usize = 3000;

        for _ in 0..TRIALS {
            match decide_reactive(&config, me_at(0.0), Some(target_at(0.5, false)), 0.0, &mut rng).attack {
                Some(ReactiveAttack::Kunai) => counts[0] += 1,
                Some(ReactiveAttack::Kick) => counts[1] += 1,
                Some(ReactiveAttack::Punch) => counts[2] += 1,
                None => panic!("cooldown never stamped in pure decision"),
            }
        }

        let share = |n: usize| n as f32 / TRIALS as f32;
        assert!((share(counts[0]) - 0.15).abs() < 0.04);
        assert!((share(counts[1]) - 0.35).abs() < 0.04);
        assert!((share(counts[2]) - 0.50).abs() < 0.04);
    }
}
