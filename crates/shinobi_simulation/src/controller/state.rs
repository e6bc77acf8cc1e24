//! CharacterController: state machine персонажа.
//!
//! Единственный источник правды для "может ли персонаж сделать X сейчас".
//! Единственная точка мутации: `process_input` (один вызов на тик);
//! legacy API (`jump`, `punch`, ...): тонкие обёртки над ней.
//!
//! Порядок внутри тика:
//! 1. Оси/блок из снапшота ввода
//! 2. Истёкшие lock'и (дедлайны) → Free, сброс комбо после 3-й стадии
//! 3. Ground sample → landing transition (сброс прыжков, drop-kick, flip)
//! 4. Блок
//! 5. Прыжок
//! 6. Максимум одна атака (punch > kick > kunai)
//! 7. Таймаут комбо
//! 8. Drop-kick снимается на земле
//! 9. Публикация animation bools
//!
//! Физический проход (`apply_movement`, `fall_acceleration`) вызывается
//! отдельно, после всех решений тика.

use bevy::prelude::*;

use super::config::{CharacterConfig, FALL_GRAVITY_MULTIPLIER, INPUT_DEADZONE, MAX_PUNCH_STAGE};
use super::ground::{GroundCheck, GroundContact};
use super::input::{AttackRequest, CharacterInput};
use super::lock::{ActionLock, AttackKind, ExpiredLock};
use crate::animation::{AnimBool, AnimInt, AnimTrigger, AnimationSink, Animator};
use crate::physics::PhysicsBody;

/// Внешние данные одного тика контроллера
pub struct TickContext<'a> {
    /// Время симуляции (секунды)
    pub now: f64,
    /// Результат ground probe этого тика
    pub grounded: bool,
    pub config: &'a CharacterConfig,
    pub body: &'a mut PhysicsBody,
    pub animator: &'a mut dyn AnimationSink,
}

/// Что произошло за тик (для адаптеров/спавна снарядов)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutcome {
    /// Номер выполненного прыжка (1 = jump, 2 = flip)
    pub jumped: Option<u8>,
    pub attack: Option<AttackRequest>,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(
    CharacterConfig,
    CharacterInput,
    PhysicsBody,
    GroundCheck,
    GroundContact,
    Animator,
    Transform
)]
pub struct CharacterController {
    /// ±1 по оси X
    facing: f32,
    grounded: bool,
    was_grounded: bool,
    jump_count: u8,
    last_grounded_time: f64,
    lock: ActionLock,
    block_held: bool,
    flipping: bool,
    /// 0 = нет комбо, 1..=3
    punch_stage: u8,
    last_punch_time: f64,
    input_x: f32,
    input_z: f32,
    speed_scale: f32,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self {
            facing: 1.0,
            grounded: false,
            was_grounded: false,
            jump_count: 0,
            last_grounded_time: f64::NEG_INFINITY,
            lock: ActionLock::Free,
            block_held: false,
            flipping: false,
            punch_stage: 0,
            last_punch_time: f64::NEG_INFINITY,
            input_x: 0.0,
            input_z: 0.0,
            speed_scale: 1.0,
        }
    }
}

impl CharacterController {
    // ========================================================================
    // Read-only query surface (AI читает чужих персонажей только через это)
    // ========================================================================

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_attacking(&self) -> bool {
        self.lock.is_attacking()
    }

    pub fn is_drop_kicking(&self) -> bool {
        self.lock.is_drop_kicking()
    }

    pub fn is_blocking(&self) -> bool {
        self.lock.is_blocking()
    }

    pub fn is_flipping(&self) -> bool {
        self.flipping
    }

    /// Занят (атака, drop-kick или блок)
    pub fn is_busy(&self) -> bool {
        self.lock.gates_movement()
    }

    pub fn lock(&self) -> ActionLock {
        self.lock
    }

    pub fn jump_count(&self) -> u8 {
        self.jump_count
    }

    pub fn punch_stage(&self) -> u8 {
        self.punch_stage
    }

    pub fn last_grounded_time(&self) -> f64 {
        self.last_grounded_time
    }

    pub fn movement_input(&self) -> Vec2 {
        Vec2::new(self.input_x, self.input_z)
    }

    /// Удерживаемая часть ввода (оси + блок) без edges
    pub fn held_input(&self) -> CharacterInput {
        CharacterInput::move_only(self.input_x, self.input_z)
            .with_block(self.block_held)
            .with_speed_scale(self.speed_scale)
    }

    /// Jump arbitration: лимит прыжков + coyote time для первого прыжка
    pub fn can_jump(&self, now: f64, config: &CharacterConfig) -> bool {
        if self.jump_count >= config.max_jumps {
            return false;
        }

        if self.jump_count == 0 {
            let within_coyote = now - self.last_grounded_time <= config.coyote_time as f64;
            return self.grounded || within_coyote;
        }

        // Второй и следующие прыжки независимо от земли (double jump)
        true
    }

    // ========================================================================
    // Unified entry point
    // ========================================================================

    pub fn process_input(&mut self, input: &CharacterInput, ctx: &mut TickContext) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        self.input_x = input.move_x.clamp(-1.0, 1.0);
        self.input_z = input.move_z.clamp(-1.0, 1.0);
        self.speed_scale = input.speed_scale.max(0.0);
        self.block_held = input.block;

        self.expire_locks(ctx);
        self.apply_ground_sample(ctx.grounded, ctx.body.velocity.y, ctx.now);
        self.update_block();

        if input.jump && self.lock.is_free() && self.can_jump(ctx.now, ctx.config) {
            let index = self.jump_count.saturating_add(1);
            self.perform_jump(index, ctx);
            outcome.jumped = Some(index);
        }

        if self.lock.is_free() {
            if let Some(request) = self.select_attack(input) {
                self.dispatch_attack(request, ctx);
                outcome.attack = Some(request);
            }
        }

        self.age_combo(ctx);

        // Приземление снимает drop-kick независимо от таймера
        if self.lock.is_drop_kicking() && self.grounded && ctx.body.velocity.y <= 0.0 {
            self.lock = ActionLock::Free;
            self.update_block();
        }

        self.publish(ctx.animator);

        outcome
    }

    // --- legacy per-action API: синтезируют однонаправленный ввод ---

    pub fn set_movement(&mut self, x: f32, z: f32, ctx: &mut TickContext) -> TickOutcome {
        let input = self.held_input().with_axes(x, z);
        self.process_input(&input, ctx)
    }

    pub fn set_blocking(&mut self, block: bool, ctx: &mut TickContext) -> TickOutcome {
        let input = self.held_input().with_block(block);
        self.process_input(&input, ctx)
    }

    pub fn jump(&mut self, ctx: &mut TickContext) -> TickOutcome {
        let mut input = self.held_input();
        input.jump();
        self.process_input(&input, ctx)
    }

    pub fn punch(&mut self, ctx: &mut TickContext) -> TickOutcome {
        let mut input = self.held_input();
        input.punch();
        self.process_input(&input, ctx)
    }

    pub fn kick(&mut self, ctx: &mut TickContext) -> TickOutcome {
        let mut input = self.held_input();
        input.kick();
        self.process_input(&input, ctx)
    }

    pub fn throw_kunai(&mut self, ctx: &mut TickContext) -> TickOutcome {
        let mut input = self.held_input();
        input.throw_kunai();
        self.process_input(&input, ctx)
    }

    // ========================================================================
    // Physics pass
    // ========================================================================

    /// Горизонтальная скорость от ввода + разворот по оси X.
    ///
    /// Возвращает true, если facing изменился.
    pub fn apply_movement(&mut self, config: &CharacterConfig, body: &mut PhysicsBody) -> bool {
        if self.lock.zeroes_velocity() {
            body.velocity.x = 0.0;
            body.velocity.z = 0.0;
            return false;
        }
        // Drop-kick сохраняет инерцию
        if self.lock.gates_movement() {
            return false;
        }

        let direction = Vec3::new(self.input_x, 0.0, self.input_z).normalize_or_zero();
        let speed = config.move_speed * self.speed_scale;

        // Y velocity остаётся (гравитация/прыжок)
        body.velocity.x = direction.x * speed;
        body.velocity.z = direction.z * speed;

        if self.input_x.abs() > INPUT_DEADZONE {
            let facing = self.input_x.signum();
            if facing != self.facing {
                self.facing = facing;
                return true;
            }
        }
        false
    }

    /// Дополнительное ускорение при падении (только в воздухе и вниз)
    pub fn fall_acceleration(&self, vertical_velocity: f32, gravity: f32) -> f32 {
        if !self.grounded && vertical_velocity < 0.0 {
            gravity * FALL_GRAVITY_MULTIPLIER
        } else {
            0.0
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn expire_locks(&mut self, ctx: &mut TickContext) {
        let Some(expired) = self.lock.expire(ctx.now) else {
            return;
        };

        // Конец lock'а третьего удара закрывает комбо сразу
        if let ExpiredLock::Attack(AttackKind::Punch { .. }) = expired {
            if self.punch_stage >= MAX_PUNCH_STAGE {
                self.reset_combo(ctx.animator);
            }
        }
    }

    fn apply_ground_sample(&mut self, grounded_now: bool, vertical_velocity: f32, now: f64) {
        if grounded_now {
            self.last_grounded_time = now;
        }

        // Landing transition: был в воздухе, теперь на земле и не летит вверх
        if grounded_now && !self.was_grounded && vertical_velocity <= 0.0 {
            self.jump_count = 0;
            self.flipping = false;
            if self.lock.is_drop_kicking() {
                self.lock = ActionLock::Free;
            }
        }

        self.grounded = grounded_now;
        self.was_grounded = grounded_now;
    }

    /// Блок удерживается извне; во время атаки откладывается до её конца
    fn update_block(&mut self) {
        match (self.lock, self.block_held) {
            (ActionLock::Free, true) => self.lock = ActionLock::Blocking,
            (ActionLock::Blocking, false) => self.lock = ActionLock::Free,
            _ => {}
        }
    }

    fn perform_jump(&mut self, index: u8, ctx: &mut TickContext) {
        // Обнуляем вертикаль и даём мгновенный импульс (velocity change)
        ctx.body.velocity.y = 0.0;
        ctx.body.velocity.y += ctx.config.jump_force;

        match index {
            1 => {
                ctx.animator.set_trigger(AnimTrigger::Jump);
                self.flipping = false;
            }
            2 => {
                ctx.animator.set_trigger(AnimTrigger::Flip);
                self.flipping = true;
            }
            _ => {}
        }

        self.jump_count = index.min(ctx.config.max_jumps);
    }

    fn select_attack(&self, input: &CharacterInput) -> Option<AttackRequest> {
        if input.punch {
            Some(AttackRequest::Punch)
        } else if input.kick {
            // kick + jump в один тик → всегда воздушный вариант
            if self.grounded && !input.jump {
                Some(AttackRequest::KickGround)
            } else {
                Some(AttackRequest::KickAir)
            }
        } else if input.kunai {
            Some(AttackRequest::ThrowKunai)
        } else {
            None
        }
    }

    fn dispatch_attack(&mut self, request: AttackRequest, ctx: &mut TickContext) {
        let now = ctx.now;
        let config = ctx.config;

        match request {
            AttackRequest::Punch => {
                self.punch_stage = if self.punch_stage >= MAX_PUNCH_STAGE {
                    1
                } else {
                    self.punch_stage + 1
                };
                self.last_punch_time = now;

                ctx.animator.set_integer(AnimInt::PunchStage, self.punch_stage as i32);
                ctx.animator.set_trigger(AnimTrigger::Punch);

                let lock_time = config.punch_lock_for_stage(self.punch_stage);
                self.lock = ActionLock::Attacking {
                    kind: AttackKind::Punch {
                        stage: self.punch_stage,
                    },
                    until: now + lock_time as f64,
                };
            }
            AttackRequest::KickGround => {
                ctx.animator.set_trigger(AnimTrigger::KickGround);
                self.lock = ActionLock::Attacking {
                    kind: AttackKind::KickGround,
                    until: now + config.kick_lock as f64,
                };
            }
            AttackRequest::KickAir => {
                ctx.animator.set_trigger(AnimTrigger::KickAir);
                self.lock = ActionLock::DropKicking {
                    until: now + config.kick_lock as f64,
                };
            }
            AttackRequest::ThrowKunai => {
                ctx.animator.set_trigger(AnimTrigger::Kunai);
                if !config.kunai_allows_movement {
                    self.lock = ActionLock::Attacking {
                        kind: AttackKind::Kunai,
                        until: now + config.kunai_lock as f64,
                    };
                }
            }
        }
    }

    fn age_combo(&mut self, ctx: &mut TickContext) {
        if self.punch_stage > 0 && ctx.now - self.last_punch_time > ctx.config.combo_reset_time as f64 {
            self.reset_combo(ctx.animator);
        }
    }

    fn reset_combo(&mut self, animator: &mut dyn AnimationSink) {
        self.punch_stage = 0;
        animator.set_integer(AnimInt::PunchStage, 0);
    }

    fn publish(&self, animator: &mut dyn AnimationSink) {
        let moving = self.input_x.abs() > INPUT_DEADZONE || self.input_z.abs() > INPUT_DEADZONE;
        let running = moving && self.grounded && self.lock.is_free();

        animator.set_bool(AnimBool::Running, running);
        animator.set_bool(AnimBool::Grounded, self.grounded);
        animator.set_bool(AnimBool::DropKicking, self.lock.is_drop_kicking());
        animator.set_bool(AnimBool::Flipping, self.flipping);
        animator.set_bool(AnimBool::Blocking, self.lock.is_blocking());
    }
}

/// Поворот, при котором `Transform::forward()` смотрит в +X * facing
pub fn facing_rotation(facing: f32) -> Quat {
    let sign = if facing < 0.0 { -1.0 } else { 1.0 };
    Quat::from_rotation_y(-sign * std::f32::consts::FRAC_PI_2)
}
