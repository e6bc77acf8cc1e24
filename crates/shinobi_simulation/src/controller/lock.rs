//! ActionLock: взаимоисключающее "занятое" состояние персонажа.
//!
//! Одно значение вместо набора флагов attacking/drop-kicking/blocking:
//! атака и блок физически не могут быть выставлены одновременно.
//!
//! Таймеры: дедлайны (время симуляции), проверяются контроллером в начале тика.

use bevy::prelude::*;

/// Какая атака держит lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AttackKind {
    /// Удар рукой с номером стадии комбо (1..=3)
    Punch { stage: u8 },
    /// Наземный пинок
    KickGround,
    /// Бросок куная
    Kunai,
}

/// Состояние lock'а действий
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum ActionLock {
    /// Свободен: движение и любые действия разрешены
    #[default]
    Free,

    /// Атака: движение заблокировано, горизонтальная скорость обнулена
    Attacking {
        kind: AttackKind,
        /// Время симуляции, когда lock снимается
        until: f64,
    },

    /// Drop-kick в воздухе: движение заблокировано, скорость НЕ трогаем (инерция).
    /// Снимается по таймеру или при приземлении, что раньше.
    DropKicking { until: f64 },

    /// Блок (удерживается извне, без таймера)
    Blocking,
}

/// Что истекло при проверке дедлайна
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiredLock {
    Attack(AttackKind),
    DropKick,
}

impl ActionLock {
    pub fn is_free(&self) -> bool {
        matches!(self, ActionLock::Free)
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self, ActionLock::Attacking { .. })
    }

    pub fn is_drop_kicking(&self) -> bool {
        matches!(self, ActionLock::DropKicking { .. })
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, ActionLock::Blocking)
    }

    /// Движение от ввода запрещено
    pub fn gates_movement(&self) -> bool {
        !self.is_free()
    }

    /// Горизонтальная скорость принудительно нулевая
    pub fn zeroes_velocity(&self) -> bool {
        matches!(self, ActionLock::Attacking { .. } | ActionLock::Blocking)
    }

    pub fn deadline(&self) -> Option<f64> {
        match self {
            ActionLock::Attacking { until, .. } | ActionLock::DropKicking { until } => Some(*until),
            _ => None,
        }
    }

    /// Примет ли контроллер атаку на тике `now`: дедлайн истёк и блок не удерживается
    pub fn admits_attack(&self, now: f64, block_held: bool) -> bool {
        if block_held {
            return false;
        }
        self.deadline().is_none_or(|until| now >= until)
    }

    /// Снимает lock, если его дедлайн наступил
    pub fn expire(&mut self, now: f64) -> Option<ExpiredLock> {
        let expired = match *self {
            ActionLock::Attacking { kind, until } if now >= until => ExpiredLock::Attack(kind),
            ActionLock::DropKicking { until } if now >= until => ExpiredLock::DropKick,
            _ => return None,
        };

        *self = ActionLock::Free;
        Some(expired)
    }
}
