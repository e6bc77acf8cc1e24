//! Параметры персонажа (движение, прыжок, атаки, кунай).
//!
//! Все значения задаются снаружи; `#[serde(default)]` позволяет хосту
//! переопределить только часть полей.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::physics::collision::GROUND_LAYER;

/// Мёртвая зона осей ввода (и для running, и для разворота)
pub const INPUT_DEADZONE: f32 = 0.01;

/// Дополнительная lock-длительность удара на 2-й стадии комбо (секунды)
pub const PUNCH_STAGE_2_BONUS: f32 = 0.1;

/// Дополнительная lock-длительность удара на 3-й стадии комбо (секунды)
pub const PUNCH_STAGE_3_BONUS: f32 = 0.2;

/// Последняя стадия комбо (после неё: сброс)
pub const MAX_PUNCH_STAGE: u8 = 3;

/// Множитель дополнительной гравитации при падении
pub const FALL_GRAVITY_MULTIPLIER: f32 = 1.5;

/// Конфиг контроллера персонажа
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct CharacterConfig {
    /// Скорость ходьбы (m/s)
    pub move_speed: f32,
    /// Мгновенное изменение вертикальной скорости при прыжке (m/s)
    pub jump_force: f32,
    /// Радиус sphere-overlap проверки земли
    pub ground_radius: f32,
    /// Длина луча вниз от ground-check якоря
    pub ground_ray_length: f32,
    /// Битовая маска слоёв земли
    pub ground_layer: u32,
    /// Coyote time: окно после схода с платформы, когда первый прыжок ещё разрешён
    pub coyote_time: f32,
    /// Максимум прыжков до приземления (2 = double jump)
    pub max_jumps: u8,
    /// Базовый lock удара рукой (секунды)
    pub punch_lock: f32,
    /// Lock пинка (наземного и drop-kick)
    pub kick_lock: f32,
    /// Lock броска куная
    pub kunai_lock: f32,
    /// Бросок куная не блокирует движение
    pub kunai_allows_movement: bool,
    /// Окно сброса комбо без нового удара (секунды)
    pub combo_reset_time: f32,
    /// Скорость куная (m/s)
    pub kunai_speed: f32,
    /// Смещение поворота куная, градусы (x, y, z)
    pub kunai_rotation_offset: [f32; 3],
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 7.5,
            ground_radius: 0.15,
            ground_ray_length: 0.35,
            ground_layer: GROUND_LAYER,
            coyote_time: 0.1,
            max_jumps: 2,
            punch_lock: 0.35,
            kick_lock: 0.45,
            kunai_lock: 0.40,
            kunai_allows_movement: false,
            combo_reset_time: 1.5,
            kunai_speed: 12.0,
            kunai_rotation_offset: [0.0; 3],
        }
    }
}

impl CharacterConfig {
    /// Lock удара с учётом стадии комбо (чем глубже комбо, тем дольше анимация)
    pub fn punch_lock_for_stage(&self, stage: u8) -> f32 {
        match stage {
            2 => self.punch_lock + PUNCH_STAGE_2_BONUS,
            3 => self.punch_lock + PUNCH_STAGE_3_BONUS,
            _ => self.punch_lock,
        }
    }

    pub fn kunai_rotation_offset(&self) -> Vec3 {
        Vec3::from_array(self.kunai_rotation_offset)
    }
}
