//! Input snapshot контроллера на один тик.
//!
//! Каждый адаптер (игрок, reactive AI, scaled AI) пишет `CharacterInput`,
//! контроллер читает его ровно раз за тик в `process_input`.
//! Оси и блок: удерживаемое состояние. jump/punch/kick/kunai: edges,
//! сбрасываются после тика.

use bevy::prelude::*;

/// Атака, запущенная контроллером в этом тике (не хранится)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AttackRequest {
    Punch,
    KickGround,
    KickAir,
    ThrowKunai,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CharacterInput {
    /// Ось X, [-1, 1]
    pub move_x: f32,
    /// Ось глубины (Z), [-1, 1]
    pub move_z: f32,
    /// Множитель скорости (полосы погони AI, intelligence scaling)
    pub speed_scale: f32,
    pub jump: bool,
    pub punch: bool,
    pub kick: bool,
    pub kunai: bool,
    /// Удерживается, не edge
    pub block: bool,
}

impl Default for CharacterInput {
    fn default() -> Self {
        Self {
            move_x: 0.0,
            move_z: 0.0,
            speed_scale: 1.0,
            jump: false,
            punch: false,
            kick: false,
            kunai: false,
            block: false,
        }
    }
}

impl CharacterInput {
    /// Только движение, без edges
    pub fn move_only(x: f32, z: f32) -> Self {
        Self {
            move_x: x,
            move_z: z,
            ..default()
        }
    }

    pub fn jump_only() -> Self {
        Self {
            jump: true,
            ..default()
        }
    }

    pub fn punch_only() -> Self {
        Self {
            punch: true,
            ..default()
        }
    }

    pub fn kick_only() -> Self {
        Self {
            kick: true,
            ..default()
        }
    }

    pub fn kunai_only() -> Self {
        Self {
            kunai: true,
            ..default()
        }
    }

    pub fn with_axes(mut self, x: f32, z: f32) -> Self {
        self.move_x = x;
        self.move_z = z;
        self
    }

    pub fn with_block(mut self, block: bool) -> Self {
        self.block = block;
        self
    }

    pub fn with_speed_scale(mut self, scale: f32) -> Self {
        self.speed_scale = scale;
        self
    }

    // --- legacy API: по одному действию, сливается в текущий snapshot ---

    pub fn set_movement(&mut self, x: f32, z: f32) {
        self.move_x = x.clamp(-1.0, 1.0);
        self.move_z = z.clamp(-1.0, 1.0);
    }

    pub fn set_blocking(&mut self, block: bool) {
        self.block = block;
    }

    pub fn jump(&mut self) {
        self.jump = true;
    }

    pub fn punch(&mut self) {
        self.punch = true;
    }

    pub fn kick(&mut self) {
        self.kick = true;
    }

    pub fn throw_kunai(&mut self) {
        self.kunai = true;
    }

    pub fn has_edges(&self) -> bool {
        self.jump || self.punch || self.kick || self.kunai
    }

    /// Сброс одноразовых edges после тика контроллера
    pub fn clear_edges(&mut self) {
        self.jump = false;
        self.punch = false;
        self.kick = false;
        self.kunai = false;
    }
}
