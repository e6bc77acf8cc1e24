//! Ошибки конфигурации сцены.
//!
//! Отказ в действии (прыжок во время атаки и т.п.): НЕ ошибка, это gameplay gate.
//! Сюда попадает только то, из-за чего адаптер/компонент выключает себя.

use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    /// Адаптер (игрок или AI) висит на entity без CharacterController
    #[error("{adapter} on {entity:?} has no CharacterController to drive")]
    MissingController {
        adapter: &'static str,
        entity: Entity,
    },

    /// CameraFollow без камеры на той же entity
    #[error("camera follow on {entity:?} has no camera transform to move")]
    MissingCamera { entity: Entity },
}
