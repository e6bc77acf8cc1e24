//! Общая обвязка адаптеров (игрок, AI), которые управляют CharacterController.
//!
//! Адаптер без контроллера на той же entity: ошибка сцены: логируем
//! `SetupError` и помечаем `AdapterDisabled`, дальше адаптер пропускается.

use bevy::prelude::*;

use crate::controller::CharacterController;
use crate::error::SetupError;

/// Marker: адаптер выключен из-за ошибки конфигурации
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AdapterDisabled;

/// Компонент-адаптер, который пишет `CharacterInput` своему персонажу
pub trait DrivesCharacter: Component {
    /// Имя для логов
    const ADAPTER_NAME: &'static str;
}

/// System: выключает новые адаптеры без `CharacterController`
pub fn disable_adapters_without_controller<A: DrivesCharacter>(
    mut commands: Commands,
    adapters: Query<Entity, (Added<A>, Without<CharacterController>)>,
) {
    for entity in adapters.iter() {
        let error = SetupError::MissingController {
            adapter: A::ADAPTER_NAME,
            entity,
        };
        crate::logger::log_error(&error.to_string());
        commands.entity(entity).insert(AdapterDisabled);
    }
}
