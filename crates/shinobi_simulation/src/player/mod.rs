//! Player control
//!
//! Хост (окно, геймпад, сеть) шлёт `PlayerInputEvent`; система сворачивает
//! события тика в один `CharacterInput` для каждой `Player` entity.

use bevy::prelude::*;

use crate::adapter::{disable_adapters_without_controller, AdapterDisabled, DrivesCharacter};
use crate::controller::CharacterInput;
use crate::ShinobiSet;

/// Marker component для player-controlled entity
///
/// Акторы БЕЗ этого компонента управляются AI systems.
/// Input systems используют `With<Player>` filter.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

impl DrivesCharacter for Player {
    const ADAPTER_NAME: &'static str = "Player input";
}

/// Player input event - генерируется хостом каждый frame
///
/// # Fields
/// - `move_direction`: x → ось X, y → ось Z (depth)
/// - `jump`, `punch`, `kick`, `kunai`: just_pressed
/// - `block`: удерживается
#[derive(Event, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInputEvent {
    pub move_direction: Vec2,
    pub jump: bool,
    pub punch: bool,
    pub kick: bool,
    pub kunai: bool,
    pub block: bool,
}

/// Кнопки в "удерживаемом" виде (как их отдают большинство хостов)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldButtons {
    pub jump: bool,
    pub punch: bool,
    pub kick: bool,
    pub kunai: bool,
    pub block: bool,
}

/// Held → just_pressed для хостов без edge-событий
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonEdges {
    previous: HeldButtons,
}

impl ButtonEdges {
    pub fn to_event(&mut self, move_direction: Vec2, held: HeldButtons) -> PlayerInputEvent {
        let previous = std::mem::replace(&mut self.previous, held);

        PlayerInputEvent {
            move_direction,
            jump: held.jump && !previous.jump,
            punch: held.punch && !previous.punch,
            kick: held.kick && !previous.kick,
            kunai: held.kunai && !previous.kunai,
            block: held.block,
        }
    }
}

/// Сворачивает события тика: оси/блок: последние, edges: OR
pub fn fold_player_events<'a>(
    base: CharacterInput,
    events: impl IntoIterator<Item = &'a PlayerInputEvent>,
) -> CharacterInput {
    events.into_iter().fold(base, |mut input, event| {
        input.set_movement(event.move_direction.x, event.move_direction.y);
        input.set_blocking(event.block);
        input.jump |= event.jump;
        input.punch |= event.punch;
        input.kick |= event.kick;
        input.kunai |= event.kunai;
        input
    })
}

/// System: PlayerInputEvent → CharacterInput
///
/// Без событий в тике удерживаемая часть ввода сохраняется.
pub fn apply_player_input(
    mut events: EventReader<PlayerInputEvent>,
    mut players: Query<&mut CharacterInput, (With<Player>, Without<AdapterDisabled>)>,
) {
    let events: Vec<PlayerInputEvent> = events.read().copied().collect();
    if events.is_empty() {
        return;
    }

    for mut input in players.iter_mut() {
        *input = fold_player_events(*input, &events);
    }
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerInputEvent>()
            .add_systems(PreUpdate, disable_adapters_without_controller::<Player>)
            .add_systems(FixedUpdate, apply_player_input.in_set(ShinobiSet::Decide));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_edges_fire_once_per_press() {
        let mut edges = ButtonEdges::default();
        let held = HeldButtons {
            jump: true,
            block: true,
            ..default()
        };

        let first = edges.to_event(Vec2::ZERO, held);
        assert!(first.jump);
        assert!(first.block);

        let second = edges.to_event(Vec2::ZERO, held);
        assert!(!second.jump, "held jump is not a new press");
        assert!(second.block);

        edges.to_event(Vec2::ZERO, HeldButtons::default());
        assert!(edges.to_event(Vec2::ZERO, held).jump);
    }

    #[test]
    fn test_fold_keeps_last_axes_and_ors_edges() {
        let events = [
            PlayerInputEvent {
                move_direction: Vec2::new(1.0, 0.0),
                punch: true,
                ..default()
            },
            PlayerInputEvent {
                move_direction: Vec2::new(-0.5, 0.25),
                block: true,
                ..default()
            },
        ];

        let input = fold_player_events(CharacterInput::default(), &events);
        assert_eq!(input.move_x, -0.5);
        assert_eq!(input.move_z, 0.25);
        assert!(input.punch);
        assert!(input.block);
        assert!(!input.jump);
    }
}
