//! Bounding-box камера для beat-'em-up.
//!
//! Каждый кадр:
//! - bounds всех игроков → вертикальный центр + offset
//! - ortho half-height тянется к clamp(span/2 + padding, min, max)
//! - по X камера только вперёд (никогда не откатывается назад)
//! - левый "no-return" lock (монотонный) не пускает игроков назад

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::adapter::AdapterDisabled;
use crate::error::SetupError;
use crate::player::Player;

/// Параметры кадрирования
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct CameraFollowConfig {
    pub offset: Vec3,
    pub follow_speed: f32,
    pub horizontal_padding: f32,
    pub vertical_padding: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Отступ lock'а от левого края кадра
    pub left_lock_margin: f32,
    /// Запас кадра перед самым правым игроком
    pub forward_offset: f32,
    /// Пустой список игроков заполняется всеми `Player`
    pub auto_populate: bool,
}

impl Default for CameraFollowConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 5.0, -10.0),
            follow_speed: 5.0,
            horizontal_padding: 2.0,
            vertical_padding: 2.0,
            min_height: 3.0,
            max_height: 15.0,
            left_lock_margin: 2.0,
            forward_offset: 2.0,
            auto_populate: true,
        }
    }
}

/// Проекция камеры (то, что кадрирование читает и меняет)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CameraView {
    /// Ortho half-height
    pub ortho_size: f32,
    /// width / height
    pub aspect: f32,
    pub orthographic: bool,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            ortho_size: 5.0,
            aspect: 16.0 / 9.0,
            orthographic: true,
        }
    }
}

/// Камера, следящая за игроками
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(CameraFollowConfig, Transform)]
pub struct CameraFollow {
    pub players: Vec<Entity>,
    /// None = ещё не инициализирован
    left_lock_x: Option<f32>,
    warned_perspective: bool,
}

impl CameraFollow {
    pub fn tracking(players: Vec<Entity>) -> Self {
        Self {
            players,
            ..default()
        }
    }

    pub fn left_lock_x(&self) -> Option<f32> {
        self.left_lock_x
    }

    /// Сброс lock'а (например, при переходе на новый уровень)
    pub fn reset_left_lock(&mut self) {
        self.left_lock_x = None;
    }
}

/// Результат одного кадра
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub position: Vec3,
    pub ortho_size: f32,
    pub left_lock_x: f32,
}

/// Чистый расчёт кадра. None, если игроков нет.
pub fn camera_frame(
    config: &CameraFollowConfig,
    camera_position: Vec3,
    view: &CameraView,
    players: &[Vec3],
    left_lock_x: Option<f32>,
    delta: f32,
) -> Option<CameraFrame> {
    if players.is_empty() {
        return None;
    }

    let (mut min_x, mut max_x) = (f32::MAX, f32::MIN);
    let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
    for position in players {
        min_x = min_x.min(position.x);
        max_x = max_x.max(position.x);
        min_y = min_y.min(position.y);
        max_y = max_y.max(position.y);
    }

    let t = (config.follow_speed * delta).clamp(0.0, 1.0);
    let mid_y = (min_y + max_y) * 0.5 + config.offset.y;

    let mut ortho_size = view.ortho_size;
    if view.orthographic {
        let span = (max_y - min_y) + config.vertical_padding * 2.0;
        let target_half_height = (span * 0.5).clamp(config.min_height, config.max_height);
        ortho_size += (target_half_height - ortho_size) * t;
    }

    let half_height = if view.orthographic {
        ortho_size
    } else {
        config.offset.z.abs()
    };
    let half_width = half_height * view.aspect;

    let desired_left = min_x - config.horizontal_padding;
    let desired_right = max_x + config.horizontal_padding + config.forward_offset;
    let desired_center = (desired_left + desired_right) * 0.5;

    // Камера не откатывается назад
    let pushed_center = desired_right - half_width;
    let camera_x = camera_position.x.max(pushed_center).max(desired_center);

    let lock_candidate = camera_x - half_width - config.left_lock_margin;
    let left_lock_x = match left_lock_x {
        Some(previous) => previous.max(lock_candidate),
        None => lock_candidate,
    };

    let target = Vec3::new(camera_x, mid_y, config.offset.z);

    Some(CameraFrame {
        position: camera_position.lerp(target, t),
        ortho_size,
        left_lock_x,
    })
}

/// System: CameraFollow без CameraView: ошибка сцены, выключаем
pub fn disable_follow_without_camera(
    mut commands: Commands,
    follows: Query<Entity, (Added<CameraFollow>, Without<CameraView>)>,
) {
    for entity in follows.iter() {
        let error = SetupError::MissingCamera { entity };
        crate::logger::log_error(&error.to_string());
        commands.entity(entity).insert(AdapterDisabled);
    }
}

/// System: кадрирование + clamp игроков по левому lock'у
pub fn follow_players(
    mut cameras: Query<
        (
            Entity,
            &mut CameraFollow,
            &CameraFollowConfig,
            &mut Transform,
            &mut CameraView,
        ),
        Without<AdapterDisabled>,
    >,
    mut player_transforms: Query<&mut Transform, (With<Player>, Without<CameraFollow>)>,
    all_players: Query<Entity, (With<Player>, Without<CameraFollow>)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (entity, mut follow, config, mut transform, mut view) in cameras.iter_mut() {
        if follow.players.is_empty() && config.auto_populate {
            follow.players = all_players.iter().collect();
        }

        // Исчезнувшие игроки убираются лениво
        follow.players.retain(|player| player_transforms.contains(*player));

        let positions: Vec<Vec3> = follow
            .players
            .iter()
            .filter_map(|player| player_transforms.get(*player).ok())
            .map(|t| t.translation)
            .collect();

        if positions.is_empty() {
            continue;
        }

        if !view.orthographic && !follow.warned_perspective {
            crate::logger::log_warning(&format!(
                "Camera {:?}: follow is meant for orthographic cameras, dynamic zoom disabled",
                entity
            ));
            follow.warned_perspective = true;
        }

        let Some(frame) = camera_frame(
            config,
            transform.translation,
            &view,
            &positions,
            follow.left_lock_x,
            delta,
        ) else {
            continue;
        };

        transform.translation = frame.position;
        view.ortho_size = frame.ortho_size;
        follow.left_lock_x = Some(frame.left_lock_x);

        for player in follow.players.iter() {
            if let Ok(mut player_transform) = player_transforms.get_mut(*player) {
                if player_transform.translation.x < frame.left_lock_x {
                    player_transform.translation.x = frame.left_lock_x;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ortho() -> CameraView {
        CameraView {
            ortho_size: 5.0,
            aspect: 2.0,
            orthographic: true,
        }
    }

    #[test]
    fn test_no_players_no_frame() {
        let frame = camera_frame(&CameraFollowConfig::default(), Vec3::ZERO, &ortho(), &[], None, 0.016);
        assert!(frame.is_none());
    }

    #[test]
    fn test_camera_never_scrolls_back() {
        let config = CameraFollowConfig::default();
        let camera = Vec3::new(20.0, 5.0, -10.0);
        let frame = camera_frame(&config, camera, &ortho(), &[Vec3::new(0.0, 0.0, 0.0)], None, 1.0)
            .expect("frame");
        assert_eq!(frame.position.x, 20.0);
    }

    #[test]
    fn test_pushes_forward_with_right_player() {
        let config = CameraFollowConfig {
            follow_speed: 1.0,
            ..default()
        };
        // delta = 1 → t = 1, камера встаёт прямо в target
        let frame = camera_frame(&config, Vec3::ZERO, &ortho(), &[Vec3::new(30.0, 0.0, 0.0)], None, 1.0)
            .expect("frame");
        // right = 34; ortho → clamp(2, 3, 15) = 3; half_width = 6; push = 28; center = 31
        assert!((frame.ortho_size - 3.0).abs() < 1e-5);
        assert!((frame.position.x - 31.0).abs() < 1e-4);
        assert!((frame.position.y - 5.0).abs() < 1e-4);
        assert_eq!(frame.position.z, -10.0);
        assert!((frame.left_lock_x - 23.0).abs() < 1e-4);
    }

    #[test]
    fn test_left_lock_is_monotone() {
        let config = CameraFollowConfig::default();
        let frame = camera_frame(&config, Vec3::ZERO, &ortho(), &[Vec3::ZERO], Some(50.0), 0.1).expect("frame");
        assert_eq!(frame.left_lock_x, 50.0);
    }

    #[test]
    fn test_lerp_factor_is_clamped() {
        let config = CameraFollowConfig::default();
        // follow_speed * delta = 50 → t = 1, без перелёта
        let frame = camera_frame(&config, Vec3::ZERO, &ortho(), &[Vec3::new(0.0, 4.0, 0.0)], None, 10.0)
            .expect("frame");
        assert!((frame.position.y - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_perspective_keeps_ortho_size() {
        let view = CameraView {
            orthographic: false,
            ..ortho()
        };
        let frame = camera_frame(&CameraFollowConfig::default(), Vec3::ZERO, &view, &[Vec3::ZERO], None, 0.5)
            .expect("frame");
        assert_eq!(frame.ortho_size, 5.0);
    }
}
