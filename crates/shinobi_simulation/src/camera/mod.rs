//! Camera framing (bounding-box follow всех игроков)

use bevy::prelude::*;

pub mod follow;

pub use follow::{camera_frame, CameraFollow, CameraFollowConfig, CameraFrame, CameraView};

/// Camera Plugin
///
/// Кадрирование в PostUpdate: после всех fixed-тиков кадра.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<CameraFollow>()
            .register_type::<CameraFollowConfig>()
            .register_type::<CameraView>()
            .add_systems(PreUpdate, follow::disable_follow_without_camera)
            .add_systems(PostUpdate, follow::follow_players);
    }
}
