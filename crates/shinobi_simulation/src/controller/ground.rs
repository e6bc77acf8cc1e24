//! Ground sensing: sphere overlap OR короткий луч вниз от якоря под ногами.
//!
//! Два backend'а:
//! - `FlatGround`: бесконечный пол на заданной высоте (headless тесты/сервер)
//! - `RapierGroundProbe`: запросы к bevy_rapier3d (sensors игнорируются)

use bevy::prelude::*;
use bevy_rapier3d::parry::shape::Ball;
use bevy_rapier3d::prelude::*;

/// Небольшой зазор над дном коллайдера для синтезированного якоря
pub const ANCHOR_LIFT: f32 = 0.01;

/// Физический запрос "есть ли земля"
pub trait GroundProbe {
    /// Пересекает ли сфера что-то из `layer_mask`
    fn overlap_sphere(&self, center: Vec3, radius: f32, layer_mask: u32) -> bool;
    /// Попадает ли луч вниз длиной `length` во что-то из `layer_mask`
    fn ray_down(&self, origin: Vec3, length: f32, layer_mask: u32) -> bool;
}

/// Результат двух проб; grounded = любая из них
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct GroundContact {
    pub sphere: bool,
    pub ray: bool,
}

impl GroundContact {
    pub fn sample(probe: &dyn GroundProbe, anchor: Vec3, radius: f32, ray_length: f32, layer_mask: u32) -> Self {
        let sphere = probe.overlap_sphere(anchor, radius, layer_mask);
        // Луч не нужен, если сфера уже нашла землю
        let ray = !sphere && probe.ray_down(anchor, ray_length, layer_mask);
        Self { sphere, ray }
    }

    pub fn grounded(&self) -> bool {
        self.sphere || self.ray
    }
}

/// Якорь ground check в локальных координатах персонажа.
///
/// None → будет синтезирован из `ColliderBounds` (и пересчитан при их смене).
/// Явно заданный якорь bounds не трогают.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct GroundCheck {
    pub anchor: Option<Vec3>,
    derived: bool,
}

impl GroundCheck {
    pub fn at(anchor: Vec3) -> Self {
        Self {
            anchor: Some(anchor),
            derived: false,
        }
    }

    /// Якорь синтезирован из bounds (не задан хостом)
    pub fn is_derived(&self) -> bool {
        self.derived
    }

    pub(crate) fn derive_from(&mut self, bounds: &ColliderBounds) -> Vec3 {
        let anchor = bounds.feet_anchor();
        self.anchor = Some(anchor);
        self.derived = true;
        anchor
    }

    /// Якорь в мировых координатах (без якоря: origin персонажа)
    pub fn world_anchor(&self, transform: &Transform) -> Vec3 {
        match self.anchor {
            Some(local) => transform.transform_point(local),
            None => transform.translation,
        }
    }
}

/// Локальные границы коллайдера персонажа (центр + половины размеров)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ColliderBounds {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl ColliderBounds {
    /// Bounds капсулы вдоль Y (как `Collider::capsule_y`)
    pub fn capsule_y(half_height: f32, radius: f32) -> Self {
        Self {
            center: Vec3::ZERO,
            half_extents: Vec3::new(radius, half_height + radius, radius),
        }
    }

    /// Точка чуть выше дна коллайдера
    pub fn feet_anchor(&self) -> Vec3 {
        Vec3::new(
            self.center.x,
            self.center.y - self.half_extents.y + ANCHOR_LIFT,
            self.center.z,
        )
    }
}

// ============================================================================
// Flat floor backend
// ============================================================================

/// Бесконечный горизонтальный пол (headless backend)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct FlatGround {
    pub height: f32,
    /// Слой, к которому относится пол
    pub layer: u32,
}

impl Default for FlatGround {
    fn default() -> Self {
        Self {
            height: 0.0,
            layer: crate::physics::collision::GROUND_LAYER,
        }
    }
}

impl GroundProbe for FlatGround {
    fn overlap_sphere(&self, center: Vec3, radius: f32, layer_mask: u32) -> bool {
        if self.layer & layer_mask == 0 {
            return false;
        }
        center.y - radius <= self.height
    }

    fn ray_down(&self, origin: Vec3, length: f32, layer_mask: u32) -> bool {
        if self.layer & layer_mask == 0 {
            return false;
        }
        // Луч из-под пола ничего не видит
        origin.y >= self.height && origin.y - length <= self.height
    }
}

// ============================================================================
// Rapier backend
// ============================================================================

/// Marker resource: ground sensing через bevy_rapier3d
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RapierGround;

/// Ground probe поверх RapierContext (исключает собственный коллайдер и sensors)
pub struct RapierGroundProbe<'c, 'w> {
    pub context: &'c RapierContext<'w>,
    pub owner: Entity,
}

impl RapierGroundProbe<'_, '_> {
    fn filter(&self, layer_mask: u32) -> QueryFilter<'static> {
        QueryFilter::new()
            .exclude_sensors()
            .exclude_collider(self.owner)
            .groups(CollisionGroups::new(
                Group::ALL,
                Group::from_bits_truncate(layer_mask),
            ))
    }
}

impl GroundProbe for RapierGroundProbe<'_, '_> {
    fn overlap_sphere(&self, center: Vec3, radius: f32, layer_mask: u32) -> bool {
        let ball = Ball::new(radius);
        self.context.with_query_pipeline(self.filter(layer_mask), |query| {
            query.intersect_shape(center, Quat::IDENTITY, &ball).next().is_some()
        })
    }

    fn ray_down(&self, origin: Vec3, length: f32, layer_mask: u32) -> bool {
        self.context.with_query_pipeline(self.filter(layer_mask), |query| {
            query.cast_ray(origin, Vec3::NEG_Y, length, true).is_some()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::{GROUND_LAYER, PLAYER_LAYER};

    #[test]
    fn test_flat_ground_sphere_overlap() {
        let floor = FlatGround::default();
        assert!(floor.overlap_sphere(Vec3::new(0.0, 0.1, 0.0), 0.15, GROUND_LAYER));
        assert!(!floor.overlap_sphere(Vec3::new(0.0, 0.2, 0.0), 0.15, GROUND_LAYER));
    }

    #[test]
    fn test_flat_ground_ray_reaches_floor() {
        let floor = FlatGround::default();
        assert!(floor.ray_down(Vec3::new(0.0, 0.3, 0.0), 0.35, GROUND_LAYER));
        assert!(!floor.ray_down(Vec3::new(0.0, 0.4, 0.0), 0.35, GROUND_LAYER));
        assert!(!floor.ray_down(Vec3::new(0.0, -0.1, 0.0), 0.35, GROUND_LAYER));
    }

    #[test]
    fn test_flat_ground_respects_layer_mask() {
        let floor = FlatGround::default();
        assert!(!floor.overlap_sphere(Vec3::ZERO, 0.15, PLAYER_LAYER));
        assert!(!floor.ray_down(Vec3::new(0.0, 0.1, 0.0), 0.35, PLAYER_LAYER));
    }

    #[test]
    fn test_contact_ray_covers_sphere_gap() {
        let floor = FlatGround::default();
        let contact = GroundContact::sample(&floor, Vec3::new(0.0, 0.3, 0.0), 0.15, 0.35, GROUND_LAYER);
        assert!(!contact.sphere);
        assert!(contact.ray);
        assert!(contact.grounded());
    }

    #[test]
    fn test_feet_anchor_from_capsule_bounds() {
        let bounds = ColliderBounds::capsule_y(0.5, 0.4);
        let anchor = bounds.feet_anchor();
        assert!((anchor.y - (-0.9 + ANCHOR_LIFT)).abs() < 1e-6);
        assert_eq!(anchor.x, 0.0);
    }

    #[test]
    fn test_world_anchor_follows_transform() {
        let check = GroundCheck::at(Vec3::new(0.0, -0.89, 0.0));
        let transform = Transform::from_xyz(3.0, 2.0, 0.0);
        let world = check.world_anchor(&transform);
        assert!((world - Vec3::new(3.0, 1.11, 0.0)).length() < 1e-5);
    }
}
