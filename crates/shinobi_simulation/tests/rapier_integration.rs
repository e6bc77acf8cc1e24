//! Integration тесты Rapier backend'а
//!
//! bevy_rapier3d в FixedUpdate: sensing через query pipeline,
//! скорость синхронизируется с `Velocity`, позицию интегрирует Rapier.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use shinobi_simulation::physics::collision;
use shinobi_simulation::*;

/// Центр капсулы, стоящей на полу y=0
const STANDING_Y: f32 = 0.9;

fn rapier_app() -> App {
    let mut app = create_headless_app(11);
    app.insert_resource(TimestepMode::Fixed {
        dt: tick_duration().as_secs_f32(),
        substeps: 1,
    })
    .add_plugins((
        TransformPlugin,
        RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule(),
        ShinobiSimulationPlugin::rapier(),
    ));
    app.finish();
    app.cleanup();

    // Startup: default RapierContext
    app.update();
    app
}

/// Статичная плита, верхняя грань на y=0
fn spawn_floor(app: &mut App) {
    app.world_mut().spawn((
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(20.0, 0.5, 20.0),
        collision::ground_groups(),
    ));
}

fn spawn_hero(app: &mut App, position: Vec3) -> Entity {
    let world = app.world_mut();
    let entity = {
        let mut commands = world.commands();
        spawn_rapier_character(&mut commands, position, CharacterConfig::default(), true)
    };
    world.flush();
    world.entity_mut(entity).insert(Player);
    entity
}

fn run(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn controller(app: &App, entity: Entity) -> &CharacterController {
    app.world().get::<CharacterController>(entity).expect("controller")
}

fn height(app: &App, entity: Entity) -> f32 {
    app.world().get::<Transform>(entity).expect("transform").translation.y
}

#[test]
fn test_rapier_character_lands_on_fixed_cuboid() {
    let mut app = rapier_app();
    spawn_floor(&mut app);
    let hero = spawn_hero(&mut app, Vec3::new(0.0, 1.0, 0.0));

    assert!(!controller(&app, hero).is_grounded());

    run(&mut app, 90);

    assert!(controller(&app, hero).is_grounded(), "сфера под ногами видит плиту");
    assert!((height(&app, hero) - STANDING_Y).abs() < 0.05, "капсула стоит на плите");
}

#[test]
fn test_rapier_character_jumps_after_landing() {
    let mut app = rapier_app();
    spawn_floor(&mut app);
    let hero = spawn_hero(&mut app, Vec3::new(0.0, 0.5, 0.0));
    run(&mut app, 90);
    assert!(controller(&app, hero).is_grounded());
    let rest = height(&app, hero);

    app.world_mut().send_event(PlayerInputEvent {
        jump: true,
        ..default()
    });
    app.update();
    assert_eq!(controller(&app, hero).jump_count(), 1);

    run(&mut app, 6);
    assert!(height(&app, hero) > rest + 0.3, "Rapier интегрирует скорость прыжка");

    run(&mut app, 120);
    let state = controller(&app, hero);
    assert!(state.is_grounded());
    assert_eq!(state.jump_count(), 0, "приземление на плиту сбрасывает прыжки");
}

#[test]
fn test_rapier_sensing_ignores_other_layers() {
    let mut app = rapier_app();
    // Плита только в слое врагов: земли под ногами нет
    app.world_mut().spawn((
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(20.0, 0.5, 20.0),
        collision::enemy_groups(),
    ));
    // Ноги прямо на грани плиты: сфера её пересекла бы без фильтра слоёв
    let hero = spawn_hero(&mut app, Vec3::ZERO);

    run(&mut app, 2);

    assert!(!controller(&app, hero).is_grounded());
}
