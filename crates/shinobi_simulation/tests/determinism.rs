//! Тесты детерминизма
//!
//! Полный tick pipeline (игрок + reactive + scaled AI) с одинаковым seed
//! даёт идентичные результаты.

use bevy::prelude::*;
use shinobi_simulation::*;

const TICK_COUNT: u32 = 600;

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    // Первый прогон
    let snapshot1 = run_simulation(SEED, TICK_COUNT);

    // Второй прогон с тем же seed
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    // Снепшоты должны быть идентичны
    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;

    // Запускаем 3 раза, все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_seed_is_kept_by_plugin() {
    let mut app = create_headless_app(777);
    app.add_plugins(ShinobiSimulationPlugin::flat());

    let rng = app.world().resource::<DeterministicRng>();
    assert_eq!(rng.seed, 777, "plugin не перезаписывает seed хоста");
}

/// Запускает симуляцию и возвращает snapshot мира
fn run_simulation(seed: u64, tick_count: u32) -> Vec<u8> {
    let mut app = create_headless_app(seed);
    app.add_plugins(ShinobiSimulationPlugin::flat());

    let world = app.world_mut();
    let (player, brawler, jonin) = {
        let mut commands = world.commands();
        let player = spawn_character(&mut commands, Vec3::ZERO, CharacterConfig::default());
        let brawler = spawn_character(&mut commands, Vec3::new(4.0, 0.0, 0.5), CharacterConfig::default());
        let jonin = spawn_character(&mut commands, Vec3::new(7.0, 0.0, -0.5), CharacterConfig::default());
        (player, brawler, jonin)
    };
    world.flush();

    world.entity_mut(player).insert((Player, KunaiLauncher::default()));
    world.entity_mut(brawler).insert(ReactiveEnemy::default());
    world
        .entity_mut(jonin)
        .insert((Intelligence::new(100), KunaiLauncher::default()));

    let mut edges = ButtonEdges::default();

    // Прогоняем симуляцию со скриптованным вводом
    for tick in 0..tick_count {
        let held = HeldButtons {
            punch: tick % 45 < 3,
            jump: tick % 120 == 60,
            kick: tick % 200 == 100,
            block: (300..360).contains(&tick),
            ..default()
        };
        let axis = if (tick / 90) % 2 == 0 { 1.0 } else { -0.5 };
        let event = edges.to_event(Vec2::new(axis, 0.0), held);
        app.world_mut().send_event(event);
        app.update();
    }

    // Возвращаем snapshot
    let mut snapshot = world_snapshot::<Transform>(app.world_mut());
    snapshot.extend(world_snapshot::<CharacterController>(app.world_mut()));
    snapshot
}
