//! Headless симуляция Shinobi
//!
//! Игрок бежит вправо и бьёт, два врага (reactive + scaled) нападают.
//! Без рендера, для проверки детерминизма и логов.

use bevy::prelude::*;
use shinobi_simulation::*;

fn main() {
    let seed = 42;

    let mut app = create_headless_app(seed);
    // Debug-логи AI/кунаев слишком шумные для 1000 тиков
    set_log_level(LogLevel::Info);
    log_info(&format!("Starting Shinobi headless simulation (seed: {})", seed));

    app.add_plugins(ShinobiSimulationPlugin::flat());

    let world = app.world_mut();
    let player = spawn_character(&mut world.commands(), Vec3::ZERO, CharacterConfig::default());
    world
        .commands()
        .entity(player)
        .insert((Player, Animator::with_controller("ninja"), KunaiLauncher::default()));

    let brawler = spawn_character(&mut world.commands(), Vec3::new(8.0, 0.0, 0.0), CharacterConfig::default());
    world.commands().entity(brawler).insert(ReactiveEnemy::default());

    let jonin = spawn_character(&mut world.commands(), Vec3::new(14.0, 0.0, 1.0), CharacterConfig::default());
    world
        .commands()
        .entity(jonin)
        .insert((Intelligence::new(70), KunaiLauncher::default()));

    world.spawn((CameraFollow::default(), CameraView::default()));
    world.flush();

    let mut buttons = ButtonEdges::default();

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000u32 {
        let held = HeldButtons {
            punch: tick % 40 < 2,
            jump: tick % 150 == 0,
            block: (600..700).contains(&tick),
            ..default()
        };
        let event = buttons.to_event(Vec2::new(0.6, 0.0), held);
        app.world_mut().send_event(event);

        app.update();

        if tick % 100 == 0 {
            let entity_count = app.world().entities().len();
            let state = app
                .world()
                .get::<CharacterController>(player)
                .map(|c| format!("{:?}", c.lock()))
                .unwrap_or_default();
            // Bools игрока так, как их увидит animation controller хоста
            let table = app.world().resource::<AnimationParameterTable>();
            let bools = app
                .world()
                .get::<Animator>(player)
                .map(|animator| {
                    animator
                        .named_bools(table)
                        .filter(|(_, value)| *value)
                        .map(|(name, _)| name)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();
            log_info(&format!(
                "Tick {}: {} entities, player lock {}, anim [{}]",
                tick, entity_count, state, bools
            ));
        }
    }

    log_info("Simulation complete!");
}
