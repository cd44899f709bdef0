//! Scene Save/Load: round-trip a scene through a `.tscene` file.
//!
//! Starts an engine over a temporary assets directory, spawns a few actors,
//! saves, reloads, and prints what came back along with the scene browser
//! metadata.
//!
//! Run with: `RUST_LOG=info cargo run -p tarn --example scene_save_load`

use std::time::Duration;

use tarn::prelude::*;

fn main() {
    env_logger::init();

    let assets = std::env::temp_dir().join("tarn_save_load");
    let mut engine = Engine::new(EngineConfig::default().assets_dir(&assets).default_scene("Lake"));
    if !engine.start() {
        eprintln!("could not start engine in {}", assets.display());
        return;
    }

    for (name, x) in [("Boat", 0.0), ("Buoy", 4.0), ("Pier", -6.0)] {
        if let Some(actor) = engine.spawn_actor(name, ModelActor::new(format!("Models/{}.obj", name.to_lowercase()))) {
            actor.set_position(Vec3::new(x, 0.0, 0.0));
            actor.config.draw_outline = name == "Boat";
        }
    }
    if let Some(scene) = engine.active_scene_mut() {
        let buoy = scene.find_actors_of_type::<ModelActor>().get(1).map(|a| a.id());
        if let Some(buoy) = buoy {
            scene.remove_actor(buoy);
        }
    }

    engine.tick_with(Duration::from_millis(16));
    println!("saved: {}", engine.save_scene("Lake"));
    println!("saved again (unchanged): {}", engine.save_scene("Lake"));

    if engine.load_scene("Lake")
        && let Some(scene) = engine.active_scene()
    {
        println!("reloaded '{}' with {} actors:", scene.name(), scene.actor_count());
        for actor in scene.actors() {
            println!(
                "  {:>3} {:<6} {:<10} at {:?}",
                actor.id(),
                actor.name(),
                actor.kind_name(),
                actor.position()
            );
        }
    }
    println!("cached resources: {:?}", engine.resources().keys());

    for meta in SceneManager::list_scenes_meta(&engine.config().scenes_dir()) {
        println!(
            "{} ({} actors, modified {})",
            meta.file_name, meta.actor_count, meta.last_modified
        );
    }
}
