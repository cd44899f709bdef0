//! Component Hierarchies: a crane arm built from nested scene components.
//!
//! A custom actor kind rotates its boom every tick; the hook at the end of
//! the arm follows through world-transform composition.
//!
//! Run with: `RUST_LOG=debug cargo run -p tarn --example scene_hierarchy`

use std::time::Duration;

use tarn::prelude::*;

// ── Crane actor ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Crane {
    boom: Option<ComponentKey>,
    hook: Option<ComponentKey>,
    degrees_per_second: f32,
}

impl ActorKind for Crane {
    fn type_name(&self) -> &'static str {
        "Crane"
    }

    fn construct(&mut self, actor: &mut Actor) {
        let root = actor.root_component();
        let mast = actor.add_component(ModelComponent::new("Models/crane_mast.obj"));
        let boom = actor.add_component(SceneComponent);
        let hook = actor.add_component(ModelComponent::new("Models/crane_hook.obj"));

        if let Some(local) = actor.components_mut().get_mut(boom).and_then(|s| s.transform_mut()) {
            local.position = Vec3::new(0.0, 10.0, 0.0);
        }
        if let Some(local) = actor.components_mut().get_mut(hook).and_then(|s| s.transform_mut()) {
            local.position = Vec3::new(6.0, -1.0, 0.0);
        }

        if let Err(err) = actor.attach_to_component(boom, mast) {
            log::error!("boom: {err}");
        }
        if let Err(err) = actor.attach_to_component(hook, boom) {
            log::error!("hook: {err}");
        }
        // The mast cannot hang from its own hook.
        if let Err(err) = actor.attach_to_component(mast, hook) {
            log::info!("Rejected mast -> hook: {err}");
        }

        log::info!("Crane built under root {root:?}");
        self.boom = Some(boom);
        self.hook = Some(hook);
        self.degrees_per_second = 45.0;
    }

    fn tick(&mut self, actor: &mut Actor, delta_time: f32) {
        let Some(boom) = self.boom else { return };
        if let Some(local) = actor.components_mut().get_mut(boom).and_then(|s| s.transform_mut()) {
            local.rotation.y = (local.rotation.y + self.degrees_per_second * delta_time) % 360.0;
        }
    }
}

fn main() {
    env_logger::init();

    let mut resources = ResourceManager::new();
    let mut scenes = SceneManager::new(std::env::temp_dir().join("tarn_hierarchy"));
    scenes.registry_mut().register_actor::<Crane>();
    scenes.set_active_scene(Scene::new("Harbor"));

    let Some(crane) = scenes.spawn_actor("Crane", Crane::default()) else {
        return;
    };
    crane.set_position(Vec3::new(-20.0, 0.0, 5.0));
    let id = crane.id();
    if let Err(err) = crane.resolve_resources(&mut resources) {
        log::error!("{err}");
    }

    for step in 0..=8 {
        if let Some(crane) = scenes.find_actor_by_id(id)
            && let Some(hook) = crane.kind::<Crane>().and_then(|k| k.hook)
            && let Some(world) = crane.world_transform(hook)
        {
            let p = world.transform_point3(Vec3::ZERO);
            println!("t={:>4.2}s  hook at ({:>6.2}, {:>6.2}, {:>6.2})", step as f32 * 0.25, p.x, p.y, p.z);
        }
        scenes.update(Duration::from_millis(250).as_secs_f32());
    }

    if let Some(scene) = scenes.active_scene() {
        for item in scene.renderables() {
            println!(
                "draw {} for actor {} with {} pass(es)",
                item.model.path(),
                item.actor,
                item.config.draw_passes().len()
            );
        }
    }
}
