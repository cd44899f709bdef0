//! End-to-end scene lifecycle: spawn, remove, save, reload.

use std::fs;

use tarn::prelude::*;

fn spawn_abc(scene: &mut Scene) -> [ActorId; 3] {
    let a = scene.spawn_actor("A", EmptyActor).unwrap();
    a.set_position(Vec3::new(1.0, 0.0, 0.0));
    let a = a.id();

    let b = scene.spawn_actor("B", EmptyActor).unwrap();
    b.set_position(Vec3::new(2.0, 0.0, 0.0));
    let b = b.id();

    let c = scene.spawn_actor("C", EmptyActor).unwrap();
    c.set_position(Vec3::new(3.0, 0.5, -1.0));
    c.set_rotation(Vec3::new(0.0, 90.0, 0.0));
    let c = c.id();

    [a, b, c]
}

#[test]
fn lake_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let mut scenes = SceneManager::new(dir.path());
    let mut resources = ResourceManager::new();

    let mut lake = Scene::new("Lake");
    let [a, b, c] = spawn_abc(&mut lake);
    assert_eq!([a.raw(), b.raw(), c.raw()], [1, 2, 3]);
    lake.mark_saved();

    assert!(lake.remove_actor(b));
    assert!(lake.is_dirty());
    assert_eq!(lake.find_actor_by_id(a).unwrap().name(), "A");
    assert_eq!(lake.find_actor_by_id(c).unwrap().name(), "C");
    assert!(lake.find_actor_by_id(b).is_none());
    let found: Vec<_> = lake.find_actors_of_type::<EmptyActor>().iter().map(|x| x.id()).collect();
    assert_eq!(found, vec![a, c]);

    let c_transform = lake.find_actor_by_id(c).unwrap().transform();
    assert!(scenes.save_scene_file(&mut lake, "Lake"));
    assert!(!lake.is_dirty());

    let loaded = scenes.load_scene_file("Lake", &mut resources).unwrap();
    assert_eq!(loaded.name(), "Lake");
    assert_eq!(loaded.actor_count(), 2);
    assert_eq!(loaded.find_actor_by_id(a).unwrap().name(), "A");
    assert_eq!(loaded.find_actor_by_id(a).unwrap().position(), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(loaded.find_actor_by_id(c).unwrap().transform(), c_transform);
    assert!(loaded.find_actor_by_id(b).is_none());

    // The removed id stays retired in the reloaded scene.
    assert_eq!(loaded.spawn_actor("D", EmptyActor).unwrap().id().raw(), 4);
}

#[test]
fn unmodified_save_does_not_touch_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut scenes = SceneManager::new(dir.path());
    let mut resources = ResourceManager::new();

    let mut scene = Scene::new("Still");
    spawn_abc(&mut scene);
    assert!(scenes.save_scene_file(&mut scene, "Still"));

    let path = scenes.scene_path("Still");
    let before = fs::read_to_string(&path).unwrap();
    let modified = fs::metadata(&path).unwrap().modified().unwrap();

    let saves = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = saves.clone();
    scenes.set_on_scene_saved(move |_| counter.set(counter.get() + 1));

    scenes.load_scene_file("Still", &mut resources).unwrap();
    assert!(scenes.save_active_scene("Still"));

    assert_eq!(saves.get(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
}

#[cfg(feature = "diagnostics")]
#[test]
fn clean_scene_serializes_identically_without_rebuilding() {
    let mut scene = Scene::new("Cache");
    spawn_abc(&mut scene);
    scene.mark_saved();

    let first = serde_json::to_string(scene.serialize()).unwrap();
    let rebuilds = scene.serialization_rebuilds();
    let second = serde_json::to_string(scene.serialize()).unwrap();

    assert_eq!(first, second);
    assert_eq!(scene.serialization_rebuilds(), rebuilds);
}

#[test]
fn round_trip_keeps_hierarchy_and_models() {
    let dir = tempfile::tempdir().unwrap();
    let mut scenes = SceneManager::new(dir.path());
    let mut resources = ResourceManager::new();

    let mut scene = Scene::new("Dock");
    let boat = scene.spawn_actor_with("Boat", ModelActor::new("Models/boat.obj"), &mut resources).unwrap();
    boat.config.draw_outline = true;
    let hull = boat.components().find_key::<ModelComponent>().unwrap();
    let mast = boat.add_component(SceneComponent);
    boat.attach_to_component(mast, hull).unwrap();
    boat.components_mut().get_mut(mast).unwrap().transform_mut().unwrap().position = Vec3::Y * 4.0;
    let boat_id = boat.id();
    let mast_world = boat.world_transform(mast).unwrap();

    assert!(scenes.save_scene_file(&mut scene, "Dock"));
    resources.unload_all();

    let loaded = scenes.load_scene_file("Dock", &mut resources).unwrap();
    let boat = loaded.find_actor_by_id(boat_id).unwrap();
    assert!(boat.is::<ModelActor>());
    assert!(boat.config.draw_outline);
    assert_eq!(boat.components().len(), 3);

    let (hull, model) = boat.components().find::<ModelComponent>().unwrap();
    assert_eq!(model.model_path(), "Models/boat.obj");
    assert!(model.model().is_some());
    let mast = boat.components().get(hull).unwrap().node().unwrap().children()[0];
    assert_eq!(boat.world_transform(mast).unwrap(), mast_world);

    assert!(resources.has("Models/boat.obj"));
    assert_eq!(loaded.renderables().count(), 1);
}

#[test]
fn resource_loads_are_shared_until_unloaded() {
    let mut resources = ResourceManager::new();
    let first = resources.load("Models/rock.obj", || ModelResource::new("Models/rock.obj")).unwrap();
    let again = resources.load("Models/rock.obj", || ModelResource::new("ignored")).unwrap();
    assert!(std::rc::Rc::ptr_eq(&first, &again));

    assert!(resources.unload("Models/rock.obj"));
    let fresh = resources.load("Models/rock.obj", || ModelResource::new("Models/rock_v2.obj")).unwrap();
    assert!(!std::rc::Rc::ptr_eq(&first, &fresh));
    assert_eq!(fresh.path(), "Models/rock_v2.obj");
}
