//! # Scene Manager
//!
//! Owns the active [`Scene`] and moves scenes between memory and the
//! `.tscene` files in a scenes directory (normally `<assets>/Scenes`).
//!
//! ```text
//!            load_scene_file                 save_scene_file
//! Lake.tscene ───────────────► active Scene ────────────────► Lake.tscene
//!             (registry + resources)    (skipped when clean, adds meta)
//! ```
//!
//! The plain operations report failure as `false`/`None` after logging a
//! warning. Each has a `try_*` twin that returns the [`SceneError`] instead.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::actor::{Actor, ActorId, ActorKind};
use crate::error::{SceneError, SerializeError};
use crate::object::to_json;
use crate::registry::TypeRegistry;
use crate::resource::ResourceManager;
use crate::scene::Scene;
use crate::scene::file::{SCENE_EXTENSION, SceneFileMeta, SceneHeader};

/// Summary of a scene file, read without loading its actors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneMeta {
    /// File name without extension, as accepted by `load_scene_file`.
    pub file_name: String,
    pub path: PathBuf,
    pub name: String,
    pub actor_count: usize,
    pub last_modified: String,
    pub thumbnail: String,
}

#[derive(Default)]
struct Callbacks {
    scene_loaded: Option<Box<dyn FnMut(&Scene)>>,
    scene_saved: Option<Box<dyn FnMut(&Scene)>>,
    scene_renamed: Option<Box<dyn FnMut(&Scene, &str)>>,
    actor_added: Option<Box<dyn FnMut(&Actor)>>,
    actor_removing: Option<Box<dyn FnMut(&Actor)>>,
    actor_removed: Option<Box<dyn FnMut(ActorId)>>,
}

pub struct SceneManager {
    scenes_dir: PathBuf,
    registry: TypeRegistry,
    active: Option<Scene>,
    callbacks: Callbacks,
}

impl SceneManager {
    /// A manager over `scenes_dir` with the built-in types registered.
    pub fn new(scenes_dir: impl Into<PathBuf>) -> Self {
        Self::with_registry(scenes_dir, TypeRegistry::with_builtins())
    }

    pub fn with_registry(scenes_dir: impl Into<PathBuf>, registry: TypeRegistry) -> Self {
        Self {
            scenes_dir: scenes_dir.into(),
            registry,
            active: None,
            callbacks: Callbacks::default(),
        }
    }

    pub fn scenes_dir(&self) -> &Path {
        &self.scenes_dir
    }

    /// Where `filename` lives. The extension is added when missing.
    pub fn scene_path(&self, filename: &str) -> PathBuf {
        scene_path(&self.scenes_dir, filename)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    // ── Scene files ──────────────────────────────────────────────────────

    /// Write a new empty scene file. Fails if it exists and `overwrite` is
    /// false. The active scene is not changed.
    pub fn create_scene_file(&self, name: &str, filename: &str, overwrite: bool) -> bool {
        self.try_create_scene_file(name, filename, overwrite)
            .inspect_err(|err| log::warn!("Could not create scene '{name}': {err}"))
            .is_ok()
    }

    pub fn try_create_scene_file(&self, name: &str, filename: &str, overwrite: bool) -> Result<PathBuf, SceneError> {
        let path = self.scene_path(filename);
        if path.exists() && !overwrite {
            return Err(SceneError::AlreadyExists(path));
        }
        let mut scene = Scene::new(name);
        write_scene(&path, &mut scene, String::new())?;
        log::info!("Created scene '{name}' at {}", path.display());
        Ok(path)
    }

    /// Load a scene file and make it the active scene.
    ///
    /// On failure the previous active scene stays in place.
    pub fn load_scene_file(&mut self, filename: &str, resources: &mut ResourceManager) -> Option<&mut Scene> {
        match self.try_load_scene_file(filename, resources) {
            Ok(scene) => Some(scene),
            Err(err) => {
                log::warn!("Could not load scene '{filename}': {err}");
                None
            }
        }
    }

    pub fn try_load_scene_file(
        &mut self,
        filename: &str,
        resources: &mut ResourceManager,
    ) -> Result<&mut Scene, SceneError> {
        let path = self.scene_path(filename);
        let text = fs::read_to_string(&path).map_err(|e| SceneError::io(&path, e))?;
        let data: Value = serde_json::from_str(&text).map_err(|e| SceneError::parse(&path, e))?;

        let mut scene = Scene::new(String::new());
        scene.deserialize(&data, &self.registry, resources)?;
        scene.mark_saved();
        log::info!(
            "Loaded scene '{}' ({} actors) from {}",
            scene.name(),
            scene.actor_count(),
            path.display()
        );

        let scene = self.active.insert(scene);
        if let Some(callback) = self.callbacks.scene_loaded.as_mut() {
            callback(scene);
        }
        Ok(scene)
    }

    /// Write `scene` to `filename`. A clean scene is not rewritten and
    /// counts as success.
    pub fn save_scene_file(&mut self, scene: &mut Scene, filename: &str) -> bool {
        self.try_save_scene_file(scene, filename)
            .inspect_err(|err| log::warn!("Could not save scene '{}': {err}", scene.name()))
            .is_ok()
    }

    /// Returns whether the file was actually written.
    pub fn try_save_scene_file(&mut self, scene: &mut Scene, filename: &str) -> Result<bool, SceneError> {
        save_to(&self.scenes_dir, &mut self.callbacks, scene, filename)
    }

    pub fn save_active_scene(&mut self, filename: &str) -> bool {
        self.try_save_active_scene(filename)
            .inspect_err(|err| log::warn!("Could not save active scene: {err}"))
            .is_ok()
    }

    pub fn try_save_active_scene(&mut self, filename: &str) -> Result<bool, SceneError> {
        let scene = self.active.as_mut().ok_or(SceneError::NoActiveScene)?;
        save_to(&self.scenes_dir, &mut self.callbacks, scene, filename)
    }

    /// Rename a scene in memory. Empty or unchanged names are rejected. The
    /// file keeps its name until the next save.
    pub fn rename_scene(&mut self, scene: &mut Scene, new_name: &str) -> bool {
        rename(&mut self.callbacks, scene, new_name)
    }

    pub fn rename_active_scene(&mut self, new_name: &str) -> bool {
        let Some(scene) = self.active.as_mut() else {
            log::warn!("Cannot rename: no active scene");
            return false;
        };
        rename(&mut self.callbacks, scene, new_name)
    }

    // ── Metadata ─────────────────────────────────────────────────────────

    /// Header of one scene file, or `None` if it cannot be read.
    pub fn read_scene_meta(path: &Path) -> Option<SceneMeta> {
        Self::try_read_scene_meta(path)
            .inspect_err(|err| log::warn!("Could not read scene metadata: {err}"))
            .ok()
    }

    pub fn try_read_scene_meta(path: &Path) -> Result<SceneMeta, SceneError> {
        let header = read_header(path)?;
        let meta = header.meta.unwrap_or_default();
        Ok(SceneMeta {
            file_name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            name: header.name,
            actor_count: header.actor_count,
            last_modified: meta.last_modified,
            thumbnail: meta.thumbnail,
        })
    }

    /// Metadata of every readable scene file in `dir`, sorted by file name.
    pub fn list_scenes_meta(dir: &Path) -> Vec<SceneMeta> {
        Self::list_available_scene_files(dir)
            .iter()
            .filter_map(|file| Self::read_scene_meta(&dir.join(file)))
            .collect()
    }

    /// File names (with extension) of the scene files in `dir`, sorted.
    pub fn list_available_scene_files(dir: &Path) -> Vec<String> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Could not list scenes in {}: {err}", dir.display());
                return Vec::new();
            }
        };

        let mut files: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_scene_extension(path))
            .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        files.sort();
        files
    }

    // ── Active scene ─────────────────────────────────────────────────────

    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.as_ref()
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active.as_mut()
    }

    /// Install `scene` as active and return the previous one.
    pub fn set_active_scene(&mut self, scene: Scene) -> Option<Scene> {
        self.active.replace(scene)
    }

    pub fn take_active_scene(&mut self) -> Option<Scene> {
        self.active.take()
    }

    pub fn spawn_actor<K: ActorKind>(&mut self, name: impl Into<String>, kind: K) -> Option<&mut Actor> {
        let Some(scene) = self.active.as_mut() else {
            log::warn!("Cannot spawn actor: no active scene");
            return None;
        };
        let actor = scene.spawn_actor(name, kind)?;
        if let Some(callback) = self.callbacks.actor_added.as_mut() {
            callback(actor);
        }
        Some(actor)
    }

    pub fn find_actor_by_id(&self, id: ActorId) -> Option<&Actor> {
        self.active.as_ref()?.find_actor_by_id(id)
    }

    pub fn find_actor_by_id_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.active.as_mut()?.find_actor_by_id_mut(id)
    }

    /// Remove an actor from the active scene. `on_actor_removing` sees the
    /// actor before it is dropped; `on_actor_removed` gets its id after.
    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        self.try_remove_actor(id)
            .inspect_err(|err| log::warn!("Could not remove actor: {err}"))
            .is_ok()
    }

    pub fn try_remove_actor(&mut self, id: ActorId) -> Result<(), SceneError> {
        let scene = self.active.as_mut().ok_or(SceneError::NoActiveScene)?;
        let actor = scene.find_actor_by_id(id).ok_or(SceneError::ActorNotFound(id))?;
        if let Some(callback) = self.callbacks.actor_removing.as_mut() {
            callback(actor);
        }
        scene.remove_actor(id);
        if let Some(callback) = self.callbacks.actor_removed.as_mut() {
            callback(id);
        }
        Ok(())
    }

    /// Tick the active scene, if any.
    pub fn update(&mut self, delta_time: f32) {
        if let Some(scene) = self.active.as_mut() {
            scene.update_actors(delta_time);
        }
    }

    // ── Callbacks ────────────────────────────────────────────────────────

    pub fn set_on_scene_loaded(&mut self, callback: impl FnMut(&Scene) + 'static) {
        self.callbacks.scene_loaded = Some(Box::new(callback));
    }

    pub fn set_on_scene_saved(&mut self, callback: impl FnMut(&Scene) + 'static) {
        self.callbacks.scene_saved = Some(Box::new(callback));
    }

    /// Called with the renamed scene and its previous name.
    pub fn set_on_scene_renamed(&mut self, callback: impl FnMut(&Scene, &str) + 'static) {
        self.callbacks.scene_renamed = Some(Box::new(callback));
    }

    pub fn set_on_actor_added(&mut self, callback: impl FnMut(&Actor) + 'static) {
        self.callbacks.actor_added = Some(Box::new(callback));
    }

    pub fn set_on_actor_removing(&mut self, callback: impl FnMut(&Actor) + 'static) {
        self.callbacks.actor_removing = Some(Box::new(callback));
    }

    pub fn set_on_actor_removed(&mut self, callback: impl FnMut(ActorId) + 'static) {
        self.callbacks.actor_removed = Some(Box::new(callback));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn scene_path(dir: &Path, filename: &str) -> PathBuf {
    let path = dir.join(filename);
    if has_scene_extension(&path) {
        path
    } else {
        dir.join(format!("{filename}.{SCENE_EXTENSION}"))
    }
}

fn has_scene_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SCENE_EXTENSION)
}

fn read_header(path: &Path) -> Result<SceneHeader, SceneError> {
    let text = fs::read_to_string(path).map_err(|e| SceneError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| SceneError::parse(path, e))
}

/// `ctime`-style local time, e.g. `Sun Oct 18 09:41:07 2026`.
fn timestamp() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Serialize and write, stamping `meta` with the current time and `thumbnail`.
fn write_scene(path: &Path, scene: &mut Scene, thumbnail: String) -> Result<(), SceneError> {
    let mut data = scene.serialize().clone();
    if let Some(object) = data.as_object_mut() {
        let meta = SceneFileMeta {
            last_modified: timestamp(),
            thumbnail,
        };
        object.insert("meta".into(), to_json(&meta));
    }
    let text = serde_json::to_string_pretty(&data).map_err(SerializeError::from)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SceneError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| SceneError::io(path, e))
}

fn save_to(dir: &Path, callbacks: &mut Callbacks, scene: &mut Scene, filename: &str) -> Result<bool, SceneError> {
    if !scene.is_dirty() {
        log::debug!("Scene '{}' unchanged; skipping save", scene.name());
        return Ok(false);
    }

    let path = scene_path(dir, filename);
    // Saves keep the thumbnail already recorded in the file.
    let thumbnail = read_header(&path)
        .ok()
        .and_then(|header| header.meta)
        .map(|meta| meta.thumbnail)
        .unwrap_or_default();
    write_scene(&path, scene, thumbnail)?;
    scene.mark_saved();
    log::info!("Saved scene '{}' to {}", scene.name(), path.display());

    if let Some(callback) = callbacks.scene_saved.as_mut() {
        callback(scene);
    }
    Ok(true)
}

fn rename(callbacks: &mut Callbacks, scene: &mut Scene, new_name: &str) -> bool {
    if new_name.is_empty() {
        log::warn!("Cannot rename scene '{}' to an empty name", scene.name());
        return false;
    }
    if scene.name() == new_name {
        log::warn!("Scene is already named '{new_name}'");
        return false;
    }

    let old_name = scene.name().to_owned();
    scene.set_name(new_name);
    log::info!("Renamed scene '{old_name}' to '{new_name}'");
    if let Some(callback) = callbacks.scene_renamed.as_mut() {
        callback(scene, &old_name);
    }
    true
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::actor::{EmptyActor, ModelActor};
    use crate::math::Vec3;

    fn manager() -> (tempfile::TempDir, SceneManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = SceneManager::new(dir.path().join("Scenes"));
        (dir, manager)
    }

    #[test]
    fn create_then_load() {
        let (_dir, mut scenes) = manager();
        let mut resources = ResourceManager::new();

        assert!(scenes.create_scene_file("Lake", "Lake", false));
        assert!(scenes.scene_path("Lake").is_file());

        let scene = scenes.load_scene_file("Lake", &mut resources).unwrap();
        assert_eq!(scene.name(), "Lake");
        assert!(scene.is_empty());
        assert!(!scene.is_dirty());
    }

    #[test]
    fn create_respects_overwrite_flag() {
        let (_dir, scenes) = manager();
        assert!(scenes.create_scene_file("One", "Shared", false));
        assert!(!scenes.create_scene_file("Two", "Shared", false));
        assert!(matches!(
            scenes.try_create_scene_file("Two", "Shared", false),
            Err(SceneError::AlreadyExists(_))
        ));

        assert!(scenes.create_scene_file("Two", "Shared.tscene", true));
        let meta = SceneManager::read_scene_meta(&scenes.scene_path("Shared")).unwrap();
        assert_eq!(meta.name, "Two");
    }

    #[test]
    fn failed_load_keeps_active_scene() {
        let (_dir, mut scenes) = manager();
        let mut resources = ResourceManager::new();
        scenes.set_active_scene(Scene::new("Current"));

        assert!(scenes.load_scene_file("Missing", &mut resources).is_none());
        assert!(matches!(
            scenes.try_load_scene_file("Missing", &mut resources),
            Err(SceneError::Io { .. })
        ));

        fs::create_dir_all(scenes.scenes_dir()).unwrap();
        fs::write(scenes.scene_path("Broken"), "{ not json").unwrap();
        assert!(matches!(
            scenes.try_load_scene_file("Broken", &mut resources),
            Err(SceneError::Parse { .. })
        ));

        assert_eq!(scenes.active_scene().unwrap().name(), "Current");
    }

    #[test]
    fn clean_scene_is_not_rewritten() {
        let (_dir, mut scenes) = manager();
        let mut resources = ResourceManager::new();
        scenes.create_scene_file("Lake", "Lake", false);
        scenes.load_scene_file("Lake", &mut resources).unwrap();

        let path = scenes.scene_path("Lake");
        fs::remove_file(&path).unwrap();

        assert!(scenes.save_active_scene("Lake"));
        assert!(!path.exists());

        scenes.spawn_actor("Rock", EmptyActor).unwrap();
        assert!(scenes.try_save_active_scene("Lake").unwrap());
        assert!(path.exists());
        assert!(!scenes.active_scene().unwrap().is_dirty());
    }

    #[test]
    fn save_stamps_meta_and_lists_scenes() {
        let (_dir, mut scenes) = manager();
        let mut scene = Scene::new("Harbor");
        scene.spawn_actor("Boat", ModelActor::new("Models/boat.obj")).unwrap();
        scene.spawn_actor("Buoy", EmptyActor).unwrap();
        assert!(scenes.save_scene_file(&mut scene, "Harbor"));
        scenes.create_scene_file("Lake", "Lake", false);
        fs::write(scenes.scenes_dir().join("notes.txt"), "ignored").unwrap();

        let files = SceneManager::list_available_scene_files(scenes.scenes_dir());
        assert_eq!(files, vec!["Harbor.tscene", "Lake.tscene"]);

        let metas = SceneManager::list_scenes_meta(scenes.scenes_dir());
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].file_name, "Harbor");
        assert_eq!(metas[0].name, "Harbor");
        assert_eq!(metas[0].actor_count, 2);
        assert!(!metas[0].last_modified.is_empty());
        assert!(metas[0].thumbnail.is_empty());
    }

    #[test]
    fn listing_a_missing_directory_is_empty() {
        let (dir, _) = manager();
        assert!(SceneManager::list_available_scene_files(&dir.path().join("nope")).is_empty());
        assert!(SceneManager::read_scene_meta(&dir.path().join("nope.tscene")).is_none());
    }

    #[test]
    fn save_keeps_existing_thumbnail() {
        let (_dir, mut scenes) = manager();
        fs::create_dir_all(scenes.scenes_dir()).unwrap();
        fs::write(
            scenes.scene_path("Lake"),
            r#"{ "name": "Lake", "meta": { "last_modified": "", "thumbnail": "lake.png" } }"#,
        )
        .unwrap();

        let mut scene = Scene::new("Lake");
        assert!(scenes.save_scene_file(&mut scene, "Lake"));
        let meta = SceneManager::read_scene_meta(&scenes.scene_path("Lake")).unwrap();
        assert_eq!(meta.thumbnail, "lake.png");
    }

    #[test]
    fn overwriting_create_drops_old_thumbnail() {
        let (_dir, scenes) = manager();
        fs::create_dir_all(scenes.scenes_dir()).unwrap();
        fs::write(
            scenes.scene_path("Lake"),
            r#"{ "name": "Lake", "meta": { "last_modified": "", "thumbnail": "lake.png" } }"#,
        )
        .unwrap();

        assert!(!scenes.create_scene_file("Lake", "Lake", false));
        assert!(scenes.create_scene_file("Lake", "Lake", true));
        let meta = SceneManager::read_scene_meta(&scenes.scene_path("Lake")).unwrap();
        assert!(meta.thumbnail.is_empty());
        assert_eq!(meta.actor_count, 0);
    }

    #[test]
    fn rename_marks_dirty_and_notifies() {
        let (_dir, mut scenes) = manager();
        let renamed = Rc::new(RefCell::new(Vec::new()));
        let sink = renamed.clone();
        scenes.set_on_scene_renamed(move |scene, old| sink.borrow_mut().push(format!("{old}->{}", scene.name())));

        let mut scene = Scene::new("Draft");
        scene.mark_saved();
        assert!(scenes.rename_scene(&mut scene, "Final"));
        assert!(scene.is_dirty());
        assert!(!scenes.rename_scene(&mut scene, ""));
        assert!(!scenes.rename_scene(&mut scene, "Final"));
        assert!(!scenes.rename_active_scene("Other"));
        assert!(scenes.rename_scene(&mut scene, "  "));
        assert_eq!(scene.name(), "  ");

        assert_eq!(*renamed.borrow(), vec!["Draft->Final", "Final->  "]);
    }

    #[test]
    fn lifecycle_callbacks_fire_in_order() {
        let (_dir, mut scenes) = manager();
        let mut resources = ResourceManager::new();
        let events = Rc::new(RefCell::new(Vec::<String>::new()));

        let e = events.clone();
        scenes.set_on_scene_loaded(move |s| e.borrow_mut().push(format!("loaded {}", s.name())));
        let e = events.clone();
        scenes.set_on_scene_saved(move |s| e.borrow_mut().push(format!("saved {}", s.name())));
        let e = events.clone();
        scenes.set_on_actor_added(move |a| e.borrow_mut().push(format!("added {}", a.id())));
        let e = events.clone();
        scenes.set_on_actor_removing(move |a| e.borrow_mut().push(format!("removing {}", a.name())));
        let e = events.clone();
        scenes.set_on_actor_removed(move |id| e.borrow_mut().push(format!("removed {id}")));

        scenes.create_scene_file("Lake", "Lake", false);
        scenes.load_scene_file("Lake", &mut resources).unwrap();
        let id = scenes.spawn_actor("Rock", EmptyActor).unwrap().id();
        assert!(scenes.remove_actor(id));
        assert!(!scenes.remove_actor(id));
        scenes.save_active_scene("Lake");

        assert_eq!(
            *events.borrow(),
            vec!["loaded Lake", "added 1", "removing Rock", "removed 1", "saved Lake"]
        );
    }

    #[test]
    fn active_scene_operations_require_a_scene() {
        let (_dir, mut scenes) = manager();
        assert!(scenes.spawn_actor("Rock", EmptyActor).is_none());
        assert!(matches!(scenes.try_remove_actor(ActorId::from_raw(1)), Err(SceneError::NoActiveScene)));
        assert!(matches!(scenes.try_save_active_scene("X"), Err(SceneError::NoActiveScene)));
        scenes.update(0.1);

        scenes.set_active_scene(Scene::new("Now"));
        assert!(matches!(
            scenes.try_remove_actor(ActorId::from_raw(9)),
            Err(SceneError::ActorNotFound(_))
        ));
        let id = scenes.spawn_actor("Rock", EmptyActor).unwrap().id();
        scenes.find_actor_by_id_mut(id).unwrap().set_position(Vec3::Y);
        assert_eq!(scenes.find_actor_by_id(id).unwrap().position(), Vec3::Y);
        assert_eq!(scenes.take_active_scene().unwrap().name(), "Now");
        assert!(scenes.active_scene().is_none());
    }
}
