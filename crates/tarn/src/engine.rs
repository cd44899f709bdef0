//! # Engine Context
//!
//! [`Engine`] owns the long-lived services: the scene manager (with its type
//! registry), the resource cache and frame time. It is passed around
//! explicitly; there is no global instance.
//!
//! ```ignore
//! use tarn::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default().assets_dir("Assets"));
//! engine.start();
//! engine.spawn_actor("Boat", ModelActor::new("Models/boat.obj"));
//! loop {
//!     engine.tick();
//!     for item in engine.active_scene().unwrap().renderables() {
//!         // draw item.model with item.world and item.config
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::actor::{Actor, ActorKind};
use crate::registry::TypeRegistry;
use crate::resource::ResourceManager;
use crate::scene::Scene;
use crate::scene_manager::SceneManager;
use crate::time::Time;

/// Startup settings. Deserializable so a project file can supply them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of the project's assets. Scenes live in `<assets_dir>/Scenes`.
    pub assets_dir: PathBuf,
    /// Scene file loaded by [`Engine::start`].
    pub default_scene: String,
    /// Create the default scene file when it does not exist yet.
    pub create_default_scene: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("Assets"),
            default_scene: "DefaultScene".to_owned(),
            create_default_scene: true,
        }
    }
}

impl EngineConfig {
    pub fn assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    pub fn default_scene(mut self, filename: impl Into<String>) -> Self {
        self.default_scene = filename.into();
        self
    }

    pub fn create_default_scene(mut self, create: bool) -> Self {
        self.create_default_scene = create;
        self
    }

    pub fn scenes_dir(&self) -> PathBuf {
        self.assets_dir.join("Scenes")
    }
}

pub struct Engine {
    config: EngineConfig,
    scenes: SceneManager,
    resources: ResourceManager,
    time: Time,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, TypeRegistry::with_builtins())
    }

    /// An engine whose scene loading knows the given types.
    pub fn with_registry(config: EngineConfig, registry: TypeRegistry) -> Self {
        let scenes = SceneManager::with_registry(config.scenes_dir(), registry);
        Self {
            config,
            scenes,
            resources: ResourceManager::new(),
            time: Time::new(),
        }
    }

    /// Load the default scene, creating its file first if allowed and
    /// missing. Returns whether a scene is active afterwards.
    pub fn start(&mut self) -> bool {
        let filename = self.config.default_scene.clone();
        if self.config.create_default_scene && !self.scenes.scene_path(&filename).exists() {
            log::info!("Default scene '{filename}' not found; creating it");
            self.scenes.create_scene_file(&filename, &filename, false);
        }
        self.load_scene(&filename)
    }

    /// Advance time from the wall clock and tick the active scene.
    pub fn tick(&mut self) {
        self.time.update();
        self.scenes.update(self.time.delta_secs());
    }

    /// Tick with a fixed delta.
    pub fn tick_with(&mut self, delta: Duration) {
        self.time.advance(delta);
        self.scenes.update(self.time.delta_secs());
    }

    pub fn load_scene(&mut self, filename: &str) -> bool {
        self.scenes.load_scene_file(filename, &mut self.resources).is_some()
    }

    pub fn save_scene(&mut self, filename: &str) -> bool {
        self.scenes.save_active_scene(filename)
    }

    /// Spawn into the active scene and resolve the new actor's resources.
    pub fn spawn_actor<K: ActorKind>(&mut self, name: impl Into<String>, kind: K) -> Option<&mut Actor> {
        let actor = self.scenes.spawn_actor(name, kind)?;
        if let Err(err) = actor.resolve_resources(&mut self.resources) {
            log::warn!("Actor '{}' ({}): {err}", actor.name(), actor.id());
        }
        Some(actor)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn assets_dir(&self) -> &Path {
        &self.config.assets_dir
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn scenes_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.scenes.active_scene()
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.active_scene_mut()
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    pub fn time(&self) -> &Time {
        &self.time
    }
}
