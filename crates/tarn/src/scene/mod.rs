//! # Scenes
//!
//! A [`Scene`] owns its actors in a dense `Vec`, indexed by id and by kind:
//!
//! ```text
//! actors:         [ A(1) | C(3) | D(4) ]     storage order, ticked in this order
//! actors_by_id:   { 1 → 0, 3 → 1, 4 → 2 }    always the exact inverse of storage
//! actors_by_type: { ModelActor → [1, 4], EmptyActor → [3] }
//! ```
//!
//! Removal swaps the last actor into the hole, so it is O(1) but does not
//! preserve storage order. Ids come from a counter that only moves forward,
//! so a removed actor's id is never handed out again.
//!
//! ## Change tracking
//!
//! Every structural change and every mutable actor access bumps `version`.
//! Two markers are compared against it:
//!
//! - the serialization cache, rebuilt by [`Scene::serialize`] only when its
//!   version is behind;
//! - the saved marker, set by [`Scene::mark_saved`] after a successful write,
//!   which drives [`Scene::is_dirty`].

pub mod file;

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;

use crate::actor::{Actor, ActorId, ActorKind, RenderConfig};
use crate::component::ComponentKey;
use crate::error::{ResourceError, SerializeError};
use crate::math::Mat4;
use crate::object::to_json;
use crate::registry::TypeRegistry;
use crate::resource::{ModelResource, ResourceManager};

use self::file::SceneFile;

type ActorAddedFn = Box<dyn FnMut(&Actor)>;
type ActorRemovedFn = Box<dyn FnMut(ActorId)>;

struct SerializationCache {
    version: Option<u64>,
    value: Value,
}

/// One model to draw, as seen by the renderer.
pub struct Renderable<'a> {
    pub actor: ActorId,
    pub component: ComponentKey,
    pub world: Mat4,
    pub model: &'a Rc<ModelResource>,
    pub config: &'a RenderConfig,
}

pub struct Scene {
    name: String,
    actors: Vec<Actor>,
    next_actor_id: u64,
    actors_by_id: HashMap<ActorId, usize>,
    actors_by_type: HashMap<TypeId, Vec<ActorId>>,
    version: u64,
    saved_version: Option<u64>,
    cache: SerializationCache,
    /// Number of serialization rebuilds (diagnostics only).
    #[cfg(feature = "diagnostics")]
    rebuilds: u64,
    on_actor_added: Option<ActorAddedFn>,
    on_actor_removed: Option<ActorRemovedFn>,
}

impl Scene {
    /// An empty scene. New scenes start dirty: they exist nowhere on disk.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actors: Vec::new(),
            next_actor_id: 1,
            actors_by_id: HashMap::new(),
            actors_by_type: HashMap::new(),
            version: 0,
            saved_version: None,
            cache: SerializationCache {
                version: None,
                value: Value::Null,
            },
            #[cfg(feature = "diagnostics")]
            rebuilds: 0,
            on_actor_added: None,
            on_actor_removed: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    // ── Spawning ─────────────────────────────────────────────────────────

    /// Create an actor with the next id, run its kind's `construct`, and add
    /// it to the scene. `None` once every `u32` id has been handed out.
    pub fn spawn_actor<K: ActorKind>(&mut self, name: impl Into<String>, kind: K) -> Option<&mut Actor> {
        self.spawn_boxed(name.into(), Box::new(kind))
    }

    /// [`spawn_actor`](Self::spawn_actor), then resolve the resources its
    /// components refer to.
    pub fn spawn_actor_with<K: ActorKind>(
        &mut self,
        name: impl Into<String>,
        kind: K,
        resources: &mut ResourceManager,
    ) -> Option<&mut Actor> {
        let actor = self.spawn_actor(name, kind)?;
        if let Err(err) = actor.resolve_resources(resources) {
            log::warn!("Actor '{}' ({}): {err}", actor.name(), actor.id());
        }
        Some(actor)
    }

    /// Spawn by registered type tag.
    pub fn spawn_actor_of_type(
        &mut self,
        name: impl Into<String>,
        type_name: &str,
        registry: &TypeRegistry,
    ) -> Option<&mut Actor> {
        let Some(kind) = registry.create_actor_kind(type_name) else {
            log::warn!("Cannot spawn unknown actor type `{type_name}`");
            return None;
        };
        self.spawn_boxed(name.into(), kind)
    }

    fn spawn_boxed(&mut self, name: String, kind: Box<dyn ActorKind>) -> Option<&mut Actor> {
        let Some(id) = self.allocate_id() else {
            log::warn!("Scene '{}': actor ids exhausted; cannot spawn '{name}'", self.name);
            return None;
        };
        let mut actor = Actor::new(id, name, kind);
        actor.construct();
        Some(self.insert(actor, true))
    }

    /// Next unused id. The counter is wider than `ActorId` so the last `u32`
    /// can be handed out without wrapping.
    fn allocate_id(&mut self) -> Option<ActorId> {
        loop {
            let raw = u32::try_from(self.next_actor_id).ok()?;
            self.next_actor_id += 1;
            let id = ActorId::from_raw(raw);
            if !self.actors_by_id.contains_key(&id) {
                return Some(id);
            }
        }
    }

    fn insert(&mut self, mut actor: Actor, notify: bool) -> &mut Actor {
        let index = self.actors.len();
        let id = actor.id();
        actor.vector_index = index;
        self.actors_by_id.insert(id, index);
        self.actors_by_type.entry(actor.kind_type_id()).or_default().push(id);
        self.actors.push(actor);
        self.touch();

        if notify && let Some(callback) = self.on_actor_added.as_mut() {
            callback(&self.actors[index]);
        }
        log::debug!("Scene '{}': added actor {id} at index {index}", self.name);
        &mut self.actors[index]
    }

    // ── Lookup ───────────────────────────────────────────────────────────

    pub fn find_actor_by_id(&self, id: ActorId) -> Option<&Actor> {
        self.actors_by_id.get(&id).map(|&index| &self.actors[index])
    }

    /// Mutable access. Counts as a change for dirty tracking.
    pub fn find_actor_by_id_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        let index = *self.actors_by_id.get(&id)?;
        self.touch();
        Some(&mut self.actors[index])
    }

    /// The actor with `id`, only if its kind is `K`.
    pub fn find_actor_by_id_as<K: ActorKind>(&self, id: ActorId) -> Option<&Actor> {
        self.find_actor_by_id(id).filter(|actor| actor.is::<K>())
    }

    /// First actor of kind `K` in spawn order.
    pub fn find_actor_of_type<K: ActorKind>(&self) -> Option<&Actor> {
        let first = *self.actors_by_type.get(&TypeId::of::<K>())?.first()?;
        self.find_actor_by_id(first)
    }

    /// All actors of kind `K` in spawn order.
    pub fn find_actors_of_type<K: ActorKind>(&self) -> Vec<&Actor> {
        self.actors_by_type
            .get(&TypeId::of::<K>())
            .map(|ids| ids.iter().filter_map(|&id| self.find_actor_by_id(id)).collect())
            .unwrap_or_default()
    }

    /// Actors in storage order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    // ── Removal ──────────────────────────────────────────────────────────

    /// Remove and drop an actor with its components. `false` if absent.
    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        let Some(index) = self.actors_by_id.remove(&id) else {
            return false;
        };

        let removed = self.actors.swap_remove(index);
        if let Some(moved) = self.actors.get_mut(index) {
            moved.vector_index = index;
            self.actors_by_id.insert(moved.id(), index);
        }
        if let Some(ids) = self.actors_by_type.get_mut(&removed.kind_type_id())
            && let Some(pos) = ids.iter().position(|&other| other == id)
        {
            ids.remove(pos);
        }
        drop(removed);
        self.touch();

        if let Some(callback) = self.on_actor_removed.as_mut() {
            callback(id);
        }
        log::debug!("Scene '{}': removed actor {id}", self.name);
        true
    }

    // ── Frame update ─────────────────────────────────────────────────────

    /// Tick every actor in storage order. Not a change for dirty tracking.
    pub fn update_actors(&mut self, delta_time: f32) {
        for actor in &mut self.actors {
            actor.tick(delta_time);
        }
    }

    /// Models with their world matrices, for the renderer.
    pub fn renderables(&self) -> impl Iterator<Item = Renderable<'_>> {
        self.actors.iter().flat_map(|actor| {
            actor.models().filter_map(move |(component, model, world)| {
                Some(Renderable {
                    actor: actor.id(),
                    component,
                    world,
                    model: model.model()?,
                    config: &actor.config,
                })
            })
        })
    }

    pub fn resolve_resources(&mut self, resources: &mut ResourceManager) -> Result<(), ResourceError> {
        for actor in &mut self.actors {
            actor.resolve_resources(resources)?;
        }
        Ok(())
    }

    // ── Callbacks ────────────────────────────────────────────────────────

    pub fn set_on_actor_added(&mut self, callback: impl FnMut(&Actor) + 'static) {
        self.on_actor_added = Some(Box::new(callback));
    }

    pub fn set_on_actor_removed(&mut self, callback: impl FnMut(ActorId) + 'static) {
        self.on_actor_removed = Some(Box::new(callback));
    }

    // ── Change tracking ──────────────────────────────────────────────────

    fn touch(&mut self) {
        self.version += 1;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Changed since the last [`mark_saved`](Self::mark_saved), or never saved.
    pub fn is_dirty(&self) -> bool {
        self.saved_version != Some(self.version)
    }

    pub fn mark_dirty(&mut self) {
        self.touch();
    }

    pub fn mark_saved(&mut self) {
        self.saved_version = Some(self.version);
    }

    /// How many times [`serialize`](Self::serialize) has rebuilt its output.
    #[cfg(feature = "diagnostics")]
    pub fn serialization_rebuilds(&self) -> u64 {
        self.rebuilds
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// The scene as JSON. Rebuilt only when the scene changed since the last
    /// call; otherwise the cached value is returned as is.
    pub fn serialize(&mut self) -> &Value {
        if self.cache.version != Some(self.version) {
            self.cache.value = to_json(&self.to_file());
            self.cache.version = Some(self.version);
            #[cfg(feature = "diagnostics")]
            {
                self.rebuilds += 1;
            }
            log::debug!("Scene '{}': rebuilt serialization at version {}", self.name, self.version);
        }
        &self.cache.value
    }

    pub fn to_file(&self) -> SceneFile {
        SceneFile {
            name: self.name.clone(),
            next_actor_id: self.next_actor_id,
            actor_count: self.actors.len(),
            actors: self.actors.iter().map(Actor::to_record).collect(),
            meta: None,
        }
    }

    /// Replace all actors with those in `data`. On error the scene is left
    /// as it was.
    pub fn deserialize(
        &mut self,
        data: &Value,
        registry: &TypeRegistry,
        resources: &mut ResourceManager,
    ) -> Result<(), SerializeError> {
        let file = SceneFile::deserialize(data)?;

        let mut seen = HashSet::with_capacity(file.actors.len());
        let mut actors = Vec::with_capacity(file.actors.len());
        for record in &file.actors {
            if !seen.insert(record.id) {
                return Err(SerializeError::DuplicateActorId(record.id));
            }
            actors.push(Actor::from_record(record, registry, resources)?);
        }

        if file.actor_count != 0 && file.actor_count != actors.len() {
            log::warn!(
                "Scene '{}' declares {} actors but contains {}",
                file.name,
                file.actor_count,
                actors.len()
            );
        }
        let highest = actors.iter().map(|a| u64::from(a.id().raw())).max().unwrap_or(0);
        if file.next_actor_id <= highest {
            log::warn!(
                "Scene '{}': next_actor_id {} is not above highest id {highest}; ids in use will be skipped",
                file.name,
                file.next_actor_id
            );
        }

        self.name = file.name;
        self.next_actor_id = file.next_actor_id.max(1);
        self.actors.clear();
        self.actors_by_id.clear();
        self.actors_by_type.clear();
        for actor in actors {
            self.insert(actor, false);
        }
        self.touch();
        Ok(())
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("actors", &self.actors.len())
            .field("next_actor_id", &self.next_actor_id)
            .field("version", &self.version)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
