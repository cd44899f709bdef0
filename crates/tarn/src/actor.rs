//! # Actors
//!
//! An [`Actor`] is a named object placed in a scene. It owns a set of
//! [`Components`] (always starting with a `SceneComponent` root that carries
//! the actor's transform) and an optional [`ActorKind`]: the behavior that
//! distinguishes a lamp from a crate.
//!
//! ```text
//! Actor { id: ActorId(3), name: "Crate", kind: ModelActor }
//!  ├─ config:     RenderConfig { draw_outline, back_face_culling, .. }
//!  └─ components: DefaultSceneRoot ── ModelComponent("Models/crate.obj")
//! ```
//!
//! `ActorId` is scoped to a scene and persisted; the actor's
//! [`ObjectId`] is process-local like every other engine object.

use std::any::{Any, TypeId};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::component::{Component, ComponentKey, Components, ModelComponent, SceneComponent};
use crate::error::{HierarchyError, ResourceError, SerializeError};
use crate::math::{Mat4, Transform, Vec3};
use crate::object::{AsAny, CoreObject, ObjectId, to_json};
use crate::registry::TypeRegistry;
use crate::resource::ResourceManager;
use crate::scene::file::ActorRecord;

// ── ActorId ──────────────────────────────────────────────────────────────

/// Scene-scoped actor identifier. Never reused within a scene's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(u32);

impl ActorId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── ActorKind ────────────────────────────────────────────────────────────

/// Per-type actor behavior.
///
/// `construct` runs once when the actor is spawned, never on load: loaded
/// actors get their components from the file.
pub trait ActorKind: AsAny {
    /// Tag written to scene files and looked up in the [`TypeRegistry`].
    fn type_name(&self) -> &'static str;

    fn construct(&mut self, _actor: &mut Actor) {}

    fn tick(&mut self, _actor: &mut Actor, _delta_time: f32) {}

    fn serialize_properties(&self, _properties: &mut Map<String, Value>) {}

    fn deserialize_properties(&mut self, _properties: &Map<String, Value>) -> Result<(), SerializeError> {
        Ok(())
    }
}

/// The plain actor: a transform and whatever components get attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyActor;

impl ActorKind for EmptyActor {
    fn type_name(&self) -> &'static str {
        "Actor"
    }
}

/// An actor that spawns with a [`ModelComponent`] for the given path.
#[derive(Debug, Default, Clone)]
pub struct ModelActor {
    pub model_path: String,
}

impl ModelActor {
    pub fn new(model_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
        }
    }
}

impl ActorKind for ModelActor {
    fn type_name(&self) -> &'static str {
        "ModelActor"
    }

    fn construct(&mut self, actor: &mut Actor) {
        if !self.model_path.is_empty() {
            actor.add_component(ModelComponent::new(self.model_path.clone()));
        }
    }

    fn serialize_properties(&self, properties: &mut Map<String, Value>) {
        properties.insert("model_path".into(), Value::String(self.model_path.clone()));
    }

    fn deserialize_properties(&mut self, properties: &Map<String, Value>) -> Result<(), SerializeError> {
        if let Some(path) = properties.get("model_path").and_then(Value::as_str) {
            self.model_path = path.to_owned();
        }
        Ok(())
    }
}

// ── Render configuration ─────────────────────────────────────────────────

/// Per-actor draw settings read by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub draw_outline: bool,
    pub back_face_culling: bool,
    pub transparent: bool,
    pub outline_thickness: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            draw_outline: false,
            back_face_culling: false,
            transparent: false,
            outline_thickness: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Back,
    Front,
}

/// One draw of an actor's models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawPass {
    /// The model itself. Writes stencil when an outline follows.
    Base { cull: CullMode, write_stencil: bool },
    /// Inflated back faces, masked by the base pass stencil.
    Outline { thickness: f32 },
    /// Redraw of front faces over the outline.
    Cover,
}

impl RenderConfig {
    /// Passes the renderer issues for an actor with this config, in order.
    pub fn draw_passes(&self) -> Vec<DrawPass> {
        let cull = if self.back_face_culling {
            CullMode::Back
        } else {
            CullMode::None
        };
        let mut passes = vec![DrawPass::Base {
            cull,
            write_stencil: self.draw_outline,
        }];
        if self.draw_outline {
            passes.push(DrawPass::Outline {
                thickness: self.outline_thickness,
            });
            passes.push(DrawPass::Cover);
        }
        passes
    }
}

impl DrawPass {
    pub fn cull_mode(&self) -> CullMode {
        match self {
            Self::Base { cull, .. } => *cull,
            Self::Outline { .. } => CullMode::Front,
            Self::Cover => CullMode::Back,
        }
    }
}

// ── Actor ────────────────────────────────────────────────────────────────

pub struct Actor {
    object_id: ObjectId,
    id: ActorId,
    name: String,
    pub(crate) vector_index: usize,
    pub config: RenderConfig,
    components: Components,
    /// Taken out while its hooks run so they can borrow the actor.
    kind: Option<Box<dyn ActorKind>>,
    kind_type: TypeId,
    kind_name: &'static str,
}

impl Actor {
    /// A fresh actor with a `DefaultSceneRoot` at the origin.
    pub(crate) fn new(id: ActorId, name: String, kind: Box<dyn ActorKind>) -> Self {
        let mut components = Components::new(id);
        components.add(SceneComponent);
        Self::from_parts(id, name, kind, components)
    }

    fn from_parts(id: ActorId, name: String, kind: Box<dyn ActorKind>, components: Components) -> Self {
        let kind_type = Any::type_id((*kind).as_any());
        let kind_name = kind.type_name();
        Self {
            object_id: ObjectId::next(),
            id,
            name,
            vector_index: 0,
            config: RenderConfig::default(),
            components,
            kind: Some(kind),
            kind_type,
            kind_name,
        }
    }

    /// Run the kind's spawn-time setup.
    pub(crate) fn construct(&mut self) {
        if let Some(mut kind) = self.kind.take() {
            kind.construct(self);
            self.kind = Some(kind);
        }
    }

    pub(crate) fn tick(&mut self, delta_time: f32) {
        self.components.tick(delta_time);
        if let Some(mut kind) = self.kind.take() {
            kind.tick(self, delta_time);
            self.kind = Some(kind);
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ── Kind ─────────────────────────────────────────────────────────────

    /// The actor type tag, e.g. `"ModelActor"`.
    pub fn kind_name(&self) -> &'static str {
        self.kind_name
    }

    pub(crate) fn kind_type_id(&self) -> TypeId {
        self.kind_type
    }

    pub fn is<K: ActorKind>(&self) -> bool {
        self.kind_type == TypeId::of::<K>()
    }

    pub fn kind<K: ActorKind>(&self) -> Option<&K> {
        self.kind.as_deref()?.as_any().downcast_ref::<K>()
    }

    pub fn kind_mut<K: ActorKind>(&mut self) -> Option<&mut K> {
        self.kind.as_deref_mut()?.as_any_mut().downcast_mut::<K>()
    }

    // ── Transform (stored on the root component) ─────────────────────────

    /// The root component's local transform, or identity without a root.
    pub fn transform(&self) -> Transform {
        self.components
            .root()
            .and_then(|root| self.components.get(root))
            .and_then(|slot| slot.transform())
            .copied()
            .unwrap_or_default()
    }

    pub fn set_transform(&mut self, transform: Transform) {
        let root = self.ensure_root();
        if let Some(local) = self.components.get_mut(root).and_then(|s| s.transform_mut()) {
            *local = transform;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform().position
    }

    pub fn set_position(&mut self, position: Vec3) {
        let mut t = self.transform();
        t.position = position;
        self.set_transform(t);
    }

    /// Euler angles in degrees.
    pub fn rotation(&self) -> Vec3 {
        self.transform().rotation
    }

    pub fn set_rotation(&mut self, degrees: Vec3) {
        let mut t = self.transform();
        t.rotation = degrees;
        self.set_transform(t);
    }

    pub fn scale(&self) -> Vec3 {
        self.transform().scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        let mut t = self.transform();
        t.scale = scale;
        self.set_transform(t);
    }

    /// World matrix of the root component.
    pub fn world_matrix(&self) -> Mat4 {
        self.components
            .root()
            .and_then(|root| self.components.world_transform(root))
            .unwrap_or(Mat4::IDENTITY)
    }

    fn ensure_root(&mut self) -> ComponentKey {
        match self.components.root() {
            Some(root) => root,
            None => self.components.add(SceneComponent),
        }
    }

    // ── Components ───────────────────────────────────────────────────────

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut Components {
        &mut self.components
    }

    pub fn add_component<C: Component>(&mut self, component: C) -> ComponentKey {
        self.components.add(component)
    }

    pub fn remove_component(&mut self, key: ComponentKey) -> Option<Box<dyn Component>> {
        self.components.remove(key)
    }

    /// First component of type `T`.
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.components.find::<T>().map(|(_, c)| c)
    }

    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        let key = self.components.find_key::<T>()?;
        self.components.get_as_mut::<T>(key)
    }

    pub fn components_of_type<T: Component>(&self) -> Vec<&T> {
        self.components.find_all::<T>().map(|(_, c)| c).collect()
    }

    pub fn root_component(&self) -> Option<ComponentKey> {
        self.components.root()
    }

    pub fn set_root_component(&mut self, key: ComponentKey) -> Result<(), HierarchyError> {
        self.components.set_root(key)
    }

    pub fn attach_to_component(&mut self, child: ComponentKey, parent: ComponentKey) -> Result<(), HierarchyError> {
        self.components.attach(child, parent)
    }

    pub fn detach(&mut self, key: ComponentKey) -> Result<(), HierarchyError> {
        self.components.detach(key)
    }

    pub fn world_transform(&self, key: ComponentKey) -> Option<Mat4> {
        self.components.world_transform(key)
    }

    /// Model components with their world matrices.
    pub fn models(&self) -> impl Iterator<Item = (ComponentKey, &ModelComponent, Mat4)> {
        self.components
            .find_all::<ModelComponent>()
            .filter_map(move |(key, model)| Some((key, model, self.components.world_transform(key)?)))
    }

    pub fn resolve_resources(&mut self, resources: &mut ResourceManager) -> Result<(), ResourceError> {
        self.components.resolve_resources(resources)
    }

    // ── Persistence ──────────────────────────────────────────────────────

    pub(crate) fn to_record(&self) -> ActorRecord {
        let transform = self.transform();
        let mut properties = Map::new();
        if let Some(kind) = &self.kind {
            kind.serialize_properties(&mut properties);
        }
        let root_component = self
            .components
            .root()
            .and_then(|root| self.components.get(root))
            .map_or(0, |slot| slot.object_id().raw());

        ActorRecord {
            id: self.id,
            vector_index: self.vector_index,
            name: self.name.clone(),
            position: transform.position.into(),
            rotation: transform.rotation.into(),
            scale: transform.scale.into(),
            type_name: self.kind_name.to_owned(),
            config: self.config,
            root_component,
            components: self.components.to_records(),
            properties,
        }
    }

    /// Rebuild an actor, components included, from its saved record.
    pub(crate) fn from_record(
        record: &ActorRecord,
        registry: &TypeRegistry,
        resources: &mut ResourceManager,
    ) -> Result<Self, SerializeError> {
        let kind = registry
            .create_actor_kind(&record.type_name)
            .ok_or_else(|| SerializeError::UnknownType(record.type_name.clone()))?;

        let components = if record.components.is_empty() {
            let mut components = Components::new(record.id);
            components.add(SceneComponent);
            components
        } else {
            Components::from_records(record.id, &record.components, record.root_component, registry, resources)?
        };

        let mut actor = Self::from_parts(record.id, record.name.clone(), kind, components);
        actor.vector_index = record.vector_index;
        actor.apply_record(record)?;
        Ok(actor)
    }

    fn apply_record(&mut self, record: &ActorRecord) -> Result<(), SerializeError> {
        self.name = record.name.clone();
        self.config = record.config;
        self.set_transform(Transform {
            position: record.position.into(),
            rotation: record.rotation.into(),
            scale: record.scale.into(),
        });
        if let Some(kind) = self.kind.as_deref_mut() {
            kind.deserialize_properties(&record.properties)?;
        }
        Ok(())
    }
}

/// The component set is rebuilt through the [`TypeRegistry`] when a scene
/// loads; `deserialize` here restores only the actor's own fields.
impl CoreObject for Actor {
    fn object_id(&self) -> ObjectId {
        self.object_id
    }

    fn type_name(&self) -> &'static str {
        self.kind_name
    }

    fn serialize(&self) -> Value {
        to_json(&self.to_record())
    }

    fn deserialize(&mut self, data: &Value) -> Result<(), SerializeError> {
        let record = ActorRecord::deserialize(data)?;
        self.apply_record(&record)
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind_name)
            .field("components", &self.components.len())
            .finish()
    }
}
