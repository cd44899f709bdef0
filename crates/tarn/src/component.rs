//! # Components
//!
//! Components are the units of behavior and data attached to an actor. Each
//! actor owns its components in an arena ([`Components`]) keyed by
//! [`ComponentKey`]. Scene components additionally carry a [`SceneNode`]:
//! a local [`Transform`] plus parent/children links that form a tree inside
//! the actor.
//!
//! ```text
//! Actor
//!  └─ Components (SlotMap<ComponentKey, ComponentSlot>)
//!      ├─ DefaultSceneRoot  SceneComponent   node { parent: None }
//!      │   ├─ Body          ModelComponent   node { parent: root }
//!      │   │   └─ Turret    ModelComponent   node { parent: Body }
//!      │   └─ Marker        SceneComponent   node { parent: root }
//!      └─ Health            (non-scene)      no node
//! ```
//!
//! Links are arena keys, never pointers, so removing a component can only
//! leave a key that fails lookup. World transforms are recomputed by walking
//! the parent chain on every call.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::{Map, Value};
use slotmap::{SlotMap, new_key_type};

use crate::actor::ActorId;
use crate::error::{HierarchyError, ResourceError, SerializeError};
use crate::math::{Mat4, Transform};
use crate::object::{AsAny, CoreObject, ObjectId, to_json};
use crate::registry::TypeRegistry;
use crate::resource::{ModelResource, ResourceManager};
use crate::scene::file::ComponentRecord;

new_key_type! {
    /// Handle to a component inside one actor's arena.
    pub struct ComponentKey;
}

// ── Component trait ──────────────────────────────────────────────────────

/// Behavior and data attachable to an actor.
///
/// Only `type_name` is required. The hooks run in this order when a
/// component is added: owner assigned, [`on_attachment`](Self::on_attachment),
/// [`initialize`](Self::initialize).
pub trait Component: AsAny {
    /// Tag written to scene files and looked up in the [`TypeRegistry`].
    fn type_name(&self) -> &'static str;

    /// Whether this component has a transform and takes part in the hierarchy.
    fn is_scene_component(&self) -> bool {
        false
    }

    fn on_attachment(&mut self, _owner: ActorId) {}

    fn initialize(&mut self) {}

    fn tick(&mut self, _delta_time: f32) {}

    /// Write type-specific fields into the record's `properties` object.
    fn serialize_properties(&self, _properties: &mut Map<String, Value>) {}

    /// Restore type-specific fields from the record's `properties` object.
    fn deserialize_properties(&mut self, _properties: &Map<String, Value>) -> Result<(), SerializeError> {
        Ok(())
    }

    /// Fetch any shared resources this component refers to by key.
    fn resolve_resources(&mut self, _resources: &mut ResourceManager) -> Result<(), ResourceError> {
        Ok(())
    }
}

// ── Slots ────────────────────────────────────────────────────────────────

/// Hierarchy data carried by scene components.
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub local: Transform,
    parent: Option<ComponentKey>,
    children: Vec<ComponentKey>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<ComponentKey> {
        self.parent
    }

    pub fn children(&self) -> &[ComponentKey] {
        &self.children
    }
}

/// A component attached to an actor, with its identity and hierarchy data.
pub struct ComponentSlot {
    id: ObjectId,
    owner: ActorId,
    node: Option<SceneNode>,
    inner: Box<dyn Component>,
}

impl ComponentSlot {
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    /// `None` for non-scene components.
    pub fn node(&self) -> Option<&SceneNode> {
        self.node.as_ref()
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.node.as_ref().map(|n| &n.local)
    }

    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.node.as_mut().map(|n| &mut n.local)
    }

    pub fn component(&self) -> &dyn Component {
        &*self.inner
    }

    pub fn component_mut(&mut self) -> &mut dyn Component {
        &mut *self.inner
    }

    /// Downcast to the concrete component type.
    pub fn get<T: Component>(&self) -> Option<&T> {
        (*self.inner).as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        (*self.inner).as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: Component>(&self) -> bool {
        (*self.inner).as_any().is::<T>()
    }

    fn record(&self, parent_id: u64) -> ComponentRecord {
        let mut properties = Map::new();
        self.inner.serialize_properties(&mut properties);
        ComponentRecord {
            type_name: self.inner.type_name().to_owned(),
            id: self.id.raw(),
            parent_id,
            transform: self.node.as_ref().map(|n| n.local),
            properties,
        }
    }

    fn apply_record(&mut self, record: &ComponentRecord) -> Result<(), SerializeError> {
        self.inner.deserialize_properties(&record.properties)?;
        if let (Some(node), Some(transform)) = (self.node.as_mut(), record.transform) {
            node.local = transform;
        }
        Ok(())
    }
}

/// Hierarchy links are resolved by the owning arena, so the standalone form
/// carries no `parent_id`.
impl CoreObject for ComponentSlot {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    fn serialize(&self) -> Value {
        to_json(&self.record(0))
    }

    fn deserialize(&mut self, data: &Value) -> Result<(), SerializeError> {
        let record = ComponentRecord::deserialize(data)?;
        self.apply_record(&record)
    }
}

// ── Components arena ─────────────────────────────────────────────────────

/// All components of one actor, in attachment order.
pub struct Components {
    owner: ActorId,
    slots: SlotMap<ComponentKey, ComponentSlot>,
    order: Vec<ComponentKey>,
    root: Option<ComponentKey>,
}

impl Components {
    pub(crate) fn new(owner: ActorId) -> Self {
        Self {
            owner,
            slots: SlotMap::with_key(),
            order: Vec::new(),
            root: None,
        }
    }

    /// Attach a component. The first scene component becomes the root; later
    /// ones are parented under the root.
    pub fn add<C: Component>(&mut self, component: C) -> ComponentKey {
        self.add_boxed(Box::new(component))
    }

    pub fn add_boxed(&mut self, component: Box<dyn Component>) -> ComponentKey {
        let key = self.insert(component);
        if self.slots[key].node.is_some() {
            match self.root {
                None => self.root = Some(key),
                Some(root) => self.link(key, root),
            }
        }
        log::trace!("Attached {} to actor {}", self.slots[key].inner.type_name(), self.owner);
        key
    }

    /// Attach without touching the hierarchy.
    fn insert(&mut self, component: Box<dyn Component>) -> ComponentKey {
        let node = component.is_scene_component().then(SceneNode::default);
        let owner = self.owner;
        let key = self.slots.insert(ComponentSlot {
            id: ObjectId::next(),
            owner,
            node,
            inner: component,
        });
        self.order.push(key);

        let slot = &mut self.slots[key];
        slot.inner.on_attachment(owner);
        slot.inner.initialize();
        key
    }

    /// Detach and return a component. Its children move under the root, or
    /// become parentless when the root itself is removed or lies below them.
    pub fn remove(&mut self, key: ComponentKey) -> Option<Box<dyn Component>> {
        let children = self.slots.get(key)?.node.as_ref().map(|n| n.children.clone()).unwrap_or_default();

        self.unlink(key);
        for &child in &children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }

        if self.root == Some(key) {
            self.root = None;
        } else if let Some(root) = self.root {
            // The root itself may hang below `key`; it and its ancestors stay parentless.
            for child in children {
                if !self.is_ancestor(child, root) {
                    self.link(child, root);
                }
            }
        }

        self.order.retain(|&k| k != key);
        self.slots.remove(key).map(|slot| slot.inner)
    }

    /// Parent `child` under `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, child: ComponentKey, parent: ComponentKey) -> Result<(), HierarchyError> {
        self.scene_node(child)?;
        self.scene_node(parent)?;
        if child == parent {
            return Err(HierarchyError::SelfAttachment);
        }
        if self.is_ancestor(child, parent) {
            return Err(HierarchyError::Cycle);
        }

        self.unlink(child);
        self.link(child, parent);
        Ok(())
    }

    /// Unlink from the current parent, then fall back under the root.
    pub fn detach(&mut self, key: ComponentKey) -> Result<(), HierarchyError> {
        self.scene_node(key)?;
        self.unlink(key);
        if let Some(root) = self.root
            && !self.is_ancestor(key, root)
        {
            self.link(key, root);
        }
        Ok(())
    }

    /// Make `key` the root. The previous root, if parentless, moves under it.
    pub fn set_root(&mut self, key: ComponentKey) -> Result<(), HierarchyError> {
        self.scene_node(key)?;
        if self.root == Some(key) {
            return Ok(());
        }

        self.unlink(key);
        if let Some(old) = self.root.replace(key)
            && self.node(old).is_some_and(|n| n.parent.is_none())
        {
            self.link(old, key);
        }
        Ok(())
    }

    /// Local transforms multiplied from the top of the chain down.
    pub fn world_transform(&self, key: ComponentKey) -> Option<Mat4> {
        let mut node = self.node(key)?;
        let mut matrix = node.local.matrix();
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            matrix = node.local.matrix() * matrix;
        }
        Some(matrix)
    }

    pub fn root(&self) -> Option<ComponentKey> {
        self.root
    }

    pub fn get(&self, key: ComponentKey) -> Option<&ComponentSlot> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: ComponentKey) -> Option<&mut ComponentSlot> {
        self.slots.get_mut(key)
    }

    pub fn get_as<T: Component>(&self, key: ComponentKey) -> Option<&T> {
        self.slots.get(key)?.get::<T>()
    }

    pub fn get_as_mut<T: Component>(&mut self, key: ComponentKey) -> Option<&mut T> {
        self.slots.get_mut(key)?.get_mut::<T>()
    }

    /// First attached component of type `T`.
    pub fn find<T: Component>(&self) -> Option<(ComponentKey, &T)> {
        self.order.iter().find_map(|&key| self.slots[key].get::<T>().map(|c| (key, c)))
    }

    pub fn find_key<T: Component>(&self) -> Option<ComponentKey> {
        self.order.iter().copied().find(|&key| self.slots[key].is::<T>())
    }

    pub fn find_all<T: Component>(&self) -> impl Iterator<Item = (ComponentKey, &T)> {
        self.order.iter().filter_map(move |&key| self.slots[key].get::<T>().map(|c| (key, c)))
    }

    /// Components in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentKey, &ComponentSlot)> {
        self.order.iter().map(move |&key| (key, &self.slots[key]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn tick(&mut self, delta_time: f32) {
        for &key in &self.order {
            if let Some(slot) = self.slots.get_mut(key) {
                slot.inner.tick(delta_time);
            }
        }
    }

    pub(crate) fn resolve_resources(&mut self, resources: &mut ResourceManager) -> Result<(), ResourceError> {
        for &key in &self.order {
            if let Some(slot) = self.slots.get_mut(key) {
                slot.inner.resolve_resources(resources)?;
            }
        }
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Records in attachment order, parents written as object ids.
    pub(crate) fn to_records(&self) -> Vec<ComponentRecord> {
        self.iter()
            .map(|(_, slot)| {
                let parent_id = slot
                    .node
                    .as_ref()
                    .and_then(|n| n.parent)
                    .and_then(|p| self.slots.get(p))
                    .map_or(0, |p| p.id.raw());
                slot.record(parent_id)
            })
            .collect()
    }

    /// Rebuild an arena from records. Components get fresh object ids; the
    /// saved ids are only used to reconnect parent links.
    pub(crate) fn from_records(
        owner: ActorId,
        records: &[ComponentRecord],
        root_id: u64,
        registry: &TypeRegistry,
        resources: &mut ResourceManager,
    ) -> Result<Self, SerializeError> {
        let mut components = Self::new(owner);
        let mut keys = Vec::with_capacity(records.len());
        let mut remap = HashMap::with_capacity(records.len());

        for record in records {
            let mut component = registry
                .create_component(&record.type_name)
                .ok_or_else(|| SerializeError::UnknownType(record.type_name.clone()))?;
            component.deserialize_properties(&record.properties)?;
            component.resolve_resources(resources)?;

            let key = components.insert(component);
            if let (Some(node), Some(transform)) = (components.node_mut(key), record.transform) {
                node.local = transform;
            }
            keys.push(key);
            remap.insert(record.id, key);
        }

        for (record, &child) in records.iter().zip(&keys) {
            if record.parent_id == 0 {
                continue;
            }
            match remap.get(&record.parent_id) {
                Some(&parent) => components.attach(child, parent)?,
                None => log::warn!(
                    "Actor {owner}: component {} references missing parent {}; left unparented",
                    record.id,
                    record.parent_id
                ),
            }
        }

        components.root = remap
            .get(&root_id)
            .copied()
            .filter(|&key| components.node(key).is_some())
            .or_else(|| {
                keys.iter()
                    .copied()
                    .find(|&key| components.node(key).is_some_and(|n| n.parent.is_none()))
            });

        Ok(components)
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn node(&self, key: ComponentKey) -> Option<&SceneNode> {
        self.slots.get(key)?.node.as_ref()
    }

    fn node_mut(&mut self, key: ComponentKey) -> Option<&mut SceneNode> {
        self.slots.get_mut(key)?.node.as_mut()
    }

    fn scene_node(&self, key: ComponentKey) -> Result<&SceneNode, HierarchyError> {
        let slot = self.slots.get(key).ok_or(HierarchyError::NotFound)?;
        slot.node
            .as_ref()
            .ok_or(HierarchyError::NotSceneComponent(slot.inner.type_name()))
    }

    /// True if `ancestor` is `key` or lies on its parent chain.
    fn is_ancestor(&self, ancestor: ComponentKey, key: ComponentKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.node(k).and_then(|n| n.parent);
        }
        false
    }

    fn link(&mut self, child: ComponentKey, parent: ComponentKey) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn unlink(&mut self, key: ComponentKey) {
        let Some(parent) = self.node_mut(key).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != key);
        }
    }
}

// ── Built-in components ──────────────────────────────────────────────────

/// A transform-only component. Every actor starts with one as its root.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneComponent;

impl Component for SceneComponent {
    fn type_name(&self) -> &'static str {
        "SceneComponent"
    }

    fn is_scene_component(&self) -> bool {
        true
    }
}

/// A scene component that draws a model loaded through the resource cache.
///
/// The path is what gets persisted. The shared [`ModelResource`] is resolved
/// from it on load, or immediately through [`set_model`](Self::set_model).
#[derive(Default)]
pub struct ModelComponent {
    model_path: String,
    model: Option<Rc<ModelResource>>,
}

impl ModelComponent {
    /// A component that will load `path` when resources are resolved.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            model_path: path.into(),
            model: None,
        }
    }

    pub fn set_model(&mut self, path: impl Into<String>, resources: &mut ResourceManager) -> Result<(), ResourceError> {
        let path = path.into();
        let model = resources.load(&path, || ModelResource::new(path.clone()))?;
        self.model = Some(model);
        self.model_path = path;
        Ok(())
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    pub fn model(&self) -> Option<&Rc<ModelResource>> {
        self.model.as_ref()
    }
}

impl Component for ModelComponent {
    fn type_name(&self) -> &'static str {
        "ModelComponent"
    }

    fn is_scene_component(&self) -> bool {
        true
    }

    fn serialize_properties(&self, properties: &mut Map<String, Value>) {
        properties.insert("model_path".into(), Value::String(self.model_path.clone()));
    }

    fn deserialize_properties(&mut self, properties: &Map<String, Value>) -> Result<(), SerializeError> {
        self.model_path = properties
            .get("model_path")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        self.model = None;
        Ok(())
    }

    fn resolve_resources(&mut self, resources: &mut ResourceManager) -> Result<(), ResourceError> {
        if self.model.is_some() || self.model_path.is_empty() {
            return Ok(());
        }
        let path = self.model_path.clone();
        self.model = Some(resources.load(&path, || ModelResource::new(path.clone()))?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::math::Vec3;

    fn arena() -> Components {
        Components::new(ActorId::from_raw(1))
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[derive(Default)]
    struct Health(u32);

    impl Component for Health {
        fn type_name(&self) -> &'static str {
            "Health"
        }
    }

    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Component for Recorder {
        fn type_name(&self) -> &'static str {
            "Recorder"
        }

        fn on_attachment(&mut self, owner: ActorId) {
            self.log.borrow_mut().push(format!("attach {owner}"));
        }

        fn initialize(&mut self) {
            self.log.borrow_mut().push("init".into());
        }

        fn tick(&mut self, delta_time: f32) {
            self.log.borrow_mut().push(format!("tick {delta_time}"));
        }
    }

    #[test]
    fn first_scene_component_becomes_root() {
        let mut c = arena();
        let health = c.add(Health(10));
        let root = c.add(SceneComponent);
        let child = c.add(SceneComponent);

        assert_eq!(c.root(), Some(root));
        assert_eq!(c.get(child).unwrap().node().unwrap().parent(), Some(root));
        assert_eq!(c.get(root).unwrap().node().unwrap().children(), &[child]);
        assert!(c.get(health).unwrap().node().is_none());
        assert_eq!(c.get_as::<Health>(health).unwrap().0, 10);
    }

    #[test]
    fn hooks_run_in_order_with_owner_set() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut c = arena();
        let key = c.add(Recorder { log: log.clone() });
        c.tick(0.5);

        assert_eq!(c.get(key).unwrap().owner(), ActorId::from_raw(1));
        assert_eq!(*log.borrow(), vec!["attach 1", "init", "tick 0.5"]);
    }

    #[test]
    fn attach_rejects_self_cycles_and_non_scene() {
        let mut c = arena();
        let root = c.add(SceneComponent);
        let a = c.add(SceneComponent);
        let b = c.add(SceneComponent);
        let health = c.add(Health(1));

        c.attach(b, a).unwrap();
        assert_eq!(c.attach(a, a), Err(HierarchyError::SelfAttachment));
        assert_eq!(c.attach(a, b), Err(HierarchyError::Cycle));
        assert_eq!(c.attach(root, b), Err(HierarchyError::Cycle));
        assert_eq!(c.attach(health, a), Err(HierarchyError::NotSceneComponent("Health")));

        // Failed attaches leave the tree untouched.
        assert_eq!(c.get(a).unwrap().node().unwrap().parent(), Some(root));
        assert_eq!(c.get(b).unwrap().node().unwrap().parent(), Some(a));
    }

    #[test]
    fn attach_moves_between_parents() {
        let mut c = arena();
        let root = c.add(SceneComponent);
        let a = c.add(SceneComponent);
        let b = c.add(SceneComponent);

        c.attach(b, a).unwrap();
        assert_eq!(c.get(root).unwrap().node().unwrap().children(), &[a]);
        assert_eq!(c.get(a).unwrap().node().unwrap().children(), &[b]);
    }

    #[test]
    fn detach_falls_back_to_root() {
        let mut c = arena();
        let root = c.add(SceneComponent);
        let a = c.add(SceneComponent);
        let b = c.add(SceneComponent);
        c.attach(b, a).unwrap();

        c.detach(b).unwrap();
        assert_eq!(c.get(b).unwrap().node().unwrap().parent(), Some(root));
        assert!(c.get(a).unwrap().node().unwrap().children().is_empty());

        c.detach(root).unwrap();
        assert_eq!(c.get(root).unwrap().node().unwrap().parent(), None);
    }

    #[test]
    fn world_transform_composes_parent_chain() {
        let mut c = arena();
        let root = c.add(SceneComponent);
        let arm = c.add(SceneComponent);
        let hand = c.add(SceneComponent);
        c.attach(hand, arm).unwrap();

        *c.get_mut(root).unwrap().transform_mut().unwrap() = Transform::from_xyz(10.0, 0.0, 0.0);
        *c.get_mut(arm).unwrap().transform_mut().unwrap() =
            Transform::from_xyz(0.0, 1.0, 0.0).with_rotation(Vec3::new(0.0, 0.0, 90.0));
        *c.get_mut(hand).unwrap().transform_mut().unwrap() = Transform::from_xyz(1.0, 0.0, 0.0);

        let world = c.world_transform(hand).unwrap();
        let origin = world.transform_point3(Vec3::ZERO);
        // Hand's +X offset is rotated onto +Y by the arm.
        assert!(approx(origin, Vec3::new(10.0, 2.0, 0.0)), "{origin:?}");

        // Moving an ancestor is reflected on the next query.
        c.get_mut(root).unwrap().transform_mut().unwrap().position.x = 0.0;
        let origin = c.world_transform(hand).unwrap().transform_point3(Vec3::ZERO);
        assert!(approx(origin, Vec3::new(0.0, 2.0, 0.0)), "{origin:?}");
    }

    #[test]
    fn removing_a_parent_reparents_children_to_root() {
        let mut c = arena();
        let root = c.add(SceneComponent);
        let a = c.add(SceneComponent);
        let b = c.add(SceneComponent);
        c.attach(b, a).unwrap();

        assert!(c.remove(a).is_some());
        assert!(c.get(a).is_none());
        assert_eq!(c.get(b).unwrap().node().unwrap().parent(), Some(root));
        assert_eq!(c.get(root).unwrap().node().unwrap().children(), &[b]);
        assert!(c.remove(a).is_none());
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn removing_the_roots_parent_leaves_root_parentless() {
        let mut c = arena();
        let first = c.add(SceneComponent);
        let x = c.add(SceneComponent);
        c.remove(first);
        assert_eq!(c.root(), None);

        let root = c.add(SceneComponent);
        assert_eq!(c.root(), Some(root));
        c.attach(root, x).unwrap();

        c.remove(x);
        let node = c.get(root).unwrap().node().unwrap();
        assert_eq!(node.parent(), None);
        assert!(node.children().is_empty());
        assert_eq!(c.world_transform(root), Some(Mat4::IDENTITY));
    }

    #[test]
    fn set_root_keeps_old_root_in_tree() {
        let mut c = arena();
        let old = c.add(SceneComponent);
        let new = c.add(SceneComponent);

        c.set_root(new).unwrap();
        assert_eq!(c.root(), Some(new));
        assert_eq!(c.get(new).unwrap().node().unwrap().parent(), None);
        assert_eq!(c.get(old).unwrap().node().unwrap().parent(), Some(new));
    }

    #[test]
    fn records_rebuild_hierarchy_with_fresh_ids() {
        let mut c = arena();
        let root = c.add(SceneComponent);
        let a = c.add(SceneComponent);
        let b = c.add(ModelComponent::new("Models/crate.obj"));
        c.attach(b, a).unwrap();
        c.get_mut(b).unwrap().transform_mut().unwrap().position = Vec3::new(0.0, 3.0, 0.0);

        let records = c.to_records();
        assert_eq!(records[2].parent_id, c.get(a).unwrap().object_id().raw());
        let root_id = c.get(root).unwrap().object_id().raw();

        let registry = TypeRegistry::with_builtins();
        let mut resources = ResourceManager::new();
        let rebuilt =
            Components::from_records(ActorId::from_raw(1), &records, root_id, &registry, &mut resources).unwrap();

        let keys: Vec<_> = rebuilt.iter().map(|(k, _)| k).collect();
        assert_eq!(rebuilt.root(), Some(keys[0]));
        assert_eq!(rebuilt.get(keys[2]).unwrap().node().unwrap().parent(), Some(keys[1]));
        assert_ne!(rebuilt.get(keys[0]).unwrap().object_id(), c.get(root).unwrap().object_id());

        let model = rebuilt.get_as::<ModelComponent>(keys[2]).unwrap();
        assert_eq!(model.model_path(), "Models/crate.obj");
        assert!(model.model().is_some());
        assert!(resources.has("Models/crate.obj"));
        assert_eq!(rebuilt.get(keys[2]).unwrap().transform().unwrap().position.y, 3.0);
    }

    #[test]
    fn unknown_component_type_fails_rebuild() {
        let records = vec![ComponentRecord {
            type_name: "Mystery".into(),
            id: 4,
            parent_id: 0,
            transform: None,
            properties: Map::new(),
        }];
        let registry = TypeRegistry::with_builtins();
        let result = Components::from_records(
            ActorId::from_raw(1),
            &records,
            0,
            &registry,
            &mut ResourceManager::new(),
        );
        assert!(matches!(result, Err(SerializeError::UnknownType(t)) if t == "Mystery"));
    }
}
