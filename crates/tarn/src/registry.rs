//! # Type Registry
//!
//! Maps the type tags written to scene files to factories for component and
//! actor kinds. Scene loading looks every `"type"` field up here, so the set
//! of loadable types is exactly what has been registered.
//!
//! ```ignore
//! let mut registry = TypeRegistry::with_builtins();
//! registry.register_component::<Spinner>();
//! registry.register_actor::<Lamp>();
//!
//! let names = registry.component_names(); // for an "Add Component" dropdown
//! ```

use std::any::TypeId;
use std::collections::HashMap;

use crate::actor::{ActorKind, EmptyActor, ModelActor};
use crate::component::{Component, ModelComponent, SceneComponent};

// ── Descriptors ──────────────────────────────────────────────────────────

type ComponentFactory = fn() -> Box<dyn Component>;
type ActorFactory = fn() -> Box<dyn ActorKind>;

/// What the registry knows about one registered type.
#[derive(Clone, Copy)]
pub struct TypeDescriptor<F> {
    pub type_name: &'static str,
    pub type_id: TypeId,
    factory: F,
}

pub type ComponentDescriptor = TypeDescriptor<ComponentFactory>;
pub type ActorDescriptor = TypeDescriptor<ActorFactory>;

// ── TypeRegistry ─────────────────────────────────────────────────────────

/// Type tag → descriptor tables for components and actor kinds.
pub struct TypeRegistry {
    components: HashMap<&'static str, ComponentDescriptor>,
    actors: HashMap<&'static str, ActorDescriptor>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
            actors: HashMap::new(),
        }
    }

    /// A registry with the engine's own component and actor kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_component::<SceneComponent>();
        registry.register_component::<ModelComponent>();
        registry.register_actor::<EmptyActor>();
        registry.register_actor::<ModelActor>();
        registry
    }

    /// Register a component type. Its tag is read from a default instance.
    ///
    /// Re-registering a tag replaces the previous descriptor.
    pub fn register_component<C: Component + Default>(&mut self) {
        let type_name = C::default().type_name();
        let descriptor = TypeDescriptor {
            type_name,
            type_id: TypeId::of::<C>(),
            factory: (|| Box::new(C::default()) as Box<dyn Component>) as ComponentFactory,
        };
        if self.components.insert(type_name, descriptor).is_some() {
            log::warn!("Component type `{type_name}` registered twice; keeping the latest");
        }
    }

    /// Register an actor kind. Its tag is read from a default instance.
    pub fn register_actor<K: ActorKind + Default>(&mut self) {
        let type_name = K::default().type_name();
        let descriptor = TypeDescriptor {
            type_name,
            type_id: TypeId::of::<K>(),
            factory: (|| Box::new(K::default()) as Box<dyn ActorKind>) as ActorFactory,
        };
        if self.actors.insert(type_name, descriptor).is_some() {
            log::warn!("Actor type `{type_name}` registered twice; keeping the latest");
        }
    }

    /// Construct a default component for a type tag.
    pub fn create_component(&self, type_name: &str) -> Option<Box<dyn Component>> {
        self.components.get(type_name).map(|d| (d.factory)())
    }

    /// Construct a default actor kind for a type tag.
    pub fn create_actor_kind(&self, type_name: &str) -> Option<Box<dyn ActorKind>> {
        self.actors.get(type_name).map(|d| (d.factory)())
    }

    pub fn component_descriptor(&self, type_name: &str) -> Option<&ComponentDescriptor> {
        self.components.get(type_name)
    }

    pub fn actor_descriptor(&self, type_name: &str) -> Option<&ActorDescriptor> {
        self.actors.get(type_name)
    }

    /// Registered component tags, sorted.
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.components.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Registered actor tags, sorted.
    pub fn actor_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.actors.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::AsAny;

    #[derive(Default)]
    struct Spinner;

    impl Component for Spinner {
        fn type_name(&self) -> &'static str {
            "Spinner"
        }
    }

    #[test]
    fn builtins_are_registered() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(registry.component_names(), vec!["ModelComponent", "SceneComponent"]);
        assert_eq!(registry.actor_names(), vec!["Actor", "ModelActor"]);
    }

    #[test]
    fn factory_builds_registered_type() {
        let mut registry = TypeRegistry::new();
        registry.register_component::<Spinner>();

        let built = registry.create_component("Spinner").unwrap();
        assert_eq!(built.type_name(), "Spinner");
        assert!((*built).as_any().is::<Spinner>());

        let descriptor = registry.component_descriptor("Spinner").unwrap();
        assert_eq!(descriptor.type_id, TypeId::of::<Spinner>());
    }

    #[derive(Default)]
    struct Lamp;

    impl ActorKind for Lamp {
        fn type_name(&self) -> &'static str {
            "Lamp"
        }
    }

    #[test]
    fn actor_factory_builds_registered_kind() {
        let mut registry = TypeRegistry::new();
        registry.register_actor::<Lamp>();
        registry.register_actor::<Lamp>();

        let kind = registry.create_actor_kind("Lamp").unwrap();
        assert_eq!(kind.type_name(), "Lamp");
        assert!((*kind).as_any().is::<Lamp>());
        assert_eq!(registry.actor_names(), vec!["Lamp"]);
        assert_eq!(registry.actor_descriptor("Lamp").unwrap().type_id, TypeId::of::<Lamp>());
    }

    #[test]
    fn unknown_tag_yields_none() {
        let registry = TypeRegistry::new();
        assert!(registry.create_component("Nope").is_none());
        assert!(registry.create_actor_kind("Nope").is_none());
    }
}
