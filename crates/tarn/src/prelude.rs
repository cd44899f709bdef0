//! Convenience re-exports: `use tarn::prelude::*;`

pub use crate::actor::{Actor, ActorId, ActorKind, CullMode, DrawPass, EmptyActor, ModelActor, RenderConfig};
pub use crate::component::{Component, ComponentKey, ComponentSlot, Components, ModelComponent, SceneComponent};
pub use crate::engine::{Engine, EngineConfig};
pub use crate::error::{HierarchyError, ResourceError, SceneError, SerializeError};
pub use crate::math::{Mat4, Quat, Transform, Vec3};
pub use crate::object::{AsAny, CoreObject, ObjectId};
pub use crate::registry::TypeRegistry;
pub use crate::resource::{ModelResource, ResourceManager};
pub use crate::scene::file::SCENE_EXTENSION;
pub use crate::scene::{Renderable, Scene};
pub use crate::scene_manager::{SceneManager, SceneMeta};
pub use crate::time::Time;
