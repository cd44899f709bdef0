//! # Tarn: Runtime Object Model
//!
//! The scene graph, component-attachment model, actor registry and keyed
//! resource cache shared by the game loop and the editor.
//!
//! Start with `use tarn::prelude::*` and build an [`Engine`](engine::Engine),
//! or drive a [`SceneManager`](scene_manager::SceneManager) directly.
//!
//! Rendering, windowing, mesh import, and editor panels live outside this
//! crate. They read actors, components, and transforms through the plain-data
//! views exposed here and never take ownership of them.

pub mod actor;
pub mod component;
pub mod engine;
pub mod error;
pub mod math;
pub mod object;
pub mod prelude;
pub mod registry;
pub mod resource;
pub mod scene;
pub mod scene_manager;
pub mod time;
