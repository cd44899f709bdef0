//! Scene file wire format.
//!
//! ```json
//! {
//!   "name": "Lake",
//!   "next_actor_id": 4,
//!   "actor_count": 2,
//!   "actors": [
//!     {
//!       "id": 1, "vector_index": 0, "name": "A", "type": "Actor",
//!       "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
//!       "rotation": { "x": 0.0, "y": 0.0, "z": 0.0 },
//!       "scale":    { "x": 1.0, "y": 1.0, "z": 1.0 },
//!       "config": { "draw_outline": false, ... },
//!       "root_component": 17,
//!       "components": [ { "type": "SceneComponent", "id": 17, "transform": { ... } } ]
//!     }
//!   ],
//!   "meta": { "last_modified": "Sun Oct 18 12:00:00 2026" }
//! }
//! ```
//!
//! Only `id`, `name`, `position` and `rotation` are required per actor;
//! everything else falls back to defaults so hand-written files load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::actor::{ActorId, RenderConfig};
use crate::math::{Transform, Vec3Record};

/// Extension of scene files, without the dot.
pub const SCENE_EXTENSION: &str = "tscene";

/// A whole scene as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default = "unnamed")]
    pub name: String,
    #[serde(default = "first_actor_id")]
    pub next_actor_id: u64,
    #[serde(default)]
    pub actor_count: usize,
    #[serde(default)]
    pub actors: Vec<ActorRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SceneFileMeta>,
}

/// The `meta` block. Written on save, never read back into a [`Scene`](super::Scene).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFileMeta {
    #[serde(default)]
    pub last_modified: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumbnail: String,
}

/// Header fields only. `actors` is skipped without being materialized.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneHeader {
    #[serde(default = "unnamed")]
    pub name: String,
    #[serde(default)]
    pub actor_count: usize,
    #[serde(default)]
    pub meta: Option<SceneFileMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: ActorId,
    #[serde(default)]
    pub vector_index: usize,
    pub name: String,
    pub position: Vec3Record,
    pub rotation: Vec3Record,
    #[serde(default = "unit_scale")]
    pub scale: Vec3Record,
    #[serde(rename = "type", default = "default_actor_type")]
    pub type_name: String,
    #[serde(default)]
    pub config: RenderConfig,
    /// Saved object id of the root component, 0 when unknown.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub root_component: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentRecord>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

/// One attached component. `id` and `parent_id` are object ids from the
/// session that wrote the file and only link records to each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub parent_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

fn unnamed() -> String {
    "Unnamed".to_owned()
}

fn first_actor_id() -> u64 {
    1
}

fn default_actor_type() -> String {
    "Actor".to_owned()
}

fn unit_scale() -> Vec3Record {
    Vec3Record { x: 1.0, y: 1.0, z: 1.0 }
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}
