//! # Object Identity
//!
//! Every engine object (actors, attached components, cached resources) carries
//! an [`ObjectId`] handed out by a single process-wide counter.
//!
//! ```text
//! ObjectId::next()  →  1, 2, 3, ...   (never recycled, even after drop)
//! ```
//!
//! Unlike [`ActorId`](crate::actor::ActorId), which is scoped to one scene and
//! persisted in scene files, an `ObjectId` only means something for the
//! lifetime of the current process. It is what the resource cache indexes by
//! and what component hierarchy links are written as.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::SerializeError;

/// Next id to hand out. Zero is reserved for "no object" in scene files.
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an engine object.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The sentinel written to scene files for a missing reference.
    pub const NONE: Self = Self(0);

    /// Allocate a fresh id. Ids are strictly increasing in allocation order.
    pub fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw value read from a file. Does not reserve the id.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Upcast helper so trait objects can be downcast to their concrete type.
///
/// Blanket-implemented for every `'static` type. When calling through a
/// `Box<dyn Trait>`, deref to the trait object first, otherwise the box itself
/// is what gets upcast.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The identity and serialization contract shared by all engine objects.
pub trait CoreObject: AsAny {
    /// The id assigned when this object was constructed.
    fn object_id(&self) -> ObjectId;

    /// Static type tag of the concrete type, as written to scene files.
    fn type_name(&self) -> &'static str;

    /// Write this object's persistent state.
    fn serialize(&self) -> serde_json::Value;

    /// Restore persistent state previously produced by [`serialize`](Self::serialize).
    fn deserialize(&mut self, data: &serde_json::Value) -> Result<(), SerializeError>;
}

/// Convert plain data (string keys, no custom serializers) to JSON.
pub(crate) fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        log::error!("Failed to convert to JSON: {err}");
        serde_json::Value::Null
    })
}
