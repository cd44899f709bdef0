//! # Resource Cache
//!
//! Shared engine objects (models, textures, materials) loaded once per key
//! and handed out as reference-counted handles. Every cached object is
//! indexed both by its string key and by its [`ObjectId`]:
//!
//! ```text
//! by_key: "Models/crate.obj" ─┐
//!                             ├─► Entry { Rc<ModelResource> }
//! by_id:  #42 ────────────────┘
//! ```
//!
//! Loading a key that is already cached returns the cached instance without
//! calling the constructor again. Asking for it as a different type is an
//! error rather than a silent miss.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::error::{ResourceError, SerializeError};
use crate::object::{CoreObject, ObjectId};

/// The same allocation viewed as an engine object and as `Any`.
#[derive(Clone)]
struct Entry {
    object: Rc<dyn CoreObject>,
    any: Rc<dyn Any>,
}

impl Entry {
    fn new<T: CoreObject>(value: Rc<T>) -> Self {
        Self {
            object: value.clone(),
            any: value,
        }
    }

    fn downcast<T: CoreObject>(&self, key: &str) -> Result<Rc<T>, ResourceError> {
        self.any.clone().downcast::<T>().map_err(|_| ResourceError::TypeMismatch {
            key: key.to_owned(),
            expected: type_label::<T>(),
            found: self.object.type_name(),
        })
    }
}

/// Keyed cache of shared engine objects.
///
/// Single-threaded: handles are `Rc`, and the manager is owned by the
/// [`Engine`](crate::engine::Engine) context rather than a global.
#[derive(Default)]
pub struct ResourceManager {
    by_key: HashMap<String, Entry>,
    by_id: HashMap<ObjectId, Entry>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the object cached under `key`, constructing it with `create`
    /// on first use.
    pub fn load<T: CoreObject>(&mut self, key: &str, create: impl FnOnce() -> T) -> Result<Rc<T>, ResourceError> {
        if let Some(entry) = self.by_key.get(key) {
            return entry.downcast::<T>(key);
        }

        let value = Rc::new(create());
        let id = value.object_id();
        let entry = Entry::new(value.clone());
        self.by_id.insert(id, entry.clone());
        self.by_key.insert(key.to_owned(), entry);
        log::debug!("Loaded {} '{key}' as {id}", value.type_name());
        Ok(value)
    }

    pub fn get(&self, key: &str) -> Option<Rc<dyn CoreObject>> {
        self.by_key.get(key).map(|e| e.object.clone())
    }

    pub fn get_by_id(&self, id: ObjectId) -> Option<Rc<dyn CoreObject>> {
        self.by_id.get(&id).map(|e| e.object.clone())
    }

    /// Typed lookup. `None` if absent or cached as another type.
    pub fn get_as<T: CoreObject>(&self, key: &str) -> Option<Rc<T>> {
        self.by_key.get(key)?.downcast::<T>(key).ok()
    }

    pub fn has(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Drop the cache's handle. Outstanding `Rc`s keep the object alive.
    pub fn unload(&mut self, key: &str) -> bool {
        let Some(entry) = self.by_key.remove(key) else {
            return false;
        };
        self.by_id.remove(&entry.object.object_id());
        log::debug!("Unloaded '{key}'");
        true
    }

    pub fn unload_all(&mut self) {
        let count = self.by_key.len();
        self.by_key.clear();
        self.by_id.clear();
        if count > 0 {
            log::debug!("Unloaded {count} resources");
        }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Cached keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_key.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Last path segment of a non-generic type name.
fn type_label<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    match full.rfind("::") {
        Some(pos) if !full.contains('<') => &full[pos + 2..],
        _ => full,
    }
}

// ── Built-in resources ───────────────────────────────────────────────────

/// A model asset referenced by path. Mesh data is imported by the renderer.
#[derive(Debug)]
pub struct ModelResource {
    id: ObjectId,
    path: String,
}

impl ModelResource {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl CoreObject for ModelResource {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &'static str {
        "ModelResource"
    }

    fn serialize(&self) -> Value {
        json!({ "path": self.path })
    }

    fn deserialize(&mut self, data: &Value) -> Result<(), SerializeError> {
        self.path = data
            .get("path")
            .and_then(Value::as_str)
            .ok_or(SerializeError::MissingField("path"))?
            .to_owned();
        Ok(())
    }
}
