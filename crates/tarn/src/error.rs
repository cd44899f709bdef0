//! Error types.
//!
//! Each fallible layer has its own enum. Internal code propagates them with
//! `?`; the public scene-file operations convert them into `false`/`None` at
//! the boundary (after logging) so callers only check a sentinel, while the
//! `try_*` variants hand the cause back untouched.

use std::path::PathBuf;

use thiserror::Error;

use crate::actor::ActorId;

/// Failure while reading persistent object state.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The JSON did not match the expected shape.
    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A type tag was not found in the type registry.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// Two actors in one scene carry the same id.
    #[error("duplicate actor id {0}")]
    DuplicateActorId(ActorId),

    /// A hierarchy link in the file could not be rebuilt.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// A resource referenced by the data could not be obtained.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Failure of a scene-graph mutation on an actor's components.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// The key does not name a component of this actor.
    #[error("component not found")]
    NotFound,

    /// Only scene components take part in the transform hierarchy.
    #[error("`{0}` is not a scene component")]
    NotSceneComponent(&'static str),

    /// A component cannot be its own parent.
    #[error("a component cannot be attached to itself")]
    SelfAttachment,

    /// The requested parent is a descendant of the child.
    #[error("attaching would create a cycle")]
    Cycle,
}

/// Failure of a keyed resource cache operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    /// The key is cached under a different concrete type.
    #[error("resource `{key}` is a `{found}`, not a `{expected}`")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Failure of a scene or scene-file operation.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scene file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("scene file '{0}' already exists")]
    AlreadyExists(PathBuf),

    #[error("no active scene")]
    NoActiveScene,

    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    /// Scene data was valid JSON but could not be turned into actors.
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl SceneError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
