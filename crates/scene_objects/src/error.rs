//! Scene-level errors
//!
//! Every failure here is a programmer or data error surfaced immediately;
//! nothing in this layer is retried.

use crate::ecs::{ComponentKind, EntityId};
use crate::scene::NodeId;
use thiserror::Error;

/// Errors raised by scene objects, the scene graph and animation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Clip name missing from a skinned model's clip table
    #[error("Unknown animation: {name}")]
    UnknownAnimation {
        /// Requested clip name
        name: String,
    },

    /// Entity handle is stale or was never issued by this manager
    #[error("Unknown entity: {0:?}")]
    UnknownEntity(EntityId),

    /// Node handle is stale or belongs to another scene graph
    #[error("Unknown scene node: {0:?}")]
    UnknownNode(NodeId),

    /// Attaching would create a cycle or reparent the root
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// A component reported a failure during construction or update
    #[error("Component '{kind}' on '{entity}' failed: {message}")]
    Component {
        /// Owning entity name
        entity: String,
        /// Kind of the failing component
        kind: ComponentKind,
        /// Failure description
        message: String,
    },
}

/// Result alias used throughout the crate
pub type SceneResult<T> = Result<T, SceneError>;
