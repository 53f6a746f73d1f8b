//! # Scene Objects
//!
//! A small scene-object layer for 3D games: named objects attached to a scene
//! graph, each carrying an ordered list of behaviour components that run once
//! per frame.
//!
//! ## Features
//!
//! - **Deferred mutation**: objects may be created or removed from inside a
//!   frame update without disturbing the pass in progress
//! - **Kind-tagged components**: lookups match explicit component kinds
//! - **Skinned animation**: clip switching on a pluggable animation mixer
//! - **Explicit frame time**: elapsed time is threaded through every update
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_objects::prelude::*;
//!
//! struct Spin;
//!
//! impl Component for Spin {
//!     fn kind(&self) -> ComponentKind {
//!         Self::KIND
//!     }
//!
//!     fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
//!         let node = ctx.owner_node();
//!         let dt = ctx.frame().delta_time;
//!         if let Some(transform) = ctx.scene_mut().transform_mut(node) {
//!             transform.position.y += dt;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl ComponentType for Spin {
//!     const KIND: ComponentKind = ComponentKind::new("spin");
//!     type Args = ();
//!
//!     fn create(_attachment: &mut Attachment<'_>, _args: ()) -> SceneResult<Self> {
//!         Ok(Spin)
//!     }
//! }
//!
//! fn main() -> SceneResult<()> {
//!     let mut manager = EntityManager::new(NodeTree::new());
//!     let root = manager.scene().root();
//!     let id = manager.create_entity(root, "spinner")?.id();
//!     manager.add_component::<Spin>(id, ())?;
//!
//!     let mut clock = FrameClock::new();
//!     manager.update(clock.advance(1.0 / 60.0))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod ecs;
pub mod animation;

mod error;

pub use error::{SceneError, SceneResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        SceneError, SceneResult,
        foundation::{
            collections::DeferredCollection,
            math::{Vec3, Quat, Transform},
            time::{FrameClock, FrameTime},
        },
        scene::{SceneGraph, NodeTree, NodeId},
        ecs::{
            Entity, EntityId, EntityManager, FrameContext, UpdateStats,
            Component, ComponentType, ComponentKind, Attachment,
        },
        animation::{AnimationClip, AnimationMixer, ClipMixer, LoopMode, SkinnedModel, SkinInstance, ActionId},
        config::{Config, ConfigError, ManagerConfig},
    };
}
