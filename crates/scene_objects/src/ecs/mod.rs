//! Entity-Component implementation
//!
//! Entities are named scene objects owning a scene node and an ordered list
//! of behaviour components. The [`EntityManager`] owns every entity and runs
//! one update pass per frame.

pub mod entity;
pub mod component;
pub mod manager;

pub use entity::{Entity, EntityId};
pub use component::{Component, ComponentType, ComponentKind, Attachment, AsAny};
pub use manager::{EntityManager, FrameContext, UpdateStats};

#[cfg(test)]
mod tests;
