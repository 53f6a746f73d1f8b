//! Component traits
//!
//! Components are behaviour units attached to exactly one entity. Lookups
//! never rely on the concrete Rust type alone: every component reports an
//! explicit [`ComponentKind`] tag, and typed access first matches the tag
//! before downcasting.

use super::{EntityId, FrameContext};
use crate::scene::{NodeId, SceneGraph};
use crate::SceneResult;
use std::any::Any;
use std::fmt;

/// Explicit tag naming a component capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(&'static str);

impl ComponentKind {
    /// Create a kind tag
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Tag name
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Type-erasure helpers, implemented for every `'static` type
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Convert a boxed value into a boxed `Any`
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Behaviour attached to an entity and run once per frame
pub trait Component: AsAny {
    /// Capability tag used by kind-based lookups
    fn kind(&self) -> ComponentKind;

    /// Per-frame update
    ///
    /// Errors abort the owning entity's update for the frame and propagate
    /// out of `EntityManager::update`.
    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        let _ = ctx;
        Ok(())
    }
}

/// A component that can be constructed in place by `Entity::add_component`
pub trait ComponentType: Component + Sized {
    /// Tag shared by every instance of this type
    const KIND: ComponentKind;

    /// Construction arguments
    type Args;

    /// Build the component bound to the entity described by `attachment`
    fn create(attachment: &mut Attachment<'_>, args: Self::Args) -> SceneResult<Self>;
}

/// Binding information handed to [`ComponentType::create`]
pub struct Attachment<'a> {
    pub(crate) owner: EntityId,
    pub(crate) owner_name: &'a str,
    pub(crate) node: NodeId,
    pub(crate) scene: &'a mut dyn SceneGraph,
}

impl Attachment<'_> {
    /// Entity the component is being attached to
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Name of the owning entity
    pub fn owner_name(&self) -> &str {
        self.owner_name
    }

    /// Scene node owned by the entity
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Scene graph the entity lives in
    pub fn scene(&self) -> &dyn SceneGraph {
        &*self.scene
    }

    /// Mutable scene graph access, e.g. to attach extra nodes under [`Attachment::node`]
    pub fn scene_mut(&mut self) -> &mut dyn SceneGraph {
        &mut *self.scene
    }
}

/// Typed view of `component` if its kind tag and concrete type are `C`
pub(crate) fn downcast_ref<C: ComponentType>(component: &dyn Component) -> Option<&C> {
    if component.kind() != C::KIND {
        return None;
    }
    component.as_any().downcast_ref::<C>()
}

/// Mutable counterpart of [`downcast_ref`]
pub(crate) fn downcast_mut<C: ComponentType>(component: &mut dyn Component) -> Option<&mut C> {
    if component.kind() != C::KIND {
        return None;
    }
    component.as_any_mut().downcast_mut::<C>()
}
