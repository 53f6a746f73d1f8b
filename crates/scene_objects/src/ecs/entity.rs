//! Entity implementation
//!
//! An entity is a named scene participant: it owns one scene node, created
//! and attached exactly once when the entity is created, plus an ordered list
//! of components. Insertion order is the update order.

use super::component::{downcast_mut, downcast_ref, AsAny};
use super::manager::SceneAccess;
use super::{Attachment, Component, ComponentKind, ComponentType, FrameContext};
use crate::foundation::time::FrameTime;
use crate::scene::{NodeId, SceneGraph};
use crate::{SceneError, SceneResult};

slotmap::new_key_type! {
    /// Generation-checked entity handle
    pub struct EntityId;
}

/// Named scene object holding behaviour components
pub struct Entity {
    id: EntityId,
    name: String,
    node: NodeId,
    components: Vec<Box<dyn Component>>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: &str, node: NodeId) -> Self {
        Self {
            id,
            name: name.to_owned(),
            node,
            components: Vec::new(),
        }
    }

    /// Get the entity handle
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Get the entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scene node owned by this entity
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Construct a component of type `C` bound to this entity and append it
    ///
    /// Several components of the same kind may coexist.
    pub fn add_component<C: ComponentType>(
        &mut self,
        scene: &mut dyn SceneGraph,
        args: C::Args,
    ) -> SceneResult<&mut C> {
        let mut attachment = Attachment {
            owner: self.id,
            owner_name: &self.name,
            node: self.node,
            scene,
        };
        let component = C::create(&mut attachment, args)?;
        log::trace!("Attached '{}' to entity '{}'", C::KIND, self.name);
        self.insert_component(component)
    }

    /// Append an already-built component
    pub fn insert_component<C: Component>(&mut self, component: C) -> SceneResult<&mut C> {
        let kind = component.kind();
        self.components.push(Box::new(component));
        let name = &self.name;
        self.components
            .last_mut()
            .and_then(|component| (**component).as_any_mut().downcast_mut::<C>())
            .ok_or_else(|| SceneError::Component {
                entity: name.clone(),
                kind,
                message: "component could not be borrowed back after insertion".into(),
            })
    }

    /// First component whose kind tag is `kind`
    pub fn get_component(&self, kind: ComponentKind) -> Option<&dyn Component> {
        self.components
            .iter()
            .map(|component| &**component)
            .find(|component| component.kind() == kind)
    }

    /// Mutable counterpart of [`Entity::get_component`]
    pub fn get_component_mut(&mut self, kind: ComponentKind) -> Option<&mut dyn Component> {
        self.components
            .iter_mut()
            .map(|component| &mut **component)
            .find(|component| component.kind() == kind)
    }

    /// First component of type `C`
    pub fn component<C: ComponentType>(&self) -> Option<&C> {
        self.components
            .iter()
            .find_map(|component| downcast_ref::<C>(&**component))
    }

    /// First component of type `C`, mutably
    pub fn component_mut<C: ComponentType>(&mut self) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find_map(|component| downcast_mut::<C>(&mut **component))
    }

    /// Whether any component has the kind tag `kind`
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.get_component(kind).is_some()
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Components in update order
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|component| &**component)
    }

    /// Remove the component at `index` immediately
    pub fn remove_component_at(&mut self, index: usize) -> Option<Box<dyn Component>> {
        (index < self.components.len()).then(|| self.components.remove(index))
    }

    /// Remove the first component tagged `kind` immediately
    pub fn remove_component_kind(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        let index = self
            .components
            .iter()
            .position(|component| component.kind() == kind)?;
        Some(self.components.remove(index))
    }

    /// Remove the first component of type `C` immediately
    pub fn remove_component<C: ComponentType>(&mut self) -> Option<Box<C>> {
        let index = self
            .components
            .iter()
            .position(|component| downcast_ref::<C>(&**component).is_some())?;
        self.components.remove(index).into_any().downcast::<C>().ok()
    }

    /// Run every component's update in order
    ///
    /// Driven by `EntityManager::update` while this entity is checked out of
    /// storage. The first failure aborts the remaining components.
    pub(crate) fn update(&mut self, frame: FrameTime, mut access: SceneAccess<'_>) -> SceneResult<()> {
        for index in 0..self.components.len() {
            let (before, rest) = self.components.split_at_mut(index);
            let Some((current, after)) = rest.split_first_mut() else {
                break;
            };

            let mut ctx = FrameContext {
                frame,
                owner: self.id,
                owner_name: &self.name,
                owner_node: self.node,
                access: access.reborrow(),
                before,
                after,
            };

            if let Err(error) = current.update(&mut ctx) {
                log::error!(
                    "Component '{}' on entity '{}' failed: {}",
                    current.kind(),
                    self.name,
                    error
                );
                return Err(error);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("node", &self.node)
            .field("components", &self.components.iter().map(|c| c.kind()).collect::<Vec<_>>())
            .finish()
    }
}
