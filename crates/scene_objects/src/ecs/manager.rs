//! # Entity Manager
//!
//! Owns every entity and drives the single per-frame update pass. Entity
//! membership lives in a [`DeferredCollection`], so components may create or
//! remove entities from inside the pass:
//!
//! - entities created during a pass are first updated on the next pass
//! - entities removed during a pass are skipped for the rest of it and
//!   dropped, together with their scene nodes, when the pass ends
//!
//! ```text
//! EntityManager::update(frame)
//!   └─ DeferredCollection::try_for_each
//!        └─ Entity::update
//!             └─ Component::update(&mut FrameContext)
//! ```

use super::component::{downcast_mut, downcast_ref};
use super::{Component, ComponentKind, ComponentType, Entity, EntityId};
use crate::config::ManagerConfig;
use crate::foundation::collections::DeferredCollection;
use crate::foundation::time::{FrameTime, Stopwatch};
use crate::scene::{NodeId, SceneGraph};
use crate::{SceneError, SceneResult};
use slotmap::SlotMap;
use std::collections::HashSet;
use std::time::Duration;

/// Entity storage; a slot is `None` while its entity is being updated
pub(crate) type EntitySlots = SlotMap<EntityId, Option<Entity>>;

/// Statistics for the most recent update pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateStats {
    /// Frame number of the pass
    pub frame: u64,

    /// Live entities after the pass
    pub entity_count: usize,

    /// Entities whose update ran
    pub visited: usize,

    /// Entities dropped at the end of the pass
    pub evicted: usize,

    /// Creations queued for the next pass
    pub pending_adds: usize,

    /// Time spent in the pass
    pub update_time: Duration,
}

/// Borrowed view of the manager's structural state
///
/// Shared by [`EntityManager`] and [`FrameContext`] so both create and remove
/// entities the same way.
pub(crate) struct SceneAccess<'a> {
    pub(crate) slots: &'a mut EntitySlots,
    pub(crate) live: &'a mut DeferredCollection<EntityId>,
    pub(crate) scene: &'a mut dyn SceneGraph,
}

impl SceneAccess<'_> {
    pub(crate) fn reborrow(&mut self) -> SceneAccess<'_> {
        SceneAccess {
            slots: &mut *self.slots,
            live: &mut *self.live,
            scene: &mut *self.scene,
        }
    }

    fn create_entity(&mut self, parent: NodeId, name: &str) -> SceneResult<&mut Entity> {
        if !self.scene.contains(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let node = self.scene.create_node(name);
        if let Err(error) = self.scene.add_child(parent, node) {
            // Keep the scene clean when attachment is rejected
            let _ = self.scene.remove_node(node);
            return Err(error);
        }

        let id = self.slots.insert_with_key(|id| Some(Entity::new(id, name, node)));
        self.live.add(id);
        log::debug!("Created entity '{}' ({:?})", name, id);

        self.slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(SceneError::UnknownEntity(id))
    }

    fn remove_entity(&mut self, id: EntityId) {
        if self.slots.contains_key(id) {
            log::trace!("Queued removal of entity {:?}", id);
            self.live.remove(id);
        } else {
            log::warn!("Ignoring removal of unknown entity {:?}", id);
        }
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    fn add_component<C: ComponentType>(&mut self, id: EntityId, args: C::Args) -> SceneResult<&mut C> {
        let entity = self
            .slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(SceneError::UnknownEntity(id))?;
        entity.add_component::<C>(&mut *self.scene, args)
    }

    /// Drop storage and scene nodes of entities flushed out of `live`
    ///
    /// Removing a node removes its whole subtree, so entities whose nodes
    /// hang below an evicted entity are evicted with it.
    fn evict(&mut self) -> usize {
        let mut count = 0;
        loop {
            let evicted: Vec<EntityId> = self.live.drain_evicted().collect();
            if evicted.is_empty() {
                return count;
            }

            for id in evicted {
                let Some(slot) = self.slots.remove(id) else {
                    continue;
                };
                count += 1;
                let Some(entity) = slot else {
                    continue;
                };

                for nested in self.entities_below(entity.node()) {
                    log::debug!("Removing {:?} along with parent entity '{}'", nested, entity.name());
                    self.live.remove(nested);
                }

                // Already gone when an ancestor entity was evicted first
                if self.scene.contains(entity.node()) {
                    if let Err(error) = self.scene.remove_node(entity.node()) {
                        log::warn!("Failed to remove scene node of '{}': {}", entity.name(), error);
                    }
                }
                log::debug!("Removed entity '{}' ({:?})", entity.name(), id);
            }
            self.live.apply_removals();
        }
    }

    /// Stored entities whose node lies strictly below `node`
    fn entities_below(&self, node: NodeId) -> Vec<EntityId> {
        let mut subtree = HashSet::new();
        let mut stack: Vec<NodeId> = self.scene.children(node).to_vec();
        while let Some(current) = stack.pop() {
            if subtree.insert(current) {
                stack.extend_from_slice(self.scene.children(current));
            }
        }
        if subtree.is_empty() {
            return Vec::new();
        }

        self.slots
            .iter()
            .filter_map(|(id, slot)| slot.as_ref().map(|entity| (id, entity.node())))
            .filter(|(_, entity_node)| subtree.contains(entity_node))
            .map(|(id, _)| id)
            .collect()
    }
}

/// Per-component view handed to [`Component::update`]
///
/// Gives access to the frame time, the owning entity, its sibling
/// components, other entities, and the scene graph. The owning entity is
/// checked out of storage for the duration of its update, so
/// [`FrameContext::entity`] returns `None` for [`FrameContext::owner`]; use
/// the sibling accessors instead.
pub struct FrameContext<'a> {
    pub(crate) frame: FrameTime,
    pub(crate) owner: EntityId,
    pub(crate) owner_name: &'a str,
    pub(crate) owner_node: NodeId,
    pub(crate) access: SceneAccess<'a>,
    pub(crate) before: &'a mut [Box<dyn Component>],
    pub(crate) after: &'a mut [Box<dyn Component>],
}

impl FrameContext<'_> {
    /// Time values for the current frame
    pub fn frame(&self) -> FrameTime {
        self.frame
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.frame.delta_time
    }

    /// Entity owning the component being updated
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Name of the owning entity
    pub fn owner_name(&self) -> &str {
        self.owner_name
    }

    /// Scene node of the owning entity
    pub fn owner_node(&self) -> NodeId {
        self.owner_node
    }

    /// First sibling component tagged `kind`, in update order
    pub fn sibling(&self, kind: ComponentKind) -> Option<&dyn Component> {
        self.before
            .iter()
            .chain(self.after.iter())
            .map(|component| &**component)
            .find(|component| component.kind() == kind)
    }

    /// First sibling component of type `C`
    pub fn sibling_component<C: ComponentType>(&self) -> Option<&C> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find_map(|component| downcast_ref::<C>(&**component))
    }

    /// First sibling component of type `C`, mutably
    pub fn sibling_component_mut<C: ComponentType>(&mut self) -> Option<&mut C> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find_map(|component| downcast_mut::<C>(&mut **component))
    }

    /// Create an entity under `parent`; it joins the update from the next pass
    pub fn create_entity(&mut self, parent: NodeId, name: &str) -> SceneResult<&mut Entity> {
        self.access.create_entity(parent, name)
    }

    /// Queue removal of `id`; it is skipped for the rest of this pass
    ///
    /// Removing [`FrameContext::owner`] is allowed: the remaining components
    /// of the owner still run this frame.
    pub fn remove_entity(&mut self, id: EntityId) {
        self.access.remove_entity(id);
    }

    /// Whether `id` has a removal request outstanding
    pub fn is_removal_pending(&self, id: EntityId) -> bool {
        self.access.live.is_pending_removal(&id)
    }

    /// Look up another entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.access.entity(id)
    }

    /// Look up another entity mutably
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.access.entity_mut(id)
    }

    /// Construct a component on another entity
    pub fn add_component<C: ComponentType>(&mut self, id: EntityId, args: C::Args) -> SceneResult<&mut C> {
        self.access.add_component::<C>(id, args)
    }

    /// Scene graph
    pub fn scene(&self) -> &dyn SceneGraph {
        &*self.access.scene
    }

    /// Scene graph, mutably
    pub fn scene_mut(&mut self) -> &mut dyn SceneGraph {
        &mut *self.access.scene
    }
}

/// Owner of all entities; drives the per-frame update
pub struct EntityManager {
    slots: EntitySlots,
    live: DeferredCollection<EntityId>,
    scene: Box<dyn SceneGraph>,
    config: ManagerConfig,
    stats: UpdateStats,
}

impl EntityManager {
    /// Create a manager over `scene` with default configuration
    pub fn new(scene: impl SceneGraph + 'static) -> Self {
        Self::with_config(scene, ManagerConfig::default())
    }

    /// Create a manager with custom configuration
    pub fn with_config(scene: impl SceneGraph + 'static, config: ManagerConfig) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(config.initial_capacity),
            live: DeferredCollection::with_capacity(config.initial_capacity),
            scene: Box::new(scene),
            config,
            stats: UpdateStats::default(),
        }
    }

    fn access(&mut self) -> SceneAccess<'_> {
        SceneAccess {
            slots: &mut self.slots,
            live: &mut self.live,
            scene: &mut *self.scene,
        }
    }

    /// Create an entity whose node is attached under `parent`
    ///
    /// The entity is queued and first updated on the next [`EntityManager::update`].
    pub fn create_entity(&mut self, parent: NodeId, name: &str) -> SceneResult<&mut Entity> {
        let id = self.access().create_entity(parent, name)?.id();
        self.entity_mut(id).ok_or(SceneError::UnknownEntity(id))
    }

    /// Queue removal of `id`, applied at the next flush boundary
    pub fn remove_entity(&mut self, id: EntityId) {
        self.access().remove_entity(id);
    }

    /// Construct a component on entity `id`
    pub fn add_component<C: ComponentType>(&mut self, id: EntityId, args: C::Args) -> SceneResult<&mut C> {
        let entity = self
            .slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(SceneError::UnknownEntity(id))?;
        entity.add_component::<C>(&mut *self.scene, args)
    }

    /// Run one update pass
    ///
    /// Queued creations and removals are applied first, then every live
    /// entity updates in creation order. The first component error stops the
    /// pass and is returned after removals requested so far are applied.
    pub fn update(&mut self, frame: FrameTime) -> SceneResult<()> {
        let stopwatch = Stopwatch::start_new();
        let mut visited = 0;

        // Removals requested between passes take nested entities along before anything updates
        self.live.apply_removals();
        let mut evicted = self.access().evict();

        let slots = &mut self.slots;
        let scene = &mut *self.scene;
        let result = self.live.try_for_each(|id, live| {
            let Some(mut entity) = slots.get_mut(id).and_then(Option::take) else {
                return Ok(());
            };
            visited += 1;

            let access = SceneAccess {
                slots: &mut *slots,
                live,
                scene: &mut *scene,
            };
            let result = entity.update(frame, access);

            if let Some(slot) = slots.get_mut(id) {
                *slot = Some(entity);
            }
            result
        });

        evicted += self.access().evict();

        self.stats = UpdateStats {
            frame: frame.frame,
            entity_count: self.live.len(),
            visited,
            evicted,
            pending_adds: self.live.pending_adds(),
            update_time: stopwatch.elapsed(),
        };
        log::trace!("Frame {} stats: {:?}", frame.frame, self.stats);
        if let Some(interval) = self.config.stats_log_interval {
            if interval > 0 && frame.frame % interval == 0 {
                log::info!(
                    "Frame {}: {} entities, {} updated, {} removed, {:.3} ms",
                    frame.frame,
                    self.stats.entity_count,
                    visited,
                    evicted,
                    self.stats.update_time.as_secs_f64() * 1000.0
                );
            }
        }

        result
    }

    /// Apply queued creations and removals without updating anything
    pub fn flush(&mut self) -> usize {
        self.live.flush();
        self.access().evict()
    }

    /// Look up an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// Look up an entity mutably
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    /// First entity named `name`, in creation order
    ///
    /// Live entities are searched first, then queued creations.
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.live
            .iter()
            .chain(self.live.queued())
            .filter_map(|id| self.entity(*id))
            .find(|entity| entity.name() == name)
    }

    /// Live entity ids in update order (queued creations excluded)
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.live.iter().copied()
    }

    /// Whether `id` refers to a stored entity, live or queued
    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains_key(id)
    }

    /// Number of stored entities, live or queued
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no entity is live or queued
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Scene graph
    pub fn scene(&self) -> &dyn SceneGraph {
        &*self.scene
    }

    /// Scene graph, mutably
    pub fn scene_mut(&mut self) -> &mut dyn SceneGraph {
        &mut *self.scene
    }

    /// Statistics from the last update pass
    pub fn stats(&self) -> &UpdateStats {
        &self.stats
    }

    /// Manager configuration
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}
