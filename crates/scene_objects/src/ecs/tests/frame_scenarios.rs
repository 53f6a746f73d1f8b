//! Scenarios where components restructure the scene mid-frame
//!
//! Each entity gets a `Recorder` that appends its name to a shared visit log,
//! so a pass's visiting order can be checked after the fact.

use crate::ecs::{AsAny, Attachment, Component, ComponentKind, ComponentType, EntityId, EntityManager, FrameContext};
use crate::foundation::time::{FrameClock, FrameTime};
use crate::scene::{NodeId, NodeTree, SceneGraph};
use crate::{SceneError, SceneResult};
use std::cell::RefCell;
use std::rc::Rc;

type VisitLog = Rc<RefCell<Vec<String>>>;

struct Recorder {
    log: VisitLog,
}

impl Component for Recorder {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        self.log.borrow_mut().push(ctx.owner_name().to_owned());
        Ok(())
    }
}

impl ComponentType for Recorder {
    const KIND: ComponentKind = ComponentKind::new("recorder");
    type Args = VisitLog;

    fn create(_attachment: &mut Attachment<'_>, log: VisitLog) -> SceneResult<Self> {
        Ok(Self { log })
    }
}

/// Runs once: removes `victim` and spawns an entity named `spawn`
struct Saboteur {
    victim: EntityId,
    spawn: &'static str,
    parent: NodeId,
    log: VisitLog,
    done: bool,
}

impl Component for Saboteur {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        if self.done {
            return Ok(());
        }
        self.done = true;
        ctx.remove_entity(self.victim);
        let id = ctx.create_entity(self.parent, self.spawn)?.id();
        ctx.add_component::<Recorder>(id, Rc::clone(&self.log))?;
        Ok(())
    }
}

impl ComponentType for Saboteur {
    const KIND: ComponentKind = ComponentKind::new("saboteur");
    type Args = (EntityId, &'static str, VisitLog);

    fn create(attachment: &mut Attachment<'_>, (victim, spawn, log): Self::Args) -> SceneResult<Self> {
        let parent = attachment.scene().root();
        Ok(Self { victim, spawn, parent, log, done: false })
    }
}

/// Removes its own entity on the first update
struct SelfDestruct;

impl Component for SelfDestruct {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        let owner = ctx.owner();
        ctx.remove_entity(owner);
        Ok(())
    }
}

impl ComponentType for SelfDestruct {
    const KIND: ComponentKind = ComponentKind::new("self_destruct");
    type Args = ();

    fn create(_attachment: &mut Attachment<'_>, _args: ()) -> SceneResult<Self> {
        Ok(Self)
    }
}

/// Always fails
struct Faulty;

impl Component for Faulty {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        Err(SceneError::Component {
            entity: ctx.owner_name().to_owned(),
            kind: Self::KIND,
            message: "sensor offline".into(),
        })
    }
}

impl ComponentType for Faulty {
    const KIND: ComponentKind = ComponentKind::new("faulty");
    type Args = ();

    fn create(_attachment: &mut Attachment<'_>, _args: ()) -> SceneResult<Self> {
        Ok(Self)
    }
}

/// Counts frames and reads the sibling recorder's log length
struct Counter {
    ticks: u32,
    seen_log_len: usize,
}

impl Component for Counter {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        self.ticks += 1;
        self.seen_log_len = ctx
            .sibling_component::<Recorder>()
            .map_or(0, |recorder| recorder.log.borrow().len());
        Ok(())
    }
}

impl ComponentType for Counter {
    const KIND: ComponentKind = ComponentKind::new("counter");
    type Args = ();

    fn create(_attachment: &mut Attachment<'_>, _args: ()) -> SceneResult<Self> {
        Ok(Self { ticks: 0, seen_log_len: 0 })
    }
}

fn spawn(manager: &mut EntityManager, name: &str, log: &VisitLog) -> EntityId {
    let root = manager.scene().root();
    let id = manager.create_entity(root, name).unwrap().id();
    manager.add_component::<Recorder>(id, Rc::clone(log)).unwrap();
    id
}

fn take(log: &VisitLog) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

#[test]
fn test_remove_and_add_during_pass() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let mut clock = FrameClock::new();

    let a = spawn(&mut manager, "A", &log);
    let b = spawn(&mut manager, "B", &log);
    spawn(&mut manager, "C", &log);
    manager
        .add_component::<Saboteur>(a, (b, "D", Rc::clone(&log)))
        .unwrap();

    manager.update(clock.advance(0.016)).unwrap();
    assert_eq!(take(&log), vec!["A", "C"]);
    assert!(!manager.contains(b));
    assert_eq!(manager.stats().evicted, 1);
    assert_eq!(manager.stats().pending_adds, 1);

    manager.update(clock.advance(0.016)).unwrap();
    assert_eq!(take(&log), vec!["A", "C", "D"]);
}

#[test]
fn test_removed_entity_scene_node_is_dropped() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let a = spawn(&mut manager, "A", &log);
    let b = spawn(&mut manager, "B", &log);
    let b_node = manager.entity(b).unwrap().node();
    manager
        .add_component::<Saboteur>(a, (b, "D", Rc::clone(&log)))
        .unwrap();

    manager.update(FrameTime::new(0.1, 0.1, 1)).unwrap();
    assert!(!manager.scene().contains(b_node));
    // root, A, D
    assert_eq!(manager.scene().node_count(), 3);
}

#[test]
fn test_self_removal_finishes_own_components() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let root = manager.scene().root();
    let doomed = manager.create_entity(root, "doomed").unwrap().id();
    manager.add_component::<SelfDestruct>(doomed, ()).unwrap();
    manager.add_component::<Recorder>(doomed, Rc::clone(&log)).unwrap();
    spawn(&mut manager, "survivor", &log);

    manager.update(FrameTime::new(0.1, 0.1, 1)).unwrap();
    assert_eq!(take(&log), vec!["doomed", "survivor"]);
    assert!(manager.entity(doomed).is_none());

    manager.update(FrameTime::new(0.2, 0.1, 2)).unwrap();
    assert_eq!(take(&log), vec!["survivor"]);
}

#[test]
fn test_created_and_removed_before_update_never_runs() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let ghost = spawn(&mut manager, "ghost", &log);
    spawn(&mut manager, "real", &log);
    manager.remove_entity(ghost);

    manager.update(FrameTime::new(0.1, 0.1, 1)).unwrap();
    assert_eq!(take(&log), vec!["real"]);
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.scene().node_count(), 2);
}

#[test]
fn test_component_error_aborts_pass() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let root = manager.scene().root();
    spawn(&mut manager, "first", &log);
    let broken = manager.create_entity(root, "broken").unwrap().id();
    manager.add_component::<Faulty>(broken, ()).unwrap();
    manager.add_component::<Recorder>(broken, Rc::clone(&log)).unwrap();
    spawn(&mut manager, "last", &log);

    let result = manager.update(FrameTime::new(0.1, 0.1, 1));
    assert!(matches!(
        result,
        Err(SceneError::Component { ref entity, kind, .. }) if entity == "broken" && kind == Faulty::KIND
    ));
    assert_eq!(take(&log), vec!["first"]);

    // The failing entity is still stored with all of its components
    let entity = manager.entity(broken).unwrap();
    assert_eq!(entity.component_count(), 2);
    assert_eq!(manager.stats().visited, 2);
}

#[test]
fn test_update_order_and_sibling_access() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let id = spawn(&mut manager, "solo", &log);
    manager.add_component::<Counter>(id, ()).unwrap();

    manager.update(FrameTime::new(0.1, 0.1, 1)).unwrap();
    manager.update(FrameTime::new(0.2, 0.1, 2)).unwrap();

    let counter = manager.entity(id).unwrap().component::<Counter>().unwrap();
    assert_eq!(counter.ticks, 2);
    // Recorder runs before Counter, so it has already logged this frame
    assert_eq!(counter.seen_log_len, 2);
}

#[test]
fn test_owner_is_checked_out_during_update() {
    struct SelfLookup {
        saw_self: Option<bool>,
    }

    impl Component for SelfLookup {
        fn kind(&self) -> ComponentKind {
            ComponentKind::new("self_lookup")
        }

        fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
            let owner = ctx.owner();
            self.saw_self = Some(ctx.entity(owner).is_some());
            Ok(())
        }
    }

    let mut manager = EntityManager::new(NodeTree::new());
    let root = manager.scene().root();
    let entity = manager.create_entity(root, "looker").unwrap();
    entity.insert_component(SelfLookup { saw_self: None }).unwrap();
    let id = entity.id();

    manager.update(FrameTime::new(0.1, 0.1, 1)).unwrap();

    let entity = manager.entity(id).unwrap();
    let lookup = entity
        .components()
        .next()
        .and_then(|component| component.as_any().downcast_ref::<SelfLookup>())
        .unwrap();
    assert_eq!(lookup.saw_self, Some(false));
}

#[test]
fn test_removing_parent_entity_removes_nested_entities() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let parent = spawn(&mut manager, "parent", &log);
    let parent_node = manager.entity(parent).unwrap().node();
    let child = manager.create_entity(parent_node, "child").unwrap().id();
    manager.add_component::<Recorder>(child, Rc::clone(&log)).unwrap();
    let child_node = manager.entity(child).unwrap().node();
    let grandchild = manager.create_entity(child_node, "grandchild").unwrap().id();
    let bystander = spawn(&mut manager, "bystander", &log);
    manager.flush();

    manager.remove_entity(parent);
    manager.update(FrameTime::new(0.1, 0.1, 1)).unwrap();
    assert_eq!(take(&log), vec!["bystander"]);

    for id in [parent, child, grandchild] {
        assert!(!manager.contains(id));
    }
    assert!(!manager.scene().contains(child_node));
    assert_eq!(manager.stats().evicted, 3);
    assert_eq!(manager.ids().collect::<Vec<_>>(), vec![bystander]);
    // root, bystander
    assert_eq!(manager.scene().node_count(), 2);

    manager.update(FrameTime::new(0.2, 0.1, 2)).unwrap();
    assert_eq!(take(&log), vec!["bystander"]);
}

#[test]
fn test_queued_nested_entity_removed_with_parent() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let parent = spawn(&mut manager, "parent", &log);
    manager.flush();

    let parent_node = manager.entity(parent).unwrap().node();
    let child = manager.create_entity(parent_node, "child").unwrap().id();
    manager.add_component::<Recorder>(child, Rc::clone(&log)).unwrap();
    manager.remove_entity(parent);

    assert_eq!(manager.flush(), 2);
    assert!(!manager.contains(child));
    assert!(manager.is_empty());

    manager.update(FrameTime::new(0.1, 0.1, 1)).unwrap();
    assert!(take(&log).is_empty());
}

#[test]
fn test_find_by_name_follows_creation_order() {
    let log: VisitLog = Rc::default();
    let mut manager = EntityManager::new(NodeTree::new());
    let doomed = spawn(&mut manager, "doomed", &log);
    let maker = spawn(&mut manager, "maker", &log);
    manager
        .add_component::<Saboteur>(maker, (doomed, "twin", Rc::clone(&log)))
        .unwrap();

    // The pass queues the first twin and frees the doomed entity's slot
    manager.update(FrameTime::new(0.1, 0.1, 1)).unwrap();
    let first = manager.find_by_name("twin").unwrap().id();

    let root = manager.scene().root();
    let second = manager.create_entity(root, "twin").unwrap().id();
    assert_ne!(first, second);
    assert_eq!(manager.find_by_name("twin").map(|entity| entity.id()), Some(first));

    manager.flush();
    assert_eq!(manager.find_by_name("twin").map(|entity| entity.id()), Some(first));
}
