//! Scene graph
//!
//! Scene objects own one node each in a parent/child hierarchy. The hierarchy
//! itself is external to the object layer, so it is expressed as the
//! [`SceneGraph`] trait; [`NodeTree`] is the in-memory implementation used by
//! tests and the demo, and a renderer can supply its own.
//!
//! ```text
//! root
//!  ├─ player            (entity node)
//!  │   └─ skeleton      (cloned animation root)
//!  └─ spark             (entity node)
//! ```

mod scene_graph;

pub use scene_graph::{SceneGraph, NodeTree, NodeId};
