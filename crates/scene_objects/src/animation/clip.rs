//! Animation clips and skinned model templates

use crate::config::ModelConfig;
use crate::scene::{NodeId, SceneGraph};
use crate::{SceneError, SceneResult};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// What happens when playback reaches the end of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Wrap around to the start
    #[default]
    Repeat,
    /// Hold the last pose and stop playing
    Once,
}

/// Named animation clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    /// Length in seconds
    pub duration: f32,
    /// Playback mode
    pub loop_mode: LoopMode,
}

impl AnimationClip {
    /// Create a repeating clip
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration: duration.max(0.0),
            loop_mode: LoopMode::Repeat,
        }
    }

    /// Set the loop mode
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }
}

/// Shared skinned-mesh template: a bone hierarchy plus a clip table
///
/// The hierarchy is a detached subtree in the scene graph; every
/// `SkinInstance` clones it so instances animate independently.
#[derive(Debug, Clone)]
pub struct SkinnedModel {
    name: String,
    root: NodeId,
    clips: HashMap<String, AnimationClip>,
}

impl SkinnedModel {
    /// Wrap an existing template subtree rooted at `root`
    pub fn new(name: impl Into<String>, root: NodeId) -> Self {
        Self {
            name: name.into(),
            root,
            clips: HashMap::new(),
        }
    }

    /// Build the template subtree and clip table described by `config`
    ///
    /// On failure every node created so far is removed again.
    pub fn from_config(scene: &mut dyn SceneGraph, config: &ModelConfig) -> SceneResult<Self> {
        let root = scene.create_node(&config.name);
        if let Err(error) = Self::build_bones(scene, root, config) {
            if let Err(cleanup) = scene.remove_node(root) {
                log::warn!("Could not discard partial model '{}': {}", config.name, cleanup);
            }
            return Err(error);
        }

        let mut model = Self::new(config.name.clone(), root);
        for clip in &config.clips {
            model.add_clip(AnimationClip::new(clip.name.clone(), clip.duration).with_loop_mode(clip.loop_mode));
        }
        log::debug!(
            "Built skinned model '{}' with {} bones and {} clips",
            model.name,
            config.bones.len(),
            model.clips.len()
        );
        Ok(model)
    }

    fn build_bones(scene: &mut dyn SceneGraph, root: NodeId, config: &ModelConfig) -> SceneResult<()> {
        let mut bones: HashMap<&str, NodeId> = HashMap::new();
        for bone in &config.bones {
            let parent = match bone.parent.as_deref() {
                None => root,
                Some(parent) => *bones.get(parent).ok_or_else(|| {
                    SceneError::InvalidHierarchy(format!(
                        "bone '{}' references unknown parent '{}'",
                        bone.name, parent
                    ))
                })?,
            };
            let node = scene.create_node(&bone.name);
            if let Err(error) = scene.add_child(parent, node) {
                // Not yet attached, so removing the root would miss it
                let _ = scene.remove_node(node);
                return Err(error);
            }
            bones.insert(bone.name.as_str(), node);
        }
        Ok(())
    }

    /// Add a clip, replacing any clip with the same name
    pub fn add_clip(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    /// Builder form of [`SkinnedModel::add_clip`]
    pub fn with_clip(mut self, clip: AnimationClip) -> Self {
        self.add_clip(clip);
        self
    }

    /// Look up a clip by name
    pub fn clip(&self, name: &str) -> SceneResult<&AnimationClip> {
        self.clips.get(name).ok_or_else(|| SceneError::UnknownAnimation {
            name: name.to_owned(),
        })
    }

    /// Clip names, sorted
    pub fn clip_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Template root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoneConfig, ClipConfig};
    use crate::scene::NodeTree;

    fn knight() -> ModelConfig {
        ModelConfig {
            name: "knight".into(),
            bones: vec![
                BoneConfig { name: "hips".into(), parent: None },
                BoneConfig { name: "spine".into(), parent: Some("hips".into()) },
            ],
            clips: vec![
                ClipConfig { name: "walk".into(), duration: 1.0, loop_mode: LoopMode::Repeat },
                ClipConfig { name: "die".into(), duration: 2.0, loop_mode: LoopMode::Once },
            ],
        }
    }

    #[test]
    fn test_from_config_builds_detached_template() {
        let mut tree = NodeTree::new();
        let model = SkinnedModel::from_config(&mut tree, &knight()).unwrap();

        assert_eq!(tree.parent(model.root()), None);
        assert_eq!(tree.node_count(), 4);
        let hips = tree.children(model.root())[0];
        assert_eq!(tree.name(hips), Some("hips"));
        assert_eq!(tree.name(tree.children(hips)[0]), Some("spine"));
        assert_eq!(model.clip_names(), vec!["die", "walk"]);
        assert_eq!(model.clip("die").unwrap().loop_mode, LoopMode::Once);
    }

    #[test]
    fn test_unknown_clip_is_an_error() {
        let mut tree = NodeTree::new();
        let model = SkinnedModel::from_config(&mut tree, &knight()).unwrap();

        assert_eq!(
            model.clip("fly"),
            Err(SceneError::UnknownAnimation { name: "fly".into() })
        );
    }

    #[test]
    fn test_unknown_parent_bone_rolls_back() {
        let mut tree = NodeTree::new();
        let mut config = knight();
        config.bones.push(BoneConfig {
            name: "tail".into(),
            parent: Some("wing".into()),
        });

        let result = SkinnedModel::from_config(&mut tree, &config);
        assert!(matches!(result, Err(SceneError::InvalidHierarchy(_))));
        assert_eq!(tree.node_count(), 1);
    }

    /// Node tree that rejects attachment once `budget` attachments succeeded
    struct LimitedTree {
        tree: NodeTree,
        budget: usize,
    }

    impl SceneGraph for LimitedTree {
        fn root(&self) -> NodeId {
            self.tree.root()
        }

        fn create_node(&mut self, name: &str) -> NodeId {
            self.tree.create_node(name)
        }

        fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
            if self.budget == 0 {
                return Err(SceneError::InvalidHierarchy("attachment limit reached".into()));
            }
            self.budget -= 1;
            self.tree.add_child(parent, child)
        }

        fn remove_node(&mut self, node: NodeId) -> SceneResult<()> {
            self.tree.remove_node(node)
        }

        fn clone_subtree(&mut self, node: NodeId) -> SceneResult<NodeId> {
            self.tree.clone_subtree(node)
        }

        fn parent(&self, node: NodeId) -> Option<NodeId> {
            self.tree.parent(node)
        }

        fn children(&self, node: NodeId) -> &[NodeId] {
            self.tree.children(node)
        }

        fn name(&self, node: NodeId) -> Option<&str> {
            self.tree.name(node)
        }

        fn transform(&self, node: NodeId) -> Option<&crate::foundation::math::Transform> {
            self.tree.transform(node)
        }

        fn transform_mut(&mut self, node: NodeId) -> Option<&mut crate::foundation::math::Transform> {
            self.tree.transform_mut(node)
        }

        fn contains(&self, node: NodeId) -> bool {
            self.tree.contains(node)
        }

        fn node_count(&self) -> usize {
            self.tree.node_count()
        }
    }

    #[test]
    fn test_rejected_attachment_rolls_back() {
        let mut scene = LimitedTree {
            tree: NodeTree::new(),
            budget: 1,
        };

        let result = SkinnedModel::from_config(&mut scene, &knight());
        assert!(matches!(result, Err(SceneError::InvalidHierarchy(_))));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_negative_duration_clamped() {
        let clip = AnimationClip::new("glitch", -3.0);
        assert_eq!(clip.duration, 0.0);
    }
}
