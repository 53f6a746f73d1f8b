//! Skinned instance component
//!
//! Clones a shared [`SkinnedModel`] hierarchy under its entity's node and
//! drives it with an [`AnimationMixer`]. Only one clip is active at a time.

use super::clip::SkinnedModel;
use super::mixer::{ActionId, AnimationMixer, ClipMixer};
use crate::ecs::{Attachment, Component, ComponentKind, ComponentType, FrameContext};
use crate::scene::NodeId;
use crate::SceneResult;
use std::collections::HashMap;
use std::sync::Arc;

/// Animated instance of a skinned model
pub struct SkinInstance<M: AnimationMixer = ClipMixer> {
    model: Arc<SkinnedModel>,
    anim_root: NodeId,
    mixer: M,
    actions: HashMap<String, ActionId>,
    current: Option<String>,
}

impl<M: AnimationMixer> SkinInstance<M> {
    /// Switch to the clip called `name`
    ///
    /// Every tracked action is disabled (keeping its position), then the
    /// clip's action is fetched or created, enabled, rewound and started.
    /// Re-selecting a clip reuses its action.
    pub fn set_animation(&mut self, name: &str) -> SceneResult<ActionId> {
        let model = Arc::clone(&self.model);
        let clip = model.clip(name)?;

        for action in self.actions.values() {
            self.mixer.set_enabled(*action, false);
        }

        let action = self.mixer.clip_action(clip);
        self.mixer.set_enabled(action, true);
        self.mixer.reset(action);
        self.mixer.play(action);
        self.actions.insert(name.to_owned(), action);

        if self.current.as_deref() != Some(name) {
            log::debug!("Animation of '{}' switched to '{}'", model.name(), name);
        }
        self.current = Some(name.to_owned());
        Ok(action)
    }

    /// Name of the clip last selected
    pub fn current_animation(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Action previously created for clip `name`
    pub fn action(&self, name: &str) -> Option<ActionId> {
        self.actions.get(name).copied()
    }

    /// Root of the cloned hierarchy
    pub fn anim_root(&self) -> NodeId {
        self.anim_root
    }

    /// Template this instance was cloned from
    pub fn model(&self) -> &Arc<SkinnedModel> {
        &self.model
    }

    /// Mixer driving the cloned hierarchy
    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    /// Mixer, mutably
    pub fn mixer_mut(&mut self) -> &mut M {
        &mut self.mixer
    }
}

impl<M: AnimationMixer> Component for SkinInstance<M> {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> SceneResult<()> {
        self.mixer.update(ctx.delta_time());
        Ok(())
    }
}

impl<M: AnimationMixer> ComponentType for SkinInstance<M> {
    const KIND: ComponentKind = ComponentKind::new("skin_instance");
    type Args = Arc<SkinnedModel>;

    fn create(attachment: &mut Attachment<'_>, model: Arc<SkinnedModel>) -> SceneResult<Self> {
        let node = attachment.node();
        let scene = attachment.scene_mut();
        let anim_root = scene.clone_subtree(model.root())?;
        scene.add_child(node, anim_root)?;
        log::trace!(
            "Cloned skinned model '{}' for '{}'",
            model.name(),
            attachment.owner_name()
        );

        Ok(Self {
            model,
            anim_root,
            mixer: M::bind(anim_root),
            actions: HashMap::new(),
            current: None,
        })
    }
}
