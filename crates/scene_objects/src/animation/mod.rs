//! Skeletal animation
//!
//! A [`SkinnedModel`] is a shared template (bone hierarchy plus named clips).
//! Each [`SkinInstance`] clones the template under its entity and plays one
//! clip at a time through an [`AnimationMixer`].

mod clip;
mod mixer;
mod skin;

pub use clip::{AnimationClip, LoopMode, SkinnedModel};
pub use mixer::{ActionFlags, ActionId, AnimationMixer, ClipMixer};
pub use skin::SkinInstance;
