//! Animation mixer capability and the in-crate clip mixer

use super::clip::{AnimationClip, LoopMode};
use crate::scene::NodeId;
use bitflags::bitflags;
use slotmap::SlotMap;
use std::collections::HashMap;

slotmap::new_key_type! {
    /// Handle to a playable action owned by a mixer
    pub struct ActionId;
}

bitflags! {
    /// Playback state of an action
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionFlags: u8 {
        /// The action contributes to the pose and advances with time
        const ENABLED = 1 << 0;
        /// The action has been started and not stopped or finished
        const PLAYING = 1 << 1;
    }
}

/// Animation mixer bound to one animation root
///
/// An action is the playable binding of a clip to the mixer. Asking for the
/// same clip twice returns the same action.
pub trait AnimationMixer: 'static {
    /// Create a mixer driving the hierarchy rooted at `root`
    fn bind(root: NodeId) -> Self
    where
        Self: Sized;

    /// Animation root this mixer drives
    fn root(&self) -> NodeId;

    /// Get or create the action for `clip`
    fn clip_action(&mut self, clip: &AnimationClip) -> ActionId;

    /// Enable or disable an action without touching its playback position
    fn set_enabled(&mut self, action: ActionId, enabled: bool);

    /// Rewind an action to its start
    fn reset(&mut self, action: ActionId);

    /// Start playing an action
    fn play(&mut self, action: ActionId);

    /// Stop an action and rewind it
    fn stop(&mut self, action: ActionId);

    /// Whether an action is enabled
    fn is_enabled(&self, action: ActionId) -> bool;

    /// Whether an action is enabled and playing
    fn is_running(&self, action: ActionId) -> bool;

    /// Local playback time of an action in seconds
    fn action_time(&self, action: ActionId) -> Option<f32>;

    /// Advance every running action by `delta_time` seconds
    fn update(&mut self, delta_time: f32);
}

#[derive(Debug, Clone)]
struct ClipAction {
    clip: AnimationClip,
    time: f32,
    flags: ActionFlags,
}

/// Simple mixer tracking local time per action
#[derive(Debug)]
pub struct ClipMixer {
    root: NodeId,
    actions: SlotMap<ActionId, ClipAction>,
    by_clip: HashMap<String, ActionId>,
    time: f32,
    time_scale: f32,
}

impl ClipMixer {
    /// Scale applied to every `update` delta
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Change the global time scale
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    /// Total scaled time this mixer has advanced
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of actions created so far
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Clip bound to `action`
    pub fn clip_name(&self, action: ActionId) -> Option<&str> {
        self.actions.get(action).map(|entry| entry.clip.name.as_str())
    }

    /// Raw playback flags of `action`
    pub fn flags(&self, action: ActionId) -> ActionFlags {
        self.actions.get(action).map(|entry| entry.flags).unwrap_or_default()
    }
}

impl AnimationMixer for ClipMixer {
    fn bind(root: NodeId) -> Self {
        Self {
            root,
            actions: SlotMap::with_key(),
            by_clip: HashMap::new(),
            time: 0.0,
            time_scale: 1.0,
        }
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn clip_action(&mut self, clip: &AnimationClip) -> ActionId {
        if let Some(action) = self.by_clip.get(&clip.name) {
            return *action;
        }
        let action = self.actions.insert(ClipAction {
            clip: clip.clone(),
            time: 0.0,
            flags: ActionFlags::ENABLED,
        });
        self.by_clip.insert(clip.name.clone(), action);
        log::trace!("Created action for clip '{}'", clip.name);
        action
    }

    fn set_enabled(&mut self, action: ActionId, enabled: bool) {
        if let Some(entry) = self.actions.get_mut(action) {
            entry.flags.set(ActionFlags::ENABLED, enabled);
        }
    }

    fn reset(&mut self, action: ActionId) {
        if let Some(entry) = self.actions.get_mut(action) {
            entry.time = 0.0;
            entry.flags.insert(ActionFlags::ENABLED);
        }
    }

    fn play(&mut self, action: ActionId) {
        if let Some(entry) = self.actions.get_mut(action) {
            entry.flags.insert(ActionFlags::PLAYING);
        }
    }

    fn stop(&mut self, action: ActionId) {
        if let Some(entry) = self.actions.get_mut(action) {
            entry.flags.remove(ActionFlags::PLAYING);
            entry.time = 0.0;
        }
    }

    fn is_enabled(&self, action: ActionId) -> bool {
        self.flags(action).contains(ActionFlags::ENABLED)
    }

    fn is_running(&self, action: ActionId) -> bool {
        self.flags(action).contains(ActionFlags::ENABLED | ActionFlags::PLAYING)
    }

    fn action_time(&self, action: ActionId) -> Option<f32> {
        self.actions.get(action).map(|entry| entry.time)
    }

    fn update(&mut self, delta_time: f32) {
        let delta = delta_time * self.time_scale;
        self.time += delta;

        for entry in self.actions.values_mut() {
            if !entry.flags.contains(ActionFlags::ENABLED | ActionFlags::PLAYING) {
                continue;
            }
            let duration = entry.clip.duration;
            if duration <= 0.0 {
                entry.time = 0.0;
                continue;
            }

            entry.time += delta;
            match entry.clip.loop_mode {
                LoopMode::Repeat => entry.time = entry.time.rem_euclid(duration),
                LoopMode::Once => {
                    if entry.time >= duration {
                        entry.time = duration;
                        entry.flags.remove(ActionFlags::PLAYING);
                    } else if entry.time < 0.0 {
                        entry.time = 0.0;
                        entry.flags.remove(ActionFlags::PLAYING);
                    }
                }
            }
        }
    }
}
