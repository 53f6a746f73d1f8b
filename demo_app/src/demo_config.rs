//! Demo configuration
//!
//! Loaded from TOML or RON; every field falls back to a built-in default so
//! the demo also runs without a config file.

use scene_objects::animation::LoopMode;
use scene_objects::config::{BoneConfig, ClipConfig, Config, ManagerConfig, ModelConfig};
use serde::{Deserialize, Serialize};

/// Top-level demo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Fixed simulation rate in frames per second
    pub frame_rate: f32,

    /// Number of frames to simulate
    pub frames: u64,

    /// Entity manager settings
    pub manager: ManagerConfig,

    /// Skinned model shared by every character
    pub model: ModelConfig,

    /// Characters spawned at startup
    pub characters: Vec<CharacterConfig>,

    /// Short-lived particle emitter
    pub spawner: SpawnerConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            frame_rate: 60.0,
            frames: 600,
            manager: ManagerConfig {
                stats_log_interval: Some(120),
                ..ManagerConfig::default()
            },
            model: ModelConfig {
                name: "knight".to_string(),
                bones: vec![
                    BoneConfig { name: "hips".to_string(), parent: None },
                    BoneConfig { name: "spine".to_string(), parent: Some("hips".to_string()) },
                    BoneConfig { name: "head".to_string(), parent: Some("spine".to_string()) },
                ],
                clips: vec![
                    ClipConfig { name: "idle".to_string(), duration: 2.0, loop_mode: LoopMode::Repeat },
                    ClipConfig { name: "walk".to_string(), duration: 1.2, loop_mode: LoopMode::Repeat },
                ],
            },
            characters: vec![
                CharacterConfig::named("alice", [-2.0, 0.0, 0.0]),
                CharacterConfig::named("bob", [2.0, 0.0, 0.0]),
            ],
            spawner: SpawnerConfig::default(),
        }
    }
}

impl Config for DemoConfig {}

/// One animated character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Entity name
    pub name: String,

    /// Start position
    pub position: [f32; 3],

    /// Clip played while standing
    pub idle_clip: String,

    /// Clip played while moving
    pub walk_clip: String,

    /// Seconds between idle/walk switches
    pub switch_interval: f32,

    /// Units per second while walking
    pub walk_speed: f32,
}

impl CharacterConfig {
    fn named(name: &str, position: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            position,
            ..Self::default()
        }
    }
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            name: "character".to_string(),
            position: [0.0; 3],
            idle_clip: "idle".to_string(),
            walk_clip: "walk".to_string(),
            switch_interval: 1.5,
            walk_speed: 1.0,
        }
    }
}

/// Emitter of short-lived entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Seconds between spawns
    pub interval: f32,

    /// Lifetime of each spawned entity in seconds
    pub lifetime: f32,

    /// Upper bound on simultaneously alive spawns
    pub max_alive: usize,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval: 0.25,
            lifetime: 1.0,
            max_alive: 8,
        }
    }
}
