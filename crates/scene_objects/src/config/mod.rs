//! Configuration system
//!
//! Configuration files are TOML or RON, chosen by file extension.

pub use serde::{Serialize, Deserialize};

use crate::animation::LoopMode;
use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        match extension(path) {
            Some("toml") => Self::from_toml(&contents),
            Some("ron") => Self::from_ron(&contents),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Parse from a TOML string
    fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse from a RON string
    fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Configuration for the entity manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Storage reserved up front for entities
    pub initial_capacity: usize,

    /// Log pass statistics at info level every N frames (`None` disables)
    pub stats_log_interval: Option<u64>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            stats_log_interval: None,
        }
    }
}

impl Config for ManagerConfig {}

/// One bone of a skinned model template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneConfig {
    /// Bone name
    pub name: String,
    /// Parent bone; `None` attaches directly under the model root
    #[serde(default)]
    pub parent: Option<String>,
}

/// One animation clip of a skinned model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Clip name used by `SkinInstance::set_animation`
    pub name: String,
    /// Clip length in seconds
    pub duration: f32,
    /// Playback mode
    #[serde(default)]
    pub loop_mode: LoopMode,
}

/// Skinned model template description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Name of the template root node
    pub name: String,
    /// Bone hierarchy, parents listed before children
    pub bones: Vec<BoneConfig>,
    /// Clip table
    pub clips: Vec<ClipConfig>,
}

impl Config for ModelConfig {}
