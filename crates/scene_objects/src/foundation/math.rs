//! Math utilities and types
//!
//! Provides the math types carried by scene nodes.

use serde::{Serialize, Deserialize};

pub use nalgebra::{
    Vector3,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Local transform of a scene node: position, rotation, and scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the parent node
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Move by `offset` in parent space
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate around the Y axis by `angle` radians
    pub fn rotate_y(&mut self, angle: f32) {
        let delta = Quat::from_axis_angle(&Vector3::y_axis(), angle);
        self.rotation = delta * self.rotation;
    }
}
