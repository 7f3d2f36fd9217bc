use bevy::{
    math::{Quat, Vec3},
    reflect::{Reflect, std_traits::ReflectDefault},
};
use serde::{Deserialize, Serialize};

/// World-space transform of a single bone, as captured in a pose snapshot.
///
/// `scale` is the accumulated (lossy) scale of the bone, so local-space conversions divide by it
/// component-wise after undoing the rotation.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
pub struct BonePose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BonePose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BonePose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Lateral axis of this frame (local +X in world space).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Mean of the three scale components.
    pub fn mean_scale(&self) -> f32 {
        (self.scale.x + self.scale.y + self.scale.z) / 3.
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * (local * self.scale)
    }

    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * (local * self.scale)
    }

    /// Maps a world-space point into this bone's local space (translation, rotation and scale).
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.inverse_transform_vector(world - self.translation)
    }

    /// Maps a world-space vector into local space, undoing rotation and scale.
    pub fn inverse_transform_vector(&self, world: Vec3) -> Vec3 {
        (self.rotation.inverse() * world) / self.scale
    }

    /// Maps a world-space direction into local space. Scale is ignored, so unit vectors stay unit.
    pub fn inverse_transform_direction(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }
}
