use bevy::{math::Vec3, reflect::Reflect};
use serde::{Deserialize, Serialize};

use crate::skeleton::pose::BonePose;

/// Humanoid bone roles a skeleton can expose to the ragdoll sampler.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HumanoidBone {
    Hips,
    Spine,
    Chest,
    Head,
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,
    RightUpperArm,
    RightLowerArm,
    RightHand,
}

/// Read-only access to a posed humanoid skeleton.
///
/// This is the only view of the host scene the generator needs. Positions are in world space.
pub trait HumanoidPose {
    /// Frame of the character root. Its right and forward axes orient the spine and leg joints.
    fn root_pose(&self) -> BonePose;

    fn lookup(&self, bone: HumanoidBone) -> Option<BonePose>;

    /// World position of the descendant of `bone` farthest away from it, or `None` if the bone is
    /// missing or has no descendants. Authoring helper frames are not descendants.
    fn extent(&self, bone: HumanoidBone) -> Option<Vec3>;
}
