use bevy::{
    math::{
        Vec3,
        primitives::{Cuboid, Sphere},
    },
    reflect::Reflect,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{LoaderError, RagdollError},
    ragdoll::configuration::{AngularDrive, CollisionDetectionMode},
    skeleton::{humanoid::HumanoidBone, pose::BonePose},
};

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Multiplier applied to bone directions on this side so that both sides share a swing plane.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.,
            Side::Right => 1.,
        }
    }

    pub fn mirror(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Role of a rigid body in the ragdoll.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentRole {
    Pelvis,
    Chest,
    Head,
    UpperLeg(Side),
    LowerLeg(Side),
    Foot(Side),
    UpperArm(Side),
    LowerArm(Side),
    Hand(Side),
}

impl SegmentRole {
    /// Every role, in the order segments are generated and joints are configured.
    pub const ALL: [SegmentRole; 15] = [
        SegmentRole::Pelvis,
        SegmentRole::Chest,
        SegmentRole::Head,
        SegmentRole::UpperLeg(Side::Left),
        SegmentRole::LowerLeg(Side::Left),
        SegmentRole::Foot(Side::Left),
        SegmentRole::UpperArm(Side::Left),
        SegmentRole::LowerArm(Side::Left),
        SegmentRole::Hand(Side::Left),
        SegmentRole::UpperLeg(Side::Right),
        SegmentRole::LowerLeg(Side::Right),
        SegmentRole::Foot(Side::Right),
        SegmentRole::UpperArm(Side::Right),
        SegmentRole::LowerArm(Side::Right),
        SegmentRole::Hand(Side::Right),
    ];

    /// Segment this one is jointed to. Only the pelvis has none.
    pub fn parent(self) -> Option<SegmentRole> {
        match self {
            SegmentRole::Pelvis => None,
            SegmentRole::Chest => Some(SegmentRole::Pelvis),
            SegmentRole::Head => Some(SegmentRole::Chest),
            SegmentRole::UpperLeg(_) => Some(SegmentRole::Pelvis),
            SegmentRole::LowerLeg(side) => Some(SegmentRole::UpperLeg(side)),
            SegmentRole::Foot(side) => Some(SegmentRole::LowerLeg(side)),
            SegmentRole::UpperArm(_) => Some(SegmentRole::Chest),
            SegmentRole::LowerArm(side) => Some(SegmentRole::UpperArm(side)),
            SegmentRole::Hand(side) => Some(SegmentRole::LowerArm(side)),
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            SegmentRole::Pelvis | SegmentRole::Chest | SegmentRole::Head => None,
            SegmentRole::UpperLeg(side)
            | SegmentRole::LowerLeg(side)
            | SegmentRole::Foot(side)
            | SegmentRole::UpperArm(side)
            | SegmentRole::LowerArm(side)
            | SegmentRole::Hand(side) => Some(side),
        }
    }

    pub fn is_tip(self) -> bool {
        matches!(self, SegmentRole::Foot(_) | SegmentRole::Hand(_))
    }

    pub fn is_arm(self) -> bool {
        matches!(
            self,
            SegmentRole::UpperArm(_) | SegmentRole::LowerArm(_) | SegmentRole::Hand(_)
        )
    }

    /// Same role on the opposite side.
    pub fn mirrored(self) -> Self {
        match self {
            SegmentRole::UpperLeg(side) => SegmentRole::UpperLeg(side.mirror()),
            SegmentRole::LowerLeg(side) => SegmentRole::LowerLeg(side.mirror()),
            SegmentRole::Foot(side) => SegmentRole::Foot(side.mirror()),
            SegmentRole::UpperArm(side) => SegmentRole::UpperArm(side.mirror()),
            SegmentRole::LowerArm(side) => SegmentRole::LowerArm(side.mirror()),
            SegmentRole::Hand(side) => SegmentRole::Hand(side.mirror()),
            other => other,
        }
    }

    /// Counterpart that receives symmetric edits. Only the upper and lower limb segments are
    /// paired; tips and the spine are edited on their own.
    pub fn symmetric(self) -> Option<Self> {
        match self {
            SegmentRole::UpperLeg(_)
            | SegmentRole::LowerLeg(_)
            | SegmentRole::UpperArm(_)
            | SegmentRole::LowerArm(_) => Some(self.mirrored()),
            _ => None,
        }
    }

    /// Humanoid bone the segment is built on.
    pub fn bone(self) -> HumanoidBone {
        match self {
            SegmentRole::Pelvis => HumanoidBone::Hips,
            SegmentRole::Chest => HumanoidBone::Chest,
            SegmentRole::Head => HumanoidBone::Head,
            SegmentRole::UpperLeg(Side::Left) => HumanoidBone::LeftUpperLeg,
            SegmentRole::UpperLeg(Side::Right) => HumanoidBone::RightUpperLeg,
            SegmentRole::LowerLeg(Side::Left) => HumanoidBone::LeftLowerLeg,
            SegmentRole::LowerLeg(Side::Right) => HumanoidBone::RightLowerLeg,
            SegmentRole::Foot(Side::Left) => HumanoidBone::LeftFoot,
            SegmentRole::Foot(Side::Right) => HumanoidBone::RightFoot,
            SegmentRole::UpperArm(Side::Left) => HumanoidBone::LeftUpperArm,
            SegmentRole::UpperArm(Side::Right) => HumanoidBone::RightUpperArm,
            SegmentRole::LowerArm(Side::Left) => HumanoidBone::LeftLowerArm,
            SegmentRole::LowerArm(Side::Right) => HumanoidBone::RightLowerArm,
            SegmentRole::Hand(Side::Left) => HumanoidBone::LeftHand,
            SegmentRole::Hand(Side::Right) => HumanoidBone::RightHand,
        }
    }

    /// Bone used when [`SegmentRole::bone`] is missing from the skeleton.
    pub fn fallback_bone(self) -> Option<HumanoidBone> {
        match self {
            SegmentRole::Chest => Some(HumanoidBone::Spine),
            _ => None,
        }
    }
}

/// Local axis a capsule is aligned with.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapsuleAxis {
    X,
    Y,
    Z,
}

impl CapsuleAxis {
    pub fn unit(self) -> Vec3 {
        match self {
            CapsuleAxis::X => Vec3::X,
            CapsuleAxis::Y => Vec3::Y,
            CapsuleAxis::Z => Vec3::Z,
        }
    }
}

/// A capsule along one of the local axes. `height` is the full length including both caps.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCapsule {
    pub axis: CapsuleAxis,
    pub radius: f32,
    pub height: f32,
}

#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere(Sphere),
    Capsule(AxisCapsule),
    Cuboid(Cuboid),
}

#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCollider {
    pub shape: ColliderShape,
    /// Center of the shape in the segment's local space.
    pub center: Vec3,
    pub is_trigger: bool,
}

/// Rigid body settings of a segment.
#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySettings {
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub use_gravity: bool,
    pub is_kinematic: bool,
    pub collision_detection: CollisionDetectionMode,
    /// Local-space override. `None` lets the physics engine derive it from the collider.
    pub center_of_mass: Option<Vec3>,
}

/// Angle range in degrees.
#[derive(Reflect, Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct AngleLimit {
    pub min: f32,
    pub max: f32,
}

impl AngleLimit {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range seen from the opposite side of the body: `(min, max)` becomes `(-max, -min)`.
    pub fn mirrored(self) -> Self {
        Self {
            min: -self.max,
            max: -self.min,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Twist range around the primary axis plus symmetric swing limits around the secondary and
/// swing axes, all in degrees.
#[derive(Reflect, Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct JointLimits {
    pub twist: AngleLimit,
    pub swing1: f32,
    pub swing2: f32,
}

impl JointLimits {
    pub const fn new(low_twist: f32, high_twist: f32, swing1: f32, swing2: f32) -> Self {
        Self {
            twist: AngleLimit::new(low_twist, high_twist),
            swing1,
            swing2,
        }
    }

    pub fn mirrored(self) -> Self {
        Self {
            twist: self.twist.mirrored(),
            ..self
        }
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointMotion {
    Locked,
    Limited,
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationDriveMode {
    Slerp,
}

#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub parent: SegmentRole,
    /// Anchor in the child's local space.
    pub anchor: Vec3,
    /// The connected anchor on the parent is resolved by the physics engine.
    pub auto_connected_anchor: bool,
    /// Twist axis, in the child's local space.
    pub axis: Vec3,
    pub secondary_axis: Vec3,
    pub limits: JointLimits,
    pub linear_motion: JointMotion,
    pub angular_motion: JointMotion,
    pub drive: AngularDrive,
    pub drive_mode: RotationDriveMode,
}

impl JointSpec {
    pub fn swing_axis(&self) -> Vec3 {
        self.axis
            .normalize_or_zero()
            .cross(self.secondary_axis.normalize_or_zero())
            .normalize_or_zero()
    }
}

#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySegment {
    pub role: SegmentRole,
    /// Bone the segment was sampled from (the spine when the chest is missing).
    pub bone: HumanoidBone,
    pub pose: BonePose,
    pub parent: Option<SegmentRole>,
    pub collider: SegmentCollider,
    pub body: BodySettings,
    pub joint: Option<JointSpec>,
}

/// Generated ragdoll: a tree of segments rooted at the pelvis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagdollRig {
    /// Facing direction of the character when the rig was generated.
    pub forward: Vec3,
    pub segments: IndexMap<SegmentRole, BodySegment>,
}

impl RagdollRig {
    pub fn get_segment(&self, role: SegmentRole) -> Option<&BodySegment> {
        self.segments.get(&role)
    }

    pub fn get_segment_mut(&mut self, role: SegmentRole) -> Option<&mut BodySegment> {
        self.segments.get_mut(&role)
    }

    pub fn get_joint(&self, role: SegmentRole) -> Option<&JointSpec> {
        self.get_segment(role)?.joint.as_ref()
    }

    pub fn iter_segments(&self) -> impl Iterator<Item = &BodySegment> {
        self.segments.values()
    }

    pub fn iter_joints(&self) -> impl Iterator<Item = (SegmentRole, &JointSpec)> {
        self.segments
            .values()
            .filter_map(|segment| segment.joint.as_ref().map(|joint| (segment.role, joint)))
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn joint_count(&self) -> usize {
        self.iter_joints().count()
    }

    pub fn total_mass(&self) -> f32 {
        self.iter_segments().map(|segment| segment.body.mass).sum()
    }

    pub fn from_ron(source: &str) -> Result<Self, LoaderError> {
        Ok(ron::de::from_str(source)?)
    }

    pub fn to_ron(&self) -> Result<String, LoaderError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Checks that the segments form one tree rooted at the pelvis: the pelvis has no joint, and
    /// every other segment has exactly one joint pointing at its tree parent, which must exist.
    pub fn validate(&self) -> Result<(), RagdollError> {
        let root = self
            .get_segment(SegmentRole::Pelvis)
            .ok_or(RagdollError::MissingSegment(SegmentRole::Pelvis))?;
        if root.joint.is_some() || root.parent.is_some() {
            return Err(RagdollError::DisconnectedSegment(SegmentRole::Pelvis));
        }

        for (role, segment) in &self.segments {
            if *role == SegmentRole::Pelvis {
                continue;
            }

            let expected_parent = role.parent();
            let connected = segment.role == *role
                && segment.parent == expected_parent
                && segment
                    .joint
                    .as_ref()
                    .is_some_and(|joint| Some(joint.parent) == expected_parent)
                && expected_parent.is_some_and(|parent| self.segments.contains_key(&parent));

            if !connected {
                return Err(RagdollError::DisconnectedSegment(*role));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_but_the_pelvis_reaches_the_pelvis() {
        for role in SegmentRole::ALL {
            let mut current = role;
            let mut steps = 0;
            while let Some(parent) = current.parent() {
                current = parent;
                steps += 1;
                assert!(steps < 4);
            }
            assert_eq!(current, SegmentRole::Pelvis);
        }
    }

    #[test]
    fn roles_are_listed_after_their_parents() {
        for (index, role) in SegmentRole::ALL.iter().enumerate() {
            if let Some(parent) = role.parent() {
                let parent_index = SegmentRole::ALL.iter().position(|r| *r == parent).unwrap();
                assert!(parent_index < index, "{role:?} before {parent:?}");
            }
        }
    }

    #[test]
    fn mirrored_limits_swap_and_negate_twist() {
        let left = JointLimits::new(-100., 30., 100., 45.);
        assert_eq!(left.mirrored(), JointLimits::new(-30., 100., 100., 45.));
        assert_eq!(left.mirrored().mirrored(), left);
    }

    #[test]
    fn only_limb_chains_have_symmetric_counterparts() {
        assert_eq!(
            SegmentRole::UpperArm(Side::Left).symmetric(),
            Some(SegmentRole::UpperArm(Side::Right))
        );
        assert_eq!(SegmentRole::Hand(Side::Left).symmetric(), None);
        assert_eq!(SegmentRole::Head.symmetric(), None);
    }
}
