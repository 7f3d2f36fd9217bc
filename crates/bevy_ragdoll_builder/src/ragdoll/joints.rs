use bevy::{log::warn, math::Vec3};
use indexmap::IndexMap;

use crate::{
    errors::RagdollError,
    ragdoll::{
        configuration::RagdollConfig,
        definition::{
            JointLimits, JointMotion, JointSpec, RotationDriveMode, SegmentRole, Side,
        },
        sampler::SampledSkeleton,
    },
    skeleton::pose::BonePose,
};

/// Primary and secondary joint axes, in the local space of the child segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointFrame {
    pub axis: Vec3,
    pub secondary_axis: Vec3,
}

impl JointFrame {
    /// Converts world-space axes into the local space of `child`.
    pub fn from_world(child: &BonePose, axis: Vec3, secondary_axis: Vec3) -> Self {
        Self {
            axis: child.inverse_transform_direction(axis),
            secondary_axis: child.inverse_transform_direction(secondary_axis),
        }
    }
}

/// Frame shared by the spine and the legs: twist around the rig's right axis, with the rig's
/// forward axis as secondary.
pub fn body_frame(child: &BonePose, root: &BonePose) -> JointFrame {
    JointFrame::from_world(child, root.right(), root.forward())
}

/// Frame of an arm joint. Twist is around the character's forward direction, and the secondary
/// axis is perpendicular to both the forward direction and the bone.
///
/// The bone direction is flipped on the left side so that both arms swing in the same sense and
/// share mirrored limits.
pub fn arm_frame(child: &BonePose, forward: Vec3, bone_direction: Vec3, side: Side) -> JointFrame {
    JointFrame::from_world(
        child,
        forward,
        forward.cross(bone_direction * side.sign()),
    )
}

/// Fails if the twist range of `limits` is inverted.
pub fn check_limits(segment: SegmentRole, limits: &JointLimits) -> Result<(), RagdollError> {
    if limits.twist.is_ordered() {
        Ok(())
    } else {
        Err(RagdollError::InvalidJointLimit {
            segment,
            low: limits.twist.min,
            high: limits.twist.max,
        })
    }
}

/// Joints of every non-pelvis segment, in configuration order.
///
/// The first inverted twist range aborts the whole pass.
pub fn solve_joints(
    sampled: &SampledSkeleton,
    config: &RagdollConfig,
) -> Result<IndexMap<SegmentRole, JointSpec>, RagdollError> {
    let mut joints = IndexMap::new();

    for role in SegmentRole::ALL {
        let Some(parent) = role.parent() else {
            continue;
        };
        if role.is_tip() && !config.create_tips {
            continue;
        }

        let limits = config
            .joint_limits
            .limits_for(role)
            .ok_or(RagdollError::MissingSegment(role))?;
        check_limits(role, &limits)?;

        let bone = sampled.get(role).ok_or(RagdollError::MissingSegment(role))?;
        let frame = match (role.is_arm(), role.side()) {
            (true, Some(side)) => {
                let direction = arm_direction(sampled, role)?;
                if direction == Vec3::ZERO {
                    warn!("{role:?} has no direction, its secondary joint axis will be zero");
                }
                arm_frame(&bone.pose, sampled.forward, direction, side)
            }
            _ => body_frame(&bone.pose, &sampled.root),
        };

        joints.insert(
            role,
            JointSpec {
                parent,
                anchor: Vec3::ZERO,
                auto_connected_anchor: true,
                axis: frame.axis,
                secondary_axis: frame.secondary_axis,
                limits,
                linear_motion: JointMotion::Locked,
                angular_motion: JointMotion::Limited,
                drive: config.angular_drive,
                drive_mode: RotationDriveMode::Slerp,
            },
        );
    }

    Ok(joints)
}

/// World direction an arm segment points in: toward the next joint, or for the hand toward its
/// farthest descendant.
fn arm_direction(sampled: &SampledSkeleton, role: SegmentRole) -> Result<Vec3, RagdollError> {
    let bone = sampled.get(role).ok_or(RagdollError::MissingSegment(role))?;
    let start = bone.pose.translation;

    let end = match role {
        SegmentRole::UpperArm(side) => sampled
            .pose(SegmentRole::LowerArm(side))
            .map(|pose| pose.translation),
        _ => bone.end,
    };

    Ok(end.map(|end| end - start).unwrap_or(Vec3::ZERO))
}
