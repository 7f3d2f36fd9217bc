use bevy::{log::warn, math::Vec3};
use indexmap::IndexMap;

use crate::{
    errors::RagdollError,
    ragdoll::definition::{SegmentRole, Side},
    skeleton::{
        humanoid::{HumanoidBone, HumanoidPose},
        pose::BonePose,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct SampledBone {
    pub bone: HumanoidBone,
    pub pose: BonePose,
    /// World-space point the segment extends toward. Set for lower limbs (the hand or foot, or
    /// failing that the farthest descendant) and for tips (their farthest descendant).
    pub end: Option<Vec3>,
}

/// Frozen snapshot of the bones a ragdoll is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSkeleton {
    pub root: BonePose,
    pub forward: Vec3,
    pub create_tips: bool,
    bones: IndexMap<SegmentRole, SampledBone>,
}

impl SampledSkeleton {
    pub fn get(&self, role: SegmentRole) -> Option<&SampledBone> {
        self.bones.get(&role)
    }

    pub fn pose(&self, role: SegmentRole) -> Option<&BonePose> {
        self.get(role).map(|bone| &bone.pose)
    }

    pub fn roles(&self) -> impl Iterator<Item = SegmentRole> + '_ {
        self.bones.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// Facing direction of a character: the normalized cross product of the pelvis-to-knee vectors.
///
/// With +Y up and the left knee toward -X, a character facing +Z yields +Z.
pub fn forward_direction(pelvis: Vec3, left_knee: Vec3, right_knee: Vec3) -> Vec3 {
    (left_knee - pelvis)
        .cross(right_knee - pelvis)
        .normalize_or_zero()
}

/// Looks up every bone the ragdoll needs.
///
/// Fails with [`RagdollError::IncompleteSkeleton`] listing all missing bones. Hands and feet are
/// only required when `create_tips` is set.
pub fn sample_skeleton(
    pose: &impl HumanoidPose,
    create_tips: bool,
) -> Result<SampledSkeleton, RagdollError> {
    let mut bones = IndexMap::new();
    let mut missing = vec![];

    for role in SegmentRole::ALL {
        if role.is_tip() && !create_tips {
            continue;
        }

        let found = std::iter::once(role.bone())
            .chain(role.fallback_bone())
            .find_map(|bone| pose.lookup(bone).map(|p| (bone, p)));

        let Some((bone, bone_pose)) = found else {
            missing.push(role.bone());
            continue;
        };

        bones.insert(
            role,
            SampledBone {
                bone,
                pose: bone_pose,
                end: segment_end(pose, role),
            },
        );
    }

    if !missing.is_empty() {
        return Err(RagdollError::IncompleteSkeleton(missing));
    }

    let position = |role: SegmentRole| {
        bones
            .get(&role)
            .map(|bone: &SampledBone| bone.pose.translation)
            .unwrap_or_default()
    };
    let root = pose.root_pose();
    let mut forward = forward_direction(
        position(SegmentRole::Pelvis),
        position(SegmentRole::LowerLeg(Side::Left)),
        position(SegmentRole::LowerLeg(Side::Right)),
    );
    if forward == Vec3::ZERO {
        warn!("Knees are collinear with the pelvis, using the root's forward axis instead");
        forward = root.forward();
    }

    Ok(SampledSkeleton {
        root,
        forward,
        create_tips,
        bones,
    })
}

fn segment_end(pose: &impl HumanoidPose, role: SegmentRole) -> Option<Vec3> {
    let tip = match role {
        SegmentRole::LowerLeg(side) => SegmentRole::Foot(side),
        SegmentRole::LowerArm(side) => SegmentRole::Hand(side),
        SegmentRole::Foot(_) | SegmentRole::Hand(_) => return pose.extent(role.bone()),
        _ => return None,
    };

    pose.lookup(tip.bone())
        .map(|tip_pose| tip_pose.translation)
        .or_else(|| pose.extent(role.bone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TPose, t_pose};

    #[test]
    fn samples_all_segments_with_tips() {
        let skeleton = t_pose(TPose::default());
        let sampled = sample_skeleton(&skeleton, true).unwrap();

        assert_eq!(sampled.len(), 15);
        assert!(sampled.forward.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn tips_are_optional_without_create_tips() {
        let skeleton = t_pose(TPose {
            with_tips: false,
            ..Default::default()
        });

        assert_eq!(sample_skeleton(&skeleton, false).unwrap().len(), 11);
        assert_eq!(
            sample_skeleton(&skeleton, true),
            Err(RagdollError::IncompleteSkeleton(vec![
                HumanoidBone::LeftFoot,
                HumanoidBone::LeftHand,
                HumanoidBone::RightFoot,
                HumanoidBone::RightHand,
            ]))
        );
    }

    #[test]
    fn chest_falls_back_to_spine() {
        let skeleton = t_pose(TPose {
            with_chest: false,
            ..Default::default()
        });
        let sampled = sample_skeleton(&skeleton, true).unwrap();

        assert_eq!(
            sampled.get(SegmentRole::Chest).map(|b| b.bone),
            Some(HumanoidBone::Spine)
        );
    }

    #[test]
    fn lower_limbs_end_at_their_tip_even_without_tip_segments() {
        let skeleton = t_pose(TPose::default());
        let sampled = sample_skeleton(&skeleton, false).unwrap();
        let hand = skeleton.lookup(HumanoidBone::LeftHand).unwrap();

        assert_eq!(
            sampled.get(SegmentRole::LowerArm(Side::Left)).unwrap().end,
            Some(hand.translation)
        );
        assert!(sampled.get(SegmentRole::Hand(Side::Left)).is_none());
    }

    #[test]
    fn forward_follows_knee_layout() {
        let forward = forward_direction(
            Vec3::new(0., 1., 0.),
            Vec3::new(0., 0.5, 0.1),
            Vec3::new(0., 0.5, -0.1),
        );
        assert!(forward.abs_diff_eq(Vec3::X, 1e-6));
    }
}
