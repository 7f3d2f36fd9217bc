//! Shared skeleton fixtures for unit tests.

use bevy::math::{Quat, Vec3};

use crate::{
    ragdoll::definition::Side,
    skeleton::{BoneId, Skeleton, humanoid::HumanoidBone, pose::BonePose},
};

/// Options for [`t_pose`].
pub struct TPose {
    /// Uniform scale applied to positions and to every bone's lossy scale.
    pub scale: f32,
    /// Rotation of the whole character around the world origin.
    pub rotation: Quat,
    pub with_tips: bool,
    pub with_chest: bool,
    pub with_head: bool,
}

impl Default for TPose {
    fn default() -> Self {
        Self {
            scale: 1.,
            rotation: Quat::IDENTITY,
            with_tips: true,
            with_chest: true,
            with_head: true,
        }
    }
}

/// Symmetric humanoid in a T-pose, facing +Z with its left side toward -X.
pub fn t_pose(options: TPose) -> Skeleton {
    let pose = |p: Vec3| BonePose {
        translation: options.rotation * (p * options.scale),
        rotation: options.rotation,
        scale: Vec3::splat(options.scale),
    };

    let mut skeleton = Skeleton::new("Armature", pose(Vec3::ZERO));
    let add = |skeleton: &mut Skeleton, parent: BoneId, name: &str, p: Vec3| {
        skeleton.add_bone(parent, name, pose(p)).unwrap()
    };
    let role = |skeleton: &mut Skeleton, role: HumanoidBone, bone: BoneId| {
        assert!(skeleton.set_humanoid(role, bone));
    };

    let root = skeleton.root();
    let hips = add(&mut skeleton, root, "Hips", Vec3::new(0., 1., 0.));
    role(&mut skeleton, HumanoidBone::Hips, hips);
    let spine = add(&mut skeleton, hips, "Spine", Vec3::new(0., 1.15, 0.));
    role(&mut skeleton, HumanoidBone::Spine, spine);

    let upper_body = if options.with_chest {
        let chest = add(&mut skeleton, spine, "Chest", Vec3::new(0., 1.3, 0.));
        role(&mut skeleton, HumanoidBone::Chest, chest);
        chest
    } else {
        spine
    };

    let neck = add(&mut skeleton, upper_body, "Neck", Vec3::new(0., 1.5, 0.));
    if options.with_head {
        let head = add(&mut skeleton, neck, "Head", Vec3::new(0., 1.6, 0.));
        role(&mut skeleton, HumanoidBone::Head, head);
        add(&mut skeleton, head, "HeadTop", Vec3::new(0., 1.8, 0.02));
    }

    for side in Side::ALL {
        // Left is toward -X.
        let x = side.sign();
        let (prefix, bones) = match side {
            Side::Left => (
                "Left",
                [
                    HumanoidBone::LeftUpperArm,
                    HumanoidBone::LeftLowerArm,
                    HumanoidBone::LeftHand,
                    HumanoidBone::LeftUpperLeg,
                    HumanoidBone::LeftLowerLeg,
                    HumanoidBone::LeftFoot,
                ],
            ),
            Side::Right => (
                "Right",
                [
                    HumanoidBone::RightUpperArm,
                    HumanoidBone::RightLowerArm,
                    HumanoidBone::RightHand,
                    HumanoidBone::RightUpperLeg,
                    HumanoidBone::RightLowerLeg,
                    HumanoidBone::RightFoot,
                ],
            ),
        };
        let [upper_arm_role, lower_arm_role, hand_role, upper_leg_role, lower_leg_role, foot_role] =
            bones;
        let name = |bone: &str| format!("{prefix}{bone}");

        let shoulder = add(
            &mut skeleton,
            upper_body,
            &name("Shoulder"),
            Vec3::new(0.1 * x, 1.45, 0.),
        );
        let upper_arm = add(
            &mut skeleton,
            shoulder,
            &name("UpperArm"),
            Vec3::new(0.2 * x, 1.45, 0.),
        );
        role(&mut skeleton, upper_arm_role, upper_arm);
        let lower_arm = add(
            &mut skeleton,
            upper_arm,
            &name("LowerArm"),
            Vec3::new(0.5 * x, 1.45, 0.),
        );
        role(&mut skeleton, lower_arm_role, lower_arm);

        let upper_leg = add(
            &mut skeleton,
            hips,
            &name("UpperLeg"),
            Vec3::new(0.1 * x, 0.95, 0.),
        );
        role(&mut skeleton, upper_leg_role, upper_leg);
        let lower_leg = add(
            &mut skeleton,
            upper_leg,
            &name("LowerLeg"),
            Vec3::new(0.1 * x, 0.5, 0.),
        );
        role(&mut skeleton, lower_leg_role, lower_leg);

        if options.with_tips {
            let hand = add(
                &mut skeleton,
                lower_arm,
                &name("Hand"),
                Vec3::new(0.75 * x, 1.45, 0.),
            );
            role(&mut skeleton, hand_role, hand);
            add(
                &mut skeleton,
                hand,
                &name("Thumb"),
                Vec3::new(0.8 * x, 1.43, 0.04),
            );
            let middle = add(
                &mut skeleton,
                hand,
                &name("Middle"),
                Vec3::new(0.85 * x, 1.45, 0.),
            );
            add(
                &mut skeleton,
                middle,
                &name("MiddleTip"),
                Vec3::new(0.93 * x, 1.45, 0.),
            );

            let foot = add(
                &mut skeleton,
                lower_leg,
                &name("Foot"),
                Vec3::new(0.1 * x, 0.08, 0.),
            );
            role(&mut skeleton, foot_role, foot);
            add(
                &mut skeleton,
                foot,
                &name("Toes"),
                Vec3::new(0.1 * x, 0., 0.15),
            );
        }
    }

    skeleton
}
