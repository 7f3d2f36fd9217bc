use bevy::{
    log::warn,
    math::{
        Vec3,
        primitives::{Cuboid, Sphere},
    },
};
use indexmap::IndexMap;

use crate::{
    errors::RagdollError,
    ragdoll::{
        definition::{AxisCapsule, CapsuleAxis, ColliderShape, SegmentCollider, SegmentRole, Side},
        sampler::SampledSkeleton,
    },
    skeleton::pose::BonePose,
    utils::geometry::dominant_axis,
};

const PELVIS_SIZE: Vec3 = Vec3::new(0.22, 0.21, 0.1);
const PELVIS_CENTER: Vec3 = Vec3::new(0., 0.06, -0.01);
const CHEST_SIZE: Vec3 = Vec3::new(0.3, 0.3, 0.15);
const CHEST_CENTER: Vec3 = Vec3::new(0., 0., -0.01);
const HEAD_RADIUS: f32 = 0.1;
const HEAD_CENTER: Vec3 = Vec3::new(0., 0.06, 0.02);

const UPPER_LIMB_RADIUS: f32 = 0.11;
const LOWER_LIMB_RADIUS: f32 = 0.075;
const TIP_LENGTH: f32 = 0.75;
const TIP_WIDTH: f32 = 0.125;

/// Collider shape and its center, in the local space of the bone it is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFit {
    pub shape: ColliderShape,
    pub center: Vec3,
}

impl ShapeFit {
    pub fn into_collider(self, is_trigger: bool) -> SegmentCollider {
        SegmentCollider {
            shape: self.shape,
            center: self.center,
            is_trigger,
        }
    }
}

pub fn pelvis_shape(pelvis: &BonePose) -> ShapeFit {
    ShapeFit {
        shape: ColliderShape::Cuboid(Cuboid::from_size(
            pelvis.inverse_transform_vector(PELVIS_SIZE).abs(),
        )),
        center: pelvis.inverse_transform_vector(PELVIS_CENTER),
    }
}

/// Box stacked on top of the pelvis box.
///
/// The vertical offset assumes a neutral rest pose: the chest box starts where the nominal pelvis
/// box ends, whatever the height of the chest bone above the pelvis bone.
pub fn chest_shape(chest: &BonePose, pelvis: &BonePose) -> ShapeFit {
    let offset = (PELVIS_SIZE.y + CHEST_SIZE.y) / 2. + PELVIS_CENTER.y
        - (chest.translation.y - pelvis.translation.y);

    ShapeFit {
        shape: ColliderShape::Cuboid(Cuboid::from_size(
            chest.inverse_transform_vector(CHEST_SIZE).abs(),
        )),
        center: chest.inverse_transform_vector(CHEST_CENTER + Vec3::Y * offset),
    }
}

/// Sphere whose world radius does not depend on the head's scale.
pub fn head_shape(head: &BonePose) -> ShapeFit {
    let scale_sum = head.scale.x + head.scale.y + head.scale.z;

    ShapeFit {
        shape: ColliderShape::Sphere(Sphere::new(HEAD_RADIUS * 3. / scale_sum)),
        center: head.inverse_transform_vector(HEAD_CENTER),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimbShapes {
    pub upper: ShapeFit,
    pub lower: ShapeFit,
    pub tip: Option<ShapeFit>,
}

/// Fits the colliders of one arm or leg.
///
/// * `end` is the world point the lower segment extends toward.
/// * `tip` is the hand or foot pose with the world point its box extends toward, if any.
pub fn limb_shapes(
    upper: &BonePose,
    lower: &BonePose,
    end: Vec3,
    tip: Option<(&BonePose, Option<Vec3>)>,
) -> LimbShapes {
    let total_length = upper.inverse_transform_point(end).length();

    let upper_end = upper.inverse_transform_point(lower.translation);
    let lower_end = lower.inverse_transform_point(end);

    let tip = tip.map(|(tip, extent)| {
        let tip_end = extent
            .map(|extent| tip.inverse_transform_point(extent))
            .unwrap_or(Vec3::ZERO);
        let direction = axis_or_up(tip_end).unit();
        let size = direction * tip_end.length() * TIP_LENGTH
            + (Vec3::ONE - direction) * total_length * TIP_WIDTH;

        ShapeFit {
            shape: ColliderShape::Cuboid(Cuboid::from_size(size)),
            center: tip_end / 2.,
        }
    });

    LimbShapes {
        upper: capsule_toward(upper_end, total_length * UPPER_LIMB_RADIUS),
        lower: capsule_toward(lower_end, total_length * LOWER_LIMB_RADIUS),
        tip,
    }
}

fn capsule_toward(bone_end: Vec3, radius: f32) -> ShapeFit {
    ShapeFit {
        shape: ColliderShape::Capsule(AxisCapsule {
            axis: axis_or_up(bone_end),
            radius,
            height: bone_end.length(),
        }),
        center: bone_end / 2.,
    }
}

fn axis_or_up(v: Vec3) -> CapsuleAxis {
    dominant_axis(v).unwrap_or(CapsuleAxis::Y)
}

/// Fits a collider to every sampled segment.
pub fn solve_colliders(
    sampled: &SampledSkeleton,
) -> Result<IndexMap<SegmentRole, ShapeFit>, RagdollError> {
    let pose = |role| {
        sampled
            .pose(role)
            .ok_or(RagdollError::MissingSegment(role))
    };

    let pelvis = pose(SegmentRole::Pelvis)?;
    let mut shapes = IndexMap::new();
    shapes.insert(SegmentRole::Pelvis, pelvis_shape(pelvis));
    shapes.insert(
        SegmentRole::Chest,
        chest_shape(pose(SegmentRole::Chest)?, pelvis),
    );
    shapes.insert(SegmentRole::Head, head_shape(pose(SegmentRole::Head)?));

    for side in Side::ALL {
        for [upper, lower, tip] in [
            [
                SegmentRole::UpperLeg(side),
                SegmentRole::LowerLeg(side),
                SegmentRole::Foot(side),
            ],
            [
                SegmentRole::UpperArm(side),
                SegmentRole::LowerArm(side),
                SegmentRole::Hand(side),
            ],
        ] {
            let upper_pose = pose(upper)?;
            let lower_bone = sampled
                .get(lower)
                .ok_or(RagdollError::MissingSegment(lower))?;
            let end = lower_bone.end.unwrap_or_else(|| {
                warn!("{lower:?} has no end point, its collider will have zero length");
                lower_bone.pose.translation
            });

            let tip_bone = if sampled.create_tips {
                Some(sampled.get(tip).ok_or(RagdollError::MissingSegment(tip))?)
            } else {
                None
            };
            if tip_bone.is_some_and(|bone| bone.end.is_none()) {
                warn!("{tip:?} has no descendants, its collider will have zero length");
            }

            let limb = limb_shapes(
                upper_pose,
                &lower_bone.pose,
                end,
                tip_bone.map(|bone| (&bone.pose, bone.end)),
            );

            shapes.insert(upper, limb.upper);
            shapes.insert(lower, limb.lower);
            if let Some(tip_shape) = limb.tip {
                shapes.insert(tip, tip_shape);
            }
        }
    }

    Ok(shapes)
}
