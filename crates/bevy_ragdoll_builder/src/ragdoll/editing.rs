//! Validated overrides applied to a generated rig after the fact.

use bevy::{
    log::info,
    math::{
        Vec3,
        primitives::{Cuboid, Sphere},
    },
};

use crate::{
    errors::RagdollError,
    ragdoll::{
        definition::{
            AxisCapsule, BodySegment, CapsuleAxis, ColliderShape, JointLimits, RagdollRig,
            SegmentRole,
        },
        joints::check_limits,
    },
    skeleton::{BoneId, COLLIDER_ROTATOR_SUFFIX, Skeleton, pose::BonePose},
};

/// Limits snap to multiples of this many degrees.
pub const LIMIT_STEP: f32 = 5.;
/// Swing limits below this many degrees are treated as fully locked.
pub const MIN_SWING: f32 = 10.;
pub const MIN_CAPSULE_HEIGHT: f32 = 0.01;

/// Whether an edit also applies to the segment on the other side of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symmetry {
    #[default]
    Single,
    Both,
}

/// End of a capsule moved by a resize. The other end keeps its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapsuleEnd {
    /// The end nearer the parent segment.
    Proximal,
    Distal,
}

fn snap(angle: f32) -> f32 {
    (angle / LIMIT_STEP).round() * LIMIT_STEP
}

fn snap_swing(angle: f32) -> f32 {
    let angle = snap(angle);
    if angle < MIN_SWING { 0. } else { angle }
}

/// Snaps every angle to [`LIMIT_STEP`] and locks swings below [`MIN_SWING`].
pub fn normalize_limits(limits: JointLimits) -> JointLimits {
    JointLimits::new(
        snap(limits.twist.min),
        snap(limits.twist.max),
        snap_swing(limits.swing1),
        snap_swing(limits.swing2),
    )
}

impl RagdollRig {
    /// Replaces the limits of the joint connecting `role` to its parent.
    ///
    /// With [`Symmetry::Both`], the counterpart joint receives the same limits: mirrored for arm
    /// joints, unchanged for leg joints. Returns the limits written to `role`.
    pub fn edit_joint_limits(
        &mut self,
        role: SegmentRole,
        limits: JointLimits,
        symmetry: Symmetry,
    ) -> Result<JointLimits, RagdollError> {
        let limits = normalize_limits(limits);
        check_limits(role, &limits)?;

        let joint = self
            .get_segment_mut(role)
            .and_then(|segment| segment.joint.as_mut())
            .ok_or(RagdollError::MissingSegment(role))?;
        joint.limits = limits;
        info!("Set {role:?} joint limits to {limits:?}");

        if symmetry == Symmetry::Both
            && let Some(counterpart) = role.symmetric()
            && let Some(joint) = self
                .get_segment_mut(counterpart)
                .and_then(|segment| segment.joint.as_mut())
        {
            joint.limits = if role.is_arm() {
                limits.mirrored()
            } else {
                limits
            };
        }

        Ok(limits)
    }

    /// Changes the radius and height of a capsule collider, keeping the end opposite to `moved`
    /// in place. Height never goes below [`MIN_CAPSULE_HEIGHT`].
    ///
    /// With [`Symmetry::Both`], the counterpart capsule gets the same radius and height and moves
    /// its own end of the same kind. Nothing is written if either segment has another shape.
    pub fn resize_capsule(
        &mut self,
        role: SegmentRole,
        radius: f32,
        height: f32,
        moved: CapsuleEnd,
        symmetry: Symmetry,
    ) -> Result<(), RagdollError> {
        let radius = radius.max(0.);
        let height = height.max(MIN_CAPSULE_HEIGHT);

        let mut resized = vec![];
        for target in self.edit_targets(role, symmetry) {
            let segment = self
                .get_segment(target)
                .ok_or(RagdollError::MissingSegment(target))?;
            let ColliderShape::Capsule(capsule) = segment.collider.shape else {
                return Err(RagdollError::ShapeMismatch(target));
            };

            let distal = self.distal_sign(segment, capsule.axis);
            let sign = match moved {
                CapsuleEnd::Proximal => -distal,
                CapsuleEnd::Distal => distal,
            };
            let center = segment.collider.center
                + capsule.axis.unit() * (height - capsule.height) / 2. * sign;

            resized.push((
                target,
                AxisCapsule {
                    radius,
                    height,
                    ..capsule
                },
                center,
            ));
        }

        for (target, capsule, center) in resized {
            if let Some(segment) = self.get_segment_mut(target) {
                segment.collider.shape = ColliderShape::Capsule(capsule);
                segment.collider.center = center;
            }
        }

        info!("Resized {role:?} capsule to radius {radius}, height {height}");
        Ok(())
    }

    /// Sets the full size of a box collider. Negative components are taken by magnitude.
    pub fn resize_box(&mut self, role: SegmentRole, size: Vec3) -> Result<(), RagdollError> {
        let segment = self
            .get_segment_mut(role)
            .ok_or(RagdollError::MissingSegment(role))?;
        let ColliderShape::Cuboid(cuboid) = &mut segment.collider.shape else {
            return Err(RagdollError::ShapeMismatch(role));
        };

        let size = size.abs();
        *cuboid = Cuboid::from_size(size);
        info!("Resized {role:?} box to {size}");
        Ok(())
    }

    /// Sets a sphere collider to `world_radius`, compensating for the bone's scale. Returns the
    /// radius stored in local space.
    pub fn resize_sphere(
        &mut self,
        role: SegmentRole,
        world_radius: f32,
    ) -> Result<f32, RagdollError> {
        let segment = self
            .get_segment_mut(role)
            .ok_or(RagdollError::MissingSegment(role))?;
        let ColliderShape::Sphere(sphere) = &mut segment.collider.shape else {
            return Err(RagdollError::ShapeMismatch(role));
        };

        *sphere = Sphere::new(world_radius.max(0.) / segment.pose.mean_scale());
        info!("Resized {role:?} sphere to radius {}", sphere.radius);
        Ok(sphere.radius)
    }

    /// Moves a collider so its center lands on `world_position`. Returns the new local center.
    pub fn set_collider_center(
        &mut self,
        role: SegmentRole,
        world_position: Vec3,
    ) -> Result<Vec3, RagdollError> {
        let segment = self
            .get_segment_mut(role)
            .ok_or(RagdollError::MissingSegment(role))?;
        let center = segment.pose.inverse_transform_point(world_position);
        segment.collider.center = center;
        Ok(center)
    }

    /// Replaces the twist and secondary axes of the joint connecting `role` to its parent. Both
    /// are stored normalized, in the child's local space.
    pub fn set_joint_axes(
        &mut self,
        role: SegmentRole,
        axis: Vec3,
        secondary_axis: Vec3,
    ) -> Result<(), RagdollError> {
        let axis = axis.normalize_or_zero();
        let secondary_axis = secondary_axis.normalize_or_zero();
        if axis.cross(secondary_axis).length_squared() < 1e-6 {
            return Err(RagdollError::InvalidJointAxes(role));
        }

        let joint = self
            .get_segment_mut(role)
            .and_then(|segment| segment.joint.as_mut())
            .ok_or(RagdollError::MissingSegment(role))?;
        joint.axis = axis;
        joint.secondary_axis = secondary_axis;

        info!("Set {role:?} joint axes to {axis} and {secondary_axis}");
        Ok(())
    }

    /// Overrides the center of mass of a segment, in its local space. `None` restores the
    /// collider-derived default.
    pub fn set_center_of_mass(
        &mut self,
        role: SegmentRole,
        center_of_mass: Option<Vec3>,
    ) -> Result<(), RagdollError> {
        self.get_segment_mut(role)
            .ok_or(RagdollError::MissingSegment(role))?
            .body
            .center_of_mass = center_of_mass;
        Ok(())
    }

    /// Adds a helper bone named `<bone>_ColliderRotator` under the segment's bone, placed at the
    /// collider's center and oriented like the bone.
    pub fn attach_collider_anchor(
        &self,
        skeleton: &mut Skeleton,
        role: SegmentRole,
    ) -> Result<BoneId, RagdollError> {
        let segment = self
            .get_segment(role)
            .ok_or(RagdollError::MissingSegment(role))?;
        let bone = skeleton
            .humanoid_bone(segment.bone)
            .ok_or(RagdollError::MissingSegment(role))?;
        let name = format!(
            "{}{COLLIDER_ROTATOR_SUFFIX}",
            skeleton.name(bone).unwrap_or_default()
        );

        let pose = BonePose {
            translation: segment.pose.transform_point(segment.collider.center),
            ..segment.pose
        };

        skeleton
            .add_bone(bone, name, pose)
            .ok_or(RagdollError::MissingSegment(role))
    }

    fn edit_targets(&self, role: SegmentRole, symmetry: Symmetry) -> Vec<SegmentRole> {
        let mut targets = vec![role];
        if symmetry == Symmetry::Both {
            targets.extend(role.symmetric());
        }
        targets
    }

    /// `1.` when the capsule's positive end points away from the parent segment, else `-1.`.
    fn distal_sign(&self, segment: &BodySegment, axis: CapsuleAxis) -> f32 {
        let limb = segment
            .parent
            .and_then(|parent| self.get_segment(parent))
            .map_or(Vec3::ZERO, |parent| {
                segment.pose.translation - parent.pose.translation
            });

        if segment.pose.transform_vector(axis.unit()).dot(limb) < 0. {
            -1.
        } else {
            1.
        }
    }
}
