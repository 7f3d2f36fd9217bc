use bevy::math::Vec3;

use crate::ragdoll::definition::CapsuleAxis;

/// Below this length a bone vector is treated as zero and has no direction.
pub const MIN_BONE_LENGTH: f32 = 1e-6;

/// Local axis along which `v` has the largest magnitude, or `None` for a zero-length vector.
///
/// Ties resolve toward the later axis, so a vector along the XY diagonal maps to Y.
pub fn dominant_axis(v: Vec3) -> Option<CapsuleAxis> {
    if v.length() < MIN_BONE_LENGTH {
        return None;
    }

    let a = v.abs();
    Some(if a.x > a.y && a.x > a.z {
        CapsuleAxis::X
    } else if a.y > a.z {
        CapsuleAxis::Y
    } else {
        CapsuleAxis::Z
    })
}
