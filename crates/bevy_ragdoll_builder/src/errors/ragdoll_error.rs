use thiserror::Error;

use crate::{ragdoll::definition::SegmentRole, skeleton::humanoid::HumanoidBone};

/// Possible errors produced while generating or editing a ragdoll rig.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RagdollError {
    #[error("Skeleton is missing required bones: {0:?}")]
    IncompleteSkeleton(Vec<HumanoidBone>),
    #[error("Wrong limitation on {segment:?}: low twist {low} exceeds high twist {high}")]
    InvalidJointLimit {
        segment: SegmentRole,
        low: f32,
        high: f32,
    },
    #[error("A ragdoll was already built for this skeleton. Clear it before generating again.")]
    AlreadyBuilt,
    #[error("Total mass must be positive and finite, got {0}")]
    InvalidTotalMass(f32),
    #[error("Segment {0:?} is not connected to its parent segment")]
    DisconnectedSegment(SegmentRole),
    #[error("Ragdoll has no segment {0:?}")]
    MissingSegment(SegmentRole),
    #[error("Segment {0:?} does not have a collider of the edited shape")]
    ShapeMismatch(SegmentRole),
    #[error("Joint axes of {0:?} must be non-zero and not parallel")]
    InvalidJointAxes(SegmentRole),
}
