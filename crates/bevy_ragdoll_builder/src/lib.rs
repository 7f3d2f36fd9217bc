//! # Bevy Ragdoll Builder
//!
//! Generates physics ragdoll rigs from posed humanoid skeletons.
//!
//! A rig is a tree of rigid body segments rooted at the pelvis. Every segment carries a collider
//! fitted to its bone, a share of the total body mass, and (except for the pelvis) a joint to its
//! parent with angular limits. The rig is plain data: the host engine is responsible for turning it
//! into bodies, colliders and joints.
//!
//! ## Inputs
//!
//! - A posed skeleton, either a [`Skeleton`] loaded from a `*.skel.ron` file (see
//!   [`SkeletonSerial`]) or any type implementing [`HumanoidPose`].
//! - A [`RagdollConfig`], usually loaded from a RON file. Missing fields take their default
//!   values:
//!   ```ron
//!   (
//!       total_mass: 80.,
//!       create_tips: false,
//!       joint_limits: (
//!           upper_leg: (twist: (min: -20., max: 100.), swing1: 60., swing2: 20.),
//!       ),
//!   )
//!   ```
//!
//! ## Generation
//!
//! [`RagdollBuilder::generate`] samples the skeleton, distributes the mass, fits colliders and
//! configures joints, in that order. A builder holds at most one rig: generating again fails with
//! [`RagdollError::AlreadyBuilt`] until [`RagdollBuilder::clear`] is called. For one-off use,
//! [`build_rig`] does the same without the guard.
//!
//! Once built, a rig can be tuned with the editing operations on [`RagdollRig`], such as
//! [`RagdollRig::edit_joint_limits`], which keep joints valid and optionally apply the same edit
//! to the opposite side of the body.
//!
//! [`Skeleton`]: crate::skeleton::Skeleton
//! [`SkeletonSerial`]: crate::skeleton::serial::SkeletonSerial
//! [`HumanoidPose`]: crate::skeleton::humanoid::HumanoidPose
//! [`RagdollConfig`]: crate::ragdoll::configuration::RagdollConfig
//! [`RagdollBuilder::generate`]: crate::ragdoll::builder::RagdollBuilder::generate
//! [`RagdollBuilder::clear`]: crate::ragdoll::builder::RagdollBuilder::clear
//! [`RagdollError::AlreadyBuilt`]: crate::errors::RagdollError::AlreadyBuilt
//! [`build_rig`]: crate::ragdoll::builder::build_rig
//! [`RagdollRig`]: crate::ragdoll::definition::RagdollRig
//! [`RagdollRig::edit_joint_limits`]: crate::ragdoll::definition::RagdollRig::edit_joint_limits

pub mod errors;
pub mod ragdoll;
pub mod skeleton;
mod utils;

#[cfg(test)]
mod test_utils;

pub mod prelude {
    pub use super::errors::{LoaderError, RagdollError};
    pub use super::ragdoll::builder::{RagdollBuilder, build_rig};
    pub use super::ragdoll::configuration::{
        AngularDrive, CollisionDetectionMode, JointLimitTable, RagdollConfig,
    };
    pub use super::ragdoll::definition::*;
    pub use super::ragdoll::editing::{CapsuleEnd, Symmetry};
    pub use super::skeleton::{
        BoneId, Skeleton,
        humanoid::{HumanoidBone, HumanoidPose},
        pose::BonePose,
        serial::SkeletonSerial,
    };
}
