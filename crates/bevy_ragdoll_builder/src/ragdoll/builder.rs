use bevy::log::{debug, info};
use indexmap::IndexMap;

use crate::{
    errors::RagdollError,
    ragdoll::{
        colliders::solve_colliders,
        configuration::RagdollConfig,
        definition::{BodySegment, BodySettings, RagdollRig},
        joints::solve_joints,
        mass::MassTable,
        sampler::sample_skeleton,
    },
    skeleton::{Skeleton, humanoid::HumanoidPose},
};

/// Generates a rig from a posed skeleton.
///
/// Runs the sampler, mass distribution, collider fitting and joint setup in sequence and checks
/// that the result is a single tree rooted at the pelvis. Nothing is returned on failure.
pub fn build_rig(
    pose: &impl HumanoidPose,
    config: &RagdollConfig,
) -> Result<RagdollRig, RagdollError> {
    let masses = MassTable::new(config.total_mass, config.create_tips)?;
    let sampled = sample_skeleton(pose, config.create_tips)?;
    let mut colliders = solve_colliders(&sampled)?;
    let mut joints = solve_joints(&sampled, config)?;

    let mut segments = IndexMap::new();
    for role in sampled.roles() {
        let bone = sampled
            .get(role)
            .ok_or(RagdollError::MissingSegment(role))?;
        let collider = colliders
            .swap_remove(&role)
            .ok_or(RagdollError::MissingSegment(role))?;
        let mass = masses
            .mass(role)
            .ok_or(RagdollError::MissingSegment(role))?;

        segments.insert(
            role,
            BodySegment {
                role,
                bone: bone.bone,
                pose: bone.pose,
                parent: role.parent(),
                collider: collider.into_collider(config.as_trigger),
                body: BodySettings {
                    mass,
                    linear_damping: config.linear_damping,
                    angular_damping: config.angular_damping,
                    use_gravity: config.use_gravity,
                    is_kinematic: config.is_kinematic,
                    collision_detection: config.collision_detection,
                    center_of_mass: None,
                },
                joint: joints.swap_remove(&role),
            },
        );
    }

    let rig = RagdollRig {
        forward: sampled.forward,
        segments,
    };
    rig.validate()?;

    info!(
        "Generated ragdoll with {} segments and {} joints",
        rig.segment_count(),
        rig.joint_count()
    );
    for segment in rig.iter_segments() {
        debug!(
            "{:?}: bone {:?}, mass {:.3}",
            segment.role, segment.bone, segment.body.mass
        );
    }

    Ok(rig)
}

/// Owns at most one generated rig for a skeleton.
///
/// Generating again requires [`RagdollBuilder::clear`] first, mirroring how a host would refuse to
/// add bodies to bones that already have them.
#[derive(Debug, Clone, Default)]
pub struct RagdollBuilder {
    pub config: RagdollConfig,
    rig: Option<RagdollRig>,
}

impl RagdollBuilder {
    pub fn new(config: RagdollConfig) -> Self {
        Self { config, rig: None }
    }

    pub fn rig(&self) -> Option<&RagdollRig> {
        self.rig.as_ref()
    }

    pub fn rig_mut(&mut self) -> Option<&mut RagdollRig> {
        self.rig.as_mut()
    }

    pub fn is_built(&self) -> bool {
        self.rig.is_some()
    }

    pub fn generate(&mut self, pose: &impl HumanoidPose) -> Result<&RagdollRig, RagdollError> {
        if self.rig.is_some() {
            return Err(RagdollError::AlreadyBuilt);
        }

        let rig = build_rig(pose, &self.config)?;
        Ok(self.rig.insert(rig))
    }

    /// Drops the rig and removes every collider anchor frame from `skeleton`.
    pub fn clear(&mut self, skeleton: &mut Skeleton) -> Option<RagdollRig> {
        let removed = skeleton.remove_helper_frames();
        let rig = self.rig.take();
        info!("Cleared ragdoll ({removed} helper bones removed)");
        rig
    }
}
