use bevy::reflect::{Reflect, std_traits::ReflectDefault};
use serde::{Deserialize, Serialize};

use crate::{
    errors::LoaderError,
    ragdoll::definition::{JointLimits, SegmentRole, Side},
};

/// Determines:
/// * How the total mass is split and whether hands and feet become separate bodies.
/// * Rigid body flags and damping shared by every body.
/// * The drive and the angular limits applied to every joint.
///
/// Everything here is supplied by the caller; the generator never computes configuration.
#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct RagdollConfig {
    pub total_mass: f32,
    /// Create hands and feet as separate segments.
    pub create_tips: bool,
    pub use_gravity: bool,
    pub as_trigger: bool,
    pub is_kinematic: bool,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub angular_drive: AngularDrive,
    pub collision_detection: CollisionDetectionMode,
    pub joint_limits: JointLimitTable,
}

impl Default for RagdollConfig {
    fn default() -> Self {
        Self {
            total_mass: 60.,
            create_tips: true,
            use_gravity: true,
            as_trigger: false,
            is_kinematic: false,
            linear_damping: 1.,
            angular_damping: 25.,
            angular_drive: AngularDrive::default(),
            collision_detection: CollisionDetectionMode::default(),
            joint_limits: JointLimitTable::default(),
        }
    }
}

impl RagdollConfig {
    pub fn from_ron(source: &str) -> Result<Self, LoaderError> {
        Ok(ron::de::from_str(source)?)
    }

    pub fn to_ron(&self) -> Result<String, LoaderError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

/// Drive applied to the angular axes of every joint.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct AngularDrive {
    /// Higher values make the ragdoll hold its pose more stiffly.
    pub position_spring: f32,
    pub position_damper: f32,
    pub maximum_force: f32,
    pub use_acceleration: bool,
}

impl Default for AngularDrive {
    fn default() -> Self {
        Self {
            position_spring: 1000.,
            position_damper: 100.,
            maximum_force: 1000.,
            use_acceleration: true,
        }
    }
}

#[derive(Reflect, Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionDetectionMode {
    #[default]
    Discrete,
    Continuous,
    ContinuousDynamic,
    ContinuousSpeculative,
}

/// Angular limits per joint. Arm limits are given for the left side; the right side uses the
/// mirrored range. Leg limits apply to both sides unchanged.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct JointLimitTable {
    pub chest: JointLimits,
    pub head: JointLimits,
    pub upper_leg: JointLimits,
    pub lower_leg: JointLimits,
    pub foot: JointLimits,
    pub upper_arm: JointLimits,
    pub lower_arm: JointLimits,
    pub hand: JointLimits,
}

impl Default for JointLimitTable {
    fn default() -> Self {
        Self {
            chest: JointLimits::new(-45., 20., 20., 20.),
            head: JointLimits::new(-45., 20., 20., 20.),
            upper_leg: JointLimits::new(-10., 120., 90., 20.),
            lower_leg: JointLimits::new(-120., 0., 10., 20.),
            foot: JointLimits::new(-70., 70., 45., 20.),
            upper_arm: JointLimits::new(-100., 30., 100., 45.),
            lower_arm: JointLimits::new(-120., 0., 10., 90.),
            hand: JointLimits::new(-90., 90., 90., 45.),
        }
    }
}

impl JointLimitTable {
    /// Limits for the joint connecting `role` to its parent. `None` for the pelvis.
    pub fn limits_for(&self, role: SegmentRole) -> Option<JointLimits> {
        let for_arm = |limits: JointLimits, side: Side| match side {
            Side::Left => limits,
            Side::Right => limits.mirrored(),
        };

        match role {
            SegmentRole::Pelvis => None,
            SegmentRole::Chest => Some(self.chest),
            SegmentRole::Head => Some(self.head),
            SegmentRole::UpperLeg(_) => Some(self.upper_leg),
            SegmentRole::LowerLeg(_) => Some(self.lower_leg),
            SegmentRole::Foot(_) => Some(self.foot),
            SegmentRole::UpperArm(side) => Some(for_arm(self.upper_arm, side)),
            SegmentRole::LowerArm(side) => Some(for_arm(self.lower_arm, side)),
            SegmentRole::Hand(side) => Some(for_arm(self.hand, side)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_arm_limits_are_mirrored() {
        let table = JointLimitTable::default();

        assert_eq!(
            table.limits_for(SegmentRole::UpperArm(Side::Right)),
            Some(JointLimits::new(-30., 100., 100., 45.))
        );
        assert_eq!(
            table.limits_for(SegmentRole::LowerArm(Side::Right)),
            Some(JointLimits::new(0., 120., 10., 90.))
        );
        assert_eq!(
            table.limits_for(SegmentRole::Hand(Side::Right)),
            table.limits_for(SegmentRole::Hand(Side::Left))
        );
        assert_eq!(
            table.limits_for(SegmentRole::UpperLeg(Side::Right)),
            table.limits_for(SegmentRole::UpperLeg(Side::Left))
        );
        assert_eq!(table.limits_for(SegmentRole::Pelvis), None);
    }

    #[test]
    fn partial_ron_falls_back_to_defaults() {
        let config = RagdollConfig::from_ron("(total_mass: 80., create_tips: false)").unwrap();

        assert_eq!(config.total_mass, 80.);
        assert!(!config.create_tips);
        assert_eq!(config.angular_damping, 25.);
        assert_eq!(config.angular_drive, AngularDrive::default());
    }

    #[test]
    fn loads_sample_config_file() {
        let config =
            RagdollConfig::from_ron(include_str!("../../../../assets/ragdolls/heavy.ragdoll.ron"))
                .unwrap();

        assert_eq!(config.total_mass, 90.);
        assert_eq!(
            config.collision_detection,
            CollisionDetectionMode::ContinuousSpeculative
        );
        assert_eq!(config.angular_drive.maximum_force, 1000.);
        assert_eq!(config.joint_limits.upper_leg, JointLimits::new(-20., 100., 60., 20.));
        assert_eq!(config.joint_limits.head, JointLimitTable::default().head);
    }

    #[test]
    fn ron_round_trip_keeps_limit_overrides() {
        let mut config = RagdollConfig::default();
        config.joint_limits.upper_leg = JointLimits::new(-20., 100., 60., 10.);

        let parsed = RagdollConfig::from_ron(&config.to_ron().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
