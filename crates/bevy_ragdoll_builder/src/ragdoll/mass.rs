use indexmap::IndexMap;

use crate::{errors::RagdollError, ragdoll::definition::SegmentRole};

/// Share of the lower limb's mass moved into the hand or foot when tips are created.
pub const TIP_SHARE: f32 = 0.3;

/// Fraction of the total mass carried by `role`, before any tip split.
///
/// The chest takes whatever the other segments leave, so the fractions of a full body always add
/// up to one.
pub fn base_fraction(role: SegmentRole) -> f32 {
    match role {
        SegmentRole::Pelvis => 0.29,
        SegmentRole::Head => 0.09,
        SegmentRole::UpperLeg(_) => 0.11,
        SegmentRole::LowerLeg(_) => 0.05,
        SegmentRole::UpperArm(_) => 0.04,
        SegmentRole::LowerArm(_) => 0.02,
        SegmentRole::Foot(_) | SegmentRole::Hand(_) => 0.,
        SegmentRole::Chest => {
            1. - SegmentRole::ALL
                .iter()
                .filter(|role| **role != SegmentRole::Chest)
                .map(|role| base_fraction(*role))
                .sum::<f32>()
        }
    }
}

/// Mass of every segment of a rig.
#[derive(Debug, Clone, PartialEq)]
pub struct MassTable {
    total: f32,
    fractions: IndexMap<SegmentRole, f32>,
}

impl MassTable {
    pub fn new(total: f32, create_tips: bool) -> Result<Self, RagdollError> {
        if !total.is_finite() || total <= 0. {
            return Err(RagdollError::InvalidTotalMass(total));
        }

        let mut fractions = IndexMap::new();
        for role in SegmentRole::ALL {
            let fraction = match role {
                SegmentRole::Foot(side) | SegmentRole::Hand(side) => {
                    if !create_tips {
                        continue;
                    }
                    let limb = if role.is_arm() {
                        SegmentRole::LowerArm(side)
                    } else {
                        SegmentRole::LowerLeg(side)
                    };
                    base_fraction(limb) * TIP_SHARE
                }
                SegmentRole::LowerLeg(_) | SegmentRole::LowerArm(_) if create_tips => {
                    base_fraction(role) * (1. - TIP_SHARE)
                }
                _ => base_fraction(role),
            };
            fractions.insert(role, fraction);
        }

        Ok(Self { total, fractions })
    }

    pub fn fraction(&self, role: SegmentRole) -> Option<f32> {
        self.fractions.get(&role).copied()
    }

    pub fn mass(&self, role: SegmentRole) -> Option<f32> {
        self.fraction(role).map(|fraction| fraction * self.total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentRole, f32)> + '_ {
        self.fractions
            .iter()
            .map(|(role, fraction)| (*role, fraction * self.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ragdoll::definition::Side;

    #[test]
    fn masses_add_up_to_the_total() {
        for create_tips in [true, false] {
            for total in [1., 60., 95.5] {
                let table = MassTable::new(total, create_tips).unwrap();
                let sum: f32 = table.iter().map(|(_, mass)| mass).sum();
                assert!((sum - total).abs() <= total * 1e-5, "{sum} != {total}");
            }
        }
    }

    #[test]
    fn pelvis_and_chest_shares() {
        let table = MassTable::new(60., true).unwrap();

        assert!((table.mass(SegmentRole::Pelvis).unwrap() - 17.4).abs() < 1e-4);
        assert!((table.fraction(SegmentRole::Chest).unwrap() - 0.18).abs() < 1e-6);
    }

    #[test]
    fn tips_take_a_share_of_the_lower_limb() {
        let with_tips = MassTable::new(100., true).unwrap();
        let without_tips = MassTable::new(100., false).unwrap();
        let leg = SegmentRole::LowerLeg(Side::Left);
        let foot = SegmentRole::Foot(Side::Left);

        assert!((with_tips.mass(foot).unwrap() - 1.5).abs() < 1e-4);
        assert!((with_tips.mass(leg).unwrap() - 3.5).abs() < 1e-4);
        assert!((without_tips.mass(leg).unwrap() - 5.).abs() < 1e-4);
        assert_eq!(without_tips.mass(foot), None);
        assert_eq!(
            with_tips.mass(SegmentRole::Hand(Side::Right)),
            with_tips.mass(SegmentRole::Hand(Side::Left))
        );
    }

    #[test]
    fn rejects_non_positive_totals() {
        assert_eq!(
            MassTable::new(0., true),
            Err(RagdollError::InvalidTotalMass(0.))
        );
        assert!(MassTable::new(f32::NAN, true).is_err());
        assert!(MassTable::new(-3., false).is_err());
    }
}
