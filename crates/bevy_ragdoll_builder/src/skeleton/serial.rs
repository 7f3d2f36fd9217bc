use serde::{Deserialize, Serialize};

use crate::{
    errors::LoaderError,
    skeleton::{Skeleton, humanoid::HumanoidBone, pose::BonePose},
};

/// On-disk description of a posed skeleton, usually stored in `*.skel.ron` files.
///
/// ```ron
/// (
///     root: (path: "Armature"),
///     bones: [
///         (path: "Armature/Hips", pose: (translation: (0., 1., 0.)), humanoid: Some(Hips)),
///     ],
/// )
/// ```
///
/// Bones must be listed after their parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkeletonSerial {
    pub root: BoneSerial,
    #[serde(default)]
    pub bones: Vec<BoneSerial>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoneSerial {
    /// Slash-separated names from the root to this bone.
    pub path: String,
    #[serde(default)]
    pub pose: BonePoseSerial,
    #[serde(default)]
    pub humanoid: Option<HumanoidBone>,
}

/// Same as [`BonePose`], with every field optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BonePoseSerial {
    pub translation: (f32, f32, f32),
    /// Quaternion as `(x, y, z, w)`.
    pub rotation: (f32, f32, f32, f32),
    pub scale: (f32, f32, f32),
}

impl Default for BonePoseSerial {
    fn default() -> Self {
        Self::from_value(&BonePose::IDENTITY)
    }
}

impl BonePoseSerial {
    pub fn from_value(pose: &BonePose) -> Self {
        let t = pose.translation;
        let r = pose.rotation;
        let s = pose.scale;
        Self {
            translation: (t.x, t.y, t.z),
            rotation: (r.x, r.y, r.z, r.w),
            scale: (s.x, s.y, s.z),
        }
    }

    pub fn to_value(&self) -> BonePose {
        let (tx, ty, tz) = self.translation;
        let (rx, ry, rz, rw) = self.rotation;
        let (sx, sy, sz) = self.scale;
        BonePose {
            translation: (tx, ty, tz).into(),
            rotation: bevy::math::Quat::from_xyzw(rx, ry, rz, rw).normalize(),
            scale: (sx, sy, sz).into(),
        }
    }
}

impl SkeletonSerial {
    pub fn from_ron(source: &str) -> Result<Self, LoaderError> {
        Ok(ron::de::from_str(source)?)
    }

    pub fn to_value(&self) -> Result<Skeleton, LoaderError> {
        if self.root.path.is_empty() || self.root.path.contains('/') {
            return Err(LoaderError::InvalidBonePath(self.root.path.clone()));
        }

        let mut skeleton = Skeleton::new(self.root.path.clone(), self.root.pose.to_value());
        if let Some(role) = self.root.humanoid {
            skeleton.set_humanoid(role, skeleton.root());
        }

        for bone in &self.bones {
            let (parent_path, name) = bone
                .path
                .rsplit_once('/')
                .filter(|(_, name)| !name.is_empty())
                .ok_or_else(|| LoaderError::InvalidBonePath(bone.path.clone()))?;

            let parent = skeleton
                .find_by_path(parent_path)
                .ok_or_else(|| LoaderError::UnknownParent(bone.path.clone()))?;
            let id = skeleton
                .add_bone(parent, name, bone.pose.to_value())
                .ok_or_else(|| LoaderError::UnknownParent(bone.path.clone()))?;

            if let Some(role) = bone.humanoid {
                skeleton.set_humanoid(role, id);
            }
        }

        Ok(skeleton)
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec3;

    use super::*;
    use crate::skeleton::humanoid::HumanoidPose;

    #[test]
    fn loads_hierarchy_and_roles() {
        let source = r#"(
            root: (path: "Armature"),
            bones: [
                (path: "Armature/Hips", pose: (translation: (0., 1., 0.)), humanoid: Some(Hips)),
                (path: "Armature/Hips/Spine", pose: (translation: (0., 1.2, 0.)), humanoid: Some(Spine)),
            ],
        )"#;

        let skeleton = SkeletonSerial::from_ron(source)
            .and_then(|serial| serial.to_value())
            .unwrap();

        assert_eq!(skeleton.bone_count(), 3);
        assert_eq!(
            skeleton.lookup(HumanoidBone::Spine).map(|p| p.translation),
            Some(Vec3::new(0., 1.2, 0.))
        );
        assert_eq!(
            skeleton.extent(HumanoidBone::Hips),
            Some(Vec3::new(0., 1.2, 0.))
        );
    }

    #[test]
    fn rejects_orphan_bones() {
        let serial = SkeletonSerial {
            root: BoneSerial {
                path: "Armature".into(),
                ..Default::default()
            },
            bones: vec![BoneSerial {
                path: "Armature/Missing/Hand".into(),
                ..Default::default()
            }],
        };

        assert!(matches!(
            serial.to_value(),
            Err(LoaderError::UnknownParent(path)) if path == "Armature/Missing/Hand"
        ));
    }
}
