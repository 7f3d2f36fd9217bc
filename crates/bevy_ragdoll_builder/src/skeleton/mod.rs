pub mod humanoid;
pub mod pose;
pub mod serial;

use std::fmt::Debug;

use bevy::{math::Vec3, platform::collections::HashMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use humanoid::{HumanoidBone, HumanoidPose};
use pose::BonePose;

/// Suffix given to the helper bone placed at a collider's center.
pub const COLLIDER_ROTATOR_SUFFIX: &str = "_ColliderRotator";

/// Bones whose name ends with one of these suffixes are authoring helpers, not part of the
/// skeleton proper. They are removed when a ragdoll is cleared.
pub const HELPER_FRAME_SUFFIXES: [&str; 2] = [COLLIDER_ROTATOR_SUFFIX, "_ColliderAnchor"];

#[derive(Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId {
    id: Uuid,
}

impl BoneId {
    /// Bone ids are derived from the slash-separated path of names from the root, so the same
    /// hierarchy always produces the same ids.
    pub fn from_path(path: &str) -> Self {
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, path.as_bytes()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Debug for BoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.id.fmt(f)
    }
}

/// A posed bone hierarchy with an optional humanoid role mapping.
///
/// Poses are stored in world space: the skeleton is a frozen snapshot, not a live transform tree.
#[derive(Clone, Default)]
pub struct Skeleton {
    root: BoneId,
    paths: HashMap<BoneId, String>,
    names: HashMap<BoneId, String>,
    poses: HashMap<BoneId, BonePose>,
    children_map: HashMap<BoneId, Vec<BoneId>>,
    parent_map: HashMap<BoneId, BoneId>,
    humanoid: HashMap<HumanoidBone, BoneId>,
}

impl Skeleton {
    pub fn new(root_name: impl Into<String>, root_pose: BonePose) -> Self {
        let name = root_name.into();
        let root = BoneId::from_path(&name);

        let mut skeleton = Self {
            root,
            ..Default::default()
        };
        skeleton.paths.insert(root, name.clone());
        skeleton.names.insert(root, name);
        skeleton.poses.insert(root, root_pose);
        skeleton.children_map.insert(root, vec![]);
        skeleton
    }

    /// Adds a bone under `parent`. Returns `None` if the parent is not in this skeleton. Adding a
    /// bone whose path already exists only updates its pose.
    pub fn add_bone(
        &mut self,
        parent: BoneId,
        name: impl Into<String>,
        pose: BonePose,
    ) -> Option<BoneId> {
        let name = name.into();
        let path = format!("{}/{}", self.paths.get(&parent)?, name);
        let id = BoneId::from_path(&path);

        if self.paths.contains_key(&id) {
            self.poses.insert(id, pose);
            return Some(id);
        }

        self.paths.insert(id, path);
        self.names.insert(id, name);
        self.poses.insert(id, pose);
        self.children_map.insert(id, vec![]);
        self.children_map.entry(parent).or_default().push(id);
        self.parent_map.insert(id, parent);

        Some(id)
    }

    /// Assigns a humanoid role to a bone. Returns false if the bone does not exist.
    pub fn set_humanoid(&mut self, role: HumanoidBone, bone: BoneId) -> bool {
        if !self.has_id(&bone) {
            return false;
        }
        self.humanoid.insert(role, bone);
        true
    }

    pub fn humanoid_bone(&self, role: HumanoidBone) -> Option<BoneId> {
        self.humanoid.get(&role).copied()
    }

    pub fn root(&self) -> BoneId {
        self.root
    }

    pub fn parent(&self, id: &BoneId) -> Option<BoneId> {
        self.parent_map.get(id).copied()
    }

    pub fn children(&self, id: BoneId) -> &[BoneId] {
        self.children_map
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn name(&self, id: BoneId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn pose(&self, id: BoneId) -> Option<&BonePose> {
        self.poses.get(&id)
    }

    pub fn has_id(&self, id: &BoneId) -> bool {
        self.paths.contains_key(id)
    }

    pub fn bone_count(&self) -> usize {
        self.paths.len()
    }

    pub fn find_by_path(&self, path: &str) -> Option<BoneId> {
        let id = BoneId::from_path(path);
        self.has_id(&id).then_some(id)
    }

    pub fn is_helper_frame(&self, id: BoneId) -> bool {
        self.name(id).is_some_and(|name| {
            HELPER_FRAME_SUFFIXES
                .iter()
                .any(|suffix| name.ends_with(suffix))
        })
    }

    /// All descendants of `id` in depth-first order, skipping helper frames and everything below
    /// them.
    pub fn descendants(&self, id: BoneId) -> Vec<BoneId> {
        let mut out = vec![];
        let mut stack: Vec<BoneId> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            if self.is_helper_frame(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }

        out
    }

    /// Removes `id` and everything below it. The root cannot be removed. Returns the number of
    /// bones removed.
    pub fn remove_subtree(&mut self, id: BoneId) -> usize {
        if id == self.root || !self.has_id(&id) {
            return 0;
        }

        if let Some(parent) = self.parent_map.get(&id).copied()
            && let Some(siblings) = self.children_map.get_mut(&parent)
        {
            siblings.retain(|child| *child != id);
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(children) = self.children_map.remove(&next) {
                stack.extend(children);
            }
            self.paths.remove(&next);
            self.names.remove(&next);
            self.poses.remove(&next);
            self.parent_map.remove(&next);
            removed += 1;
        }

        self.humanoid.retain(|_, bone| self.paths.contains_key(bone));

        removed
    }

    /// Recursively removes every helper frame (see [`HELPER_FRAME_SUFFIXES`]) together with its
    /// subtree. Returns the number of bones removed.
    pub fn remove_helper_frames(&mut self) -> usize {
        let mut helpers = vec![];
        let mut stack = vec![self.root];

        while let Some(next) = stack.pop() {
            for child in self.children(next) {
                if self.is_helper_frame(*child) {
                    helpers.push(*child);
                } else {
                    stack.push(*child);
                }
            }
        }

        helpers
            .into_iter()
            .map(|helper| self.remove_subtree(helper))
            .sum()
    }

    fn indent(f: &mut std::fmt::Formatter<'_>, level: u32) -> std::fmt::Result {
        if level == 0 {
            return Ok(());
        }
        for _ in 0..(level - 1) {
            write!(f, "┃ ")?;
        }
        write!(f, "┣━")?;
        Ok(())
    }

    fn fmt_level(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        level: u32,
        bone: BoneId,
    ) -> std::fmt::Result {
        Self::indent(f, level)?;
        writeln!(f, "🦴 {:?} [{:?}]", self.name(bone).unwrap_or_default(), bone)?;
        for child in self.children(bone) {
            self.fmt_level(f, level + 1, *child)?;
        }
        Ok(())
    }
}

impl Debug for Skeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_level(f, 0, self.root)
    }
}

impl HumanoidPose for Skeleton {
    fn root_pose(&self) -> BonePose {
        self.pose(self.root).copied().unwrap_or_default()
    }

    fn lookup(&self, bone: HumanoidBone) -> Option<BonePose> {
        self.humanoid_bone(bone)
            .and_then(|id| self.pose(id))
            .copied()
    }

    fn extent(&self, bone: HumanoidBone) -> Option<Vec3> {
        let id = self.humanoid_bone(bone)?;
        let origin = self.pose(id)?.translation;

        self.descendants(id)
            .into_iter()
            .filter_map(|descendant| self.pose(descendant))
            .map(|pose| pose.translation)
            .max_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Skeleton, BoneId, BoneId, BoneId) {
        let mut skeleton = Skeleton::new("root", BonePose::IDENTITY);
        let hand = skeleton
            .add_bone(skeleton.root(), "hand", BonePose::from_translation(Vec3::X))
            .unwrap();
        let short = skeleton
            .add_bone(hand, "thumb", BonePose::from_translation(Vec3::new(1.1, 0.1, 0.)))
            .unwrap();
        let long = skeleton
            .add_bone(hand, "middle", BonePose::from_translation(Vec3::new(1.2, 0., 0.)))
            .unwrap();
        (skeleton, hand, short, long)
    }

    #[test]
    fn ids_are_stable_per_path() {
        let (skeleton, hand, _, _) = chain();
        assert_eq!(skeleton.find_by_path("root/hand"), Some(hand));
        assert_eq!(BoneId::from_path("root/hand"), hand);
        assert_eq!(skeleton.parent(&hand), Some(skeleton.root()));
    }

    #[test]
    fn extent_picks_farthest_descendant() {
        let (mut skeleton, hand, _, long) = chain();
        skeleton.set_humanoid(HumanoidBone::LeftHand, hand);
        let tip = skeleton.add_bone(long, "tip", BonePose::from_translation(Vec3::new(1.5, 0., 0.)));
        assert!(tip.is_some());

        assert_eq!(
            skeleton.extent(HumanoidBone::LeftHand),
            Some(Vec3::new(1.5, 0., 0.))
        );
    }

    #[test]
    fn extent_ignores_helper_frames() {
        let (mut skeleton, hand, _, _) = chain();
        skeleton.set_humanoid(HumanoidBone::LeftHand, hand);
        skeleton.add_bone(
            hand,
            format!("hand{COLLIDER_ROTATOR_SUFFIX}"),
            BonePose::from_translation(Vec3::new(10., 0., 0.)),
        );

        assert_eq!(
            skeleton.extent(HumanoidBone::LeftHand),
            Some(Vec3::new(1.2, 0., 0.))
        );
    }

    #[test]
    fn leaf_has_no_extent() {
        let (mut skeleton, _, short, _) = chain();
        skeleton.set_humanoid(HumanoidBone::LeftHand, short);
        assert_eq!(skeleton.extent(HumanoidBone::LeftHand), None);
    }

    #[test]
    fn remove_helper_frames_is_recursive() {
        let (mut skeleton, hand, short, long) = chain();
        let anchor = skeleton
            .add_bone(
                short,
                format!("thumb{COLLIDER_ROTATOR_SUFFIX}"),
                BonePose::IDENTITY,
            )
            .unwrap();
        skeleton.add_bone(anchor, "nested", BonePose::IDENTITY);
        skeleton.add_bone(
            hand,
            "hand_ColliderAnchor",
            BonePose::IDENTITY,
        );
        assert_eq!(skeleton.bone_count(), 7);

        assert_eq!(skeleton.remove_helper_frames(), 3);
        assert_eq!(skeleton.bone_count(), 4);
        assert!(!skeleton.has_id(&anchor));
        assert_eq!(skeleton.children(short), &[] as &[BoneId]);
        assert_eq!(skeleton.children(hand), &[short, long] as &[BoneId]);
    }

    #[test]
    fn helper_frames_need_a_known_suffix() {
        let (mut skeleton, hand, _, _) = chain();
        let rotator = skeleton
            .add_bone(hand, "hand_ColliderRotator", BonePose::IDENTITY)
            .unwrap();
        let anchor = skeleton
            .add_bone(hand, "hand_ColliderAnchor", BonePose::IDENTITY)
            .unwrap();
        let lookalike = skeleton
            .add_bone(hand, "ColliderRotator_hand", BonePose::IDENTITY)
            .unwrap();

        assert!(skeleton.is_helper_frame(rotator));
        assert!(skeleton.is_helper_frame(anchor));
        assert!(!skeleton.is_helper_frame(lookalike));
        assert_eq!(skeleton.remove_helper_frames(), 2);
        assert!(skeleton.has_id(&lookalike));
    }

    #[test]
    fn removing_a_subtree_drops_humanoid_roles() {
        let (mut skeleton, hand, _, _) = chain();
        skeleton.set_humanoid(HumanoidBone::LeftHand, hand);

        assert_eq!(skeleton.remove_subtree(hand), 3);
        assert_eq!(skeleton.humanoid_bone(HumanoidBone::LeftHand), None);
        assert_eq!(skeleton.remove_subtree(skeleton.root()), 0);
    }
}
