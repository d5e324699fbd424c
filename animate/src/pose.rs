use rig_math::{Mat4, Transform};

/// Structural problem in pose hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoseError {
    #[error("Joint {joint} refers to parent {parent} but pose has only {len} joints")]
    ParentOutOfRange {
        joint: usize,
        parent: usize,
        len: usize,
    },

    #[error("Parent chain of joint {joint} does not reach a root")]
    Cycle { joint: usize },
}

/// Single node of the hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub struct Joint {
    /// Transform relative to parent joint.
    pub local: Transform,

    /// Index of parent joint. `None` for roots.
    pub parent: Option<usize>,
}

/// Hierarchy snapshot: local transform and parent link for every joint.
///
/// Parent links are expected to form a forest. Mutation does not check that,
/// use [`Pose::validate`] when the links come from untrusted data.
/// Global transforms are derived on demand by walking the parent chain.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    joints: Vec<Joint>,
}

impl Pose {
    pub fn new() -> Self {
        Pose { joints: Vec::new() }
    }

    /// Pose of `len` root joints with identity transforms.
    pub fn with_len(len: usize) -> Self {
        Pose {
            joints: vec![Joint::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Grows or shrinks the pose to `len` joints.
    ///
    /// Existing joints are preserved up to the new length. New joints are
    /// roots with identity transform. Shrinking may leave remaining joints
    /// pointing at removed parents.
    pub fn resize(&mut self, len: usize) {
        tracing::trace!("Resize pose from {} to {} joints", self.len(), len);
        self.joints.resize(len, Joint::default());
    }

    pub fn parent(&self, id: usize) -> Option<usize> {
        self.joints[id].parent
    }

    /// # Panics
    ///
    /// If either `id` or `parent` is not a joint of this pose.
    pub fn set_parent(&mut self, id: usize, parent: Option<usize>) {
        let len = self.len();
        assert!(id < len, "Joint {} is out of range 0..{}", id, len);
        if let Some(parent) = parent {
            assert!(
                parent < len,
                "Parent {} of joint {} is out of range 0..{}",
                parent,
                id,
                len
            );
        }
        tracing::trace!("Set parent of joint {} to {:?}", id, parent);
        self.joints[id].parent = parent;
    }

    pub fn local_transform(&self, id: usize) -> Transform {
        self.joints[id].local
    }

    pub fn set_local_transform(&mut self, id: usize, transform: Transform) {
        self.joints[id].local = transform;
    }

    /// Transform of the joint relative to the hierarchy root.
    ///
    /// Ancestors are folded in one by one, each one acting as the parent
    /// frame of everything accumulated below it.
    ///
    /// # Panics
    ///
    /// If `id` is out of range or the parent chain is broken.
    /// See [`try_global_transform`](Self::try_global_transform).
    pub fn global_transform(&self, id: usize) -> Transform {
        match self.try_global_transform(id) {
            Ok(transform) => transform,
            Err(err) => panic!("Malformed pose: {}", err),
        }
    }

    /// Same as [`global_transform`](Self::global_transform) but reports
    /// broken parent chains instead of panicking.
    ///
    /// The walk is bounded by [`len`](Self::len) hops, any longer chain
    /// must contain a cycle.
    ///
    /// # Panics
    ///
    /// If `id` is out of range.
    pub fn try_global_transform(
        &self,
        id: usize,
    ) -> Result<Transform, PoseError> {
        let len = self.len();
        let mut result = self.joints[id].local;
        let mut joint = id;

        for _ in 0..len {
            match self.joints[joint].parent {
                None => return Ok(result),
                Some(parent) if parent >= len => {
                    return Err(PoseError::ParentOutOfRange {
                        joint,
                        parent,
                        len,
                    })
                }
                Some(parent) => {
                    result = self.joints[parent].local.combine(&result);
                    joint = parent;
                }
            }
        }

        Err(PoseError::Cycle { joint: id })
    }

    pub fn global_matrix(&self, id: usize) -> Mat4 {
        self.global_transform(id).to_mat4()
    }

    /// Global matrix of every joint, in joint order.
    pub fn global_matrices(&self) -> Vec<Mat4> {
        let mut matrices = Vec::with_capacity(self.len());
        self.global_matrices_into(&mut matrices);
        matrices
    }

    /// Replaces content of `out` with global matrix of every joint.
    pub fn global_matrices_into(&self, out: &mut Vec<Mat4>) {
        out.clear();
        out.extend((0..self.len()).map(|id| self.global_matrix(id)));
    }

    /// Checks that every parent link is in range and every joint reaches a
    /// root.
    pub fn validate(&self) -> Result<(), PoseError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Done,
        }

        let len = self.len();
        let mut marks = vec![Mark::Unvisited; len];
        let mut chain = Vec::new();

        for start in 0..len {
            let mut joint = start;
            loop {
                match marks[joint] {
                    Mark::Done => break,
                    Mark::Visiting => return Err(PoseError::Cycle { joint }),
                    Mark::Unvisited => {}
                }

                marks[joint] = Mark::Visiting;
                chain.push(joint);

                match self.joints[joint].parent {
                    None => break,
                    Some(parent) if parent >= len => {
                        return Err(PoseError::ParentOutOfRange {
                            joint,
                            parent,
                            len,
                        })
                    }
                    Some(parent) => joint = parent,
                }
            }

            for joint in chain.drain(..) {
                marks[joint] = Mark::Done;
            }
        }

        Ok(())
    }

    /// Mixes local transforms of two poses joint by joint.
    /// Hierarchy is taken from `a`.
    ///
    /// # Panics
    ///
    /// If poses have different number of joints.
    pub fn blend(a: &Pose, b: &Pose, t: f32) -> Pose {
        assert_eq!(
            a.len(),
            b.len(),
            "Blended poses must have the same number of joints"
        );

        Pose {
            joints: a
                .joints
                .iter()
                .zip(&b.joints)
                .map(|(a, b)| Joint {
                    local: a.local.mix(&b.local, t),
                    parent: a.parent,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rig_math::{Quat, Vec3},
    };

    fn chain(positions: &[Vec3]) -> Pose {
        let mut pose = Pose::with_len(positions.len());
        for (id, &position) in positions.iter().enumerate() {
            pose.set_local_transform(id, Transform::from_position(position));
            if id > 0 {
                pose.set_parent(id, Some(id - 1));
            }
        }
        pose
    }

    #[test]
    fn resize_keeps_entries() {
        let mut pose = chain(&[Vec3::ZERO, Vec3::X]);
        pose.resize(4);
        assert_eq!(pose.len(), 4);
        assert_eq!(pose.joints().len(), 4);
        assert_eq!(pose.parent(1), Some(0));
        assert_eq!(pose.local_transform(1).position, Vec3::X);
        assert_eq!(pose.parent(3), None);
        assert_eq!(pose.local_transform(3), Transform::IDENTITY);

        pose.resize(1);
        assert_eq!(pose.len(), 1);
        pose.resize(0);
        assert!(pose.is_empty());
    }

    #[test]
    fn root_global_is_local() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_axis_angle(Vec3::Y, 0.3),
            Vec3::new(1.0, 2.0, 0.5),
        );
        let mut pose = Pose::with_len(1);
        pose.set_local_transform(0, t);

        let global = pose.global_transform(0);
        assert_eq!(global.position.to_array(), t.position.to_array());
        assert_eq!(global.rotation.to_array(), t.rotation.to_array());
        assert_eq!(global.scale.to_array(), t.scale.to_array());
    }

    #[test]
    fn chain_accumulates_offsets() {
        let pose = chain(&[Vec3::ZERO, Vec3::X, Vec3::X]);
        assert_eq!(pose.global_transform(2).position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn chain_matches_nested_combine() {
        let root = Transform::new(
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_axis_angle(Vec3::Z, 0.5),
            Vec3::splat(2.0),
        );
        let mid = Transform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(Vec3::X, -0.25),
            Vec3::splat(0.5),
        );
        let leaf = Transform::new(
            Vec3::new(0.0, 0.0, 3.0),
            Quat::from_axis_angle(Vec3::Y, 1.0),
            Vec3::ONE,
        );

        let mut pose = Pose::with_len(3);
        pose.set_local_transform(0, root);
        pose.set_local_transform(1, mid);
        pose.set_local_transform(2, leaf);
        pose.set_parent(1, Some(0));
        pose.set_parent(2, Some(1));

        let expected = root.combine(&mid).combine(&leaf);
        assert_eq!(pose.global_transform(2), expected);
        assert_eq!(pose.global_transform(1), root.combine(&mid));
    }

    #[test]
    fn matrices_follow_joint_order() {
        let pose = chain(&[Vec3::Y, Vec3::X, Vec3::X]);
        let matrices = pose.global_matrices();
        assert_eq!(matrices.len(), 3);
        for (id, m) in matrices.iter().enumerate() {
            assert_eq!(*m, pose.global_transform(id).to_mat4());
        }
        assert_eq!(matrices[2].position().truncate(), Vec3::new(2.0, 1.0, 0.0));

        let mut reused = vec![Mat4::ZERO; 7];
        pose.global_matrices_into(&mut reused);
        assert_eq!(reused, matrices);
    }

    #[test]
    fn validate_detects_cycle() {
        let mut pose = chain(&[Vec3::ZERO, Vec3::X, Vec3::X]);
        assert_eq!(pose.validate(), Ok(()));

        pose.set_parent(0, Some(2));
        assert!(matches!(pose.validate(), Err(PoseError::Cycle { .. })));
        assert_eq!(
            pose.try_global_transform(1),
            Err(PoseError::Cycle { joint: 1 })
        );
    }

    #[test]
    fn validate_detects_self_parent() {
        let mut pose = Pose::with_len(2);
        pose.set_parent(1, Some(1));
        assert_eq!(pose.validate(), Err(PoseError::Cycle { joint: 1 }));
    }

    #[test]
    fn dangling_parent_after_shrink() {
        let mut pose = chain(&[Vec3::ZERO, Vec3::X, Vec3::X]);
        pose.set_parent(0, None);
        pose.set_parent(1, Some(2));
        pose.set_parent(2, None);
        pose.resize(2);

        let err = PoseError::ParentOutOfRange {
            joint: 1,
            parent: 2,
            len: 2,
        };
        assert_eq!(pose.validate(), Err(err));
        assert_eq!(pose.try_global_transform(1), Err(err));
    }

    #[test]
    #[should_panic]
    fn global_transform_panics_on_cycle() {
        let mut pose = Pose::with_len(2);
        pose.set_parent(0, Some(1));
        pose.set_parent(1, Some(0));
        pose.global_transform(0);
    }

    #[test]
    #[should_panic]
    fn set_parent_out_of_range() {
        let mut pose = Pose::with_len(2);
        pose.set_parent(0, Some(2));
    }

    #[test]
    fn blend_mixes_locals() {
        let a = chain(&[Vec3::ZERO, Vec3::X]);
        let b = chain(&[Vec3::ZERO, Vec3::Y]);
        let half = Pose::blend(&a, &b, 0.5);
        assert_eq!(half.parent(1), Some(0));
        assert_eq!(half.local_transform(1).position, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(Pose::blend(&a, &b, 0.0), a);
    }
}
