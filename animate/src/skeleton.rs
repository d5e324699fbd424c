use {
    crate::pose::{Pose, PoseError},
    rig_math::Mat4,
};

#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    #[error("Rest pose has {rest} joints, bind pose has {bind} and {names} joint names given")]
    JointCountMismatch {
        rest: usize,
        bind: usize,
        names: usize,
    },

    #[error("Joint {joint} has parent {rest:?} in rest pose but {bind:?} in bind pose")]
    ParentMismatch {
        joint: usize,
        rest: Option<usize>,
        bind: Option<usize>,
    },

    #[error(transparent)]
    InvalidPose {
        #[from]
        source: PoseError,
    },
}

/// Named joint hierarchy with its two reference poses.
///
/// Rest pose is the default unanimated configuration. Bind pose is the one
/// mesh vertices were bound in, its inverse global matrices are cached for
/// skinning.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde-1",
    serde(try_from = "SkeletonData", into = "SkeletonData")
)]
pub struct Skeleton {
    rest: Pose,
    bind: Pose,
    names: Vec<String>,
    inverse_bind: Vec<Mat4>,
}

impl Skeleton {
    pub fn new(
        rest: Pose,
        bind: Pose,
        names: Vec<String>,
    ) -> Result<Self, SkeletonError> {
        if rest.len() != bind.len() || rest.len() != names.len() {
            return Err(SkeletonError::JointCountMismatch {
                rest: rest.len(),
                bind: bind.len(),
                names: names.len(),
            });
        }

        rest.validate()?;

        for (joint, (r, b)) in
            rest.joints().iter().zip(bind.joints()).enumerate()
        {
            if r.parent != b.parent {
                return Err(SkeletonError::ParentMismatch {
                    joint,
                    rest: r.parent,
                    bind: b.parent,
                });
            }
        }

        let inverse_bind = bind
            .global_matrices()
            .iter()
            .map(Mat4::inverse)
            .collect();

        tracing::debug!("Skeleton with {} joints created", names.len());

        Ok(Skeleton {
            rest,
            bind,
            names,
            inverse_bind,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn rest_pose(&self) -> &Pose {
        &self.rest
    }

    pub fn bind_pose(&self) -> &Pose {
        &self.bind
    }

    /// Joint names, indexed the same as both poses.
    pub fn joint_names(&self) -> &[String] {
        &self.names
    }

    pub fn joint_name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Index of the first joint with given name.
    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Inverse of every bind pose global matrix.
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind
    }

    /// Fills `out` with skinning matrices for `pose`.
    ///
    /// Each matrix takes a vertex from bind pose model space into the joint
    /// frame and then out through the joint's global transform in `pose`.
    /// Blending them by vertex weights is left to the consumer.
    ///
    /// # Panics
    ///
    /// If `pose` has different number of joints than the skeleton
    /// or any of its parent chains is cyclic or dangling.
    /// Check the pose with [`Pose::validate`] first when it is not trusted.
    pub fn skin_palette(&self, pose: &Pose, out: &mut Vec<Mat4>) {
        assert_eq!(
            pose.len(),
            self.len(),
            "Pose does not match skeleton joint count"
        );

        out.clear();
        out.extend(
            self.inverse_bind
                .iter()
                .enumerate()
                .map(|(id, inv)| pose.global_matrix(id).compose(inv)),
        );
    }
}

#[cfg(feature = "serde-1")]
#[derive(serde::Serialize, serde::Deserialize)]
struct SkeletonData {
    rest: Pose,
    bind: Pose,
    names: Vec<String>,
}

#[cfg(feature = "serde-1")]
impl std::convert::TryFrom<SkeletonData> for Skeleton {
    type Error = SkeletonError;

    fn try_from(data: SkeletonData) -> Result<Self, SkeletonError> {
        Skeleton::new(data.rest, data.bind, data.names)
    }
}

#[cfg(feature = "serde-1")]
impl From<Skeleton> for SkeletonData {
    fn from(skeleton: Skeleton) -> Self {
        SkeletonData {
            rest: skeleton.rest,
            bind: skeleton.bind,
            names: skeleton.names,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rig_math::{Quat, Transform, Vec3},
    };

    fn arm() -> Skeleton {
        let mut rest = Pose::with_len(3);
        rest.set_parent(1, Some(0));
        rest.set_parent(2, Some(1));
        rest.set_local_transform(1, Transform::from_position(Vec3::X));
        rest.set_local_transform(2, Transform::from_position(Vec3::X));

        let mut bind = rest.clone();
        bind.set_local_transform(
            1,
            Transform::new(
                Vec3::X,
                Quat::from_axis_angle(Vec3::Z, 0.5),
                Vec3::ONE,
            ),
        );

        let names = vec!["shoulder".into(), "elbow".into(), "wrist".into()];
        Skeleton::new(rest, bind, names).unwrap()
    }

    #[test]
    fn lookup() {
        let skeleton = arm();
        assert_eq!(skeleton.len(), 3);
        assert_eq!(skeleton.find_joint("elbow"), Some(1));
        assert_eq!(skeleton.find_joint("knee"), None);
        assert_eq!(skeleton.joint_name(2), Some("wrist"));
        assert_eq!(skeleton.joint_name(3), None);
        assert_eq!(skeleton.joint_names().len(), 3);
        assert_eq!(skeleton.rest_pose().parent(2), Some(1));
    }

    #[test]
    fn bind_pose_palette_is_identity() {
        let skeleton = arm();
        let mut palette = Vec::new();
        skeleton.skin_palette(skeleton.bind_pose(), &mut palette);
        assert_eq!(palette.len(), 3);
        for m in &palette {
            for i in 0..16 {
                assert!((m[i] - Mat4::IDENTITY[i]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn palette_moves_bound_vertex() {
        let skeleton = arm();
        let mut palette = Vec::new();
        skeleton.skin_palette(skeleton.rest_pose(), &mut palette);

        // Vertex at the wrist in bind pose follows the wrist into rest pose.
        let bind_wrist = skeleton.bind_pose().global_transform(2).position;
        let rest_wrist = skeleton.rest_pose().global_transform(2).position;
        let moved = palette[2].transform_point(bind_wrist);
        assert!((moved - rest_wrist).length_squared() < 1e-8);
        assert_eq!(rest_wrist, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn count_mismatch() {
        let names = vec!["a".into()];
        let err = Skeleton::new(Pose::with_len(2), Pose::with_len(2), names)
            .unwrap_err();
        assert!(matches!(
            err,
            SkeletonError::JointCountMismatch {
                rest: 2,
                bind: 2,
                names: 1
            }
        ));
    }

    #[test]
    fn cyclic_rest_pose() {
        let mut rest = Pose::with_len(2);
        rest.set_parent(0, Some(1));
        rest.set_parent(1, Some(0));
        let bind = rest.clone();
        let err = Skeleton::new(rest, bind, vec!["a".into(), "b".into()])
            .unwrap_err();
        assert!(matches!(err, SkeletonError::InvalidPose { .. }));
    }

    #[test]
    #[should_panic(expected = "Malformed pose")]
    fn palette_of_cyclic_pose() {
        let skeleton = arm();
        let mut pose = skeleton.rest_pose().clone();
        pose.set_parent(0, Some(2));
        assert!(pose.validate().is_err());

        let mut palette = Vec::new();
        skeleton.skin_palette(&pose, &mut palette);
    }

    #[test]
    fn parent_mismatch() {
        let rest = Pose::with_len(2);
        let mut bind = Pose::with_len(2);
        bind.set_parent(1, Some(0));
        let err = Skeleton::new(rest, bind, vec!["a".into(), "b".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            SkeletonError::ParentMismatch {
                joint: 1,
                rest: None,
                bind: Some(0)
            }
        ));
    }
}
