use {
    crate::pose::{Pose, PoseError},
    smallvec::SmallVec,
};

/// Downward view of pose hierarchy.
///
/// Pose stores only parent links. This inverts them so joints can be walked
/// from roots to leaves.
#[derive(Clone, Debug)]
pub struct JointTree {
    roots: Vec<usize>,
    children: Vec<SmallVec<[usize; 4]>>,
    order: Vec<usize>,
}

impl JointTree {
    /// Builds tree from parent links of the pose.
    /// Fails if the links do not form a forest.
    pub fn new(pose: &Pose) -> Result<Self, PoseError> {
        pose.validate()?;

        let mut roots = Vec::new();
        let mut children = vec![SmallVec::new(); pose.len()];

        for (id, joint) in pose.joints().iter().enumerate() {
            match joint.parent {
                None => roots.push(id),
                Some(parent) => children[parent].push(id),
            }
        }

        // Depth-first, siblings in index order.
        let mut order = Vec::with_capacity(pose.len());
        let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(children[id].iter().rev().copied());
        }

        Ok(JointTree {
            roots,
            children,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn children(&self, id: usize) -> &[usize] {
        &self.children[id]
    }

    /// Every joint exactly once, each one after its parent.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Number of ancestors of every joint, indexed by joint.
    pub fn depths(&self) -> Vec<usize> {
        let mut depths = vec![0; self.len()];
        for &id in &self.order {
            for &child in &self.children[id] {
                depths[child] = depths[id] + 1;
            }
        }
        depths
    }
}
