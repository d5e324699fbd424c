//! Joint hierarchies for skeletal animation.
//!
//! [`Pose`] holds local transforms and parent links and derives global
//! transforms from them. [`Skeleton`] ties rest and bind poses to joint
//! names and builds skinning matrix palettes.

mod hierarchy;
mod pose;
mod skeleton;
mod skin;

pub use self::{
    hierarchy::JointTree,
    pose::{Joint, Pose, PoseError},
    skeleton::{Skeleton, SkeletonError},
    skin::VertexInfluence,
};
