use {
    bytemuck::{Pod, Zeroable},
    rig_math::{Vec4, VEC3_EPSILON},
};

/// Up to four joints influencing single vertex.
///
/// Weights are expected to sum to one but nothing enforces it.
/// Unused slots carry zero weight.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct VertexInfluence {
    pub joints: [u32; 4],
    pub weights: Vec4,
}

unsafe impl Zeroable for VertexInfluence {}
unsafe impl Pod for VertexInfluence {}

impl VertexInfluence {
    pub fn new(joints: [u32; 4], weights: Vec4) -> Self {
        VertexInfluence { joints, weights }
    }

    /// Vertex bound rigidly to one joint.
    pub fn single(joint: u32) -> Self {
        VertexInfluence {
            joints: [joint, 0, 0, 0],
            weights: Vec4::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn weight_sum(&self) -> f32 {
        self.weights.dot(Vec4::ONE)
    }

    /// Same influence with weights scaled to sum to one.
    /// Influences without meaningful weight are returned unchanged.
    pub fn normalized(&self) -> Self {
        let sum = self.weight_sum();
        if sum.abs() < VEC3_EPSILON {
            return *self;
        }
        VertexInfluence {
            joints: self.joints,
            weights: self.weights * sum.recip(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_weights() {
        let influence =
            VertexInfluence::new([3, 1, 0, 0], Vec4::new(2.0, 2.0, 0.0, 0.0));
        assert_eq!(influence.weight_sum(), 4.0);

        let normalized = influence.normalized();
        assert_eq!(normalized.joints, [3, 1, 0, 0]);
        assert_eq!(normalized.weights, Vec4::new(0.5, 0.5, 0.0, 0.0));
        assert!((normalized.weight_sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_weights_unchanged() {
        let influence = VertexInfluence::default();
        assert_eq!(influence.normalized(), influence);
        assert_eq!(VertexInfluence::single(5).weight_sum(), 1.0);
    }

    #[test]
    fn gpu_layout() {
        let influences =
            [VertexInfluence::single(1), VertexInfluence::single(2)];
        let bytes: &[u8] = bytemuck::cast_slice(&influences);
        assert_eq!(bytes.len(), 2 * 32);
    }
}
