use {
    crate::{Mat4, Quat, Vec3, MAT4_EPSILON, VEC3_EPSILON},
    bytemuck::{Pod, Zeroable},
};

/// Scale, rotation and translation applied in that order.
///
/// Default value is the identity transform.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

unsafe impl Zeroable for Transform {}
unsafe impl Pod for Transform {}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Transform {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Transform {
            position,
            ..Transform::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Transform {
            rotation,
            ..Transform::IDENTITY
        }
    }

    /// Combines `self` as the outer (parent) frame with `child` as the inner
    /// frame. The result applies `child` first and `self` second.
    ///
    /// Scale is multiplied component-wise and is never rotated, so
    /// non-uniform parent scale under a rotated child is approximated.
    pub fn combine(&self, child: &Transform) -> Transform {
        Transform {
            scale: self.scale * child.scale,
            rotation: self.rotation.compose(child.rotation),
            position: self.position
                + self.rotation.rotate(self.scale * child.position),
        }
    }

    /// Inverse transform. Scale axes close to zero invert to zero.
    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        let recip = |s: f32| {
            if s.abs() < VEC3_EPSILON {
                0.0
            } else {
                s.recip()
            }
        };
        let scale = Vec3::new(
            recip(self.scale.x),
            recip(self.scale.y),
            recip(self.scale.z),
        );
        let position = rotation.rotate(scale * -self.position);

        Transform {
            position,
            rotation,
            scale,
        }
    }

    /// Interpolates position and scale linearly and rotation with `nlerp`
    /// along the shorter arc.
    pub fn mix(&self, other: &Transform, t: f32) -> Transform {
        let mut other_rotation = other.rotation;
        if self.rotation.dot(other_rotation) < 0.0 {
            other_rotation = -other_rotation;
        }

        Transform {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.nlerp(other_rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }

    /// Decomposes affine matrix.
    ///
    /// Rotation is recovered from the forward and up basis vectors, scale is
    /// the length of each basis vector once rotation is removed. Mirrored
    /// (negative) scale and non-uniform scale combined with rotation cannot
    /// be recovered, the result is an approximation in those cases.
    pub fn from_mat4(m: &Mat4) -> Transform {
        let position = m.position().truncate();
        let rotation = Quat::from_mat4(m);

        let inv = rotation.inverse();
        let right = inv.rotate(m.right().truncate());
        let up = inv.rotate(m.up().truncate());
        let forward = inv.rotate(m.forward().truncate());

        let snap = |v: Vec3| {
            let len = v.length_squared().sqrt();
            if len < MAT4_EPSILON {
                0.0
            } else {
                len
            }
        };

        Transform {
            position,
            rotation,
            scale: Vec3::new(snap(right), snap(up), snap(forward)),
        }
    }

    /// Matrix that scales, then rotates, then translates.
    pub fn to_mat4(&self) -> Mat4 {
        let scale = Mat4::from_scale(self.scale);
        let rotation = self.rotation.to_mat4();
        let translation = Mat4::from_translation(self.position);
        translation.compose(&rotation.compose(&scale))
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation.rotate(self.scale * point)
    }

    /// Same as [`transform_point`](Self::transform_point) but ignores
    /// translation.
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation.rotate(self.scale * vector)
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Mat4 {
        t.to_mat4()
    }
}

impl From<Mat4> for Transform {
    fn from(m: Mat4) -> Transform {
        Transform::from_mat4(&m)
    }
}
