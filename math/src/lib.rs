//! Value algebra for joint hierarchies.
//!
//! Vectors, quaternions, column-major 4x4 matrices and the compact
//! scale-rotation-translation [`Transform`].
//!
//! Products that do not commute are exposed as named functions
//! ([`Quat::compose`], [`Mat4::compose`], [`Transform::combine`]) rather
//! than `*` operators. In every one of them the right operand is applied
//! first, so `a.compose(b)` maps `v` to `a(b(v))`.
//!
//! Ill-conditioned input never produces an error. Near-zero lengths yield a
//! zero vector or identity quaternion, singular matrices and degenerate
//! projection parameters yield the identity matrix and a `tracing` warning.

mod mat4;
mod quat;
mod transform;
mod vec2;
mod vec3;
mod vec4;

#[cfg(feature = "nalgebra")]
mod na;

pub use self::{
    mat4::{Mat4, MAT4_EPSILON},
    quat::{Quat, QUAT_EPSILON},
    transform::Transform,
    vec2::Vec2,
    vec3::{Vec3, VEC3_EPSILON},
    vec4::Vec4,
};

/// Linear interpolation between two scalars.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
