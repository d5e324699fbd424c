//! Conversions to and from `nalgebra` types.

use {
    crate::{Mat4, Quat, Transform, Vec3, Vec4},
    nalgebra as na,
};

impl From<Vec3> for na::Vector3<f32> {
    fn from(v: Vec3) -> Self {
        na::Vector3::new(v.x, v.y, v.z)
    }
}

impl From<na::Vector3<f32>> for Vec3 {
    fn from(v: na::Vector3<f32>) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec4> for na::Vector4<f32> {
    fn from(v: Vec4) -> Self {
        na::Vector4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<na::Vector4<f32>> for Vec4 {
    fn from(v: na::Vector4<f32>) -> Self {
        Vec4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Quat> for na::Quaternion<f32> {
    fn from(q: Quat) -> Self {
        na::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl From<na::Quaternion<f32>> for Quat {
    fn from(q: na::Quaternion<f32>) -> Self {
        // `coords` are stored as `[i, j, k, w]`.
        Quat::new(q.coords[0], q.coords[1], q.coords[2], q.coords[3])
    }
}

impl From<Quat> for na::UnitQuaternion<f32> {
    fn from(q: Quat) -> Self {
        na::UnitQuaternion::new_normalize(q.into())
    }
}

impl From<na::UnitQuaternion<f32>> for Quat {
    fn from(q: na::UnitQuaternion<f32>) -> Self {
        q.into_inner().into()
    }
}

impl From<Mat4> for na::Matrix4<f32> {
    fn from(m: Mat4) -> Self {
        na::Matrix4::from_column_slice(m.as_array())
    }
}

impl From<na::Matrix4<f32>> for Mat4 {
    fn from(m: na::Matrix4<f32>) -> Self {
        let mut data = [0.0; 16];
        data.copy_from_slice(m.as_slice());
        Mat4::from_cols_array(data)
    }
}

/// Drops scale.
impl From<Transform> for na::Isometry3<f32> {
    fn from(t: Transform) -> Self {
        na::Isometry3::from_parts(
            na::Translation3::from(na::Vector3::from(t.position)),
            t.rotation.into(),
        )
    }
}
