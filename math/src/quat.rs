use {
    crate::{Mat4, Vec3, Vec4},
    bytemuck::{Pod, Zeroable},
    std::{
        f32::consts::FRAC_PI_2,
        ops::{Add, Mul, Neg, Sub},
    },
};

/// Tolerance for quaternion comparisons and degenerate lengths.
pub const QUAT_EPSILON: f32 = 0.000001;

/// Quaternion `(x, y, z, w)` with vector part `xyz` and scalar part `w`.
///
/// Represents a rotation only when it has unit length. Nothing normalizes
/// implicitly, callers normalize when they need a unit quaternion. The only
/// exceptions are [`Quat::to_mat4`] and [`Quat::nlerp`].
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

unsafe impl Zeroable for Quat {}
unsafe impl Pod for Quat {}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Quat::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Quat { x, y, z, w }
    }

    /// Rotation by `angle` radians around `axis`. Axis need not be unit.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let norm = axis.normalized();
        let (s, c) = (angle * 0.5).sin_cos();
        Quat::new(norm.x * s, norm.y * s, norm.z * s, c)
    }

    /// Shortest arc rotation that takes direction `from` onto `to`.
    ///
    /// Built from the half vector between the two directions so no angle
    /// has to be computed, parallel inputs produce identity through it.
    /// Opposite inputs produce a half turn around an axis orthogonal to
    /// `from`, derived from the coordinate axis least aligned with it.
    /// Zero-length inputs have no direction and produce identity.
    pub fn from_to(from: Vec3, to: Vec3) -> Self {
        let f = from.normalized();
        let t = to.normalized();

        if f == Vec3::ZERO || t == Vec3::ZERO {
            return Quat::IDENTITY;
        }

        if f == -t {
            let mut ortho = Vec3::X;
            if f.y.abs() < f.x.abs() {
                ortho = Vec3::Y;
            }
            if f.z.abs() < f.y.abs() && f.z.abs() < f.x.abs() {
                ortho = Vec3::Z;
            }
            let axis = f.cross(ortho).normalized();
            return Quat::new(axis.x, axis.y, axis.z, 0.0);
        }

        let half = (f + t).normalized();
        let axis = f.cross(half);
        Quat::new(axis.x, axis.y, axis.z, f.dot(half))
    }

    /// Vector part.
    pub fn vector(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Scalar part.
    pub fn scalar(self) -> f32 {
        self.w
    }

    /// Rotation axis of a unit quaternion.
    pub fn axis(self) -> Vec3 {
        self.vector().normalized()
    }

    /// Rotation angle of a unit quaternion, in radians.
    pub fn angle(self) -> f32 {
        2.0 * self.w.max(-1.0).min(1.0).acos()
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        let len_sq = self.length_squared();
        if len_sq < QUAT_EPSILON {
            return 0.0;
        }
        len_sq.sqrt()
    }

    /// Normalizes in place. Degenerate quaternions are left untouched.
    pub fn normalize(&mut self) {
        let len_sq = self.length_squared();
        if len_sq < QUAT_EPSILON {
            return;
        }
        *self = *self * len_sq.sqrt().recip();
    }

    /// Unit quaternion with the same orientation, identity if degenerate.
    pub fn normalized(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq < QUAT_EPSILON {
            return Quat::IDENTITY;
        }
        self * len_sq.sqrt().recip()
    }

    pub fn conjugate(self) -> Self {
        Quat::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Reciprocal. Equals conjugate for unit quaternions.
    pub fn inverse(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq < QUAT_EPSILON {
            return Quat::IDENTITY;
        }
        let recip = len_sq.recip();
        Quat::new(
            -self.x * recip,
            -self.y * recip,
            -self.z * recip,
            self.w * recip,
        )
    }

    /// Quaternion product `self · rhs`.
    ///
    /// The result rotates by `rhs` first and by `self` second,
    /// the same order as [`Mat4::compose`].
    pub fn compose(self, rhs: Self) -> Self {
        Quat::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }

    /// Rotates vector by this quaternion.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let u = self.vector();
        let s = self.w;
        u * (2.0 * u.dot(v)) + v * (s * s - u.dot(u)) + u.cross(v) * (2.0 * s)
    }

    /// Raises quaternion to scalar power by scaling its angle.
    pub fn pow(self, exponent: f32) -> Self {
        let angle = self.angle();
        let axis = self.vector().normalized();
        let (half_sin, half_cos) = (exponent * angle * 0.5).sin_cos();
        Quat::new(
            axis.x * half_sin,
            axis.y * half_sin,
            axis.z * half_sin,
            half_cos,
        )
    }

    /// Plain weighted sum. The result is not normalized.
    pub fn mix(self, to: Self, t: f32) -> Self {
        self * (1.0 - t) + to * t
    }

    /// Normalized linear interpolation.
    ///
    /// Cheap approximation of [`slerp`](Self::slerp) with non-constant
    /// angular velocity.
    pub fn nlerp(self, to: Self, t: f32) -> Self {
        (self + (to - self) * t).normalized()
    }

    /// Spherical linear interpolation of unit quaternions.
    ///
    /// Nearly parallel inputs are handed to [`nlerp`](Self::nlerp) since
    /// the arc between them has near-zero sine. That includes `end` close to
    /// `-self`, which is flipped first so the sum does not cancel out.
    pub fn slerp(self, end: Self, t: f32) -> Self {
        let dot = self.dot(end);
        if dot.abs() > 1.0 - QUAT_EPSILON {
            let end = if dot < 0.0 { -end } else { end };
            return self.nlerp(end, t);
        }
        let delta = end.compose(self.inverse());
        delta.pow(t).compose(self).normalized()
    }

    /// Orientation whose forward (+Z) axis points along `direction` and whose
    /// up axis is as close to `up` as possible.
    ///
    /// The twist towards `up` is always a rotation around the forward axis,
    /// a half turn included. `direction` and `up` must not be parallel,
    /// otherwise the twist degenerates to identity.
    pub fn look_rotation(direction: Vec3, up: Vec3) -> Self {
        let forward = direction.normalized();
        let desired_up = up.normalized();
        let right = desired_up.cross(forward);
        let desired_up = forward.cross(right);

        let world_to_object = Quat::from_to(Vec3::Z, forward);
        let object_up = world_to_object.rotate(Vec3::Y);
        // Both up vectors are orthogonal to `forward`.
        let angle = forward
            .dot(object_up.cross(desired_up))
            .atan2(object_up.dot(desired_up));
        let twist = Quat::from_axis_angle(forward, angle);

        twist.compose(world_to_object).normalized()
    }

    /// Rotation matrix. Quaternion is normalized first.
    pub fn to_mat4(self) -> Mat4 {
        let Quat { x, y, z, w } = self.normalized();

        let x2 = x + x;
        let y2 = y + y;
        let z2 = z + z;

        let xx = x * x2;
        let xy = x * y2;
        let xz = x * z2;
        let yy = y * y2;
        let yz = y * z2;
        let zz = z * z2;
        let wx = w * x2;
        let wy = w * y2;
        let wz = w * z2;

        Mat4::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    /// Orientation of matrix basis.
    ///
    /// Forward and up basis vectors are renormalized and orthogonalized, so
    /// scale and shear are discarded.
    pub fn from_mat4(m: &Mat4) -> Self {
        let up = m.up().truncate().normalized();
        let forward = m.forward().truncate().normalized();
        let right = up.cross(forward);
        let up = forward.cross(right);
        Quat::look_rotation(forward, up)
    }

    /// Converts to `(roll, pitch, yaw)` euler angles in radians,
    /// rotations around X, Y and Z respectively.
    pub fn to_euler(self) -> Vec3 {
        let Quat { x, y, z, w } = self;

        let sinr_cosp = 2.0 * (w * x + y * z);
        let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
        let roll = sinr_cosp.atan2(cosr_cosp);

        let sinp = (1.0 + 2.0 * (w * y - x * z)).max(0.0).sqrt();
        let cosp = (1.0 - 2.0 * (w * y - x * z)).max(0.0).sqrt();
        let pitch = 2.0 * sinp.atan2(cosp) - FRAC_PI_2;

        let siny_cosp = 2.0 * (w * z + x * y);
        let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
        let yaw = siny_cosp.atan2(cosy_cosp);

        Vec3::new(roll, pitch, yaw)
    }

    /// Inverse of [`to_euler`](Self::to_euler).
    pub fn from_euler(roll: f32, pitch: f32, yaw: f32) -> Self {
        let (sr, cr) = (roll * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sy, cy) = (yaw * 0.5).sin_cos();

        Quat::new(
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
            cr * cp * cy + sr * sp * sy,
        )
    }

    /// Checks whether two quaternions describe the same orientation.
    /// Unlike `==` this accepts `q` and `-q`.
    pub fn same_orientation(self, rhs: Self) -> bool {
        self == rhs || self == -rhs
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

/// Component-wise comparison within [`QUAT_EPSILON`].
impl PartialEq for Quat {
    fn eq(&self, rhs: &Self) -> bool {
        (self.x - rhs.x).abs() <= QUAT_EPSILON
            && (self.y - rhs.y).abs() <= QUAT_EPSILON
            && (self.z - rhs.z).abs() <= QUAT_EPSILON
            && (self.w - rhs.w).abs() <= QUAT_EPSILON
    }
}

impl Add for Quat {
    type Output = Quat;

    fn add(self, rhs: Quat) -> Quat {
        Quat::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl Sub for Quat {
    type Output = Quat;

    fn sub(self, rhs: Quat) -> Quat {
        Quat::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl Mul<f32> for Quat {
    type Output = Quat;

    fn mul(self, rhs: f32) -> Quat {
        Quat::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl Neg for Quat {
    type Output = Quat;

    fn neg(self) -> Quat {
        Quat::new(-self.x, -self.y, -self.z, -self.w)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::f32::consts::{FRAC_PI_2, PI},
    };

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length_squared() < 1e-8
    }

    #[test]
    fn axis_angle_rotates() {
        let q = Quat::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert!(close(q.rotate(Vec3::Z), Vec3::X));
        assert!(close(q.rotate(Vec3::X), -Vec3::Z));
        assert!((q.angle() - FRAC_PI_2).abs() < 1e-5);
        assert_eq!(q.axis(), Vec3::Y);
    }

    #[test]
    fn compose_applies_right_first() {
        let about_y = Quat::from_axis_angle(Vec3::Y, FRAC_PI_2);
        let about_x = Quat::from_axis_angle(Vec3::X, FRAC_PI_2);

        // Z -> (about_x) -> -Y -> (about_y) -> -Y
        let q = about_y.compose(about_x);
        assert!(close(q.rotate(Vec3::Z), -Vec3::Y));

        // Z -> (about_y) -> X -> (about_x) -> X
        let q = about_x.compose(about_y);
        assert!(close(q.rotate(Vec3::Z), Vec3::X));
    }

    #[test]
    fn from_to_general() {
        let from = Vec3::new(1.0, 2.0, 0.5);
        let to = Vec3::new(-3.0, 0.5, 1.0);
        let q = Quat::from_to(from, to);
        assert!(close(q.rotate(from.normalized()), to.normalized()));
    }

    #[test]
    fn from_to_zero_length_is_identity() {
        assert_eq!(Quat::from_to(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
        assert_eq!(Quat::from_to(Vec3::X, Vec3::ZERO), Quat::IDENTITY);
        assert_eq!(Quat::from_to(Vec3::ZERO, Vec3::Y).rotate(Vec3::X), Vec3::X);
    }

    #[test]
    fn from_to_parallel_is_identity() {
        let q = Quat::from_to(Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
        assert_eq!(q, Quat::IDENTITY);
    }

    #[test]
    fn from_to_opposite() {
        for &v in &[Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, 1.0, 0.2)] {
            let q = Quat::from_to(v, -v);
            assert!(close(q.rotate(v.normalized()), -v.normalized()));
            assert!((q.length() - 1.0).abs() < 1e-5);
        }

        let q = Quat::from_to(Vec3::X, -Vec3::X);
        assert_eq!(q, Quat::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn inverse_and_conjugate() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7);
        assert_eq!(q.inverse(), q.conjugate());
        assert_eq!(q.compose(q.inverse()), Quat::IDENTITY);

        let scaled = q * 2.0;
        assert_eq!(scaled.compose(scaled.inverse()), Quat::IDENTITY);
        assert_eq!(Quat::new(0.0, 0.0, 0.0, 0.0).inverse(), Quat::IDENTITY);
    }

    #[test]
    fn degenerate_normalize() {
        let q = Quat::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(q.normalized(), Quat::IDENTITY);
        assert_eq!(q.length(), 0.0);
    }

    #[test]
    fn mix_is_unnormalized() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::Z, PI * 0.5);
        let m = a.mix(b, 0.5);
        assert!(m.length() < 1.0);
        assert!((a.nlerp(b, 0.5).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn slerp_same_is_same() {
        let q = Quat::from_axis_angle(Vec3::new(0.3, 1.0, -0.2), 1.3);
        for &t in &[0.0, 0.25, 0.5, 1.0] {
            assert_eq!(q.slerp(q, t), q);
        }
    }

    #[test]
    fn slerp_halfway() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
        let half = a.slerp(b, 0.5);
        assert_eq!(half, Quat::from_axis_angle(Vec3::Z, FRAC_PI_2 * 0.5));
    }

    #[test]
    fn slerp_negated_keeps_orientation() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 0.5, 0.0), 0.9);
        for &t in &[0.0, 0.5, 1.0] {
            assert!(q.slerp(-q, t).same_orientation(q));
        }
    }

    #[test]
    fn slerp_reaches_end() {
        let a = Quat::from_axis_angle(Vec3::X, 0.8);
        let b = Quat::from_axis_angle(Vec3::Y, 1.1);
        assert_eq!(a.slerp(b, 0.0), a);
        assert_eq!(a.slerp(b, 1.0), b);
    }

    #[test]
    fn look_rotation_axes() {
        assert_eq!(Quat::look_rotation(Vec3::Z, Vec3::Y), Quat::IDENTITY);

        let q = Quat::look_rotation(Vec3::X, Vec3::Y);
        assert!(close(q.rotate(Vec3::Z), Vec3::X));
        assert!(close(q.rotate(Vec3::Y), Vec3::Y));

        let dir = Vec3::new(1.0, 0.5, -2.0);
        let q = Quat::look_rotation(dir, Vec3::Y);
        assert!(close(q.rotate(Vec3::Z), dir.normalized()));
        assert!(q.rotate(Vec3::Y).dot(Vec3::Y) > 0.0);
        assert!(q.rotate(Vec3::X).y.abs() < 1e-5);
    }

    #[test]
    fn look_rotation_half_twist() {
        let q = Quat::look_rotation(Vec3::X, -Vec3::Y);
        assert!(close(q.rotate(Vec3::Z), Vec3::X));
        assert!(close(q.rotate(Vec3::Y), -Vec3::Y));
        assert!(close(q.rotate(Vec3::X), Vec3::Z));

        let q = Quat::look_rotation(-Vec3::Z, -Vec3::Y);
        assert!(close(q.rotate(Vec3::Z), -Vec3::Z));
        assert!(close(q.rotate(Vec3::Y), -Vec3::Y));
    }

    #[test]
    fn half_turn_matrix_roundtrip() {
        for &axis in &[
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
        ] {
            let q = Quat::from_axis_angle(axis, PI);
            let back = Quat::from_mat4(&q.to_mat4());
            for &v in &[Vec3::X, Vec3::Y, Vec3::Z] {
                assert!(close(back.rotate(v), q.rotate(v)), "{:?}", axis);
            }
        }
    }

    #[test]
    fn matrix_roundtrip() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, -2.0, 0.5), 2.1);
        let m = q.to_mat4();
        assert!(close(m.transform_vector(Vec3::X), q.rotate(Vec3::X)));
        assert!(close(m.transform_vector(Vec3::Y), q.rotate(Vec3::Y)));

        let back = Quat::from_mat4(&m);
        for &axis in &[Vec3::X, Vec3::Y, Vec3::Z] {
            assert!(close(back.rotate(axis), q.rotate(axis)));
        }
    }

    #[test]
    fn euler_roundtrip() {
        let q = Quat::from_euler(0.3, 0.2, 0.1);
        let e = q.to_euler();
        assert!(close(e, Vec3::new(0.3, 0.2, 0.1)));
        assert!(Quat::from_euler(e.x, e.y, e.z).same_orientation(q));
    }

    #[test]
    fn same_orientation_accepts_negation() {
        let q = Quat::from_axis_angle(Vec3::X, 1.0);
        assert!(q.same_orientation(-q));
        assert!(q != -q);
    }

    #[test]
    fn pow_scales_angle() {
        let q = Quat::from_axis_angle(Vec3::Z, 1.2);
        assert_eq!(q.pow(0.5), Quat::from_axis_angle(Vec3::Z, 0.6));
        assert_eq!(q.pow(0.0), Quat::IDENTITY);
    }
}
