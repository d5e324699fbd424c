use {
    crate::Vec2,
    bytemuck::{Pod, Zeroable},
    std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign},
};

/// Squared lengths below this value are treated as zero.
pub const VEC3_EPSILON: f32 = 0.000001;

#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

unsafe impl Zeroable for Vec3 {}
unsafe impl Pod for Vec3 {}

impl Vec3 {
    pub const ZERO: Self = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Vec3::new(1.0, 1.0, 1.0);
    pub const X: Self = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Self = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Self = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Vec3 { x: v, y: v, z: v }
    }

    pub fn extend(v: Vec2, z: f32) -> Self {
        Vec3::new(v.x, v.y, z)
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Right-handed cross product, perpendicular to both inputs.
    pub fn cross(self, rhs: Self) -> Self {
        Vec3::new(
            self.y * rhs.z - rhs.y * self.z,
            -(self.x * rhs.z - rhs.x * self.z),
            self.x * rhs.y - rhs.x * self.y,
        )
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length of the vector, zero for vectors shorter than the epsilon.
    pub fn length(self) -> f32 {
        let len_sq = self.length_squared();
        if len_sq < VEC3_EPSILON {
            return 0.0;
        }
        len_sq.sqrt()
    }

    /// Normalizes in place. Degenerate vectors are left untouched.
    pub fn normalize(&mut self) {
        let len_sq = self.length_squared();
        if len_sq < VEC3_EPSILON {
            return;
        }
        *self = *self * len_sq.sqrt().recip();
    }

    /// Returns unit vector with same direction or zero vector if this one
    /// is too short to have a direction.
    pub fn normalized(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq < VEC3_EPSILON {
            return Vec3::ZERO;
        }
        self * len_sq.sqrt().recip()
    }

    /// Angle between two vectors in radians.
    pub fn angle(self, rhs: Self) -> f32 {
        let sq_l = self.length_squared();
        let sq_r = rhs.length_squared();
        if sq_l < VEC3_EPSILON || sq_r < VEC3_EPSILON {
            return 0.0;
        }
        let cos = self.dot(rhs) / (sq_l.sqrt() * sq_r.sqrt());
        cos.max(-1.0).min(1.0).acos()
    }

    /// Projection of `self` onto `onto`.
    pub fn project(self, onto: Self) -> Self {
        let mag_sq = onto.length_squared();
        if mag_sq < VEC3_EPSILON {
            return Vec3::ZERO;
        }
        onto * (self.dot(onto) / mag_sq)
    }

    /// Component of `self` perpendicular to `onto`.
    pub fn reject(self, onto: Self) -> Self {
        self - self.project(onto)
    }

    /// Bounce reflection off the plane with normal `normal`.
    /// Negate the result for a mirror reflection.
    pub fn reflect(self, normal: Self) -> Self {
        let mag_sq = normal.length_squared();
        if mag_sq < VEC3_EPSILON {
            return Vec3::ZERO;
        }
        let scale = self.dot(normal) / mag_sq;
        self - normal * (scale * 2.0)
    }

    pub fn lerp(self, end: Self, t: f32) -> Self {
        self + (end - self) * t
    }

    /// Interpolates directions along the shortest arc.
    ///
    /// Falls back to [`lerp`](Self::lerp) for small `t` and nearly parallel
    /// inputs where the arc is numerically meaningless.
    pub fn slerp(self, end: Self, t: f32) -> Self {
        if t < 0.01 {
            return self.lerp(end, t);
        }
        let from = self.normalized();
        let to = end.normalized();
        let theta = from.angle(to);
        let sin_theta = theta.sin();
        if sin_theta.abs() < VEC3_EPSILON {
            return self.lerp(end, t);
        }
        let a = ((1.0 - t) * theta).sin() / sin_theta;
        let b = (t * theta).sin() / sin_theta;
        from * a + to * b
    }

    pub fn nlerp(self, end: Self, t: f32) -> Self {
        self.lerp(end, t).normalized()
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Vectors are equal when the squared distance between them is below
/// [`VEC3_EPSILON`].
impl PartialEq for Vec3 {
    fn eq(&self, rhs: &Self) -> bool {
        (*self - *rhs).length_squared() < VEC3_EPSILON
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Vec3 { x, y, z }
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = *self - rhs;
    }
}

impl Mul for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl MulAssign<f32> for Vec3 {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl Div for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

/// Divisors closer to zero than [`VEC3_EPSILON`] are clamped to
/// `±VEC3_EPSILON`.
impl Div<f32> for Vec3 {
    type Output = Vec3;

    fn div(self, mut rhs: f32) -> Vec3 {
        if rhs.abs() < VEC3_EPSILON {
            rhs = if rhs < 0.0 { -VEC3_EPSILON } else { VEC3_EPSILON };
        }
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}
