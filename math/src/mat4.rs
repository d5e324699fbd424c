use {
    crate::{Vec3, Vec4},
    bytemuck::{Pod, Zeroable},
    std::{
        f32::consts::PI,
        ops::{Add, Index, IndexMut, Mul},
    },
};

/// Tolerance for matrix comparisons and degenerate scales.
pub const MAT4_EPSILON: f32 = 0.000001;

/// Determinants with smaller magnitude are treated as singular.
const SINGULAR_DETERMINANT: f32 = 1.0e-12;

/// Column-major 4x4 matrix.
///
/// Columns are the right, up and forward basis vectors followed by the
/// position, element `(row, col)` lives at index `col * 4 + row`.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Mat4([f32; 16]);

unsafe impl Zeroable for Mat4 {}
unsafe impl Pod for Mat4 {}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

/// Determinant of 3x3 submatrix picked by three columns and three rows.
#[inline]
fn minor(
    m: &[f32; 16],
    c0: usize,
    c1: usize,
    c2: usize,
    r0: usize,
    r1: usize,
    r2: usize,
) -> f32 {
    m[c0 * 4 + r0]
        * (m[c1 * 4 + r1] * m[c2 * 4 + r2] - m[c1 * 4 + r2] * m[c2 * 4 + r1])
        - m[c1 * 4 + r0]
            * (m[c0 * 4 + r1] * m[c2 * 4 + r2]
                - m[c0 * 4 + r2] * m[c2 * 4 + r1])
        + m[c2 * 4 + r0]
            * (m[c0 * 4 + r1] * m[c1 * 4 + r2]
                - m[c0 * 4 + r2] * m[c1 * 4 + r1])
}

impl Mat4 {
    pub const IDENTITY: Self = Mat4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub const ZERO: Self = Mat4([0.0; 16]);

    pub const fn from_cols_array(data: [f32; 16]) -> Self {
        Mat4(data)
    }

    pub fn from_cols(
        right: Vec4,
        up: Vec4,
        forward: Vec4,
        position: Vec4,
    ) -> Self {
        Mat4([
            right.x, right.y, right.z, right.w, //
            up.x, up.y, up.z, up.w, //
            forward.x, forward.y, forward.z, forward.w, //
            position.x, position.y, position.z, position.w,
        ])
    }

    pub fn from_translation(v: Vec3) -> Self {
        let mut m = Mat4::IDENTITY;
        m.set_position(Vec4::extend(v, 1.0));
        m
    }

    pub fn from_scale(v: Vec3) -> Self {
        let mut m = Mat4::IDENTITY;
        m.0[0] = v.x;
        m.0[5] = v.y;
        m.0[10] = v.z;
        m
    }

    pub fn to_cols_array(&self) -> [f32; 16] {
        self.0
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }

    /// Element at `row` and `col`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    pub fn col(&self, index: usize) -> Vec4 {
        let c = &self.0[index * 4..index * 4 + 4];
        Vec4::new(c[0], c[1], c[2], c[3])
    }

    fn set_col(&mut self, index: usize, v: Vec4) {
        self.0[index * 4..index * 4 + 4].copy_from_slice(&v.to_array());
    }

    pub fn right(&self) -> Vec4 {
        self.col(0)
    }

    pub fn up(&self) -> Vec4 {
        self.col(1)
    }

    pub fn forward(&self) -> Vec4 {
        self.col(2)
    }

    pub fn position(&self) -> Vec4 {
        self.col(3)
    }

    pub fn set_right(&mut self, v: Vec4) {
        self.set_col(0, v)
    }

    pub fn set_up(&mut self, v: Vec4) {
        self.set_col(1, v)
    }

    pub fn set_forward(&mut self, v: Vec4) {
        self.set_col(2, v)
    }

    pub fn set_position(&mut self, v: Vec4) {
        self.set_col(3, v)
    }

    /// Matrix product `self · rhs`.
    ///
    /// Applied to a vector the result transforms by `rhs` first and by
    /// `self` second.
    pub fn compose(&self, rhs: &Mat4) -> Mat4 {
        let a = &self.0;
        let b = &rhs.0;
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }
        Mat4(out)
    }

    pub fn transform_vec4(&self, v: Vec4) -> Vec4 {
        let m = &self.0;
        let row = |r: usize| {
            v.x * m[r] + v.y * m[4 + r] + v.z * m[8 + r] + v.w * m[12 + r]
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }

    /// Transforms direction, translation is ignored.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.transform_vec4(Vec4::extend(v, 0.0)).truncate()
    }

    /// Transforms point with implicit `w = 1`.
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        self.transform_vec4(Vec4::extend(v, 1.0)).truncate()
    }

    /// Transforms point with explicit `w`, returning transformed point
    /// together with resulting `w`.
    pub fn transform_point_w(&self, v: Vec3, w: f32) -> (Vec3, f32) {
        let out = self.transform_vec4(Vec4::extend(v, w));
        (out.truncate(), out.w)
    }

    pub fn transpose(&mut self) {
        *self = self.transposed();
    }

    pub fn transposed(&self) -> Mat4 {
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[row * 4 + col] = self.0[col * 4 + row];
            }
        }
        Mat4(out)
    }

    /// Cofactor expansion along the first row.
    pub fn determinant(&self) -> f32 {
        let m = &self.0;
        m[0] * minor(m, 1, 2, 3, 1, 2, 3) - m[4] * minor(m, 0, 2, 3, 1, 2, 3)
            + m[8] * minor(m, 0, 1, 3, 1, 2, 3)
            - m[12] * minor(m, 0, 1, 2, 1, 2, 3)
    }

    /// Transposed cofactor matrix.
    pub fn adjugate(&self) -> Mat4 {
        let m = &self.0;
        let cofactor = Mat4([
            minor(m, 1, 2, 3, 1, 2, 3),
            -minor(m, 1, 2, 3, 0, 2, 3),
            minor(m, 1, 2, 3, 0, 1, 3),
            -minor(m, 1, 2, 3, 0, 1, 2),
            -minor(m, 0, 2, 3, 1, 2, 3),
            minor(m, 0, 2, 3, 0, 2, 3),
            -minor(m, 0, 2, 3, 0, 1, 3),
            minor(m, 0, 2, 3, 0, 1, 2),
            minor(m, 0, 1, 3, 1, 2, 3),
            -minor(m, 0, 1, 3, 0, 2, 3),
            minor(m, 0, 1, 3, 0, 1, 3),
            -minor(m, 0, 1, 3, 0, 1, 2),
            -minor(m, 0, 1, 2, 1, 2, 3),
            minor(m, 0, 1, 2, 0, 2, 3),
            -minor(m, 0, 1, 2, 0, 1, 3),
            minor(m, 0, 1, 2, 0, 1, 2),
        ]);
        cofactor.transposed()
    }

    /// Inverse matrix, identity if this matrix is singular.
    pub fn inverse(&self) -> Mat4 {
        let det = self.determinant();
        if det.abs() < SINGULAR_DETERMINANT {
            tracing::warn!(
                "Matrix {:?} is singular, determinant is {}",
                self,
                det
            );
            return Mat4::IDENTITY;
        }
        self.adjugate() * det.recip()
    }

    /// Inverts in place. Singular matrices are replaced with identity.
    pub fn invert(&mut self) {
        *self = self.inverse();
    }

    /// Same matrix with position moved by `v` along its own basis.
    pub fn translate(&self, v: Vec3) -> Mat4 {
        let mut out = *self;
        let position = self.position()
            + self.right() * v.x
            + self.up() * v.y
            + self.forward() * v.z;
        out.set_position(position);
        out
    }

    /// Same matrix with basis vectors scaled by `v`.
    pub fn scale(&self, v: Vec3) -> Mat4 {
        let mut out = *self;
        out.set_right(self.right() * v.x);
        out.set_up(self.up() * v.y);
        out.set_forward(self.forward() * v.z);
        out
    }

    /// Projection matrix for view frustum given by clip planes.
    pub fn frustum(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Mat4 {
        if l == r || t == b || n == f {
            tracing::warn!(
                "Invalid frustum l: {}, r: {}, b: {}, t: {}, n: {}, f: {}",
                l,
                r,
                b,
                t,
                n,
                f
            );
            return Mat4::IDENTITY;
        }
        Mat4([
            (2.0 * n) / (r - l),
            0.0,
            0.0,
            0.0,
            0.0,
            (2.0 * n) / (t - b),
            0.0,
            0.0,
            (r + l) / (r - l),
            (t + b) / (t - b),
            -(f + n) / (f - n),
            -1.0,
            0.0,
            0.0,
            (-2.0 * f * n) / (f - n),
            0.0,
        ])
    }

    /// Perspective projection with vertical field of view in degrees.
    pub fn perspective(fov: f32, aspect: f32, n: f32, f: f32) -> Mat4 {
        let ymax = n * (fov * PI / 360.0).tan();
        let xmax = ymax * aspect;
        Mat4::frustum(-xmax, xmax, -ymax, ymax, n, f)
    }

    pub fn orthographic(
        l: f32,
        r: f32,
        b: f32,
        t: f32,
        n: f32,
        f: f32,
    ) -> Mat4 {
        if l == r || t == b || n == f {
            tracing::warn!(
                "Invalid orthographic box l: {}, r: {}, b: {}, t: {}, n: {}, f: {}",
                l,
                r,
                b,
                t,
                n,
                f
            );
            return Mat4::IDENTITY;
        }
        Mat4([
            2.0 / (r - l),
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / (t - b),
            0.0,
            0.0,
            0.0,
            0.0,
            -2.0 / (f - n),
            0.0,
            -((r + l) / (r - l)),
            -((t + b) / (t - b)),
            -((f + n) / (f - n)),
            1.0,
        ])
    }

    /// View matrix of a camera at `eye` looking at `target`.
    ///
    /// This is the inverse of the camera's world transform. The basis is
    /// orthonormal so the rotation part is inverted by transposition.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let f = -(target - eye).normalized();
        let mut r = up.cross(f);
        if r == Vec3::ZERO {
            tracing::warn!(
                "View direction {:?} and up vector {:?} are parallel",
                target - eye,
                up
            );
            return Mat4::IDENTITY;
        }
        r.normalize();
        let u = f.cross(r).normalized();

        let t = Vec3::new(-r.dot(eye), -u.dot(eye), -f.dot(eye));

        Mat4::from_cols(
            Vec4::new(r.x, u.x, f.x, 0.0),
            Vec4::new(r.y, u.y, f.y, 0.0),
            Vec4::new(r.z, u.z, f.z, 0.0),
            Vec4::extend(t, 1.0),
        )
    }
}

/// Component-wise comparison within [`MAT4_EPSILON`].
impl PartialEq for Mat4 {
    fn eq(&self, rhs: &Self) -> bool {
        self.0
            .iter()
            .zip(rhs.0.iter())
            .all(|(a, b)| (a - b).abs() <= MAT4_EPSILON)
    }
}

impl Index<usize> for Mat4 {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Mat4 {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.0[index]
    }
}

impl Add for Mat4 {
    type Output = Mat4;

    fn add(self, rhs: Mat4) -> Mat4 {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0.iter()) {
            *o += r;
        }
        Mat4(out)
    }
}

impl Mul<f32> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: f32) -> Mat4 {
        let mut out = self.0;
        for o in out.iter_mut() {
            *o *= rhs;
        }
        Mat4(out)
    }
}
