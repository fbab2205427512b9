//! Homogeneous vector and 4x4 matrix math.
//!
//! Everything here uses the row-vector convention: a vector is a 1x4 row that
//! is multiplied on the left of a matrix. `mul(a, b)` therefore applies `a`
//! first and `b` second when used with [`transform`], i.e.
//! `transform(transform(v, a), b) == transform(v, mul(a, b))`.

use std::ops::{Mul, Neg};

use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

/// Homogeneous 4-component vector. `w = 1` for points, `w = 0` for directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    pub const ZERO: Vector4 = Vector4::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// A position (`w = 1`).
    pub const fn point(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 1.0)
    }

    /// A direction (`w = 0`).
    pub const fn direction(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 0.0)
    }

    /// Euclidean length of the xyz part.
    pub fn length(self) -> f32 {
        dot(self, self).sqrt()
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Component-wise comparison within `epsilon`, w included.
    pub fn approx_eq(self, other: Vector4, epsilon: f32) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl From<[f32; 4]> for Vector4 {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl From<Vec4> for Vector4 {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Vector4> for Vec4 {
    fn from(v: Vector4) -> Self {
        Vec4::new(v.x, v.y, v.z, v.w)
    }
}

impl Neg for Vector4 {
    type Output = Vector4;

    fn neg(self) -> Vector4 {
        Vector4::new(-self.x, -self.y, -self.z, -self.w)
    }
}

/// 4x4 matrix stored row-major: `m[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub m: [[f32; 4]; 4],
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_rows(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    pub fn row(&self, index: usize) -> Vector4 {
        Vector4::from(self.m[index])
    }

    pub fn transpose(&self) -> Matrix {
        let mut r = [[0.0; 4]; 4];
        for (i, row) in self.m.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                r[j][i] = *value;
            }
        }
        Matrix { m: r }
    }

    pub fn approx_eq(&self, other: &Matrix, epsilon: f32) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// glam is column-vector/column-major; converting transposes so that
// `Mat4::from(m) * Vec4::from(v)` equals `transform(v, m)`.
impl From<Matrix> for Mat4 {
    fn from(matrix: Matrix) -> Self {
        Mat4::from_cols_array_2d(&matrix.m)
    }
}

impl From<Mat4> for Matrix {
    fn from(matrix: Mat4) -> Self {
        Matrix {
            m: matrix.to_cols_array_2d(),
        }
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        mul(&self, &rhs)
    }
}

impl Mul<Matrix> for Vector4 {
    type Output = Vector4;

    fn mul(self, rhs: Matrix) -> Vector4 {
        transform(self, &rhs)
    }
}

/// Scales xyz to unit length and zeroes w. A zero-length input yields
/// [`Vector4::ZERO`] instead of NaNs.
pub fn normalize(v: Vector4) -> Vector4 {
    let len = v.length();
    if len == 0.0 {
        return Vector4::ZERO;
    }
    Vector4::direction(v.x / len, v.y / len, v.z / len)
}

pub fn cross(u: Vector4, v: Vector4) -> Vector4 {
    Vector4::direction(
        u.y * v.z - u.z * v.y,
        u.z * v.x - u.x * v.z,
        u.x * v.y - u.y * v.x,
    )
}

/// Dot product over xyz; w does not participate.
pub fn dot(u: Vector4, v: Vector4) -> f32 {
    u.x * v.x + u.y * v.y + u.z * v.z
}

pub fn mul(a: &Matrix, b: &Matrix) -> Matrix {
    let mut r = [[0.0; 4]; 4];
    for (i, row) in r.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a.m[i][0] * b.m[0][j]
                + a.m[i][1] * b.m[1][j]
                + a.m[i][2] * b.m[2][j]
                + a.m[i][3] * b.m[3][j];
        }
    }
    Matrix { m: r }
}

/// Row vector times matrix: `r[j] = sum_i v[i] * m[i][j]`.
pub fn transform(v: Vector4, m: &Matrix) -> Vector4 {
    let m = &m.m;
    Vector4 {
        x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
        y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
        z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
        w: v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
    }
}
