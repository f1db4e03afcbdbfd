//! Vector and matrix math for the transform pipeline
//!
//! Matrices are row-major and transform column vectors (`M * v`).
//! Projection follows the right-handed, camera-looks-down-negative-Z
//! convention and maps depth into `[0, 1]`.

use std::ops::{Add, Mul, Sub};
use serde::{Serialize, Deserialize};

/// Fractional part, always in `[0, 1)` (also for negative inputs)
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Linear interpolation between `a` and `b`; exact when `a == b`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map `x` from the range `[a1, b1]` onto `[a2, b2]` (no clamping)
pub fn remap(x: f32, a1: f32, b1: f32, a2: f32, b2: f32) -> f32 {
    let t = (x - a1) / (b1 - a1);
    a2 + t * (b2 - a2)
}

/// 2D Vector (texture coordinates, derivatives)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn len_sq(self) -> f32 {
        self.dot(self)
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2 {
            x: self.x * s,
            y: self.y * s,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        self.scale(s)
    }
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Promote to homogeneous coordinates
    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

/// 4D homogeneous vector (clip-space positions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// 4x4 matrix, row-major
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_rows(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Element at `row`, `col`
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.m[row * 4 + col]
    }

    pub fn mul_mat4(&self, other: &Mat4) -> Mat4 {
        let mut m = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                m[row * 4 + col] = (0..4).map(|k| self.at(row, k) * other.at(k, col)).sum();
            }
        }
        Mat4 { m }
    }

    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        let m = &self.m;
        Vec4 {
            x: v.x * m[0] + v.y * m[1] + v.z * m[2] + v.w * m[3],
            y: v.x * m[4] + v.y * m[5] + v.z * m[6] + v.w * m[7],
            z: v.x * m[8] + v.y * m[9] + v.z * m[10] + v.w * m[11],
            w: v.x * m[12] + v.y * m[13] + v.z * m[14] + v.w * m[15],
        }
    }

    pub fn scale(v: Vec3) -> Mat4 {
        Mat4::from_rows([
            v.x, 0.0, 0.0, 0.0,
            0.0, v.y, 0.0, 0.0,
            0.0, 0.0, v.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn translate(v: Vec3) -> Mat4 {
        Mat4::from_rows([
            1.0, 0.0, 0.0, v.x,
            0.0, 1.0, 0.0, v.y,
            0.0, 0.0, 1.0, v.z,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation by `x`, then `y`, then `z` (radians), i.e. `Rz * Ry * Rx`
    pub fn rotate_zyx(z: f32, y: f32, x: f32) -> Mat4 {
        let (sina, cosa) = z.sin_cos();
        let (sinb, cosb) = y.sin_cos();
        let (sinc, cosc) = x.sin_cos();

        Mat4::from_rows([
            cosa * cosb, cosa * sinb * sinc - sina * cosc, cosa * sinb * cosc + sina * sinc, 0.0,
            sina * cosb, sina * sinb * sinc + cosa * cosc, sina * sinb * cosc - cosa * sinc, 0.0,
            -sinb, cosb * sinc, cosb * cosc, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Off-center perspective frustum. Eye-space `z = -n` maps to depth 0,
    /// `z = -f` to depth 1; clip `w` is the positive view distance.
    pub fn frustum(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Mat4 {
        Mat4::from_rows([
            2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
            0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
            0.0, 0.0, -f / (f - n), -f * n / (f - n),
            0.0, 0.0, -1.0, 0.0,
        ])
    }

    /// Symmetric perspective projection; `fov_y` in radians
    pub fn perspective(fov_y: f32, aspect: f32, n: f32, f: f32) -> Mat4 {
        let t = n * (fov_y / 2.0).tan();
        Mat4::frustum(-aspect * t, aspect * t, -t, t, n, f)
    }

    /// View matrix placing `eye` at the origin, looking down -Z towards `target`
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let up2 = right.cross(forward);

        Mat4::from_rows([
            right.x, right.y, right.z, -right.dot(eye),
            up2.x, up2.y, up2.z, -up2.dot(eye),
            -forward.x, -forward.y, -forward.z, forward.dot(eye),
            0.0, 0.0, 0.0, 1.0,
        ])
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        self.mul_mat4(&other)
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        self.mul_vec4(v)
    }
}
