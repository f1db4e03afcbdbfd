//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::math::{lerp, Mat4, Vec2, Vec3};

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert a 0.0-1.0 per-channel color; values are truncated and saturate
    pub fn from_unit(c: Vec3) -> Self {
        Self {
            r: (c.x * 255.0) as u8,
            g: (c.y * 255.0) as u8,
            b: (c.z * 255.0) as u8,
        }
    }

    /// Per-channel linear blend, truncated
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: lerp(self.r as f32, other.r as f32, t) as u8,
            g: lerp(self.g as f32, other.g as f32, t) as u8,
            b: lerp(self.b as f32, other.b as f32, t) as u8,
        }
    }

    /// RGBA bytes (opaque) for uploading to a display texture
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// A vertex with position, color and texture coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub pos: Vec3,
    /// Per-channel 0.0-1.0, white unless set
    pub color: Vec3,
    pub uv: Vec2,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            color: Vec3::ONE,
            uv: Vec2::ZERO,
        }
    }
}

impl Vertex {
    pub fn new(pos: Vec3, uv: Vec2) -> Self {
        Self { pos, uv, color: Vec3::ONE }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn from_pos(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
            ..Self::default()
        }
    }
}

/// Indexed triangle list plus its model transform.
/// Index triples are counter-clockwise for front faces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<usize>,
    pub model: Mat4,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<usize>) -> Self {
        Self {
            vertices,
            indices,
            model: Mat4::IDENTITY,
        }
    }

    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Cube spanning -1..1 on each axis; 4 vertices and 2 triangles per face
    pub fn cube() -> Self {
        let positions = [
            // Front face
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            // Back face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            // Top face
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
            // Bottom face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            // Right face
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            // Left face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ];

        let colors = [
            Vec3::new(1.0, 0.3, 0.3),
            Vec3::new(0.3, 1.0, 0.3),
            Vec3::new(0.3, 0.3, 1.0),
            Vec3::new(1.0, 1.0, 0.3),
            Vec3::new(0.3, 1.0, 1.0),
            Vec3::new(1.0, 0.3, 1.0),
        ];

        let uvs = [
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for face in 0..6 {
            let base = face * 4;
            for i in 0..4 {
                vertices.push(Vertex::new(positions[base + i], uvs[i]).with_color(colors[face]));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    /// Horizontal square at height `y`, facing up, with UVs tiled `uv_scale` times
    pub fn plane(half_extent: f32, y: f32, uv_scale: f32) -> Self {
        let h = half_extent;
        let vertices = vec![
            Vertex::new(Vec3::new(-h, y, h), Vec2::new(0.0, uv_scale)),
            Vertex::new(Vec3::new(h, y, h), Vec2::new(uv_scale, uv_scale)),
            Vertex::new(Vec3::new(h, y, -h), Vec2::new(uv_scale, 0.0)),
            Vertex::new(Vec3::new(-h, y, -h), Vec2::new(0.0, 0.0)),
        ];
        Self::new(vertices, vec![0, 1, 2, 0, 2, 3])
    }
}

/// Fragment output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadeMode {
    /// Perspective-correct blend of the vertex colors
    Color,
    /// Trilinear sample of the bound texture (falls back to `Color` when none is bound)
    #[default]
    Texture,
}

/// Texel filter used within a single mip level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

/// Behaviour for texture coordinates outside 0..1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    #[default]
    Clamp,
    Repeat,
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Fragment output mode
    pub shading: ShadeMode,
    /// Clamp interpolated depth into 0..1 before the depth test
    pub clamp_depth: bool,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            shading: ShadeMode::Texture,
            clamp_depth: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_lerp_truncates() {
        let c = Color::new(0, 100, 255).lerp(Color::new(255, 101, 0), 0.5);
        assert_eq!(c, Color::new(127, 100, 127));
    }

    #[test]
    fn test_from_unit_saturates() {
        let c = Color::from_unit(Vec3::new(2.0, -1.0, 0.5));
        assert_eq!(c, Color::new(255, 0, 127));
    }

    #[test]
    fn test_cube_topology() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.indices.iter().all(|&i| i < cube.vertices.len()));
    }

    #[test]
    fn test_cube_faces_wind_outwards() {
        let cube = Mesh::cube();
        for tri in cube.indices.chunks_exact(3) {
            let a = cube.vertices[tri[0]].pos;
            let b = cube.vertices[tri[1]].pos;
            let c = cube.vertices[tri[2]].pos;
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c).scale(1.0 / 3.0);
            assert!(normal.dot(centroid) > 0.0);
        }
    }
}
