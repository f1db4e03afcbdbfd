//! Triangle fill engine
//!
//! Fixed-point edge functions evaluated over 2x2 pixel quads, 4x rotated-grid
//! MSAA coverage, perspective-correct attribute interpolation, a per-sample
//! depth test and trilinear texturing with LOD taken from quad derivatives.

use super::framebuffer::Framebuffer;
use super::math::{fract, Vec2, Vec3};
use super::texture::Texture;
use super::types::{Color, RasterSettings, ShadeMode};
use super::{SAMPLE_COUNT, SUBPIXEL_SCALE};

/// Vertex coordinates are clamped to this many sub-pixel units either side
/// of the origin so edge-function products stay inside `i64`
pub const GUARD_BAND: i32 = 1 << 24;

const HALF_PIXEL: i64 = SUBPIXEL_SCALE as i64 / 2;
const QUAD_STEP: usize = 2 * SUBPIXEL_SCALE as usize;

/// Sub-sample offsets from the pixel center, in 1/16 pixel units (rotated grid)
pub const SAMPLE_PATTERN: [(i64, i64); SAMPLE_COUNT] = [
    (-2, -6),
    (6, -2),
    (-6, 2),
    (2, 6),
];

/// Pixel offsets of a quad: top-left, top-right, bottom-left, bottom-right
const QUAD_OFFSETS: [(i64, i64); 4] = [
    (0, 0),
    (SUBPIXEL_SCALE as i64, 0),
    (0, SUBPIXEL_SCALE as i64),
    (SUBPIXEL_SCALE as i64, SUBPIXEL_SCALE as i64),
];

/// Screen-space vertex ready for rasterization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterVertex {
    /// Sub-pixel position (1/16 pixel), y down
    pub x: i32,
    pub y: i32,
    /// Depth after the perspective divide
    pub z: f32,
    /// Clip-space w
    pub w: f32,
    /// Texture coordinate divided by `w`
    pub uv: Vec2,
    /// Vertex color (0..1) divided by `w`
    pub color: Vec3,
}

impl RasterVertex {
    /// Build from undivided attributes, applying the `1/w` pre-divide
    pub fn new(x: i32, y: i32, z: f32, w: f32, uv: Vec2, color: Vec3) -> Self {
        Self {
            x,
            y,
            z,
            w,
            uv: uv.scale(1.0 / w),
            color: color.scale(1.0 / w),
        }
    }
}

/// Edge `a -> b`, positive on the inside of a front-facing triangle
#[derive(Debug, Clone, Copy)]
struct Edge {
    xa: i64,
    ya: i64,
    dx: i64,
    dy: i64,
    /// Top-left rule tie-break
    bias: i64,
}

impl Edge {
    fn new(a: &RasterVertex, b: &RasterVertex) -> Self {
        let (xa, ya, xb, yb) = (a.x as i64, a.y as i64, b.x as i64, b.y as i64);
        let bias = ((ya == yb && xb < xa) || yb < ya) as i64;
        Self { xa, ya, dx: xb - xa, dy: yb - ya, bias }
    }

    #[inline]
    fn eval(&self, px: i64, py: i64) -> i64 {
        (px - self.xa) * self.dy - (py - self.ya) * self.dx + self.bias
    }

    /// Change in `eval` when moving by (sx, sy)
    #[inline]
    fn step(&self, sx: i64, sy: i64) -> i64 {
        sx * self.dy - sy * self.dx
    }
}

/// Signed doubled area in sub-pixel units; positive means back-facing
pub fn signed_area(v: &[RasterVertex; 3]) -> i64 {
    let (x0, y0) = (v[0].x as i64, v[0].y as i64);
    let (x1, y1) = (v[1].x as i64, v[1].y as i64);
    let (x2, y2) = (v[2].x as i64, v[2].y as i64);
    (x1 - x0) * (y2 - y0) - (y1 - y0) * (x2 - x0)
}

/// Interpolated attributes at one pixel center
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Fragment {
    pub z: f32,
    pub uv: Vec2,
    pub color: Vec3,
}

/// Perspective-correct interpolation from barycentric weights `l`
pub fn interpolate(v: &[RasterVertex; 3], l: [f32; 3]) -> Fragment {
    let z = 1.0 / (l[0] / v[0].z + l[1] / v[1].z + l[2] / v[2].z);
    let w = 1.0 / (l[0] / v[0].w + l[1] / v[1].w + l[2] / v[2].w);

    let uv = (v[0].uv * l[0] + v[1].uv * l[1] + v[2].uv * l[2]) * w;
    let color = (v[0].color * l[0] + v[1].color * l[1] + v[2].color * l[2]) * w;

    Fragment { z, uv, color }
}

/// Continuous mip level from texel-space derivatives (never negative)
pub fn compute_lod(ddx: Vec2, ddy: Vec2) -> f32 {
    (ddx.len_sq().max(ddy.len_sq()).log2() / 2.0).max(0.0)
}

/// Blend the two mip levels around `lod`
pub fn sample_trilinear(texture: &Texture, uv: Vec2, lod: f32) -> Color {
    let last = texture.level_count().saturating_sub(1);
    let base = lod.floor() as usize;
    let l0 = base.min(last);
    let l1 = (base + 1).min(last);

    let a = texture.sample_level(uv.x, uv.y, l0);
    if l0 == l1 {
        return a;
    }
    let b = texture.sample_level(uv.x, uv.y, l1);
    a.lerp(b, fract(lod))
}

/// Per-pixel state of one quad
#[derive(Debug, Clone, Copy, Default)]
struct QuadPixel {
    coverage: u8,
    frag: Fragment,
}

/// Rasterize one triangle into `fb`. Returns the number of samples written.
pub fn rasterize_triangle(
    fb: &mut Framebuffer,
    v: &[RasterVertex; 3],
    texture: Option<&Texture>,
    settings: &RasterSettings,
) -> usize {
    let v = &v.map(|mut p| {
        p.x = p.x.clamp(-GUARD_BAND, GUARD_BAND);
        p.y = p.y.clamp(-GUARD_BAND, GUARD_BAND);
        p
    });

    // Backface cull
    if signed_area(v) > 0 {
        return 0;
    }

    // Bounding box, snapped to whole pixels and clamped to the framebuffer
    let sub = SUBPIXEL_SCALE as i64;
    let xs = [v[0].x as i64, v[1].x as i64, v[2].x as i64];
    let ys = [v[0].y as i64, v[1].y as i64, v[2].y as i64];
    let left = (xs.iter().min().copied().unwrap_or(0) & !(sub - 1)).max(0);
    let right = (xs.iter().max().copied().unwrap_or(0) & !(sub - 1)).min((fb.width as i64 - 1) * sub);
    let top = (ys.iter().min().copied().unwrap_or(0) & !(sub - 1)).max(0);
    let bottom = (ys.iter().max().copied().unwrap_or(0) & !(sub - 1)).min((fb.height as i64 - 1) * sub);

    if left > right || top > bottom {
        return 0;
    }

    let e01 = Edge::new(&v[0], &v[1]);
    let e12 = Edge::new(&v[1], &v[2]);
    let e20 = Edge::new(&v[2], &v[0]);

    let textured = match (settings.shading, texture) {
        (ShadeMode::Texture, Some(tex)) if tex.level_count() > 0 => Some(tex),
        _ => None,
    };

    let mut written = 0;

    for qy in (top..=bottom).step_by(QUAD_STEP) {
        for qx in (left..=right).step_by(QUAD_STEP) {
            let mut quad = [QuadPixel::default(); 4];

            for (pixel, &(ox, oy)) in quad.iter_mut().zip(QUAD_OFFSETS.iter()) {
                let (x, y) = (qx + ox, qy + oy);
                let (cx, cy) = (x + HALF_PIXEL, y + HALF_PIXEL);

                let w01 = e01.eval(cx, cy);
                let w12 = e12.eval(cx, cy);
                let w20 = e20.eval(cx, cy);

                // Pixels past the box still interpolate, for derivatives only
                if x <= right && y <= bottom {
                    for (s, &(sx, sy)) in SAMPLE_PATTERN.iter().enumerate() {
                        if w01 + e01.step(sx, sy) > 0
                            && w12 + e12.step(sx, sy) > 0
                            && w20 + e20.step(sx, sy) > 0
                        {
                            pixel.coverage |= 1 << s;
                        }
                    }
                }

                let sum = (w01 + w12 + w20) as f32;
                let l = [w12 as f32 / sum, w20 as f32 / sum, w01 as f32 / sum];
                pixel.frag = interpolate(v, l);
                if settings.clamp_depth {
                    pixel.frag.z = pixel.frag.z.clamp(0.0, 1.0);
                }
            }

            if quad.iter().all(|p| p.coverage == 0) {
                continue;
            }

            for (i, &(ox, oy)) in QUAD_OFFSETS.iter().enumerate() {
                let QuadPixel { mut coverage, frag } = quad[i];
                if coverage == 0 {
                    continue;
                }

                let px = ((qx + ox) / sub) as usize;
                let py = ((qy + oy) / sub) as usize;
                let base = fb.index(px, py);

                // Depth test; ties pass
                for s in 0..SAMPLE_COUNT {
                    if coverage & (1 << s) != 0 && frag.z > fb.depths[base + s] {
                        coverage &= !(1 << s);
                    }
                }
                if coverage == 0 {
                    continue;
                }

                let color = match textured {
                    Some(tex) => {
                        let texels = tex.width as f32;
                        let row = i & 2;
                        let col = i & 1;
                        let ddx = (quad[row | 1].frag.uv - quad[row].frag.uv) * texels;
                        let ddy = (quad[2 | col].frag.uv - quad[col].frag.uv) * texels;
                        sample_trilinear(tex, frag.uv, compute_lod(ddx, ddy))
                    }
                    None => Color::from_unit(frag.color),
                };

                for s in 0..SAMPLE_COUNT {
                    if coverage & (1 << s) != 0 {
                        fb.colors[base + s] = color;
                        fb.depths[base + s] = frag.z;
                        written += 1;
                    }
                }
            }
        }
    }

    written
}
