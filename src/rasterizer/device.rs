//! Draw pipeline: bound state plus the vertex transform stage
//!
//! A `Device` owns the framebuffer it renders into and borrows at most one
//! texture. `draw` runs model -> view -> projection, the perspective divide
//! and the NDC -> sub-pixel viewport mapping, then hands each triangle to
//! the fill engine in index order. Nothing is clipped.

use super::framebuffer::Framebuffer;
use super::math::{remap, Mat4};
use super::render::{rasterize_triangle, RasterVertex, GUARD_BAND};
use super::texture::Texture;
use super::types::{Color, Mesh, RasterSettings, Vertex};
use super::SUBPIXEL_SCALE;

pub struct Device<'a> {
    fb: Framebuffer,
    pub projection: Mat4,
    pub view: Mat4,
    pub settings: RasterSettings,
    texture: Option<&'a Texture>,
}

impl<'a> Device<'a> {
    pub fn new(fb: Framebuffer) -> Self {
        Self {
            fb,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            settings: RasterSettings::default(),
            texture: None,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.fb
    }

    pub fn into_framebuffer(self) -> Framebuffer {
        self.fb
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn set_settings(&mut self, settings: RasterSettings) {
        self.settings = settings;
    }

    /// Bind (or unbind with `None`) the texture used by subsequent draws
    pub fn bind_texture(&mut self, texture: Option<&'a Texture>) {
        self.texture = texture;
    }

    pub fn texture(&self) -> Option<&'a Texture> {
        self.texture
    }

    pub fn clear(&mut self, color: Color) {
        self.fb.clear(color);
    }

    pub fn pixel(&mut self, x: i32, y: i32, color: Color) {
        self.fb.set_pixel(x, y, color);
    }

    pub fn point(&mut self, x: f32, y: f32, color: Color) {
        self.fb.point(x, y, color);
    }

    /// Clip space -> perspective divide -> sub-pixel screen position
    fn project(&self, mvp: &Mat4, v: &Vertex) -> RasterVertex {
        let guard = GUARD_BAND as f32;
        let sub = SUBPIXEL_SCALE as f32;

        let clip = *mvp * v.pos.extend(1.0);
        let w = clip.w;
        let ndc = clip.xyz().scale(1.0 / w);

        let x = (remap(ndc.x, -1.0, 1.0, 0.0, self.fb.width as f32) * sub).clamp(-guard, guard);
        let y = (remap(ndc.y, -1.0, 1.0, self.fb.height as f32, 0.0) * sub).clamp(-guard, guard);

        RasterVertex::new(x as i32, y as i32, ndc.z, w, v.uv, v.color)
    }

    /// Transform and rasterize every triangle of `mesh`.
    /// Returns the number of samples written.
    pub fn draw(&mut self, mesh: &Mesh) -> usize {
        let mvp = self.projection * self.view * mesh.model;

        let mut written = 0;
        let mut skipped = 0;

        for tri in mesh.indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (
                mesh.vertices.get(tri[0]),
                mesh.vertices.get(tri[1]),
                mesh.vertices.get(tri[2]),
            ) else {
                skipped += 1;
                continue;
            };

            let verts = [a, b, c].map(|v| self.project(&mvp, v));
            written += rasterize_triangle(&mut self.fb, &verts, self.texture, &self.settings);
        }

        if skipped > 0 {
            log::warn!("Skipped {} triangles with out-of-range indices", skipped);
        }
        log::trace!(
            "Drew {} triangles, {} samples written",
            mesh.triangle_count(),
            written
        );

        written
    }

    /// Outline every triangle of `mesh` with single-pixel lines, ignoring
    /// depth. Triangles with a vertex behind the camera are skipped.
    pub fn draw_wireframe(&mut self, mesh: &Mesh, color: Color) {
        let mvp = self.projection * self.view * mesh.model;
        let sub = SUBPIXEL_SCALE;

        for tri in mesh.indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (
                mesh.vertices.get(tri[0]),
                mesh.vertices.get(tri[1]),
                mesh.vertices.get(tri[2]),
            ) else {
                continue;
            };

            let verts = [a, b, c].map(|v| self.project(&mvp, v));
            if verts.iter().any(|v| v.w <= 0.0) {
                continue;
            }

            for i in 0..3 {
                let (p, q) = (verts[i], verts[(i + 1) % 3]);
                self.fb.draw_line(p.x / sub, p.y / sub, q.x / sub, q.y / sub, color);
            }
        }
    }
}
