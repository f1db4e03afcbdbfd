//! Multisampled framebuffer
//!
//! Every pixel owns `SAMPLE_COUNT` color and depth samples, stored
//! contiguously: sample `s` of pixel `(x, y)` lives at
//! `(y * width + x) * SAMPLE_COUNT + s`.

use super::math::remap;
use super::types::Color;
use super::SAMPLE_COUNT;

/// Depth written by `clear` (farthest possible)
pub const CLEAR_DEPTH: f32 = 1.0;

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub colors: Vec<Color>, // SAMPLE_COUNT per pixel
    pub depths: Vec<f32>,   // SAMPLE_COUNT per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "framebuffer must be non-empty, got {}x{}", width, height);

        let samples = width * height * SAMPLE_COUNT;
        log::info!("Created {}x{} framebuffer ({}x MSAA)", width, height, SAMPLE_COUNT);

        Self {
            colors: vec![Color::BLACK; samples],
            depths: vec![CLEAR_DEPTH; samples],
            width,
            height,
        }
    }

    /// Index of the first sample of a pixel; caller guarantees bounds
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * SAMPLE_COUNT
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn clear(&mut self, color: Color) {
        self.colors.fill(color);
        self.depths.fill(CLEAR_DEPTH);
    }

    /// Write all samples of one pixel. Out-of-bounds writes are dropped.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.contains(x, y) {
            return;
        }
        let idx = self.index(x as usize, y as usize);
        self.colors[idx..idx + SAMPLE_COUNT].fill(color);
    }

    /// Plot a point given in normalized device coordinates (y up)
    pub fn point(&mut self, x: f32, y: f32, color: Color) {
        let px = remap(x, -1.0, 1.0, 0.0, self.width as f32).floor() as i32;
        let py = remap(y, -1.0, 1.0, self.height as f32, 0.0).floor() as i32;
        self.set_pixel(px, py, color);
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn sample_color(&self, x: usize, y: usize, sample: usize) -> Color {
        self.colors[self.index(x, y) + sample]
    }

    pub fn sample_depth(&self, x: usize, y: usize, sample: usize) -> f32 {
        self.depths[self.index(x, y) + sample]
    }

    /// All samples of one pixel
    pub fn pixel_samples(&self, x: usize, y: usize) -> &[Color] {
        let idx = self.index(x, y);
        &self.colors[idx..idx + SAMPLE_COUNT]
    }

    /// Unweighted average of a pixel's samples (floor division per channel)
    pub fn resolve_pixel(&self, x: usize, y: usize) -> Color {
        average(self.pixel_samples(x, y))
    }

    /// Collapse the sample groups into one color per pixel
    pub fn resolve(&self) -> Vec<Color> {
        self.colors.chunks_exact(SAMPLE_COUNT).map(average).collect()
    }

    /// Resolve into an RGBA8 buffer of `width * height * 4` bytes
    pub fn resolve_rgba(&self, out: &mut [u8]) {
        assert_eq!(out.len(), self.width * self.height * 4, "RGBA buffer size mismatch");
        for (group, px) in self.colors.chunks_exact(SAMPLE_COUNT).zip(out.chunks_exact_mut(4)) {
            px.copy_from_slice(&average(group).to_rgba());
        }
    }
}

fn average(samples: &[Color]) -> Color {
    let n = samples.len() as u32;
    let (r, g, b) = samples.iter().fold((0u32, 0u32, 0u32), |(r, g, b), c| {
        (r + c.r as u32, g + c.g as u32, b + c.b as u32)
    });
    Color::new((r / n) as u8, (g / n) as u8, (b / n) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_sets_every_sample() {
        let mut fb = Framebuffer::new(7, 5);
        fb.colors[3] = Color::RED;
        fb.depths[9] = 0.25;

        fb.clear(Color::new(10, 20, 30));

        assert_eq!(fb.colors.len(), 7 * 5 * SAMPLE_COUNT);
        assert!(fb.colors.iter().all(|&c| c == Color::new(10, 20, 30)));
        assert!(fb.depths.iter().all(|&d| d == CLEAR_DEPTH));
    }

    #[test]
    fn test_set_pixel_ignores_out_of_bounds() {
        let mut fb = Framebuffer::new(4, 4);
        fb.clear(Color::BLACK);

        fb.set_pixel(-1, 0, Color::RED);
        fb.set_pixel(0, -1, Color::RED);
        fb.set_pixel(4, 0, Color::RED);
        fb.set_pixel(0, 4, Color::RED);
        assert!(fb.colors.iter().all(|&c| c == Color::BLACK));

        fb.set_pixel(2, 1, Color::RED);
        assert!(fb.pixel_samples(2, 1).iter().all(|&c| c == Color::RED));
        assert_eq!(fb.colors.iter().filter(|&&c| c == Color::RED).count(), SAMPLE_COUNT);
    }

    #[test]
    fn test_point_flips_y() {
        let mut fb = Framebuffer::new(4, 4);
        fb.clear(Color::BLACK);

        // Upper-left quadrant in NDC is the top-left pixel
        fb.point(-0.9, 0.9, Color::GREEN);
        assert_eq!(fb.resolve_pixel(0, 0), Color::GREEN);
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut fb = Framebuffer::new(8, 8);
        fb.clear(Color::BLACK);
        fb.draw_line(0, 0, 7, 7, Color::WHITE);
        for i in 0..8 {
            assert_eq!(fb.resolve_pixel(i, i), Color::WHITE);
        }
    }

    #[test]
    fn test_resolve_averages_samples() {
        let mut fb = Framebuffer::new(2, 1);
        fb.clear(Color::BLACK);

        let idx = fb.index(1, 0);
        fb.colors[idx] = Color::new(255, 0, 3);
        fb.colors[idx + 1] = Color::new(255, 0, 0);

        let resolved = fb.resolve();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0], Color::BLACK);
        assert_eq!(resolved[1], Color::new(127, 0, 0));

        let mut rgba = vec![0u8; 2 * 4];
        fb.resolve_rgba(&mut rgba);
        assert_eq!(&rgba[4..8], &[127, 0, 0, 255]);
    }

    #[test]
    #[should_panic]
    fn test_zero_sized_framebuffer_panics() {
        Framebuffer::new(0, 16);
    }
}
