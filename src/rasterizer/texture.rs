//! Square power-of-two textures with a box-filtered mipmap chain
//!
//! Texel data goes in through `set_data`, which builds every level down to
//! 1x1 up front. Sampling a single level dispatches on the texture's filter
//! and wrap modes; blending between levels is done by the rasterizer.

use std::path::Path;

use super::math::{fract, lerp};
use super::types::{Color, TextureFilter, WrapMode};

/// Error type for texture loading
#[derive(Debug)]
pub enum TextureError {
    Image(image::ImageError),
    /// Source image is not square or not a power of two
    Dimensions { width: usize, height: usize },
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::Image(e)
    }
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureError::Image(e) => write!(f, "Image error: {}", e),
            TextureError::Dimensions { width, height } => write!(
                f,
                "Texture must be square and a power of two, got {}x{}",
                width, height
            ),
        }
    }
}

/// One level of the mip chain (always square)
#[derive(Debug, Clone)]
pub struct MipLevel {
    pub size: usize,
    pub texels: Vec<Color>,
}

impl MipLevel {
    pub fn texel(&self, x: usize, y: usize) -> Color {
        self.texels[y * self.size + x]
    }

    /// 2x2 box filter: integer average per channel, truncating
    fn downsample(&self) -> MipLevel {
        let size = self.size / 2;
        let mut texels = Vec::with_capacity(size * size);

        for y in 0..size {
            for x in 0..size {
                let quad = [
                    self.texel(2 * x, 2 * y),
                    self.texel(2 * x + 1, 2 * y),
                    self.texel(2 * x, 2 * y + 1),
                    self.texel(2 * x + 1, 2 * y + 1),
                ];
                let sum = |f: fn(&Color) -> u8| quad.iter().map(|c| f(c) as u16).sum::<u16>() / 4;
                texels.push(Color::new(
                    sum(|c| c.r) as u8,
                    sum(|c| c.g) as u8,
                    sum(|c| c.b) as u8,
                ));
            }
        }

        MipLevel { size, texels }
    }
}

/// Texture with a precomputed mip chain
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub filter: TextureFilter,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub name: String,
    levels: Vec<MipLevel>,
}

impl Texture {
    /// Record dimensions only; storage arrives with `set_data`
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            filter: TextureFilter::default(),
            wrap_u: WrapMode::default(),
            wrap_v: WrapMode::default(),
            name: String::new(),
            levels: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_u = wrap;
        self.wrap_v = wrap;
        self
    }

    /// Assign texel data and rebuild the mip chain.
    ///
    /// Panics unless `width == height`, the size is a power of two and
    /// `texels` holds exactly `width * height` entries.
    pub fn set_data(&mut self, texels: &[Color], width: usize, height: usize) {
        assert!(
            width == height && width.is_power_of_two(),
            "texture must be square and a power of two, got {}x{}",
            width,
            height
        );
        assert_eq!(texels.len(), width * height, "texel count does not match {}x{}", width, height);

        let count = width.trailing_zeros() as usize + 1;
        let mut levels = Vec::with_capacity(count);
        levels.push(MipLevel { size: width, texels: texels.to_vec() });
        while let Some(last) = levels.last().filter(|l| l.size > 1) {
            let next = last.downsample();
            levels.push(next);
        }

        log::debug!("Built {} mip levels for {}x{} texture '{}'", levels.len(), width, height, self.name);

        self.width = width;
        self.height = height;
        self.levels = levels;
    }

    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Sample one mip level at `u, v` in 0..1 texture space.
    /// `level` is clamped to the chain; a texture without data samples black.
    pub fn sample_level(&self, u: f32, v: f32, level: usize) -> Color {
        let Some(mip) = self.levels.get(level).or(self.levels.last()) else {
            return Color::BLACK;
        };

        match self.filter {
            TextureFilter::Nearest => {
                let x = nearest(u, mip.size, self.wrap_u);
                let y = nearest(v, mip.size, self.wrap_v);
                mip.texel(x, y)
            }
            TextureFilter::Linear => {
                let (x0, x1, tx) = linear(u, mip.size, self.wrap_u);
                let (y0, y1, ty) = linear(v, mip.size, self.wrap_v);

                let c00 = mip.texel(x0, y0);
                let c10 = mip.texel(x1, y0);
                let c01 = mip.texel(x0, y1);
                let c11 = mip.texel(x1, y1);

                let blend = |a: u8, b: u8, c: u8, d: u8| {
                    lerp(lerp(a as f32, b as f32, tx), lerp(c as f32, d as f32, tx), ty) as u8
                };
                Color::new(
                    blend(c00.r, c10.r, c01.r, c11.r),
                    blend(c00.g, c10.g, c01.g, c11.g),
                    blend(c00.b, c10.b, c01.b, c11.b),
                )
            }
        }
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(size: usize, cell: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        let mut tex = Self::new(size, size);
        tex.name = "checkerboard".to_string();
        tex.set_data(&pixels, size, size);
        tex
    }

    /// Load texture from an image file (PNG, JPEG, BMP)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let tex = Self::from_image(img, name)?;
        log::info!("Loaded texture: {} ({}x{}, {} levels)", tex.name, tex.width, tex.height, tex.level_count());
        Ok(tex)
    }

    /// Load texture from encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(img, name)
    }

    fn from_image(img: image::DynamicImage, name: String) -> Result<Self, TextureError> {
        let rgb = img.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        if width != height || !width.is_power_of_two() {
            return Err(TextureError::Dimensions { width, height });
        }

        let texels: Vec<Color> = rgb.pixels().map(|p| Color::new(p[0], p[1], p[2])).collect();

        let mut tex = Self::new(width, height);
        tex.name = name;
        tex.set_data(&texels, width, height);
        Ok(tex)
    }
}

/// Texel index for nearest filtering
fn nearest(coord: f32, size: usize, wrap: WrapMode) -> usize {
    match wrap {
        WrapMode::Clamp => ((coord * size as f32).floor() as i64).clamp(0, size as i64 - 1) as usize,
        WrapMode::Repeat => ((fract(coord) * size as f32) as usize) % size,
    }
}

/// Neighbouring texel indices and blend weight for half-texel-centered
/// bilinear filtering along one axis
fn linear(coord: f32, size: usize, wrap: WrapMode) -> (usize, usize, f32) {
    let s = size as f32;
    match wrap {
        WrapMode::Clamp => {
            let c = coord * s;
            let t = if c < 0.5 {
                0.0
            } else if c > s - 0.5 {
                1.0
            } else {
                fract(c - 0.5)
            };
            let max = size as i64 - 1;
            let i0 = ((c - 0.5) as i64).clamp(0, max) as usize;
            let i1 = ((c + 0.5) as i64).clamp(0, max) as usize;
            (i0, i1, t)
        }
        WrapMode::Repeat => {
            let c = fract(coord) * s - 0.5;
            let base = c.floor();
            let i0 = (base as i64).rem_euclid(size as i64) as usize;
            (i0, (i0 + 1) % size, c - base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(size: usize) -> Vec<Color> {
        (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                Color::new((x * 37 % 256) as u8, (y * 53 % 256) as u8, ((x * y * 11) % 256) as u8)
            })
            .collect()
    }

    #[test]
    fn test_level_count_and_sizes() {
        let mut tex = Texture::new(8, 8);
        assert_eq!(tex.level_count(), 0);

        tex.set_data(&gradient(8), 8, 8);
        let sizes: Vec<usize> = tex.levels().iter().map(|l| l.size).collect();
        assert_eq!(sizes, vec![8, 4, 2, 1]);
        assert_eq!(tex.levels()[0].texels, gradient(8));
    }

    #[test]
    fn test_mip_level_is_box_average() {
        let mut tex = Texture::new(4, 4);
        tex.set_data(&gradient(4), 4, 4);

        let l0 = &tex.levels()[0];
        let l1 = &tex.levels()[1];
        for j in 0..2 {
            for i in 0..2 {
                let quad = [
                    l0.texel(2 * i, 2 * j),
                    l0.texel(2 * i + 1, 2 * j),
                    l0.texel(2 * i, 2 * j + 1),
                    l0.texel(2 * i + 1, 2 * j + 1),
                ];
                let avg = |f: fn(&Color) -> u8| (quad.iter().map(|c| f(c) as u32).sum::<u32>() / 4) as u8;
                assert_eq!(l1.texel(i, j), Color::new(avg(|c| c.r), avg(|c| c.g), avg(|c| c.b)));
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_non_power_of_two_panics() {
        let mut tex = Texture::new(6, 6);
        tex.set_data(&vec![Color::WHITE; 36], 6, 6);
    }

    #[test]
    #[should_panic]
    fn test_non_square_panics() {
        let mut tex = Texture::new(8, 4);
        tex.set_data(&vec![Color::WHITE; 32], 8, 4);
    }

    #[test]
    fn test_bilinear_texel_center_is_exact() {
        let mut tex = Texture::new(4, 4);
        tex.set_data(&gradient(4), 4, 4);

        // Center of texel (2, 1)
        let c = tex.sample_level(2.5 / 4.0, 1.5 / 4.0, 0);
        assert_eq!(c, tex.levels()[0].texel(2, 1));
    }

    #[test]
    fn test_bilinear_clamps_at_edges() {
        let texels = vec![Color::RED, Color::BLUE, Color::GREEN, Color::WHITE];
        let mut tex = Texture::new(2, 2);
        tex.set_data(&texels, 2, 2);

        // Left/top border never blends with the opposite edge
        assert_eq!(tex.sample_level(0.0, 0.0, 0), Color::RED);
        assert_eq!(tex.sample_level(-3.0, -3.0, 0), Color::RED);
        assert_eq!(tex.sample_level(1.0, 1.0, 0), Color::WHITE);
        assert_eq!(tex.sample_level(7.0, 0.0, 0), Color::BLUE);

        // Halfway between the two top texels
        let mid = tex.sample_level(0.5, 0.25, 0);
        assert_eq!(mid, Color::new(127, 0, 127));
    }

    #[test]
    fn test_nearest_filter() {
        let texels = vec![Color::RED, Color::BLUE, Color::GREEN, Color::WHITE];
        let mut tex = Texture::new(2, 2).with_filter(TextureFilter::Nearest);
        tex.set_data(&texels, 2, 2);

        assert_eq!(tex.sample_level(0.49, 0.2, 0), Color::RED);
        assert_eq!(tex.sample_level(0.51, 0.2, 0), Color::BLUE);
        assert_eq!(tex.sample_level(0.2, 0.9, 0), Color::GREEN);
        assert_eq!(tex.sample_level(1.5, 1.5, 0), Color::WHITE);
    }

    #[test]
    fn test_repeat_wraps_coordinates() {
        let texels = vec![Color::RED, Color::BLUE, Color::GREEN, Color::WHITE];
        let mut tex = Texture::new(2, 2)
            .with_filter(TextureFilter::Nearest)
            .with_wrap(WrapMode::Repeat);
        tex.set_data(&texels, 2, 2);

        assert_eq!(tex.sample_level(1.25, 0.25, 0), Color::RED);
        assert_eq!(tex.sample_level(-0.25, 0.25, 0), Color::BLUE);

        // Linear filtering blends across the wrapped seam
        tex.filter = TextureFilter::Linear;
        let seam = tex.sample_level(0.0, 0.25, 0);
        assert_eq!(seam, Color::new(127, 0, 127));
    }

    #[test]
    fn test_level_is_clamped_to_chain() {
        let tex = Texture::checkerboard(4, 1, Color::WHITE, Color::BLACK);
        assert_eq!(tex.level_count(), 3);
        let last = tex.levels()[2].texel(0, 0);
        assert_eq!(tex.sample_level(0.5, 0.5, 99), last);
    }

    #[test]
    fn test_texture_without_data_samples_black() {
        let tex = Texture::new(16, 16);
        assert_eq!(tex.sample_level(0.5, 0.5, 0), Color::BLACK);
    }

    #[test]
    fn test_from_bytes_rejects_non_power_of_two() {
        let img = image::RgbImage::from_pixel(3, 3, image::Rgb([1, 2, 3]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();

        let result = Texture::from_bytes(bytes.get_ref(), "odd".to_string());
        assert!(matches!(result, Err(TextureError::Dimensions { width: 3, height: 3 })));
    }
}
