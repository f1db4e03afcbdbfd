//! Software MSAA triangle rasterizer
//!
//! Features:
//! - 1/16 sub-pixel fixed-point edge functions with a top-left fill rule
//! - 4x MSAA on a rotated sample grid, with a depth buffer per sample
//! - Perspective-correct texture coordinates and vertex colors
//! - Mipmapped textures, trilinear filtering with per-pixel LOD
//! - No clipping: geometry crossing the camera plane is not fixed up

mod math;
mod types;
mod framebuffer;
mod texture;
mod render;
mod device;

pub use math::*;
pub use types::*;
pub use framebuffer::*;
pub use texture::*;
pub use render::*;
pub use device::*;

/// Samples stored per pixel
pub const SAMPLE_COUNT: usize = 4;

/// Sub-pixel units per pixel in screen-space vertex positions
pub const SUBPIXEL_SCALE: i32 = 16;

/// Default render resolution for the viewer
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
