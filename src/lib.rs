//! msaa-raster: CPU-only triangle rasterizer
//!
//! Converts transformed, indexed triangle meshes into a multisampled,
//! depth-tested, optionally textured image without any GPU.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod config;
