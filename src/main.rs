//! msaa-raster viewer
//!
//! Spins a textured cube over a ground plane, rendered entirely on the CPU:
//! clear -> draw -> resolve the 4x MSAA framebuffer -> upload -> present.
//!
//! Usage: `msaa-raster [config.ron]`

use macroquad::prelude::*;
use msaa_raster::config::{ViewerConfig, DEFAULT_CONFIG_PATH};
use msaa_raster::rasterizer::{
    Color as RasterColor, Device, Framebuffer, Mat4, Mesh, Texture, Vec3 as RasterVec3,
};
use msaa_raster::VERSION;

fn window_conf(config: &ViewerConfig) -> Conf {
    Conf {
        window_title: format!("msaa-raster v{}", VERSION),
        window_width: (config.width as u32 * config.window_scale) as i32,
        window_height: (config.height as u32 * config.window_scale) as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Texture from the configured image, or a checkerboard if that fails
fn load_scene_texture(config: &ViewerConfig) -> Texture {
    let texture = match &config.texture {
        Some(path) => match Texture::from_file(path) {
            Ok(tex) => Some(tex),
            Err(e) => {
                log::warn!("Failed to load texture {}: {}", path.display(), e);
                None
            }
        },
        None => None,
    };

    texture
        .unwrap_or_else(|| {
            Texture::checkerboard(
                256,
                32,
                RasterColor::new(230, 230, 230),
                RasterColor::new(180, 40, 40),
            )
        })
        .with_filter(config.filter)
        .with_wrap(config.wrap)
}

async fn run(config: ViewerConfig) {
    let (w, h) = (config.width, config.height);
    let texture = load_scene_texture(&config);

    let mut device = Device::new(Framebuffer::new(w, h));
    device.set_settings(config.raster.clone());
    device.set_projection(Mat4::perspective(
        config.fov_y.to_radians(),
        config.aspect(),
        config.near,
        config.far,
    ));
    device.set_view(Mat4::look_at(config.eye, config.target, RasterVec3::UP));
    device.bind_texture(Some(&texture));

    let mut cube = Mesh::cube();
    let ground = Mesh::plane(4.0, -1.0, 4.0);

    let mut rgba = vec![0u8; w * h * 4];

    let mut angle = 0.0f32;

    println!("=== msaa-raster v{} ({}x{}) ===", VERSION, w, h);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        angle += get_frame_time() * config.spin_speed;
        cube.model = Mat4::rotate_zyx(0.0, angle, angle * 0.5)
            * Mat4::scale(RasterVec3::new(0.8, 0.8, 0.8));

        device.clear(config.clear_color);
        if config.ground {
            device.draw(&ground);
        }
        device.draw(&cube);
        if config.wireframe {
            device.draw_wireframe(&cube, RasterColor::WHITE);
        }

        device.framebuffer().resolve_rgba(&mut rgba);
        let display = Texture2D::from_rgba8(w as u16, h as u16, &rgba);
        display.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture_ex(
            &display,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );
        draw_text(&format!("{} fps", get_fps()), 8.0, 20.0, 20.0, WHITE);

        next_frame().await;
    }
}

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ViewerConfig::load_or_default(&path);

    macroquad::Window::from_config(window_conf(&config), run(config));
}
