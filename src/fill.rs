use std::collections::VecDeque;

use egui::{Color32, Pos2};
use image::{Rgba, RgbaImage};
use log::debug;

use crate::document::{Scene, SceneChange};
use crate::element::factory;
use crate::renderer::Renderer;

fn to_pixel(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Integer pixel under `pos`, if it lies on the canvas
pub fn pixel_at(pos: Pos2, width: u32, height: u32) -> Option<(u32, u32)> {
    if !pos.x.is_finite() || !pos.y.is_finite() || pos.x < 0.0 || pos.y < 0.0 {
        return None;
    }
    let (x, y) = (pos.x.floor() as u32, pos.y.floor() as u32);
    (x < width && y < height).then_some((x, y))
}

/// 4-connected BFS repaint of the region matching the seed's color exactly.
///
/// Pixels are repainted when enqueued, so each pixel is queued at most once.
/// Returns the number of repainted pixels; 0 when the seed is off the buffer
/// or already has `new_color`.
pub fn flood_fill_buffer(image: &mut RgbaImage, seed: (u32, u32), new_color: Rgba<u8>) -> usize {
    let (width, height) = image.dimensions();
    let (sx, sy) = seed;
    if sx >= width || sy >= height {
        return 0;
    }
    let target = *image.get_pixel(sx, sy);
    if target == new_color {
        return 0;
    }

    let mut queue = VecDeque::new();
    image.put_pixel(sx, sy, new_color);
    queue.push_back((sx, sy));
    let mut painted = 1;

    while let Some((x, y)) = queue.pop_front() {
        let neighbours = [
            (x.checked_add(1), Some(y)),
            (x.checked_sub(1), Some(y)),
            (Some(x), y.checked_add(1)),
            (Some(x), y.checked_sub(1)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            if nx >= width || ny >= height || *image.get_pixel(nx, ny) != target {
                continue;
            }
            image.put_pixel(nx, ny, new_color);
            queue.push_back((nx, ny));
            painted += 1;
        }
    }
    painted
}

/// Flood fill over the rendered scene.
///
/// On success the scene is replaced by one raster holding the filled canvas.
/// Returns `None` (scene untouched) for an off-canvas seed, an empty canvas,
/// or a seed that already has `new_color`.
pub fn flood_fill(
    scene: &mut Scene,
    renderer: &dyn Renderer,
    width: u32,
    height: u32,
    seed: Pos2,
    new_color: Color32,
) -> Option<SceneChange> {
    if width == 0 || height == 0 {
        return None;
    }
    let seed_pixel = pixel_at(seed, width, height)?;

    let mut canvas = renderer.rasterize(scene, width, height);
    let painted = flood_fill_buffer(&mut canvas, seed_pixel, to_pixel(new_color));
    if painted == 0 {
        return None;
    }
    debug!("Flood fill at {seed_pixel:?} repainted {painted} pixels");

    Some(scene.replace_with(vec![factory::create_image(canvas, Pos2::ZERO)]))
}
