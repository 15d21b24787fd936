use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::debug;
use winit::window::Window;

use crate::app::{Camera, DisplayKind, DisplayObject, Rect, SceneWorld, TileLayerView, Vec2};
use crate::assets::{FrameRect, ImageAsset};

use super::canvas::Canvas;
use super::font::draw_text;
use super::transform::{visible_tile_rect, world_to_screen_px};

const PLACEHOLDER_TEXTURE_COLOR: [u8; 4] = [255, 0, 255, 255];
const TILE_FALLBACK_COLOR: [u8; 4] = [68, 74, 62, 255];
const DEBUG_BODY_COLOR: [u8; 4] = [255, 0, 255, 255];
const DEBUG_BLOCKED_COLOR: [u8; 4] = [255, 210, 70, 255];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    canvas_width: u32,
    canvas_height: u32,
}

impl Renderer {
    /// The frame buffer keeps the logical canvas size; the window surface
    /// scales it to whatever size the window has.
    pub fn new(window: Arc<Window>, canvas_width: u32, canvas_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            canvas_width,
            canvas_height,
            size.width,
            size.height,
        )?;
        Ok(Self {
            window,
            pixels,
            canvas_width,
            canvas_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            self.canvas_width,
            self.canvas_height,
            width,
            height,
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        canvas_width: u32,
        canvas_height: u32,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(canvas_width.max(1), canvas_height.max(1), surface)
    }

    pub fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        let (width, height) = (self.canvas_width, self.canvas_height);
        match Canvas::new(self.pixels.frame_mut(), width, height) {
            Some(mut canvas) => draw_world(&mut canvas, world),
            None => debug!(width, height, "renderer_frame_size_mismatch_skipping_draw"),
        }
        self.pixels.render()
    }
}

pub(crate) fn draw_world(canvas: &mut Canvas<'_>, world: &SceneWorld) {
    let mut clear = world.background().to_rgba();
    clear[3] = 255;
    canvas.clear(clear);

    let camera = world.camera();
    for object in world.objects().iter().filter(|object| object.visible) {
        draw_object(canvas, world, camera, object);
    }

    if world.physics_debug() {
        draw_debug_bodies(canvas, world);
    }
}

fn draw_object(canvas: &mut Canvas<'_>, world: &SceneWorld, camera: &Camera, object: &DisplayObject) {
    let top_left = object.top_left();
    let (left, top) = world_to_screen_px(camera, top_left, object.scroll_factor);
    match &object.kind {
        DisplayKind::Rectangle { size, color } => {
            canvas.fill_rect(
                left,
                top,
                size.x.round() as i32,
                size.y.round() as i32,
                color.to_rgba(),
            );
        }
        DisplayKind::Circle { radius, color } => {
            let center = camera.world_to_screen(
                Vec2::new(top_left.x + radius, top_left.y + radius),
                object.scroll_factor,
            );
            canvas.fill_circle(center.x, center.y, *radius, color.to_rgba());
        }
        DisplayKind::Sprite {
            texture_key,
            frame,
            size,
        } => match world.assets().texture_frame(texture_key, *frame) {
            Some((image, source)) => blit_region(canvas, image, source, left, top, 1.0),
            None => canvas.fill_rect(
                left,
                top,
                size.x.round() as i32,
                size.y.round() as i32,
                PLACEHOLDER_TEXTURE_COLOR,
            ),
        },
        DisplayKind::Text { text, style } => {
            draw_text(canvas, left, top, text, style.font_size_px, style.fill.to_rgba());
        }
        DisplayKind::TilemapLayer(view) => {
            draw_tile_layer(canvas, world, camera, object, view);
        }
    }
}

fn draw_tile_layer(
    canvas: &mut Canvas<'_>,
    world: &SceneWorld,
    camera: &Camera,
    object: &DisplayObject,
    view: &TileLayerView,
) {
    let map = view.map.as_ref();
    let (Some(layer), Some(tileset)) = (
        map.layers.get(view.layer_index),
        map.tilesets.get(view.tileset_index),
    ) else {
        return;
    };
    if !layer.visible || layer.opacity <= 0.0 {
        return;
    }

    let scroll = camera.render_scroll().scale(object.scroll_factor);
    let viewport = camera.viewport();
    let view_rect = Rect::new(scroll.x, scroll.y, viewport.x, viewport.y);
    let origin = object.top_left();
    let tile_width = map.tile_width as f32;
    let tile_height = map.tile_height as f32;
    let Some(visible) = visible_tile_rect(
        origin,
        tile_width,
        tile_height,
        layer.width,
        layer.height,
        view_rect,
    ) else {
        return;
    };

    let image = world.assets().image(&view.image_key);
    let mut fallback = TILE_FALLBACK_COLOR;
    fallback[3] = (fallback[3] as f32 * layer.opacity).round() as u8;

    for tile_y in visible.y_min..=visible.y_max {
        for tile_x in visible.x_min..=visible.x_max {
            let Some(gid) = layer.gid_at(tile_x, tile_y) else {
                continue;
            };
            if gid == 0 || !tileset.contains_gid(gid) {
                continue;
            }
            let world_pos = Vec2::new(
                origin.x + tile_x as f32 * tile_width,
                origin.y + tile_y as f32 * tile_height,
            );
            let (left, top) = world_to_screen_px(camera, world_pos, object.scroll_factor);
            let source = tileset
                .source_origin(gid - tileset.first_gid)
                .map(|(x, y)| FrameRect {
                    x,
                    y,
                    width: tileset.tile_width,
                    height: tileset.tile_height,
                });
            match (image, source) {
                (Some(image), Some(source)) => {
                    blit_region(canvas, image, source, left, top, layer.opacity)
                }
                _ => canvas.fill_rect(
                    left,
                    top,
                    map.tile_width as i32,
                    map.tile_height as i32,
                    fallback,
                ),
            }
        }
    }
}

/// Copies `source` from `image` with its top-left at screen `(left, top)`.
/// Pixels outside the image are skipped.
fn blit_region(
    canvas: &mut Canvas<'_>,
    image: &ImageAsset,
    source: FrameRect,
    left: i32,
    top: i32,
    opacity: f32,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    let y_start = (-top).max(0) as u32;
    let x_start = (-left).max(0) as u32;
    let y_end = source
        .height
        .min((canvas.height() as i32 - top).max(0) as u32);
    let x_end = source
        .width
        .min((canvas.width() as i32 - left).max(0) as u32);
    for dy in y_start..y_end {
        for dx in x_start..x_end {
            let Some(mut rgba) = image.pixel(source.x + dx, source.y + dy) else {
                continue;
            };
            if opacity < 1.0 {
                rgba[3] = (rgba[3] as f32 * opacity).round() as u8;
            }
            canvas.blend_pixel(left + dx as i32, top + dy as i32, rgba);
        }
    }
}

fn draw_debug_bodies(canvas: &mut Canvas<'_>, world: &SceneWorld) {
    let camera = world.camera();
    for object in world.objects() {
        let Some(body) = object.body() else {
            continue;
        };
        let (left, top) = world_to_screen_px(camera, body.position, object.scroll_factor);
        let color = if body.blocked.any() {
            DEBUG_BLOCKED_COLOR
        } else {
            DEBUG_BODY_COLOR
        };
        canvas.outline_rect(
            left,
            top,
            body.size.x.round() as i32,
            body.size.y.round() as i32,
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::app::{Color, GameConfig, TextStyle};
    use crate::assets::parse_tiled_json;

    fn render(world: &SceneWorld) -> Vec<u8> {
        let (width, height) = world.canvas_size();
        let mut frame = vec![0u8; width as usize * height as usize * 4];
        let mut canvas = Canvas::new(&mut frame, width, height).expect("canvas");
        draw_world(&mut canvas, world);
        frame
    }

    fn pixel_at(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = (y as usize * width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&frame[offset..offset + 4]);
        out
    }

    fn small_world() -> SceneWorld {
        SceneWorld::new(&GameConfig {
            width: 64,
            height: 48,
            ..GameConfig::default()
        })
    }

    #[test]
    fn rectangle_draws_around_its_centre() {
        let mut world = small_world();
        world.add_rectangle(32.0, 24.0, 8.0, 8.0, Color::from_hex(0x00ff00));
        let frame = render(&world);
        assert_eq!(pixel_at(&frame, 64, 28, 20), [0, 255, 0, 255]);
        assert_eq!(pixel_at(&frame, 64, 27, 20), [0, 0, 0, 255]);
    }

    #[test]
    fn screen_fixed_text_ignores_camera_scroll() {
        let mut world = small_world();
        world.camera_mut().set_scroll(Vec2::new(500.0, 500.0));
        let text = world.add_text(0.0, 0.0, "-", TextStyle {
            font_size_px: 6.0,
            fill: Color::WHITE,
        });
        world.set_scroll_factor(text, 0.0);
        let frame = render(&world);
        assert_eq!(pixel_at(&frame, 64, 1, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn missing_sprite_texture_draws_placeholder() {
        let mut world = small_world();
        world.add_sprite(32.0, 24.0, "player", 0);
        let frame = render(&world);
        assert_eq!(pixel_at(&frame, 64, 32, 24), PLACEHOLDER_TEXTURE_COLOR);
    }

    #[test]
    fn tile_without_source_region_uses_flat_color() {
        let mut world = small_world();
        let map = parse_tiled_json(
            r#"{"width": 2, "height": 2, "tilewidth": 16, "tileheight": 16,
                "layers": [{"name": "Ground", "type": "tilelayer", "width": 2, "height": 2, "data": [1, 0, 0, 1]}],
                "tilesets": [{"name": "tiles", "firstgid": 1, "tilewidth": 16, "tileheight": 16,
                              "columns": 1, "tilecount": 1, "spacing": 4294967295}]}"#,
            Path::new("map.json"),
        )
        .expect("map");
        world.assets_mut().insert_tilemap("map", map);
        world.assets_mut().insert_image(
            "tiles",
            ImageAsset::from_rgba(16, 16, vec![200; 16 * 16 * 4]).expect("image"),
        );
        let map = world.make_tilemap("map").expect("map");
        let tileset = world.add_tileset_image(map, "tiles", "tiles").expect("tileset");
        world.create_layer(map, "Ground", tileset).expect("layer");

        let frame = render(&world);
        assert_eq!(pixel_at(&frame, 64, 4, 4), TILE_FALLBACK_COLOR);
        assert_eq!(pixel_at(&frame, 64, 20, 4), [0, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 64, 20, 20), TILE_FALLBACK_COLOR);
    }

    #[test]
    fn sprite_frame_is_copied_from_sheet() {
        let mut world = small_world();
        let mut rgba = Vec::new();
        for _y in 0..2 {
            for x in 0..4 {
                let color = if x < 2 { [255, 0, 0, 255] } else { [0, 0, 255, 255] };
                rgba.extend_from_slice(&color);
            }
        }
        let image = Arc::new(ImageAsset::from_rgba(4, 2, rgba).expect("image"));
        let sheet = crate::assets::Spritesheet::new(image, 2, 2).expect("sheet");
        world.assets_mut().insert_spritesheet("player", sheet);
        let sprite = world.add_sprite(10.0, 10.0, "player", 1);
        world.set_origin(sprite, 0.0, 0.0);
        let frame = render(&world);
        assert_eq!(pixel_at(&frame, 64, 10, 10), [0, 0, 255, 255]);
        assert_eq!(pixel_at(&frame, 64, 12, 10), [0, 0, 0, 255]);
    }

    #[test]
    fn debug_outlines_bodies_when_enabled() {
        let mut config = GameConfig {
            width: 64,
            height: 48,
            ..GameConfig::default()
        };
        config.physics.arcade.debug = true;
        let mut world = SceneWorld::new(&config);
        let id = world.add_rectangle(32.0, 24.0, 10.0, 10.0, Color::from_hex(0x00ff00));
        world.enable_body(id, true);
        let frame = render(&world);
        assert_eq!(pixel_at(&frame, 64, 27, 19), DEBUG_BODY_COLOR);
        assert_eq!(pixel_at(&frame, 64, 29, 21), [0, 255, 0, 255]);
    }
}
