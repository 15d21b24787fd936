use crate::app::{Camera, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TileRectInclusive {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

/// Screen pixel of a world point for an object with `scroll_factor`.
pub fn world_to_screen_px(camera: &Camera, world: Vec2, scroll_factor: f32) -> (i32, i32) {
    let screen = camera.world_to_screen(world, scroll_factor);
    (screen.x.round() as i32, screen.y.round() as i32)
}

/// Tiles of a `columns` x `rows` grid anchored at `origin` that intersect
/// `view`, or `None` when the grid is entirely off-screen.
pub(crate) fn visible_tile_rect(
    origin: Vec2,
    tile_width: f32,
    tile_height: f32,
    columns: u32,
    rows: u32,
    view: Rect,
) -> Option<TileRectInclusive> {
    if columns == 0 || rows == 0 || tile_width <= 0.0 || tile_height <= 0.0 {
        return None;
    }
    let x_min = ((view.x - origin.x) / tile_width).floor();
    let y_min = ((view.y - origin.y) / tile_height).floor();
    let x_max = ((view.right() - origin.x) / tile_width).ceil() - 1.0;
    let y_max = ((view.bottom() - origin.y) / tile_height).ceil() - 1.0;
    if x_max < 0.0 || y_max < 0.0 || x_min >= columns as f32 || y_min >= rows as f32 {
        return None;
    }
    Some(TileRectInclusive {
        x_min: x_min.max(0.0) as u32,
        x_max: (x_max as u32).min(columns - 1),
        y_min: y_min.max(0.0) as u32,
        y_max: (y_max as u32).min(rows - 1),
    })
}
