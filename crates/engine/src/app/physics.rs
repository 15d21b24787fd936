use super::{Rect, Vec2};

const EDGE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Blocked {
    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// Arcade body: an axis-aligned box without rotation. `position` is the
/// top-left corner in world pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub collide_world_bounds: bool,
    pub blocked: Blocked,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
            collide_world_bounds: false,
            blocked: Blocked::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

/// Solid cells of one tile layer, laid out row-major.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolidGrid {
    origin: Vec2,
    tile_width: f32,
    tile_height: f32,
    columns: u32,
    rows: u32,
    solid: Vec<bool>,
}

impl SolidGrid {
    pub(crate) fn new(
        origin: Vec2,
        tile_width: f32,
        tile_height: f32,
        columns: u32,
        rows: u32,
        solid: Vec<bool>,
    ) -> Option<Self> {
        if solid.len() != columns as usize * rows as usize || tile_width <= 0.0 || tile_height <= 0.0
        {
            return None;
        }
        Some(Self {
            origin,
            tile_width,
            tile_height,
            columns,
            rows,
            solid,
        })
    }

    pub(crate) fn solid_count(&self) -> usize {
        self.solid.iter().filter(|cell| **cell).count()
    }

    fn is_solid(&self, column: i32, row: i32) -> bool {
        if column < 0 || row < 0 || column >= self.columns as i32 || row >= self.rows as i32 {
            return false;
        }
        self.solid[row as usize * self.columns as usize + column as usize]
    }

    fn column_at(&self, x: f32) -> i32 {
        ((x - self.origin.x) / self.tile_width).floor() as i32
    }

    fn row_at(&self, y: f32) -> i32 {
        ((y - self.origin.y) / self.tile_height).floor() as i32
    }

    fn column_left(&self, column: i32) -> f32 {
        self.origin.x + column as f32 * self.tile_width
    }

    fn row_top(&self, row: i32) -> f32 {
        self.origin.y + row as f32 * self.tile_height
    }

    fn any_solid_in_column(&self, column: i32, top: f32, bottom: f32) -> bool {
        let first = self.row_at(top);
        let last = self.row_at(bottom - EDGE_EPSILON);
        (first..=last).any(|row| self.is_solid(column, row))
    }

    fn any_solid_in_row(&self, row: i32, left: f32, right: f32) -> bool {
        let first = self.column_at(left);
        let last = self.column_at(right - EDGE_EPSILON);
        (first..=last).any(|column| self.is_solid(column, row))
    }
}

/// Advances one body by `dt` seconds. Tile resolution only inspects the
/// leading row/column, so a body must not move more than one tile per step.
pub(crate) fn step_body(
    body: &mut Body,
    dt: f32,
    gravity: Vec2,
    world_bounds: Rect,
    grids: &[&SolidGrid],
) {
    body.blocked = Blocked::default();
    body.velocity += gravity.scale(dt);

    body.position.x += body.velocity.x * dt;
    resolve_tiles_x(body, grids);

    body.position.y += body.velocity.y * dt;
    resolve_tiles_y(body, grids);

    if body.collide_world_bounds {
        clamp_to_bounds(body, world_bounds);
    }
}

fn resolve_tiles_x(body: &mut Body, grids: &[&SolidGrid]) {
    if body.velocity.x == 0.0 {
        return;
    }
    let top = body.position.y;
    let bottom = body.position.y + body.size.y;
    for grid in grids {
        if body.velocity.x > 0.0 {
            let column = grid.column_at(body.position.x + body.size.x - EDGE_EPSILON);
            if grid.any_solid_in_column(column, top, bottom) {
                body.position.x = grid.column_left(column) - body.size.x;
                body.velocity.x = 0.0;
                body.blocked.right = true;
            }
        } else {
            let column = grid.column_at(body.position.x);
            if grid.any_solid_in_column(column, top, bottom) {
                body.position.x = grid.column_left(column + 1);
                body.velocity.x = 0.0;
                body.blocked.left = true;
            }
        }
        if body.velocity.x == 0.0 {
            return;
        }
    }
}

fn resolve_tiles_y(body: &mut Body, grids: &[&SolidGrid]) {
    if body.velocity.y == 0.0 {
        return;
    }
    let left = body.position.x;
    let right = body.position.x + body.size.x;
    for grid in grids {
        if body.velocity.y > 0.0 {
            let row = grid.row_at(body.position.y + body.size.y - EDGE_EPSILON);
            if grid.any_solid_in_row(row, left, right) {
                body.position.y = grid.row_top(row) - body.size.y;
                body.velocity.y = 0.0;
                body.blocked.down = true;
            }
        } else {
            let row = grid.row_at(body.position.y);
            if grid.any_solid_in_row(row, left, right) {
                body.position.y = grid.row_top(row + 1);
                body.velocity.y = 0.0;
                body.blocked.up = true;
            }
        }
        if body.velocity.y == 0.0 {
            return;
        }
    }
}

fn clamp_to_bounds(body: &mut Body, bounds: Rect) {
    if body.position.x < bounds.x {
        body.position.x = bounds.x;
        body.velocity.x = body.velocity.x.max(0.0);
        body.blocked.left = true;
    } else if body.position.x + body.size.x > bounds.right() {
        body.position.x = bounds.right() - body.size.x;
        body.velocity.x = body.velocity.x.min(0.0);
        body.blocked.right = true;
    }

    if body.position.y < bounds.y {
        body.position.y = bounds.y;
        body.velocity.y = body.velocity.y.max(0.0);
        body.blocked.up = true;
    } else if body.position.y + body.size.y > bounds.bottom() {
        body.position.y = bounds.bottom() - body.size.y;
        body.velocity.y = body.velocity.y.min(0.0);
        body.blocked.down = true;
    }
}
