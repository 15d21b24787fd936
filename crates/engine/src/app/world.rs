use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assets::{AssetCache, TiledMap};

use super::camera::Camera;
use super::physics::{step_body, Body, SolidGrid};
use super::rendering::measure_text;
use super::{Color, GameConfig, Rect, Vec2};

/// Size used for sprites whose texture never loaded.
pub const PLACEHOLDER_SPRITE_SIZE: Vec2 = Vec2::new(32.0, 32.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilesetRef {
    map: MapId,
    tileset: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TilemapError {
    #[error("tilemap '{key}' is not in the asset cache")]
    MissingTilemap { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size_px: f32,
    pub fill: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size_px: 16.0,
            fill: Color::WHITE,
        }
    }
}

/// Render data for one tile layer bound to one tileset image.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerView {
    pub map: Arc<TiledMap>,
    pub layer_index: usize,
    pub tileset_index: usize,
    pub image_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayKind {
    Rectangle { size: Vec2, color: Color },
    Circle { radius: f32, color: Color },
    Sprite { texture_key: String, frame: u32, size: Vec2 },
    Text { text: String, style: TextStyle },
    TilemapLayer(TileLayerView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayObject {
    pub id: ObjectId,
    pub kind: DisplayKind,
    /// World position of the origin point.
    pub position: Vec2,
    /// Normalized anchor inside the object's box, (0, 0) is top-left.
    pub origin: Vec2,
    pub scroll_factor: f32,
    pub visible: bool,
    body: Option<Body>,
}

impl DisplayObject {
    pub fn size(&self) -> Vec2 {
        match &self.kind {
            DisplayKind::Rectangle { size, .. } | DisplayKind::Sprite { size, .. } => *size,
            DisplayKind::Circle { radius, .. } => Vec2::new(radius * 2.0, radius * 2.0),
            DisplayKind::Text { text, style } => {
                let (width, height) = measure_text(text, style.font_size_px);
                Vec2::new(width as f32, height as f32)
            }
            DisplayKind::TilemapLayer(view) => Vec2::new(
                view.map.width_in_pixels() as f32,
                view.map.height_in_pixels() as f32,
            ),
        }
    }

    pub fn top_left(&self) -> Vec2 {
        let size = self.size();
        Vec2::new(
            self.position.x - size.x * self.origin.x,
            self.position.y - size.y * self.origin.y,
        )
    }

    pub fn bounds(&self) -> Rect {
        let top_left = self.top_left();
        let size = self.size();
        Rect::new(top_left.x, top_left.y, size.x, size.y)
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            DisplayKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct MapInstance {
    key: String,
    map: Arc<TiledMap>,
    tileset_images: Vec<Option<String>>,
}

/// Everything a scene can touch: display list, physics bodies, camera,
/// tilemaps and the loaded asset cache.
#[derive(Debug)]
pub struct SceneWorld {
    objects: Vec<DisplayObject>,
    next_object_id: u64,
    camera: Camera,
    canvas: (u32, u32),
    background: Color,
    gravity: Vec2,
    physics_debug: bool,
    physics_bounds: Rect,
    assets: AssetCache,
    maps: Vec<MapInstance>,
    collision_grids: HashMap<ObjectId, SolidGrid>,
    colliders: Vec<(ObjectId, ObjectId)>,
    warned_missing_textures: HashSet<String>,
}

impl SceneWorld {
    pub fn new(config: &GameConfig) -> Self {
        let mut camera = Camera::new(config.width, config.height);
        camera.set_round_pixels(config.pixel_art);
        Self {
            objects: Vec::new(),
            next_object_id: 1,
            camera,
            canvas: (config.width, config.height),
            background: config.background_color,
            gravity: config.physics.arcade.gravity,
            physics_debug: config.physics.arcade.debug,
            physics_bounds: Rect::new(0.0, 0.0, config.width as f32, config.height as f32),
            assets: AssetCache::default(),
            maps: Vec::new(),
            collision_grids: HashMap::new(),
            colliders: Vec::new(),
            warned_missing_textures: HashSet::new(),
        }
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn physics_debug(&self) -> bool {
        self.physics_debug
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub(crate) fn assets_mut(&mut self) -> &mut AssetCache {
        &mut self.assets
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn add_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) -> ObjectId {
        self.push_object(
            DisplayKind::Rectangle {
                size: Vec2::new(width, height),
                color,
            },
            Vec2::new(x, y),
            Vec2::new(0.5, 0.5),
        )
    }

    pub fn add_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) -> ObjectId {
        self.push_object(
            DisplayKind::Circle {
                radius: radius.max(0.0),
                color,
            },
            Vec2::new(x, y),
            Vec2::new(0.5, 0.5),
        )
    }

    pub fn add_text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) -> ObjectId {
        self.push_object(
            DisplayKind::Text {
                text: text.to_string(),
                style,
            },
            Vec2::new(x, y),
            Vec2::ZERO,
        )
    }

    /// Sprites whose texture is missing still get an object and a
    /// placeholder-sized box so bodies and camera follow keep working.
    pub fn add_sprite(&mut self, x: f32, y: f32, texture_key: &str, frame: u32) -> ObjectId {
        let size = match self.assets.texture_frame(texture_key, frame) {
            Some((_, rect)) => Vec2::new(rect.width as f32, rect.height as f32),
            None => {
                if self.warned_missing_textures.insert(texture_key.to_string()) {
                    warn!(
                        texture_key,
                        frame, "sprite_texture_missing_using_placeholder"
                    );
                }
                PLACEHOLDER_SPRITE_SIZE
            }
        };
        self.push_object(
            DisplayKind::Sprite {
                texture_key: texture_key.to_string(),
                frame,
                size,
            },
            Vec2::new(x, y),
            Vec2::new(0.5, 0.5),
        )
    }

    fn push_object(&mut self, kind: DisplayKind, position: Vec2, origin: Vec2) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id = self.next_object_id.saturating_add(1);
        self.objects.push(DisplayObject {
            id,
            kind,
            position,
            origin,
            scroll_factor: 1.0,
            visible: true,
            body: None,
        });
        id
    }

    /// Display list in draw order.
    pub fn objects(&self) -> &[DisplayObject] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object(&self, id: ObjectId) -> Option<&DisplayObject> {
        self.index_of(id).map(|index| &self.objects[index])
    }

    fn object_mut(&mut self, id: ObjectId, operation: &'static str) -> Option<&mut DisplayObject> {
        match self.index_of(id) {
            Some(index) => Some(&mut self.objects[index]),
            None => {
                debug!(object_id = id.0, operation, "unknown_object_ignored");
                None
            }
        }
    }

    // Ids are allocated in increasing order and objects are only appended or
    // removed, so the list stays sorted by id.
    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.binary_search_by_key(&id, |object| object.id).ok()
    }

    pub fn position(&self, id: ObjectId) -> Option<Vec2> {
        self.object(id).map(|object| object.position)
    }

    pub fn set_position(&mut self, id: ObjectId, x: f32, y: f32) -> bool {
        let Some(object) = self.object_mut(id, "set_position") else {
            return false;
        };
        object.position = Vec2::new(x, y);
        if object.body.is_some() {
            let top_left = object.top_left();
            if let Some(body) = object.body.as_mut() {
                body.position = top_left;
            }
        }
        true
    }

    pub fn set_origin(&mut self, id: ObjectId, origin_x: f32, origin_y: f32) -> bool {
        let Some(object) = self.object_mut(id, "set_origin") else {
            return false;
        };
        object.origin = Vec2::new(origin_x, origin_y);
        sync_position_from_body(object);
        true
    }

    pub fn set_scroll_factor(&mut self, id: ObjectId, factor: f32) -> bool {
        let Some(object) = self.object_mut(id, "set_scroll_factor") else {
            return false;
        };
        object.scroll_factor = factor;
        true
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        let Some(object) = self.object_mut(id, "set_visible") else {
            return false;
        };
        object.visible = visible;
        true
    }

    pub fn set_text(&mut self, id: ObjectId, value: &str) -> bool {
        let Some(object) = self.object_mut(id, "set_text") else {
            return false;
        };
        match &mut object.kind {
            DisplayKind::Text { text, .. } => {
                if text != value {
                    text.clear();
                    text.push_str(value);
                }
                true
            }
            _ => {
                debug!(object_id = id.0, "set_text_on_non_text_object_ignored");
                false
            }
        }
    }

    pub fn destroy(&mut self, id: ObjectId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(object_id = id.0, operation = "destroy", "unknown_object_ignored");
            return false;
        };
        self.objects.remove(index);
        self.collision_grids.remove(&id);
        self.colliders
            .retain(|(body, layer)| *body != id && *layer != id);
        if self.camera.following() == Some(id) {
            self.camera.stop_follow();
        }
        true
    }

    /// Gives the object an arcade body matching its current box.
    pub fn enable_body(&mut self, id: ObjectId, collide_world_bounds: bool) -> bool {
        let Some(object) = self.object_mut(id, "enable_body") else {
            return false;
        };
        let mut body = Body::new(object.top_left(), object.size());
        body.collide_world_bounds = collide_world_bounds;
        object.body = Some(body);
        true
    }

    pub fn body(&self, id: ObjectId) -> Option<&Body> {
        self.object(id).and_then(DisplayObject::body)
    }

    pub fn set_velocity(&mut self, id: ObjectId, velocity: Vec2) -> bool {
        self.with_body(id, "set_velocity", |body| body.velocity = velocity)
    }

    pub fn set_velocity_x(&mut self, id: ObjectId, vx: f32) -> bool {
        self.with_body(id, "set_velocity_x", |body| body.velocity.x = vx)
    }

    pub fn set_velocity_y(&mut self, id: ObjectId, vy: f32) -> bool {
        self.with_body(id, "set_velocity_y", |body| body.velocity.y = vy)
    }

    fn with_body(&mut self, id: ObjectId, operation: &'static str, apply: impl FnOnce(&mut Body)) -> bool {
        let Some(object) = self.object_mut(id, operation) else {
            return false;
        };
        match object.body.as_mut() {
            Some(body) => {
                apply(body);
                true
            }
            None => {
                debug!(object_id = id.0, operation, "object_has_no_body_ignored");
                false
            }
        }
    }

    pub fn physics_world_bounds(&self) -> Rect {
        self.physics_bounds
    }

    pub fn set_physics_world_bounds(&mut self, bounds: Rect) {
        self.physics_bounds = bounds;
    }

    /// Camera tracks the centre of `id`; unknown ids leave the camera alone.
    pub fn start_follow(&mut self, id: ObjectId, round_pixels: bool, lerp_x: f32, lerp_y: f32) -> bool {
        let Some(center) = self.object_center(id) else {
            debug!(object_id = id.0, operation = "start_follow", "unknown_object_ignored");
            return false;
        };
        self.camera
            .start_follow(id, center, round_pixels, lerp_x, lerp_y);
        true
    }

    fn object_center(&self, id: ObjectId) -> Option<Vec2> {
        let object = self.object(id)?;
        Some(match object.body() {
            Some(body) => body.center(),
            None => object.bounds().center(),
        })
    }

    pub fn make_tilemap(&mut self, key: &str) -> Result<MapId, TilemapError> {
        let map = self
            .assets
            .tilemap(key)
            .ok_or_else(|| TilemapError::MissingTilemap {
                key: key.to_string(),
            })?;
        let tileset_images = vec![None; map.tilesets.len()];
        self.maps.push(MapInstance {
            key: key.to_string(),
            map,
            tileset_images,
        });
        Ok(MapId(self.maps.len() - 1))
    }

    pub fn tilemap(&self, map: MapId) -> Option<&TiledMap> {
        self.maps.get(map.0).map(|instance| instance.map.as_ref())
    }

    /// Binds the tileset named `tileset_name` to an image texture. Returns
    /// `None` when the map has no such tileset or `image_key` never loaded.
    pub fn add_tileset_image(&mut self, map: MapId, tileset_name: &str, image_key: &str) -> Option<TilesetRef> {
        let has_image = self.assets.image(image_key).is_some();
        let instance = self.maps.get_mut(map.0)?;
        let Some(tileset) = instance.map.tileset_index(tileset_name) else {
            warn!(
                map = instance.key.as_str(),
                tileset = tileset_name,
                "tileset_not_found_in_map"
            );
            return None;
        };
        if !has_image {
            warn!(
                map = instance.key.as_str(),
                tileset = tileset_name,
                image_key,
                "tileset_image_not_loaded"
            );
            return None;
        }
        instance.tileset_images[tileset] = Some(image_key.to_string());
        Some(TilesetRef { map, tileset })
    }

    /// Adds the named tile layer to the display list at the world origin.
    pub fn create_layer(&mut self, map: MapId, layer_name: &str, tileset: TilesetRef) -> Option<ObjectId> {
        if tileset.map != map {
            debug!(layer = layer_name, "tileset_belongs_to_another_map");
            return None;
        }
        let instance = self.maps.get(map.0)?;
        let Some(layer_index) = instance.map.layer_index(layer_name) else {
            warn!(
                map = instance.key.as_str(),
                layer = layer_name,
                "tile_layer_not_found_in_map"
            );
            return None;
        };
        let image_key = instance
            .tileset_images
            .get(tileset.tileset)
            .cloned()
            .flatten()?;
        let view = TileLayerView {
            map: Arc::clone(&instance.map),
            layer_index,
            tileset_index: tileset.tileset,
            image_key,
        };
        Some(self.push_object(DisplayKind::TilemapLayer(view), Vec2::ZERO, Vec2::ZERO))
    }

    /// Marks every tile whose tileset tile carries a truthy `property` as
    /// solid. Returns the number of solid cells, or `None` for a non-layer id.
    pub fn set_collision_by_property(&mut self, layer: ObjectId, property: &str) -> Option<usize> {
        let object = self.object(layer)?;
        let DisplayKind::TilemapLayer(view) = &object.kind else {
            debug!(object_id = layer.0, "collision_on_non_layer_object_ignored");
            return None;
        };
        let map = &view.map;
        let tile_layer = map.layers.get(view.layer_index)?;
        let tileset = map.tilesets.get(view.tileset_index)?;
        let mut solid = Vec::with_capacity(tile_layer.width as usize * tile_layer.height as usize);
        for y in 0..tile_layer.height {
            for x in 0..tile_layer.width {
                let is_solid = tile_layer
                    .gid_at(x, y)
                    .filter(|gid| tileset.contains_gid(*gid))
                    .and_then(|gid| tileset.tile_property(gid - tileset.first_gid, property))
                    .is_some_and(|value| value.is_truthy());
                solid.push(is_solid);
            }
        }
        let grid = SolidGrid::new(
            object.top_left(),
            map.tile_width as f32,
            map.tile_height as f32,
            tile_layer.width,
            tile_layer.height,
            solid,
        )?;
        let solid_count = grid.solid_count();
        info!(
            layer = tile_layer.name.as_str(),
            property, solid_count, "tile_collision_set"
        );
        self.collision_grids.insert(layer, grid);
        Some(solid_count)
    }

    pub fn add_collider(&mut self, body: ObjectId, layer: ObjectId) -> bool {
        if self.body(body).is_none() {
            debug!(object_id = body.0, "collider_without_body_ignored");
            return false;
        }
        if !matches!(
            self.object(layer).map(|object| &object.kind),
            Some(DisplayKind::TilemapLayer(_))
        ) {
            debug!(object_id = layer.0, "collider_target_not_a_layer_ignored");
            return false;
        }
        if !self.colliders.contains(&(body, layer)) {
            self.colliders.push((body, layer));
        }
        true
    }

    pub(crate) fn step_physics(&mut self, dt: f32) {
        let gravity = self.gravity;
        let bounds = self.physics_bounds;
        for object in &mut self.objects {
            let Some(body) = object.body.as_mut() else {
                continue;
            };
            let grids: Vec<&SolidGrid> = self
                .colliders
                .iter()
                .filter(|(body_id, _)| *body_id == object.id)
                .filter_map(|(_, layer)| self.collision_grids.get(layer))
                .collect();
            step_body(body, dt, gravity, bounds, &grids);
            sync_position_from_body(object);
        }
    }

    pub(crate) fn update_camera(&mut self) {
        let Some(target) = self.camera.following() else {
            return;
        };
        match self.object_center(target) {
            Some(center) => self.camera.update_follow(center),
            None => {
                debug!(object_id = target.0, "camera_target_missing_stopping_follow");
                self.camera.stop_follow();
            }
        }
    }
}

fn sync_position_from_body(object: &mut DisplayObject) {
    let Some(body) = object.body else {
        return;
    };
    object.position = Vec2::new(
        body.position.x + body.size.x * object.origin.x,
        body.position.y + body.size.y * object.origin.y,
    );
}
