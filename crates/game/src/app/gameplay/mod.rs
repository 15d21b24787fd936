use engine::{
    AssetLoader, Color, DirectionKeys, InputSnapshot, ObjectId, Rect, Scene, SceneCommand,
    SceneWorld, SpritesheetConfig, TextStyle, TilemapError, Vec2,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{error, info};

const PLAYER_SPEED: f32 = 150.0;
const PLAYER_SIZE: f32 = 32.0;
const PLAYER_COLOR: Color = Color::from_hex(0x00ff00);
const PLAYER_SPAWN: Vec2 = Vec2::new(400.0, 300.0);
const WORLD_WIDTH: f32 = 1600.0;
const WORLD_HEIGHT: f32 = 1200.0;
const WORLD_BACKGROUND: Color = Color::from_hex(0x1a1a1a);
const CAMERA_LERP: f32 = 0.1;

const HUD_FONT_SIZE_PX: f32 = 18.0;
const HUD_FILL: &str = "#fff";
const INSTRUCTION_TEXT: &str = "Use WASD or Arrow Keys to move";
const INSTRUCTION_TEXT_POS: Vec2 = Vec2::new(16.0, 16.0);
const POSITION_TEXT_POS: Vec2 = Vec2::new(16.0, 40.0);

const MESSAGE_FONT_SIZE_PX: f32 = 32.0;
const MESSAGE_POS: Vec2 = Vec2::new(400.0, 300.0);
const LOADING_TEXT: &str = "Loading...";
const SETUP_ERROR_TEXT: &str = "Error loading game";
const SETUP_ERROR_FILL: &str = "#ff0000";

const DECORATION_COUNT: usize = 50;
const DECORATION_MIN_RADIUS: u32 = 2;
const DECORATION_MAX_RADIUS: u32 = 4;
const DECORATION_ALPHA: f32 = 0.5;

const TILESET_IMAGE_KEY: &str = "tiles";
const TILESET_IMAGE_PATH: &str = "tilesets/tiles.png";
const TILEMAP_KEY: &str = "map";
const TILEMAP_PATH: &str = "maps/map.json";
const PLAYER_SHEET_KEY: &str = "player";
const PLAYER_SHEET_PATH: &str = "sprites/player.png";
const PLAYER_FRAME_PX: u32 = 32;
const TILESET_NAME: &str = "tiles";
const GROUND_LAYER_NAME: &str = "Ground";
const COLLIDES_PROPERTY: &str = "collides";

include!("types.rs");
include!("movement.rs");
include!("scene_impl.rs");

pub(crate) fn build_scene(variant: SceneVariant, seed: Option<u64>) -> Box<dyn Scene> {
    Box::new(PrototypeScene::new(variant, seed))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
