mod camera;
mod config;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod physics;
mod rendering;
mod scene;
mod world;

pub use camera::Camera;
pub use config::{ArcadeConfig, GameConfig, PhysicsBackend, PhysicsConfig, RenderMode};
pub use geometry::{Color, Rect, Vec2};
pub use input::{DirectionKeys, Key};
pub use loop_runner::{run_app, AppError};
pub use metrics::LoopMetricsSnapshot;
pub use physics::{Blocked, Body};
pub use rendering::{world_to_screen_px, Renderer};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneRunner};
pub use world::{
    DisplayKind, DisplayObject, MapId, ObjectId, SceneWorld, TextStyle, TileLayerView,
    TilemapError, TilesetRef, PLACEHOLDER_SPRITE_SIZE,
};
