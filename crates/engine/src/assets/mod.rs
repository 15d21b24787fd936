mod cache;
mod loader;
mod tiled;

use std::path::PathBuf;

use thiserror::Error;

use crate::asset_keys::AssetKeyError;

pub use cache::{AssetCache, FrameRect, ImageAsset, Spritesheet};
pub use loader::{AssetLoader, AssetRequest, LoadSummary, SpritesheetConfig};
pub use tiled::{
    parse_tiled_json, PropertyValue, TileLayer, TiledMap, TilesetDef, TILE_FLIP_MASK,
};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("invalid asset path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to read asset file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    DecodeImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse tilemap json {path} at {json_path}: {source}")]
    ParseJson {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tilemap {path}: {message}")]
    InvalidTilemap { path: PathBuf, message: String },
    #[error("invalid spritesheet {path}: {message}")]
    InvalidSpritesheet { path: PathBuf, message: String },
}
