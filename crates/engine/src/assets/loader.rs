use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use tracing::{debug, info, warn};

use crate::asset_keys::{validate_asset_key, validate_relative_asset_path};

use super::{parse_tiled_json, AssetCache, AssetError, ImageAsset, Spritesheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpritesheetConfig {
    pub frame_width: u32,
    pub frame_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRequest {
    Image {
        key: String,
        path: String,
    },
    Spritesheet {
        key: String,
        path: String,
        config: SpritesheetConfig,
    },
    TiledJson {
        key: String,
        path: String,
    },
}

impl AssetRequest {
    pub fn key(&self) -> &str {
        match self {
            AssetRequest::Image { key, .. }
            | AssetRequest::Spritesheet { key, .. }
            | AssetRequest::TiledJson { key, .. } => key,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            AssetRequest::Image { path, .. }
            | AssetRequest::Spritesheet { path, .. }
            | AssetRequest::TiledJson { path, .. } => path,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AssetRequest::Image { .. } => "image",
            AssetRequest::Spritesheet { .. } => "spritesheet",
            AssetRequest::TiledJson { .. } => "tilemap_tiled_json",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: usize,
}

/// Load queue filled during a scene's preload. Requests are only executed by
/// [`AssetLoader::load_all`]; a failed request leaves its key absent from the
/// cache and never aborts the batch.
#[derive(Debug, Default)]
pub struct AssetLoader {
    queue: Vec<AssetRequest>,
    queued_keys: HashSet<String>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&mut self, key: &str, path: &str) {
        self.push(AssetRequest::Image {
            key: key.to_string(),
            path: path.to_string(),
        });
    }

    pub fn spritesheet(&mut self, key: &str, path: &str, config: SpritesheetConfig) {
        self.push(AssetRequest::Spritesheet {
            key: key.to_string(),
            path: path.to_string(),
            config,
        });
    }

    pub fn tilemap_tiled_json(&mut self, key: &str, path: &str) {
        self.push(AssetRequest::TiledJson {
            key: key.to_string(),
            path: path.to_string(),
        });
    }

    pub fn pending(&self) -> &[AssetRequest] {
        &self.queue
    }

    fn push(&mut self, request: AssetRequest) {
        if !self.queued_keys.insert(request.key().to_string()) {
            warn!(
                key = request.key(),
                kind = request.kind(),
                "asset_key_already_queued_ignoring"
            );
            return;
        }
        self.queue.push(request);
    }

    pub fn load_all(&mut self, asset_root: &Path, cache: &mut AssetCache) -> LoadSummary {
        let mut summary = LoadSummary::default();
        for request in self.queue.drain(..) {
            match load_request(asset_root, &request, cache) {
                Ok(()) => {
                    summary.loaded += 1;
                    debug!(key = request.key(), kind = request.kind(), "asset_loaded");
                }
                Err(error) => {
                    summary.failed += 1;
                    warn!(
                        key = request.key(),
                        kind = request.kind(),
                        path = request.path(),
                        error = %error,
                        "asset_load_failed"
                    );
                }
            }
        }
        self.queued_keys.clear();
        info!(
            loaded = summary.loaded,
            failed = summary.failed,
            asset_root = %asset_root.display(),
            "assets_loaded"
        );
        summary
    }
}

fn load_request(
    asset_root: &Path,
    request: &AssetRequest,
    cache: &mut AssetCache,
) -> Result<(), AssetError> {
    validate_asset_key(request.key()).map_err(|source| AssetError::InvalidKey {
        key: request.key().to_string(),
        source,
    })?;
    let path = resolve_asset_path(asset_root, request.path())?;

    match request {
        AssetRequest::Image { key, .. } => {
            cache.insert_image(key.as_str(), decode_image(&path)?);
        }
        AssetRequest::Spritesheet { key, config, .. } => {
            let image = Arc::new(decode_image(&path)?);
            let sheet = Spritesheet::new(image, config.frame_width, config.frame_height)
                .map_err(|message| AssetError::InvalidSpritesheet {
                    path: path.clone(),
                    message,
                })?;
            cache.insert_spritesheet(key.as_str(), sheet);
        }
        AssetRequest::TiledJson { key, .. } => {
            let raw = fs::read_to_string(&path).map_err(|source| AssetError::ReadFile {
                path: path.clone(),
                source,
            })?;
            cache.insert_tilemap(key.as_str(), parse_tiled_json(&raw, &path)?);
        }
    }
    Ok(())
}

fn resolve_asset_path(asset_root: &Path, relative: &str) -> Result<PathBuf, AssetError> {
    validate_relative_asset_path(relative).map_err(|source| AssetError::InvalidPath {
        path: relative.to_string(),
        source,
    })?;
    Ok(relative
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .fold(asset_root.to_path_buf(), |acc, segment| acc.join(segment)))
}

fn decode_image(path: &Path) -> Result<ImageAsset, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::DecodeImage {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    ImageAsset::from_rgba(width, height, rgba.into_raw()).ok_or_else(|| {
        AssetError::InvalidSpritesheet {
            path: path.to_path_buf(),
            message: "decoded image buffer has unexpected length".to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(root: &Path, relative: &str, width: u32, height: u32) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 200, 30, 255]))
            .save(&path)
            .expect("save png");
    }

    #[test]
    fn loads_images_and_spritesheets_into_cache() {
        let temp = TempDir::new().expect("temp");
        write_png(temp.path(), "tilesets/tiles.png", 64, 32);
        write_png(temp.path(), "sprites/player.png", 64, 32);

        let mut loader = AssetLoader::new();
        loader.image("tiles", "tilesets/tiles.png");
        loader.spritesheet(
            "player",
            "sprites/player.png",
            SpritesheetConfig {
                frame_width: 32,
                frame_height: 32,
            },
        );
        let mut cache = AssetCache::default();
        let summary = loader.load_all(temp.path(), &mut cache);

        assert_eq!(summary, LoadSummary { loaded: 2, failed: 0 });
        assert_eq!(cache.image("tiles").map(ImageAsset::width), Some(64));
        assert_eq!(cache.spritesheet("player").map(Spritesheet::frame_count), Some(2));
        assert_eq!(
            cache.image("tiles").and_then(|image| image.pixel(0, 0)),
            Some([10, 200, 30, 255])
        );
        assert!(loader.pending().is_empty());
    }

    #[test]
    fn missing_files_fail_without_stopping_the_batch() {
        let temp = TempDir::new().expect("temp");
        write_png(temp.path(), "tilesets/tiles.png", 32, 32);

        let mut loader = AssetLoader::new();
        loader.tilemap_tiled_json("map", "maps/map.json");
        loader.image("tiles", "tilesets/tiles.png");
        let mut cache = AssetCache::default();
        let summary = loader.load_all(temp.path(), &mut cache);

        assert_eq!(summary, LoadSummary { loaded: 1, failed: 1 });
        assert!(cache.tilemap("map").is_none());
        assert!(cache.has_texture("tiles"));
    }

    #[test]
    fn loads_tiled_json_relative_to_root() {
        let temp = TempDir::new().expect("temp");
        let map_path = temp.path().join("maps").join("map.json");
        fs::create_dir_all(map_path.parent().expect("parent")).expect("mkdir");
        fs::write(
            &map_path,
            r#"{"width": 2, "height": 1, "tilewidth": 32, "tileheight": 32,
                "layers": [{"name": "Ground", "type": "tilelayer", "width": 2, "height": 1, "data": [1, 1]}],
                "tilesets": []}"#,
        )
        .expect("write map");

        let mut loader = AssetLoader::new();
        loader.tilemap_tiled_json("map", "maps/map.json");
        let mut cache = AssetCache::default();
        loader.load_all(temp.path(), &mut cache);

        let map = cache.tilemap("map").expect("map loaded");
        assert_eq!(map.width_in_pixels(), 64);
    }

    #[test]
    fn invalid_keys_and_traversal_paths_are_rejected() {
        let temp = TempDir::new().expect("temp");
        write_png(temp.path(), "tiles.png", 32, 32);

        let mut loader = AssetLoader::new();
        loader.image("Tiles", "tiles.png");
        loader.image("escape", "../tiles.png");
        let mut cache = AssetCache::default();
        let summary = loader.load_all(temp.path(), &mut cache);

        assert_eq!(summary, LoadSummary { loaded: 0, failed: 2 });
        assert!(cache.is_empty());
    }

    #[test]
    fn duplicate_keys_keep_the_first_request() {
        let mut loader = AssetLoader::new();
        loader.image("tiles", "a.png");
        loader.image("tiles", "b.png");
        assert_eq!(loader.pending().len(), 1);
        assert_eq!(loader.pending()[0].path(), "a.png");
    }

    #[test]
    fn spritesheet_with_oversized_frames_fails() {
        let temp = TempDir::new().expect("temp");
        write_png(temp.path(), "player.png", 16, 16);

        let mut loader = AssetLoader::new();
        loader.spritesheet(
            "player",
            "player.png",
            SpritesheetConfig {
                frame_width: 32,
                frame_height: 32,
            },
        );
        let mut cache = AssetCache::default();
        let summary = loader.load_all(temp.path(), &mut cache);
        assert_eq!(summary.failed, 1);
        assert!(!cache.has_texture("player"));
    }
}
