use std::collections::HashMap;
use std::sync::Arc;

use super::TiledMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl ImageAsset {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Image sliced into equally sized frames, numbered left to right, top to
/// bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spritesheet {
    image: Arc<ImageAsset>,
    frame_width: u32,
    frame_height: u32,
    columns: u32,
    frame_count: u32,
}

impl Spritesheet {
    pub fn new(image: Arc<ImageAsset>, frame_width: u32, frame_height: u32) -> Result<Self, String> {
        if frame_width == 0 || frame_height == 0 {
            return Err(format!(
                "frame size must be non-zero, got {frame_width}x{frame_height}"
            ));
        }
        let columns = image.width() / frame_width;
        let rows = image.height() / frame_height;
        if columns == 0 || rows == 0 {
            return Err(format!(
                "image {}x{} is smaller than one {frame_width}x{frame_height} frame",
                image.width(),
                image.height()
            ));
        }
        Ok(Self {
            image,
            frame_width,
            frame_height,
            columns,
            frame_count: columns * rows,
        })
    }

    pub fn image(&self) -> &ImageAsset {
        &self.image
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frame_rect(&self, frame: u32) -> Option<FrameRect> {
        if frame >= self.frame_count {
            return None;
        }
        Some(FrameRect {
            x: (frame % self.columns) * self.frame_width,
            y: (frame / self.columns) * self.frame_height,
            width: self.frame_width,
            height: self.frame_height,
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct AssetCache {
    images: HashMap<String, Arc<ImageAsset>>,
    spritesheets: HashMap<String, Arc<Spritesheet>>,
    tilemaps: HashMap<String, Arc<TiledMap>>,
}

impl AssetCache {
    pub fn insert_image(&mut self, key: impl Into<String>, image: ImageAsset) {
        self.images.insert(key.into(), Arc::new(image));
    }

    pub fn insert_spritesheet(&mut self, key: impl Into<String>, sheet: Spritesheet) {
        self.spritesheets.insert(key.into(), Arc::new(sheet));
    }

    pub fn insert_tilemap(&mut self, key: impl Into<String>, map: TiledMap) {
        self.tilemaps.insert(key.into(), Arc::new(map));
    }

    pub fn image(&self, key: &str) -> Option<&ImageAsset> {
        self.images.get(key).map(Arc::as_ref)
    }

    pub fn spritesheet(&self, key: &str) -> Option<&Spritesheet> {
        self.spritesheets.get(key).map(Arc::as_ref)
    }

    pub fn tilemap(&self, key: &str) -> Option<Arc<TiledMap>> {
        self.tilemaps.get(key).cloned()
    }

    /// Spritesheets and plain images share one texture namespace.
    pub fn has_texture(&self, key: &str) -> bool {
        self.images.contains_key(key) || self.spritesheets.contains_key(key)
    }

    /// Source rectangle and pixels for `frame` of texture `key`. Plain images
    /// only have frame 0.
    pub fn texture_frame(&self, key: &str, frame: u32) -> Option<(&ImageAsset, FrameRect)> {
        if let Some(sheet) = self.spritesheets.get(key) {
            return sheet.frame_rect(frame).map(|rect| (sheet.image(), rect));
        }
        let image = self.images.get(key)?;
        (frame == 0).then(|| {
            (
                image.as_ref(),
                FrameRect {
                    x: 0,
                    y: 0,
                    width: image.width(),
                    height: image.height(),
                },
            )
        })
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.spritesheets.len() + self.tilemaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
