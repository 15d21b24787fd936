//! Tiled JSON map format (orthogonal maps, uncompressed tile layers).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::AssetError;

/// Horizontal, vertical and diagonal flip flags stored in the top bits of a
/// GID. Flipped rendering is not supported; the flags are stripped.
pub const TILE_FLIP_MASK: u32 = 0xE000_0000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
struct RawMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default = "default_orientation")]
    orientation: String,
    #[serde(default)]
    infinite: bool,
    #[serde(default)]
    layers: Vec<RawLayer>,
    #[serde(default)]
    tilesets: Vec<RawTileset>,
}

fn default_orientation() -> String {
    "orthogonal".to_string()
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    data: Option<Vec<u32>>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "default_opacity")]
    opacity: f32,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct RawTileset {
    name: String,
    firstgid: u32,
    tilewidth: u32,
    tileheight: u32,
    columns: u32,
    tilecount: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    tiles: Vec<RawTile>,
}

#[derive(Debug, Deserialize)]
struct RawTile {
    id: u32,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    name: String,
    value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Tiled stores flags as bools, but hand-written maps often use 0/1.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Bool(value) => *value,
            PropertyValue::Int(value) => *value != 0,
            PropertyValue::Float(value) => *value != 0.0,
            PropertyValue::String(value) => !value.is_empty() && value != "false",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    pub opacity: f32,
    data: Vec<u32>,
}

impl TileLayer {
    /// GID at tile `(x, y)` with flip flags removed; 0 is an empty cell.
    pub fn gid_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .map(|gid| gid & !TILE_FLIP_MASK)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TilesetDef {
    pub name: String,
    pub first_gid: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub tile_count: u32,
    pub margin: u32,
    pub spacing: u32,
    properties: HashMap<u32, HashMap<String, PropertyValue>>,
}

impl TilesetDef {
    pub fn contains_gid(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid < self.first_gid.saturating_add(self.tile_count)
    }

    /// Pixel offset of local tile `index` inside the tileset image, or `None`
    /// when the index is out of range or the offset does not fit in `u32`.
    pub fn source_origin(&self, index: u32) -> Option<(u32, u32)> {
        if index >= self.tile_count || self.columns == 0 {
            return None;
        }
        let column = index % self.columns;
        let row = index / self.columns;
        let step_x = self.tile_width.checked_add(self.spacing)?;
        let step_y = self.tile_height.checked_add(self.spacing)?;
        let x = column.checked_mul(step_x)?.checked_add(self.margin)?;
        let y = row.checked_mul(step_y)?.checked_add(self.margin)?;
        Some((x, y))
    }

    pub fn tile_property(&self, index: u32, name: &str) -> Option<&PropertyValue> {
        self.properties.get(&index)?.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TiledMap {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub layers: Vec<TileLayer>,
    pub tilesets: Vec<TilesetDef>,
}

impl TiledMap {
    /// Maps from [`parse_tiled_json`] never saturate.
    pub fn width_in_pixels(&self) -> u32 {
        self.width.saturating_mul(self.tile_width)
    }

    pub fn height_in_pixels(&self) -> u32 {
        self.height.saturating_mul(self.tile_height)
    }

    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.name == name)
    }

    pub fn tileset_index(&self, name: &str) -> Option<usize> {
        self.tilesets.iter().position(|tileset| tileset.name == name)
    }
}

pub fn parse_tiled_json(raw: &str, source_path: &Path) -> Result<TiledMap, AssetError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let raw_map: RawMap =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            AssetError::ParseJson {
                path: source_path.to_path_buf(),
                json_path,
                source: error.into_inner(),
            }
        })?;
    convert_map(raw_map, source_path)
}

fn convert_map(raw: RawMap, source_path: &Path) -> Result<TiledMap, AssetError> {
    let invalid = |message: String| AssetError::InvalidTilemap {
        path: source_path.to_path_buf(),
        message,
    };

    if raw.orientation != "orthogonal" {
        return Err(invalid(format!(
            "orientation '{}' is not supported; expected 'orthogonal'",
            raw.orientation
        )));
    }
    if raw.infinite {
        return Err(invalid("infinite maps are not supported".to_string()));
    }
    if raw.tilewidth == 0 || raw.tileheight == 0 {
        return Err(invalid(format!(
            "tile size must be non-zero, got {}x{}",
            raw.tilewidth, raw.tileheight
        )));
    }
    if raw.width.checked_mul(raw.tilewidth).is_none()
        || raw.height.checked_mul(raw.tileheight).is_none()
    {
        return Err(invalid(format!(
            "map of {}x{} tiles at {}x{} px does not fit in u32 pixels",
            raw.width, raw.height, raw.tilewidth, raw.tileheight
        )));
    }

    let mut layers = Vec::new();
    for (index, layer) in raw.layers.into_iter().enumerate() {
        if layer.kind != "tilelayer" {
            continue;
        }
        if let Some(encoding) = layer.encoding.as_deref() {
            if encoding != "csv" {
                return Err(invalid(format!(
                    "layers[{index}] '{}' uses encoding '{encoding}'; only uncompressed arrays are supported",
                    layer.name
                )));
            }
        }
        if layer.width != raw.width || layer.height != raw.height {
            return Err(invalid(format!(
                "layers[{index}] '{}' is {}x{} tiles; the map is {}x{}",
                layer.name, layer.width, layer.height, raw.width, raw.height
            )));
        }
        let data = layer.data.ok_or_else(|| {
            invalid(format!("layers[{index}] '{}' has no tile data", layer.name))
        })?;
        let expected = layer.width as usize * layer.height as usize;
        if data.len() != expected {
            return Err(invalid(format!(
                "layers[{index}] '{}' tile count mismatch: expected {expected}, got {}",
                layer.name,
                data.len()
            )));
        }
        layers.push(TileLayer {
            name: layer.name,
            width: layer.width,
            height: layer.height,
            visible: layer.visible,
            opacity: layer.opacity.clamp(0.0, 1.0),
            data,
        });
    }

    let tilesets = raw
        .tilesets
        .into_iter()
        .map(|tileset| TilesetDef {
            name: tileset.name,
            first_gid: tileset.firstgid,
            tile_width: tileset.tilewidth,
            tile_height: tileset.tileheight,
            columns: tileset.columns,
            tile_count: tileset.tilecount,
            margin: tileset.margin,
            spacing: tileset.spacing,
            properties: tileset
                .tiles
                .into_iter()
                .map(|tile| {
                    let props = tile
                        .properties
                        .into_iter()
                        .map(|prop| (prop.name, prop.value))
                        .collect();
                    (tile.id, props)
                })
                .collect(),
        })
        .collect();

    Ok(TiledMap {
        width: raw.width,
        height: raw.height,
        tile_width: raw.tilewidth,
        tile_height: raw.tileheight,
        layers,
        tilesets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"{
        "width": 3, "height": 2, "tilewidth": 32, "tileheight": 32,
        "orientation": "orthogonal", "infinite": false,
        "layers": [
            {"name": "Ground", "type": "tilelayer", "width": 3, "height": 2,
             "data": [1, 2, 0, 3, 2147483649, 1]},
            {"name": "Spawns", "type": "objectgroup", "objects": []}
        ],
        "tilesets": [
            {"name": "tiles", "firstgid": 1, "tilewidth": 32, "tileheight": 32,
             "columns": 2, "tilecount": 4, "margin": 1, "spacing": 2,
             "image": "../tilesets/tiles.png",
             "tiles": [{"id": 2, "properties": [
                {"name": "collides", "type": "bool", "value": true}]}]}
        ]
    }"#;

    fn parse(raw: &str) -> Result<TiledMap, AssetError> {
        parse_tiled_json(raw, Path::new("maps/test.json"))
    }

    #[test]
    fn parses_tile_layers_and_skips_object_layers() {
        let map = parse(MAP).expect("map");
        assert_eq!(map.width_in_pixels(), 96);
        assert_eq!(map.height_in_pixels(), 64);
        assert_eq!(map.layers.len(), 1);
        assert_eq!(map.layer_index("Ground"), Some(0));
        assert_eq!(map.layer_index("Spawns"), None);
        assert_eq!(map.layers[0].gid_at(2, 0), Some(0));
        assert_eq!(map.layers[0].gid_at(3, 0), None);
    }

    #[test]
    fn flip_flags_are_stripped() {
        let map = parse(MAP).expect("map");
        assert_eq!(map.layers[0].gid_at(1, 1), Some(1));
    }

    #[test]
    fn tileset_properties_and_source_origin() {
        let map = parse(MAP).expect("map");
        let tileset = &map.tilesets[map.tileset_index("tiles").expect("tileset")];
        assert!(tileset.contains_gid(4));
        assert!(!tileset.contains_gid(5));
        assert_eq!(tileset.source_origin(3), Some((35, 35)));
        assert!(tileset
            .tile_property(2, "collides")
            .is_some_and(PropertyValue::is_truthy));
        assert!(tileset.tile_property(1, "collides").is_none());
    }

    #[test]
    fn json_errors_report_the_failing_path() {
        let raw = r#"{"width": 1, "height": 1, "tilewidth": "wide", "tileheight": 32}"#;
        match parse(raw) {
            Err(AssetError::ParseJson { json_path, .. }) => assert_eq!(json_path, "tilewidth"),
            other => panic!("expected ParseJson, got {other:?}"),
        }
    }

    #[test]
    fn wrong_tile_count_is_rejected() {
        let raw = r#"{"width": 2, "height": 2, "tilewidth": 32, "tileheight": 32,
            "layers": [{"name": "Ground", "type": "tilelayer", "width": 2, "height": 2, "data": [1, 2, 3]}]}"#;
        assert!(matches!(parse(raw), Err(AssetError::InvalidTilemap { .. })));
    }

    #[test]
    fn compressed_layers_are_rejected() {
        let raw = r#"{"width": 1, "height": 1, "tilewidth": 32, "tileheight": 32,
            "layers": [{"name": "Ground", "type": "tilelayer", "width": 1, "height": 1,
                        "encoding": "base64", "data": [1]}]}"#;
        assert!(matches!(parse(raw), Err(AssetError::InvalidTilemap { .. })));
    }

    #[test]
    fn non_orthogonal_maps_are_rejected() {
        let raw = r#"{"width": 1, "height": 1, "tilewidth": 32, "tileheight": 32,
            "orientation": "isometric"}"#;
        assert!(matches!(parse(raw), Err(AssetError::InvalidTilemap { .. })));
    }

    #[test]
    fn maps_too_large_for_pixel_coordinates_are_rejected() {
        let raw = r#"{"width": 2000000000, "height": 1, "tilewidth": 32, "tileheight": 32,
            "layers": [{"name": "Ground", "type": "tilelayer", "width": 1, "height": 1, "data": [1]}]}"#;
        match parse(raw) {
            Err(AssetError::InvalidTilemap { message, .. }) => {
                assert!(message.contains("does not fit"), "{message}")
            }
            other => panic!("expected InvalidTilemap, got {other:?}"),
        }
    }

    #[test]
    fn layer_size_must_match_map_size() {
        let raw = r#"{"width": 2, "height": 2, "tilewidth": 32, "tileheight": 32,
            "layers": [{"name": "Ground", "type": "tilelayer", "width": 1, "height": 1, "data": [1]}]}"#;
        match parse(raw) {
            Err(AssetError::InvalidTilemap { message, .. }) => {
                assert!(message.contains("'Ground' is 1x1"), "{message}")
            }
            other => panic!("expected InvalidTilemap, got {other:?}"),
        }
    }

    #[test]
    fn source_origin_overflow_yields_none() {
        let raw = r#"{"width": 1, "height": 1, "tilewidth": 32, "tileheight": 32,
            "layers": [{"name": "Ground", "type": "tilelayer", "width": 1, "height": 1, "data": [2]}],
            "tilesets": [{"name": "tiles", "firstgid": 1, "tilewidth": 32, "tileheight": 32,
                          "columns": 2, "tilecount": 2, "margin": 4294967295}]}"#;
        let map = parse(raw).expect("map");
        let tileset = &map.tilesets[0];
        assert_eq!(tileset.source_origin(0), Some((u32::MAX, u32::MAX)));
        assert_eq!(tileset.source_origin(1), None);
    }
}
