use std::time::Duration;

use super::{Color, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Pick the best available backend. Only the software backend exists, so
    /// this resolves to [`RenderMode::Software`].
    Auto,
    Software,
}

impl RenderMode {
    pub fn resolve(self) -> RenderMode {
        match self {
            RenderMode::Auto | RenderMode::Software => RenderMode::Software,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsBackend {
    Arcade,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcadeConfig {
    pub gravity: Vec2,
    pub debug: bool,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub default: PhysicsBackend,
    pub arcade: ArcadeConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            default: PhysicsBackend::Arcade,
            arcade: ArcadeConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub title: String,
    pub render_mode: RenderMode,
    pub width: u32,
    pub height: u32,
    /// Mount identifier for the canvas; used to label the window.
    pub parent: String,
    /// Nearest-neighbour presentation with the camera scroll snapped to whole
    /// pixels.
    pub pixel_art: bool,
    pub background_color: Color,
    pub physics: PhysicsConfig,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Prototype".to_string(),
            render_mode: RenderMode::Auto,
            width: 800,
            height: 600,
            parent: "game".to_string(),
            pixel_art: true,
            background_color: Color::BLACK,
            physics: PhysicsConfig::default(),
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

impl GameConfig {
    pub fn window_title(&self) -> String {
        if self.parent.is_empty() {
            self.title.clone()
        } else {
            format!("{} [{}]", self.title, self.parent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_prototype_canvas() {
        let config = GameConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.parent, "game");
        assert!(config.pixel_art);
        assert_eq!(config.physics.default, PhysicsBackend::Arcade);
        assert_eq!(config.physics.arcade.gravity, Vec2::ZERO);
        assert!(!config.physics.arcade.debug);
    }

    #[test]
    fn auto_render_mode_resolves_to_software() {
        assert_eq!(RenderMode::Auto.resolve(), RenderMode::Software);
    }
}
