use engine::{Color, GameConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{self, SceneVariant, WorldKind};

const VARIANT_ENV_VAR: &str = "ROAMER_VARIANT";
const NORMALIZE_DIAGONAL_ENV_VAR: &str = "ROAMER_NORMALIZE_DIAGONAL";
const PHYSICS_DEBUG_ENV_VAR: &str = "ROAMER_PHYSICS_DEBUG";
const SEED_ENV_VAR: &str = "ROAMER_SEED";

const WINDOW_TITLE: &str = "Roamer";
const CANVAS_BACKGROUND: Color = Color::from_hex(0x000000);

pub(crate) struct AppWiring {
    pub(crate) config: GameConfig,
    pub(crate) scene: Box<dyn Scene>,
}

/// Launch options read from the environment. Unset or unparsable values fall
/// back to the rectangle world with its own defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LaunchSettings {
    variant: SceneVariant,
    physics_debug: bool,
    seed: Option<u64>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            variant: SceneVariant::rectangle(),
            physics_debug: false,
            seed: None,
        }
    }
}

impl LaunchSettings {
    fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(raw) = lookup(VARIANT_ENV_VAR) {
            match parse_world_kind(&raw) {
                Some(world) => settings.variant = SceneVariant::for_world(world),
                None => warn!(var = VARIANT_ENV_VAR, value = raw.as_str(), "launch_setting_ignored"),
            }
        }
        if let Some(raw) = lookup(NORMALIZE_DIAGONAL_ENV_VAR) {
            match parse_flag(&raw) {
                Some(normalize) => {
                    settings.variant = settings.variant.with_normalize_diagonal(normalize)
                }
                None => warn!(
                    var = NORMALIZE_DIAGONAL_ENV_VAR,
                    value = raw.as_str(),
                    "launch_setting_ignored"
                ),
            }
        }
        if let Some(raw) = lookup(PHYSICS_DEBUG_ENV_VAR) {
            match parse_flag(&raw) {
                Some(debug) => settings.physics_debug = debug,
                None => warn!(
                    var = PHYSICS_DEBUG_ENV_VAR,
                    value = raw.as_str(),
                    "launch_setting_ignored"
                ),
            }
        }
        if let Some(raw) = lookup(SEED_ENV_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => settings.seed = Some(seed),
                Err(_) => warn!(var = SEED_ENV_VAR, value = raw.as_str(), "launch_setting_ignored"),
            }
        }

        settings
    }
}

fn parse_world_kind(raw: &str) -> Option<WorldKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "rectangle" | "basic" | "1" => Some(WorldKind::Rectangle),
        "tilemap" | "tiled" | "2" => Some(WorldKind::Tilemap),
        _ => None,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn game_config(settings: &LaunchSettings) -> GameConfig {
    let mut config = GameConfig {
        title: WINDOW_TITLE.to_string(),
        background_color: CANVAS_BACKGROUND,
        ..GameConfig::default()
    };
    config.physics.arcade.debug = settings.physics_debug;
    config
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Roamer Startup ===");

    let settings = LaunchSettings::from_env();
    info!(
        world = ?settings.variant.world,
        normalize_diagonal = settings.variant.normalize_diagonal,
        physics_debug = settings.physics_debug,
        seed = ?settings.seed,
        "launch_settings"
    );

    AppWiring {
        config: game_config(&settings),
        scene: gameplay::build_scene(settings.variant, settings.seed),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> LaunchSettings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        LaunchSettings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_rectangle_world() {
        let settings = settings_from(&[]);
        assert_eq!(settings, LaunchSettings::default());
        assert_eq!(settings.variant, SceneVariant::rectangle());
    }

    #[test]
    fn tilemap_variant_is_selected_by_name_or_number() {
        assert_eq!(
            settings_from(&[(VARIANT_ENV_VAR, "tilemap")]).variant,
            SceneVariant::tilemap()
        );
        assert_eq!(
            settings_from(&[(VARIANT_ENV_VAR, " 2 ")]).variant,
            SceneVariant::tilemap()
        );
    }

    #[test]
    fn normalize_flag_overrides_variant_default() {
        let settings = settings_from(&[
            (VARIANT_ENV_VAR, "Tilemap"),
            (NORMALIZE_DIAGONAL_ENV_VAR, "true"),
        ]);
        assert_eq!(settings.variant.world, WorldKind::Tilemap);
        assert!(settings.variant.normalize_diagonal);
        assert!(!settings.variant.live_position_text);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let settings = settings_from(&[
            (VARIANT_ENV_VAR, "hexmap"),
            (NORMALIZE_DIAGONAL_ENV_VAR, "maybe"),
            (PHYSICS_DEBUG_ENV_VAR, "loud"),
            (SEED_ENV_VAR, "-4"),
        ]);
        assert_eq!(settings, LaunchSettings::default());
    }

    #[test]
    fn seed_and_debug_feed_config() {
        let settings = settings_from(&[(SEED_ENV_VAR, "42"), (PHYSICS_DEBUG_ENV_VAR, "on")]);
        assert_eq!(settings.seed, Some(42));

        let config = game_config(&settings);
        assert!(config.physics.arcade.debug);
        assert_eq!(config.title, WINDOW_TITLE);
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.background_color, Color::BLACK);
    }
}
