use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
mod asset_keys;
pub mod assets;

pub use app::{
    run_app, world_to_screen_px, AppError, ArcadeConfig, Blocked, Body, Camera, Color,
    DirectionKeys, DisplayKind, DisplayObject, GameConfig, InputSnapshot, Key,
    LoopMetricsSnapshot, MapId, ObjectId, PhysicsBackend, PhysicsConfig, Rect, RenderMode,
    Renderer, Scene, SceneCommand, SceneRunner, SceneWorld, TextStyle, TileLayerView,
    TilemapError, TilesetRef, Vec2, PLACEHOLDER_SPRITE_SIZE,
};
pub use asset_keys::AssetKeyError;
pub use assets::{
    AssetCache, AssetError, AssetLoader, AssetRequest, LoadSummary, SpritesheetConfig, TiledMap,
};

pub const ROOT_ENV_VAR: &str = "ROAMER_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub asset_root: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "{env_var} is set but does not point to a valid project root: {path}\n\
A valid root must contain an assets/ directory."
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error(
        "Could not find a project root above {start_dir}\n\
Expected a directory containing assets/ and either Cargo.toml or the executable.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/roamer\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let asset_root = root.join("assets");
    Ok(AppPaths { root, asset_root })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(Path::new(&value));
            if has_assets_dir(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_from(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

/// A shipped build keeps `assets/` next to the executable; a dev build finds
/// the workspace root above `target/`.
fn find_root_from(start_dir: &Path) -> Option<PathBuf> {
    if has_assets_dir(start_dir) {
        return Some(normalize_path(start_dir));
    }
    start_dir
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn has_assets_dir(path: &Path) -> bool {
    path.join("assets").is_dir()
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && has_assets_dir(path)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn repo_marker_requires_cargo_toml_and_assets() {
        let temp = TempDir::new().expect("temp");
        assert!(!is_repo_marker(temp.path()));
        fs::create_dir(temp.path().join("assets")).expect("assets");
        assert!(!is_repo_marker(temp.path()));
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("cargo");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn root_is_found_by_walking_up() {
        let temp = TempDir::new().expect("temp");
        fs::create_dir(temp.path().join("assets")).expect("assets");
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("cargo");
        let exe_dir = temp.path().join("target").join("debug");
        fs::create_dir_all(&exe_dir).expect("exe dir");

        assert_eq!(find_root_from(&exe_dir), Some(normalize_path(temp.path())));
    }

    #[test]
    fn assets_next_to_executable_win() {
        let temp = TempDir::new().expect("temp");
        let dist = temp.path().join("dist");
        fs::create_dir_all(dist.join("assets")).expect("assets");
        assert_eq!(find_root_from(&dist), Some(normalize_path(&dist)));
    }

    #[test]
    fn missing_root_is_none() {
        let temp = TempDir::new().expect("temp");
        let deep = temp.path().join("a").join("b");
        fs::create_dir_all(&deep).expect("deep");
        // Only the temp subtree is under test; a real root above it may match.
        let found = find_root_from(&deep);
        assert!(found.map_or(true, |root| !root.starts_with(normalize_path(temp.path()))));
    }
}
