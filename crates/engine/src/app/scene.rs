use std::path::{Path, PathBuf};

use tracing::info;

use super::input::{Key, KeyStates};
use super::SceneWorld;
use crate::assets::AssetLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Keyboard state sampled once per simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    keys: KeyStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, keys: KeyStates) -> Self {
        Self {
            quit_requested,
            keys,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys.is_down(key)
    }

    pub fn with_key_down(mut self, key: Key, is_down: bool) -> Self {
        self.keys.set(key, is_down);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

pub trait Scene {
    /// Queue assets and put up any loading placeholder. Assets are not
    /// available until `create`.
    fn preload(&mut self, loader: &mut AssetLoader, world: &mut SceneWorld);
    fn create(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn shutdown(&mut self, _world: &mut SceneWorld) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunnerState {
    Idle,
    Running,
    Stopped,
}

/// Owns one scene and its world and drives the lifecycle in order:
/// preload, asset load, create, then fixed ticks.
pub struct SceneRunner {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    asset_root: PathBuf,
    state: RunnerState,
    ticks: u64,
}

impl SceneRunner {
    pub fn new(scene: Box<dyn Scene>, world: SceneWorld, asset_root: impl Into<PathBuf>) -> Self {
        Self {
            scene,
            world,
            asset_root: asset_root.into(),
            state: RunnerState::Idle,
            ticks: 0,
        }
    }

    pub fn boot(&mut self) {
        if self.state != RunnerState::Idle {
            return;
        }
        let mut loader = AssetLoader::new();
        self.scene.preload(&mut loader, &mut self.world);
        let summary = loader.load_all(&self.asset_root, self.world.assets_mut());
        self.scene.create(&mut self.world);
        self.state = RunnerState::Running;
        info!(
            assets_loaded = summary.loaded,
            assets_failed = summary.failed,
            object_count = self.world.object_count(),
            "scene_created"
        );
    }

    /// One fixed step: scene update, physics, then camera follow. Does
    /// nothing until `boot` has run.
    pub fn tick(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if self.state != RunnerState::Running {
            return SceneCommand::None;
        }
        let command = self
            .scene
            .update(fixed_dt_seconds, input, &mut self.world);
        self.world.step_physics(fixed_dt_seconds);
        self.world.update_camera();
        self.ticks = self.ticks.saturating_add(1);
        command
    }

    pub fn shutdown(&mut self) {
        if self.state != RunnerState::Running {
            return;
        }
        self.scene.shutdown(&mut self.world);
        self.state = RunnerState::Stopped;
        info!(ticks = self.ticks, "scene_shutdown");
    }

    pub fn is_running(&self) -> bool {
        self.state == RunnerState::Running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::app::{Color, GameConfig, ObjectId, TextStyle, Vec2};

    #[derive(Default)]
    struct Calls {
        preload: u32,
        create: u32,
        update: u32,
        shutdown: u32,
        loading_text_seen_in_create: bool,
    }

    struct RecordingScene {
        calls: Rc<RefCell<Calls>>,
        loading_text: Option<ObjectId>,
        mover: Option<ObjectId>,
    }

    impl Scene for RecordingScene {
        fn preload(&mut self, loader: &mut AssetLoader, world: &mut SceneWorld) {
            self.calls.borrow_mut().preload += 1;
            loader.image("missing", "nowhere/missing.png");
            self.loading_text = Some(world.add_text(400.0, 300.0, "Loading...", TextStyle::default()));
        }

        fn create(&mut self, world: &mut SceneWorld) {
            let mut calls = self.calls.borrow_mut();
            calls.create += 1;
            calls.loading_text_seen_in_create =
                self.loading_text.is_some_and(|id| world.object(id).is_some());
            let mover = world.add_rectangle(100.0, 100.0, 10.0, 10.0, Color::WHITE);
            world.enable_body(mover, false);
            self.mover = Some(mover);
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            input: &InputSnapshot,
            world: &mut SceneWorld,
        ) -> SceneCommand {
            self.calls.borrow_mut().update += 1;
            if let Some(mover) = self.mover {
                world.set_velocity(mover, Vec2::new(60.0, 0.0));
            }
            if input.quit_requested() {
                SceneCommand::Quit
            } else {
                SceneCommand::None
            }
        }

        fn shutdown(&mut self, _world: &mut SceneWorld) {
            self.calls.borrow_mut().shutdown += 1;
        }
    }

    fn runner() -> (SceneRunner, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let scene = RecordingScene {
            calls: Rc::clone(&calls),
            loading_text: None,
            mover: None,
        };
        let runner = SceneRunner::new(
            Box::new(scene),
            SceneWorld::new(&GameConfig::default()),
            "/definitely/not/a/real/asset/root",
        );
        (runner, calls)
    }

    #[test]
    fn tick_before_boot_is_a_no_op() {
        let (mut runner, calls) = runner();
        assert_eq!(runner.tick(1.0 / 60.0, &InputSnapshot::empty()), SceneCommand::None);
        assert_eq!(calls.borrow().update, 0);
        assert!(!runner.is_running());
    }

    #[test]
    fn boot_runs_preload_then_create_exactly_once() {
        let (mut runner, calls) = runner();
        runner.boot();
        runner.boot();
        let calls = calls.borrow();
        assert_eq!(calls.preload, 1);
        assert_eq!(calls.create, 1);
        assert!(calls.loading_text_seen_in_create);
        assert!(runner.is_running());
    }

    #[test]
    fn failed_assets_do_not_abort_boot() {
        let (mut runner, _calls) = runner();
        runner.boot();
        assert!(runner.world().assets().is_empty());
        assert!(runner.is_running());
    }

    #[test]
    fn tick_applies_velocity_set_during_update() {
        let (mut runner, _calls) = runner();
        runner.boot();
        runner.tick(0.5, &InputSnapshot::empty());
        let mover = runner
            .world()
            .objects()
            .iter()
            .find(|object| object.body().is_some())
            .map(|object| object.position);
        assert_eq!(mover, Some(Vec2::new(130.0, 100.0)));
        assert_eq!(runner.ticks(), 1);
    }

    #[test]
    fn quit_input_is_forwarded_as_command() {
        let (mut runner, _calls) = runner();
        runner.boot();
        let input = InputSnapshot::empty().with_quit_requested(true);
        assert_eq!(runner.tick(1.0 / 60.0, &input), SceneCommand::Quit);
    }

    #[test]
    fn shutdown_runs_once_and_stops_ticks() {
        let (mut runner, calls) = runner();
        runner.boot();
        runner.shutdown();
        runner.shutdown();
        runner.tick(1.0 / 60.0, &InputSnapshot::empty());
        let calls = calls.borrow();
        assert_eq!(calls.shutdown, 1);
        assert_eq!(calls.update, 0);
    }

    #[test]
    fn snapshot_builder_sets_keys() {
        let input = InputSnapshot::empty().with_key_down(Key::A, true);
        assert!(input.is_down(Key::A));
        assert!(!input.is_down(Key::D));
        assert!(!input.with_key_down(Key::A, false).is_down(Key::A));
    }
}
