#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorldKind {
    /// Flat 1600x1200 world with a rectangle player and decorative circles.
    Rectangle,
    /// Tiled map with a spritesheet player and colliding tiles.
    Tilemap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SceneVariant {
    pub(crate) world: WorldKind,
    pub(crate) normalize_diagonal: bool,
    pub(crate) live_position_text: bool,
}

impl SceneVariant {
    pub(crate) const fn rectangle() -> Self {
        Self {
            world: WorldKind::Rectangle,
            normalize_diagonal: true,
            live_position_text: true,
        }
    }

    pub(crate) const fn tilemap() -> Self {
        Self {
            world: WorldKind::Tilemap,
            normalize_diagonal: false,
            live_position_text: false,
        }
    }

    pub(crate) const fn for_world(world: WorldKind) -> Self {
        match world {
            WorldKind::Rectangle => Self::rectangle(),
            WorldKind::Tilemap => Self::tilemap(),
        }
    }

    pub(crate) const fn with_normalize_diagonal(mut self, normalize_diagonal: bool) -> Self {
        self.normalize_diagonal = normalize_diagonal;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyBindings {
    cursors: DirectionKeys,
    wasd: DirectionKeys,
}

impl KeyBindings {
    const fn standard() -> Self {
        Self {
            cursors: DirectionKeys::cursors(),
            wasd: DirectionKeys::wasd(),
        }
    }

    fn read(&self, input: &InputSnapshot) -> MovementKeys {
        let held = |pick: fn(&DirectionKeys) -> engine::Key| {
            input.is_down(pick(&self.cursors)) || input.is_down(pick(&self.wasd))
        };
        MovementKeys {
            left: held(|keys| keys.left),
            right: held(|keys| keys.right),
            up: held(|keys| keys.up),
            down: held(|keys| keys.down),
        }
    }
}

/// Handles created in `create` and read every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlayerContext {
    player: ObjectId,
    position_text: ObjectId,
}

#[derive(Debug, Error)]
pub(crate) enum SetupError {
    #[error("tileset '{name}' is not defined by the tilemap or its image did not load")]
    MissingTileset { name: String },
    #[error("tile layer '{name}' is not defined by the tilemap")]
    MissingLayer { name: String },
    #[error(transparent)]
    Tilemap(#[from] TilemapError),
}
