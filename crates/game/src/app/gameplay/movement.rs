/// Direction flags for one frame; each is the OR of its arrow key and its
/// WASD key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MovementKeys {
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) up: bool,
    pub(crate) down: bool,
}

impl MovementKeys {
    pub(crate) fn from_input(input: &InputSnapshot) -> Self {
        KeyBindings::standard().read(input)
    }
}

/// Left beats right and up beats down when both are held. With
/// `normalize_diagonal`, a diagonal is rescaled to magnitude `speed`.
pub(crate) fn resolve_velocity(keys: MovementKeys, speed: f32, normalize_diagonal: bool) -> Vec2 {
    let mut velocity = Vec2::ZERO;

    if keys.left {
        velocity.x = -speed;
    } else if keys.right {
        velocity.x = speed;
    }

    if keys.up {
        velocity.y = -speed;
    } else if keys.down {
        velocity.y = speed;
    }

    if normalize_diagonal && velocity.x != 0.0 && velocity.y != 0.0 {
        velocity = velocity.normalize_or_zero().scale(speed);
    }
    velocity
}

fn format_position(position: Vec2) -> String {
    format!(
        "Position: {}, {}",
        position.x.floor() as i64,
        position.y.floor() as i64
    )
}
