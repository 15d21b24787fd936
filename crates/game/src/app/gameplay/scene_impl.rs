pub(crate) struct PrototypeScene {
    variant: SceneVariant,
    rng: StdRng,
    loading_text: Option<ObjectId>,
    context: Option<PlayerContext>,
}

impl PrototypeScene {
    pub(crate) fn new(variant: SceneVariant, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            variant,
            rng,
            loading_text: None,
            context: None,
        }
    }

    fn build_world(&mut self, world: &mut SceneWorld) -> Result<PlayerContext, SetupError> {
        match self.variant.world {
            WorldKind::Rectangle => Ok(self.build_rectangle_world(world)),
            WorldKind::Tilemap => build_tilemap_world(world),
        }
    }

    fn build_rectangle_world(&mut self, world: &mut SceneWorld) -> PlayerContext {
        let world_bounds = Rect::new(0.0, 0.0, WORLD_WIDTH, WORLD_HEIGHT);
        let background =
            world.add_rectangle(0.0, 0.0, WORLD_WIDTH, WORLD_HEIGHT, WORLD_BACKGROUND);
        world.set_origin(background, 0.0, 0.0);

        let player = world.add_rectangle(
            PLAYER_SPAWN.x,
            PLAYER_SPAWN.y,
            PLAYER_SIZE,
            PLAYER_SIZE,
            PLAYER_COLOR,
        );
        world.enable_body(player, true);
        world.set_physics_world_bounds(world_bounds);

        world.start_follow(player, true, CAMERA_LERP, CAMERA_LERP);
        world.camera_mut().set_bounds(world_bounds);

        let context = add_hud(world, player);
        self.scatter_decorations(world);
        context
    }

    fn scatter_decorations(&mut self, world: &mut SceneWorld) {
        let color = Color::WHITE.with_alpha(DECORATION_ALPHA);
        for _ in 0..DECORATION_COUNT {
            let x = self.rng.gen_range(0..=WORLD_WIDTH as u32);
            let y = self.rng.gen_range(0..=WORLD_HEIGHT as u32);
            let radius = self
                .rng
                .gen_range(DECORATION_MIN_RADIUS..=DECORATION_MAX_RADIUS);
            world.add_circle(x as f32, y as f32, radius as f32, color);
        }
    }
}

fn build_tilemap_world(world: &mut SceneWorld) -> Result<PlayerContext, SetupError> {
    let map = world.make_tilemap(TILEMAP_KEY)?;
    let tileset = world
        .add_tileset_image(map, TILESET_NAME, TILESET_IMAGE_KEY)
        .ok_or_else(|| SetupError::MissingTileset {
            name: TILESET_NAME.to_string(),
        })?;
    let layer = world
        .create_layer(map, GROUND_LAYER_NAME, tileset)
        .ok_or_else(|| SetupError::MissingLayer {
            name: GROUND_LAYER_NAME.to_string(),
        })?;

    let (map_width, map_height) = world
        .tilemap(map)
        .map(|tiled| {
            (
                tiled.width_in_pixels() as f32,
                tiled.height_in_pixels() as f32,
            )
        })
        .unwrap_or((WORLD_WIDTH, WORLD_HEIGHT));
    let map_bounds = Rect::new(0.0, 0.0, map_width, map_height);
    world.set_physics_world_bounds(map_bounds);
    world.camera_mut().set_bounds(map_bounds);

    let player = world.add_sprite(map_width * 0.5, map_height * 0.5, PLAYER_SHEET_KEY, 0);
    world.enable_body(player, true);
    world.set_collision_by_property(layer, COLLIDES_PROPERTY);
    world.add_collider(player, layer);
    world.start_follow(player, true, CAMERA_LERP, CAMERA_LERP);

    Ok(add_hud(world, player))
}

fn show_setup_error(world: &mut SceneWorld) {
    let style = TextStyle {
        font_size_px: MESSAGE_FONT_SIZE_PX,
        fill: Color::parse_css_hex(SETUP_ERROR_FILL).unwrap_or(Color::RED),
    };
    let text = world.add_text(MESSAGE_POS.x, MESSAGE_POS.y, SETUP_ERROR_TEXT, style);
    world.set_origin(text, 0.5, 0.5);
}

fn add_hud(world: &mut SceneWorld, player: ObjectId) -> PlayerContext {
    let style = TextStyle {
        font_size_px: HUD_FONT_SIZE_PX,
        fill: Color::parse_css_hex(HUD_FILL).unwrap_or(Color::WHITE),
    };
    let instructions = world.add_text(
        INSTRUCTION_TEXT_POS.x,
        INSTRUCTION_TEXT_POS.y,
        INSTRUCTION_TEXT,
        style,
    );
    world.set_scroll_factor(instructions, 0.0);

    let initial = world.position(player).unwrap_or(Vec2::ZERO);
    let position_text = world.add_text(
        POSITION_TEXT_POS.x,
        POSITION_TEXT_POS.y,
        &format_position(initial),
        style,
    );
    world.set_scroll_factor(position_text, 0.0);

    PlayerContext {
        player,
        position_text,
    }
}

fn update_player(
    context: &PlayerContext,
    variant: SceneVariant,
    input: &InputSnapshot,
    world: &mut SceneWorld,
) {
    let keys = MovementKeys::from_input(input);
    let velocity = resolve_velocity(keys, PLAYER_SPEED, variant.normalize_diagonal);
    world.set_velocity(context.player, velocity);

    if variant.live_position_text {
        if let Some(position) = world.position(context.player) {
            world.set_text(context.position_text, &format_position(position));
        }
    }
}

impl Scene for PrototypeScene {
    fn preload(&mut self, loader: &mut AssetLoader, world: &mut SceneWorld) {
        let style = TextStyle {
            font_size_px: MESSAGE_FONT_SIZE_PX,
            fill: Color::WHITE,
        };
        let loading = world.add_text(MESSAGE_POS.x, MESSAGE_POS.y, LOADING_TEXT, style);
        world.set_origin(loading, 0.5, 0.5);
        self.loading_text = Some(loading);

        if self.variant.world == WorldKind::Tilemap {
            loader.image(TILESET_IMAGE_KEY, TILESET_IMAGE_PATH);
            loader.tilemap_tiled_json(TILEMAP_KEY, TILEMAP_PATH);
            loader.spritesheet(
                PLAYER_SHEET_KEY,
                PLAYER_SHEET_PATH,
                SpritesheetConfig {
                    frame_width: PLAYER_FRAME_PX,
                    frame_height: PLAYER_FRAME_PX,
                },
            );
        }
    }

    fn create(&mut self, world: &mut SceneWorld) {
        if let Some(loading) = self.loading_text.take() {
            world.destroy(loading);
        }

        match self.build_world(world) {
            Ok(context) => {
                info!(
                    world = ?self.variant.world,
                    normalize_diagonal = self.variant.normalize_diagonal,
                    object_count = world.object_count(),
                    "prototype_scene_ready"
                );
                self.context = Some(context);
            }
            Err(error) => {
                error!(error = %error, world = ?self.variant.world, "scene_setup_failed");
                show_setup_error(world);
            }
        }
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        if let Some(context) = &self.context {
            update_player(context, self.variant, input, world);
        }
        SceneCommand::None
    }

    fn shutdown(&mut self, world: &mut SceneWorld) {
        if let Some(context) = self.context.take() {
            info!(
                final_position = ?world.position(context.player),
                "prototype_scene_shutdown"
            );
        }
    }
}
