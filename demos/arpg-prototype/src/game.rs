//! ARPG character prototype: a multi-part hero walking a scrolling tiled
//! world, swinging at nothing, and buying upgrades with discipline.

use glam::Vec2;
use serde::Serialize;
use arpg_core::api::game::GameConfig;
use arpg_core::character::CharacterSnapshot;
use arpg_core::input::queue::{InputEvent, InputQueue};
use arpg_core::{
    codes, draw_attack_effects, draw_character, AssetManifest, BreakpointTable, Character,
    CharacterPose, CharacterSprites, CharacterState, Clock, EngineContext, Game, GameEvent,
    KeyValueStore, Progression, PrototypeConfig, QuestError, RenderContext, SoundEvent,
    SpriteRegistry, StatKind, World,
};
use arpg_web::{BrowserClock, LocalStorage};

/// Custom event kinds from the UI.
mod events {
    pub const TOGGLE_ARMS: u32 = 1;
    pub const TOGGLE_WEAPON: u32 = 2;
    pub const RESET_POSITION: u32 = 3;
    pub const UPGRADE_LIFE: u32 = 4;
    pub const UPGRADE_DAMAGE: u32 = 5;
    pub const START_QUEST_NOW: u32 = 6;
    pub const RESET_QUEST: u32 = 7;
    /// The page lost focus; key-up events may never arrive.
    pub const RELEASE_KEYS: u32 = 8;
}

/// Text event kinds from the UI.
mod text_events {
    /// ISO-8601 quest start from a datetime field.
    pub const QUEST_START: u32 = 1;
    /// A `PrototypeConfig` JSON document.
    pub const CONFIG: u32 = 2;
}

/// Game event kinds to the UI.
mod game_events {
    pub const ATTACK_STARTED: u32 = 1;
    pub const ATTACK_FINISHED: u32 = 2;
    /// a = stat (0 life, 1 damage), b = price paid
    pub const UPGRADED: u32 = 3;
    /// a = stat, b = price, c = available discipline
    pub const UPGRADE_REJECTED: u32 = 4;
    /// a = new rank index, or -1 when no rank applies
    pub const RANK_CHANGED: u32 = 5;
    pub const QUEST_STARTED: u32 = 6;
    pub const QUEST_REJECTED: u32 = 7;
    pub const QUEST_RESET: u32 = 8;
    pub const CONFIG_APPLIED: u32 = 9;
    pub const CONFIG_REJECTED: u32 = 10;
}

/// Sound ids the host maps to audio clips.
mod sounds {
    pub const SWING: u32 = 1;
    pub const UPGRADE: u32 = 2;
    pub const DENIED: u32 = 3;
}

/// Builds the wall clock and persistent store a progression runs on.
type Services = Box<dyn Fn() -> (Box<dyn Clock>, Box<dyn KeyValueStore>)>;

struct Scene {
    world: World,
    character: Character,
}

/// HUD payload returned by `get_status_json`.
#[derive(Debug, Serialize)]
pub struct HudSnapshot {
    pub character: CharacterSnapshot,
    pub camera_x: f32,
    pub camera_y: f32,
    pub world_width: f32,
    pub world_height: f32,
}

pub struct ArpgPrototype {
    config: PrototypeConfig,
    services: Services,
    sprites: CharacterSprites,
    scene: Option<Scene>,
}

impl ArpgPrototype {
    pub fn new() -> Self {
        Self::with_services(PrototypeConfig::default(), || {
            (
                Box::new(BrowserClock) as Box<dyn Clock>,
                Box::new(LocalStorage::new()) as Box<dyn KeyValueStore>,
            )
        })
    }

    pub fn with_services(
        config: PrototypeConfig,
        services: impl Fn() -> (Box<dyn Clock>, Box<dyn KeyValueStore>) + 'static,
    ) -> Self {
        Self {
            config,
            services: Box::new(services),
            sprites: CharacterSprites::default(),
            scene: None,
        }
    }

    fn build_progression(&self) -> Progression {
        let (clock, store) = (self.services)();
        match Progression::from_config(&self.config.progression, clock, store) {
            Ok(progression) => progression,
            Err(err) => {
                log::error!("invalid progression config ({}), using the earned defaults", err);
                let (clock, _) = (self.services)();
                Progression::earned(BreakpointTable::earned_default(), clock)
            }
        }
    }

    fn build_scene(&self, registry: &SpriteRegistry) -> Scene {
        let world = World::new(&self.config.world, registry);
        let mut character = Character::new(self.config.character.clone(), self.build_progression());
        character.set_world_bounds(world.bounds());
        let mut scene = Scene { world, character };
        scene.world.camera_mut().look_at(scene.character.position());
        scene
    }

    pub fn character(&self) -> Option<&Character> {
        self.scene.as_ref().map(|s| &s.character)
    }

    pub fn world(&self) -> Option<&World> {
        self.scene.as_ref().map(|s| &s.world)
    }

    fn handle_input(&mut self, ctx: &mut EngineContext, event: &InputEvent) {
        if let InputEvent::Text { kind: text_events::CONFIG, text } = event {
            self.apply_config(ctx, text);
            return;
        }
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let character = &mut scene.character;
        match event {
            InputEvent::KeyDown { key_code: codes::SPACE } | InputEvent::PointerDown { .. } => {
                start_attack(ctx, character);
            }
            InputEvent::KeyDown { key_code } => {
                character.set_key(*key_code, true);
            }
            InputEvent::KeyUp { key_code } => {
                character.set_key(*key_code, false);
            }
            InputEvent::Custom { kind, .. } => match *kind {
                events::TOGGLE_ARMS => {
                    character.toggle_arms();
                }
                events::TOGGLE_WEAPON => {
                    character.toggle_weapon();
                }
                events::RESET_POSITION => {
                    character.reset_position();
                    scene.world.camera_mut().look_at(character.position());
                }
                events::UPGRADE_LIFE => buy_upgrade(ctx, character, StatKind::MaxLife),
                events::UPGRADE_DAMAGE => buy_upgrade(ctx, character, StatKind::Damage),
                events::START_QUEST_NOW => {
                    let result = character.progression_mut().start_quest_now();
                    report_quest(ctx, result);
                }
                events::RESET_QUEST => match character.progression_mut().reset_quest() {
                    Ok(()) => ctx.emit_event(GameEvent::new(game_events::QUEST_RESET, 0.0, 0.0, 0.0)),
                    Err(err) => {
                        log::warn!("quest reset rejected: {}", err);
                        ctx.emit_event(GameEvent::new(game_events::QUEST_REJECTED, 0.0, 0.0, 0.0));
                    }
                },
                events::RELEASE_KEYS => character.release_keys(),
                other => log::debug!("ignoring custom event {}", other),
            },
            InputEvent::Text { kind: text_events::QUEST_START, text } => {
                let result = character.progression_mut().start_quest_at(text);
                report_quest(ctx, result);
            }
            InputEvent::Text { kind, .. } => log::debug!("ignoring text event {}", kind),
        }
    }

    /// Replace the tuning and rebuild the scene. Invalid documents leave
    /// the running scene untouched.
    fn apply_config(&mut self, ctx: &mut EngineContext, json: &str) {
        match PrototypeConfig::from_json(json) {
            Ok(config) => {
                self.config = config;
                self.scene = Some(self.build_scene(&ctx.assets));
                log::info!("tuning config applied");
                ctx.emit_event(GameEvent::new(game_events::CONFIG_APPLIED, 0.0, 0.0, 0.0));
            }
            Err(err) => {
                log::error!("{}", err);
                ctx.emit_event(GameEvent::new(game_events::CONFIG_REJECTED, 0.0, 0.0, 0.0));
            }
        }
    }
}

fn start_attack(ctx: &mut EngineContext, character: &mut Character) {
    if character.attack() {
        let pos = character.position();
        ctx.emit_sound(SoundEvent(sounds::SWING));
        ctx.emit_event(GameEvent::new(game_events::ATTACK_STARTED, pos.x, pos.y, 0.0));
    }
}

fn stat_code(kind: StatKind) -> f32 {
    match kind {
        StatKind::MaxLife => 0.0,
        StatKind::Damage => 1.0,
    }
}

fn buy_upgrade(ctx: &mut EngineContext, character: &mut Character, kind: StatKind) {
    match character.upgrade(kind) {
        Ok(cost) => {
            ctx.emit_sound(SoundEvent(sounds::UPGRADE));
            ctx.emit_event(GameEvent::new(game_events::UPGRADED, stat_code(kind), cost as f32, 0.0));
        }
        Err(err) => {
            log::info!("{}", err);
            let available = character.progression().discipline();
            let cost = character.stats().cost(kind);
            ctx.emit_sound(SoundEvent(sounds::DENIED));
            ctx.emit_event(GameEvent::new(
                game_events::UPGRADE_REJECTED,
                stat_code(kind),
                cost as f32,
                available as f32,
            ));
        }
    }
}

fn report_quest(ctx: &mut EngineContext, result: Result<(), QuestError>) {
    match result {
        Ok(()) => ctx.emit_event(GameEvent::new(game_events::QUEST_STARTED, 0.0, 0.0, 0.0)),
        Err(err) => {
            log::warn!("quest start rejected: {}", err);
            ctx.emit_event(GameEvent::new(game_events::QUEST_REJECTED, 0.0, 0.0, 0.0));
        }
    }
}

impl Game for ArpgPrototype {
    fn config(&self) -> GameConfig {
        let world = &self.config.world;
        GameConfig {
            world_width: world.width,
            world_height: world.height,
            viewport_width: world.viewport_width,
            viewport_height: world.viewport_height,
            max_sprites: self.config.max_sprites(),
            ..GameConfig::default()
        }
    }

    fn manifest(&self) -> AssetManifest {
        AssetManifest::prototype()
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.sprites = CharacterSprites::resolve(&ctx.assets);
        self.scene = Some(self.build_scene(&ctx.assets));
        log::info!("ARPG prototype initialized");
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        for event in input.iter() {
            self.handle_input(ctx, event);
        }

        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let report = scene.character.update(ctx.dt);
        if report.attack_finished {
            ctx.emit_event(GameEvent::new(game_events::ATTACK_FINISHED, 0.0, 0.0, 0.0));
        }
        if let Some(rank) = report.accrual.rank_changed {
            let index = rank.map_or(-1.0, |i| i as f32);
            ctx.emit_event(GameEvent::new(game_events::RANK_CHANGED, index, 0.0, 0.0));
        }
        scene.world.update_camera(scene.character.position());
    }

    fn render(&self, ctx: &mut RenderContext) {
        let Some(scene) = &self.scene else {
            return;
        };
        // Props and the hero must fit even when the background would not.
        let reserve = scene.world.props().len() + self.config.character.max_sprites();
        scene.world.draw_background(ctx.draw, ctx.assets, reserve);
        scene.world.draw_props(ctx.draw, ctx.assets);

        let character = &scene.character;
        let screen = scene.world.world_to_screen(character.rounded_position());
        let pose = CharacterPose::of(character);
        draw_character(ctx.draw, ctx.assets, &self.sprites, &pose, screen);

        if character.state() == CharacterState::Attacking {
            draw_attack_effects(ctx.draw, screen, character.attack_progress());
        }
    }

    fn assets_changed(&mut self, ctx: &EngineContext) {
        self.sprites = CharacterSprites::resolve(&ctx.assets);
        // Sprite ids may have moved if the manifest was replaced.
        if let Some(scene) = self.scene.as_mut() {
            let camera = scene.world.camera().position;
            scene.world = World::new(&self.config.world, &ctx.assets);
            scene.world.camera_mut().position = camera;
        }
    }

    fn status_json(&self) -> Option<String> {
        let scene = self.scene.as_ref()?;
        let camera = scene.world.camera().position;
        let bounds = scene.world.bounds();
        let hud = HudSnapshot {
            character: scene.character.snapshot(),
            camera_x: camera.x,
            camera_y: camera.y,
            world_width: bounds.x,
            world_height: bounds.y,
        };
        serde_json::to_string(&hud)
            .map_err(|err| log::error!("failed to serialize HUD: {}", err))
            .ok()
    }
}
