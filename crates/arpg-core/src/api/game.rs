use crate::api::types::{SoundEvent, GameEvent};
use crate::assets::manifest::AssetManifest;
use crate::assets::registry::SpriteRegistry;
use crate::input::queue::InputQueue;
use crate::render::instance::DrawList;

/// Configuration for the runner, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Maximum simulation steps per host frame (default: 10).
    pub max_steps: u32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Canvas width in pixels.
    pub viewport_width: f32,
    /// Canvas height in pixels.
    pub viewport_height: f32,
    /// Maximum sprite instances per frame (default: 1024).
    pub max_sprites: usize,
    /// Maximum overlay shapes per frame (default: 16).
    pub max_overlays: usize,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps: 10,
            world_width: 2000.0,
            world_height: 1500.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            max_sprites: 1024,
            max_overlays: 16,
            max_sounds: 32,
            max_events: 32,
        }
    }
}

/// The contract every game must fulfill.
pub trait Game {
    /// Return runner configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Sprites the host should load. Called once before init.
    fn manifest(&self) -> AssetManifest {
        AssetManifest::default()
    }

    /// Setup initial state once the sprite registry exists.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed simulation step. `input` holds events that arrived since the
    /// previous host frame; it is only non-empty for the first step of a frame.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Read-only pass that fills the frame's draw lists.
    fn render(&self, _ctx: &mut RenderContext) {}

    /// Called after the host reports a sprite load or failure.
    fn assets_changed(&mut self, _ctx: &EngineContext) {}

    /// JSON status for the host HUD, if the game has one.
    fn status_json(&self) -> Option<String> {
        None
    }
}

/// Mutable access to runner state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub assets: SpriteRegistry,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    /// Fixed step length in seconds.
    pub dt: f32,
    max_sounds: usize,
    max_events: usize,
}

impl EngineContext {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            assets: SpriteRegistry::new(),
            sounds: Vec::with_capacity(config.max_sounds),
            events: Vec::with_capacity(config.max_events),
            dt: config.fixed_dt,
            max_sounds: config.max_sounds,
            max_events: config.max_events,
        }
    }

    /// Emit a sound event to be forwarded to the host.
    /// Dropped once the per-frame capacity is reached.
    pub fn emit_sound(&mut self, sound: SoundEvent) {
        if self.sounds.len() < self.max_sounds {
            self.sounds.push(sound);
        } else {
            log::warn!("sound buffer full, dropping sound {}", sound.0);
        }
    }

    /// Emit a game event to be forwarded to the host.
    /// Dropped once the per-frame capacity is reached.
    pub fn emit_event(&mut self, event: GameEvent) {
        if self.events.len() < self.max_events {
            self.events.push(event);
        } else {
            log::warn!("event buffer full, dropping event kind {}", event.kind);
        }
    }

    /// Clear per-frame transient data (sounds, events). Called by the runner.
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

/// Render context handed to Game::render.
pub struct RenderContext<'a> {
    pub draw: &'a mut DrawList,
    pub assets: &'a SpriteRegistry,
}
