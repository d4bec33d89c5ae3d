use arpg_core::{
    Game, GameConfig, EngineContext, RenderContext,
    InputEvent, InputQueue, DrawList,
    FixedTimestep, ProtocolLayout, AssetManifest, SpriteId, SpriteRegistry,
};
use arpg_core::bridge::protocol::{FrameCounts, HEADER_FLOATS};

/// Generic game runner that wires up the frame loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    /// Handed to every fixed step after the first in a frame.
    no_input: InputQueue,
    draw: DrawList,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    manifest: AssetManifest,
    header: [f32; HEADER_FLOATS],
    frame: u32,
    initialized: bool,
    /// Flat buffer of sound event IDs for host reads.
    sound_buffer: Vec<u8>,
    status: String,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let manifest = game.manifest();
        let timestep = FixedTimestep::new(config.fixed_dt).with_max_steps(config.max_steps);
        let layout = ProtocolLayout::from_config(&config);

        let mut ctx = EngineContext::new(&config);
        ctx.assets = SpriteRegistry::from_manifest(&manifest);

        Self {
            game,
            ctx,
            input: InputQueue::new(),
            no_input: InputQueue::new(),
            draw: DrawList::with_capacity(config.max_sprites, config.max_overlays),
            timestep,
            layout,
            config,
            manifest,
            header: [0.0; HEADER_FLOATS],
            frame: 0,
            initialized: false,
            sound_buffer: Vec::new(),
            status: String::new(),
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Replace the asset manifest. Every sprite goes back to pending.
    pub fn load_manifest(&mut self, json: &str) {
        match AssetManifest::from_json(json) {
            Ok(manifest) => {
                self.ctx.assets = SpriteRegistry::from_manifest(&manifest);
                self.manifest = manifest;
                self.game.assets_changed(&self.ctx);
                log::info!("manifest loaded: {} sprites", self.ctx.assets.len());
            }
            Err(err) => log::error!("invalid asset manifest: {}", err),
        }
    }

    /// Manifest JSON the host uses to start image loads. Sprite ids are
    /// indices into its `sprites` array.
    pub fn manifest_json(&self) -> String {
        self.manifest.to_json().unwrap_or_else(|err| {
            log::error!("failed to serialize manifest: {}", err);
            String::new()
        })
    }

    pub fn sprite_loaded(&mut self, id: u32, width: f32, height: f32) {
        if self.ctx.assets.mark_loaded(SpriteId(id), width, height) {
            self.game.assets_changed(&self.ctx);
        }
    }

    pub fn sprite_failed(&mut self, id: u32) {
        if self.ctx.assets.mark_failed(SpriteId(id)) {
            self.game.assets_changed(&self.ctx);
        }
    }

    /// Run one frame tick: fixed updates, then the render pass.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        // Clear per-frame transient data
        self.ctx.clear_frame_data();

        // Input is seen by exactly one step; it waits for the next frame
        // if this one produced no steps.
        let steps = self.timestep.accumulate(dt);
        for step in 0..steps {
            let input = if step == 0 { &self.input } else { &self.no_input };
            self.game.update(&mut self.ctx, input);
        }
        if steps > 0 {
            self.input.drain();
        }

        self.draw.clear();
        {
            let mut render_ctx = RenderContext {
                draw: &mut self.draw,
                assets: &self.ctx.assets,
            };
            self.game.render(&mut render_ctx);
        }

        // Pack sound events into flat buffer
        self.sound_buffer.clear();
        for sound in &self.ctx.sounds {
            self.sound_buffer.push(sound.0 as u8);
        }

        self.frame = self.frame.wrapping_add(1);
        let counts = FrameCounts {
            frame: self.frame,
            sprites: self.draw.sprite_count(),
            overlays: self.draw.overlay_count(),
            sounds: self.sound_buffer.len() as u32,
            events: self.ctx.events.len() as u32,
            dropped: self.draw.dropped(),
            assets_settled: self.ctx.assets.all_settled(),
        };
        self.layout.write_header(&mut self.header, &self.config, &counts);

        if let Some(status) = self.game.status_json() {
            self.status = status;
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw
    }

    // ---- Pointer accessors for host reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn sprites_ptr(&self) -> *const f32 {
        self.draw.sprites_ptr()
    }

    pub fn sprite_count(&self) -> u32 {
        self.draw.sprite_count()
    }

    pub fn overlays_ptr(&self) -> *const f32 {
        self.draw.overlays_ptr()
    }

    pub fn overlay_count(&self) -> u32 {
        self.draw.overlay_count()
    }

    pub fn sound_events_ptr(&self) -> *const u8 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn status_json(&self) -> String {
        self.status.clone()
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    pub fn viewport_width(&self) -> f32 {
        self.config.viewport_width
    }

    pub fn viewport_height(&self) -> f32 {
        self.config.viewport_height
    }

    // ---- Capacity accessors (read by the host via wasm_bindgen exports) ----

    pub fn max_sprites(&self) -> u32 {
        self.layout.max_sprites as u32
    }

    pub fn max_overlays(&self) -> u32 {
        self.layout.max_overlays as u32
    }

    pub fn max_sounds(&self) -> u32 {
        self.layout.max_sounds as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpg_core::{GameEvent, SoundEvent};
    use arpg_core::bridge::protocol::{HEADER_FRAME_COUNTER, HEADER_SPRITE_COUNT};

    /// Counts updates and the input events each one saw.
    #[derive(Default)]
    struct RecordingGame {
        updates: u32,
        seen: Vec<usize>,
        asset_changes: u32,
    }

    impl Game for RecordingGame {
        fn init(&mut self, _ctx: &mut EngineContext) {}

        fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
            self.updates += 1;
            self.seen.push(input.len());
            ctx.emit_sound(SoundEvent(1));
            ctx.emit_event(GameEvent::new(9, 0.0, 0.0, 0.0));
        }

        fn render(&self, ctx: &mut RenderContext) {
            if let Some(id) = ctx.assets.id("torso") {
                ctx.draw.draw_sprite(ctx.assets, id, glam::Vec2::ZERO, 0.0, Default::default());
            }
        }

        fn assets_changed(&mut self, _ctx: &EngineContext) {
            self.asset_changes += 1;
        }

        fn status_json(&self) -> Option<String> {
            Some(format!("{{\"updates\":{}}}", self.updates))
        }
    }

    fn runner() -> GameRunner<RecordingGame> {
        let mut r = GameRunner::new(RecordingGame::default());
        r.init();
        r
    }

    #[test]
    fn input_reaches_only_the_first_step() {
        let mut r = runner();
        r.push_input(InputEvent::KeyDown { key_code: 32 });
        r.tick(3.0 / 60.0 + 0.001);
        assert_eq!(r.game().seen, vec![1, 0, 0]);
    }

    #[test]
    fn input_waits_for_a_frame_with_steps() {
        let mut r = runner();
        r.push_input(InputEvent::KeyDown { key_code: 32 });
        r.tick(0.001);
        assert_eq!(r.game().updates, 0);
        r.tick(1.0 / 60.0);
        assert_eq!(r.game().seen, vec![1]);
        r.tick(1.0 / 60.0);
        assert_eq!(r.game().seen, vec![1, 0]);
    }

    #[test]
    fn tick_before_init_does_nothing() {
        let mut r = GameRunner::new(RecordingGame::default());
        r.tick(1.0);
        assert_eq!(r.game().updates, 0);
        assert_eq!(r.sprite_count(), 0);
    }

    #[test]
    fn frame_data_resets_each_tick() {
        let mut r = runner();
        r.tick(2.0 / 60.0 + 0.001);
        assert_eq!(r.sound_events_len(), 2);
        assert_eq!(r.game_events_len(), 2);
        r.tick(0.0);
        assert_eq!(r.sound_events_len(), 0);
        assert_eq!(r.game_events_len(), 0);
    }

    #[test]
    fn sprite_notifications_update_registry_and_draws() {
        let mut r = runner();
        r.tick(1.0 / 60.0);
        assert_eq!(r.sprite_count(), 0);

        r.sprite_loaded(0, 32.0, 32.0);
        r.sprite_failed(1);
        r.sprite_loaded(999, 1.0, 1.0);
        assert_eq!(r.game().asset_changes, 2);

        r.tick(1.0 / 60.0);
        assert_eq!(r.sprite_count(), 1);
        let header = unsafe { std::slice::from_raw_parts(r.header_ptr(), HEADER_FLOATS) };
        assert_eq!(header[HEADER_SPRITE_COUNT], 1.0);
        assert_eq!(header[HEADER_FRAME_COUNTER], 2.0);
    }

    #[test]
    fn bad_manifest_keeps_registry() {
        let mut r = runner();
        let before = r.context().assets.len();
        r.load_manifest("not json");
        assert_eq!(r.context().assets.len(), before);

        r.load_manifest(r#"{ "sprites": [{ "name": "torso", "path": "t.png" }] }"#);
        assert_eq!(r.context().assets.len(), 1);
        assert!(r.manifest_json().contains("t.png"));
    }

    #[test]
    fn status_json_is_refreshed_per_tick() {
        let mut r = runner();
        assert_eq!(r.status_json(), "");
        r.tick(1.0 / 60.0);
        assert_eq!(r.status_json(), "{\"updates\":1}");
    }
}
