pub mod clock;
pub mod runner;
pub mod storage;

pub use clock::BrowserClock;
pub use runner::GameRunner;
pub use storage::LocalStorage;

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates:
/// - `thread_local!` storage for the GameRunner
/// - a `with_runner()` helper function
/// - every wasm-bindgen export (game_init, game_tick, input handlers,
///   asset notifications, data and capacity accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use arpg_core::*;
///
/// mod game;
/// use game::MyGame;
///
/// arpg_web::export_game!(MyGame, "my-game");
/// ```
///
/// # Arguments
///
/// - `$game_type`: a type implementing `arpg_core::Game` with a `new()` constructor
/// - `$game_name`: a string literal used in the initialization log message
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> R {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                let runner = borrow.as_mut().expect("Game not initialized. Call game_init() first.");
                f(runner)
            })
        }

        #[wasm_bindgen]
        pub fn game_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let game = <$game_type>::new();
            let runner = $crate::GameRunner::new(game);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $game_name);
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn game_pointer_down(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            with_runner(|r| r.push_input(InputEvent::Custom { kind, a, b, c }));
        }

        #[wasm_bindgen]
        pub fn game_text_event(kind: u32, text: &str) {
            with_runner(|r| r.push_input(InputEvent::Text { kind, text: text.to_string() }));
        }

        // ---- Asset loading ----

        #[wasm_bindgen]
        pub fn game_load_manifest(json: &str) {
            with_runner(|r| r.load_manifest(json));
        }

        #[wasm_bindgen]
        pub fn get_manifest_json() -> String {
            with_runner(|r| r.manifest_json())
        }

        #[wasm_bindgen]
        pub fn game_sprite_loaded(id: u32, width: f32, height: f32) {
            with_runner(|r| r.sprite_loaded(id, width, height));
        }

        #[wasm_bindgen]
        pub fn game_sprite_failed(id: u32) {
            with_runner(|r| r.sprite_failed(id));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_header_ptr() -> *const f32 {
            with_runner(|r| r.header_ptr())
        }

        #[wasm_bindgen]
        pub fn get_sprites_ptr() -> *const f32 {
            with_runner(|r| r.sprites_ptr())
        }

        #[wasm_bindgen]
        pub fn get_sprite_count() -> u32 {
            with_runner(|r| r.sprite_count())
        }

        #[wasm_bindgen]
        pub fn get_overlays_ptr() -> *const f32 {
            with_runner(|r| r.overlays_ptr())
        }

        #[wasm_bindgen]
        pub fn get_overlay_count() -> u32 {
            with_runner(|r| r.overlay_count())
        }

        #[wasm_bindgen]
        pub fn get_sound_events_ptr() -> *const u8 {
            with_runner(|r| r.sound_events_ptr())
        }

        #[wasm_bindgen]
        pub fn get_sound_events_len() -> u32 {
            with_runner(|r| r.sound_events_len())
        }

        #[wasm_bindgen]
        pub fn get_game_events_ptr() -> *const f32 {
            with_runner(|r| r.game_events_ptr())
        }

        #[wasm_bindgen]
        pub fn get_game_events_len() -> u32 {
            with_runner(|r| r.game_events_len())
        }

        #[wasm_bindgen]
        pub fn get_status_json() -> String {
            with_runner(|r| r.status_json())
        }

        #[wasm_bindgen]
        pub fn get_world_width() -> f32 {
            with_runner(|r| r.world_width())
        }

        #[wasm_bindgen]
        pub fn get_world_height() -> f32 {
            with_runner(|r| r.world_height())
        }

        #[wasm_bindgen]
        pub fn get_viewport_width() -> f32 {
            with_runner(|r| r.viewport_width())
        }

        #[wasm_bindgen]
        pub fn get_viewport_height() -> f32 {
            with_runner(|r| r.viewport_height())
        }

        // ---- Capacity accessors ----

        #[wasm_bindgen]
        pub fn get_max_sprites() -> u32 {
            with_runner(|r| r.max_sprites())
        }

        #[wasm_bindgen]
        pub fn get_max_overlays() -> u32 {
            with_runner(|r| r.max_overlays())
        }

        #[wasm_bindgen]
        pub fn get_max_sounds() -> u32 {
            with_runner(|r| r.max_sounds())
        }

        #[wasm_bindgen]
        pub fn get_max_events() -> u32 {
            with_runner(|r| r.max_events())
        }

        #[wasm_bindgen]
        pub fn get_buffer_total_floats() -> u32 {
            with_runner(|r| r.buffer_total_floats())
        }
    };
}
