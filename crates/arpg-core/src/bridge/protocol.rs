/// Shared-buffer layout.
/// Must stay in sync with the host's `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Sprites: max_sprites × 8 floats]
/// [Overlays: max_overlays × 8 floats]
/// [Sounds: max_sounds × 1 float]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written into the header every frame alongside the counts,
/// so the host can compute offsets without a separate handshake.

use crate::api::game::GameConfig;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_SPRITES: usize = 2;
pub const HEADER_SPRITE_COUNT: usize = 3;
pub const HEADER_MAX_OVERLAYS: usize = 4;
pub const HEADER_OVERLAY_COUNT: usize = 5;
pub const HEADER_MAX_SOUNDS: usize = 6;
pub const HEADER_SOUND_COUNT: usize = 7;
pub const HEADER_MAX_EVENTS: usize = 8;
pub const HEADER_EVENT_COUNT: usize = 9;
pub const HEADER_WORLD_WIDTH: usize = 10;
pub const HEADER_WORLD_HEIGHT: usize = 11;
pub const HEADER_VIEWPORT_WIDTH: usize = 12;
pub const HEADER_VIEWPORT_HEIGHT: usize = 13;
/// Draws rejected this frame because a list was full.
pub const HEADER_DROPPED_DRAWS: usize = 14;
/// Whether every sprite has finished loading (1.0) or not (0.0).
pub const HEADER_ASSETS_SETTLED: usize = 15;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per sprite instance (wire format).
pub const SPRITE_FLOATS: usize = 8;

/// Floats per overlay shape (wire format).
pub const OVERLAY_FLOATS: usize = 8;

/// Floats per game event: kind, a, b, c (wire format).
pub const EVENT_FLOATS: usize = 4;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_sprites: usize,
    pub max_overlays: usize,
    pub max_sounds: usize,
    pub max_events: usize,

    pub sprite_data_floats: usize,
    pub overlay_data_floats: usize,
    pub sound_data_floats: usize,
    pub event_data_floats: usize,

    /// Offset (in floats) where sprite data begins.
    pub sprite_data_offset: usize,
    /// Offset (in floats) where overlay data begins.
    pub overlay_data_offset: usize,
    /// Offset (in floats) where sound data begins.
    pub sound_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

/// Per-frame values that go into the header next to the capacities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameCounts {
    pub frame: u32,
    pub sprites: u32,
    pub overlays: u32,
    pub sounds: u32,
    pub events: u32,
    pub dropped: u32,
    pub assets_settled: bool,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_sprites: usize, max_overlays: usize, max_sounds: usize, max_events: usize) -> Self {
        let sprite_data_floats = max_sprites * SPRITE_FLOATS;
        let overlay_data_floats = max_overlays * OVERLAY_FLOATS;
        let sound_data_floats = max_sounds;
        let event_data_floats = max_events * EVENT_FLOATS;

        let sprite_data_offset = HEADER_FLOATS;
        let overlay_data_offset = sprite_data_offset + sprite_data_floats;
        let sound_data_offset = overlay_data_offset + overlay_data_floats;
        let event_data_offset = sound_data_offset + sound_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_sprites,
            max_overlays,
            max_sounds,
            max_events,
            sprite_data_floats,
            overlay_data_floats,
            sound_data_floats,
            event_data_floats,
            sprite_data_offset,
            overlay_data_offset,
            sound_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Compute layout from a GameConfig.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.max_sprites,
            config.max_overlays,
            config.max_sounds,
            config.max_events,
        )
    }

    /// Fill a header block for this frame.
    pub fn write_header(&self, header: &mut [f32; HEADER_FLOATS], config: &GameConfig, counts: &FrameCounts) {
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_FRAME_COUNTER] = counts.frame as f32;
        header[HEADER_MAX_SPRITES] = self.max_sprites as f32;
        header[HEADER_SPRITE_COUNT] = counts.sprites as f32;
        header[HEADER_MAX_OVERLAYS] = self.max_overlays as f32;
        header[HEADER_OVERLAY_COUNT] = counts.overlays as f32;
        header[HEADER_MAX_SOUNDS] = self.max_sounds as f32;
        header[HEADER_SOUND_COUNT] = counts.sounds as f32;
        header[HEADER_MAX_EVENTS] = self.max_events as f32;
        header[HEADER_EVENT_COUNT] = counts.events as f32;
        header[HEADER_WORLD_WIDTH] = config.world_width;
        header[HEADER_WORLD_HEIGHT] = config.world_height;
        header[HEADER_VIEWPORT_WIDTH] = config.viewport_width;
        header[HEADER_VIEWPORT_HEIGHT] = config.viewport_height;
        header[HEADER_DROPPED_DRAWS] = counts.dropped as f32;
        header[HEADER_ASSETS_SETTLED] = if counts.assets_settled { 1.0 } else { 0.0 };
    }
}
