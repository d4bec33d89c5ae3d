use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use crate::assets::registry::{SpriteId, SpriteRegistry};
use crate::render::layer::RenderLayer;

/// One sprite draw, read by the host straight out of WASM memory.
/// Must match the host protocol: 8 floats = 32 bytes stride.
///
/// Position is the screen-space center; the host translates, rotates and
/// draws the image centered at that point.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub x: f32,
    pub y: f32,
    /// Rotation in radians (clockwise on a y-down canvas).
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    /// `SpriteId` as float.
    pub sprite: f32,
    pub alpha: f32,
    /// `RenderLayer` as float.
    pub layer: f32,
}

impl SpriteInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Kinds of screen-space overlay shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OverlayKind {
    /// Attack slash line; the host strokes it with the slash gradient.
    SlashTrail = 0,
    /// Expanding impact circle.
    ImpactRing = 1,
}

/// One overlay stroke. 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct OverlayShape {
    pub kind: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub radius: f32,
    pub line_width: f32,
    pub alpha: f32,
}

impl OverlayShape {
    pub const FLOATS: usize = 8;

    pub fn line(from: Vec2, to: Vec2, line_width: f32, alpha: f32) -> Self {
        Self {
            kind: OverlayKind::SlashTrail as u8 as f32,
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            radius: 0.0,
            line_width,
            alpha,
        }
    }

    pub fn ring(center: Vec2, radius: f32, line_width: f32, alpha: f32) -> Self {
        Self {
            kind: OverlayKind::ImpactRing as u8 as f32,
            x1: center.x,
            y1: center.y,
            x2: center.x,
            y2: center.y,
            radius,
            line_width,
            alpha,
        }
    }
}

/// Per-frame draw lists: sprites in draw order, then overlay shapes.
pub struct DrawList {
    pub sprites: Vec<SpriteInstance>,
    pub overlays: Vec<OverlayShape>,
    max_sprites: usize,
    max_overlays: usize,
    /// Draws rejected this frame because a list was full.
    dropped: u32,
}

impl DrawList {
    pub fn with_capacity(max_sprites: usize, max_overlays: usize) -> Self {
        Self {
            sprites: Vec::with_capacity(max_sprites),
            overlays: Vec::with_capacity(max_overlays),
            max_sprites,
            max_overlays,
            dropped: 0,
        }
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.overlays.clear();
        self.dropped = 0;
    }

    /// Sprite slots still free this frame.
    pub fn remaining_sprites(&self) -> usize {
        self.max_sprites.saturating_sub(self.sprites.len())
    }

    pub fn push_sprite(&mut self, instance: SpriteInstance) -> bool {
        if self.sprites.len() >= self.max_sprites {
            self.dropped += 1;
            return false;
        }
        self.sprites.push(instance);
        true
    }

    pub fn push_overlay(&mut self, shape: OverlayShape) -> bool {
        if self.overlays.len() >= self.max_overlays {
            self.dropped += 1;
            return false;
        }
        self.overlays.push(shape);
        true
    }

    /// Draw a sprite at its natural size, centered on `center`.
    /// Skipped (returns false) while the image is not loaded.
    pub fn draw_sprite(
        &mut self,
        registry: &SpriteRegistry,
        id: SpriteId,
        center: Vec2,
        rotation: f32,
        layer: RenderLayer,
    ) -> bool {
        let Some(size) = registry.size(id) else {
            return false;
        };
        self.draw_sized(id, center, size, rotation, layer)
    }

    /// Draw a sprite stretched to `size`. The caller has already checked readiness.
    pub fn draw_sized(
        &mut self,
        id: SpriteId,
        center: Vec2,
        size: Vec2,
        rotation: f32,
        layer: RenderLayer,
    ) -> bool {
        self.push_sprite(SpriteInstance {
            x: center.x,
            y: center.y,
            rotation,
            width: size.x,
            height: size.y,
            sprite: id.0 as f32,
            alpha: 1.0,
            layer: layer.as_u8() as f32,
        })
    }

    pub fn sprite_count(&self) -> u32 {
        self.sprites.len() as u32
    }

    pub fn overlay_count(&self) -> u32 {
        self.overlays.len() as u32
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Raw pointer to sprite data for host reads.
    pub fn sprites_ptr(&self) -> *const f32 {
        self.sprites.as_ptr() as *const f32
    }

    /// Raw pointer to overlay data for host reads.
    pub fn overlays_ptr(&self) -> *const f32 {
        self.overlays.as_ptr() as *const f32
    }
}
