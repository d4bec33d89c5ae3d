//! The scrolling world: bounds, follow camera, tiled background and props.

pub mod camera;
pub mod tiles;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use crate::assets::registry::{SpriteId, SpriteRegistry};
use crate::core::rng::Rng;
use crate::render::instance::DrawList;
use crate::render::layer::RenderLayer;
use self::camera::FollowCamera;
use self::tiles::TileRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Camera low-pass factor per update.
    pub camera_smoothing: f32,
    /// Tile size used until the background image reports its own size.
    pub default_tile_size: f32,
    /// Smaller background images are stretched to this edge length.
    pub min_tile_size: f32,
    pub background_sprite: String,
    pub prop_sprite: String,
    pub prop_count: usize,
    pub prop_seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 1500.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            camera_smoothing: 0.1,
            default_tile_size: 64.0,
            min_tile_size: 16.0,
            background_sprite: "grass".to_string(),
            prop_sprite: "tree".to_string(),
            prop_count: 15,
            prop_seed: 0x5EED,
        }
    }
}

impl WorldConfig {
    fn min_tile(&self) -> f32 {
        if self.min_tile_size.is_finite() {
            self.min_tile_size.max(1.0)
        } else {
            1.0
        }
    }

    /// Worst-case background tile count: the view at the smallest tile
    /// size, offset so partial tiles show on every edge.
    pub fn max_visible_tiles(&self) -> usize {
        let ts = self.min_tile();
        let columns = (self.viewport_width.max(0.0) / ts).ceil() as usize + 2;
        let rows = (self.viewport_height.max(0.0) / ts).ceil() as usize + 2;
        columns * rows
    }

    /// Sprites the world can push in one frame.
    pub fn max_sprites(&self) -> usize {
        self.max_visible_tiles() + self.prop_count
    }
}

/// A static decoration placed in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prop {
    pub position: Vec2,
    pub sprite: SpriteId,
}

/// Place `count` props uniformly over the world.
pub fn scatter_props(rng: &mut Rng, size: Vec2, sprite: SpriteId, count: usize) -> Vec<Prop> {
    (0..count)
        .map(|_| Prop {
            position: Vec2::new(rng.range(0.0, size.x), rng.range(0.0, size.y)),
            sprite,
        })
        .collect()
}

pub struct World {
    size: Vec2,
    camera: FollowCamera,
    default_tile_size: f32,
    min_tile_size: f32,
    background: Option<SpriteId>,
    props: Vec<Prop>,
}

impl World {
    /// Build the world and scatter props. Sprite names are resolved against
    /// `registry`; a missing name disables that layer with a warning.
    pub fn new(config: &WorldConfig, registry: &SpriteRegistry) -> Self {
        let size = Vec2::new(config.width, config.height);
        let viewport = Vec2::new(config.viewport_width, config.viewport_height);

        let background = registry.id(&config.background_sprite);
        if background.is_none() {
            log::warn!("background sprite {:?} not in manifest", config.background_sprite);
        }
        let props = match registry.id(&config.prop_sprite) {
            Some(sprite) => {
                let mut rng = Rng::new(config.prop_seed);
                scatter_props(&mut rng, size, sprite, config.prop_count)
            }
            None => {
                log::warn!("prop sprite {:?} not in manifest", config.prop_sprite);
                Vec::new()
            }
        };
        log::debug!("world {}x{} with {} props", size.x, size.y, props.len());

        Self {
            size,
            camera: FollowCamera::new(viewport, size, config.camera_smoothing),
            default_tile_size: config.default_tile_size,
            min_tile_size: config.min_tile(),
            background,
            props,
        }
    }

    /// Ease the camera toward centering `target`.
    pub fn update_camera(&mut self, target: Vec2) {
        self.camera.follow(target);
    }

    pub fn camera(&self) -> &FollowCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FollowCamera {
        &mut self.camera
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.camera.world_to_screen(world)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera.screen_to_world(screen)
    }

    /// Inclusive containment in `[0, size]`.
    pub fn is_in_bounds(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.size.x && point.y >= 0.0 && point.y <= self.size.y
    }

    pub fn bounds(&self) -> Vec2 {
        self.size
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    /// Background tile edge: the larger side of the loaded image, or the
    /// configured default until then. Never below the minimum tile size.
    pub fn tile_size(&self, registry: &SpriteRegistry) -> f32 {
        self.background
            .and_then(|id| registry.size(id))
            .map(|s| s.x.max(s.y))
            .filter(|ts| *ts > 0.0)
            .unwrap_or(self.default_tile_size)
            .max(self.min_tile_size)
    }

    /// Tile the visible rectangle with the background image, leaving at
    /// least `reserve` sprite slots free for the layers drawn after it.
    pub fn draw_background(&self, list: &mut DrawList, registry: &SpriteRegistry, reserve: usize) {
        let Some(id) = self.background.filter(|id| registry.is_ready(*id)) else {
            return;
        };
        let ts = self.tile_size(registry);
        let Some(range) = TileRange::visible(self.camera.position, self.camera.viewport, ts) else {
            return;
        };
        let budget = list.remaining_sprites().saturating_sub(reserve);
        if range.len() > budget {
            log::debug!("background clipped to {} of {} tiles", budget, range.len());
        }
        let half = Vec2::splat(ts * 0.5);
        for (tx, ty) in range.iter().take(budget) {
            let top_left = Vec2::new(tx as f32, ty as f32) * ts;
            let center = self.world_to_screen(top_left) + half;
            list.draw_sized(id, center, Vec2::splat(ts), 0.0, RenderLayer::Background);
        }
    }

    /// Draw every prop whose bounding box overlaps the view.
    pub fn draw_props(&self, list: &mut DrawList, registry: &SpriteRegistry) {
        for prop in &self.props {
            let Some(size) = registry.size(prop.sprite) else {
                continue;
            };
            if !self.camera.is_rect_visible(prop.position, size) {
                continue;
            }
            let center = self.world_to_screen(prop.position);
            list.draw_sized(prop.sprite, center, size, 0.0, RenderLayer::Props);
        }
    }
}
