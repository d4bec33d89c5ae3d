// render/overlay.rs
//
// Screen-space attack effects drawn after the world pass.

use std::f32::consts::{FRAC_PI_2, PI};
use glam::Vec2;
use crate::render::instance::{DrawList, OverlayShape};

/// Full slash length; endpoints sit at 70% of it from the character.
pub const SLASH_LENGTH: f32 = 80.0;
pub const SLASH_MAX_WIDTH: f32 = 6.0;
pub const RING_BASE_RADIUS: f32 = 30.0;
pub const RING_GROWTH: f32 = 40.0;
pub const RING_WIDTH: f32 = 3.0;

/// Slash trail for attack `progress` in [0, 1], centered on `center`.
///
/// The slash sweeps from -90° to +90° and is thickest mid-swing.
pub fn slash_trail(center: Vec2, progress: f32) -> OverlayShape {
    let p = progress.clamp(0.0, 1.0);
    let angle = (p - 0.5) * PI;
    let reach = SLASH_LENGTH * 0.7;
    let start = center + Vec2::from_angle(angle - FRAC_PI_2) * reach;
    let end = center + Vec2::from_angle(angle + FRAC_PI_2) * reach;
    let width = SLASH_MAX_WIDTH * (1.0 - (p - 0.5).abs() * 2.0);
    OverlayShape::line(start, end, width, 1.0)
}

/// Impact ring that grows and fades over the attack.
pub fn impact_ring(center: Vec2, progress: f32) -> OverlayShape {
    let p = progress.clamp(0.0, 1.0);
    OverlayShape::ring(
        center,
        RING_BASE_RADIUS + p * RING_GROWTH,
        RING_WIDTH,
        0.8 - p * 0.6,
    )
}

/// Push both attack effects for a character at screen position `center`.
pub fn draw_attack_effects(list: &mut DrawList, center: Vec2, progress: f32) {
    list.push_overlay(slash_trail(center, progress));
    list.push_overlay(impact_ring(center, progress));
}
