use glam::Vec2;

/// Screen-sized window onto the world, positioned by its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowCamera {
    /// Top-left corner in world space.
    pub position: Vec2,
    /// Visible size in world units.
    pub viewport: Vec2,
    /// Fraction of the remaining distance covered per update (0 = frozen, 1 = snap).
    pub smoothing: f32,
    world: Vec2,
}

impl FollowCamera {
    pub fn new(viewport: Vec2, world: Vec2, smoothing: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport,
            smoothing: smoothing.clamp(0.0, 1.0),
            world,
        }
    }

    /// Top-left position that would center `target` on screen, before clamping.
    pub fn target_for(&self, target: Vec2) -> Vec2 {
        target - self.viewport * 0.5
    }

    /// Move a fixed fraction of the way toward centering `target`, then clamp.
    pub fn follow(&mut self, target: Vec2) {
        let goal = self.target_for(target);
        self.position += (goal - self.position) * self.smoothing;
        self.clamp_to_world();
    }

    /// Jump straight to the clamped position centering `target`.
    pub fn look_at(&mut self, target: Vec2) {
        self.position = self.target_for(target);
        self.clamp_to_world();
    }

    /// Keep the view inside `[0, world - viewport]`; pinned to 0 on any axis
    /// where the viewport is larger than the world.
    fn clamp_to_world(&mut self) {
        let max = (self.world - self.viewport).max(Vec2::ZERO);
        self.position = self.position.max(Vec2::ZERO).min(max);
    }

    pub fn world_size(&self) -> Vec2 {
        self.world
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.clamp_to_world();
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.position
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.position
    }

    /// True if a world-space rectangle centered on `center` overlaps the view.
    pub fn is_rect_visible(&self, center: Vec2, size: Vec2) -> bool {
        let screen = self.world_to_screen(center);
        let half = size * 0.5;
        screen.x + half.x > 0.0
            && screen.x - half.x < self.viewport.x
            && screen.y + half.y > 0.0
            && screen.y - half.y < self.viewport.y
    }
}
