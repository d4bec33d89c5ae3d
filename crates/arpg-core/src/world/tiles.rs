use glam::Vec2;

/// Inclusive range of background tile indices covering the view.
///
/// Bounds run from `floor(cam / ts)` to `ceil((cam + view) / ts)`, so one
/// extra column and row may be emitted past the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileRange {
    /// None when `tile_size` is not a usable positive size.
    pub fn visible(camera: Vec2, viewport: Vec2, tile_size: f32) -> Option<Self> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return None;
        }
        let start = (camera / tile_size).floor();
        let end = ((camera + viewport) / tile_size).ceil();
        Some(Self {
            min_x: start.x as i32,
            min_y: start.y as i32,
            max_x: end.x as i32,
            max_y: end.y as i32,
        })
    }

    pub fn len(&self) -> usize {
        let w = (self.max_x - self.min_x + 1).max(0) as usize;
        let h = (self.max_y - self.min_y + 1).max(0) as usize;
        w * h
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tile indices row by row.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |ty| (self.min_x..=self.max_x).map(move |tx| (tx, ty)))
    }
}
