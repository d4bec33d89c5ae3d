use glam::Vec2;

/// DOM `keyCode` values the prototype reacts to.
pub mod codes {
    pub const SPACE: u32 = 32;
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_UP: u32 = 38;
    pub const ARROW_RIGHT: u32 = 39;
    pub const ARROW_DOWN: u32 = 40;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const S: u32 = 83;
    pub const W: u32 = 87;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// WASD and arrow keys both map to directions.
    pub fn from_key_code(key_code: u32) -> Option<Self> {
        match key_code {
            codes::W | codes::ARROW_UP => Some(Direction::Up),
            codes::S | codes::ARROW_DOWN => Some(Direction::Down),
            codes::A | codes::ARROW_LEFT => Some(Direction::Left),
            codes::D | codes::ARROW_RIGHT => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Currently held movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveKeys {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    /// Apply a raw key event. Returns false if the key is not a movement key.
    pub fn apply_key(&mut self, key_code: u32, held: bool) -> bool {
        match Direction::from_key_code(key_code) {
            Some(direction) => {
                self.set(direction, held);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Grid direction with components in {-1, 0, 1} (y-down).
    /// Opposing keys cancel out.
    pub fn axis(&self) -> Vec2 {
        let x = self.right as i8 - self.left as i8;
        let y = self.down as i8 - self.up as i8;
        Vec2::new(x as f32, y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_arrows_agree() {
        for (a, b) in [
            (codes::W, codes::ARROW_UP),
            (codes::A, codes::ARROW_LEFT),
            (codes::S, codes::ARROW_DOWN),
            (codes::D, codes::ARROW_RIGHT),
        ] {
            assert_eq!(Direction::from_key_code(a), Direction::from_key_code(b));
        }
        assert_eq!(Direction::from_key_code(codes::SPACE), None);
    }

    #[test]
    fn axis_combines_held_keys() {
        let mut keys = MoveKeys::default();
        assert_eq!(keys.axis(), Vec2::ZERO);
        keys.apply_key(codes::W, true);
        keys.apply_key(codes::D, true);
        assert_eq!(keys.axis(), Vec2::new(1.0, -1.0));
        keys.apply_key(codes::W, false);
        assert_eq!(keys.axis(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut keys = MoveKeys::default();
        keys.set(Direction::Left, true);
        keys.set(Direction::Right, true);
        assert_eq!(keys.axis().x, 0.0);
    }

    #[test]
    fn non_movement_key_is_ignored() {
        let mut keys = MoveKeys::default();
        assert!(!keys.apply_key(codes::SPACE, true));
        assert_eq!(keys, MoveKeys::default());
    }
}
