use bytemuck::{Pod, Zeroable};

/// A sound event emitted by the game logic.
/// The numeric value maps to a game-defined sound on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

/// A game event handed to the host after each tick.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: u32, a: f32, b: f32, c: f32) -> Self {
        Self {
            kind: kind as f32,
            a,
            b,
            c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_is_four_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
        let e = GameEvent::new(3, 1.0, 2.0, 3.0);
        let raw: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&e));
        assert_eq!(raw, &[3.0, 1.0, 2.0, 3.0]);
    }
}
