/// Render layer: draw order within a frame.
///
/// Layers are drawn back-to-front: Background first, Character last.
/// Overlay shapes are not sprites and have their own buffer, drawn after
/// every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum RenderLayer {
    Background = 0,
    Props = 1,
    #[default]
    Character = 2,
}

impl RenderLayer {
    pub const COUNT: usize = 3;

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Background),
            1 => Some(Self::Props),
            2 => Some(Self::Character),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
