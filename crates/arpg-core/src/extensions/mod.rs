// extensions/mod.rs
//
// Pure math helpers shared by the character rig and the overlay effects.

pub mod easing;

pub use easing::{Easing, lerp, ease};
