pub mod instance;
pub mod layer;
pub mod overlay;
