pub mod api;
pub mod core;
pub mod input;
pub mod assets;
pub mod extensions;
pub mod character;
pub mod world;
pub mod render;
pub mod bridge;
pub mod config;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::types::{SoundEvent, GameEvent};
pub use core::clock::{Clock, ManualClock};
pub use core::storage::{KeyValueStore, MemoryStore};
pub use core::time::{FixedTimestep, IntervalTimer};
pub use core::rng::Rng;
pub use input::queue::{InputEvent, InputQueue};
pub use input::keys::{codes, Direction, MoveKeys};
pub use assets::manifest::{AssetManifest, SpriteDescriptor};
pub use assets::registry::{LoadState, SpriteId, SpriteRegistry};
pub use character::{Character, CharacterConfig, CharacterState, PartVisibility, UpdateReport};
pub use character::arm::{ArmChain, ArmRig, ArmSegment, ArmSide};
pub use character::pose::{draw_character, CharacterPose, CharacterSprites};
pub use character::progression::{
    Breakpoint, BreakpointTable, DisciplineBasis, Progression, ProgressionConfig, TableError,
};
pub use character::quest::{FastingQuest, QuestError, QUEST_START_KEY};
pub use character::stats::{StatKind, Stats, StatsConfig, UpgradeError};
pub use world::{World, WorldConfig, Prop};
pub use world::camera::FollowCamera;
pub use render::instance::{DrawList, OverlayShape, SpriteInstance};
pub use render::layer::RenderLayer;
pub use render::overlay::draw_attack_effects;
pub use bridge::protocol::ProtocolLayout;
pub use config::{ConfigError, PrototypeConfig};

// Extensions: decoupled helpers
pub use extensions::{Easing, lerp, ease};
