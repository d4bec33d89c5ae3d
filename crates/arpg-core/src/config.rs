//! Game tuning loaded from JSON. Every section and field has a default,
//! so a partial document only overrides what it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::character::progression::{ProgressionConfig, TableError};
use crate::character::CharacterConfig;
use crate::world::WorldConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid breakpoint table: {0}")]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrototypeConfig {
    pub world: WorldConfig,
    pub character: CharacterConfig,
    pub progression: ProgressionConfig,
}

impl PrototypeConfig {
    /// Parse and validate a config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.progression.table()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sprite capacity for a full frame at the smallest tile size, with
    /// every prop and the character on screen.
    pub fn max_sprites(&self) -> usize {
        self.world.max_sprites() + self.character.max_sprites()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::progression::DisciplineBasis;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(PrototypeConfig::from_json("{}").unwrap(), PrototypeConfig::default());
    }

    #[test]
    fn partial_sections_override_only_named_fields() {
        let config = PrototypeConfig::from_json(
            r#"{
                "world": { "prop_count": 3 },
                "character": { "attack_duration": 0.3 },
                "progression": { "basis": "fasting" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.world.prop_count, 3);
        assert_eq!(config.world.width, 2000.0);
        assert_eq!(config.character.attack_duration, 0.3);
        assert_eq!(config.character.speed, 180.0);
        assert_eq!(config.progression.basis, DisciplineBasis::Fasting);
    }

    #[test]
    fn rejects_bad_json_and_bad_tables() {
        assert!(matches!(PrototypeConfig::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(
            PrototypeConfig::from_json(r#"{ "progression": { "breakpoints": [] } }"#),
            Err(ConfigError::Table(TableError::Empty))
        ));
    }

    #[test]
    fn sprite_capacity_grows_with_smaller_tiles() {
        let config = PrototypeConfig::default();
        assert_eq!(config.character.max_sprites(), 11);
        assert_eq!(config.max_sprites(), 52 * 40 + 15 + 11);

        let dense = PrototypeConfig::from_json(r#"{ "world": { "min_tile_size": 8.0 } }"#).unwrap();
        assert!(dense.max_sprites() > config.max_sprites());
    }

    #[test]
    fn round_trips_through_json() {
        let config = PrototypeConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(PrototypeConfig::from_json(&json).unwrap(), config);
    }
}
