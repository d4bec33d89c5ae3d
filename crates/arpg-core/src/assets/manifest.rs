use serde::{Deserialize, Serialize};

/// Asset manifest listing every image the prototype draws.
/// The host loads each `path`; the index in `sprites` is the `SpriteId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub sprites: Vec<SpriteDescriptor>,
}

/// Describes a single image asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// Lookup name used by game code (e.g., "torso").
    pub name: String,
    /// Relative URL of the PNG file.
    pub path: String,
}

impl SpriteDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The prototype's stock asset set: hero parts, sword, grass tile, tree.
    pub fn prototype() -> Self {
        Self {
            sprites: vec![
                SpriteDescriptor::new("torso", "assets/sprites/character/herosprite_torso.png"),
                SpriteDescriptor::new("legs", "assets/sprites/character/herosprite_legs.png"),
                SpriteDescriptor::new("arm", "assets/sprites/character/herosprite_arm.png"),
                SpriteDescriptor::new("fist", "assets/sprites/character/herosprite_fist.png"),
                SpriteDescriptor::new("weapon", "assets/sprites/items/itemsprite_sword001.png"),
                SpriteDescriptor::new("grass", "assets/sprites/tiling_grass001.png"),
                SpriteDescriptor::new("tree", "assets/sprites/prop_tree001.png"),
            ],
        }
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::prototype()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_manifest() {
        let json = r#"{
            "sprites": [
                { "name": "torso", "path": "torso.png" },
                { "name": "grass", "path": "grass.png" }
            ]
        }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        assert_eq!(manifest.sprites.len(), 2);
        assert_eq!(manifest.sprites[1].name, "grass");
        assert_eq!(manifest.sprites[1].path, "grass.png");
    }

    #[test]
    fn rejects_missing_path() {
        let json = r#"{ "sprites": [ { "name": "torso" } ] }"#;
        assert!(AssetManifest::from_json(json).is_err());
    }

    #[test]
    fn prototype_names_are_unique() {
        let manifest = AssetManifest::prototype();
        let mut names: Vec<&str> = manifest.sprites.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), manifest.sprites.len());
    }
}
