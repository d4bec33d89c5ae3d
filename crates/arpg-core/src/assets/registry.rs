use std::collections::HashMap;
use glam::Vec2;
use crate::assets::manifest::AssetManifest;

/// Index of a sprite in the asset manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u32);

/// Loading state of a single image on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LoadState {
    /// Requested but not yet decoded.
    #[default]
    Pending,
    /// Decoded; natural pixel size is known.
    Ready { width: f32, height: f32 },
    /// The host reported a load error. Draws using it are skipped.
    Failed,
}

#[derive(Debug, Clone)]
pub struct SpriteSlot {
    pub name: String,
    pub path: String,
    pub state: LoadState,
}

/// Registry of named sprites, built from an AssetManifest.
/// Tracks per-sprite readiness as the host reports load results.
pub struct SpriteRegistry {
    slots: Vec<SpriteSlot>,
    by_name: HashMap<String, SpriteId>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// One slot per manifest entry, so ids match the host's manifest indices.
    /// A repeated name keeps its slot but only the first entry is reachable by name.
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let mut registry = Self::new();
        for desc in &manifest.sprites {
            let id = SpriteId(registry.slots.len() as u32);
            registry.slots.push(SpriteSlot {
                name: desc.name.clone(),
                path: desc.path.clone(),
                state: LoadState::Pending,
            });
            if registry.by_name.contains_key(&desc.name) {
                log::warn!("duplicate sprite name in manifest: {}", desc.name);
            } else {
                registry.by_name.insert(desc.name.clone(), id);
            }
        }
        registry
    }

    /// Look up a sprite id by name.
    pub fn id(&self, name: &str) -> Option<SpriteId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: SpriteId) -> Option<&SpriteSlot> {
        self.slots.get(id.0 as usize)
    }

    /// Record a successful load. Returns false for unknown ids.
    pub fn mark_loaded(&mut self, id: SpriteId, width: f32, height: f32) -> bool {
        let Some(slot) = self.slots.get_mut(id.0 as usize) else {
            log::warn!("load notification for unknown sprite {}", id.0);
            return false;
        };
        slot.state = LoadState::Ready { width, height };
        log::debug!("sprite loaded: {} ({}x{})", slot.name, width, height);
        if self.all_settled() {
            log::info!("all sprites settled ({} failed)", self.failed_count());
        }
        true
    }

    /// Record a failed load. Returns false for unknown ids.
    pub fn mark_failed(&mut self, id: SpriteId) -> bool {
        let Some(slot) = self.slots.get_mut(id.0 as usize) else {
            log::warn!("failure notification for unknown sprite {}", id.0);
            return false;
        };
        slot.state = LoadState::Failed;
        log::error!("failed to load sprite: {}", slot.path);
        true
    }

    /// Natural size of a sprite, if it is ready to draw.
    pub fn size(&self, id: SpriteId) -> Option<Vec2> {
        match self.get(id)?.state {
            LoadState::Ready { width, height } => Some(Vec2::new(width, height)),
            _ => None,
        }
    }

    pub fn is_ready(&self, id: SpriteId) -> bool {
        self.size(id).is_some()
    }

    /// True once every sprite is either ready or failed.
    pub fn all_settled(&self) -> bool {
        self.slots.iter().all(|s| s.state != LoadState::Pending)
    }

    pub fn failed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.state == LoadState::Failed).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SpriteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::manifest::SpriteDescriptor;

    fn registry() -> SpriteRegistry {
        SpriteRegistry::from_manifest(&AssetManifest::prototype())
    }

    #[test]
    fn ids_follow_manifest_order() {
        let reg = registry();
        assert_eq!(reg.id("torso"), Some(SpriteId(0)));
        assert_eq!(reg.id("tree"), Some(SpriteId(6)));
        assert!(reg.id("nonexistent").is_none());
    }

    #[test]
    fn duplicate_names_keep_ids_aligned_with_manifest() {
        let manifest = AssetManifest {
            sprites: vec![
                SpriteDescriptor::new("torso", "torso.png"),
                SpriteDescriptor::new("torso", "dup.png"),
                SpriteDescriptor::new("tree", "tree.png"),
            ],
        };
        let mut reg = SpriteRegistry::from_manifest(&manifest);
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.id("torso"), Some(SpriteId(0)));
        assert_eq!(reg.id("tree"), Some(SpriteId(2)));

        assert!(reg.mark_loaded(SpriteId(1), 10.0, 10.0));
        assert!(!reg.is_ready(SpriteId(2)));
        assert!(reg.mark_loaded(SpriteId(2), 64.0, 96.0));
        assert_eq!(reg.size(reg.id("tree").unwrap()), Some(Vec2::new(64.0, 96.0)));
    }

    #[test]
    fn pending_sprites_are_not_drawable() {
        let reg = registry();
        let torso = reg.id("torso").unwrap();
        assert!(!reg.is_ready(torso));
        assert!(reg.size(torso).is_none());
    }

    #[test]
    fn loaded_sprite_reports_size() {
        let mut reg = registry();
        let legs = reg.id("legs").unwrap();
        assert!(reg.mark_loaded(legs, 48.0, 32.0));
        assert_eq!(reg.size(legs), Some(Vec2::new(48.0, 32.0)));
    }

    #[test]
    fn failed_sprite_stays_undrawable() {
        let mut reg = registry();
        let sword = reg.id("weapon").unwrap();
        reg.mark_failed(sword);
        assert!(!reg.is_ready(sword));
        assert_eq!(reg.failed_count(), 1);
    }

    #[test]
    fn settles_once_every_sprite_reports() {
        let mut reg = registry();
        for i in 0..reg.len() as u32 {
            assert!(!reg.all_settled());
            if i % 2 == 0 {
                reg.mark_loaded(SpriteId(i), 32.0, 32.0);
            } else {
                reg.mark_failed(SpriteId(i));
            }
        }
        assert!(reg.all_settled());
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut reg = registry();
        assert!(!reg.mark_loaded(SpriteId(99), 1.0, 1.0));
        assert!(!reg.mark_failed(SpriteId(99)));
    }
}
