use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stats that can be bought with discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    MaxLife,
    Damage,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpgradeError {
    #[error("not enough discipline for upgrade: costs {cost}, have {available:.1}")]
    Insufficient { cost: u64, available: f64 },
}

/// Pricing and effect of one upgradeable stat.
///
/// The n-th purchase (zero-based) costs `floor(base_cost * multiplier^n)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTrack {
    pub base_cost: f64,
    pub multiplier: f64,
    /// Amount added to the stat per purchase.
    pub increment: u32,
}

impl UpgradeTrack {
    pub fn cost(&self, purchases: u32) -> u64 {
        let raw = self.base_cost * self.multiplier.powi(purchases as i32);
        if raw.is_finite() && raw >= 0.0 {
            raw.floor() as u64
        } else {
            u64::MAX
        }
    }
}

/// Starting values and upgrade tracks for the stat block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub max_life: u32,
    pub damage: u32,
    pub life_upgrade: UpgradeTrack,
    pub damage_upgrade: UpgradeTrack,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_life: 100,
            damage: 10,
            life_upgrade: UpgradeTrack {
                base_cost: 10.0,
                multiplier: 1.5,
                increment: 20,
            },
            damage_upgrade: UpgradeTrack {
                base_cost: 15.0,
                multiplier: 1.5,
                increment: 5,
            },
        }
    }
}

/// The character's combat stat block plus purchase counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub max_life: u32,
    pub current_life: u32,
    pub damage: u32,
    life_purchases: u32,
    damage_purchases: u32,
    life_track: UpgradeTrack,
    damage_track: UpgradeTrack,
}

impl Stats {
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            max_life: config.max_life,
            current_life: config.max_life,
            damage: config.damage,
            life_purchases: 0,
            damage_purchases: 0,
            life_track: config.life_upgrade,
            damage_track: config.damage_upgrade,
        }
    }

    /// Price of the next purchase of `kind`.
    pub fn cost(&self, kind: StatKind) -> u64 {
        match kind {
            StatKind::MaxLife => self.life_track.cost(self.life_purchases),
            StatKind::Damage => self.damage_track.cost(self.damage_purchases),
        }
    }

    pub fn purchases(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::MaxLife => self.life_purchases,
            StatKind::Damage => self.damage_purchases,
        }
    }

    /// Apply one purchase. Payment is the caller's job; this cannot fail.
    /// Raising max life heals by the same amount.
    pub(crate) fn apply(&mut self, kind: StatKind) {
        match kind {
            StatKind::MaxLife => {
                let inc = self.life_track.increment;
                self.max_life = self.max_life.saturating_add(inc);
                self.current_life = self.current_life.saturating_add(inc).min(self.max_life);
                self.life_purchases += 1;
            }
            StatKind::Damage => {
                self.damage = self.damage.saturating_add(self.damage_track.increment);
                self.damage_purchases += 1;
            }
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(&StatsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn life_costs_follow_floored_geometric_series() {
        let mut stats = Stats::default();
        let mut costs = Vec::new();
        for _ in 0..5 {
            costs.push(stats.cost(StatKind::MaxLife));
            stats.apply(StatKind::MaxLife);
        }
        assert_eq!(costs, vec![10, 15, 22, 33, 50]);
    }

    #[test]
    fn tracks_are_independent() {
        let mut stats = Stats::default();
        stats.apply(StatKind::MaxLife);
        stats.apply(StatKind::MaxLife);
        assert_eq!(stats.cost(StatKind::Damage), 15);
        assert_eq!(stats.purchases(StatKind::Damage), 0);
        assert_eq!(stats.purchases(StatKind::MaxLife), 2);
    }

    #[test]
    fn life_upgrade_heals_by_increment() {
        let mut stats = Stats::default();
        stats.current_life = 40;
        stats.apply(StatKind::MaxLife);
        assert_eq!(stats.max_life, 120);
        assert_eq!(stats.current_life, 60);
    }

    #[test]
    fn damage_upgrade_adds_increment() {
        let mut stats = Stats::default();
        stats.apply(StatKind::Damage);
        assert_eq!(stats.damage, 15);
    }

    #[test]
    fn runaway_cost_saturates() {
        let track = UpgradeTrack {
            base_cost: 10.0,
            multiplier: 1e300,
            increment: 1,
        };
        assert_eq!(track.cost(5), u64::MAX);
    }
}
