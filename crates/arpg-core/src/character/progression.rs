//! Discipline progression.
//!
//! Discipline accrues once per whole second of wall-clock time at a rate
//! picked from a breakpoint table. Two metrics can select the breakpoint,
//! and a session uses exactly one of them:
//!
//! - [`DisciplineBasis::Earned`]: total discipline ever earned.
//! - [`DisciplineBasis::Fasting`]: whole minutes since the fasting quest began.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::character::quest::{FastingQuest, QuestError, QUEST_START_KEY};
use crate::character::stats::UpgradeError;
use crate::core::clock::Clock;
use crate::core::storage::KeyValueStore;

const MS_PER_SECOND: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("breakpoint table is empty")]
    Empty,
    #[error("breakpoint {index} ({name}) is not above the previous key")]
    Unsorted { index: usize, name: String },
    #[error("breakpoint {name} has an invalid rate {rate}")]
    InvalidRate { name: String, rate: f64 },
}

/// One rank in the progression ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Metric value at which this rank applies (discipline earned or minutes fasted).
    pub key: u64,
    /// Discipline generated per second while this rank is active.
    pub rate: f64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Breakpoint {
    pub fn new(key: u64, rate: f64, name: &str, description: &str) -> Self {
        Self {
            key,
            rate,
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Breakpoints sorted by strictly ascending key.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    points: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub fn new(points: Vec<Breakpoint>) -> Result<Self, TableError> {
        if points.is_empty() {
            return Err(TableError::Empty);
        }
        for (index, bp) in points.iter().enumerate() {
            if !bp.rate.is_finite() || bp.rate < 0.0 {
                return Err(TableError::InvalidRate {
                    name: bp.name.clone(),
                    rate: bp.rate,
                });
            }
            if index > 0 && bp.key <= points[index - 1].key {
                return Err(TableError::Unsorted {
                    index,
                    name: bp.name.clone(),
                });
            }
        }
        Ok(Self { points })
    }

    /// Ranks for the earned-discipline model.
    pub fn earned_default() -> Self {
        Self {
            points: vec![
                Breakpoint::new(0, 1.0, "Novice", "Every journey starts with a single step."),
                Breakpoint::new(100, 2.0, "Apprentice", "Habits begin to form."),
                Breakpoint::new(500, 5.0, "Disciplined", "Consistency is becoming second nature."),
                Breakpoint::new(2_000, 10.0, "Adept", "Willpower compounds."),
                Breakpoint::new(10_000, 25.0, "Master", "Discipline is who you are."),
            ],
        }
    }

    /// Ranks for the fasting model, keyed by minutes since the quest began.
    pub fn fasting_default() -> Self {
        Self {
            points: vec![
                Breakpoint::new(0, 1.0, "Fed State", "Digesting the last meal."),
                Breakpoint::new(4 * 60, 2.0, "Early Fast", "Blood sugar settles."),
                Breakpoint::new(12 * 60, 5.0, "Ketosis", "The body switches to burning fat."),
                Breakpoint::new(18 * 60, 8.0, "Fat Burning", "Ketone levels climb."),
                Breakpoint::new(24 * 60, 12.0, "Autophagy", "Cellular cleanup is under way."),
                Breakpoint::new(48 * 60, 20.0, "Deep Autophagy", "Peak renewal."),
            ],
        }
    }

    /// Index of the last breakpoint whose key is at or below `metric`.
    pub fn index_for(&self, metric: u64) -> Option<usize> {
        self.points
            .partition_point(|bp| bp.key <= metric)
            .checked_sub(1)
    }

    pub fn current(&self, metric: u64) -> Option<&Breakpoint> {
        self.index_for(metric).map(|i| &self.points[i])
    }

    pub fn next(&self, metric: u64) -> Option<&Breakpoint> {
        let next = self.index_for(metric).map_or(0, |i| i + 1);
        self.points.get(next)
    }

    pub fn rate(&self, metric: u64) -> f64 {
        self.current(metric).map_or(0.0, |bp| bp.rate)
    }

    /// Percent of the way from the current rank to the next, capped at 100.
    pub fn progress_to_next(&self, metric: u64) -> f32 {
        let Some(next) = self.next(metric) else {
            return 100.0;
        };
        let floor = self.current(metric).map_or(0, |bp| bp.key);
        let span = next.key.saturating_sub(floor).max(1);
        let done = metric.saturating_sub(floor);
        ((done as f64 / span as f64) * 100.0).min(100.0) as f32
    }

    pub fn get(&self, index: usize) -> Option<&Breakpoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Which metric selects the active breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisciplineBasis {
    #[default]
    Earned,
    Fasting,
}

/// Tuning for the progression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub basis: DisciplineBasis,
    /// Custom breakpoints; the basis default table is used when absent.
    pub breakpoints: Option<Vec<Breakpoint>>,
    /// Storage key for the fasting quest start.
    pub quest_key: String,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            basis: DisciplineBasis::default(),
            breakpoints: None,
            quest_key: QUEST_START_KEY.to_string(),
        }
    }
}

impl ProgressionConfig {
    pub fn table(&self) -> Result<BreakpointTable, TableError> {
        match &self.breakpoints {
            Some(points) => BreakpointTable::new(points.clone()),
            None => Ok(match self.basis {
                DisciplineBasis::Earned => BreakpointTable::earned_default(),
                DisciplineBasis::Fasting => BreakpointTable::fasting_default(),
            }),
        }
    }
}

enum RateSource {
    Earned,
    Fasting(FastingQuest),
}

/// Result of one accrual check.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accrual {
    /// Discipline added this tick.
    pub amount: f64,
    /// Set when the active rank changed; holds the new breakpoint index.
    pub rank_changed: Option<Option<usize>>,
}

/// Serializable progression view for the HUD.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionSnapshot {
    pub basis: DisciplineBasis,
    pub discipline: f64,
    pub total_earned: f64,
    pub rate: f64,
    pub metric: u64,
    pub rank: Option<String>,
    pub rank_description: Option<String>,
    pub next_rank: Option<String>,
    pub next_threshold: Option<u64>,
    pub progress_to_next: f32,
    pub quest_start: Option<String>,
}

/// Discipline balance, lifetime earnings and the accrual clock.
pub struct Progression {
    clock: Box<dyn Clock>,
    source: RateSource,
    table: BreakpointTable,
    discipline: f64,
    total_earned: f64,
    last_accrual_ms: u64,
    rank: Option<usize>,
}

impl Progression {
    /// Earned-discipline model: rank is chosen by lifetime earnings.
    pub fn earned(table: BreakpointTable, clock: Box<dyn Clock>) -> Self {
        Self::with_source(table, clock, RateSource::Earned)
    }

    /// Fasting model: rank is chosen by minutes since the persisted quest start.
    pub fn fasting(
        table: BreakpointTable,
        clock: Box<dyn Clock>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        Self::with_source(table, clock, RateSource::Fasting(FastingQuest::new(store)))
    }

    /// Build the configured model. The store is only used by the fasting model.
    pub fn from_config(
        config: &ProgressionConfig,
        clock: Box<dyn Clock>,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, TableError> {
        let table = config.table()?;
        let source = match config.basis {
            DisciplineBasis::Earned => RateSource::Earned,
            DisciplineBasis::Fasting => {
                RateSource::Fasting(FastingQuest::with_key(store, config.quest_key.clone()))
            }
        };
        log::info!("discipline model: {:?} ({} ranks)", config.basis, table.len());
        Ok(Self::with_source(table, clock, source))
    }

    fn with_source(table: BreakpointTable, clock: Box<dyn Clock>, source: RateSource) -> Self {
        let now = clock.now_ms();
        let mut progression = Self {
            clock,
            source,
            table,
            discipline: 0.0,
            total_earned: 0.0,
            last_accrual_ms: now,
            rank: None,
        };
        progression.rank = progression
            .metric_at(now)
            .and_then(|m| progression.table.index_for(m));
        progression
    }

    pub fn basis(&self) -> DisciplineBasis {
        match self.source {
            RateSource::Earned => DisciplineBasis::Earned,
            RateSource::Fasting(_) => DisciplineBasis::Fasting,
        }
    }

    /// Metric value at `now_ms`, or None when no rank can apply
    /// (fasting model without a quest, or with a start still ahead).
    fn metric_at(&self, now_ms: u64) -> Option<u64> {
        match &self.source {
            RateSource::Earned => Some(self.total_earned.floor() as u64),
            RateSource::Fasting(quest) => quest.elapsed_minutes(now_ms),
        }
    }

    pub fn metric(&self) -> u64 {
        self.metric_at(self.clock.now_ms()).unwrap_or(0)
    }

    /// Current generation rate in discipline per second.
    pub fn rate(&self) -> f64 {
        self.metric_at(self.clock.now_ms())
            .map_or(0.0, |m| self.table.rate(m))
    }

    /// Accrue `rate × whole seconds` since the last accrual.
    /// The sub-second remainder carries into the next tick.
    pub fn tick(&mut self) -> Accrual {
        let now = self.clock.now_ms();
        if now < self.last_accrual_ms {
            // Clock went backwards; restart the second count from here.
            self.last_accrual_ms = now;
            return Accrual::default();
        }
        let seconds = (now - self.last_accrual_ms) / MS_PER_SECOND;
        if seconds == 0 {
            return Accrual::default();
        }
        self.last_accrual_ms += seconds * MS_PER_SECOND;

        let amount = self.rate() * seconds as f64;
        self.discipline += amount;
        self.total_earned += amount;

        let rank = self
            .metric_at(now)
            .and_then(|m| self.table.index_for(m));
        let rank_changed = if rank != self.rank {
            self.rank = rank;
            match rank.and_then(|i| self.table.get(i)) {
                Some(bp) => log::info!("discipline rank: {} ({:.1}/s)", bp.name, bp.rate),
                None => log::info!("discipline rank cleared"),
            }
            Some(rank)
        } else {
            None
        };

        Accrual { amount, rank_changed }
    }

    /// Deduct `cost` if affordable; otherwise leave the balance untouched.
    pub fn spend(&mut self, cost: u64) -> Result<(), UpgradeError> {
        let cost_f = cost as f64;
        if self.discipline < cost_f {
            return Err(UpgradeError::Insufficient {
                cost,
                available: self.discipline,
            });
        }
        self.discipline -= cost_f;
        Ok(())
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.discipline >= cost as f64
    }

    pub fn discipline(&self) -> f64 {
        self.discipline
    }

    pub fn total_earned(&self) -> f64 {
        self.total_earned
    }

    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn quest_mut(&mut self) -> Result<&mut FastingQuest, QuestError> {
        match &mut self.source {
            RateSource::Fasting(quest) => Ok(quest),
            RateSource::Earned => Err(QuestError::Disabled),
        }
    }

    pub fn quest(&self) -> Option<&FastingQuest> {
        match &self.source {
            RateSource::Fasting(quest) => Some(quest),
            RateSource::Earned => None,
        }
    }

    /// Start the fasting quest now.
    pub fn start_quest_now(&mut self) -> Result<(), QuestError> {
        let now = self.clock.now_ms();
        self.quest_mut()?
            .start_at_ms(now)
            .ok_or(QuestError::BeforeEpoch(now.to_string()))?;
        Ok(())
    }

    /// Start the fasting quest at an ISO-8601 timestamp.
    pub fn start_quest_at(&mut self, input: &str) -> Result<(), QuestError> {
        self.quest_mut()?.start_at(input).map(|_| ())
    }

    pub fn reset_quest(&mut self) -> Result<(), QuestError> {
        self.quest_mut()?.reset();
        Ok(())
    }

    pub fn snapshot(&self) -> ProgressionSnapshot {
        let now = self.clock.now_ms();
        let metric = self.metric_at(now);
        let current = metric.and_then(|m| self.table.current(m));
        let next = match metric {
            Some(m) => self.table.next(m),
            None => self.table.get(0),
        };
        ProgressionSnapshot {
            basis: self.basis(),
            discipline: self.discipline,
            total_earned: self.total_earned,
            rate: current.map_or(0.0, |bp| bp.rate),
            metric: metric.unwrap_or(0),
            rank: current.map(|bp| bp.name.clone()),
            rank_description: current.map(|bp| bp.description.clone()),
            next_rank: next.map(|bp| bp.name.clone()),
            next_threshold: next.map(|bp| bp.key),
            progress_to_next: metric.map_or(0.0, |m| self.table.progress_to_next(m)),
            quest_start: self.quest().and_then(|q| q.start_timestamp()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::storage::MemoryStore;

    const T0: u64 = 1_704_067_200_000;

    fn table(keys_rates: &[(u64, f64)]) -> BreakpointTable {
        BreakpointTable::new(
            keys_rates
                .iter()
                .enumerate()
                .map(|(i, &(k, r))| Breakpoint::new(k, r, &format!("R{}", i), ""))
                .collect(),
        )
        .unwrap()
    }

    fn earned(clock: &ManualClock) -> Progression {
        Progression::earned(table(&[(0, 1.0), (10, 2.0), (50, 5.0)]), Box::new(clock.clone()))
    }

    #[test]
    fn rejects_bad_tables() {
        assert_eq!(BreakpointTable::new(vec![]), Err(TableError::Empty));
        let unsorted = vec![
            Breakpoint::new(10, 1.0, "b", ""),
            Breakpoint::new(10, 2.0, "c", ""),
        ];
        assert!(matches!(
            BreakpointTable::new(unsorted),
            Err(TableError::Unsorted { index: 1, .. })
        ));
        let negative = vec![Breakpoint::new(0, -1.0, "a", "")];
        assert!(matches!(
            BreakpointTable::new(negative),
            Err(TableError::InvalidRate { .. })
        ));
    }

    #[test]
    fn lookup_at_exact_key_selects_that_breakpoint() {
        let t = table(&[(0, 1.0), (100, 2.0), (500, 5.0)]);
        assert_eq!(t.rate(99), 1.0);
        assert_eq!(t.rate(100), 2.0);
        assert_eq!(t.rate(499), 2.0);
        assert_eq!(t.rate(500), 5.0);
        assert_eq!(t.rate(u64::MAX), 5.0);
    }

    #[test]
    fn metric_below_first_key_has_no_rank() {
        let t = table(&[(10, 1.0)]);
        assert!(t.current(9).is_none());
        assert_eq!(t.rate(9), 0.0);
        assert_eq!(t.next(9).map(|bp| bp.key), Some(10));
    }

    #[test]
    fn progress_to_next_is_relative_and_capped() {
        let t = table(&[(0, 1.0), (100, 2.0), (300, 3.0)]);
        assert_eq!(t.progress_to_next(0), 0.0);
        assert_eq!(t.progress_to_next(50), 50.0);
        assert_eq!(t.progress_to_next(200), 50.0);
        assert_eq!(t.progress_to_next(1_000), 100.0);
        assert!(t.next(1_000).is_none());
    }

    #[test]
    fn default_tables_are_valid() {
        for t in [BreakpointTable::earned_default(), BreakpointTable::fasting_default()] {
            assert!(BreakpointTable::new(t.points.clone()).is_ok());
            assert_eq!(t.get(0).map(|bp| bp.key), Some(0));
        }
    }

    #[test]
    fn accrues_only_whole_seconds() {
        let clock = ManualClock::new(T0);
        let mut p = earned(&clock);

        clock.advance(999);
        assert_eq!(p.tick().amount, 0.0);

        clock.advance(1);
        assert_eq!(p.tick().amount, 1.0);

        // 2.5 s: two whole seconds now, the half second carries over.
        clock.advance(2_500);
        assert_eq!(p.tick().amount, 2.0);
        clock.advance(500);
        assert_eq!(p.tick().amount, 1.0);
        assert_eq!(p.discipline(), 4.0);
    }

    #[test]
    fn earned_rate_rises_with_total_earned() {
        let clock = ManualClock::new(T0);
        let mut p = earned(&clock);

        clock.advance(10_000);
        let accrual = p.tick();
        assert_eq!(accrual.amount, 10.0);
        assert_eq!(accrual.rank_changed, Some(Some(1)));
        assert_eq!(p.rate(), 2.0);

        // Spending does not lower the rank: it follows lifetime earnings.
        p.spend(10).unwrap();
        assert_eq!(p.discipline(), 0.0);
        assert_eq!(p.total_earned(), 10.0);
        assert_eq!(p.rate(), 2.0);
    }

    #[test]
    fn spend_fails_without_side_effects() {
        let clock = ManualClock::new(T0);
        let mut p = earned(&clock);
        clock.advance(5_000);
        p.tick();

        let err = p.spend(6).unwrap_err();
        assert_eq!(err, UpgradeError::Insufficient { cost: 6, available: 5.0 });
        assert_eq!(p.discipline(), 5.0);
        assert!(p.can_afford(5));
        p.spend(5).unwrap();
        assert_eq!(p.discipline(), 0.0);
    }

    #[test]
    fn fasting_without_quest_generates_nothing() {
        let clock = ManualClock::new(T0);
        let mut p = Progression::fasting(
            BreakpointTable::fasting_default(),
            Box::new(clock.clone()),
            Box::new(MemoryStore::new()),
        );
        clock.advance(60_000);
        assert_eq!(p.tick().amount, 0.0);
        assert_eq!(p.rate(), 0.0);
        assert!(p.snapshot().rank.is_none());
    }

    #[test]
    fn fasting_with_future_start_generates_nothing() {
        let clock = ManualClock::new(T0);
        let mut p = Progression::fasting(
            BreakpointTable::fasting_default(),
            Box::new(clock.clone()),
            Box::new(MemoryStore::new()),
        );
        p.start_quest_at("2024-01-01T02:00").unwrap();
        clock.advance(60 * 60_000);
        assert_eq!(p.rate(), 0.0);
        assert_eq!(p.tick().amount, 0.0);
        assert!(p.snapshot().rank.is_none());

        clock.advance(61 * 60_000);
        assert_eq!(p.rate(), 1.0);
        assert_eq!(p.metric(), 1);
    }

    #[test]
    fn fasting_rate_follows_elapsed_minutes() {
        let clock = ManualClock::new(T0);
        let store = MemoryStore::new();
        let mut p = Progression::fasting(
            BreakpointTable::fasting_default(),
            Box::new(clock.clone()),
            Box::new(store.clone()),
        );
        p.start_quest_at("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(store.get(crate::character::quest::QUEST_START_KEY).as_deref(),
            Some("2024-01-01T00:00:00.000Z"));

        assert_eq!(p.rate(), 1.0);
        clock.advance(4 * 60 * 60_000);
        assert_eq!(p.metric(), 240);
        assert_eq!(p.rate(), 2.0);

        let accrual = p.tick();
        assert_eq!(accrual.amount, 2.0 * 4.0 * 60.0 * 60.0);
        assert_eq!(accrual.rank_changed, Some(Some(1)));
    }

    #[test]
    fn fasting_quest_survives_restart_via_store() {
        let clock = ManualClock::new(T0);
        let store = MemoryStore::new();
        {
            let mut p = Progression::fasting(
                BreakpointTable::fasting_default(),
                Box::new(clock.clone()),
                Box::new(store.clone()),
            );
            p.start_quest_now().unwrap();
        }
        clock.advance(13 * 60 * 60_000);
        let p = Progression::fasting(
            BreakpointTable::fasting_default(),
            Box::new(clock.clone()),
            Box::new(store.clone()),
        );
        assert_eq!(p.snapshot().rank.as_deref(), Some("Ketosis"));
    }

    #[test]
    fn quest_ops_rejected_in_earned_mode() {
        let clock = ManualClock::new(T0);
        let mut p = earned(&clock);
        assert_eq!(p.start_quest_now(), Err(QuestError::Disabled));
        assert_eq!(p.reset_quest(), Err(QuestError::Disabled));
        assert!(p.quest().is_none());
    }

    #[test]
    fn snapshot_reports_next_rank() {
        let clock = ManualClock::new(T0);
        let mut p = earned(&clock);
        clock.advance(5_000);
        p.tick();
        let snap = p.snapshot();
        assert_eq!(snap.rank.as_deref(), Some("R0"));
        assert_eq!(snap.next_rank.as_deref(), Some("R1"));
        assert_eq!(snap.next_threshold, Some(10));
        assert_eq!(snap.progress_to_next, 50.0);
        assert_eq!(snap.basis, DisciplineBasis::Earned);
    }

    #[test]
    fn from_config_picks_model_and_table() {
        let clock = ManualClock::new(T0);
        let config = ProgressionConfig {
            basis: DisciplineBasis::Fasting,
            ..ProgressionConfig::default()
        };
        let p = Progression::from_config(&config, Box::new(clock.clone()), Box::new(MemoryStore::new()))
            .unwrap();
        assert_eq!(p.basis(), DisciplineBasis::Fasting);
        assert_eq!(p.table().get(1).map(|bp| bp.key), Some(240));

        let custom = ProgressionConfig {
            breakpoints: Some(vec![Breakpoint::new(5, 1.0, "a", ""), Breakpoint::new(1, 2.0, "b", "")]),
            ..ProgressionConfig::default()
        };
        assert!(Progression::from_config(&custom, Box::new(clock), Box::new(MemoryStore::new())).is_err());
    }

    #[test]
    fn config_parses_from_json() {
        let config: ProgressionConfig = serde_json::from_str(
            r#"{ "basis": "fasting", "breakpoints": [{ "key": 0, "rate": 3.0, "name": "Only" }] }"#,
        )
        .unwrap();
        assert_eq!(config.basis, DisciplineBasis::Fasting);
        assert_eq!(config.quest_key, QUEST_START_KEY);
        assert_eq!(config.table().unwrap().rate(1_000), 3.0);
    }

    #[test]
    fn backwards_clock_does_not_accrue() {
        let clock = ManualClock::new(T0);
        let mut p = earned(&clock);
        clock.set(T0 - 10_000);
        assert_eq!(p.tick().amount, 0.0);
        clock.advance(1_000);
        assert_eq!(p.tick().amount, 1.0);
    }
}
