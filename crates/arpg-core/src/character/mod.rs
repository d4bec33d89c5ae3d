//! The player character: movement, the attack state machine, animation
//! counters, stats and discipline progression.

pub mod arm;
pub mod pose;
pub mod progression;
pub mod quest;
pub mod stats;

use std::f32::consts::FRAC_PI_2;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use crate::core::time::IntervalTimer;
use crate::extensions::easing::{lerp, Easing};
use crate::input::keys::MoveKeys;
use self::arm::{ArmRig, ArmSide};
use self::progression::{Accrual, Progression, ProgressionSnapshot};
use self::stats::{StatKind, Stats, StatsConfig, UpgradeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterState {
    #[default]
    Idle,
    Walking,
    Attacking,
}

/// Which optional body parts are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartVisibility {
    pub arms: bool,
    pub weapon: bool,
}

impl Default for PartVisibility {
    fn default() -> Self {
        Self {
            arms: true,
            weapon: false,
        }
    }
}

/// Character tuning. Times are in seconds, distances in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub spawn: Vec2,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Distance kept from the world edge once bounds are set.
    pub bounds_padding: f32,
    pub attack_duration: f32,
    pub animation_interval: f32,
    pub animation_frames: u32,
    pub walk_interval: f32,
    pub walk_frames: u32,
    pub swing_easing: Easing,
    pub swing_from: f32,
    pub swing_to: f32,
    /// Attack progress after which the fist snaps forward.
    pub wrist_snap_start: f32,
    pub wrist_snap_gain: f32,
    pub weapon_tilt: f32,
    /// Weapon grip point as a fraction of the fist sprite size.
    pub weapon_grip: Vec2,
    pub visibility: PartVisibility,
    pub stats: StatsConfig,
    pub arms: ArmRig,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(1000.0, 750.0),
            speed: 180.0,
            bounds_padding: 50.0,
            attack_duration: 1.5,
            animation_interval: 0.2,
            animation_frames: 4,
            walk_interval: 0.12,
            walk_frames: 8,
            swing_easing: Easing::QuartInOut,
            swing_from: -FRAC_PI_2,
            swing_to: FRAC_PI_2,
            wrist_snap_start: 0.6,
            wrist_snap_gain: 2.0,
            weapon_tilt: 0.2,
            weapon_grip: Vec2::new(0.3, -0.2),
            visibility: PartVisibility::default(),
            stats: StatsConfig::default(),
            arms: ArmRig::default(),
        }
    }
}

impl CharacterConfig {
    /// Most sprites one character can push in a frame: legs, torso, every
    /// arm segment and fist, and the weapon.
    pub fn max_sprites(&self) -> usize {
        let arms: usize = ArmSide::BOTH
            .iter()
            .map(|&side| self.arms.arm(side).len() + 1)
            .sum();
        2 + arms + 1
    }
}

/// What happened during one `Character::update`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UpdateReport {
    pub attack_finished: bool,
    pub accrual: Accrual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSnapshot {
    pub x: f32,
    pub y: f32,
    pub state: CharacterState,
    pub attack_progress: f32,
    pub max_life: u32,
    pub current_life: u32,
    pub damage: u32,
    pub life_upgrade_cost: u64,
    pub damage_upgrade_cost: u64,
    pub can_upgrade_life: bool,
    pub can_upgrade_damage: bool,
    pub visibility: PartVisibility,
    pub progression: ProgressionSnapshot,
}

pub struct Character {
    config: CharacterConfig,
    position: Vec2,
    velocity: Vec2,
    keys: MoveKeys,
    state: CharacterState,
    animation: IntervalTimer,
    walk: IntervalTimer,
    attack_timer: f32,
    attack_progress: f32,
    bounds: Option<Vec2>,
    visibility: PartVisibility,
    stats: Stats,
    progression: Progression,
}

impl Character {
    pub fn new(config: CharacterConfig, progression: Progression) -> Self {
        Self {
            position: config.spawn,
            velocity: Vec2::ZERO,
            keys: MoveKeys::default(),
            state: CharacterState::Idle,
            animation: IntervalTimer::new(config.animation_interval, config.animation_frames),
            walk: IntervalTimer::new(config.walk_interval, config.walk_frames),
            attack_timer: 0.0,
            attack_progress: 0.0,
            bounds: None,
            visibility: config.visibility,
            stats: Stats::new(&config.stats),
            progression,
            config,
        }
    }

    /// Apply a key press or release. Returns false for non-movement keys.
    pub fn set_key(&mut self, key_code: u32, held: bool) -> bool {
        let handled = self.keys.apply_key(key_code, held);
        if handled {
            self.refresh_velocity();
        }
        handled
    }

    /// Release every held key (e.g. when the page loses focus).
    pub fn release_keys(&mut self) {
        self.keys.clear();
        self.refresh_velocity();
    }

    fn refresh_velocity(&mut self) {
        self.velocity = self.keys.axis().normalize_or_zero() * self.config.speed;
        if self.state != CharacterState::Attacking {
            self.state = if self.is_moving() {
                CharacterState::Walking
            } else {
                CharacterState::Idle
            };
        }
    }

    /// Begin an attack. No-op (returns false) while one is in progress.
    pub fn attack(&mut self) -> bool {
        if self.state == CharacterState::Attacking {
            return false;
        }
        self.state = CharacterState::Attacking;
        self.attack_timer = self.config.attack_duration;
        self.attack_progress = 0.0;
        log::debug!("attack started at ({:.0}, {:.0})", self.position.x, self.position.y);
        true
    }

    /// Advance by `dt` seconds: movement, animation, attack, then progression.
    pub fn update(&mut self, dt: f32) -> UpdateReport {
        let mut report = UpdateReport::default();

        self.position += self.velocity * dt;
        self.clamp_to_bounds();

        let moving = self.is_moving();
        if self.state != CharacterState::Attacking {
            self.state = if moving {
                CharacterState::Walking
            } else {
                CharacterState::Idle
            };
        }

        self.animation.tick(dt);
        if moving {
            self.walk.tick(dt);
        } else {
            self.walk.reset();
        }

        if self.state == CharacterState::Attacking {
            self.attack_timer -= dt;
            if self.attack_timer <= 0.0 {
                self.attack_timer = 0.0;
                self.attack_progress = 0.0;
                self.state = if moving {
                    CharacterState::Walking
                } else {
                    CharacterState::Idle
                };
                report.attack_finished = true;
            } else if self.config.attack_duration > 0.0 {
                let p = 1.0 - self.attack_timer / self.config.attack_duration;
                self.attack_progress = p.clamp(self.attack_progress, 1.0);
            }
        }

        report.accrual = self.progression.tick();
        report
    }

    /// Constrain movement to `[padding, size - padding]` on both axes.
    pub fn set_world_bounds(&mut self, size: Vec2) {
        self.bounds = Some(size);
        self.clamp_to_bounds();
    }

    fn clamp_to_bounds(&mut self) {
        let Some(size) = self.bounds else {
            return;
        };
        let pad = self.config.bounds_padding;
        let max = (size - Vec2::splat(pad)).max(Vec2::splat(pad));
        self.position = self.position.max(Vec2::splat(pad)).min(max);
    }

    /// Return to the spawn point.
    pub fn reset_position(&mut self) {
        self.position = self.config.spawn;
        self.clamp_to_bounds();
        log::info!("character position reset");
    }

    pub fn toggle_arms(&mut self) -> bool {
        self.visibility.arms = !self.visibility.arms;
        self.visibility.arms
    }

    pub fn toggle_weapon(&mut self) -> bool {
        self.visibility.weapon = !self.visibility.weapon;
        self.visibility.weapon
    }

    /// Buy one upgrade. Discipline is deducted and the stat raised together;
    /// on failure neither changes. Returns the price paid.
    pub fn upgrade(&mut self, kind: StatKind) -> Result<u64, UpgradeError> {
        let cost = self.stats.cost(kind);
        self.progression.spend(cost)?;
        self.stats.apply(kind);
        log::info!(
            "upgraded {:?} for {} discipline (life {}/{}, damage {})",
            kind,
            cost,
            self.stats.current_life,
            self.stats.max_life,
            self.stats.damage
        );
        Ok(cost)
    }

    /// Right-arm swing for the current attack progress; 0 when not attacking.
    pub fn swing_angle(&self) -> f32 {
        if self.state != CharacterState::Attacking {
            return 0.0;
        }
        lerp(
            self.config.swing_from,
            self.config.swing_to,
            self.config.swing_easing.apply(self.attack_progress),
        )
    }

    /// Extra fist rotation late in the swing.
    pub fn wrist_snap(&self) -> f32 {
        if self.state != CharacterState::Attacking {
            return 0.0;
        }
        let excess = self.attack_progress - self.config.wrist_snap_start;
        if excess > 0.0 {
            excess * self.config.wrist_snap_gain
        } else {
            0.0
        }
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rounded_position(&self) -> Vec2 {
        self.position.round()
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn state(&self) -> CharacterState {
        self.state
    }

    pub fn attack_progress(&self) -> f32 {
        self.attack_progress
    }

    pub fn animation_frame(&self) -> u32 {
        self.animation.frame()
    }

    pub fn animation_frame_count(&self) -> u32 {
        self.animation.frame_count()
    }

    pub fn walk_frame(&self) -> u32 {
        self.walk.frame()
    }

    pub fn walk_frame_count(&self) -> u32 {
        self.walk.frame_count()
    }

    pub fn visibility(&self) -> PartVisibility {
        self.visibility
    }

    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn progression_mut(&mut self) -> &mut Progression {
        &mut self.progression
    }

    pub fn snapshot(&self) -> CharacterSnapshot {
        let pos = self.rounded_position();
        let life_cost = self.stats.cost(StatKind::MaxLife);
        let damage_cost = self.stats.cost(StatKind::Damage);
        CharacterSnapshot {
            x: pos.x,
            y: pos.y,
            state: self.state,
            attack_progress: self.attack_progress,
            max_life: self.stats.max_life,
            current_life: self.stats.current_life,
            damage: self.stats.damage,
            life_upgrade_cost: life_cost,
            damage_upgrade_cost: damage_cost,
            can_upgrade_life: self.progression.can_afford(life_cost),
            can_upgrade_damage: self.progression.can_afford(damage_cost),
            visibility: self.visibility,
            progression: self.progression.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::input::keys::codes;
    use crate::character::progression::BreakpointTable;

    const DT: f32 = 1.0 / 60.0;

    fn character_with_clock() -> (Character, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let progression =
            Progression::earned(BreakpointTable::earned_default(), Box::new(clock.clone()));
        (Character::new(CharacterConfig::default(), progression), clock)
    }

    fn character() -> Character {
        character_with_clock().0
    }

    #[test]
    fn starts_idle_at_spawn() {
        let c = character();
        assert_eq!(c.state(), CharacterState::Idle);
        assert_eq!(c.position(), Vec2::new(1000.0, 750.0));
        assert_eq!(c.visibility(), PartVisibility { arms: true, weapon: false });
    }

    #[test]
    fn diagonal_speed_matches_axial() {
        let mut axial = character();
        axial.set_key(codes::D, true);
        let mut diagonal = character();
        diagonal.set_key(codes::D, true);
        diagonal.set_key(codes::S, true);

        assert!((axial.velocity().length() - diagonal.velocity().length()).abs() < 1e-3);
        let half_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
        assert!((diagonal.velocity().x / 180.0 - half_sqrt2).abs() < 1e-6);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut c = character();
        c.set_key(codes::A, true);
        c.set_key(codes::ARROW_RIGHT, true);
        assert_eq!(c.velocity(), Vec2::ZERO);
        assert_eq!(c.state(), CharacterState::Idle);
    }

    #[test]
    fn moving_sets_walking_and_release_returns_idle() {
        let mut c = character();
        assert!(c.set_key(codes::W, true));
        assert_eq!(c.state(), CharacterState::Walking);
        c.update(DT);
        assert!(c.position().y < 750.0);
        c.set_key(codes::W, false);
        c.update(DT);
        assert_eq!(c.state(), CharacterState::Idle);
        assert!(!c.set_key(999, true));
    }

    #[test]
    fn position_stays_within_padded_bounds() {
        let mut c = character();
        c.set_world_bounds(Vec2::new(2000.0, 1500.0));
        c.set_key(codes::A, true);
        c.set_key(codes::W, true);
        for _ in 0..2_000 {
            c.update(DT);
        }
        assert_eq!(c.position(), Vec2::new(50.0, 50.0));

        c.release_keys();
        c.set_key(codes::D, true);
        c.set_key(codes::S, true);
        for _ in 0..2_000 {
            c.update(DT);
            let p = c.position();
            assert!(p.x >= 50.0 && p.x <= 1950.0 && p.y >= 50.0 && p.y <= 1450.0);
        }
        assert_eq!(c.position(), Vec2::new(1950.0, 1450.0));
    }

    #[test]
    fn bounds_clamp_immediately() {
        let mut c = character();
        c.set_world_bounds(Vec2::new(500.0, 400.0));
        assert_eq!(c.position(), Vec2::new(450.0, 350.0));
    }

    #[test]
    fn attack_while_attacking_is_noop() {
        let mut c = character();
        assert!(c.attack());
        for _ in 0..30 {
            c.update(DT);
        }
        let progress = c.attack_progress();
        assert!(progress > 0.0);
        assert!(!c.attack());
        assert_eq!(c.attack_progress(), progress);
        assert_eq!(c.state(), CharacterState::Attacking);
    }

    #[test]
    fn attack_progress_rises_then_resets_on_idle() {
        let mut c = character();
        c.attack();
        let mut last = 0.0;
        let mut finished_at = None;
        for step in 0..200 {
            let report = c.update(DT);
            if report.attack_finished {
                finished_at = Some(step);
                break;
            }
            assert!(c.attack_progress() >= last);
            assert!(c.attack_progress() <= 1.0);
            last = c.attack_progress();
        }
        // 1.5 s at 60 Hz, give or take float accumulation.
        let step = finished_at.unwrap();
        assert!((89..=90).contains(&step), "finished at {}", step);
        assert_eq!(c.state(), CharacterState::Idle);
        assert_eq!(c.attack_progress(), 0.0);
        assert!(last > 0.95);
    }

    #[test]
    fn attack_ending_while_moving_resumes_walking() {
        let mut c = character();
        c.attack();
        c.set_key(codes::D, true);
        assert_eq!(c.state(), CharacterState::Attacking);
        c.update(2.0);
        assert_eq!(c.state(), CharacterState::Walking);
    }

    #[test]
    fn walk_counter_resets_when_stopped() {
        let mut c = character();
        c.set_key(codes::D, true);
        c.update(0.12);
        c.update(0.12);
        c.update(0.12);
        assert_eq!(c.walk_frame(), 3);
        c.set_key(codes::D, false);
        c.update(DT);
        assert_eq!(c.walk_frame(), 0);
    }

    #[test]
    fn general_counter_cycles_four_frames() {
        let mut c = character();
        for _ in 0..5 {
            c.update(0.2);
        }
        assert_eq!(c.animation_frame(), 1);
    }

    #[test]
    fn swing_runs_from_up_to_down() {
        let mut c = character();
        assert_eq!(c.swing_angle(), 0.0);
        c.attack();
        assert!((c.swing_angle() + FRAC_PI_2).abs() < 1e-6);
        c.update(0.75);
        assert!(c.swing_angle().abs() < 1e-4);
        assert_eq!(c.wrist_snap(), 0.0);
        c.update(0.6);
        assert!(c.swing_angle() > 1.5);
        assert!((c.wrist_snap() - (c.attack_progress() - 0.6) * 2.0).abs() < 1e-6);
    }

    #[test]
    fn upgrade_requires_discipline() {
        let (mut c, clock) = character_with_clock();
        assert!(matches!(
            c.upgrade(StatKind::MaxLife),
            Err(UpgradeError::Insufficient { cost: 10, .. })
        ));
        assert_eq!(c.stats().max_life, 100);

        clock.advance(12_000);
        c.update(DT);
        assert_eq!(c.progression().discipline(), 12.0);

        assert_eq!(c.upgrade(StatKind::MaxLife), Ok(10));
        assert_eq!(c.stats().max_life, 120);
        assert_eq!(c.progression().discipline(), 2.0);
        assert_eq!(c.stats().cost(StatKind::MaxLife), 15);

        // Second purchase fails and changes nothing.
        assert!(c.upgrade(StatKind::MaxLife).is_err());
        assert_eq!(c.stats().max_life, 120);
        assert_eq!(c.progression().discipline(), 2.0);
    }

    #[test]
    fn reset_position_returns_to_spawn() {
        let mut c = character();
        c.set_key(codes::D, true);
        c.update(1.0);
        assert_ne!(c.position(), c.config().spawn);
        c.reset_position();
        assert_eq!(c.position(), Vec2::new(1000.0, 750.0));
    }

    #[test]
    fn toggles_flip_visibility() {
        let mut c = character();
        assert!(!c.toggle_arms());
        assert!(c.toggle_weapon());
        assert_eq!(c.visibility(), PartVisibility { arms: false, weapon: true });
    }

    #[test]
    fn snapshot_serializes() {
        let c = character();
        let json = serde_json::to_value(c.snapshot()).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["life_upgrade_cost"], 10);
        assert_eq!(json["can_upgrade_life"], false);
        assert_eq!(json["progression"]["rank"], "Novice");
    }

    #[test]
    fn config_accepts_partial_json() {
        let config: CharacterConfig =
            serde_json::from_str(r#"{ "speed": 240.0, "attack_duration": 0.3 }"#).unwrap();
        assert_eq!(config.speed, 240.0);
        assert_eq!(config.attack_duration, 0.3);
        assert_eq!(config.walk_frames, 8);
    }
}
