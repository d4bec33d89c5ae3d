// character/pose.rs
//
// Per-frame body pose in character space, and the draw pass that turns it
// into sprite instances.

use std::f32::consts::{FRAC_PI_2, TAU};
use glam::Vec2;
use crate::assets::registry::{SpriteId, SpriteRegistry};
use crate::character::arm::{ArmSide, ChainPose};
use crate::character::{Character, CharacterState};
use crate::render::instance::DrawList;
use crate::render::layer::RenderLayer;

/// Legs hang this far below the torso center.
pub const LEGS_OFFSET: Vec2 = Vec2::new(0.0, 35.0);
const WALK_BOB: f32 = 2.0;
const WALK_ROCK: f32 = 0.15;
const BREATH: f32 = 1.0;

/// Placement of one rigid part: center offset from the character origin
/// and rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartPose {
    pub offset: Vec2,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmPose {
    pub chain: ChainPose,
    pub fist: PartPose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterPose {
    pub legs: PartPose,
    pub torso: PartPose,
    /// Indexed by [`ArmSide::index`]; None while arms are hidden.
    pub arms: Option<[ArmPose; 2]>,
    /// Weapon tilt relative to the right fist, or None while hidden.
    pub weapon_tilt: Option<f32>,
    /// Weapon grip point as a fraction of the fist sprite size.
    pub weapon_grip: Vec2,
}

impl CharacterPose {
    pub fn of(character: &Character) -> Self {
        let config = character.config();
        let walking = character.state() == CharacterState::Walking;

        let (bob, rock) = if walking {
            let frames = character.walk_frame_count().max(1) as f32;
            let phase = character.walk_frame() as f32 * TAU / frames;
            (phase.sin() * WALK_BOB, phase.sin() * WALK_ROCK)
        } else {
            (0.0, 0.0)
        };
        let breath = if character.state() == CharacterState::Idle {
            let frames = character.animation_frame_count().max(1) as f32;
            (character.animation_frame() as f32 * TAU / frames).sin() * BREATH
        } else {
            0.0
        };

        let torso_offset = Vec2::new(0.0, bob * 0.5 + breath);
        let legs = PartPose {
            offset: LEGS_OFFSET + Vec2::new(0.0, bob),
            rotation: rock,
        };
        let torso = PartPose {
            offset: torso_offset,
            rotation: 0.0,
        };

        let visibility = character.visibility();
        let arms = visibility.arms.then(|| {
            let swing = character.swing_angle();
            let snap = character.wrist_snap();
            ArmSide::BOTH.map(|side| {
                // Only the weapon arm swings.
                let (root, fist) = match side {
                    ArmSide::Left => (0.0, 0.0),
                    ArmSide::Right => (swing, swing + snap),
                };
                arm_pose(config.arms.arm(side).resolve(root), torso_offset, fist)
            })
        });

        // The weapon rides the right fist, so it needs the arms.
        let weapon_tilt = (visibility.weapon && arms.is_some()).then_some(config.weapon_tilt);

        Self {
            legs,
            torso,
            arms,
            weapon_tilt,
            weapon_grip: config.weapon_grip,
        }
    }

    pub fn arm(&self, side: ArmSide) -> Option<&ArmPose> {
        self.arms.as_ref().map(|arms| &arms[side.index()])
    }

    /// Weapon placement for a fist sprite of `fist_size`.
    pub fn weapon(&self, fist_size: Vec2) -> Option<PartPose> {
        let tilt = self.weapon_tilt?;
        let fist = self.arm(ArmSide::Right)?.fist;
        let grip = Vec2::from_angle(fist.rotation).rotate(self.weapon_grip * fist_size);
        Some(PartPose {
            offset: fist.offset + grip,
            rotation: fist.rotation + tilt,
        })
    }
}

fn arm_pose(chain: ChainPose, anchor: Vec2, fist_rotation: f32) -> ArmPose {
    let fist = PartPose {
        offset: chain.tip + anchor,
        rotation: fist_rotation,
    };
    let chain = ChainPose {
        segments: chain
            .segments
            .iter()
            .map(|s| {
                let mut s = *s;
                s.start += anchor;
                s.end += anchor;
                s
            })
            .collect(),
        tip: chain.tip + anchor,
        tip_angle: chain.tip_angle,
    };
    ArmPose { chain, fist }
}

/// Sprite ids for each body part, resolved once from the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CharacterSprites {
    pub torso: Option<SpriteId>,
    pub legs: Option<SpriteId>,
    pub arm: Option<SpriteId>,
    pub fist: Option<SpriteId>,
    pub weapon: Option<SpriteId>,
}

impl CharacterSprites {
    pub fn resolve(registry: &SpriteRegistry) -> Self {
        Self {
            torso: registry.id("torso"),
            legs: registry.id("legs"),
            arm: registry.id("arm"),
            fist: registry.id("fist"),
            weapon: registry.id("weapon"),
        }
    }
}

/// Push the character's sprites back to front: legs, torso, then each arm
/// (segments shoulder-outward, fist, and the weapon after the right fist).
/// Parts whose image is not ready are skipped.
pub fn draw_character(
    list: &mut DrawList,
    registry: &SpriteRegistry,
    sprites: &CharacterSprites,
    pose: &CharacterPose,
    screen_pos: Vec2,
) {
    let mut part = |id: Option<SpriteId>, p: PartPose| {
        if let Some(id) = id {
            list.draw_sprite(registry, id, screen_pos + p.offset, p.rotation, RenderLayer::Character);
        }
    };

    part(sprites.legs, pose.legs);
    part(sprites.torso, pose.torso);

    let Some(arms) = &pose.arms else {
        return;
    };
    for (side, arm) in ArmSide::BOTH.into_iter().zip(arms.iter()) {
        for segment in &arm.chain.segments {
            // Arm art is drawn vertically; chain angle 0 points along +x.
            part(
                sprites.arm,
                PartPose {
                    offset: segment.center(),
                    rotation: segment.angle - FRAC_PI_2,
                },
            );
        }
        part(sprites.fist, arm.fist);
        if side == ArmSide::Right {
            let fist_size = sprites.fist.and_then(|id| registry.size(id)).unwrap_or(Vec2::ZERO);
            if let Some(weapon) = pose.weapon(fist_size) {
                part(sprites.weapon, weapon);
            }
        }
    }
}
