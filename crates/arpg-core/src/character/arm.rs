// character/arm.rs
//
// Forward-kinematics arm chains. Each segment hangs off the end of the
// previous one; rotations accumulate from the shoulder outward.

use std::f32::consts::PI;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One rigid arm segment, expressed relative to its parent joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmSegment {
    /// Offset from the parent's end point, in the parent's rotated frame.
    /// For the first segment this is the shoulder position in character space.
    pub offset: Vec2,
    /// Rotation added on top of the parent's accumulated angle.
    pub rotation: f32,
}

impl ArmSegment {
    pub fn new(offset: Vec2, rotation: f32) -> Self {
        Self { offset, rotation }
    }
}

/// Resolved placement of one segment in character space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPose {
    pub start: Vec2,
    pub end: Vec2,
    /// Direction the segment points (radians, y-down).
    pub angle: f32,
}

impl SegmentPose {
    pub fn center(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }
}

/// A fully resolved chain: every segment plus the tip where the fist attaches.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainPose {
    pub segments: Vec<SegmentPose>,
    pub tip: Vec2,
    pub tip_angle: f32,
}

/// Ordered, unbranched sequence of segments from shoulder to wrist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmChain {
    pub segments: Vec<ArmSegment>,
    /// Length of every segment along its own direction.
    pub segment_length: f32,
}

impl ArmChain {
    /// A straight arm: shoulder at `shoulder`, pointing along `angle`,
    /// with `count` segments laid end to end.
    pub fn straight(shoulder: Vec2, angle: f32, count: usize, segment_length: f32) -> Self {
        let mut segments = Vec::with_capacity(count);
        if count > 0 {
            segments.push(ArmSegment::new(shoulder, angle));
            segments.extend((1..count).map(|_| ArmSegment::new(Vec2::ZERO, 0.0)));
        }
        Self {
            segments,
            segment_length,
        }
    }

    /// Walk the chain from the shoulder outward.
    /// `root_rotation` swings the whole chain about the shoulder.
    pub fn resolve(&self, root_rotation: f32) -> ChainPose {
        let mut cursor = Vec2::ZERO;
        let mut angle = 0.0_f32;
        let mut poses = Vec::with_capacity(self.segments.len());

        for (i, segment) in self.segments.iter().enumerate() {
            let start = cursor + Vec2::from_angle(angle).rotate(segment.offset);
            angle += segment.rotation;
            if i == 0 {
                angle += root_rotation;
            }
            let end = start + Vec2::from_angle(angle) * self.segment_length;
            poses.push(SegmentPose { start, end, angle });
            cursor = end;
        }

        if poses.is_empty() {
            angle = root_rotation;
        }

        ChainPose {
            segments: poses,
            tip: cursor,
            tip_angle: angle,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmSide {
    Left,
    Right,
}

impl ArmSide {
    /// Draw order: the left arm first, the weapon arm on top.
    pub const BOTH: [ArmSide; 2] = [ArmSide::Left, ArmSide::Right];

    pub fn index(self) -> usize {
        match self {
            ArmSide::Left => 0,
            ArmSide::Right => 1,
        }
    }
}

/// Both arms of the character. The right arm carries the weapon and swings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmRig {
    pub left: ArmChain,
    pub right: ArmChain,
}

impl ArmRig {
    pub fn arm(&self, side: ArmSide) -> &ArmChain {
        match side {
            ArmSide::Left => &self.left,
            ArmSide::Right => &self.right,
        }
    }
}

impl Default for ArmRig {
    /// Arms extended horizontally from shoulders just above the torso center.
    fn default() -> Self {
        Self {
            left: ArmChain::straight(Vec2::new(-25.0, -8.0), PI, 3, 20.0),
            right: ArmChain::straight(Vec2::new(25.0, -8.0), 0.0, 3, 20.0),
        }
    }
}
