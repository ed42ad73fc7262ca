//! Deterministic kinematic stand-in for a physics host
//!
//! No dynamics: the hand follows position deltas, the pads open and close
//! instantly, and the ball is pushed out of the hand's contact sphere in the
//! horizontal plane. Good enough to drive the task end to end in tests and
//! demos; not a model of contact-rich manipulation.

use kickbench_core::{RLError, Result};

use crate::host::{Body, ManipulationHost, SpatialPoint};

/// Hand displacement per unit of action
pub const ACTION_SCALE: f64 = 1.0 / 100.0;
/// Pad offset from the hand center when fully open
pub const MAX_PAD_OFFSET: f64 = 0.05;
/// Radius of the hand's contact sphere
pub const HAND_RADIUS: f64 = 0.02;
/// Vertical band within which the hand can touch the ball
pub const CONTACT_HEIGHT: f64 = 0.03;

const CONTACT_SLACK: f64 = 1e-6;

/// Kinematic manipulation host
#[derive(Debug, Clone)]
pub struct KinematicHost {
    hand: SpatialPoint,
    pad_offset: f64,
    object: SpatialPoint,
    goal: SpatialPoint,
    obj_radius: f64,
    hand_low: SpatialPoint,
    hand_high: SpatialPoint,
}

impl KinematicHost {
    /// Create a host with hand workspace bounds and ball radius
    #[must_use]
    pub fn new(hand_low: SpatialPoint, hand_high: SpatialPoint, obj_radius: f64) -> Self {
        Self {
            hand: (hand_low + hand_high) / 2.0,
            pad_offset: MAX_PAD_OFFSET,
            object: SpatialPoint::zeros(),
            goal: SpatialPoint::zeros(),
            obj_radius,
            hand_low,
            hand_high,
        }
    }

    /// Host matching a task configuration
    #[must_use]
    pub fn from_config(config: &crate::config::SoccerConfig) -> Self {
        Self::new(config.hand_low, config.hand_high, config.obj_radius)
    }

    fn contact_reach(&self) -> f64 {
        HAND_RADIUS + self.obj_radius
    }

    /// Horizontal offset from the hand to the ball and whether the ball is in
    /// the hand's vertical contact band.
    fn ball_offset(&self) -> (nalgebra::Vector2<f64>, bool) {
        let offset = (self.object - self.hand).xy();
        let in_band = (self.object.z - self.hand.z).abs() <= CONTACT_HEIGHT;
        (offset, in_band)
    }

    fn resolve_contact(&mut self, motion: SpatialPoint) {
        let (offset, in_band) = self.ball_offset();
        let reach = self.contact_reach();
        let distance = offset.norm();
        if !in_band || distance >= reach {
            return;
        }

        let direction = if distance > f64::EPSILON {
            offset / distance
        } else {
            let planar = motion.xy();
            if planar.norm() > f64::EPSILON {
                planar.normalize()
            } else {
                nalgebra::Vector2::y()
            }
        };
        let pushed = self.hand.xy() + direction * reach;
        self.object.x = pushed.x;
        self.object.y = pushed.y;
    }
}

impl ManipulationHost for KinematicHost {
    fn position(&self, body: Body) -> SpatialPoint {
        match body {
            Body::Hand => self.hand,
            Body::LeftPad => self.hand + SpatialPoint::new(0.0, self.pad_offset, 0.0),
            Body::RightPad => self.hand - SpatialPoint::new(0.0, self.pad_offset, 0.0),
            Body::Object => self.object,
            Body::Goal => self.goal,
        }
    }

    fn tcp_center(&self) -> SpatialPoint {
        self.hand
    }

    fn object_quaternion(&self) -> [f64; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }

    fn touching_object(&self) -> bool {
        let (offset, in_band) = self.ball_offset();
        in_band && offset.norm() <= self.contact_reach() + CONTACT_SLACK
    }

    fn reset_hand(&mut self, hand_init_pos: SpatialPoint) -> Result<()> {
        self.hand = hand_init_pos.sup(&self.hand_low).inf(&self.hand_high);
        self.pad_offset = MAX_PAD_OFFSET;
        Ok(())
    }

    fn set_body_position(&mut self, body: Body, position: SpatialPoint) -> Result<()> {
        match body {
            Body::Goal => self.goal = position,
            Body::Object => self.object = position,
            other => {
                return Err(RLError::Environment(format!(
                    "body {} cannot be placed directly",
                    other.name()
                )))
            }
        }
        Ok(())
    }

    fn set_object_position(&mut self, position: SpatialPoint) -> Result<()> {
        self.object = position;
        Ok(())
    }

    fn step(&mut self, action: &[f64]) -> Result<()> {
        if action.len() < 4 {
            return Err(RLError::DimensionMismatch {
                expected: 4,
                actual: action.len(),
            });
        }

        let motion = SpatialPoint::new(action[0], action[1], action[2]) * ACTION_SCALE;
        let previous = self.hand;
        self.hand = (self.hand + motion).sup(&self.hand_low).inf(&self.hand_high);
        self.resolve_contact(self.hand - previous);

        // -1 opens fully, +1 closes fully
        let closing = action[3].clamp(-1.0, 1.0);
        let mut offset = MAX_PAD_OFFSET * (1.0 - closing) / 2.0;
        let (ball, in_band) = self.ball_offset();
        if in_band && ball.x.abs() < self.obj_radius && ball.y.abs() <= MAX_PAD_OFFSET {
            offset = offset.max(self.obj_radius);
        }
        self.pad_offset = offset;
        Ok(())
    }
}
