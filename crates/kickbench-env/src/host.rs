//! Interface to the simulation that owns the rigid bodies
//!
//! The reward and sampling code never steps physics itself. It talks to a
//! [`ManipulationHost`], which answers body position queries, reports
//! contacts and places bodies on reset.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use kickbench_core::Result;

/// World-space position of a rigid body
pub type SpatialPoint = Vector3<f64>;

/// Bodies the soccer task queries or places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    /// Manipulator hand (mocap-driven end effector)
    Hand,
    /// Left gripper pad
    LeftPad,
    /// Right gripper pad
    RightPad,
    /// The ball being pushed
    Object,
    /// Goal marker body
    Goal,
}

impl Body {
    /// Body name as it appears in the scene description
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Hand => "hand",
            Self::LeftPad => "leftpad",
            Self::RightPad => "rightpad",
            Self::Object => "soccer_ball",
            Self::Goal => "goal_whole",
        }
    }
}

/// Narrow capability interface of a manipulation episode host
pub trait ManipulationHost: Send + Sync {
    /// Center-of-mass position of a body
    fn position(&self, body: Body) -> SpatialPoint;

    /// Tool center point: the effective end-effector reference
    fn tcp_center(&self) -> SpatialPoint;

    /// Object orientation as an `(x, y, z, w)` quaternion
    fn object_quaternion(&self) -> [f64; 4];

    /// Whether the gripper is in contact with the object
    fn touching_object(&self) -> bool;

    /// Move the hand back to its initial pose and open the gripper
    fn reset_hand(&mut self, hand_init_pos: SpatialPoint) -> Result<()>;

    /// Teleport a body, used for the goal marker
    fn set_body_position(&mut self, body: Body, position: SpatialPoint) -> Result<()>;

    /// Place the free object at rest at `position`
    fn set_object_position(&mut self, position: SpatialPoint) -> Result<()>;

    /// Apply an already-clipped action and advance the simulation
    fn step(&mut self, action: &[f64]) -> Result<()>;
}

/// Gripper surfaces captured once per step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectorSnapshot {
    /// Tool center point
    pub tcp: SpatialPoint,
    /// Left pad position
    pub left_pad: SpatialPoint,
    /// Right pad position
    pub right_pad: SpatialPoint,
}

impl EffectorSnapshot {
    /// Read the current effector surfaces from a host
    pub fn capture<H: ManipulationHost + ?Sized>(host: &H) -> Self {
        Self {
            tcp: host.tcp_center(),
            left_pad: host.position(Body::LeftPad),
            right_pad: host.position(Body::RightPad),
        }
    }
}

impl<H: ManipulationHost + ?Sized> ManipulationHost for Box<H> {
    fn position(&self, body: Body) -> SpatialPoint {
        (**self).position(body)
    }

    fn tcp_center(&self) -> SpatialPoint {
        (**self).tcp_center()
    }

    fn object_quaternion(&self) -> [f64; 4] {
        (**self).object_quaternion()
    }

    fn touching_object(&self) -> bool {
        (**self).touching_object()
    }

    fn reset_hand(&mut self, hand_init_pos: SpatialPoint) -> Result<()> {
        (**self).reset_hand(hand_init_pos)
    }

    fn set_body_position(&mut self, body: Body, position: SpatialPoint) -> Result<()> {
        (**self).set_body_position(body, position)
    }

    fn set_object_position(&mut self, position: SpatialPoint) -> Result<()> {
        (**self).set_object_position(position)
    }

    fn step(&mut self, action: &[f64]) -> Result<()> {
        (**self).step(action)
    }
}
