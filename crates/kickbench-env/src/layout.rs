//! Fixed layout of the soccer observation vector
//!
//! | Range    | Content                                  |
//! |----------|------------------------------------------|
//! | 0..3     | hand position                            |
//! | 3        | gripper opening                          |
//! | 4..7     | object position                          |
//! | 7..11    | object quaternion                        |
//! | 11..18   | zero padding (second object slot)        |
//! | 18..36   | previous frame of 0..18                  |
//! | 36..39   | goal position, zeroed when hidden        |

use std::ops::Range;

use kickbench_core::{BoxObservationSpace, RLError, Result, VectorObservation};

use crate::host::{Body, ManipulationHost, SpatialPoint};

/// Hand position
pub const HAND: Range<usize> = 0..3;
/// Gripper opening scalar
pub const GRIPPER: usize = 3;
/// Object position
pub const OBJECT: Range<usize> = 4..7;
/// Object orientation quaternion
pub const OBJECT_QUAT: Range<usize> = 7..11;
/// Length of one frame (hand, gripper, padded object slots)
pub const FRAME_LEN: usize = 18;
/// Goal slot
pub const GOAL: Range<usize> = 36..39;
/// Full observation length
pub const OBS_LEN: usize = 39;

/// Pad separation at which the gripper reads as fully open
const GRIPPER_FULL_OPEN: f64 = 0.1;

/// Hand workspace as reported in the observation bounds
const HAND_SPACE_LOW: [f64; 3] = [-0.525, 0.348, -0.0525];
const HAND_SPACE_HIGH: [f64; 3] = [0.525, 1.025, 0.7];

/// Typed read access to the fields the reward reads
#[derive(Debug, Clone, Copy)]
pub struct ObservationView<'a> {
    data: &'a [f64],
}

impl<'a> ObservationView<'a> {
    /// Wrap a raw observation, checking it covers the object slot
    pub fn new(data: &'a [f64]) -> Result<Self> {
        if data.len() < OBJECT.end {
            return Err(RLError::DimensionMismatch {
                expected: OBJECT.end,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// Gripper opening scalar
    #[must_use]
    pub fn gripper_opening(&self) -> f64 {
        self.data[GRIPPER]
    }

    /// Object position
    #[must_use]
    pub fn object_position(&self) -> SpatialPoint {
        SpatialPoint::from_column_slice(&self.data[OBJECT])
    }

    /// Hand position
    #[must_use]
    pub fn hand_position(&self) -> SpatialPoint {
        SpatialPoint::from_column_slice(&self.data[HAND])
    }
}

/// Normalized distance between the pads, clamped to `[0, 1]`
#[must_use]
pub fn gripper_opening<H: ManipulationHost + ?Sized>(host: &H) -> f64 {
    let apart = (host.position(Body::RightPad) - host.position(Body::LeftPad)).norm();
    (apart / GRIPPER_FULL_OPEN).clamp(0.0, 1.0)
}

/// Current frame: hand, gripper opening, object pose, padding
#[must_use]
pub fn current_frame<H: ManipulationHost + ?Sized>(host: &H) -> [f64; FRAME_LEN] {
    let mut frame = [0.0; FRAME_LEN];
    frame[HAND].copy_from_slice(host.position(Body::Hand).as_slice());
    frame[GRIPPER] = gripper_opening(host);
    frame[OBJECT].copy_from_slice(host.position(Body::Object).as_slice());
    frame[OBJECT_QUAT].copy_from_slice(&host.object_quaternion());
    frame
}

/// Stack current frame, previous frame and goal into an observation
#[must_use]
pub fn assemble(
    current: &[f64; FRAME_LEN],
    previous: &[f64; FRAME_LEN],
    goal: Option<SpatialPoint>,
) -> VectorObservation {
    let mut data = Vec::with_capacity(OBS_LEN);
    data.extend_from_slice(current);
    data.extend_from_slice(previous);
    match goal {
        Some(goal) => data.extend_from_slice(goal.as_slice()),
        None => data.extend_from_slice(&[0.0; 3]),
    }
    VectorObservation { data }
}

/// Observation bounds; `goal_bounds` is `None` when the goal is hidden
#[must_use]
pub fn observation_space(goal_bounds: Option<(SpatialPoint, SpatialPoint)>) -> BoxObservationSpace {
    let mut frame_low = Vec::with_capacity(FRAME_LEN);
    frame_low.extend_from_slice(&HAND_SPACE_LOW);
    frame_low.push(-1.0);
    frame_low.extend_from_slice(&[f64::NEG_INFINITY; FRAME_LEN - 4]);

    let mut frame_high = Vec::with_capacity(FRAME_LEN);
    frame_high.extend_from_slice(&HAND_SPACE_HIGH);
    frame_high.push(1.0);
    frame_high.extend_from_slice(&[f64::INFINITY; FRAME_LEN - 4]);

    let (goal_low, goal_high) = goal_bounds.unwrap_or((SpatialPoint::zeros(), SpatialPoint::zeros()));

    let low = [frame_low.as_slice(), frame_low.as_slice(), goal_low.as_slice()].concat();
    let high = [frame_high.as_slice(), frame_high.as_slice(), goal_high.as_slice()].concat();
    BoxObservationSpace {
        low,
        high,
        shape: vec![OBS_LEN],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic::KinematicHost;
    use kickbench_core::ObservationSpace;

    fn host() -> KinematicHost {
        let mut host = KinematicHost::new(
            SpatialPoint::new(-0.5, 0.40, 0.05),
            SpatialPoint::new(0.5, 1.0, 0.5),
            0.013,
        );
        host.reset_hand(SpatialPoint::new(0.0, 0.56, 0.05)).unwrap();
        host.set_object_position(SpatialPoint::new(0.0, 0.65, 0.03)).unwrap();
        host
    }

    #[test]
    fn test_frame_layout() {
        let host = host();
        let frame = current_frame(&host);
        let obs = assemble(&frame, &frame, Some(SpatialPoint::new(0.0, 0.85, 0.0)));

        assert_eq!(obs.data.len(), OBS_LEN);
        let view = ObservationView::new(&obs.data).unwrap();
        assert_eq!(view.object_position(), SpatialPoint::new(0.0, 0.65, 0.03));
        assert_eq!(view.hand_position(), SpatialPoint::new(0.0, 0.56, 0.05));
        assert_eq!(view.gripper_opening(), 1.0);
        assert_eq!(&obs.data[OBJECT_QUAT], &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(&obs.data[GOAL], &[0.0, 0.85, 0.0]);
        assert_eq!(&obs.data[..FRAME_LEN], &obs.data[FRAME_LEN..2 * FRAME_LEN]);
    }

    #[test]
    fn test_hidden_goal_is_zeroed() {
        let frame = current_frame(&host());
        let obs = assemble(&frame, &frame, None);
        assert_eq!(&obs.data[GOAL], &[0.0; 3]);

        let space = observation_space(None);
        assert!(space.contains(&obs));
    }

    #[test]
    fn test_short_observation_rejected() {
        assert!(ObservationView::new(&[0.0; 6]).is_err());
        assert!(ObservationView::new(&[0.0; 7]).is_ok());
    }
}
