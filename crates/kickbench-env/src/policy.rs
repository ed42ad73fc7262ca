//! Hand-written push controller for the soccer task

use async_trait::async_trait;
use nalgebra::Vector2;

use kickbench_core::{ContinuousAction, Policy, Result, VectorObservation};

use crate::host::SpatialPoint;
use crate::kinematic::ACTION_SCALE;
use crate::layout::{ObservationView, GOAL, OBS_LEN};

/// Scripted policy: get behind the ball, then drive it along the ball-to-goal line.
///
/// The goal is read from the observation when visible and falls back to the
/// configured target otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedPushPolicy {
    /// Goal used when the observation hides it
    pub target: SpatialPoint,
    /// Distance behind the ball the hand lines up at
    pub standoff: f64,
    /// Off-line distance the hand tolerates while pushing
    pub align_tolerance: f64,
}

impl ScriptedPushPolicy {
    /// Controller pushing toward `target`
    #[must_use]
    pub fn new(target: SpatialPoint) -> Self {
        Self {
            target,
            standoff: 0.04,
            align_tolerance: 0.01,
        }
    }

    fn goal(&self, observation: &[f64]) -> SpatialPoint {
        if observation.len() >= OBS_LEN {
            let goal = SpatialPoint::from_column_slice(&observation[GOAL]);
            if goal != SpatialPoint::zeros() {
                return goal;
            }
        }
        self.target
    }

    /// Action for a raw observation vector
    pub fn action_for(&self, observation: &[f64]) -> Result<ContinuousAction> {
        let view = ObservationView::new(observation)?;
        let hand = view.hand_position().xy();
        let ball = view.object_position().xy();
        let goal = self.goal(observation).xy();

        let to_goal = goal - ball;
        let direction = if to_goal.norm() > f64::EPSILON {
            to_goal.normalize()
        } else {
            Vector2::y()
        };

        // Signed position of the hand along the push line and its distance off it
        let rel = hand - ball;
        let along = rel.dot(&direction);
        let off_line = (rel - direction * along).norm();

        let waypoint = if along < 0.0 && off_line <= self.align_tolerance {
            ball + direction * self.standoff
        } else {
            ball - direction * self.standoff
        };

        let delta = (waypoint - hand) / ACTION_SCALE;
        Ok(ContinuousAction(vec![
            delta.x.clamp(-1.0, 1.0),
            delta.y.clamp(-1.0, 1.0),
            0.0,
            -1.0,
        ]))
    }
}

#[async_trait]
impl Policy for ScriptedPushPolicy {
    type Observation = VectorObservation;
    type Action = ContinuousAction;

    async fn act(&self, observation: &Self::Observation) -> Result<Self::Action> {
        self.action_for(observation.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{HAND, OBJECT};

    fn observation(hand: [f64; 3], ball: [f64; 3]) -> Vec<f64> {
        let mut obs = vec![0.0; OBS_LEN];
        obs[HAND].copy_from_slice(&hand);
        obs[OBJECT].copy_from_slice(&ball);
        obs
    }

    #[test]
    fn test_pushes_when_lined_up() {
        let policy = ScriptedPushPolicy::new(SpatialPoint::new(0.0, 0.85, 0.0));
        let action = policy
            .action_for(&observation([0.0, 0.6, 0.05], [0.0, 0.65, 0.03]))
            .unwrap();
        assert_eq!(action.0, vec![0.0, 1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_repositions_when_off_line() {
        let policy = ScriptedPushPolicy::new(SpatialPoint::new(0.0, 0.85, 0.0));
        let action = policy
            .action_for(&observation([0.1, 0.6, 0.05], [0.0, 0.65, 0.03]))
            .unwrap();
        // Heads back toward the line behind the ball
        assert_eq!(action.0[0], -1.0);
        assert!(action.0[1] > 0.0);
    }

    #[test]
    fn test_prefers_visible_goal() {
        let policy = ScriptedPushPolicy::new(SpatialPoint::new(0.0, 0.85, 0.0));
        let mut obs = observation([0.0, 0.65, 0.05], [0.0, 0.65, 0.03]);
        obs[GOAL].copy_from_slice(&[0.2, 0.65, 0.0]);
        // Goal lies along +x, so the hand first moves to the ball's -x side
        let action = policy.action_for(&obs).unwrap();
        assert_eq!(action.0[0], -1.0);
    }

    #[tokio::test]
    async fn test_policy_trait() {
        let policy = ScriptedPushPolicy::new(SpatialPoint::new(0.0, 0.85, 0.0));
        let obs = VectorObservation {
            data: observation([0.0, 0.6, 0.05], [0.0, 0.65, 0.03]),
        };
        assert_eq!(policy.act(&obs).await.unwrap().0.len(), 4);
        assert!(policy.act(&VectorObservation { data: vec![0.0; 3] }).await.is_err());
    }
}
