//! Final reward from in-place progress and grasp quality

use serde::{Deserialize, Serialize};

use kickbench_core::shaping::{assert_unit_interval, tolerance, Sigmoid};
use kickbench_core::Result;

use crate::caging::caging_reward;
use crate::config::{OBJ_RADIUS, TARGET_RADIUS};
use crate::context::EpisodeContext;
use crate::host::{EffectorSnapshot, SpatialPoint};
use crate::layout::ObservationView;

/// Per-axis weights of the progress norm; the first axis counts triple
pub const AXIS_WEIGHTS: [f64; 3] = [3.0, 1.0, 1.0];
/// Distance before the goal, along the second axis, where the goal line sits
pub const GOAL_LINE_OFFSET: f64 = 0.1;
/// Lateral offset from the goal beyond which crossing the goal line is penalized
pub const LATERAL_TOLERANCE: f64 = 0.10;
/// Weight of the grasp quality term
pub const GRASP_WEIGHT: f64 = 3.0;
/// Weight of the in-place term
pub const IN_PLACE_WEIGHT: f64 = 6.5;
/// Flat reward once the object is inside the goal
pub const SUCCESS_REWARD: f64 = 10.0;

/// Reward and the sub-terms it was built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Final scalar reward
    pub reward: f64,
    /// Euclidean distance from tool center point to object
    pub tcp_to_obj: f64,
    /// Gripper opening read from the observation
    pub tcp_opened: f64,
    /// Unweighted distance from object to target
    pub target_to_obj: f64,
    /// Caging and gripping score
    pub grasp_quality: f64,
    /// Progress toward the target after the goal-line penalty
    pub in_place: f64,
}

fn weighted_norm(delta: SpatialPoint) -> f64 {
    delta
        .iter()
        .zip(AXIS_WEIGHTS)
        .map(|(d, w)| (d * w).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Computes [`RewardBreakdown`]s for the soccer task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardComposer {
    obj_radius: f64,
    target_radius: f64,
}

impl Default for RewardComposer {
    fn default() -> Self {
        Self::new(OBJ_RADIUS, TARGET_RADIUS)
    }
}

impl RewardComposer {
    /// Composer for a ball of `obj_radius` and a goal of `target_radius`
    #[must_use]
    pub fn new(obj_radius: f64, target_radius: f64) -> Self {
        Self {
            obj_radius,
            target_radius,
        }
    }

    /// Progress toward the target in `[0, 1]`, including the goal-line penalty
    pub fn in_place(&self, ctx: &EpisodeContext, object: SpatialPoint) -> Result<f64> {
        let target = ctx.target_position();
        let target_to_obj = weighted_norm(object - target);
        // Margin grows with how far the object has already been moved
        let obj_to_init = weighted_norm(object - ctx.object_init_position());

        let mut in_place = tolerance(
            target_to_obj,
            (0.0, self.target_radius),
            obj_to_init,
            Sigmoid::LongTail,
        )?;

        let goal_line = target.y - GOAL_LINE_OFFSET;
        if object.y > goal_line && (object.x - target.x).abs() > LATERAL_TOLERANCE {
            let overshoot = (object.y - goal_line) / (1.0 - goal_line);
            in_place = (in_place - 2.0 * overshoot).clamp(0.0, 1.0);
        }
        assert_unit_interval("in place", in_place);
        Ok(in_place)
    }

    /// Reward for one step.
    ///
    /// # Errors
    ///
    /// Fails when the observation is too short to hold the object position.
    ///
    /// # Panics
    ///
    /// Panics if a shaping term leaves `[0, 1]`.
    pub fn compute(
        &self,
        ctx: &EpisodeContext,
        effector: &EffectorSnapshot,
        action: &[f64],
        observation: &[f64],
    ) -> Result<RewardBreakdown> {
        let view = ObservationView::new(observation)?;
        let object = view.object_position();
        let tcp_opened = view.gripper_opening();

        let tcp_to_obj = (object - effector.tcp).norm();
        let target_to_obj = (object - ctx.target_position()).norm();

        let in_place = self.in_place(ctx, object)?;
        let grasp_quality = caging_reward(ctx, effector, action, object, self.obj_radius)?;

        let reward = if target_to_obj < self.target_radius {
            SUCCESS_REWARD
        } else {
            GRASP_WEIGHT * grasp_quality + IN_PLACE_WEIGHT * in_place
        };

        Ok(RewardBreakdown {
            reward,
            tcp_to_obj,
            tcp_opened,
            target_to_obj,
            grasp_quality,
            in_place,
        })
    }
}
