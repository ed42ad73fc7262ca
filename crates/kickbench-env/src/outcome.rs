//! Success, proximity and grasp flags reported with every step

use serde::{Deserialize, Serialize};

use kickbench_core::{Result, StepInfo};

use crate::composer::RewardBreakdown;
use crate::context::EpisodeContext;
use crate::layout::ObservationView;

/// Object-to-target distance at or below which the episode counts as solved
pub const SUCCESS_DISTANCE: f64 = 0.07;
/// Tool-center-point-to-object distance at or below which the hand is near
pub const NEAR_OBJECT_DISTANCE: f64 = 0.03;
/// Height above its initial rest the object must reach for a grasp
pub const LIFT_THRESHOLD: f64 = 0.02;

/// Boolean outcomes encoded as `0.0` / `1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Object is inside the goal
    pub success: f64,
    /// Hand is close to the object
    pub near_object: f64,
    /// Object is touched, gripper open reading positive, and lifted
    pub grasp_success: f64,
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Derive the outcome flags for a step
pub fn classify(
    ctx: &EpisodeContext,
    breakdown: &RewardBreakdown,
    observation: &[f64],
    touching_object: bool,
) -> Result<Outcome> {
    let object = ObservationView::new(observation)?.object_position();
    let lifted = object.z - LIFT_THRESHOLD > ctx.object_init_position().z;

    Ok(Outcome {
        success: flag(breakdown.target_to_obj <= SUCCESS_DISTANCE),
        near_object: flag(breakdown.tcp_to_obj <= NEAR_OBJECT_DISTANCE),
        grasp_success: flag(touching_object && breakdown.tcp_opened > 0.0 && lifted),
    })
}

/// Per-step info as reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoccerInfo {
    /// Object is inside the goal
    pub success: f64,
    /// Hand is close to the object
    pub near_object: f64,
    /// Object is grasped and lifted
    pub grasp_success: f64,
    /// Caging and gripping score
    pub grasp_reward: f64,
    /// In-place score
    pub in_place_reward: f64,
    /// Unweighted object-to-target distance
    pub obj_to_target: f64,
    /// Reward before any wrapper scaling
    pub unscaled_reward: f64,
}

impl SoccerInfo {
    /// Combine the reward breakdown with its outcome
    #[must_use]
    pub fn new(breakdown: &RewardBreakdown, outcome: &Outcome) -> Self {
        Self {
            success: outcome.success,
            near_object: outcome.near_object,
            grasp_success: outcome.grasp_success,
            grasp_reward: breakdown.grasp_quality,
            in_place_reward: breakdown.in_place,
            obj_to_target: breakdown.target_to_obj,
            unscaled_reward: breakdown.reward,
        }
    }

    /// Convert into the generic step info map
    pub fn to_step_info(&self) -> Result<StepInfo> {
        StepInfo::from_serializable(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TaskConfig;
    use crate::host::{EffectorSnapshot, SpatialPoint};

    fn context() -> EpisodeContext {
        EpisodeContext::new(
            TaskConfig {
                object_init_position: SpatialPoint::new(0.0, 0.65, 0.03),
                object_init_angle: 0.3,
                target_position: SpatialPoint::new(0.0, 0.85, 0.0),
            },
            EffectorSnapshot {
                tcp: SpatialPoint::new(0.0, 0.56, 0.05),
                left_pad: SpatialPoint::new(0.0, 0.61, 0.05),
                right_pad: SpatialPoint::new(0.0, 0.51, 0.05),
            },
        )
    }

    fn breakdown(target_to_obj: f64, tcp_to_obj: f64, tcp_opened: f64) -> RewardBreakdown {
        RewardBreakdown {
            reward: 0.0,
            tcp_to_obj,
            tcp_opened,
            target_to_obj,
            grasp_quality: 0.0,
            in_place: 0.0,
        }
    }

    fn observation(z: f64) -> Vec<f64> {
        let mut obs = vec![0.0; crate::layout::OBS_LEN];
        obs[crate::layout::OBJECT].copy_from_slice(&[0.0, 0.65, z]);
        obs
    }

    #[test]
    fn test_success_boundary() {
        let ctx = context();
        let at = classify(&ctx, &breakdown(0.07, 1.0, 0.0), &observation(0.03), false).unwrap();
        let beyond = classify(&ctx, &breakdown(0.070_000_1, 1.0, 0.0), &observation(0.03), false).unwrap();
        assert_eq!(at.success, 1.0);
        assert_eq!(beyond.success, 0.0);
    }

    #[test]
    fn test_near_object_boundary() {
        let ctx = context();
        let near = classify(&ctx, &breakdown(1.0, 0.03, 0.0), &observation(0.03), false).unwrap();
        let far = classify(&ctx, &breakdown(1.0, 0.031, 0.0), &observation(0.03), false).unwrap();
        assert_eq!(near.near_object, 1.0);
        assert_eq!(far.near_object, 0.0);
    }

    #[test]
    fn test_grasp_requires_touch_opening_and_lift() {
        let ctx = context();
        let lifted = observation(0.06);
        let resting = observation(0.045);

        let grasped = classify(&ctx, &breakdown(1.0, 0.0, 0.5), &lifted, true).unwrap();
        assert_eq!(grasped.grasp_success, 1.0);

        for (obs, touching, opened) in [
            (&lifted, false, 0.5),
            (&lifted, true, 0.0),
            (&resting, true, 0.5),
        ] {
            let outcome = classify(&ctx, &breakdown(1.0, 0.0, opened), obs, touching).unwrap();
            assert_eq!(outcome.grasp_success, 0.0);
        }
    }

    #[test]
    fn test_info_fields() {
        let mut b = breakdown(0.05, 0.01, 1.0);
        b.reward = 10.0;
        b.grasp_quality = 0.25;
        b.in_place = 1.0;
        let outcome = classify(&context(), &b, &observation(0.03), false).unwrap();
        let info = SoccerInfo::new(&b, &outcome).to_step_info().unwrap();

        assert_eq!(info.get_f64("success"), Some(1.0));
        assert_eq!(info.get_f64("near_object"), Some(1.0));
        assert_eq!(info.get_f64("grasp_success"), Some(0.0));
        assert_eq!(info.get_f64("grasp_reward"), Some(0.25));
        assert_eq!(info.get_f64("in_place_reward"), Some(1.0));
        assert_eq!(info.get_f64("obj_to_target"), Some(0.05));
        assert_eq!(info.get_f64("unscaled_reward"), Some(10.0));
    }
}
