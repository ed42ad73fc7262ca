//! Soccer task configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use kickbench_core::{RLError, Result};

use crate::caging::PAD_SUCCESS_MARGIN;
use crate::context::TaskConfig;
use crate::host::SpatialPoint;
use crate::sampler::{TaskSampler, TaskSpace, MIN_SEPARATION};

/// Collision radius of the ball
pub const OBJ_RADIUS: f64 = 0.013;
/// Acceptance radius of the goal
pub const TARGET_RADIUS: f64 = 0.07;

/// Full configuration of a soccer task instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoccerConfig {
    /// Collision radius of the ball
    pub obj_radius: f64,
    /// Acceptance radius of the goal
    pub target_radius: f64,
    /// Boxes the object and goal are drawn from on reset
    pub task_space: TaskSpace,
    /// Object pose before the first reset
    pub obj_init_pos: SpatialPoint,
    /// Object yaw at reset
    pub obj_init_angle: f64,
    /// Hand position the manipulator returns to on reset
    pub hand_init_pos: SpatialPoint,
    /// Goal before the first reset
    pub goal: SpatialPoint,
    /// Lower corner of the hand workspace
    pub hand_low: SpatialPoint,
    /// Upper corner of the hand workspace
    pub hand_high: SpatialPoint,
    /// Hide the goal from the observation
    pub partially_observable: bool,
    /// Steps per episode before truncation
    pub max_path_length: usize,
    /// Optional cap on rejection sampling draws; unbounded when `None`
    pub max_sampling_attempts: Option<usize>,
}

impl Default for SoccerConfig {
    fn default() -> Self {
        Self {
            obj_radius: OBJ_RADIUS,
            target_radius: TARGET_RADIUS,
            task_space: TaskSpace::default(),
            obj_init_pos: SpatialPoint::new(0.0, 0.6, 0.03),
            obj_init_angle: 0.3,
            hand_init_pos: SpatialPoint::new(0.0, 0.56, 0.05),
            goal: SpatialPoint::new(0.0, 0.9, 0.03),
            hand_low: SpatialPoint::new(-0.5, 0.40, 0.05),
            hand_high: SpatialPoint::new(0.5, 1.0, 0.5),
            partially_observable: true,
            max_path_length: 500,
            max_sampling_attempts: None,
        }
    }
}

impl SoccerConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject configurations under which the task cannot be solved or sampled
    pub fn validate(&self) -> Result<()> {
        if !(self.obj_radius > 0.0 && self.target_radius > 0.0) {
            return Err(RLError::Configuration(format!(
                "radii must be positive, got object {} and target {}",
                self.obj_radius, self.target_radius
            )));
        }
        if self.obj_radius >= self.target_radius {
            return Err(RLError::Configuration(format!(
                "object radius {} must be smaller than target radius {}",
                self.obj_radius, self.target_radius
            )));
        }
        if self.obj_radius >= PAD_SUCCESS_MARGIN {
            return Err(RLError::Configuration(format!(
                "object radius {} must be smaller than the pad caging window {PAD_SUCCESS_MARGIN}",
                self.obj_radius
            )));
        }
        let points = [
            self.obj_init_pos,
            self.hand_init_pos,
            self.goal,
            self.hand_low,
            self.hand_high,
        ];
        if !points.iter().all(|p| p.iter().all(|v| v.is_finite())) || !self.obj_init_angle.is_finite() {
            return Err(RLError::Configuration(
                "initial poses and hand bounds must be finite".to_string(),
            ));
        }
        if self.hand_low.iter().zip(self.hand_high.iter()).any(|(l, h)| l > h) {
            return Err(RLError::Configuration(
                "hand lower bound exceeds upper bound".to_string(),
            ));
        }
        if self.max_path_length == 0 {
            return Err(RLError::Configuration(
                "max_path_length must be at least 1".to_string(),
            ));
        }
        self.task_space.validate(MIN_SEPARATION)
    }

    /// Sampler for this configuration
    pub fn sampler(&self) -> Result<TaskSampler> {
        Ok(TaskSampler::new(self.task_space, self.obj_init_angle)?
            .with_max_attempts(self.max_sampling_attempts))
    }

    /// Task before any reset has happened
    #[must_use]
    pub fn initial_task(&self) -> TaskConfig {
        TaskConfig {
            object_init_position: self.obj_init_pos,
            object_init_angle: self.obj_init_angle,
            target_position: self.goal,
        }
    }

    /// Goal box in world coordinates
    #[must_use]
    pub fn goal_bounds(&self) -> (SpatialPoint, SpatialPoint) {
        let space = &self.task_space;
        (
            SpatialPoint::new(space.goal_low[0], space.goal_low[1], space.goal_height),
            SpatialPoint::new(space.goal_high[0], space.goal_high[1], space.goal_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        SoccerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SoccerConfig::from_json_str(
            r#"{ "max_path_length": 200, "max_sampling_attempts": 1000 }"#,
        )
        .unwrap();
        assert_eq!(config.max_path_length, 200);
        assert_eq!(config.max_sampling_attempts, Some(1000));
        assert_eq!(config.obj_radius, OBJ_RADIUS);
        assert_eq!(config.task_space, TaskSpace::default());
    }

    #[test]
    fn test_rejects_unsolvable_radii() {
        let config = SoccerConfig {
            obj_radius: 0.08,
            ..SoccerConfig::default()
        };
        assert!(matches!(config.validate(), Err(RLError::Configuration(_))));

        let config = SoccerConfig {
            target_radius: -1.0,
            ..SoccerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_infeasible_task_space() {
        let json = r#"{
            "task_space": {
                "object_low": [0.0, 0.8], "object_high": [0.0, 0.8],
                "goal_low": [0.0, 0.85], "goal_high": [0.0, 0.85],
                "object_height": 0.03, "goal_height": 0.0
            }
        }"#;
        assert!(matches!(
            SoccerConfig::from_json_str(json),
            Err(RLError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "partially_observable": false }}"#).unwrap();
        let config = SoccerConfig::from_json_file(file.path()).unwrap();
        assert!(!config.partially_observable);

        assert!(matches!(
            SoccerConfig::from_json_file("/nonexistent/soccer.json"),
            Err(RLError::Io(_))
        ));
        assert!(matches!(
            SoccerConfig::from_json_str("{ not json"),
            Err(RLError::Serialization(_))
        ));
    }
}
