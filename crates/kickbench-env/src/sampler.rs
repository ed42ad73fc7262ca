//! Rejection sampling of object and goal placements

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use kickbench_core::{RLError, Result};

use crate::context::TaskConfig;
use crate::host::SpatialPoint;

/// Minimum planar distance between the ball and the goal at reset
pub const MIN_SEPARATION: f64 = 0.15;

/// Object and goal boxes in the first-two-axis plane, with fixed heights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskSpace {
    /// Lower corner of the object box
    pub object_low: [f64; 2],
    /// Upper corner of the object box
    pub object_high: [f64; 2],
    /// Lower corner of the goal box
    pub goal_low: [f64; 2],
    /// Upper corner of the goal box
    pub goal_high: [f64; 2],
    /// Resting height of the ball
    pub object_height: f64,
    /// Resting height of the goal marker
    pub goal_height: f64,
}

impl Default for TaskSpace {
    fn default() -> Self {
        Self {
            object_low: [0.0, 0.65],
            object_high: [0.0, 0.65],
            goal_low: [0.0, 0.85],
            goal_high: [0.0, 0.85],
            object_height: 0.03,
            goal_height: 0.0,
        }
    }
}

impl TaskSpace {
    /// Concatenated `(object, goal)` draw space as low/high vectors
    #[must_use]
    pub fn combined_bounds(&self) -> ([f64; 4], [f64; 4]) {
        (
            [self.object_low[0], self.object_low[1], self.goal_low[0], self.goal_low[1]],
            [self.object_high[0], self.object_high[1], self.goal_high[0], self.goal_high[1]],
        )
    }

    /// Largest planar distance any object/goal pair in the boxes can have
    #[must_use]
    pub fn max_separation(&self) -> f64 {
        (0..2)
            .map(|axis| {
                let a = (self.object_high[axis] - self.goal_low[axis]).abs();
                let b = (self.goal_high[axis] - self.object_low[axis]).abs();
                a.max(b).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Check the boxes are well formed and admit a valid pair
    pub fn validate(&self, min_separation: f64) -> Result<()> {
        let (low, high) = self.combined_bounds();
        let finite = low
            .iter()
            .chain(&high)
            .chain([&self.object_height, &self.goal_height])
            .all(|v| v.is_finite());
        if !finite {
            return Err(RLError::Configuration(
                "task space bounds must be finite".to_string(),
            ));
        }
        if let Some(i) = low.iter().zip(&high).position(|(l, h)| l > h) {
            return Err(RLError::Configuration(format!(
                "task space lower bound exceeds upper bound at index {i}"
            )));
        }
        if let Some(i) = low.iter().zip(&high).position(|(l, h)| !(h - l).is_finite()) {
            return Err(RLError::Configuration(format!(
                "task space extent overflows at index {i}"
            )));
        }
        let reachable = self.max_separation();
        if reachable < min_separation {
            return Err(RLError::Configuration(format!(
                "object and goal boxes are at most {reachable:.4} apart, \
                 below the required separation {min_separation}"
            )));
        }
        Ok(())
    }
}

/// Serialized form of a [`TaskSampler`], checked on the way in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SamplerSettings {
    space: TaskSpace,
    object_init_angle: f64,
    #[serde(default = "default_min_separation")]
    min_separation: f64,
    #[serde(default)]
    max_attempts: Option<usize>,
}

fn default_min_separation() -> f64 {
    MIN_SEPARATION
}

impl TryFrom<SamplerSettings> for TaskSampler {
    type Error = RLError;

    fn try_from(settings: SamplerSettings) -> Result<Self> {
        if !(settings.min_separation.is_finite() && settings.min_separation >= 0.0) {
            return Err(RLError::Configuration(format!(
                "minimum separation must be finite and non-negative, got {}",
                settings.min_separation
            )));
        }
        settings.space.validate(settings.min_separation)?;
        Ok(Self {
            space: settings.space,
            object_init_angle: settings.object_init_angle,
            min_separation: settings.min_separation,
            max_attempts: settings.max_attempts,
        })
    }
}

impl From<TaskSampler> for SamplerSettings {
    fn from(sampler: TaskSampler) -> Self {
        Self {
            space: sampler.space,
            object_init_angle: sampler.object_init_angle,
            min_separation: sampler.min_separation,
            max_attempts: sampler.max_attempts,
        }
    }
}

/// Draws task configurations that respect the minimum separation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SamplerSettings", into = "SamplerSettings")]
pub struct TaskSampler {
    space: TaskSpace,
    object_init_angle: f64,
    min_separation: f64,
    max_attempts: Option<usize>,
}

impl TaskSampler {
    /// Create a sampler, rejecting task spaces that can never succeed
    pub fn new(space: TaskSpace, object_init_angle: f64) -> Result<Self> {
        space.validate(MIN_SEPARATION)?;
        Ok(Self {
            space,
            object_init_angle,
            min_separation: MIN_SEPARATION,
            max_attempts: None,
        })
    }

    /// Give up with [`RLError::SamplingExhausted`] after `attempts` draws.
    ///
    /// Without a cap the sampler keeps drawing until a pair is accepted.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: Option<usize>) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Task space the sampler draws from
    #[must_use]
    pub fn space(&self) -> &TaskSpace {
        &self.space
    }

    /// Draw one accepted configuration
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TaskConfig> {
        self.sample_counted(rng).map(|(task, _)| task)
    }

    /// Draw one accepted configuration and report how many draws it took
    pub fn sample_counted<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(TaskConfig, usize)> {
        let (low, high) = self.space.combined_bounds();
        let mut attempts = 0;

        loop {
            if let Some(cap) = self.max_attempts {
                if attempts >= cap {
                    error!(attempts, "no object/goal pair satisfied the separation constraint");
                    return Err(RLError::SamplingExhausted { attempts });
                }
            }
            attempts += 1;

            let draw: [f64; 4] = std::array::from_fn(|i| rng.gen_range(low[i]..=high[i]));
            let object = SpatialPoint::new(draw[0], draw[1], self.space.object_height);
            let target = SpatialPoint::new(draw[2], draw[3], self.space.goal_height);
            let task = TaskConfig {
                object_init_position: object,
                object_init_angle: self.object_init_angle,
                target_position: target,
            };

            if task.planar_separation() >= self.min_separation {
                debug!(
                    attempts,
                    object = ?task.object_init_position,
                    target = ?task.target_position,
                    "sampled task"
                );
                return Ok((task, attempts));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn randomized() -> TaskSpace {
        TaskSpace {
            object_low: [-0.1, 0.6],
            object_high: [0.1, 0.7],
            goal_low: [-0.1, 0.8],
            goal_high: [0.1, 0.9],
            ..TaskSpace::default()
        }
    }

    #[test]
    fn test_fixed_space_accepts_first_draw() {
        let sampler = TaskSampler::new(TaskSpace::default(), 0.3).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let (task, attempts) = sampler.sample_counted(&mut rng).unwrap();

        assert_eq!(attempts, 1);
        assert_relative_eq!(task.planar_separation(), 0.2, epsilon = 1e-12);
        assert_eq!(task.object_init_position, SpatialPoint::new(0.0, 0.65, 0.03));
        assert_eq!(task.target_position, SpatialPoint::new(0.0, 0.85, 0.0));
        assert_eq!(task.object_init_angle, 0.3);
    }

    #[test]
    fn test_randomized_space_respects_separation() {
        let sampler = TaskSampler::new(randomized(), 0.3).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let task = sampler.sample(&mut rng).unwrap();
            assert!(task.planar_separation() >= MIN_SEPARATION);
            assert!((-0.1..=0.1).contains(&task.target_position.x));
            assert!((0.8..=0.9).contains(&task.target_position.y));
            assert_eq!(task.object_init_position.z, 0.03);
            assert_eq!(task.target_position.z, 0.0);
        }
    }

    #[test]
    fn test_infeasible_space_rejected_at_setup() {
        let space = TaskSpace {
            object_low: [0.0, 0.7],
            object_high: [0.0, 0.7],
            goal_low: [0.0, 0.8],
            goal_high: [0.0, 0.8],
            ..TaskSpace::default()
        };
        assert!(matches!(
            TaskSampler::new(space, 0.0),
            Err(RLError::Configuration(_))
        ));
    }

    #[test]
    fn test_inverted_box_rejected() {
        let space = TaskSpace {
            object_low: [0.1, 0.6],
            object_high: [-0.1, 0.7],
            ..randomized()
        };
        assert!(TaskSampler::new(space, 0.0).is_err());
    }

    #[test]
    fn test_overflowing_extent_rejected() {
        let space = TaskSpace {
            object_low: [-1e308, 0.6],
            object_high: [1e308, 0.7],
            ..randomized()
        };
        assert!(matches!(
            TaskSampler::new(space, 0.0),
            Err(RLError::Configuration(_))
        ));
        let config = crate::config::SoccerConfig {
            task_space: space,
            ..crate::config::SoccerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialized_sampler_is_validated() {
        let sampler = TaskSampler::new(randomized(), 0.3).unwrap();
        let json = serde_json::to_string(&sampler).unwrap();
        let restored: TaskSampler = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sampler);

        let inverted = r#"{
            "space": {
                "object_low": [0.1, 0.6], "object_high": [-0.1, 0.7],
                "goal_low": [-0.1, 0.8], "goal_high": [0.1, 0.9],
                "object_height": 0.03, "goal_height": 0.0
            },
            "object_init_angle": 0.3
        }"#;
        assert!(serde_json::from_str::<TaskSampler>(inverted).is_err());

        let unreachable = json.replace("\"min_separation\":0.15", "\"min_separation\":10.0");
        assert_ne!(unreachable, json);
        assert!(serde_json::from_str::<TaskSampler>(&unreachable).is_err());
    }

    #[test]
    fn test_attempt_cap() {
        // Feasible, but only in a sliver of the draw space
        let space = TaskSpace {
            object_low: [0.0, 0.0],
            object_high: [0.0, 0.0],
            goal_low: [-0.1501, 0.0],
            goal_high: [0.1501, 0.0],
            ..TaskSpace::default()
        };
        let sampler = TaskSampler::new(space, 0.0)
            .unwrap()
            .with_max_attempts(Some(0));
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        assert!(matches!(
            sampler.sample(&mut rng),
            Err(RLError::SamplingExhausted { attempts: 0 })
        ));
    }
}
