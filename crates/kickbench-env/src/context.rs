//! Per-episode task configuration and cached initial poses

use serde::{Deserialize, Serialize};

use crate::host::{EffectorSnapshot, ManipulationHost, SpatialPoint};

/// Object and goal placement for one episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Where the ball rests at the start of the episode
    pub object_init_position: SpatialPoint,
    /// Initial yaw of the ball
    pub object_init_angle: f64,
    /// Center of the goal region
    pub target_position: SpatialPoint,
}

impl TaskConfig {
    /// Distance between object and goal in the first-two-axis plane
    #[must_use]
    pub fn planar_separation(&self) -> f64 {
        (self.object_init_position.xy() - self.target_position.xy()).norm()
    }
}

/// Read-only state captured at reset and consumed by every reward call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeContext {
    /// Task placement for this episode
    pub task: TaskConfig,
    /// Tool center point right after the hand reset
    pub init_tcp: SpatialPoint,
    /// Left pad right after the hand reset
    pub init_left_pad: SpatialPoint,
    /// Right pad right after the hand reset
    pub init_right_pad: SpatialPoint,
    /// Planar distance the object has to travel to reach the goal
    pub max_push_distance: f64,
}

impl EpisodeContext {
    /// Build a context from a task and the effector pose at reset
    #[must_use]
    pub fn new(task: TaskConfig, initial: EffectorSnapshot) -> Self {
        Self {
            task,
            init_tcp: initial.tcp,
            init_left_pad: initial.left_pad,
            init_right_pad: initial.right_pad,
            max_push_distance: task.planar_separation(),
        }
    }

    /// Snapshot the host's effector after it has been reset for `task`
    pub fn capture<H: ManipulationHost + ?Sized>(task: TaskConfig, host: &H) -> Self {
        Self::new(task, EffectorSnapshot::capture(host))
    }

    /// Object position at the start of the episode
    #[must_use]
    pub fn object_init_position(&self) -> SpatialPoint {
        self.task.object_init_position
    }

    /// Goal center
    #[must_use]
    pub fn target_position(&self) -> SpatialPoint {
        self.task.target_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_max_push_distance_ignores_height() {
        let task = TaskConfig {
            object_init_position: SpatialPoint::new(0.0, 0.65, 0.03),
            object_init_angle: 0.3,
            target_position: SpatialPoint::new(0.0, 0.85, 0.0),
        };
        let snapshot = EffectorSnapshot {
            tcp: SpatialPoint::new(0.0, 0.56, 0.05),
            left_pad: SpatialPoint::new(0.0, 0.61, 0.05),
            right_pad: SpatialPoint::new(0.0, 0.51, 0.05),
        };
        let ctx = EpisodeContext::new(task, snapshot);
        assert_relative_eq!(ctx.max_push_distance, 0.2, epsilon = 1e-12);
        assert_eq!(ctx.init_left_pad, snapshot.left_pad);
    }
}
