//! Soccer push-to-goal environment
//!
//! A gripper-bearing arm must reach the ball and push it across the table
//! into the goal. Physics lives in the injected [`ManipulationHost`]; this
//! type owns sampling, observation assembly and reward evaluation.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use kickbench_core::{
    ActionSpace, ContinuousAction, ContinuousSpace, Environment, EnvironmentConfig,
    ObservationSpace, RLError, Result, Reward, Step, StepInfo, VectorObservation,
};

use crate::composer::{RewardBreakdown, RewardComposer};
use crate::config::SoccerConfig;
use crate::context::{EpisodeContext, TaskConfig};
use crate::host::{Body, EffectorSnapshot, ManipulationHost};
use crate::layout::{self, FRAME_LEN};
use crate::outcome::{classify, SoccerInfo};
use crate::sampler::TaskSampler;
use crate::wrappers::TimeLimit;

/// Action dimensionality: hand delta (3) and gripper command (1)
pub const ACTION_DIM: usize = 4;

/// Soccer task bound to a simulation host
pub struct SoccerEnv<H> {
    host: H,
    config: SoccerConfig,
    sampler: TaskSampler,
    composer: RewardComposer,
    rng: StdRng,
    context: Option<EpisodeContext>,
    prev_frame: [f64; FRAME_LEN],
}

impl<H: ManipulationHost> SoccerEnv<H> {
    /// Create the environment, validating the task configuration
    pub fn new(mut host: H, config: SoccerConfig, env_config: &EnvironmentConfig) -> Result<Self> {
        config.validate()?;
        let initial = config.initial_task();
        host.set_body_position(Body::Goal, initial.target_position)?;
        host.set_object_position(initial.object_init_position)?;

        let sampler = config.sampler()?;
        let composer = RewardComposer::new(config.obj_radius, config.target_radius);
        let rng = match env_config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            host,
            config,
            sampler,
            composer,
            rng,
            context: None,
            prev_frame: [0.0; FRAME_LEN],
        })
    }

    /// Wrap in a [`TimeLimit`] of `max_path_length` steps
    pub fn with_time_limit(self) -> TimeLimit<Self> {
        let max_steps = self.config.max_path_length;
        TimeLimit::new(self, max_steps)
    }

    /// Task configuration
    pub fn config(&self) -> &SoccerConfig {
        &self.config
    }

    /// Context of the running episode, `None` before the first reset
    pub fn context(&self) -> Option<&EpisodeContext> {
        self.context.as_ref()
    }

    /// Underlying simulation host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the simulation host
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Reset onto a caller-supplied task instead of sampling one
    pub fn reset_with_task(&mut self, task: TaskConfig) -> Result<(VectorObservation, StepInfo)> {
        self.host.reset_hand(self.config.hand_init_pos)?;
        self.host.set_body_position(Body::Goal, task.target_position)?;
        self.host.set_object_position(task.object_init_position)?;

        let context = EpisodeContext::capture(task, &self.host);
        debug!(
            object = ?task.object_init_position,
            target = ?task.target_position,
            max_push_distance = context.max_push_distance,
            "episode reset"
        );
        self.context = Some(context);

        let frame = layout::current_frame(&self.host);
        self.prev_frame = frame;
        Ok((self.observe(&frame), StepInfo::default()))
    }

    /// Reward breakdown for an observation and action in the current episode
    pub fn compute_reward(&self, action: &[f64], observation: &[f64]) -> Result<RewardBreakdown> {
        let context = self.require_context()?;
        let effector = EffectorSnapshot::capture(&self.host);
        self.composer.compute(context, &effector, action, observation)
    }

    /// Reward and per-step info for an observation and action
    pub fn evaluate_state(&self, observation: &[f64], action: &[f64]) -> Result<(f64, SoccerInfo)> {
        let context = self.require_context()?;
        let breakdown = self.compute_reward(action, observation)?;
        let outcome = classify(context, &breakdown, observation, self.host.touching_object())?;
        Ok((breakdown.reward, SoccerInfo::new(&breakdown, &outcome)))
    }

    fn require_context(&self) -> Result<&EpisodeContext> {
        self.context
            .as_ref()
            .ok_or_else(|| RLError::Environment("step called before reset".to_string()))
    }

    fn observe(&self, frame: &[f64; FRAME_LEN]) -> VectorObservation {
        let goal = if self.config.partially_observable {
            None
        } else {
            self.context.map(|ctx| ctx.target_position())
        };
        layout::assemble(frame, &self.prev_frame, goal)
    }
}

#[async_trait]
impl<H: ManipulationHost> Environment for SoccerEnv<H> {
    type Observation = VectorObservation;
    type Action = ContinuousAction;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
        let goal_bounds = if self.config.partially_observable {
            None
        } else {
            Some(self.config.goal_bounds())
        };
        Box::new(layout::observation_space(goal_bounds))
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        Box::new(ContinuousSpace::symmetric(ACTION_DIM, 1.0))
    }

    async fn reset(&mut self) -> Result<(Self::Observation, StepInfo)> {
        let task = self.sampler.sample(&mut self.rng)?;
        self.reset_with_task(task)
    }

    async fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>> {
        if action.0.len() != ACTION_DIM {
            return Err(RLError::DimensionMismatch {
                expected: ACTION_DIM,
                actual: action.0.len(),
            });
        }
        if action.0.iter().any(|v| !v.is_finite()) {
            return Err(RLError::InvalidAction(format!(
                "action components must be finite, got {:?}",
                action.0
            )));
        }
        self.require_context()?;

        let action = ContinuousSpace::symmetric(ACTION_DIM, 1.0).clip(&action);
        self.host.step(&action.0)?;

        let frame = layout::current_frame(&self.host);
        let observation = self.observe(&frame);
        self.prev_frame = frame;

        let (reward, soccer_info) = self.evaluate_state(&observation.data, &action.0)?;
        if soccer_info.success > 0.0 {
            debug!(obj_to_target = soccer_info.obj_to_target, "ball reached the goal");
        }

        Ok(Step {
            observation,
            reward: Reward(reward),
            done: false,
            truncated: false,
            info: soccer_info.to_step_info()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SpatialPoint;
    use crate::kinematic::KinematicHost;
    use crate::layout::{GOAL, OBJECT};

    fn env(config: SoccerConfig) -> SoccerEnv<KinematicHost> {
        let host = KinematicHost::from_config(&config);
        SoccerEnv::new(host, config, &EnvironmentConfig::seeded(0)).unwrap()
    }

    #[tokio::test]
    async fn test_reset_places_bodies() {
        let mut env = env(SoccerConfig::default());
        let (obs, _) = env.reset().await.unwrap();

        assert_eq!(obs.data.len(), layout::OBS_LEN);
        assert_eq!(&obs.data[OBJECT], &[0.0, 0.65, 0.03]);
        assert_eq!(&obs.data[GOAL], &[0.0; 3]);
        assert_eq!(env.host().position(Body::Goal), SpatialPoint::new(0.0, 0.85, 0.0));

        let ctx = env.context().unwrap();
        assert_eq!(ctx.init_tcp, SpatialPoint::new(0.0, 0.56, 0.05));
        assert!((ctx.max_push_distance - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_initial_placement_before_reset() {
        let env = env(SoccerConfig::default());
        assert!(env.context().is_none());
        assert_eq!(env.host().position(Body::Goal), SpatialPoint::new(0.0, 0.9, 0.03));
        assert_eq!(env.host().position(Body::Object), SpatialPoint::new(0.0, 0.6, 0.03));
    }

    #[tokio::test]
    async fn test_visible_goal() {
        let config = SoccerConfig {
            partially_observable: false,
            ..SoccerConfig::default()
        };
        let mut env = env(config);
        let (obs, _) = env.reset().await.unwrap();
        assert_eq!(&obs.data[GOAL], &[0.0, 0.85, 0.0]);
        assert!(env.observation_space().contains(&obs));
    }

    #[tokio::test]
    async fn test_step_before_reset_fails() {
        let mut env = env(SoccerConfig::default());
        let result = env.step(ContinuousAction(vec![0.0; 4])).await;
        assert!(matches!(result, Err(RLError::Environment(_))));
    }

    #[tokio::test]
    async fn test_rejects_malformed_actions() {
        let mut env = env(SoccerConfig::default());
        env.reset().await.unwrap();
        assert!(matches!(
            env.step(ContinuousAction(vec![0.0; 3])).await,
            Err(RLError::DimensionMismatch { expected: 4, actual: 3 })
        ));
        assert!(matches!(
            env.step(ContinuousAction(vec![0.0, f64::NAN, 0.0, 0.0])).await,
            Err(RLError::InvalidAction(_))
        ));
    }

    #[tokio::test]
    async fn test_step_reports_info() {
        let mut env = env(SoccerConfig::default());
        env.reset().await.unwrap();
        let step = env.step(ContinuousAction(vec![0.0, 5.0, 0.0, -1.0])).await.unwrap();

        // Clipped to one unit of motion
        assert!((step.observation.data[1] - 0.57).abs() < 1e-9);
        // Previous frame still holds the reset pose
        assert!((step.observation.data[FRAME_LEN + 1] - 0.56).abs() < 1e-9);
        for key in [
            "success",
            "near_object",
            "grasp_success",
            "grasp_reward",
            "in_place_reward",
            "obj_to_target",
            "unscaled_reward",
        ] {
            assert!(step.info.get_f64(key).is_some(), "missing {key}");
        }
        assert_eq!(step.info.get_f64("unscaled_reward"), Some(step.reward.0));
        assert!(!step.done);
    }

    #[tokio::test]
    async fn test_reset_with_supplied_task() {
        let mut env = env(SoccerConfig::default());
        let task = TaskConfig {
            object_init_position: SpatialPoint::new(0.05, 0.7, 0.03),
            object_init_angle: 0.0,
            target_position: SpatialPoint::new(-0.05, 0.9, 0.0),
        };
        let (obs, _) = env.reset_with_task(task).unwrap();
        assert_eq!(&obs.data[OBJECT], &[0.05, 0.7, 0.03]);
        assert_eq!(env.context().unwrap().task, task);
    }
}
