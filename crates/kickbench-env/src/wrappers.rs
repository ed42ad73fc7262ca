//! Environment wrappers for episode limits and reward scaling

use async_trait::async_trait;
use tracing::debug;

use kickbench_core::{ActionSpace, Environment, Episode, ObservationSpace, Result, Reward, Step, StepInfo};

/// Wrapper that rewrites rewards after each step
pub struct RewardWrapper<E, F> {
    /// Inner environment
    pub env: E,
    /// Reward transformation function
    pub reward_fn: F,
}

impl<E, F> RewardWrapper<E, F> {
    /// Wrap `env`, passing every reward through `reward_fn`
    pub fn new(env: E, reward_fn: F) -> Self {
        Self { env, reward_fn }
    }
}

#[async_trait]
impl<E, F> Environment for RewardWrapper<E, F>
where
    E: Environment,
    F: Fn(Reward, &Step<E::Observation>) -> Reward + Send + Sync,
{
    type Observation = E::Observation;
    type Action = E::Action;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
        self.env.observation_space()
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        self.env.action_space()
    }

    async fn reset(&mut self) -> Result<(Self::Observation, StepInfo)> {
        self.env.reset().await
    }

    async fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>> {
        let mut step = self.env.step(action).await?;
        step.reward = (self.reward_fn)(step.reward, &step);
        Ok(step)
    }

    async fn render(&self) -> Result<()> {
        self.env.render().await
    }

    async fn close(&mut self) -> Result<()> {
        self.env.close().await
    }

    fn episode_info(&self) -> Option<Episode> {
        self.env.episode_info()
    }
}

/// Time limit wrapper
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum steps
    pub max_steps: usize,
    /// Current step count
    pub steps: usize,
}

impl<E> TimeLimit<E> {
    /// Create a new time limit wrapper
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            steps: 0,
        }
    }

    /// Inner environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Mutable inner environment
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }
}

#[async_trait]
impl<E> Environment for TimeLimit<E>
where
    E: Environment,
{
    type Observation = E::Observation;
    type Action = E::Action;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation>> {
        self.env.observation_space()
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action>> {
        self.env.action_space()
    }

    async fn reset(&mut self) -> Result<(Self::Observation, StepInfo)> {
        self.steps = 0;
        self.env.reset().await
    }

    async fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>> {
        self.steps += 1;
        let mut step = self.env.step(action).await?;

        if self.steps >= self.max_steps && !step.done {
            debug!(steps = self.steps, "time limit reached");
            step.truncated = true;
            step.done = true;
        }

        Ok(step)
    }

    async fn render(&self) -> Result<()> {
        self.env.render().await
    }

    async fn close(&mut self) -> Result<()> {
        self.env.close().await
    }

    fn episode_info(&self) -> Option<Episode> {
        self.env.episode_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoccerConfig;
    use crate::kinematic::KinematicHost;
    use crate::soccer::SoccerEnv;
    use kickbench_core::{ContinuousAction, EnvironmentConfig, VectorObservation};

    fn soccer(max_path_length: usize) -> SoccerEnv<KinematicHost> {
        let config = SoccerConfig {
            max_path_length,
            ..SoccerConfig::default()
        };
        let host = KinematicHost::from_config(&config);
        SoccerEnv::new(host, config, &EnvironmentConfig::seeded(7)).unwrap()
    }

    fn idle() -> ContinuousAction {
        ContinuousAction(vec![0.0, 0.0, 0.0, -1.0])
    }

    #[tokio::test]
    async fn test_time_limit_truncates() {
        let mut env = soccer(3).with_time_limit();
        env.reset().await.unwrap();

        for _ in 0..2 {
            let step = env.step(idle()).await.unwrap();
            assert!(!step.done && !step.truncated);
        }
        let last = env.step(idle()).await.unwrap();
        assert!(last.done);
        assert!(last.truncated);

        env.reset().await.unwrap();
        assert_eq!(env.steps, 0);
        assert!(!env.step(idle()).await.unwrap().truncated);
    }

    #[tokio::test]
    async fn test_reward_wrapper_scales() {
        let mut plain = soccer(10);
        let mut scaled = RewardWrapper::new(soccer(10), |reward: Reward, _step: &Step<VectorObservation>| {
            reward * 0.1
        });
        plain.reset().await.unwrap();
        scaled.reset().await.unwrap();

        let a = plain.step(idle()).await.unwrap();
        let b = scaled.step(idle()).await.unwrap();
        assert!((b.reward.0 - a.reward.0 * 0.1).abs() < 1e-12);
        // The info keeps the raw value
        assert_eq!(b.info.get_f64("unscaled_reward"), Some(a.reward.0));
    }
}
