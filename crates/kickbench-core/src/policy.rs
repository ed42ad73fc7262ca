//! Policy abstractions for action selection

use async_trait::async_trait;

use crate::{Action, ActionSpace, Observation};

/// Core policy trait for selecting actions
#[async_trait]
pub trait Policy: Send + Sync {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;

    /// Select an action given an observation
    async fn act(&self, observation: &Self::Observation) -> crate::Result<Self::Action>;

    /// Update the policy (for learnable policies)
    async fn update(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

/// Epsilon-greedy policy wrapper
pub struct EpsilonGreedy<P, A> {
    /// Base policy
    pub policy: P,
    /// Exploration rate
    pub epsilon: f64,
    /// Action space for random sampling
    pub action_space: A,
}

impl<P, A> EpsilonGreedy<P, A> {
    /// Create a new epsilon-greedy policy
    pub fn new(policy: P, epsilon: f64, action_space: A) -> Self {
        Self {
            policy,
            epsilon: epsilon.clamp(0.0, 1.0),
            action_space,
        }
    }

    /// Set the exploration rate
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }
}

#[async_trait]
impl<P, A> Policy for EpsilonGreedy<P, A>
where
    P: Policy,
    A: ActionSpace<Action = P::Action> + Send + Sync,
{
    type Observation = P::Observation;
    type Action = P::Action;

    async fn act(&self, observation: &Self::Observation) -> crate::Result<Self::Action> {
        use rand::Rng;
        let explore = rand::thread_rng().gen::<f64>() < self.epsilon;

        if explore {
            Ok(self.action_space.sample())
        } else {
            self.policy.act(observation).await
        }
    }

    async fn update(&mut self) -> crate::Result<()> {
        self.policy.update().await
    }
}
