//! Action representations and action spaces

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for actions in an RL environment
pub trait Action: Clone + Debug + Send + Sync {
    /// Convert action to a vector representation
    fn to_vec(&self) -> Vec<f64>;
}

/// Trait for defining action spaces
pub trait ActionSpace: Send + Sync {
    /// The type of actions in this space
    type Action: Action;

    /// Sample a random action from the space
    fn sample(&self) -> Self::Action;

    /// Check if an action is valid within this space
    fn contains(&self, action: &Self::Action) -> bool;

    /// Get the dimensionality of the action space
    fn dim(&self) -> Option<usize>;
}

/// Continuous action (e.g., for continuous control)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousAction(pub Vec<f64>);

impl Action for ContinuousAction {
    fn to_vec(&self) -> Vec<f64> {
        self.0.clone()
    }
}

impl From<Vec<f64>> for ContinuousAction {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Continuous action space (box)
#[derive(Debug, Clone)]
pub struct ContinuousSpace {
    /// Lower bounds for each dimension
    pub low: Vec<f64>,
    /// Upper bounds for each dimension
    pub high: Vec<f64>,
}

impl ContinuousSpace {
    /// Create a new continuous action space
    pub fn new(low: Vec<f64>, high: Vec<f64>) -> crate::Result<Self> {
        if low.len() != high.len() {
            return Err(crate::RLError::DimensionMismatch {
                expected: low.len(),
                actual: high.len(),
            });
        }
        Ok(Self { low, high })
    }

    /// Symmetric `[-limit, limit]` box with `dim` dimensions
    #[must_use]
    pub fn symmetric(dim: usize, limit: f64) -> Self {
        Self {
            low: vec![-limit; dim],
            high: vec![limit; dim],
        }
    }

    /// Clip an action into the box, component-wise.
    ///
    /// Components beyond the space dimensionality are left untouched.
    #[must_use]
    pub fn clip(&self, action: &ContinuousAction) -> ContinuousAction {
        let values = action
            .0
            .iter()
            .enumerate()
            .map(|(i, &x)| match (self.low.get(i), self.high.get(i)) {
                (Some(&l), Some(&h)) => x.clamp(l, h),
                _ => x,
            })
            .collect();
        ContinuousAction(values)
    }
}

impl ActionSpace for ContinuousSpace {
    type Action = ContinuousAction;

    fn sample(&self) -> Self::Action {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        let values: Vec<f64> = self.low.iter()
            .zip(&self.high)
            .map(|(l, h)| rng.gen_range(*l..=*h))
            .collect();

        ContinuousAction(values)
    }

    fn contains(&self, action: &Self::Action) -> bool {
        action.0.len() == self.low.len() &&
        action.0.iter()
            .zip(&self.low)
            .zip(&self.high)
            .all(|((x, l), h)| x >= l && x <= h)
    }

    fn dim(&self) -> Option<usize> {
        Some(self.low.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_within_space() {
        let space = ContinuousSpace::symmetric(4, 1.0);
        for _ in 0..100 {
            assert!(space.contains(&space.sample()));
        }
        assert_eq!(space.dim(), Some(4));
    }

    #[test]
    fn test_clip() {
        let space = ContinuousSpace::symmetric(2, 1.0);
        let clipped = space.clip(&ContinuousAction(vec![2.0, -3.0, 5.0]));
        assert_eq!(clipped.0, vec![1.0, -1.0, 5.0]);
    }

    #[test]
    fn test_mismatched_bounds() {
        assert!(ContinuousSpace::new(vec![0.0], vec![1.0, 2.0]).is_err());
    }
}
