//! Observation representations and observation spaces

use rand::Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for observations from an environment
pub trait Observation: Clone + Debug + Send + Sync {
    /// Convert observation to a feature vector
    fn to_vec(&self) -> Vec<f64>;

    /// Get the shape of the observation
    fn shape(&self) -> Vec<usize>;
}

/// Trait for defining observation spaces
pub trait ObservationSpace: Send + Sync {
    /// The type of observations in this space
    type Observation: Observation;

    /// Sample a random observation from the space
    fn sample(&self) -> Self::Observation;

    /// Check if an observation is valid within this space
    fn contains(&self, obs: &Self::Observation) -> bool;

    /// Get the shape of observations in this space
    fn shape(&self) -> Vec<usize>;
}

/// Vector observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorObservation {
    /// The observation data
    pub data: Vec<f64>,
}

impl VectorObservation {
    /// Borrow the raw components
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl Observation for VectorObservation {
    fn to_vec(&self) -> Vec<f64> {
        self.data.clone()
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.data.len()]
    }
}

/// Box observation space
///
/// Bounds may be infinite. Sampling follows the usual box semantics:
/// uniform on bounded dimensions, standard normal on unbounded ones and a
/// shifted exponential on half-bounded ones.
#[derive(Debug, Clone)]
pub struct BoxObservationSpace {
    /// Lower bounds
    pub low: Vec<f64>,
    /// Upper bounds
    pub high: Vec<f64>,
    /// Shape of observations
    pub shape: Vec<usize>,
}

impl BoxObservationSpace {
    /// Create a new box observation space
    pub fn new(low: Vec<f64>, high: Vec<f64>, shape: Vec<usize>) -> crate::Result<Self> {
        let total_size: usize = shape.iter().product();
        if low.len() != total_size || high.len() != total_size {
            return Err(crate::RLError::DimensionMismatch {
                expected: total_size,
                actual: low.len(),
            });
        }
        if let Some(i) = low.iter().zip(&high).position(|(l, h)| l > h) {
            return Err(crate::RLError::InvalidArgument(format!(
                "lower bound exceeds upper bound at index {i}"
            )));
        }
        Ok(Self { low, high, shape })
    }

    /// Sample with a caller-provided random source
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> VectorObservation {
        let data = self
            .low
            .iter()
            .zip(&self.high)
            .map(|(&l, &h)| -> f64 {
                match (l.is_finite(), h.is_finite()) {
                    (true, true) => rng.gen_range(l..=h),
                    (true, false) => {
                        let offset: f64 = Exp1.sample(rng);
                        l + offset
                    }
                    (false, true) => {
                        let offset: f64 = Exp1.sample(rng);
                        h - offset
                    }
                    (false, false) => StandardNormal.sample(rng),
                }
            })
            .collect();
        VectorObservation { data }
    }
}

impl ObservationSpace for BoxObservationSpace {
    type Observation = VectorObservation;

    fn sample(&self) -> Self::Observation {
        self.sample_with(&mut rand::thread_rng())
    }

    fn contains(&self, obs: &Self::Observation) -> bool {
        obs.data.len() == self.low.len() &&
        obs.data.iter()
            .zip(&self.low)
            .zip(&self.high)
            .all(|((x, l), h)| x >= l && x <= h)
    }

    fn shape(&self) -> Vec<usize> {
        self.shape.clone()
    }
}
