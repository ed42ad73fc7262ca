//! Core reinforcement learning traits and types for Kickbench
//!
//! This crate provides the environment-agnostic abstractions shared by the
//! Kickbench tasks, together with the bounded reward shaping primitives
//! (tolerance curves and fuzzy conjunction) the task rewards are built from.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod environment;
pub mod error;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod shaping;

// Re-export core traits and types
pub use action::{Action, ActionSpace, ContinuousAction, ContinuousSpace};
pub use environment::{Environment, EnvironmentConfig, Episode, Step, StepInfo, TrackedEnvironment};
pub use error::{RLError, Result};
pub use observation::{BoxObservationSpace, Observation, ObservationSpace, VectorObservation};
pub use policy::{EpsilonGreedy, Policy};
pub use reward::Reward;
pub use shaping::{hamacher_product, tolerance, tolerance_with, Sigmoid};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionSpace, Environment, Observation, ObservationSpace, Policy, Reward, Result,
        Step,
    };
}
