//! Soccer push-to-goal manipulation task for Kickbench
//!
//! This crate provides the soccer environment and the pieces it is built from:
//! - Rejection sampling of ball and goal placements
//! - Caging and in-place reward shaping over a [`ManipulationHost`]
//! - Success, proximity and grasp classification
//! - A kinematic host and a scripted policy for tests and demos
//! - Wrappers and a registry of named task presets

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod caging;
pub mod composer;
pub mod config;
pub mod context;
pub mod host;
pub mod kinematic;
pub mod layout;
pub mod outcome;
pub mod policy;
pub mod registry;
pub mod sampler;
pub mod soccer;
pub mod wrappers;

// Re-export the task surface
pub use caging::caging_reward;
pub use composer::{RewardBreakdown, RewardComposer};
pub use config::SoccerConfig;
pub use context::{EpisodeContext, TaskConfig};
pub use host::{Body, EffectorSnapshot, ManipulationHost, SpatialPoint};
pub use kinematic::KinematicHost;
pub use outcome::{classify, Outcome, SoccerInfo};
pub use policy::ScriptedPushPolicy;
pub use registry::{list_tasks, make_env, register_task, task_config, TaskRegistry};
pub use sampler::{TaskSampler, TaskSpace};
pub use soccer::SoccerEnv;
pub use wrappers::{RewardWrapper, TimeLimit};

// Re-export core types
pub use kickbench_core::{
    ContinuousAction, Environment, EnvironmentConfig, Episode, Reward, Step, StepInfo,
    TrackedEnvironment, VectorObservation,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        make_env, KinematicHost, ManipulationHost, ScriptedPushPolicy, SoccerConfig, SoccerEnv,
        TimeLimit,
    };
    pub use kickbench_core::prelude::*;
}
