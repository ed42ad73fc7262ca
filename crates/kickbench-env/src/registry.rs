//! Named task presets for easy environment creation

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use kickbench_core::{EnvironmentConfig, RLError, Result};

use crate::config::SoccerConfig;
use crate::host::ManipulationHost;
use crate::sampler::TaskSpace;
use crate::soccer::SoccerEnv;

/// Preset with a fixed ball and goal
pub const SOCCER_V2: &str = "soccer-v2";
/// Preset drawing ball and goal from boxes on every reset
pub const SOCCER_V2_RANDOMIZED: &str = "soccer-v2-randomized";

lazy_static::lazy_static! {
    static ref REGISTRY: Arc<Mutex<TaskRegistry>> = Arc::new(Mutex::new(TaskRegistry::with_presets()));
}

/// Registry of named soccer task configurations
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, SoccerConfig>,
}

impl TaskRegistry {
    /// Registry holding the built-in presets
    #[must_use]
    pub fn with_presets() -> Self {
        let mut registry = Self::default();
        registry.tasks.insert(SOCCER_V2.to_string(), SoccerConfig::default());
        registry.tasks.insert(
            SOCCER_V2_RANDOMIZED.to_string(),
            SoccerConfig {
                task_space: TaskSpace {
                    object_low: [-0.1, 0.6],
                    object_high: [0.1, 0.7],
                    goal_low: [-0.1, 0.8],
                    goal_high: [0.1, 0.9],
                    ..TaskSpace::default()
                },
                ..SoccerConfig::default()
            },
        );
        registry
    }

    /// Register a task, validating it first; replaces any task of the same name
    pub fn register(&mut self, name: impl Into<String>, config: SoccerConfig) -> Result<()> {
        config.validate()?;
        let name = name.into();
        debug!(%name, "task registered");
        self.tasks.insert(name, config);
        Ok(())
    }

    /// Configuration of a registered task
    pub fn get(&self, name: &str) -> Result<SoccerConfig> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| RLError::Environment(format!("Unknown task: {name}")))
    }

    /// Registered task names, sorted
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.tasks.keys().cloned().collect()
    }
}

fn registry() -> MutexGuard<'static, TaskRegistry> {
    // Entries are validated before insertion, so a poisoned lock still holds usable data
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Register a task globally
pub fn register_task(name: impl Into<String>, config: SoccerConfig) -> Result<()> {
    registry().register(name, config)
}

/// Configuration of a globally registered task
pub fn task_config(name: &str) -> Result<SoccerConfig> {
    registry().get(name)
}

/// Globally registered task names
#[must_use]
pub fn list_tasks() -> Vec<String> {
    registry().list()
}

/// Create a registered task on top of `host`
pub fn make_env<H: ManipulationHost>(
    name: &str,
    host: H,
    env_config: &EnvironmentConfig,
) -> Result<SoccerEnv<H>> {
    let mut config = task_config(name)?;
    if let Some(max_steps) = env_config.max_steps {
        config.max_path_length = max_steps;
    }
    SoccerEnv::new(host, config, env_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic::KinematicHost;

    #[test]
    fn test_presets_listed() {
        let names = list_tasks();
        assert!(names.contains(&SOCCER_V2.to_string()));
        assert!(names.contains(&SOCCER_V2_RANDOMIZED.to_string()));
    }

    #[test]
    fn test_presets_are_valid() {
        let registry = TaskRegistry::with_presets();
        for name in registry.list() {
            registry.get(&name).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn test_unknown_task() {
        assert!(matches!(task_config("basketball-v2"), Err(RLError::Environment(_))));
    }

    #[test]
    fn test_register_validates() {
        let bad = SoccerConfig {
            max_path_length: 0,
            ..SoccerConfig::default()
        };
        assert!(register_task("soccer-broken", bad).is_err());
        assert!(task_config("soccer-broken").is_err());

        let short = SoccerConfig {
            max_path_length: 50,
            ..SoccerConfig::default()
        };
        register_task("soccer-short", short).unwrap();
        assert_eq!(task_config("soccer-short").unwrap().max_path_length, 50);
    }

    #[test]
    fn test_make_env_applies_step_limit() {
        let config = task_config(SOCCER_V2).unwrap();
        let host = KinematicHost::from_config(&config);
        let env_config = EnvironmentConfig {
            max_steps: Some(20),
            ..EnvironmentConfig::seeded(3)
        };
        let env = make_env(SOCCER_V2, host, &env_config).unwrap();
        assert_eq!(env.config().max_path_length, 20);
    }
}
