//! Example: Scripted push controller on the randomized soccer task

use kickbench_core::{ContinuousSpace, EpsilonGreedy, Policy};
use kickbench_env::prelude::*;
use kickbench_env::registry::SOCCER_V2_RANDOMIZED;
use kickbench_env::{task_config, EnvironmentConfig, SpatialPoint, TrackedEnvironment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = task_config(SOCCER_V2_RANDOMIZED)?;
    let host = KinematicHost::from_config(&config);
    let env_config = EnvironmentConfig {
        max_steps: Some(150),
        ..EnvironmentConfig::seeded(42)
    };
    let env = make_env(SOCCER_V2_RANDOMIZED, host, &env_config)?
        .with_time_limit();
    let mut env = TrackedEnvironment::new(env);

    let num_episodes = 10;
    let mut successes = 0;

    for episode in 0..num_episodes {
        let (mut observation, _info) = env.reset().await?;

        // The goal is hidden from the observation, so hand it to the controller
        let target = env
            .env
            .inner()
            .context()
            .map_or(SpatialPoint::new(0.0, 0.85, 0.0), |ctx| ctx.target_position());
        // A little exploration so episodes differ beyond their initial placement
        let policy = EpsilonGreedy::new(
            ScriptedPushPolicy::new(target),
            0.05,
            ContinuousSpace::symmetric(4, 1.0),
        );

        let mut scored_at = None;
        loop {
            let action = policy.act(&observation).await?;
            let step = env.step(action).await?;
            tracing::debug!(step = env.step_count, reward = step.reward.0, "step");

            if scored_at.is_none() && step.info.get_f64("success") == Some(1.0) {
                scored_at = Some(env.step_count);
            }
            if step.done || step.truncated {
                break;
            }
            observation = step.observation;
        }

        let total_reward = env.episode_info().map_or(0.0, |e| e.total_reward);
        match scored_at {
            Some(step) => {
                successes += 1;
                println!(
                    "Episode {}: scored at step {}, Total Reward = {:.2}",
                    episode + 1,
                    step,
                    total_reward
                );
            }
            None => println!(
                "Episode {}: no goal, Total Reward = {:.2}",
                episode + 1,
                total_reward
            ),
        }
    }

    println!("\nScored in {successes} of {num_episodes} episodes");
    Ok(())
}
