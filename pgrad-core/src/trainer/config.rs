//! Configuration of [`Trainer`](super::Trainer).
use crate::error::PgError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The maximum number of episodes.
    pub max_episodes: usize,

    /// Number of episodes whose gradients are accumulated before an optimization step.
    pub batch_size: usize,

    /// Training stops when the average episode reward of a batch exceeds this value.
    pub solve_threshold: Option<f32>,

    /// If `true`, the environment is rendered once the agent performs well.
    pub render: bool,

    /// Rendering starts when the average episode reward of the current batch exceeds this value.
    pub render_threshold: f32,

    /// Decay of the exponentially smoothed running reward.
    pub running_reward_decay: f32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 10000,
            batch_size: 5,
            solve_threshold: Some(200.0),
            render: false,
            render_threshold: 100.0,
            running_reward_decay: 0.99,
        }
    }
}

impl TrainerConfig {
    /// Sets the maximum number of episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the number of episodes per optimization step.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the threshold of the average batch reward for stopping training.
    pub fn solve_threshold(mut self, v: Option<f32>) -> Self {
        self.solve_threshold = v;
        self
    }

    /// Enables or disables rendering.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }

    /// Sets the threshold of the average batch reward for starting rendering.
    pub fn render_threshold(mut self, v: f32) -> Self {
        self.render_threshold = v;
        self
    }

    /// Sets the decay of the running reward.
    pub fn running_reward_decay(mut self, v: f32) -> Self {
        self.running_reward_decay = v;
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), PgError> {
        if self.batch_size == 0 {
            return Err(PgError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.running_reward_decay) {
            return Err(PgError::InvalidConfig(format!(
                "running_reward_decay must be in [0, 1], got {}",
                self.running_reward_decay
            )));
        }
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .max_episodes(100)
            .batch_size(10)
            .solve_threshold(None)
            .render(true);

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");

        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(TrainerConfig::default().validate().is_ok());
        assert!(TrainerConfig::default().batch_size(0).validate().is_err());
        assert!(TrainerConfig::default()
            .running_reward_decay(1.5)
            .validate()
            .is_err());
    }
}
