//! Configuration of the REINFORCE agent.
use super::ReinforceModelConfig;
use crate::{model::OutDim, opt::OptimizerConfig, Device};
use anyhow::Result;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Reinforce`](super::Reinforce) agent.
///
/// `C` is the configuration of the policy model.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReinforceConfig<C>
where
    C: OutDim + Clone,
{
    /// Configuration of the policy model and its optimizer.
    pub model_config: ReinforceModelConfig<C>,

    /// Discount factor of the returns.
    pub gamma: f32,

    /// Device of the policy model, [`Device::Cpu`] if not given.
    pub device: Option<Device>,

    /// Seed of the action sampler and the weight initializer.
    pub seed: u64,

    /// If 2 or more, statistics of the parameters are recorded at every
    /// optimization step.
    pub record_verbose_level: usize,
}

impl<C> Default for ReinforceConfig<C>
where
    C: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            gamma: 0.99,
            device: None,
            seed: 42,
            record_verbose_level: 0,
        }
    }
}

impl<C> ReinforceConfig<C>
where
    C: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Sets the configuration of the policy model.
    pub fn policy_model_config(mut self, v: C) -> Self {
        self.model_config = self.model_config.policy_model_config(v);
        self
    }

    /// Sets the output dimention of the agent.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.model_config = self.model_config.out_dim(v);
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.model_config = self.model_config.opt_config(v);
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the verbose level of records.
    pub fn record_verbose_level(mut self, v: usize) -> Self {
        self.record_verbose_level = v;
        self
    }

    /// Loads [`ReinforceConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of REINFORCE agent from {}", path_.display());
        Ok(b)
    }

    /// Saves [`ReinforceConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of REINFORCE agent into {}", path_.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mlp::MlpConfig, Activation};
    use tempdir::TempDir;

    #[test]
    fn test_serde_reinforce_config() -> Result<()> {
        let config = ReinforceConfig::<MlpConfig>::default()
            .policy_model_config(MlpConfig::new(4, vec![10], 1, Activation::Sigmoid))
            .opt_config(OptimizerConfig::Adam { lr: 1e-2 })
            .gamma(0.95)
            .device(Device::Cpu)
            .seed(7);

        let dir = TempDir::new("reinforce_config")?;
        let path = dir.path().join("reinforce_config.yaml");
        config.save(&path)?;
        let config_ = ReinforceConfig::<MlpConfig>::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_out_dim() {
        let config = ReinforceConfig::<MlpConfig>::default()
            .policy_model_config(MlpConfig::new(4, vec![10], 1, Activation::Sigmoid))
            .out_dim(3);
        let out_dim = config
            .model_config
            .policy_model_config
            .as_ref()
            .map(|c| c.get_out_dim());
        assert_eq!(out_dim, Some(3));
    }
}
