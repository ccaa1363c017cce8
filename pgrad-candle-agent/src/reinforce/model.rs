use super::GradBuffer;
use crate::{
    model::{OutDim, SubModel1},
    opt::{Optimizer, OptimizerConfig},
    util::{param_stats, xavier_uniform},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use pgrad_core::record::Record;
use rand::RngCore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`ReinforceModel`].
///
/// The type parameter `C` is the configuration of the policy network, whose
/// outputs are interpreted as probabilities.
pub struct ReinforceModelConfig<C>
where
    C: OutDim + Clone,
{
    pub policy_model_config: Option<C>,
    #[serde(default)]
    pub opt_config: OptimizerConfig,
}

impl<C> Default for ReinforceModelConfig<C>
where
    C: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn default() -> Self {
        Self {
            policy_model_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<C> ReinforceModelConfig<C>
where
    C: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Sets configurations for the policy model.
    pub fn policy_model_config(mut self, v: C) -> Self {
        self.policy_model_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: usize) -> Self {
        if let Some(policy_model_config) = &mut self.policy_model_config {
            policy_model_config.set_out_dim(v);
        }
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Policy network with its optimizer and gradient buffer.
pub struct ReinforceModel<P>
where
    P: SubModel1<Output = Tensor>,
{
    varmap: VarMap,

    /// Dimension of the output vector.
    out_dim: usize,

    /// Policy model.
    policy_model: P,

    /// Optimizer.
    opt: Optimizer,

    /// Gradients accumulated since the last optimization step.
    grads: GradBuffer,
}

impl<P> ReinforceModel<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`ReinforceModel`].
    ///
    /// The weights are initialized with [`xavier_uniform`] drawing from `rng`.
    pub fn build(
        config: ReinforceModelConfig<P::Config>,
        device: Device,
        rng: &mut impl RngCore,
    ) -> Result<Self> {
        let policy_model_config = config
            .policy_model_config
            .context("policy_model_config is not set.")?;
        let out_dim = policy_model_config.get_out_dim();
        let varmap = VarMap::new();

        let policy_model = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            P::build(vb, policy_model_config)?
        };
        xavier_uniform(&varmap, rng)?;

        let vars = varmap.all_vars();
        let opt = config.opt_config.build(vars.clone())?;
        let grads = GradBuffer::new(vars)?;

        Ok(Self {
            varmap,
            out_dim,
            policy_model,
            opt,
            grads,
        })
    }

    /// Returns the output probabilities given observation(s).
    pub fn forward(&self, obs: &P::Input) -> Result<Tensor> {
        self.policy_model.forward(obs)
    }

    /// Dimension of the output vector.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Computes the gradient of `loss` and adds it to the buffer.
    pub fn accumulate(&mut self, loss: &Tensor) -> Result<()> {
        let grads = loss.backward()?;
        self.grads.accumulate(grads)
    }

    /// Applies the accumulated gradients.
    pub fn apply(&mut self) -> Result<()> {
        self.grads.apply(&mut self.opt)
    }

    /// Number of losses accumulated since the last [`ReinforceModel::apply`].
    pub fn n_accumulated(&self) -> usize {
        self.grads.n_accumulated()
    }

    /// Returns the mean and standard deviation of the parameters.
    pub fn param_stats(&self) -> Result<Record> {
        param_stats(&self.varmap)
    }
}
