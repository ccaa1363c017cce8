//! REINFORCE agent implemented with candle.
use super::{label_for_action, sample_action, ReinforceConfig, ReinforceModel};
use crate::model::{OutDim, SubModel1};
use anyhow::Result;
use candle_core::{Device, Tensor};
use log::trace;
use pgrad_core::{
    record::{Record, RecordValue},
    returns::normalized_returns,
    Agent, Env, Episode, Policy,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{convert::TryFrom, marker::PhantomData};

/// Lower bound of the likelihood of an action inside the logarithm.
const MIN_LIKELIHOOD: f32 = 1e-7;

/// REINFORCE agent with a policy network emitting independent probabilities.
///
/// The policy network outputs `K` values in `[0, 1]` for an observation.
/// Actions are drawn with [`sample_action`], so the agent acts on
/// environments with `K + 1` discrete actions.
///
/// For a completed episode of length `T`, the loss is
///
/// `-mean(log(clamp(y * p + (1 - y) * (1 - p), 1e-7, 1)) * A)`
///
/// where `p` is the `T x K` network output, `y` the `T x K` labels of the
/// taken actions and `A` the `T x 1` normalized discounted returns. The
/// gradients of the losses are summed over episodes until
/// [`Agent::opt`] applies them.
pub struct Reinforce<E, P>
where
    P: SubModel1<Output = Tensor>,
{
    model: ReinforceModel<P>,
    gamma: f32,
    device: Device,
    rng: SmallRng,
    record_verbose_level: usize,
    phantom: PhantomData<E>,
}

impl<E, P> Reinforce<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs REINFORCE agent.
    pub fn build(config: ReinforceConfig<P::Config>) -> Result<Self> {
        let device = Device::try_from(config.device.unwrap_or_default())?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let model = ReinforceModel::build(config.model_config, device.clone(), &mut rng)?;

        Ok(Self {
            model,
            gamma: config.gamma,
            device,
            rng,
            record_verbose_level: config.record_verbose_level,
            phantom: PhantomData,
        })
    }

    /// Returns the output probabilities of the policy network for an observation.
    pub fn probs(&self, obs: &[f32]) -> Result<Vec<f32>> {
        let xs = Tensor::from_slice(obs, (1, obs.len()), &self.device)?;
        let ps = self.model.forward(&xs)?.detach().squeeze(0)?;
        Ok(ps.to_vec1::<f32>()?)
    }

    /// Number of episodes accumulated since the last optimization step.
    pub fn n_accumulated(&self) -> usize {
        self.model.n_accumulated()
    }
}

impl<E, P> Policy<E> for Reinforce<E, P>
where
    E: Env,
    E::Obs: AsRef<[f32]>,
    E::Act: From<usize>,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Samples an action from the output of the policy network.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let probs = self.probs(obs.as_ref())?;
        let (a, _) = sample_action(&probs, &mut self.rng);
        trace!("probs = {:?}, action = {}", probs, a);
        Ok(a.into())
    }
}

impl<E, P> Agent<E> for Reinforce<E, P>
where
    E: Env,
    E::Obs: AsRef<[f32]>,
    E::Act: From<usize>,
    usize: From<E::Act>,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn accumulate(&mut self, episode: &Episode<E>) -> Result<Record> {
        if episode.is_empty() {
            return Ok(Record::empty());
        }
        let loss = self.loss(episode)?;
        self.model.accumulate(&loss)?;

        let loss = loss.to_device(&candle_core::Device::Cpu)?.to_scalar::<f32>()?;
        Ok(Record::from_scalar("loss", loss))
    }

    fn opt_with_record(&mut self) -> Result<Record> {
        let n_episodes = self.model.n_accumulated();
        self.model.apply()?;

        let record = Record::from_slice(&[(
            "n_accumulated_episodes",
            RecordValue::Scalar(n_episodes as f32),
        )]);
        match self.record_verbose_level >= 2 {
            true => Ok(record.merge(self.model.param_stats()?)),
            false => Ok(record),
        }
    }
}

impl<E, P> Reinforce<E, P>
where
    E: Env,
    E::Obs: AsRef<[f32]>,
    usize: From<E::Act>,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Loss of a completed, non-empty episode.
    fn loss(&self, episode: &Episode<E>) -> Result<Tensor> {
        let t = episode.len();
        let k = self.model.out_dim();

        let obs = {
            let d = episode.obs()[0].as_ref().len();
            let v: Vec<f32> = episode
                .obs()
                .iter()
                .flat_map(|o| o.as_ref().iter().copied())
                .collect();
            Tensor::from_vec(v, (t, d), &self.device)?
        };
        let labels = {
            let v: Vec<f32> = episode
                .act()
                .iter()
                .flat_map(|a| label_for_action(usize::from(a.clone()), k))
                .collect();
            Tensor::from_vec(v, (t, k), &self.device)?
        };
        let advantages = {
            let v = normalized_returns(episode.reward(), self.gamma);
            Tensor::from_vec(v, (t, 1), &self.device)?
        };

        let p = self.model.forward(&obs)?;
        let likelihood = labels
            .mul(&p)?
            .add(&labels.affine(-1.0, 1.0)?.mul(&p.affine(-1.0, 1.0)?)?)?;
        let loss = likelihood
            .clamp(MIN_LIKELIHOOD, 1f32)?
            .log()?
            .broadcast_mul(&advantages)?
            .mean_all()?
            .neg()?;

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mlp::Mlp, mlp::MlpConfig, Activation};
    use pgrad_envs::{DiscreteAct, Epidemic, VecObs};

    type TestAgent = Reinforce<Epidemic, Mlp>;

    fn agent(seed: u64) -> Result<TestAgent> {
        let config = ReinforceConfig::<MlpConfig>::default()
            .policy_model_config(MlpConfig::new(4, vec![10], 3, Activation::Sigmoid))
            .seed(seed);
        TestAgent::build(config)
    }

    fn episode(obs: Vec<f32>, act: usize, reward: f32) -> Episode<Epidemic> {
        let mut episode = Episode::new();
        episode.push(VecObs(obs), DiscreteAct(act), reward);
        episode
    }

    #[test]
    fn test_probs() -> Result<()> {
        let agent = agent(42)?;
        let probs = agent.probs(&[1.0, 0.0, 0.0, 0.0])?;
        assert_eq!(probs.len(), 3);
        assert!(probs.iter().all(|&p| p > 0.0 && p < 1.0));
        Ok(())
    }

    #[test]
    fn test_seed() -> Result<()> {
        let mut agent1 = agent(1)?;
        let mut agent2 = agent(1)?;
        let obs = VecObs(vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(agent1.probs(&obs.0)?, agent2.probs(&obs.0)?);
        for _ in 0..10 {
            let a1 = Policy::<Epidemic>::sample(&mut agent1, &obs)?;
            let a2 = Policy::<Epidemic>::sample(&mut agent2, &obs)?;
            assert_eq!(a1, a2);
            assert!(a1.0 < 4);
        }
        Ok(())
    }

    #[test]
    fn test_accumulate_then_apply() -> Result<()> {
        let mut agent = agent(0)?;
        let obs = vec![0.0, 0.0, 1.0, 0.0];
        let p0 = agent.probs(&obs)?;

        // Reward the action culling the infected host.
        let losses = (0..2)
            .map(|_| -> Result<f32> {
                let record = agent.accumulate(&episode(obs.clone(), 2, 1.0))?;
                Ok(record.get_scalar("loss")?)
            })
            .collect::<Result<Vec<_>>>()?;
        let loss0 = losses[1];
        assert!(loss0.is_finite());
        assert_eq!(agent.n_accumulated(), 2);
        assert_eq!(agent.probs(&obs)?, p0);

        let record = Agent::<Epidemic>::opt_with_record(&mut agent)?;
        assert_eq!(record.get_scalar("n_accumulated_episodes")?, 2.0);
        assert_eq!(agent.n_accumulated(), 0);
        assert_ne!(agent.probs(&obs)?, p0);

        let loss1 = agent
            .accumulate(&episode(obs.clone(), 2, 1.0))?
            .get_scalar("loss")?;
        assert!(loss1 < loss0);
        Ok(())
    }

    #[test]
    fn test_empty_episode() -> Result<()> {
        let mut agent = agent(0)?;
        let record = agent.accumulate(&Episode::new())?;
        assert!(record.is_empty());
        assert_eq!(agent.n_accumulated(), 0);
        Ok(())
    }

    #[test]
    fn test_param_stats() -> Result<()> {
        let config = ReinforceConfig::<MlpConfig>::default()
            .policy_model_config(MlpConfig::new(4, vec![10], 3, Activation::Sigmoid))
            .record_verbose_level(2);
        let mut agent = TestAgent::build(config)?;
        agent.accumulate(&episode(vec![1.0, 0.0, 0.0, 0.0], 3, 0.0))?;
        let record = Agent::<Epidemic>::opt_with_record(&mut agent)?;
        assert!(record.get_scalar("mlp.ln0.weight_mean").is_ok());
        assert!(record.get_scalar("mlp.ln1.weight_std").is_ok());
        Ok(())
    }
}
