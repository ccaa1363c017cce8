//! Vanilla policy gradient (REINFORCE) on toy environments.
//!
//! pgrad consists of the following crates:
//!
//! * `pgrad-core` provides the environment and agent traits, the return
//!   calculator and the batched training loop.
//! * `pgrad-envs` provides the cart-pole and epidemic environments.
//! * `pgrad-candle-agent` provides the REINFORCE agent implemented with
//!   [candle](https://crates.io/crates/candle-core).
//! * `pgrad` (this crate) wires them together behind a command line interface.
//!
//! ```text
//! pgrad --env epidemic
//! pgrad --env cartpole --graphics
//! ```
use anyhow::Result;
use clap::Parser;
use log::info;
use pgrad_candle_agent::{
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    reinforce::{Reinforce, ReinforceConfig},
    Activation, Device,
};
use pgrad_core::{
    error::PgError,
    record::{NullRecorder, Recorder},
    Env, Obs, Trainer, TrainerConfig, TrainingSummary,
};
use pgrad_envs::{CartPole, CartPoleConfig, DiscreteAct, EnvName, Epidemic, EpidemicConfig, VecObs};

/// Seed of the environment and the agent.
pub const SEED: u64 = 42;

/// Width of the hidden layer of the policy network.
pub const HIDDEN_UNITS: usize = 10;

const LR: f64 = 1e-2;
const DISCOUNT_FACTOR: f32 = 0.99;

/// Train a REINFORCE agent on the epidemic or cart-pole environment.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Environment, epidemic or cartpole
    #[arg(short, long)]
    pub env: String,

    /// Render the environment once the average reward exceeds 100
    #[arg(short, long, default_value_t = false)]
    pub graphics: bool,
}

/// Returns the configuration of the agent.
///
/// `out_dim` is the number of outputs of the policy network, one less than
/// the number of actions of the environment.
pub fn create_agent_config(in_dim: usize, out_dim: usize) -> ReinforceConfig<MlpConfig> {
    let mlp_config = MlpConfig::new(in_dim, vec![HIDDEN_UNITS], out_dim, Activation::Sigmoid);
    ReinforceConfig::default()
        .policy_model_config(mlp_config)
        .opt_config(OptimizerConfig::default().learning_rate(LR))
        .gamma(DISCOUNT_FACTOR)
        .device(Device::Cpu)
        .seed(SEED)
}

/// Trains an agent on an environment of type `E`.
///
/// The dimensions of the policy network are taken from the environment.
pub fn train<E>(
    env_config: &E::Config,
    trainer_config: TrainerConfig,
    seed: u64,
    recorder: &mut dyn Recorder,
) -> Result<TrainingSummary>
where
    E: Env<Obs = VecObs, Act = DiscreteAct>,
{
    let mut trainer = Trainer::build(trainer_config)?;
    let mut env = E::build(env_config, seed as i64)?;
    let n_actions = env.n_actions();
    if n_actions < 2 {
        return Err(PgError::InvalidConfig(format!(
            "the environment must have at least 2 actions, got {}",
            n_actions
        ))
        .into());
    }
    let in_dim = env.reset()?.len();
    let agent_config = create_agent_config(in_dim, n_actions - 1).seed(seed);
    let mut agent = Reinforce::<E, Mlp>::build(agent_config)?;
    info!(
        "Policy network: {} inputs, {} hidden units, {} outputs",
        in_dim,
        HIDDEN_UNITS,
        n_actions - 1
    );

    trainer.train(&mut env, &mut agent, recorder)
}

/// Runs training as given by the command line arguments.
///
/// The environment name is checked before anything is built.
pub fn run(args: &Args) -> Result<TrainingSummary> {
    let env_name: EnvName = args.env.parse()?;
    let trainer_config = TrainerConfig::default().render(args.graphics);
    let mut recorder = NullRecorder::new();
    info!("Train REINFORCE agent on {}", env_name);

    match env_name {
        EnvName::Epidemic => train::<Epidemic>(
            &EpidemicConfig::default(),
            trainer_config,
            SEED,
            &mut recorder,
        ),
        EnvName::CartPole => train::<CartPole>(
            &CartPoleConfig::default(),
            trainer_config,
            SEED,
            &mut recorder,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_env() {
        let args = Args {
            env: "unsupported_name".to_string(),
            graphics: false,
        };
        let err = run(&args).err().unwrap();
        assert_eq!(
            err.downcast_ref::<PgError>(),
            Some(&PgError::UnknownEnv("unsupported_name".to_string()))
        );
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["pgrad", "-e", "cartpole", "-g"]).unwrap();
        assert_eq!(args.env, "cartpole");
        assert!(args.graphics);

        let args = Args::try_parse_from(["pgrad", "--env", "epidemic"]).unwrap();
        assert_eq!(args.env, "epidemic");
        assert!(!args.graphics);

        let err = Args::try_parse_from(["pgrad"]).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_single_action_env() {
        let config = EpidemicConfig::default().grid_length(1);
        let err = train::<Epidemic>(
            &config,
            TrainerConfig::default(),
            0,
            &mut NullRecorder::new(),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err.downcast_ref::<PgError>(),
            Some(PgError::InvalidConfig(_))
        ));
    }
}
