//! Epidemic on a grid of hosts, controlled by culling.
use crate::{DiscreteAct, VecObs};
use anyhow::Result;
use log::warn;
use pgrad_core::{
    error::PgError,
    record::{Record, RecordValue::Scalar},
    Env, Info, Step,
};
use rand::{rngs::SmallRng, seq::index, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration of [`Epidemic`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EpidemicConfig {
    /// The grid has `grid_length * grid_length` hosts.
    pub grid_length: usize,

    /// Probability that a susceptible host becomes exposed in a step without
    /// any infected neighbour.
    pub epsilon: f64,

    /// Probability of transmission from each infected neighbour in a step.
    pub beta: f64,

    /// Probability that an exposed host becomes infected in a step.
    pub c_to_i: f64,

    /// Number of steps in an episode.
    pub episode_steps: usize,

    /// Number of infected hosts after reset.
    pub n_initially_infected: usize,

    /// If `true`, the reward is `1.0` when no host is exposed or infected and
    /// `0.0` otherwise. If `false`, the reward is the fraction of susceptible
    /// hosts.
    pub reward_for_any_non_infected: bool,
}

impl Default for EpidemicConfig {
    fn default() -> Self {
        Self {
            grid_length: 2,
            epsilon: 0.0,
            beta: 0.0,
            c_to_i: 0.0,
            episode_steps: 1,
            n_initially_infected: 1,
            reward_for_any_non_infected: true,
        }
    }
}

impl EpidemicConfig {
    /// Sets the side length of the grid.
    pub fn grid_length(mut self, v: usize) -> Self {
        self.grid_length = v;
        self
    }

    /// Sets the spontaneous exposure probability.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the transmission probability.
    pub fn beta(mut self, v: f64) -> Self {
        self.beta = v;
        self
    }

    /// Sets the probability of exposed hosts becoming infected.
    pub fn c_to_i(mut self, v: f64) -> Self {
        self.c_to_i = v;
        self
    }

    /// Sets the number of steps in an episode.
    pub fn episode_steps(mut self, v: usize) -> Self {
        self.episode_steps = v;
        self
    }

    /// Sets the number of infected hosts after reset.
    pub fn n_initially_infected(mut self, v: usize) -> Self {
        self.n_initially_infected = v;
        self
    }

    /// Selects the reward function.
    pub fn reward_for_any_non_infected(mut self, v: bool) -> Self {
        self.reward_for_any_non_infected = v;
        self
    }

    /// Number of hosts.
    pub fn n_hosts(&self) -> usize {
        self.grid_length * self.grid_length
    }

    fn validate(&self) -> Result<(), PgError> {
        if self.grid_length == 0 {
            return Err(PgError::InvalidConfig(
                "grid_length must be positive".to_string(),
            ));
        }
        if self.n_initially_infected > self.n_hosts() {
            return Err(PgError::InvalidConfig(format!(
                "n_initially_infected ({}) exceeds the number of hosts ({})",
                self.n_initially_infected,
                self.n_hosts()
            )));
        }
        for (name, p) in [
            ("epsilon", self.epsilon),
            ("beta", self.beta),
            ("c_to_i", self.c_to_i),
        ]
        .iter()
        {
            if !(0.0..=1.0).contains(p) {
                return Err(PgError::InvalidConfig(format!(
                    "{} must be in [0, 1], got {}",
                    name, p
                )));
            }
        }
        Ok(())
    }
}

/// State of a host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostState {
    /// Can be exposed.
    Susceptible,

    /// Carries the disease but is not observed as infected yet.
    Exposed,

    /// Observed as infected. Infects its neighbours.
    Infected,

    /// Removed by the controller.
    Culled,
}

impl HostState {
    fn observe(&self) -> f32 {
        match self {
            Self::Infected => 1.0,
            Self::Culled => -1.0,
            Self::Susceptible | Self::Exposed => 0.0,
        }
    }

    fn as_char(&self) -> char {
        match self {
            Self::Susceptible => '.',
            Self::Exposed => 'e',
            Self::Infected => 'I',
            Self::Culled => 'x',
        }
    }
}

/// Counts of hosts after a step.
#[derive(Clone, Debug, PartialEq)]
pub struct EpidemicInfo {
    /// Number of infected hosts.
    pub n_infected: usize,

    /// Number of exposed hosts.
    pub n_exposed: usize,

    /// Number of culled hosts.
    pub n_culled: usize,
}

impl Info for EpidemicInfo {}

/// Epidemic on a square grid of hosts.
///
/// Hosts interact with their 4-neighbourhood. The action is the index of the
/// host to cull, in row-major order. The observation holds `1.0` for infected
/// hosts, `-1.0` for culled hosts and `0.0` otherwise, so exposed hosts are
/// indistinguishable from susceptible ones.
pub struct Epidemic {
    config: EpidemicConfig,
    rng: SmallRng,
    states: Vec<HostState>,
    time: usize,
}

impl Epidemic {
    /// Returns the states of the hosts.
    pub fn states(&self) -> &[HostState] {
        &self.states
    }

    fn obs(&self) -> VecObs {
        VecObs(self.states.iter().map(HostState::observe).collect())
    }

    fn count(&self, state: HostState) -> usize {
        self.states.iter().filter(|&&s| s == state).count()
    }

    fn info(&self) -> EpidemicInfo {
        EpidemicInfo {
            n_infected: self.count(HostState::Infected),
            n_exposed: self.count(HostState::Exposed),
            n_culled: self.count(HostState::Culled),
        }
    }

    fn neighbours(&self, i: usize) -> impl Iterator<Item = usize> {
        let l = self.config.grid_length;
        let (row, col) = (i / l, i % l);
        let up = if row > 0 { Some(i - l) } else { None };
        let down = if row + 1 < l { Some(i + l) } else { None };
        let left = if col > 0 { Some(i - 1) } else { None };
        let right = if col + 1 < l { Some(i + 1) } else { None };
        up.into_iter().chain(down).chain(left).chain(right)
    }

    fn reward(&self, info: &EpidemicInfo) -> f32 {
        if self.config.reward_for_any_non_infected {
            if info.n_infected + info.n_exposed == 0 {
                1.0
            } else {
                0.0
            }
        } else {
            self.count(HostState::Susceptible) as f32 / self.states.len() as f32
        }
    }

    /// Advances the disease by one step.
    ///
    /// Exposure is computed from the hosts infected before this step, so a
    /// host becoming infected here does not transmit until the next step.
    fn spread(&mut self) {
        let infected: Vec<bool> = self
            .states
            .iter()
            .map(|&s| s == HostState::Infected)
            .collect();

        for i in 0..self.states.len() {
            match self.states[i] {
                HostState::Exposed => {
                    if self.rng.gen_bool(self.config.c_to_i) {
                        self.states[i] = HostState::Infected;
                    }
                }
                HostState::Susceptible => {
                    let k = self.neighbours(i).filter(|&j| infected[j]).count();
                    let p_escape = (1.0 - self.config.epsilon)
                        * (1.0 - self.config.beta).powi(k as i32);
                    if self.rng.gen_bool((1.0 - p_escape).max(0.0).min(1.0)) {
                        self.states[i] = HostState::Exposed;
                    }
                }
                _ => {}
            }
        }
    }
}

impl Env for Epidemic {
    type Config = EpidemicConfig;
    type Obs = VecObs;
    type Act = DiscreteAct;
    type Info = EpidemicInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            rng: SmallRng::seed_from_u64(seed as u64),
            states: vec![HostState::Susceptible; config.n_hosts()],
            time: config.episode_steps,
        })
    }

    fn reset(&mut self) -> Result<VecObs> {
        let n_hosts = self.config.n_hosts();
        self.states = vec![HostState::Susceptible; n_hosts];
        for i in index::sample(&mut self.rng, n_hosts, self.config.n_initially_infected) {
            self.states[i] = HostState::Infected;
        }
        self.time = self.config.episode_steps;
        Ok(self.obs())
    }

    fn step(&mut self, a: &DiscreteAct) -> (Step<Self>, Record) {
        match self.states.get_mut(a.0) {
            Some(s) => *s = HostState::Culled,
            None => warn!(
                "Cull target {} out of range 0..{}, ignored",
                a.0,
                self.states.len()
            ),
        }
        self.spread();
        self.time = self.time.saturating_sub(1);

        let info = self.info();
        let reward = self.reward(&info);
        let record = Record::from_slice(&[
            ("n_infected", Scalar(info.n_infected as f32)),
            ("n_exposed", Scalar(info.n_exposed as f32)),
            ("n_culled", Scalar(info.n_culled as f32)),
        ]);
        let step = Step::new(self.obs(), *a, reward, self.time == 0, false, info);

        (step, record)
    }

    fn n_actions(&self) -> usize {
        self.states.len()
    }

    fn render(&self) {
        let l = self.config.grid_length;
        for row in self.states.chunks(l) {
            let line: String = row.iter().map(HostState::as_char).collect();
            println!("{}", line);
        }
        println!("time remaining: {}", self.time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::HostState::*;

    fn deterministic_3x3() -> Result<Epidemic> {
        let config = EpidemicConfig::default()
            .grid_length(3)
            .beta(1.0)
            .c_to_i(1.0)
            .episode_steps(3);
        let mut env = Epidemic::build(&config, 0)?;
        env.reset()?;
        env.states = vec![Susceptible; 9];
        env.states[4] = Infected;
        Ok(env)
    }

    #[test]
    fn test_reset() -> Result<()> {
        let config = EpidemicConfig::default().grid_length(4).n_initially_infected(3);
        let mut env = Epidemic::build(&config, 42)?;
        let obs = env.reset()?;
        assert_eq!(obs.0.len(), 16);
        assert_eq!(obs.0.iter().filter(|&&v| v == 1.0).count(), 3);
        assert_eq!(env.count(Infected), 3);
        assert_eq!(env.n_actions(), 16);
        Ok(())
    }

    #[test]
    fn test_spread() -> Result<()> {
        let mut env = deterministic_3x3()?;

        let (step, record) = env.step(&DiscreteAct(0));
        assert_eq!(step.info.n_exposed, 4);
        assert_eq!(step.info.n_infected, 1);
        assert_eq!(step.info.n_culled, 1);
        assert_eq!(record.get_scalar("n_exposed")?, 4.0);
        for &i in [1, 3, 5, 7].iter() {
            assert_eq!(env.states()[i], Exposed);
            assert_eq!(step.obs.0[i], 0.0);
        }
        assert_eq!(step.obs.0[0], -1.0);
        assert_eq!(step.reward, 0.0);
        assert!(!step.is_done());

        let (step, _) = env.step(&DiscreteAct(8));
        assert_eq!(step.info.n_infected, 5);
        assert_eq!(step.info.n_exposed, 0);
        assert_eq!(step.info.n_culled, 2);
        assert_eq!(env.states()[2], Susceptible);
        assert_eq!(env.states()[6], Susceptible);
        Ok(())
    }

    #[test]
    fn test_episode_ends() -> Result<()> {
        let mut env = deterministic_3x3()?;
        assert!(!env.step(&DiscreteAct(0)).0.is_done());
        assert!(!env.step(&DiscreteAct(1)).0.is_done());
        let (step, _) = env.step(&DiscreteAct(2));
        assert!(step.is_terminated);
        assert!(!step.is_truncated);
        Ok(())
    }

    #[test]
    fn test_cull_infected() -> Result<()> {
        let mut env = Epidemic::build(&EpidemicConfig::default(), 1)?;
        let obs = env.reset()?;
        let target = obs.0.iter().position(|&v| v == 1.0).unwrap();

        let (step, _) = env.step(&DiscreteAct(target));
        assert_eq!(step.reward, 1.0);
        assert!(step.is_terminated);
        assert_eq!(step.obs.0[target], -1.0);

        env.reset()?;
        let other = (target + 1) % 4;
        let (step, _) = env.step(&DiscreteAct(other));
        assert_eq!(step.reward, 0.0);
        Ok(())
    }

    #[test]
    fn test_fraction_reward() -> Result<()> {
        let config = EpidemicConfig::default().reward_for_any_non_infected(false);
        let mut env = Epidemic::build(&config, 3)?;
        env.reset()?;
        let (step, _) = env.step(&DiscreteAct(0));
        // Either the infected host or a susceptible one is culled.
        assert!(step.reward == 0.75 || step.reward == 0.5);
        Ok(())
    }

    #[test]
    fn test_out_of_range_action() -> Result<()> {
        let mut env = Epidemic::build(&EpidemicConfig::default(), 0)?;
        env.reset()?;
        let (step, _) = env.step(&DiscreteAct(4));
        assert_eq!(step.info.n_culled, 0);
        assert_eq!(step.info.n_infected, 1);
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let config = EpidemicConfig::default().grid_length(0);
        assert!(Epidemic::build(&config, 0).is_err());

        let config = EpidemicConfig::default().n_initially_infected(5);
        let err = Epidemic::build(&config, 0).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<PgError>(),
            Some(PgError::InvalidConfig(_))
        ));

        let config = EpidemicConfig::default().beta(1.5);
        assert!(Epidemic::build(&config, 0).is_err());
    }

    #[test]
    fn test_serde_config() -> Result<()> {
        let config = EpidemicConfig::default().grid_length(3).epsilon(0.01);
        let s = serde_yaml::to_string(&config)?;
        let config_: EpidemicConfig = serde_yaml::from_str(&s)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
