//! Cart-pole balancing task.
use crate::{DiscreteAct, VecObs};
use anyhow::Result;
use log::warn;
use pgrad_core::{record::Record, Env, Step};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const GRAVITY: f32 = 9.8;
const MASS_CART: f32 = 1.0;
const MASS_POLE: f32 = 0.1;
const TOTAL_MASS: f32 = MASS_CART + MASS_POLE;
const HALF_LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = MASS_POLE * HALF_LENGTH;
const FORCE_MAG: f32 = 10.0;
const TAU: f32 = 0.02;
const X_THRESHOLD: f32 = 2.4;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;
const RENDER_WIDTH: usize = 41;

/// Configuration of [`CartPole`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CartPoleConfig {
    /// Episodes are truncated after this number of steps.
    pub max_steps: usize,

    /// Initial state variables are drawn uniformly from `[-init_range, init_range]`.
    pub init_range: f32,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            max_steps: 500,
            init_range: 0.05,
        }
    }
}

impl CartPoleConfig {
    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the range of the initial state.
    pub fn init_range(mut self, v: f32) -> Self {
        self.init_range = v;
        self
    }
}

/// Cart-pole with Euler integration.
///
/// The observation is `[x, x_dot, theta, theta_dot]`. Action `0` pushes the
/// cart to the left, action `1` to the right. The reward is `1.0` for every
/// step, including the one that ends the episode.
pub struct CartPole {
    config: CartPoleConfig,
    rng: SmallRng,
    state: [f32; 4],
    steps: usize,
}

impl CartPole {
    fn obs(&self) -> VecObs {
        VecObs(self.state.to_vec())
    }

    fn is_failed(&self) -> bool {
        let [x, _, theta, _] = self.state;
        x.abs() > X_THRESHOLD || theta.abs() > THETA_THRESHOLD
    }
}

impl Env for CartPole {
    type Config = CartPoleConfig;
    type Obs = VecObs;
    type Act = DiscreteAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rng: SmallRng::seed_from_u64(seed as u64),
            state: [0.0; 4],
            steps: 0,
        })
    }

    fn reset(&mut self) -> Result<VecObs> {
        let r = self.config.init_range;
        for v in self.state.iter_mut() {
            *v = self.rng.gen_range(-r..=r);
        }
        self.steps = 0;
        Ok(self.obs())
    }

    fn step(&mut self, a: &DiscreteAct) -> (Step<Self>, Record) {
        let force = match a.0 {
            0 => -FORCE_MAG,
            1 => FORCE_MAG,
            n => {
                warn!("Invalid cart-pole action {}, no force applied", n);
                0.0
            }
        };

        let [x, x_dot, theta, theta_dot] = self.state;
        let (sin, cos) = theta.sin_cos();
        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin - cos * temp)
            / (HALF_LENGTH * (4.0 / 3.0 - MASS_POLE * cos * cos / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos / TOTAL_MASS;

        self.state = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        self.steps += 1;

        let is_terminated = self.is_failed();
        let is_truncated = !is_terminated && self.steps >= self.config.max_steps;
        let step = Step::new(self.obs(), *a, 1.0, is_terminated, is_truncated, ());

        (step, Record::empty())
    }

    fn n_actions(&self) -> usize {
        2
    }

    fn render(&self) {
        let [x, _, theta, _] = self.state;
        let pos = ((x + X_THRESHOLD) / (2.0 * X_THRESHOLD) * (RENDER_WIDTH - 1) as f32)
            .round()
            .max(0.0)
            .min((RENDER_WIDTH - 1) as f32) as usize;
        let pole = if theta > 0.05 {
            '/'
        } else if theta < -0.05 {
            '\\'
        } else {
            '|'
        };
        let line: String = (0..RENDER_WIDTH)
            .map(|i| if i == pos { pole } else { '-' })
            .collect();
        println!("[{}] x={:+.3} theta={:+.3}", line, x, theta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgrad_core::Obs;

    #[test]
    fn test_reset_range() -> Result<()> {
        let mut env = CartPole::build(&CartPoleConfig::default(), 42)?;
        for _ in 0..10 {
            let obs = env.reset()?;
            assert_eq!(obs.len(), 4);
            assert!(obs.0.iter().all(|v| v.abs() <= 0.05));
        }
        Ok(())
    }

    #[test]
    fn test_pushing_right_terminates() -> Result<()> {
        let mut env = CartPole::build(&CartPoleConfig::default(), 42)?;
        env.reset()?;
        let mut n = 0;
        loop {
            let (step, _) = env.step(&DiscreteAct(1));
            n += 1;
            assert_eq!(step.reward, 1.0);
            if step.is_done() {
                assert!(step.is_terminated);
                assert!(!step.is_truncated);
                break;
            }
            assert!(n < 100);
        }
        assert!(n > 1);
        Ok(())
    }

    #[test]
    fn test_truncation() -> Result<()> {
        let config = CartPoleConfig::default().max_steps(5);
        let mut env = CartPole::build(&config, 0)?;
        env.reset()?;
        for t in 0..5 {
            let (step, _) = env.step(&DiscreteAct(t % 2));
            assert!(!step.is_terminated);
            assert_eq!(step.is_truncated, t == 4);
        }
        Ok(())
    }

    #[test]
    fn test_seed() -> Result<()> {
        let mut env1 = CartPole::build(&CartPoleConfig::default(), 7)?;
        let mut env2 = CartPole::build(&CartPoleConfig::default(), 7)?;
        assert_eq!(env1.reset()?, env2.reset()?);
        let (s1, _) = env1.step(&DiscreteAct(0));
        let (s2, _) = env2.step(&DiscreteAct(0));
        assert_eq!(s1.obs, s2.obs);
        Ok(())
    }
}
