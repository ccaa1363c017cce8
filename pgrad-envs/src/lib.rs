//! Environments for pgrad.
//!
//! * [`CartPole`] is the classic control task of balancing a pole on a cart.
//! * [`Epidemic`] is a toy epidemic on a grid of hosts, controlled by culling.
//!
//! Both use [`VecObs`] as observation and [`DiscreteAct`] as action, so an
//! agent written for one of them works with the other.
mod act_obs;
mod cartpole;
mod env_name;
mod epidemic;
pub use act_obs::{DiscreteAct, VecObs};
pub use cartpole::{CartPole, CartPoleConfig};
pub use env_name::EnvName;
pub use epidemic::{Epidemic, EpidemicConfig, EpidemicInfo, HostState};
