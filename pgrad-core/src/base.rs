//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Old versions of the library supported vectorized environments.
/// Environments in this crate are not vectorized, so an observation always
/// describes a single state.
pub trait Obs: Clone + Debug {
    /// Returns the dimension of the observation vector.
    fn len(&self) -> usize;
}

/// An action of an environment.
pub trait Act: Clone + Debug {}
