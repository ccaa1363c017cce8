//! REINFORCE agent.
mod base;
mod config;
mod grad_buffer;
mod model;
mod sampler;
pub use base::Reinforce;
pub use config::ReinforceConfig;
pub use grad_buffer::GradBuffer;
pub use model::{ReinforceModel, ReinforceModelConfig};
pub use sampler::{label_for_action, sample_action};
