//! Agent.
use super::{Env, Policy};
use crate::{record::Record, Episode};
use anyhow::Result;

/// Represents a trainable policy on an environment.
///
/// Training is split in two operations, matching the batched REINFORCE loop
/// driven by [`Trainer`](crate::Trainer):
///
/// * [`Agent::accumulate`] is called once per completed episode. It computes
///   the gradient of the episode's loss and adds it to an internal buffer.
/// * [`Agent::opt`] is called once every `batch_size` episodes. It applies the
///   accumulated gradients with the optimizer and zeroes the buffer.
pub trait Agent<E: Env>: Policy<E> {
    /// Computes the gradient for a completed episode and accumulates it.
    fn accumulate(&mut self, episode: &Episode<E>) -> Result<Record>;

    /// Applies the accumulated gradients and resets the accumulator.
    fn opt(&mut self) -> Result<()> {
        let _ = self.opt_with_record()?;
        Ok(())
    }

    /// Applies the accumulated gradients and returns some information.
    fn opt_with_record(&mut self) -> Result<Record>;
}
