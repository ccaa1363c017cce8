//! Buffer of a single episode.
use crate::Env;

/// Ordered `(observation, action, reward)` triples of one episode.
///
/// The observation at index `t` is the one the action at index `t` was
/// sampled from, and the reward at index `t` is the reward returned by the
/// environment for that action.
pub struct Episode<E: Env> {
    obs: Vec<E::Obs>,
    act: Vec<E::Act>,
    reward: Vec<f32>,
}

impl<E: Env> Default for Episode<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Env> Episode<E> {
    /// Creates an empty episode buffer.
    pub fn new() -> Self {
        Self {
            obs: Vec::new(),
            act: Vec::new(),
            reward: Vec::new(),
        }
    }

    /// Appends a step.
    pub fn push(&mut self, obs: E::Obs, act: E::Act, reward: f32) {
        self.obs.push(obs);
        self.act.push(act);
        self.reward.push(reward);
    }

    /// Number of steps in the episode.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if no step has been pushed.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }

    /// Observations.
    pub fn obs(&self) -> &[E::Obs] {
        &self.obs
    }

    /// Actions.
    pub fn act(&self) -> &[E::Act] {
        &self.act
    }

    /// Rewards.
    pub fn reward(&self) -> &[f32] {
        &self.reward
    }

    /// Sum of the rewards.
    pub fn total_reward(&self) -> f32 {
        self.reward.iter().sum()
    }

    /// Removes all steps, keeping the allocated memory.
    pub fn clear(&mut self) {
        self.obs.clear();
        self.act.clear();
        self.reward.clear();
    }
}
