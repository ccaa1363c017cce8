//! State of a training run.

/// Phase of the training loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Stepping through the current episode.
    Collecting,

    /// The current episode ended; its gradient is computed and accumulated.
    EpisodeDone,

    /// A batch of episodes is complete; accumulated gradients are applied.
    BatchBoundary,

    /// Training finished.
    Terminated(Termination),
}

/// Why training finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    /// The average reward of a batch exceeded the solve threshold.
    Solved,

    /// The episode budget was exhausted.
    BudgetExhausted,
}

/// Counters and running statistics owned by the training loop.
#[derive(Debug, Clone)]
pub struct TrainingSession {
    /// Number of completed episodes.
    pub episode: usize,

    /// Number of applied optimization steps.
    pub batch: usize,

    /// Sum of the rewards of the episodes in the current batch.
    pub batch_reward_sum: f32,

    /// Sum of the episode losses in the current batch.
    pub batch_loss_sum: f32,

    /// Exponentially smoothed batch reward sum, `None` before the first batch.
    pub running_reward: Option<f32>,

    /// Once set, the environment is rendered at every step.
    pub rendering: bool,

    /// Current phase.
    pub phase: Phase,
}

impl Default for TrainingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingSession {
    /// Creates a session at the start of a run.
    pub fn new() -> Self {
        Self {
            episode: 0,
            batch: 0,
            batch_reward_sum: 0.0,
            batch_loss_sum: 0.0,
            running_reward: None,
            rendering: false,
            phase: Phase::Collecting,
        }
    }

    /// Updates the running reward with the reward sum of the finished batch.
    pub fn update_running_reward(&mut self, decay: f32) -> f32 {
        let running = match self.running_reward {
            None => self.batch_reward_sum,
            Some(r) => r * decay + self.batch_reward_sum * (1.0 - decay),
        };
        self.running_reward = Some(running);
        running
    }

    /// Clears the per-batch sums.
    pub fn reset_batch(&mut self) {
        self.batch_reward_sum = 0.0;
        self.batch_loss_sum = 0.0;
    }
}

/// Result of [`Trainer::train`](super::Trainer::train).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Number of completed episodes.
    pub episodes: usize,

    /// Number of applied optimization steps.
    pub batches: usize,

    /// Running reward divided by the batch size.
    pub running_reward: Option<f32>,

    /// Average episode reward of the last complete batch.
    pub last_batch_reward: Option<f32>,

    /// Why training finished.
    pub termination: Termination,
}
