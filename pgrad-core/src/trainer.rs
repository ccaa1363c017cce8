//! Train [`Agent`].
mod config;
mod session;
use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, Episode, Step,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{debug, info};
pub use session::{Phase, Termination, TrainingSession, TrainingSummary};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the batched REINFORCE training loop.
///
/// # Training loop
///
/// The loop is a state machine over [`Phase`]:
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Collecting
///     Collecting --> Collecting: step, not done
///     Collecting --> EpisodeDone: done
///     EpisodeDone --> Collecting: episode % batch_size != 0
///     EpisodeDone --> BatchBoundary: episode % batch_size == 0
///     EpisodeDone --> Terminated: budget exhausted
///     BatchBoundary --> Collecting: not solved
///     BatchBoundary --> Terminated: solved or budget exhausted
///     Terminated --> [*]
/// ```
///
/// 1. `Collecting`: the agent samples an action for the current observation,
///    the environment is stepped and `(obs, act, reward)` is pushed into the
///    [`Episode`] buffer. The reward is added to the batch reward sum.
/// 2. `EpisodeDone`: the episode counter is incremented and the episode is
///    handed to [`Agent::accumulate`], which computes and accumulates its
///    gradient. The episode buffer is cleared.
/// 3. `BatchBoundary`: entered only when the episode counter is a multiple of
///    `batch_size`. [`Agent::opt_with_record`] applies the accumulated
///    gradients, the running reward is updated, progress is logged and a
///    [`Record`] is written to the recorder. The record includes the one
///    returned by [`Env::step`] at the end of the last episode. If the average episode reward of
///    the batch exceeds `solve_threshold`, training stops.
/// 4. Training also stops after `max_episodes` episodes.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn batch_average(&self, sum: f32) -> f32 {
        sum / self.config.batch_size as f32
    }

    /// Train the agent.
    pub fn train<E, A>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        recorder: &mut dyn Recorder,
    ) -> Result<TrainingSummary>
    where
        E: Env,
        A: Agent<E>,
    {
        let mut session = TrainingSession::new();
        let mut episode = Episode::<E>::new();
        let mut last_batch_reward = None;
        let mut env_record = Record::empty();

        if self.config.max_episodes == 0 {
            session.phase = Phase::Terminated(Termination::BudgetExhausted);
        }
        let mut obs = match session.phase {
            Phase::Terminated(_) => None,
            _ => Some(env.reset()?),
        };

        loop {
            match session.phase {
                Phase::Collecting => {
                    if self.config.render {
                        if self.batch_average(session.batch_reward_sum)
                            > self.config.render_threshold
                        {
                            session.rendering = true;
                        }
                        if session.rendering {
                            env.render();
                        }
                    }

                    let prev_obs = match obs.take() {
                        Some(o) => o,
                        None => env.reset()?,
                    };
                    let act = agent.sample(&prev_obs)?;
                    let (step, record) = env.step(&act);
                    let is_done = step.is_done();
                    let Step {
                        obs: next_obs,
                        reward,
                        ..
                    } = step;

                    session.batch_reward_sum += reward;
                    episode.push(prev_obs, act, reward);
                    obs = Some(next_obs);

                    if is_done {
                        env_record = record;
                        session.phase = Phase::EpisodeDone;
                    }
                }
                Phase::EpisodeDone => {
                    session.episode += 1;
                    let record = agent.accumulate(&episode)?;
                    if let Ok(loss) = record.get_scalar("loss") {
                        session.batch_loss_sum += loss;
                    }
                    debug!(
                        "Episode {}: {} steps, reward {}",
                        session.episode,
                        episode.len(),
                        episode.total_reward()
                    );
                    episode.clear();

                    session.phase = if session.episode % self.config.batch_size == 0 {
                        Phase::BatchBoundary
                    } else if session.episode >= self.config.max_episodes {
                        Phase::Terminated(Termination::BudgetExhausted)
                    } else {
                        obs = Some(env.reset()?);
                        Phase::Collecting
                    };
                }
                Phase::BatchBoundary => {
                    let record_agent = agent.opt_with_record()?;
                    session.batch += 1;

                    let batch_reward = self.batch_average(session.batch_reward_sum);
                    let running_reward = self.batch_average(
                        session.update_running_reward(self.config.running_reward_decay),
                    );
                    last_batch_reward = Some(batch_reward);
                    info!(
                        "Average reward for episode {:.6}.  Total average reward {:.6}.",
                        batch_reward, running_reward
                    );

                    let mut record = Record::from_slice(&[
                        ("episode", Scalar(session.episode as f32)),
                        ("batch", Scalar(session.batch as f32)),
                        ("batch_reward", Scalar(batch_reward)),
                        ("running_reward", Scalar(running_reward)),
                        ("loss", Scalar(self.batch_average(session.batch_loss_sum))),
                    ]);
                    record.merge_inplace(record_agent);
                    record.merge_inplace(std::mem::take(&mut env_record));
                    recorder.write(record);

                    let solved = self
                        .config
                        .solve_threshold
                        .map_or(false, |th| batch_reward > th);
                    session.phase = if solved {
                        info!("Task solved in {} episodes!", session.episode);
                        Phase::Terminated(Termination::Solved)
                    } else if session.episode >= self.config.max_episodes {
                        Phase::Terminated(Termination::BudgetExhausted)
                    } else {
                        session.reset_batch();
                        obs = Some(env.reset()?);
                        Phase::Collecting
                    };
                }
                Phase::Terminated(termination) => {
                    info!("{} Episodes completed.", session.episode);
                    return Ok(TrainingSummary {
                        episodes: session.episode,
                        batches: session.batch,
                        running_reward: session.running_reward.map(|r| self.batch_average(r)),
                        last_batch_reward,
                        termination,
                    });
                }
            }
        }
    }
}
