#![warn(missing_docs)]
//! Core traits and the training loop of pgrad.
//!
//! This crate is backend independent. It defines
//!
//! * the environment interface ([`Env`], [`Obs`], [`Act`], [`Step`]),
//! * the policy and agent interfaces ([`Policy`], [`Agent`]),
//! * the per-episode buffer ([`Episode`]) and the return calculator ([`returns`]),
//! * records written during training ([`record`]),
//! * the batched REINFORCE training loop ([`Trainer`]).
pub mod error;
pub mod record;
pub mod returns;

mod base;
pub use base::{Act, Agent, Env, Info, Obs, Policy, Step};

mod episode;
pub use episode::Episode;

mod trainer;
pub use trainer::{Phase, Termination, Trainer, TrainerConfig, TrainingSession, TrainingSummary};
