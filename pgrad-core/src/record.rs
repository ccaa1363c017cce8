//! Types and traits for recording training metrics.
//!
//! The [`Trainer`](crate::Trainer) writes one [`Record`] per batch of
//! episodes to a [`Recorder`]. A record is a set of key-value pairs.
//!
//! ```rust
//! use pgrad_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(25.0));
//! record.insert("batch_reward", RecordValue::Scalar(13.4));
//! assert_eq!(record.get_scalar("episode").unwrap(), 25.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
