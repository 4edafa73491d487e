//! Cold reactive pipelines for the Composable Information Machine
//!
//! This crate provides single-value and sequence pipelines with lazy
//! transformation, filtering, timed delay, blocking reads and asynchronous
//! subscriptions, plus a completion gate for waiting on them.

pub mod config;
pub mod errors;
pub mod flow;
pub mod gate;
pub mod scheduler;

// Re-export commonly used types
pub use config::SchedulerConfig;
pub use errors::{FlowError, FlowResult, SharedError};
pub use flow::{Publisher, Sequence, SingleValue, Subscriber, Subscription};
pub use gate::{CompletionGate, GateOutcome};
pub use scheduler::Scheduler;
