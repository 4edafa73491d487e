//! Error types for reactive pipelines

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A cause shared between replays of a cold pipeline
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by pipelines, terminal operations and the scheduler
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    /// The pipeline completed without producing a value where one was required
    #[error("pipeline resolved to no value")]
    EmptyValue,

    /// A map function failed
    #[error("transform failed: {0}")]
    Transform(#[source] SharedError),

    /// An error injected by an error source
    #[error("upstream error: {0}")]
    Upstream(#[source] SharedError),

    /// Blocking read did not observe a terminal signal in time
    #[error("no terminal signal within {0:?}")]
    Timeout(Duration),

    /// The subscription backing a blocking read was cancelled
    #[error("subscription cancelled")]
    Cancelled,

    /// The shared timer runtime is unavailable
    #[error("scheduler unavailable: {0}")]
    Scheduler(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for pipeline operations
pub type FlowResult<T> = Result<T, FlowError>;

impl FlowError {
    /// Wrap any error as the cause of a failed transform
    pub fn transform<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        FlowError::Transform(Arc::from(err.into()))
    }

    /// Wrap any error as an upstream failure
    pub fn upstream<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        FlowError::Upstream(Arc::from(err.into()))
    }

    /// True for the absence marker raised by `block()`
    pub fn is_empty_value(&self) -> bool {
        matches!(self, FlowError::EmptyValue)
    }

    /// True for failures raised inside a map function
    pub fn is_transform(&self) -> bool {
        matches!(self, FlowError::Transform(_))
    }
}
