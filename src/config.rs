// Copyright (c) 2025 - Cowboy AI, Inc.

//! Scheduler configuration

use serde::{Deserialize, Serialize};

use crate::errors::{FlowError, FlowResult};

/// Environment variable for the number of timer worker threads
pub const WORKER_THREADS_ENV: &str = "CIM_REACTIVE_WORKER_THREADS";

/// Environment variable for the timer worker thread name
pub const THREAD_NAME_ENV: &str = "CIM_REACTIVE_THREAD_NAME";

/// Configuration for the shared timer runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of worker threads running delayed callbacks
    pub worker_threads: usize,

    /// Name given to every worker thread
    pub thread_name: String,
}

impl SchedulerConfig {
    /// Create a configuration with the given worker count
    pub fn new(worker_threads: usize) -> Self {
        Self {
            worker_threads,
            ..Self::default()
        }
    }

    /// Set the worker thread name
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Load configuration from the environment, falling back to defaults
    /// for unset variables
    pub fn from_env() -> FlowResult<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(WORKER_THREADS_ENV) {
            config.worker_threads = raw.trim().parse().map_err(|_| {
                FlowError::Configuration(format!("{WORKER_THREADS_ENV} is not a number: {raw}"))
            })?;
        }

        if let Ok(name) = std::env::var(THREAD_NAME_ENV) {
            config.thread_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the runtime builder cannot honor
    pub fn validate(&self) -> FlowResult<()> {
        if self.worker_threads == 0 {
            return Err(FlowError::Configuration(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.thread_name.is_empty() {
            return Err(FlowError::Configuration(
                "thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            thread_name: "cim-reactive-timer".to_string(),
        }
    }
}
