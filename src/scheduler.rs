// Copyright (c) 2025 - Cowboy AI, Inc.
//! Timer scheduler for delayed pipelines
//!
//! Timed pipelines are driven as tasks submitted to a tokio runtime. The
//! shared scheduler owns a process-wide multi-thread runtime that is built on
//! first use; callers that already run their own runtime can hand its
//! [`Handle`] to [`Scheduler::from_handle`] instead.

use std::future::Future;
use std::sync::OnceLock;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::SchedulerConfig;
use crate::errors::{FlowError, FlowResult};

static SHARED: OnceLock<Result<Runtime, String>> = OnceLock::new();

/// Submits pipeline drivers to a tokio runtime
#[derive(Clone, Debug)]
pub struct Scheduler {
    handle: Handle,
}

impl Scheduler {
    /// The process-wide scheduler, configured from the environment on first use
    pub fn shared() -> FlowResult<Self> {
        if let Some(existing) = SHARED.get() {
            return Self::from_shared(existing);
        }
        let config = SchedulerConfig::from_env()?;
        // losing a first-use race to another thread is not worth a warning
        let (runtime, _) = get_or_build(&config);
        Self::from_shared(runtime)
    }

    /// Build the shared scheduler with an explicit configuration.
    ///
    /// Has no effect on the configuration if the shared scheduler already
    /// exists; the existing one is returned.
    pub fn init_shared(config: SchedulerConfig) -> FlowResult<Self> {
        let (runtime, built_here) = get_or_build(&config);
        if !built_here {
            warn!("shared scheduler already initialized, ignoring {:?}", config);
        }
        Self::from_shared(runtime)
    }

    fn from_shared(runtime: &Result<Runtime, String>) -> FlowResult<Self> {
        match runtime {
            Ok(runtime) => Ok(Self::from_handle(runtime.handle().clone())),
            Err(e) => Err(FlowError::Scheduler(e.clone())),
        }
    }

    /// Use an existing runtime. The runtime must have timers enabled.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// The runtime the caller is currently running on, if any
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::from_handle)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(task)
    }
}

/// The shared runtime, and whether this call built it
fn get_or_build(config: &SchedulerConfig) -> (&'static Result<Runtime, String>, bool) {
    let mut built_here = false;
    let runtime = SHARED.get_or_init(|| {
        built_here = true;
        build_runtime(config)
    });
    (runtime, built_here)
}

fn build_runtime(config: &SchedulerConfig) -> Result<Runtime, String> {
    config.validate().map_err(|e| e.to_string())?;

    let runtime = Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(config.thread_name.clone())
        .enable_all()
        .build()
        .map_err(|e| e.to_string())?;

    info!(
        "Started shared scheduler with {} worker threads ({})",
        config.worker_threads, config.thread_name
    );
    Ok(runtime)
}
