// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reactive Pipeline Demo
//!
//! Walks through single-value and sequence pipelines over a small cast of
//! people, logging every step.
//!
//! Run with: RUST_LOG=debug cargo run --bin flow-demo
//!
//! Environment:
//! - `DEMO_DELAY_MS`: spacing for the delayed scenarios (default 1000)
//! - `CIM_REACTIVE_WORKER_THREADS`, `CIM_REACTIVE_THREAD_NAME`: scheduler

use anyhow::{Context, Result};
use cim_reactive::{CompletionGate, FlowError, Scheduler, SchedulerConfig, Sequence, SingleValue};
use std::time::Duration;
use tracing::{error, info, warn};

/// Configuration for the demo run
#[derive(Debug, Clone)]
struct DemoConfig {
    /// Delay between elements in the timed scenarios
    delay: Duration,
    /// Scheduler settings
    scheduler: SchedulerConfig,
}

impl DemoConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let delay_ms = match std::env::var("DEMO_DELAY_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("DEMO_DELAY_MS is not a number: {raw}"))?,
            Err(_) => 1000,
        };

        let scheduler = SchedulerConfig::from_env().context("Invalid scheduler configuration")?;

        Ok(Self {
            delay: Duration::from_millis(delay_ms),
            scheduler,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Person {
    first_name: String,
    last_name: String,
}

impl Person {
    fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    fn say_my_name(&self) -> String {
        format!("My Name is {} {}.", self.first_name, self.last_name)
    }
}

fn cast() -> Vec<Person> {
    vec![
        Person::new("Michael", "Weston"),
        Person::new("Fiona", "Glenanne"),
        Person::new("Sam", "Axe"),
        Person::new("Jesse", "Porter"),
    ]
}

fn log_error(e: FlowError) {
    error!("pipeline failed: {}", e);
}

fn single_values() -> Result<()> {
    info!("=== Single values ===");

    let michael = SingleValue::of(Person::new("Michael", "Weston"))
        .block()
        .context("Failed to read single value")?;
    info!("{}", michael.say_my_name());

    let shouted = SingleValue::of(Person::new("Fiona", "Glenanne"))
        .map(|person| person.say_my_name().to_uppercase())
        .block()
        .context("Failed to map single value")?;
    info!("{}", shouted);

    match SingleValue::of(Person::new("Sam", "Axe"))
        .filter(|person| person.first_name.eq_ignore_ascii_case("foo"))
        .block()
    {
        Ok(person) => warn!("Filter unexpectedly kept {}", person.first_name),
        Err(e) => info!("Filtered single value is absent: {}", e),
    }

    Ok(())
}

fn sequences() {
    info!("=== Sequences ===");
    let people = Sequence::of(cast());

    people.subscribe(|person| info!("{}", person.say_my_name()), log_error, || {});

    people
        .filter(|person| person.first_name == "Fiona")
        .subscribe(|person| info!("Filtered: {}", person.say_my_name()), log_error, || {});
}

fn delayed_sequences(delay: Duration) -> Result<()> {
    info!("=== Delayed sequences ({:?} apart) ===", delay);
    let people = Sequence::of(cast());

    let gate = CompletionGate::new();
    let done = gate.clone();
    people
        .delay_elements(delay)
        .do_on_complete(move || {
            done.signal();
        })
        .subscribe(|person| info!("{}", person.say_my_name()), log_error, || {});
    gate.wait();

    let gate = CompletionGate::new();
    let done = gate.clone();
    let subscription = people
        .delay_elements(delay)
        .filter(|person| person.first_name.contains('i'))
        .log("with-i")
        .do_on_complete(move || {
            done.signal();
        })
        .subscribe(|person| info!("Has an i: {}", person.first_name), log_error, || {});

    let budget = delay * (cast().len() as u32 + 1);
    if !gate.wait_timeout(budget).is_signaled() {
        subscription.cancel();
        anyhow::bail!("Delayed filter did not complete within {:?}", budget);
    }

    let names = people
        .delay_elements(delay / 4)
        .map(|person| person.first_name)
        .collect_list()
        .block()
        .context("Failed to collect delayed names")?;
    info!("Collected names: {}", names.join(", "));

    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting reactive pipeline demo");

    let config = DemoConfig::from_env()?;
    info!("Configuration loaded:");
    info!("  - Delay: {:?}", config.delay);
    info!("  - Worker threads: {}", config.scheduler.worker_threads);

    Scheduler::init_shared(config.scheduler.clone()).context("Failed to start scheduler")?;

    single_values()?;
    sequences();
    delayed_sequences(config.delay)?;

    info!("Demo finished");
    Ok(())
}
