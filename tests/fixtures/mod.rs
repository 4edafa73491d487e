// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-reactive
//!
//! Provides a fixed cast of people and a recording subscriber that stamps
//! every signal with the time it arrived.
//!
//! # Design Principles
//! - Fixtures are deterministic: the cast never changes between tests
//! - Tests wait on gates or subscriptions, never on fixed sleeps

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Instant;

use cim_reactive::{FlowError, Subscriber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    pub fn say_my_name(&self) -> String {
        format!("My Name is {} {}.", self.first_name, self.last_name)
    }
}

pub fn michael() -> Person {
    Person::new("Michael", "Weston")
}

pub fn fiona() -> Person {
    Person::new("Fiona", "Glenanne")
}

pub fn sam() -> Person {
    Person::new("Sam", "Axe")
}

pub fn jesse() -> Person {
    Person::new("Jesse", "Porter")
}

/// Michael, Fiona, Sam, Jesse, in that order
pub fn cast() -> Vec<Person> {
    vec![michael(), fiona(), sam(), jesse()]
}

/// A signal observed by [`Recorder`]
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    Next(T),
    Error(String),
    Complete,
}

/// Shared log written by a [`Recorder`]
pub type EventLog<T> = Arc<Mutex<Vec<(Event<T>, Instant)>>>;

/// Subscriber that records every signal with its arrival time
pub struct Recorder<T> {
    log: EventLog<T>,
}

impl<T> Recorder<T> {
    pub fn new() -> (Self, EventLog<T>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
            },
            log,
        )
    }

    fn push(&self, event: Event<T>) {
        self.log.lock().unwrap().push((event, Instant::now()));
    }
}

impl<T: Send + 'static> Subscriber<T> for Recorder<T> {
    fn on_next(&mut self, value: T) {
        self.push(Event::Next(value));
    }

    fn on_error(&mut self, error: FlowError) {
        self.push(Event::Error(error.to_string()));
    }

    fn on_complete(&mut self) {
        self.push(Event::Complete);
    }
}

/// Events without their timestamps
pub fn events<T: Clone>(log: &EventLog<T>) -> Vec<Event<T>> {
    log.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
}

/// Arrival times of the `Next` events only
pub fn next_times<T>(log: &EventLog<T>) -> Vec<Instant> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(e, _)| matches!(e, Event::Next(_)))
        .map(|(_, at)| *at)
        .collect()
}
