// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reactive Pipelines
//!
//! This module provides cold, lazily evaluated pipelines in two shapes.
//!
//! # Core Concepts
//!
//! ## SingleValue<T>
//!
//! A computation resolving to at most one value.
//!
//! ```text
//! Time: ────────────────────────────→
//! Value:          ●|          (value, then completion)
//!                  |          (empty: completion only)
//!                  X          (error)
//! ```
//!
//! ## Sequence<T>
//!
//! An ordered, finite production of values followed by a terminal signal.
//!
//! ```text
//! Time: ────────────────────────────→
//! Value:   ●   ●   ●   ●|
//! ```
//!
//! # Stages
//!
//! Both shapes are thin handles over a [`Publisher`]. Every combinator wraps
//! the current publisher in a new stage; the source is never modified and can
//! be reused:
//!
//! ```text
//! Sequence::of(..)  ->  Delay  ->  Filter  ->  DoOnComplete
//!   IterSource         (timed)                   (hook)
//! ```
//!
//! # Evaluation
//!
//! Terminal operations open the outermost stage. Untimed pipelines run on the
//! calling thread. Pipelines containing a delay run as tasks on a
//! [`Scheduler`](crate::scheduler::Scheduler).
//!
//! ```rust,ignore
//! use cim_reactive::flow::*;
//!
//! let fiona = SingleValue::of("Fiona").map(|name| name.to_uppercase());
//! assert_eq!(fiona.block()?, "FIONA");
//! ```

pub mod publisher;
pub mod sequence;
pub mod single;
pub mod stage;
pub mod subscriber;

pub use publisher::{Publisher, SharedPublisher};
pub use sequence::Sequence;
pub use single::SingleValue;
pub use subscriber::{LambdaSubscriber, Subscriber, Subscription};
