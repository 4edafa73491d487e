// Copyright (c) 2025 - Cowboy AI, Inc.
//! Sequence - Ordered, cold, finite streams
//!
//! A `Sequence<T>` describes an ordered production of zero or more values
//! followed by completion or an error. Building a sequence evaluates nothing;
//! every subscription replays it from the start.
//!
//! # Examples
//!
//! ```rust,ignore
//! use cim_reactive::{CompletionGate, Sequence};
//! use std::time::Duration;
//!
//! let gate = CompletionGate::new();
//! let done = gate.clone();
//!
//! Sequence::of(vec!["Michael", "Fiona", "Sam", "Jesse"])
//!     .delay_elements(Duration::from_secs(1))
//!     .filter(|name| name.contains('i'))
//!     .do_on_complete(move || { done.signal(); })
//!     .subscribe(|name| println!("{name}"), |_| {}, || {});
//!
//! gate.wait();
//! ```

use futures::executor::block_on;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::publisher::{EmptySource, ErrorSource, IterSource, Publisher, SharedPublisher};
use super::single::SingleValue;
use super::stage::{
    Delay, DoOnComplete, DoOnNext, Filter, Fold, Last, Logged, Map, Take, TryMap,
};
use super::subscriber::{LambdaSubscriber, Subscriber, Subscription};
use crate::errors::{FlowError, FlowResult};
use crate::scheduler::Scheduler;

/// Lazy, ordered, finite stream of values
pub struct Sequence<T> {
    publisher: SharedPublisher<T>,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<T> Debug for Sequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sequence<{}>", std::any::type_name::<T>())
    }
}

impl<T: Clone + Send + Sync + 'static> Sequence<T> {
    /// A sequence replaying `items` in order
    pub fn of(items: impl IntoIterator<Item = T>) -> Self {
        Self::from_publisher(IterSource::new(items))
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<T: Send + 'static> Sequence<T> {
    /// Wrap any publisher as a sequence
    pub fn from_publisher<P>(publisher: P) -> Self
    where
        P: Publisher<Item = T>,
    {
        Self {
            publisher: Arc::new(publisher),
        }
    }

    pub(crate) fn from_shared(publisher: SharedPublisher<T>) -> Self {
        Self { publisher }
    }

    /// A sequence that completes without elements
    pub fn empty() -> Self {
        Self::from_publisher(EmptySource::new())
    }

    /// A sequence that fails immediately
    pub fn error(error: FlowError) -> Self {
        Self::from_publisher(ErrorSource::new(error))
    }

    pub fn publisher(&self) -> &SharedPublisher<T> {
        &self.publisher
    }

    /// Whether subscribing needs the timer scheduler
    pub fn is_timed(&self) -> bool {
        self.publisher.is_timed()
    }

    /// Transform every element. A panic in `f` terminates the sequence
    /// with [`FlowError::Transform`].
    pub fn map<U, F>(&self, f: F) -> Sequence<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Sequence::from_publisher(Map::new(Arc::clone(&self.publisher), f))
    }

    /// Transform every element with a fallible function
    pub fn try_map<U, E, F>(&self, f: F) -> Sequence<U>
    where
        U: Send + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        Sequence::from_publisher(TryMap::new(Arc::clone(&self.publisher), f))
    }

    /// Keep only elements matching `predicate`
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::from_publisher(Filter::new(Arc::clone(&self.publisher), predicate))
    }

    /// Deliver each element no sooner than `period` after the previous one
    pub fn delay_elements(&self, period: Duration) -> Self {
        Self::from_publisher(Delay::new(Arc::clone(&self.publisher), period))
    }

    /// Keep the first `count` elements
    pub fn take(&self, count: usize) -> Self {
        Self::from_publisher(Take::new(Arc::clone(&self.publisher), count))
    }

    pub fn do_on_next<F>(&self, hook: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self::from_publisher(DoOnNext::new(Arc::clone(&self.publisher), hook))
    }

    /// Run `hook` once per subscription after the last element, before the
    /// subscriber sees completion
    pub fn do_on_complete<F>(&self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::from_publisher(DoOnComplete::new(Arc::clone(&self.publisher), hook))
    }

    /// Trace every signal at `debug` level under `label`
    pub fn log(&self, label: impl Into<Arc<str>>) -> Self
    where
        T: Debug,
    {
        Self::from_publisher(Logged::new(Arc::clone(&self.publisher), label))
    }

    /// The first element
    pub fn next(&self) -> SingleValue<T> {
        SingleValue::from_publisher(Take::new(Arc::clone(&self.publisher), 1))
    }

    /// The last element
    pub fn last(&self) -> SingleValue<T> {
        SingleValue::from_publisher(Last::new(Arc::clone(&self.publisher)))
    }

    /// All elements, in order
    pub fn collect_list(&self) -> SingleValue<Vec<T>> {
        SingleValue::from_publisher(Fold::new(
            Arc::clone(&self.publisher),
            Vec::new,
            |mut items: Vec<T>, item: T| {
                items.push(item);
                items
            },
        ))
    }

    /// Number of elements
    pub fn count(&self) -> SingleValue<usize> {
        SingleValue::from_publisher(Fold::new(
            Arc::clone(&self.publisher),
            || 0usize,
            |count: usize, _: T| count + 1,
        ))
    }

    /// Block for the first element; an empty sequence is [`FlowError::EmptyValue`]
    pub fn block_first(&self) -> FlowResult<T> {
        self.next().block()
    }

    /// Block for the last element; an empty sequence is [`FlowError::EmptyValue`]
    pub fn block_last(&self) -> FlowResult<T> {
        self.last().block()
    }

    /// Subscribe with three callbacks
    pub fn subscribe<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(FlowError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.subscribe_with(LambdaSubscriber::new(on_next, on_error, on_complete))
    }

    /// Subscribe with any [`Subscriber`].
    ///
    /// Untimed pipelines are driven to termination on the calling thread
    /// before this returns. Timed pipelines are submitted to the shared
    /// scheduler and this returns immediately; callbacks then run on the
    /// scheduler's worker threads.
    pub fn subscribe_with<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<T>,
    {
        if !self.is_timed() {
            let subscription = Subscription::new();
            block_on(subscription.drive(self.publisher.open(), subscriber));
            return subscription;
        }

        match Scheduler::shared() {
            Ok(scheduler) => self.subscribe_on(&scheduler, subscriber),
            Err(error) => {
                debug!(error = %error, "Cannot schedule timed subscription");
                let mut subscriber = subscriber;
                subscriber.on_error(error);
                Subscription::finished()
            }
        }
    }

    /// Subscribe as a task on `scheduler`, timed or not
    pub fn subscribe_on<S>(&self, scheduler: &Scheduler, subscriber: S) -> Subscription
    where
        S: Subscriber<T>,
    {
        let subscription = Subscription::new();
        subscription.launch(scheduler, subscription.drive(self.publisher.open(), subscriber));
        subscription
    }
}
