// Copyright (c) 2025 - Cowboy AI, Inc.
//! SingleValue - Deferred computations yielding at most one value
//!
//! A `SingleValue<T>` resolves to a value, to nothing, or to an error. Like
//! [`Sequence`], it is cold: nothing runs until `block` or `subscribe`, and
//! each evaluation starts over.
//!
//! # Absence is not a value
//!
//! `block()` never invents a placeholder. An empty pipeline fails with
//! [`FlowError::EmptyValue`]; use `block_optional()` when absence is expected.
//!
//! ```rust,ignore
//! let name = SingleValue::of("Sam Axe")
//!     .filter(|name| name.starts_with("foo"))
//!     .block();
//!
//! assert!(name.unwrap_err().is_empty_value());
//! ```

use futures::executor::block_on;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use super::publisher::{EmptySource, ErrorSource, FnSource, IterSource, Publisher, SharedPublisher};
use super::sequence::Sequence;
use super::stage::{next_signal, Delay, DoOnNext, Filter, Map, TryMap};
use super::subscriber::{take_slot, SlotSubscriber, Subscription};
use crate::errors::{FlowError, FlowResult};
use crate::gate::GateOutcome;
use crate::scheduler::Scheduler;

/// Container for a deferred computation yielding at most one result
pub struct SingleValue<T> {
    publisher: SharedPublisher<T>,
}

impl<T> Clone for SingleValue<T> {
    fn clone(&self) -> Self {
        Self {
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<T> Debug for SingleValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SingleValue<{}>", std::any::type_name::<T>())
    }
}

impl<T: Clone + Send + Sync + 'static> SingleValue<T> {
    /// Hold `value`; each evaluation yields a clone of it
    pub fn of(value: T) -> Self {
        Self::from_publisher(IterSource::new(Some(value)))
    }
}

impl<T: Send + 'static> SingleValue<T> {
    /// Wrap a publisher known to produce at most one element
    pub(crate) fn from_publisher<P>(publisher: P) -> Self
    where
        P: Publisher<Item = T>,
    {
        Self {
            publisher: Arc::new(publisher),
        }
    }

    /// Resolves to nothing
    pub fn empty() -> Self {
        Self::from_publisher(EmptySource::new())
    }

    /// Resolves to `error`
    pub fn error(error: FlowError) -> Self {
        Self::from_publisher(ErrorSource::new(error))
    }

    /// Defer to `factory`, called once per evaluation; `None` means empty
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        Self::from_publisher(FnSource::new(factory))
    }

    pub fn is_timed(&self) -> bool {
        self.publisher.is_timed()
    }

    /// Apply `f` on evaluation. A panic in `f` resolves to
    /// [`FlowError::Transform`].
    pub fn map<U, F>(&self, f: F) -> SingleValue<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        SingleValue::from_publisher(Map::new(Arc::clone(&self.publisher), f))
    }

    /// Apply a fallible `f` on evaluation; its error becomes the cause of a
    /// [`FlowError::Transform`]
    pub fn try_map<U, E, F>(&self, f: F) -> SingleValue<U>
    where
        U: Send + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        SingleValue::from_publisher(TryMap::new(Arc::clone(&self.publisher), f))
    }

    /// Keep the value only if `predicate` accepts it, otherwise resolve empty
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::from_publisher(Filter::new(Arc::clone(&self.publisher), predicate))
    }

    /// Hold the value back for `period`
    pub fn delay_element(&self, period: Duration) -> Self {
        Self::from_publisher(Delay::new(Arc::clone(&self.publisher), period))
    }

    pub fn do_on_next<F>(&self, hook: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self::from_publisher(DoOnNext::new(Arc::clone(&self.publisher), hook))
    }

    /// View as a sequence of zero or one element
    pub fn into_sequence(self) -> Sequence<T> {
        Sequence::from_shared(self.publisher)
    }

    /// Evaluate and return the value.
    ///
    /// Fails with [`FlowError::EmptyValue`] when the pipeline resolved to
    /// nothing. Timed pipelines wait on the shared scheduler, so this must not
    /// be called from one of the scheduler's own worker threads.
    pub fn block(&self) -> FlowResult<T> {
        self.block_optional()?.ok_or(FlowError::EmptyValue)
    }

    /// Evaluate, reporting absence as `Ok(None)`
    pub fn block_optional(&self) -> FlowResult<Option<T>> {
        if !self.is_timed() {
            return block_on(next_signal(&mut self.publisher.open())).transpose();
        }
        let (subscription, slot) = self.subscribe_slot()?;
        subscription.join();
        take_slot(&slot)
    }

    /// Like [`block`](Self::block), giving up with [`FlowError::Timeout`]
    /// after `timeout`. The abandoned evaluation is cancelled.
    pub fn block_timeout(&self, timeout: Duration) -> FlowResult<T> {
        if !self.is_timed() {
            return self.block();
        }
        let (subscription, slot) = self.subscribe_slot()?;
        if subscription.join_timeout(timeout) == GateOutcome::TimedOut {
            subscription.cancel();
            return Err(FlowError::Timeout(timeout));
        }
        take_slot(&slot)?.ok_or(FlowError::EmptyValue)
    }

    fn subscribe_slot(&self) -> FlowResult<(Subscription, super::subscriber::Slot<T>)> {
        let scheduler = Scheduler::shared()?;
        let (subscriber, slot) = SlotSubscriber::new();
        let subscription = self.clone().into_sequence().subscribe_on(&scheduler, subscriber);
        Ok((subscription, slot))
    }

    /// Evaluate asynchronously: `on_value` then `on_complete`, `on_complete`
    /// alone when empty, or `on_error` alone
    pub fn subscribe<N, E, C>(&self, on_value: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(FlowError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.clone()
            .into_sequence()
            .subscribe(on_value, on_error, on_complete)
    }
}

impl<T: Send + 'static> From<SingleValue<T>> for Sequence<T> {
    fn from(single: SingleValue<T>) -> Self {
        single.into_sequence()
    }
}
