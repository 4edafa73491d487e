// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pipeline Stages
//!
//! Combinator stages wrap a source [`Publisher`] and transform the stream it
//! opens. Stages never touch their source; composing `map` after `filter`
//! simply nests one stage inside the other.
//!
//! # Available Stages
//!
//! ## Transform
//! - [`Map`] - apply an infallible function, turning panics into errors
//! - [`TryMap`] - apply a fallible function
//! - [`Filter`] - drop elements failing a predicate
//! - [`Take`] - keep the first N elements
//!
//! ## Timing
//! - [`Delay`] - space elements at least a fixed duration apart
//!
//! ## Observation
//! - [`DoOnNext`], [`DoOnComplete`], [`Logged`]
//!
//! ## Reduction
//! - [`Fold`] - reduce to a single accumulated value
//! - [`Last`] - keep only the final element

use futures::future::{self, FutureExt};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::any::Any;
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::publisher::Publisher;
use crate::errors::{FlowError, FlowResult};

/// Stream that runs `hook` when polled, then ends without yielding
fn on_end<T, F>(hook: F) -> impl futures::Stream<Item = FlowResult<T>> + Send + 'static
where
    T: Send + 'static,
    F: FnOnce() + Send + 'static,
{
    stream::once(future::lazy(move |_| hook())).filter_map(|()| future::ready(None::<FlowResult<T>>))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "pipeline stage panicked".to_string()
    }
}

/// Poll the next signal, turning a panic in any stage (a predicate, a hook,
/// a fold step) into a [`FlowError::Transform`] signal.
///
/// A stream that panicked is left in an unknown state and must not be
/// polled again.
pub(crate) async fn next_signal<T>(
    signals: &mut BoxStream<'static, FlowResult<T>>,
) -> Option<FlowResult<T>> {
    match AssertUnwindSafe(signals.next()).catch_unwind().await {
        Ok(signal) => signal,
        Err(payload) => Some(Err(FlowError::transform(panic_message(payload)))),
    }
}

/// Per-element transform
pub struct Map<P, F> {
    source: P,
    f: Arc<F>,
}

impl<P, F> Map<P, F> {
    pub fn new(source: P, f: F) -> Self {
        Self {
            source,
            f: Arc::new(f),
        }
    }
}

impl<P, F, U> Publisher for Map<P, F>
where
    P: Publisher,
    F: Fn(P::Item) -> U + Send + Sync + 'static,
    U: Send + 'static,
{
    type Item = U;

    fn open(&self) -> BoxStream<'static, FlowResult<U>> {
        let f = Arc::clone(&self.f);
        self.source
            .open()
            .map(move |signal| {
                signal.and_then(|value| {
                    panic::catch_unwind(AssertUnwindSafe(|| (*f)(value)))
                        .map_err(|payload| FlowError::transform(panic_message(payload)))
                })
            })
            .boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}

/// Per-element fallible transform; an `Err` becomes [`FlowError::Transform`]
pub struct TryMap<P, F> {
    source: P,
    f: Arc<F>,
}

impl<P, F> TryMap<P, F> {
    pub fn new(source: P, f: F) -> Self {
        Self {
            source,
            f: Arc::new(f),
        }
    }
}

impl<P, F, U, E> Publisher for TryMap<P, F>
where
    P: Publisher,
    F: Fn(P::Item) -> Result<U, E> + Send + Sync + 'static,
    U: Send + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    type Item = U;

    fn open(&self) -> BoxStream<'static, FlowResult<U>> {
        let f = Arc::clone(&self.f);
        self.source
            .open()
            .map(move |signal| signal.and_then(|value| (*f)(value).map_err(FlowError::transform)))
            .boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}

/// Drops elements for which the predicate returns false
pub struct Filter<P, F> {
    source: P,
    predicate: Arc<F>,
}

impl<P, F> Filter<P, F> {
    pub fn new(source: P, predicate: F) -> Self {
        Self {
            source,
            predicate: Arc::new(predicate),
        }
    }
}

impl<P, F> Publisher for Filter<P, F>
where
    P: Publisher,
    F: Fn(&P::Item) -> bool + Send + Sync + 'static,
{
    type Item = P::Item;

    fn open(&self) -> BoxStream<'static, FlowResult<P::Item>> {
        let predicate = Arc::clone(&self.predicate);
        self.source
            .open()
            .try_filter(move |value| future::ready((*predicate)(value)))
            .boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}

/// Forwards at most `count` elements, then completes
pub struct Take<P> {
    source: P,
    count: usize,
}

impl<P> Take<P> {
    pub fn new(source: P, count: usize) -> Self {
        Self { source, count }
    }
}

impl<P: Publisher> Publisher for Take<P> {
    type Item = P::Item;

    fn open(&self) -> BoxStream<'static, FlowResult<P::Item>> {
        self.source.open().take(self.count).boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}

/// Waits `period` before forwarding each element
///
/// The wait for an element starts once the previous element has been
/// delivered downstream (or at subscription for the first), so no two
/// elements arrive closer together than `period`. Errors pass through
/// without waiting. Completion follows the last element's wait.
pub struct Delay<P> {
    source: P,
    period: Duration,
}

impl<P> Delay<P> {
    pub fn new(source: P, period: Duration) -> Self {
        Self { source, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl<P: Publisher> Publisher for Delay<P> {
    type Item = P::Item;

    fn open(&self) -> BoxStream<'static, FlowResult<P::Item>> {
        let period = self.period;
        self.source
            .open()
            .then(move |signal| async move {
                if signal.is_ok() {
                    tokio::time::sleep(period).await;
                }
                signal
            })
            .boxed()
    }

    fn is_timed(&self) -> bool {
        true
    }
}

/// Side effect per element
pub struct DoOnNext<P, F> {
    source: P,
    hook: Arc<F>,
}

impl<P, F> DoOnNext<P, F> {
    pub fn new(source: P, hook: F) -> Self {
        Self {
            source,
            hook: Arc::new(hook),
        }
    }
}

impl<P, F> Publisher for DoOnNext<P, F>
where
    P: Publisher,
    F: Fn(&P::Item) + Send + Sync + 'static,
{
    type Item = P::Item;

    fn open(&self) -> BoxStream<'static, FlowResult<P::Item>> {
        let hook = Arc::clone(&self.hook);
        self.source
            .open()
            .inspect_ok(move |value| (*hook)(value))
            .boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}

/// Side effect on normal completion
///
/// Runs once per replay, after the last element and before the completion
/// reaches the subscriber. Skipped on error or cancellation.
pub struct DoOnComplete<P, F> {
    source: P,
    hook: Arc<F>,
}

impl<P, F> DoOnComplete<P, F> {
    pub fn new(source: P, hook: F) -> Self {
        Self {
            source,
            hook: Arc::new(hook),
        }
    }
}

impl<P, F> Publisher for DoOnComplete<P, F>
where
    P: Publisher,
    F: Fn() + Send + Sync + 'static,
{
    type Item = P::Item;

    fn open(&self) -> BoxStream<'static, FlowResult<P::Item>> {
        let hook = Arc::clone(&self.hook);
        self.source.open().chain(on_end(move || (*hook)())).boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}

/// Emits a `debug` event for every signal passing through
pub struct Logged<P> {
    source: P,
    label: Arc<str>,
}

impl<P> Logged<P> {
    pub fn new(source: P, label: impl Into<Arc<str>>) -> Self {
        Self {
            source,
            label: label.into(),
        }
    }
}

impl<P> Publisher for Logged<P>
where
    P: Publisher,
    P::Item: Debug,
{
    type Item = P::Item;

    fn open(&self) -> BoxStream<'static, FlowResult<P::Item>> {
        let label = Arc::clone(&self.label);
        let end_label = Arc::clone(&self.label);
        debug!(label = %label, "onSubscribe");
        self.source
            .open()
            .inspect(move |signal| match signal {
                Ok(value) => debug!(label = %label, "onNext({:?})", value),
                Err(e) => debug!(label = %label, error = %e, "onError"),
            })
            .chain(on_end(move || debug!(label = %end_label, "onComplete")))
            .boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}

/// Reduces the source to one accumulated value, emitted on completion
pub struct Fold<P, I, F> {
    source: P,
    init: Arc<I>,
    step: Arc<F>,
}

impl<P, I, F> Fold<P, I, F> {
    pub fn new(source: P, init: I, step: F) -> Self {
        Self {
            source,
            init: Arc::new(init),
            step: Arc::new(step),
        }
    }
}

impl<P, I, F, A> Publisher for Fold<P, I, F>
where
    P: Publisher,
    I: Fn() -> A + Send + Sync + 'static,
    F: Fn(A, P::Item) -> A + Send + Sync + 'static,
    A: Send + 'static,
{
    type Item = A;

    fn open(&self) -> BoxStream<'static, FlowResult<A>> {
        let init = Arc::clone(&self.init);
        let step = Arc::clone(&self.step);
        let signals = self.source.open();
        stream::once(async move {
            signals
                .try_fold((*init)(), move |acc, value| future::ready(Ok((*step)(acc, value))))
                .await
        })
        .boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}

/// Keeps only the final element; empty sources stay empty
pub struct Last<P> {
    source: P,
}

impl<P> Last<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }
}

impl<P: Publisher> Publisher for Last<P> {
    type Item = P::Item;

    fn open(&self) -> BoxStream<'static, FlowResult<P::Item>> {
        let signals = self.source.open();
        stream::once(async move {
            signals
                .try_fold(None, |_, value| future::ready(Ok(Some(value))))
                .await
        })
        .filter_map(|last| future::ready(last.transpose()))
        .boxed()
    }

    fn is_timed(&self) -> bool {
        self.source.is_timed()
    }
}
