// Copyright (c) 2025 - Cowboy AI, Inc.
//! Publisher Trait - Base abstraction for pipeline stages
//!
//! Every source and every combinator is a [`Publisher`]. A publisher is cold:
//! each call to [`Publisher::open`] starts an independent replay of its
//! output as a stream of signals.
//!
//! # Signal Protocol
//!
//! ```text
//! Some(Ok(value))  produce-next
//! Some(Err(error)) propagate-error   (terminal)
//! None             propagate-completion (terminal)
//! ```
//!
//! Combinators wrap their source publisher and transform the opened stream.
//! Nothing is evaluated until a terminal operation opens the outermost stage.

use futures::stream::{self, BoxStream, StreamExt};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::errors::{FlowError, FlowResult};

/// A cold producer of signals
pub trait Publisher: Send + Sync + 'static {
    /// The type of value carried by produce-next signals
    type Item: Send + 'static;

    /// Start a fresh replay of this publisher's signals
    fn open(&self) -> BoxStream<'static, FlowResult<Self::Item>>;

    /// Whether a timer-driven stage exists anywhere upstream
    ///
    /// Timed pipelines need a runtime with timers; untimed ones can be
    /// evaluated on the calling thread.
    fn is_timed(&self) -> bool {
        false
    }
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    type Item = P::Item;

    fn open(&self) -> BoxStream<'static, FlowResult<Self::Item>> {
        (**self).open()
    }

    fn is_timed(&self) -> bool {
        (**self).is_timed()
    }
}

/// Type-erased publisher shared by every instance of a pipeline
pub type SharedPublisher<T> = Arc<dyn Publisher<Item = T>>;

/// Finite, ordered source replaying a fixed list of elements
pub struct IterSource<T> {
    items: Arc<[T]>,
}

impl<T> IterSource<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Publisher for IterSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn open(&self) -> BoxStream<'static, FlowResult<T>> {
        // clone lazily, one element per pull
        let items = Arc::clone(&self.items);
        stream::iter((0..items.len()).map(move |index| Ok(items[index].clone()))).boxed()
    }
}

/// Source that completes immediately
pub struct EmptySource<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EmptySource<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for EmptySource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Publisher for EmptySource<T> {
    type Item = T;

    fn open(&self) -> BoxStream<'static, FlowResult<T>> {
        stream::empty().boxed()
    }
}

/// Source that fails immediately with the same error on every replay
pub struct ErrorSource<T> {
    error: FlowError,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ErrorSource<T> {
    pub fn new(error: FlowError) -> Self {
        Self {
            error,
            _marker: PhantomData,
        }
    }
}

impl<T: Send + 'static> Publisher for ErrorSource<T> {
    type Item = T;

    fn open(&self) -> BoxStream<'static, FlowResult<T>> {
        stream::iter(Some(Err(self.error.clone()))).boxed()
    }
}

/// Deferred source: runs the factory once per replay, when first pulled
pub struct FnSource<F> {
    factory: Arc<F>,
}

impl<F> FnSource<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }
}

impl<T, F> Publisher for FnSource<F>
where
    T: Send + 'static,
    F: Fn() -> Option<T> + Send + Sync + 'static,
{
    type Item = T;

    fn open(&self) -> BoxStream<'static, FlowResult<T>> {
        let factory = Arc::clone(&self.factory);
        stream::iter(std::iter::once_with(move || (*factory)()).flatten().map(Ok)).boxed()
    }
}

impl<T> Debug for IterSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IterSource<{}>[{}]", std::any::type_name::<T>(), self.items.len())
    }
}
