// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscribers and Subscriptions
//!
//! A [`Subscriber`] receives the signals of one replay of a pipeline. The
//! [`Subscription`] returned by `subscribe` is the holder's handle on that
//! replay: it can cancel it and wait for it to terminate.
//!
//! ```text
//! on_next* (on_complete | on_error)?
//! ```
//!
//! After a terminal signal, or after cancellation, nothing more is delivered.
//! Dropping a [`Subscription`] does not cancel it.

use futures::stream::BoxStream;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use uuid::Uuid;

use super::stage::next_signal;
use crate::errors::{FlowError, FlowResult};
use crate::gate::{CompletionGate, GateOutcome};
use crate::scheduler::Scheduler;

/// Receiver of pipeline signals
pub trait Subscriber<T>: Send + 'static {
    /// Called once per element, in source order
    fn on_next(&mut self, value: T);

    /// Terminal: the pipeline failed
    fn on_error(&mut self, error: FlowError);

    /// Terminal: the pipeline completed normally
    fn on_complete(&mut self);
}

/// Subscriber assembled from three closures
pub struct LambdaSubscriber<N, E, C> {
    on_next: N,
    on_error: E,
    on_complete: C,
}

impl<N, E, C> LambdaSubscriber<N, E, C> {
    pub fn new(on_next: N, on_error: E, on_complete: C) -> Self {
        Self {
            on_next,
            on_error,
            on_complete,
        }
    }
}

impl<T, N, E, C> Subscriber<T> for LambdaSubscriber<N, E, C>
where
    N: FnMut(T) + Send + 'static,
    E: FnMut(FlowError) + Send + 'static,
    C: FnMut() + Send + 'static,
{
    fn on_next(&mut self, value: T) {
        (self.on_next)(value)
    }

    fn on_error(&mut self, error: FlowError) {
        (self.on_error)(error)
    }

    fn on_complete(&mut self) {
        (self.on_complete)()
    }
}

/// Result slot shared between a blocking reader and its subscriber
pub(crate) type Slot<T> = Arc<Mutex<Option<FlowResult<Option<T>>>>>;

/// Subscriber that stores the first element (or the terminal outcome) in a slot
pub(crate) struct SlotSubscriber<T> {
    slot: Slot<T>,
}

impl<T> SlotSubscriber<T> {
    pub(crate) fn new() -> (Self, Slot<T>) {
        let slot: Slot<T> = Arc::new(Mutex::new(None));
        (
            Self {
                slot: Arc::clone(&slot),
            },
            slot,
        )
    }

    fn fill(&self, outcome: FlowResult<Option<T>>) {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        if slot.is_none() {
            *slot = Some(outcome);
        }
    }
}

impl<T: Send + 'static> Subscriber<T> for SlotSubscriber<T> {
    fn on_next(&mut self, value: T) {
        self.fill(Ok(Some(value)));
    }

    fn on_error(&mut self, error: FlowError) {
        self.fill(Err(error));
    }

    fn on_complete(&mut self) {
        self.fill(Ok(None));
    }
}

/// Take the outcome out of a slot after its subscription terminated
pub(crate) fn take_slot<T>(slot: &Slot<T>) -> FlowResult<Option<T>> {
    slot.lock()
        .unwrap_or_else(|p| p.into_inner())
        .take()
        .unwrap_or(Err(FlowError::Cancelled))
}

struct SubscriptionState {
    id: Uuid,
    cancelled: AtomicBool,
    terminated: CompletionGate,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Handle on one active consumption of a pipeline
#[derive(Clone)]
pub struct Subscription {
    state: Arc<SubscriptionState>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.state.id)
            .field("cancelled", &self.is_cancelled())
            .field("terminated", &self.is_terminated())
            .finish()
    }
}

impl Subscription {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(SubscriptionState {
                id: Uuid::now_v7(),
                cancelled: AtomicBool::new(false),
                terminated: CompletionGate::new(),
                task: Mutex::new(None),
            }),
        }
    }

    /// A subscription that never started, already terminated
    pub(crate) fn finished() -> Self {
        let subscription = Self::new();
        subscription.state.terminated.signal();
        subscription
    }

    /// Submit `driver` to `scheduler`.
    ///
    /// The task slot stays locked until the handle is stored, so a concurrent
    /// [`cancel`](Self::cancel) either prevents the spawn or aborts the task.
    pub(crate) fn launch<F>(&self, scheduler: &Scheduler, driver: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.state.task.lock().unwrap_or_else(|p| p.into_inner());
        if self.is_cancelled() {
            // cancel opens the gate once it sees no task
            return;
        }
        *slot = Some(scheduler.spawn(driver));
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    /// Stop delivery. Pending timers are dropped and no further callback
    /// starts once this returns; a callback already running on another
    /// thread finishes normally.
    pub fn cancel(&self) {
        if self.state.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(subscription = %self.state.id, "Subscription cancelled");
        let task = self.state.task.lock().unwrap_or_else(|p| p.into_inner()).take();
        match task {
            Some(task) => task.abort(),
            // nothing was ever scheduled
            None if !self.is_terminated() => {
                self.state.terminated.signal();
            }
            None => {}
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// True once the subscription delivered a terminal signal or stopped
    /// after cancellation
    pub fn is_terminated(&self) -> bool {
        self.state.terminated.is_signaled()
    }

    /// Block until the subscription terminates
    pub fn join(&self) {
        self.state.terminated.wait()
    }

    /// Block until the subscription terminates or `timeout` elapses
    pub fn join_timeout(&self, timeout: Duration) -> GateOutcome {
        self.state.terminated.wait_timeout(timeout)
    }

    /// Wait for termination from async code
    pub async fn terminated(&self) {
        self.state.terminated.wait_async().await
    }

    pub(crate) fn drive<T, S>(
        &self,
        signals: BoxStream<'static, FlowResult<T>>,
        subscriber: S,
    ) -> impl Future<Output = ()> + Send + 'static
    where
        T: Send + 'static,
        S: Subscriber<T>,
    {
        drive(signals, subscriber, Arc::clone(&self.state))
    }
}

/// Opens the termination gate however the driver exits, abort included
struct TerminationGuard(Arc<SubscriptionState>);

impl Drop for TerminationGuard {
    fn drop(&mut self) {
        self.0.terminated.signal();
    }
}

fn drive<T, S>(
    mut signals: BoxStream<'static, FlowResult<T>>,
    mut subscriber: S,
    state: Arc<SubscriptionState>,
) -> impl Future<Output = ()> + Send + 'static
where
    T: Send + 'static,
    S: Subscriber<T>,
{
    // held by the future itself, so an abort before the first poll still
    // opens the gate
    let guard = TerminationGuard(Arc::clone(&state));

    async move {
        let _guard = guard;
        let id = state.id;
        debug!(subscription = %id, "Subscription started");

        while let Some(signal) = next_signal(&mut signals).await {
            if state.cancelled.load(Ordering::SeqCst) {
                return;
            }
            match signal {
                Ok(value) => {
                    trace!(subscription = %id, "onNext");
                    subscriber.on_next(value);
                }
                Err(error) => {
                    debug!(subscription = %id, error = %error, "Subscription failed");
                    subscriber.on_error(error);
                    return;
                }
            }
        }

        if state.cancelled.load(Ordering::SeqCst) {
            return;
        }
        debug!(subscription = %id, "Subscription completed");
        subscriber.on_complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::stream::{self, StreamExt};

    #[derive(Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Subscriber<i32> for Recorder {
        fn on_next(&mut self, value: i32) {
            self.events.lock().unwrap().push(format!("next:{value}"));
        }

        fn on_error(&mut self, error: FlowError) {
            self.events.lock().unwrap().push(format!("error:{error}"));
        }

        fn on_complete(&mut self) {
            self.events.lock().unwrap().push("complete".to_string());
        }
    }

    fn signals(items: Vec<FlowResult<i32>>) -> BoxStream<'static, FlowResult<i32>> {
        stream::iter(items).boxed()
    }

    #[test]
    fn test_drive_delivers_in_order_then_completes() {
        let recorder = Recorder::default();
        let events = Arc::clone(&recorder.events);
        let subscription = Subscription::new();

        block_on(subscription.drive(signals(vec![Ok(1), Ok(2)]), recorder));

        assert_eq!(*events.lock().unwrap(), vec!["next:1", "next:2", "complete"]);
        assert!(subscription.is_terminated());
    }

    #[test]
    fn test_drive_stops_at_error() {
        let recorder = Recorder::default();
        let events = Arc::clone(&recorder.events);
        let subscription = Subscription::new();

        block_on(subscription.drive(
            signals(vec![Ok(1), Err(FlowError::upstream("boom")), Ok(3)]),
            recorder,
        ));

        assert_eq!(
            *events.lock().unwrap(),
            vec!["next:1", "error:upstream error: boom"]
        );
    }

    #[test]
    fn test_cancelled_before_drive_delivers_nothing() {
        let recorder = Recorder::default();
        let events = Arc::clone(&recorder.events);
        let subscription = Subscription::new();
        subscription.cancel();

        block_on(subscription.drive(signals(vec![Ok(1)]), recorder));

        assert!(events.lock().unwrap().is_empty());
        assert!(subscription.is_cancelled());
        assert!(subscription.is_terminated());
    }

    #[test]
    fn test_drive_reports_stage_panic_as_error() {
        let recorder = Recorder::default();
        let events = Arc::clone(&recorder.events);
        let subscription = Subscription::new();
        let exploding = stream::iter(vec![1, 2, 3])
            .map(|n| {
                if n == 2 {
                    panic!("stage gave up on {n}");
                }
                Ok::<_, FlowError>(n)
            })
            .boxed();

        block_on(subscription.drive(exploding, recorder));

        assert_eq!(
            *events.lock().unwrap(),
            vec!["next:1", "error:transform failed: stage gave up on 2"]
        );
        assert!(subscription.is_terminated());
    }

    #[tokio::test]
    async fn test_cancel_before_first_poll_terminates() {
        let scheduler = Scheduler::current().expect("inside a runtime");
        let recorder = Recorder::default();
        let events = Arc::clone(&recorder.events);
        let subscription = Subscription::new();

        // the current-thread runtime has not polled the driver yet
        subscription.launch(&scheduler, subscription.drive(signals(vec![Ok(1)]), recorder));
        subscription.cancel();
        subscription.terminated().await;

        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_launch_after_cancel_never_spawns() {
        let scheduler = Scheduler::current().expect("inside a runtime");
        let recorder = Recorder::default();
        let events = Arc::clone(&recorder.events);
        let subscription = Subscription::new();

        subscription.cancel();
        assert!(subscription.is_terminated());
        subscription.launch(&scheduler, subscription.drive(signals(vec![Ok(1)]), recorder));
        tokio::task::yield_now().await;

        assert!(subscription.state.task.lock().unwrap().is_none());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_slot_keeps_first_outcome() {
        let (mut subscriber, slot) = SlotSubscriber::new();
        subscriber.on_next(7);
        subscriber.on_complete();

        assert_eq!(take_slot(&slot).unwrap(), Some(7));
    }

    #[test]
    fn test_empty_slot_means_cancelled() {
        let slot: Slot<i32> = Arc::new(Mutex::new(None));
        assert!(matches!(take_slot(&slot), Err(FlowError::Cancelled)));
    }

    #[test]
    fn test_finished_subscription() {
        let subscription = Subscription::finished();
        assert!(subscription.is_terminated());
        assert_eq!(subscription.join_timeout(Duration::ZERO), GateOutcome::Signaled);
    }

    #[test]
    fn test_lambda_subscriber() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut subscriber = LambdaSubscriber::new(
            move |v: i32| sink.lock().unwrap().push(v),
            |_e: FlowError| {},
            || {},
        );

        subscriber.on_next(1);
        subscriber.on_next(2);
        Subscriber::<i32>::on_complete(&mut subscriber);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }
}
