// Copyright (c) 2025 - Cowboy AI, Inc.
//! Completion Gate
//!
//! A one-shot countdown gate. Callbacks signal it, callers wait on it.
//! Replaces sleeping for a fixed interval and inspecting whatever arrived.
//!
//! ```rust,ignore
//! let gate = CompletionGate::new();
//! let done = gate.clone();
//!
//! Sequence::of(vec![1, 2, 3])
//!     .delay_elements(Duration::from_millis(10))
//!     .do_on_complete(move || { done.signal(); })
//!     .subscribe(|n| println!("{n}"), |_| {}, || {});
//!
//! gate.wait();
//! ```

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Outcome of a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The gate opened before the deadline
    Signaled,
    /// The deadline passed with the gate still closed
    TimedOut,
}

impl GateOutcome {
    pub fn is_signaled(self) -> bool {
        self == GateOutcome::Signaled
    }
}

struct GateState {
    remaining: Mutex<usize>,
    opened: Condvar,
    notify: Notify,
}

/// Countdown gate shared between signalers and waiters
#[derive(Clone)]
pub struct CompletionGate {
    state: Arc<GateState>,
}

impl std::fmt::Debug for CompletionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionGate")
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionGate {
    /// A gate that opens on the first signal
    pub fn new() -> Self {
        Self::with_count(1)
    }

    /// A gate that opens after `count` signals. A zero count starts open.
    pub fn with_count(count: usize) -> Self {
        Self {
            state: Arc::new(GateState {
                remaining: Mutex::new(count),
                opened: Condvar::new(),
                notify: Notify::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        // a poisoned count is still a valid count
        self.state
            .remaining
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count down once.
    ///
    /// Returns `true` if this call changed the count. Signals after the gate
    /// has opened are ignored.
    pub fn signal(&self) -> bool {
        let mut remaining = self.lock();
        if *remaining == 0 {
            return false;
        }
        *remaining -= 1;
        if *remaining == 0 {
            self.state.opened.notify_all();
            self.state.notify.notify_waiters();
        }
        true
    }

    /// Signals still required before the gate opens
    pub fn remaining(&self) -> usize {
        *self.lock()
    }

    pub fn is_signaled(&self) -> bool {
        self.remaining() == 0
    }

    /// Block the calling thread until the gate opens
    pub fn wait(&self) {
        let mut remaining = self.lock();
        while *remaining > 0 {
            remaining = self
                .state
                .opened
                .wait(remaining)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Block the calling thread until the gate opens or `timeout` elapses
    pub fn wait_timeout(&self, timeout: Duration) -> GateOutcome {
        // a deadline past the clock's range is an unbounded wait
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return GateOutcome::Signaled;
        };
        let mut remaining = self.lock();
        while *remaining > 0 {
            let now = Instant::now();
            if now >= deadline {
                return GateOutcome::TimedOut;
            }
            let (guard, _) = self
                .state
                .opened
                .wait_timeout(remaining, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            remaining = guard;
        }
        GateOutcome::Signaled
    }

    /// Wait for the gate without blocking the executor
    pub async fn wait_async(&self) {
        loop {
            // register before checking so a concurrent signal is not missed
            let notified = self.state.notify.notified();
            if self.is_signaled() {
                return;
            }
            notified.await;
        }
    }

    /// Async wait bounded by `timeout`
    pub async fn wait_async_timeout(&self, timeout: Duration) -> GateOutcome {
        match tokio::time::timeout(timeout, self.wait_async()).await {
            Ok(()) => GateOutcome::Signaled,
            Err(_) => GateOutcome::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_signal_opens_gate() {
        let gate = CompletionGate::new();
        assert!(!gate.is_signaled());

        assert!(gate.signal());
        assert!(gate.is_signaled());
        gate.wait();
    }

    #[test]
    fn test_repeat_signal_is_ignored() {
        let gate = CompletionGate::new();
        assert!(gate.signal());
        assert!(!gate.signal());
        assert_eq!(gate.remaining(), 0);
    }

    #[test]
    fn test_unbounded_timeout_waits_for_signal() {
        let gate = CompletionGate::new();
        gate.signal();
        assert_eq!(gate.wait_timeout(Duration::MAX), GateOutcome::Signaled);

        let pending = CompletionGate::new();
        let signaler = pending.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            signaler.signal();
        });
        assert_eq!(pending.wait_timeout(Duration::MAX), GateOutcome::Signaled);
        handle.join().unwrap();
    }

    #[test]
    fn test_countdown() {
        let gate = CompletionGate::with_count(3);
        gate.signal();
        gate.signal();
        assert_eq!(gate.remaining(), 1);
        assert_eq!(gate.wait_timeout(Duration::from_millis(5)), GateOutcome::TimedOut);

        gate.signal();
        assert_eq!(gate.wait_timeout(Duration::from_millis(5)), GateOutcome::Signaled);
    }

    #[test]
    fn test_zero_count_starts_open() {
        let gate = CompletionGate::with_count(0);
        assert!(gate.is_signaled());
        assert!(!gate.signal());
    }

    #[test]
    fn test_wait_timeout_reports_timeout() {
        let gate = CompletionGate::new();
        let started = Instant::now();

        let outcome = gate.wait_timeout(Duration::from_millis(20));

        assert_eq!(outcome, GateOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_across_threads() {
        let gate = CompletionGate::new();
        let signaler = gate.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            signaler.signal();
        });

        gate.wait();
        assert!(gate.is_signaled());
        handle.join().unwrap();
    }

    #[test]
    fn test_many_waiters() {
        let gate = CompletionGate::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let gate = gate.clone();
                thread::spawn(move || gate.wait_timeout(Duration::from_secs(5)))
            })
            .collect();

        gate.signal();

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), GateOutcome::Signaled);
        }
    }

    #[tokio::test]
    async fn test_wait_async() {
        let gate = CompletionGate::new();
        let signaler = gate.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            signaler.signal();
        });

        assert_eq!(
            gate.wait_async_timeout(Duration::from_secs(5)).await,
            GateOutcome::Signaled
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_async_timeout() {
        let gate = CompletionGate::new();
        assert_eq!(
            gate.wait_async_timeout(Duration::from_secs(1)).await,
            GateOutcome::TimedOut
        );
    }
}
