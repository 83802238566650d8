//! Coalescing of viewport-change signals.
//!
//! Resize events arrive in bursts. Re-selecting on each one is wasted work, so
//! a signal only fires once no newer signal has arrived for a quiescence
//! window (250ms by default). A newer signal replaces the pending one and
//! restarts the window; superseded signals never fire.
//!
//! ```text
//! signals   x  x x   x                    x
//! time      |--|-|---|-------250ms-------|-------------|
//! fires                                  ▲ (last x)    ...
//! ```
//!
//! [`Debouncer`] is the clock-free state machine: the caller supplies `now`.
//! [`DebouncedTrigger`] runs one on a worker thread and calls back when a
//! signal settles.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default quiescence window.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(250);

/// Holds at most one pending signal and its deadline.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a signal at `now`, replacing any pending one.
    pub fn signal(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// When the pending signal fires, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending signal if its window has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop the pending signal without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// A debouncer on its own thread.
///
/// `signal` never blocks. The callback runs on the worker thread, once per
/// settled burst, with the burst's last value. Dropping the trigger discards
/// any pending signal and joins the worker.
pub struct DebouncedTrigger<T: Send + 'static> {
    tx: Option<Sender<T>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> DebouncedTrigger<T> {
    pub fn spawn<F>(window: Duration, mut on_settled: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<T>();
        let worker = thread::spawn(move || {
            let mut debouncer = Debouncer::new(window);
            loop {
                let next = match debouncer.deadline() {
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                    Some(deadline) => {
                        rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                    }
                };
                match next {
                    Ok(value) => debouncer.signal(value, Instant::now()),
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some(value) = debouncer.poll(Instant::now()) {
                            debug!("debounced signal settled");
                            on_settled(value);
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        if debouncer.cancel().is_some() {
                            debug!("trigger shut down, pending signal discarded");
                        }
                        break;
                    }
                }
            }
        });
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Report a change. Supersedes any signal still waiting out its window.
    pub fn signal(&self, value: T) {
        if let Some(tx) = &self.tx {
            // The worker only exits after `tx` is dropped
            let _ = tx.send(value);
        }
    }

    /// Stop the worker, discarding any pending signal.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl<T: Send + 'static> Drop for DebouncedTrigger<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
