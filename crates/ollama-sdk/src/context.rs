//! Per-call cancellation and deadlines.
//!
//! [`Client::with_context`](crate::Client::with_context) attaches a
//! [`CallContext`] to the calls made through a client clone.
//! A context carries an optional deadline and an optional [`CancelSignal`];
//! either one firing aborts the in-flight request or stream read.

use crate::error::{Error, Result};
use std::future::{pending, Future};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Create a handle that has not been cancelled.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Cancel every call observing this handle's signals.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// A signal to hand to a [`CallContext`].
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Whether the handle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the handle is cancelled. Never resolves if the handle
    /// is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                pending::<()>().await;
            }
        }
    }
}

/// Cancellation signal and deadline for one call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<(Instant, Duration)>,
    cancel: Option<CancelSignal>,
}

impl CallContext {
    /// A context that never cancels and never expires.
    pub fn background() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some((Instant::now() + timeout, timeout));
        self
    }

    /// Expire at `deadline`.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        let budget = deadline.saturating_duration_since(Instant::now());
        self.deadline = Some((deadline, budget));
        self
    }

    /// Abort when `signal` fires.
    #[must_use]
    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.map(|(at, _)| at)
    }

    /// Fail if the context has already fired.
    pub fn check(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancelSignal::is_cancelled) {
            return Err(Error::Cancelled);
        }
        if let Some((at, _)) = self.deadline {
            if Instant::now() >= at {
                return Err(self.deadline_error());
            }
        }
        Ok(())
    }

    /// Drive `fut` until it completes or the context fires.
    ///
    /// `fut` is dropped without further polling when the context fires.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            () = cancelled(self.cancel.as_ref()) => Err(Error::Cancelled),
            () = expired(self.deadline()) => Err(self.deadline_error()),
            result = fut => result,
        }
    }

    fn deadline_error(&self) -> Error {
        let budget = self.deadline.map_or(Duration::ZERO, |(_, budget)| budget);
        Error::deadline_exceeded(budget.as_millis() as u64)
    }
}

async fn cancelled(signal: Option<&CancelSignal>) {
    match signal {
        Some(signal) => signal.cancelled().await,
        None => pending().await,
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => pending().await,
    }
}
