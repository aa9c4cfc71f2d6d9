//! Cancellation and deadlines for API calls.
//!
//! A [`Context`] travels with each call through the retry loop. Both suspension
//! points, the HTTP exchange and the sleep between attempts, are raced against
//! it, so a cancelled or expired call stops promptly and is never retried.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Deadline and cancellation signal for one or more calls.
///
/// Cloning is cheap; clones observe the same cancel signal.
///
/// # Examples
///
/// ```no_run
/// use sec4dev::{Client, Context};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), sec4dev::Error> {
/// let client = Client::new("sec4_your_key")?;
///
/// let (ctx, cancel) = Context::background()
///     .with_timeout(Duration::from_secs(5))
///     .with_cancel();
///
/// // Another task may call `cancel.cancel()` to abort the call.
/// let result = client.ip().check_with_context(&ctx, "203.0.113.42").await?;
/// println!("{}", result.classification);
/// # drop(cancel);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`Context`] derived from the same [`Context::with_cancel`] call.
///
/// Dropping the handle without calling [`cancel`](Self::cancel) leaves the
/// context running.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Adds a deadline `timeout` from now, keeping an earlier one if present.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Adds a deadline, keeping an earlier one if present.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Attaches a new cancel signal and returns its handle.
    ///
    /// A context holds a single cancel signal; this replaces any earlier one.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the error this context ends calls with, if it already has.
    pub fn err(&self) -> Option<Error> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(Error::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Some(Error::DeadlineExceeded);
        }
        None
    }

    /// Resolves once the context is cancelled or its deadline passes.
    async fn done(&self) -> Error {
        let cancelled = async {
            if let Some(mut rx) = self.cancel.clone() {
                if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
                    return;
                }
            }
            // no signal, or the handle was dropped without cancelling
            std::future::pending::<()>().await
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancelled => Error::Cancelled,
            _ = expired => Error::DeadlineExceeded,
        }
    }

    /// Runs `future` unless the context ends first.
    pub(crate) async fn run<F>(&self, future: F) -> Result<F::Output>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            output = future => Ok(output),
            err = self.done() => Err(err),
        }
    }

    /// Sleeps for `duration` unless the context ends first.
    pub(crate) async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(tokio::time::sleep(duration)).await
    }
}
