//! Poll policy and cancellation for long-running generation jobs.

use std::time::Duration;

use tokio::sync::watch;

/// Poll policy for long-running video jobs.
///
/// Every status check counts against `max_checks`, including the one the
/// submission itself reports. Exhausting the budget fails the operation
/// instead of polling forever.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Fixed delay between status checks.
    pub interval: Duration,

    /// Upper bound on status checks (submission + polls).
    pub max_checks: u32,
}

impl PollPolicy {
    /// Default policy for video generation: 5s cadence, 60 checks
    /// (about five minutes of waiting).
    pub fn default_video() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_checks: 60,
        }
    }

    pub fn with_max_checks(mut self, max_checks: u32) -> Self {
        self.max_checks = max_checks;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Issuing side of a cancellation signal.
///
/// Dropping the source does NOT cancel outstanding tokens; only an
/// explicit `cancel()` does.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Hand out a token observing this source.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the signal. Every token sees it.
    pub fn cancel(&self) {
        // ignore send error: receivers may already be dropped
        let _ = self.tx.send(true);
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation token threaded through a polling call chain.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that can never fire (for call sites without a cancel UI).
    pub fn never() -> Self {
        CancelSource::new().token()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the source fires. If the source is gone without
    /// firing, this waits forever (cancellation can no longer happen).
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
