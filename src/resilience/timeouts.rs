//! Timeout enforcement.
//!
//! Every outbound call races against a cancellation signal handed out by a
//! [`CancellationSource`]. The source is injected into whoever makes calls,
//! so tests can swap in [`ManualCancellation`] and abort deterministically.
//!
//! A signal owns its timer. Dropping the signal (the call finished first, or
//! the caller gave up) releases the timer, so no path leaves one armed.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

/// Resolves when the associated call must be abandoned.
pub type CancelSignal = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Hands out one cancellation signal per outbound call.
pub trait CancellationSource: Send + Sync + fmt::Debug {
    /// A signal that fires once `timeout` has elapsed.
    fn signal(&self, timeout: Duration) -> CancelSignal;
}

/// The call was abandoned before it produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("aborted after {0:?}")]
pub struct Aborted(pub Duration);

/// Run `fut` until it completes or the source's signal fires.
///
/// The signal is dropped on return either way.
pub async fn with_deadline<F, T>(
    source: &dyn CancellationSource,
    timeout: Duration,
    fut: F,
) -> Result<T, Aborted>
where
    F: Future<Output = T>,
{
    let signal = source.signal(timeout);
    tokio::select! {
        biased;
        out = fut => Ok(out),
        _ = signal => Err(Aborted(timeout)),
    }
}

/// Tokio-timer backed source used in production.
#[derive(Debug, Clone, Default)]
pub struct TimerCancellation {
    armed: Arc<AtomicUsize>,
}

impl TimerCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers currently armed and not yet released.
    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }
}

impl CancellationSource for TimerCancellation {
    fn signal(&self, timeout: Duration) -> CancelSignal {
        let guard = ArmedTimer::arm(self.armed.clone());
        Box::pin(async move {
            let _guard = guard;
            tokio::time::sleep(timeout).await;
        })
    }
}

/// Counts itself in `armed` for as long as it lives.
struct ArmedTimer(Arc<AtomicUsize>);

impl ArmedTimer {
    fn arm(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ArmedTimer {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Test source: signals fire only when [`ManualCancellation::abort_all`] is called.
///
/// Timeouts passed to `signal` are ignored.
#[derive(Clone)]
pub struct ManualCancellation {
    tx: Arc<watch::Sender<bool>>,
    armed: Arc<AtomicUsize>,
}

impl ManualCancellation {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            armed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fire every outstanding and future signal.
    pub fn abort_all(&self) {
        self.tx.send_replace(true);
    }

    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }
}

impl Default for ManualCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualCancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualCancellation")
            .field("aborted", &*self.tx.borrow())
            .field("armed", &self.armed())
            .finish()
    }
}

impl CancellationSource for ManualCancellation {
    fn signal(&self, _timeout: Duration) -> CancelSignal {
        let guard = ArmedTimer::arm(self.armed.clone());
        let mut rx = self.tx.subscribe();
        Box::pin(async move {
            let _guard = guard;
            let fired = rx.wait_for(|aborted| *aborted).await.is_ok();
            if !fired {
                // Sender gone: nobody can abort any more.
                std::future::pending::<()>().await;
            }
        })
    }
}
