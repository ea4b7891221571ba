use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Owner side of a cancellation signal. Dropping it without calling `cancel` never cancels.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Cheap to clone; threaded through the catalog loader and the booking saga.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    #[error("timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("cancelled")]
    Cancelled,
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may all be gone already; nothing left to notify then.
        let _ = self.tx.send(true);
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal { rx: self.tx.subscribe() }
    }
}

impl CancelSignal {
    /// A signal that is never raised.
    pub fn never() -> Self {
        cancel_pair().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Pends forever if the handle is dropped.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run `fut` bounded by `timeout` and by this signal, whichever fires first.
    pub async fn bounded<F>(&self, timeout: Duration, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        let mut signal = self.clone();
        tokio::select! {
            biased;
            _ = signal.cancelled() => Err(Interrupted::Cancelled),
            res = tokio::time::timeout(timeout, fut) => res.map_err(|_| Interrupted::TimedOut(timeout)),
        }
    }
}
