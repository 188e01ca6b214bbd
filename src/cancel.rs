//! Cancellation
//!
//! A `CancelHandle` flips a watch channel; every `CancelToken` cloned from
//! the same pair observes it at its next suspension point.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use shoplist_backend_lib::domain::{DomainError, DomainResult};

#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelToken { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; never resolves if every handle is gone
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` unless cancellation arrives first
    pub async fn guard<T>(&self, fut: impl Future<Output = DomainResult<T>>) -> DomainResult<T> {
        if self.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(DomainError::Cancelled),
            result = fut => result,
        }
    }

    /// Sleep for `duration` unless cancelled
    pub async fn sleep(&self, duration: std::time::Duration) -> DomainResult<()> {
        self.guard(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}
