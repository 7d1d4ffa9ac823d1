//! Bounded invocation queue and fixed worker pool.
//!
//! Triggers enqueue without blocking; a full queue drops the invocation
//! with a warning rather than letting timed work pile up behind a slow
//! source. Workers pull one invocation at a time, so concurrency is
//! bounded by the pool size.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::invocation::Invocation;

/// Executes one invocation. The dispatcher implements this; tests swap in
/// a counting double.
#[async_trait]
pub trait InvocationHandler: Send + Sync {
    async fn handle(&self, invocation: Invocation) -> Result<()>;
}

/// Sending half of the bounded queue. Cheap to clone into cron closures.
#[derive(Clone)]
pub struct InvocationQueue {
    tx: mpsc::Sender<Invocation>,
}

impl InvocationQueue {
    /// Creates a queue of the given depth and its receiving half.
    #[must_use]
    pub fn new(depth: usize) -> (Self, mpsc::Receiver<Invocation>) {
        let (tx, rx) = mpsc::channel(depth.max(1));
        (Self { tx }, rx)
    }

    /// Enqueues without waiting. Returns `false` if the queue was full or
    /// closed; the invocation is dropped and logged.
    pub fn try_enqueue(&self, invocation: Invocation) -> bool {
        match self.tx.try_send(invocation) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(%dropped, "invocation queue full, dropping");
                false
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                warn!(%dropped, "invocation queue closed, dropping");
                false
            }
        }
    }
}

/// Fixed pool of workers draining the queue.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `workers` tasks that pull invocations until the queue closes.
    #[must_use]
    pub fn spawn(
        workers: usize,
        rx: mpsc::Receiver<Invocation>,
        handler: Arc<dyn InvocationHandler>,
    ) -> Self {
        let rx = Arc::new(Mutex::new(rx));
        let handles = (0..workers.max(1))
            .map(|worker| {
                let rx = rx.clone();
                let handler = handler.clone();
                tokio::spawn(async move {
                    loop {
                        let invocation = {
                            let mut rx = rx.lock().await;
                            rx.recv().await
                        };
                        let Some(invocation) = invocation else {
                            break;
                        };

                        info!(worker, %invocation, "invocation started");
                        if let Err(e) = handler.handle(invocation.clone()).await {
                            error!(worker, %invocation, error = %e, "invocation failed");
                        }
                    }
                })
            })
            .collect();

        Self { handles }
    }

    /// Waits for all workers to exit. They exit once every queue sender is
    /// dropped and the backlog drains.
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
