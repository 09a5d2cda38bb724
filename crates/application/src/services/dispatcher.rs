//! Call dispatcher - bounded queue in front of a pool of pipeline workers
//!
//! The webhook acknowledges a call as soon as it is queued. Workers take
//! calls one at a time; each call runs in its own task so a panic is
//! contained to that call.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::call_pipeline::{CallPipelineService, InboundCall};
use crate::error::ApplicationError;

/// Something that can take a call to completion
#[async_trait]
pub trait CallHandler: Send + Sync + 'static {
    async fn handle(&self, call: InboundCall);
}

#[async_trait]
impl CallHandler for CallPipelineService {
    async fn handle(&self, call: InboundCall) {
        self.process(call).await;
    }
}

/// Queue plus worker pool
#[derive(Debug)]
pub struct CallDispatcher {
    sender: Mutex<Option<mpsc::Sender<InboundCall>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
}

impl CallDispatcher {
    /// Spawn `workers` workers reading from a queue of `capacity` calls
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start<H: CallHandler>(handler: Arc<H>, workers: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let receiver = Arc::new(AsyncMutex::new(receiver));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let handler = Arc::clone(&handler);
                tokio::spawn(worker_loop(worker, receiver, handler))
            })
            .collect::<Vec<_>>();

        info!(workers = handles.len(), capacity, "Call dispatcher started");

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(handles),
            capacity,
        }
    }

    /// Queue a call without waiting
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::QueueFull` when the queue is at capacity
    /// and `ApplicationError::Internal` after shutdown.
    pub fn submit(&self, call: InboundCall) -> Result<(), ApplicationError> {
        let sender = self
            .sender
            .lock()
            .clone()
            .ok_or_else(|| ApplicationError::Internal("call dispatcher is shut down".to_string()))?;

        sender.try_send(call).map_err(|e| match e {
            mpsc::error::TrySendError::Full(call) => {
                warn!(caller = %call.caller, "Call queue full, rejecting call");
                ApplicationError::QueueFull
            },
            mpsc::error::TrySendError::Closed(_) => {
                ApplicationError::Internal("call workers have stopped".to_string())
            },
        })
    }

    /// Calls waiting for a worker
    pub fn queue_depth(&self) -> usize {
        self.sender
            .lock()
            .as_ref()
            .map_or(0, |s| s.max_capacity() - s.capacity())
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stop accepting calls and wait for queued calls to finish
    pub async fn shutdown(&self) {
        drop(self.sender.lock().take());
        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Call worker ended abnormally");
            }
        }
        info!("Call dispatcher stopped");
    }
}

async fn worker_loop<H: CallHandler>(
    worker: usize,
    receiver: Arc<AsyncMutex<mpsc::Receiver<InboundCall>>>,
    handler: Arc<H>,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(call) = next else {
            debug!(worker, "Call queue closed, worker exiting");
            break;
        };

        let handler = Arc::clone(&handler);
        let task = tokio::spawn(async move { handler.handle(call).await });
        if let Err(e) = task.await {
            error!(worker, error = %e, "Call processing panicked");
        }
    }
}
