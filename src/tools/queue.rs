//! Bounded tool execution queue.
//!
//! A fixed pool of long-lived workers consumes tasks from a bounded mpsc
//! channel. Admission is FIFO and guarded by a short timeout so a saturated
//! queue fails fast with `QueueBusy` instead of blocking callers
//! indefinitely. Each execution runs under its own timeout; a timeout or
//! panic fills the caller's result slot with an error and the worker keeps
//! looping. There is no drain state: once started, the pool runs for the
//! life of the process.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::errors::McpError;
use crate::tools::{Tool, ToolResult};

/// One queued invocation. The reply slot is single-assignment; dropping it
/// unblocks the caller with an execution failure.
struct ExecutionTask {
    tool: Arc<dyn Tool>,
    arguments: Value,
    config: Option<Value>,
    reply: oneshot::Sender<Result<ToolResult, McpError>>,
}

// ---------------------------------------------------------------------------
// QueueStats
// ---------------------------------------------------------------------------

/// Snapshot of queue activity counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub queue_depth: usize,
    pub max_workers: usize,
    pub max_queue_size: usize,
    pub workers_started: usize,
    pub is_started: bool,
    pub active_workers: usize,
    pub total_tasks_processed: u64,
    pub peak_queue_depth: usize,
    pub peak_active_workers: usize,
}

/// Live counters shared between submitters, workers, and stats readers.
/// Queue depth is not tracked here; it is derived from the channel's
/// remaining capacity so enqueue and dequeue move a single underlying
/// count and the gauge can never transiently underflow.
#[derive(Default)]
struct Counters {
    active_workers: AtomicUsize,
    workers_started: AtomicUsize,
    total_tasks_processed: AtomicU64,
    peak_queue_depth: AtomicUsize,
    peak_active_workers: AtomicUsize,
}

impl Counters {
    fn bump_peak(peak: &AtomicUsize, current: usize) {
        peak.fetch_max(current, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// ExecutionQueue
// ---------------------------------------------------------------------------

/// Fixed-size worker pool over a bounded task queue.
pub struct ExecutionQueue {
    max_workers: usize,
    max_queue_size: usize,
    admission_timeout: Duration,
    execution_timeout: Duration,
    tx: mpsc::Sender<ExecutionTask>,
    /// Receiver parked here until `start()` hands it to the workers.
    rx: Mutex<Option<mpsc::Receiver<ExecutionTask>>>,
    started: AtomicBool,
    counters: Arc<Counters>,
}

impl ExecutionQueue {
    /// Create a queue. Workers are not spawned until `start()`.
    pub fn new(
        max_workers: usize,
        max_queue_size: usize,
        admission_timeout: Duration,
        execution_timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(max_queue_size.max(1));
        Self {
            max_workers: max_workers.max(1),
            max_queue_size: max_queue_size.max(1),
            admission_timeout,
            execution_timeout,
            tx,
            rx: Mutex::new(Some(rx)),
            started: AtomicBool::new(false),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Spawn the worker pool. Idempotent; the `NotStarted -> Running`
    /// transition happens exactly once.
    pub async fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let rx = match self.rx.lock().await.take() {
            Some(rx) => rx,
            None => return,
        };
        log::info!(
            "starting execution queue with {} workers, queue size {}",
            self.max_workers,
            self.max_queue_size
        );

        let shared_rx = Arc::new(Mutex::new(rx));
        for worker_id in 0..self.max_workers {
            let rx = Arc::clone(&shared_rx);
            let counters = Arc::clone(&self.counters);
            let execution_timeout = self.execution_timeout;
            tokio::spawn(worker_loop(worker_id, rx, counters, execution_timeout));
            self.counters.workers_started.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Submit a tool invocation and await its result.
    ///
    /// Fails with `QueueBusy` if the queue stays full past the admission
    /// timeout. On successful admission the caller suspends until a worker
    /// fills the result slot (bounded by the execution timeout).
    pub async fn submit(
        &self,
        tool: Arc<dyn Tool>,
        arguments: Value,
        config: Option<Value>,
    ) -> Result<ToolResult, McpError> {
        let tool_name = tool.name().to_string();
        let (reply_tx, reply_rx) = oneshot::channel();
        let task = ExecutionTask {
            tool,
            arguments,
            config,
            reply: reply_tx,
        };

        match tokio::time::timeout(self.admission_timeout, self.tx.send(task)).await {
            Ok(Ok(())) => {
                let depth = self.queue_depth();
                Counters::bump_peak(&self.counters.peak_queue_depth, depth);
                log::debug!("queued tool '{tool_name}', queue depth {depth}");
            }
            Ok(Err(_)) => {
                return Err(McpError::ExecutionFailure(
                    "execution queue is shut down".into(),
                ));
            }
            Err(_) => {
                log::warn!(
                    "admission timeout for tool '{tool_name}': queue full for {}s",
                    self.admission_timeout.as_secs()
                );
                return Err(McpError::QueueBusy);
            }
        }

        reply_rx
            .await
            .unwrap_or_else(|_| Err(McpError::ExecutionFailure("worker dropped task".into())))
    }

    /// Tasks currently sitting in the channel, derived from its remaining
    /// capacity.
    fn queue_depth(&self) -> usize {
        self.max_queue_size.saturating_sub(self.tx.capacity())
    }

    /// Current queue statistics. Safe to call from any task or thread.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            queue_depth: self.queue_depth(),
            max_workers: self.max_workers,
            max_queue_size: self.max_queue_size,
            workers_started: self.counters.workers_started.load(Ordering::Relaxed),
            is_started: self.started.load(Ordering::SeqCst),
            active_workers: self.counters.active_workers.load(Ordering::Relaxed),
            total_tasks_processed: self.counters.total_tasks_processed.load(Ordering::Relaxed),
            peak_queue_depth: self.counters.peak_queue_depth.load(Ordering::Relaxed),
            peak_active_workers: self.counters.peak_active_workers.load(Ordering::Relaxed),
        }
    }

    /// Configured execution timeout.
    pub fn execution_timeout(&self) -> Duration {
        self.execution_timeout
    }
}

/// Worker loop: dequeue, execute under the timeout, fill the reply slot.
///
/// The loop only exits when the sender side is dropped (process teardown).
/// Counter updates on the exit path run on every outcome, including panics.
async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<ExecutionTask>>>,
    counters: Arc<Counters>,
    execution_timeout: Duration,
) {
    log::debug!("started execution worker {worker_id}");
    loop {
        // Hold the receiver lock only for the dequeue itself.
        let task = { rx.lock().await.recv().await };
        let Some(task) = task else {
            log::debug!("execution worker {worker_id} shutting down");
            break;
        };

        let active = counters.active_workers.fetch_add(1, Ordering::Relaxed) + 1;
        Counters::bump_peak(&counters.peak_active_workers, active);

        let tool_name = task.tool.name().to_string();
        log::debug!("worker {worker_id} executing tool '{tool_name}'");

        let execution = std::panic::AssertUnwindSafe(
            task.tool.execute(&task.arguments, task.config.as_ref()),
        )
        .catch_unwind();

        let outcome = match tokio::time::timeout(execution_timeout, execution).await {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(e))) => {
                log::error!("worker {worker_id} tool '{tool_name}' failed: {e}");
                Err(McpError::ExecutionFailure(e.to_string()))
            }
            Ok(Err(_panic)) => {
                log::error!("worker {worker_id} tool '{tool_name}' panicked");
                Err(McpError::ExecutionFailure(format!(
                    "tool '{tool_name}' panicked during execution"
                )))
            }
            Err(_) => {
                log::warn!(
                    "worker {worker_id} tool '{tool_name}' timed out after {}s",
                    execution_timeout.as_secs()
                );
                Err(McpError::ExecutionTimeout(execution_timeout))
            }
        };

        // The caller may have gone away; that is not a worker error.
        let _ = task.reply.send(outcome);

        counters.active_workers.fetch_sub(1, Ordering::Relaxed);
        counters.total_tasks_processed.fetch_add(1, Ordering::Relaxed);
    }
}
