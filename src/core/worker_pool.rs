//! Fixed-size pool of background workers draining a shared bounded queue.
//!
//! Lifecycle: `Created -> Running -> Closing -> Drained`.
//!
//! * [`WorkerPool::queue_work`] is accepted while the pool is `Created` or
//!   `Running`. The queue is bounded: when it is full the submitter waits
//!   until a worker frees a slot, so callers on a latency-sensitive path
//!   should submit from their own task.
//! * [`WorkerPool::process_queue`] spawns the workers, at most once.
//! * [`WorkerPool::close`] rejects further submissions and cancels the pool
//!   token. Workers stop taking new items; items already handed to a worker
//!   keep running and see the cancellation through their token. Submitters
//!   waiting on a full queue are released with `PoolClosed`. `close` also
//!   cancels a pool that is already draining.
//! * [`WorkerPool::wait`] resolves when every worker has returned. Without a
//!   prior `close` it only resolves once the queue is closed and empty.
//! * [`WorkerPool::drain`] is the graceful variant: no new submissions, but
//!   everything already queued is executed before the workers exit.

use crate::domain::ports::Work;
use crate::utils::error::{CardsError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once, PoisonError};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Created,
    Running,
    Closing,
    Drained,
}

type SharedReceiver<W> = Arc<AsyncMutex<mpsc::Receiver<W>>>;

pub struct WorkerPool<W: Work> {
    name: String,
    workers_amount: usize,
    sender: Mutex<Option<mpsc::Sender<W>>>,
    receiver: SharedReceiver<W>,
    cancellation_token: CancellationToken,
    closed: AtomicBool,
    started: AtomicBool,
    drained: AtomicBool,
    process_once: Once,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<W: Work> WorkerPool<W> {
    pub fn new(name: impl Into<String>, workers_amount: usize) -> Self {
        Self::with_capacity(name, workers_amount, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(name: impl Into<String>, workers_amount: usize, queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));

        Self {
            name: name.into(),
            workers_amount: workers_amount.max(1),
            sender: Mutex::new(Some(sender)),
            receiver: Arc::new(AsyncMutex::new(receiver)),
            cancellation_token: CancellationToken::new(),
            closed: AtomicBool::new(false),
            started: AtomicBool::new(false),
            drained: AtomicBool::new(false),
            process_once: Once::new(),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> PoolState {
        if self.drained.load(Ordering::Acquire) {
            PoolState::Drained
        } else if self.closed.load(Ordering::Acquire) {
            PoolState::Closing
        } else if self.started.load(Ordering::Acquire) {
            PoolState::Running
        } else {
            PoolState::Created
        }
    }

    /// Number of worker tasks spawned so far.
    pub fn spawned_workers(&self) -> usize {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Enqueues `work`, waiting for a free slot when the queue is full.
    pub async fn queue_work(&self, work: W) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CardsError::PoolClosed);
        }

        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CardsError::PoolClosed)?;

        tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => Err(CardsError::PoolClosed),
            sent = sender.send(work) => sent.map_err(|_| CardsError::PoolClosed),
        }
    }

    /// Starts the workers. Must be called from within a Tokio runtime.
    pub fn process_queue(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        self.process_once.call_once(|| {
            let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);

            for worker_id in 0..self.workers_amount {
                handles.push(tokio::spawn(worker_loop(
                    self.name.clone(),
                    worker_id,
                    Arc::clone(&self.receiver),
                    self.cancellation_token.clone(),
                )));
            }

            self.started.store(true, Ordering::Release);
            tracing::info!(pool = %self.name, workers = self.workers_amount, "worker pool started");
        });
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        // drain() 只停止收件，token 仍需在這裡取消
        if self.cancellation_token.is_cancelled() {
            return;
        }
        self.cancellation_token.cancel();

        // 沒有 worker 持有 receiver 時直接關閉，讓 queue_work 不再等待空位
        if let Ok(mut receiver) = self.receiver.try_lock() {
            receiver.close();
        }

        tracing::info!(pool = %self.name, "worker pool closed");
    }

    pub async fn wait(&self) {
        let handles = std::mem::take(&mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner));

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(pool = %self.name, error = %e, "worker terminated abnormally");
            }
        }

        if self.closed.load(Ordering::Acquire) {
            self.drained.store(true, Ordering::Release);
        }
    }

    /// Stops accepting work, runs everything still queued, then waits for the workers.
    pub async fn drain(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            // 只丟掉 sender，不取消 token：佇列清空後 worker 會自行結束
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            tracing::info!(pool = %self.name, "worker pool draining");
        }

        self.wait().await;
    }
}

async fn worker_loop<W: Work>(
    pool: String,
    worker_id: usize,
    receiver: SharedReceiver<W>,
    cancellation_token: CancellationToken,
) {
    tracing::debug!(pool = %pool, worker_id, "worker started");

    loop {
        let next = tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => None,
            work = async { receiver.lock().await.recv().await } => work,
        };

        let Some(work) = next else {
            break;
        };

        // 每個工作在獨立 task 執行，panic 不會帶走 worker
        let job = tokio::spawn(work.execute(cancellation_token.clone()));
        if let Err(e) = job.await {
            if e.is_panic() {
                tracing::error!(pool = %pool, worker_id, "work panicked");
            } else {
                tracing::warn!(pool = %pool, worker_id, error = %e, "work aborted");
            }
        }
    }

    if cancellation_token.is_cancelled() {
        // Releases submitters still blocked on a full queue.
        receiver.lock().await.close();
    }

    tracing::debug!(pool = %pool, worker_id, "worker stopped");
}
