//! Fixed N-worker pool over a bounded task queue.
//!
//! Reworked from `rag-store::embed_pool`'s `buffer_unordered`-style bounded
//! concurrency into an explicit fixed-worker-count loop: one persistent
//! `tokio::task::JoinSet` entry per worker, one bounded `mpsc` channel
//! shared as the task queue (capacity `2N`), one output channel per the
//! "completion order, not submission order" contract.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Wraps a task's return value with whether the worker loop should count it
/// as a failure, so `WorkerPool` can track `errored` without knowing `T`'s shape.
pub struct Outcome<T> {
    pub value: T,
    pub is_error: bool,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self { value, is_error: false }
    }

    pub fn err(value: T) -> Self {
        Self { value, is_error: true }
    }
}

pub type Task<T> = Box<dyn FnOnce() -> std::pin::Pin<Box<dyn std::future::Future<Output = Outcome<T>> + Send>> + Send>;

#[derive(Default)]
pub struct PoolStats {
    pub processed: AtomicU64,
    pub errored: AtomicU64,
    queue_depth: AtomicUsize,
}

impl PoolStats {
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn errored(&self) -> u64 {
        self.errored.load(Ordering::Relaxed)
    }

    pub fn queue_depth(&self) -> usize {
        self.queue_depth.load(Ordering::Relaxed)
    }
}

/// A fixed pool of `workers` tasks draining a shared bounded queue.
/// `T` is the per-task result type; callers pair it with an index so
/// results can be re-sorted into input order after collection.
pub struct WorkerPool<T: Send + 'static> {
    sender: mpsc::Sender<Task<T>>,
    receiver: Option<mpsc::Receiver<T>>,
    cancel: CancellationToken,
    stats: Arc<PoolStats>,
    join_set: JoinSet<()>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// `cancel` is the caller's root token, not one owned by the pool: the
    /// pool observes it to stop dequeuing, and `stop()` cancels its own
    /// child so in-flight workers wind down even if the caller never cancels.
    pub fn new(workers: usize, cancel: CancellationToken) -> Self {
        let workers = workers.max(1);
        let capacity = workers * 2;
        let (task_tx, task_rx) = mpsc::channel::<Task<T>>(capacity);
        let (out_tx, out_rx) = mpsc::channel::<T>(capacity);
        let cancel = cancel.child_token();
        let stats = Arc::new(PoolStats::default());
        let task_rx = Arc::new(tokio::sync::Mutex::new(task_rx));

        let mut join_set = JoinSet::new();
        info!(workers, capacity, "worker pool: starting");
        for worker_id in 0..workers {
            let task_rx = task_rx.clone();
            let out_tx = out_tx.clone();
            let cancel = cancel.clone();
            let stats = stats.clone();
            join_set.spawn(async move {
                loop {
                    let next = {
                        let mut guard = task_rx.lock().await;
                        tokio::select! {
                            _ = cancel.cancelled() => None,
                            task = guard.recv() => task,
                        }
                    };
                    let Some(task) = next else {
                        debug!(worker_id, "worker pool: worker exiting");
                        break;
                    };
                    stats.queue_depth.fetch_sub(1, Ordering::Relaxed);
                    let outcome = task().await;
                    stats.processed.fetch_add(1, Ordering::Relaxed);
                    if outcome.is_error {
                        stats.errored.fetch_add(1, Ordering::Relaxed);
                    }
                    if out_tx.send(outcome.value).await.is_err() {
                        break;
                    }
                }
            });
        }

        Self { sender: task_tx, receiver: Some(out_rx), cancel, stats, join_set }
    }

    pub fn stats(&self) -> Arc<PoolStats> {
        self.stats.clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Blocks only when the queue is full and the pool is not cancelled.
    pub async fn submit(&self, task: Task<T>) -> Result<(), Task<T>> {
        self.stats.queue_depth.fetch_add(1, Ordering::Relaxed);
        match self.sender.send(task).await {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendError(task)) => {
                self.stats.queue_depth.fetch_sub(1, Ordering::Relaxed);
                Err(task)
            }
        }
    }

    pub fn output(&mut self) -> &mut mpsc::Receiver<T> {
        self.receiver.as_mut().expect("output receiver taken")
    }

    /// Stops accepting submissions, signals cancellation, and waits for
    /// in-flight tasks to finish.
    pub async fn stop(mut self) {
        info!("worker pool: stopping");
        self.cancel.cancel();
        drop(self.sender);
        while self.join_set.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn processes_submitted_tasks() {
        let mut pool: WorkerPool<u32> = WorkerPool::new(2, CancellationToken::new());
        for i in 0..5u32 {
            pool.submit(Box::new(move || Box::pin(async move { Outcome::ok(i * i) }))).await.unwrap();
        }
        let mut results = Vec::new();
        for _ in 0..5 {
            results.push(pool.output().recv().await.unwrap());
        }
        results.sort_unstable();
        assert_eq!(results, vec![0, 1, 4, 9, 16]);
        let stats = pool.stats();
        pool.stop().await;
        assert_eq!(stats.processed(), 5);
        assert_eq!(stats.queue_depth(), 0);
    }

    #[tokio::test]
    async fn stop_drains_without_hanging() {
        let pool: WorkerPool<u32> = WorkerPool::new(1, CancellationToken::new());
        pool.submit(Box::new(|| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Outcome::ok(1)
            })
        }))
        .await
        .unwrap();
        pool.stop().await;
    }

    #[tokio::test]
    async fn errored_outcomes_are_counted() {
        let mut pool: WorkerPool<u32> = WorkerPool::new(1, CancellationToken::new());
        pool.submit(Box::new(|| Box::pin(async { Outcome::err(0) }))).await.unwrap();
        pool.submit(Box::new(|| Box::pin(async { Outcome::ok(1) }))).await.unwrap();
        for _ in 0..2 {
            pool.output().recv().await.unwrap();
        }
        let stats = pool.stats();
        pool.stop().await;
        assert_eq!(stats.processed(), 2);
        assert_eq!(stats.errored(), 1);
    }

    #[tokio::test]
    async fn parent_cancellation_stops_the_pool() {
        let parent = CancellationToken::new();
        let mut pool: WorkerPool<u32> = WorkerPool::new(1, parent.clone());
        parent.cancel();
        pool.submit(Box::new(|| Box::pin(async { Outcome::ok(1) }))).await.ok();
        // Worker observes cancellation and exits; stop() must not hang.
        pool.stop().await;
        let _ = pool.output().try_recv();
    }
}
