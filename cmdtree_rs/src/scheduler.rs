//! Execution substrate for dispatch and executor continuations.
//!
//! The registry never owns threads. It submits boxed tasks to a
//! [`TaskExecutor`] supplied by the host. A [`Scheduler`] pairs two of them:
//!
//! - `async`: where dispatch runs (a worker pool, a tokio runtime, ...)
//! - `sync`: the host's "main" thread, e.g. a game server tick loop draining a
//!   [`MainThreadQueue`]
//!
//! Executors reach the scheduler through [`crate::CommandContext::scheduler`]
//! and use [`Scheduler::run_sync`] / [`Scheduler::run_async`] to continue work
//! on the other side.

use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crossbeam_channel::{Receiver, Sender, unbounded};
use futures::channel::oneshot;
use thiserror::Error;
use tracing::warn;

/// A unit of work submitted to an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Task-submission abstraction.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, task: Task);
}

/// Runs each task immediately on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl TaskExecutor for InlineExecutor {
    fn execute(&self, task: Task) {
        task();
    }
}

/// Runs tasks on a tokio runtime's blocking pool.
///
/// Executors are plain synchronous host functions that may block, so they
/// stay off the async worker threads.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioExecutor {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Executor bound to the runtime of the calling task.
    ///
    /// Panics outside a tokio runtime, like [`tokio::runtime::Handle::current`].
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

#[cfg(feature = "tokio")]
impl TaskExecutor for TokioExecutor {
    fn execute(&self, task: Task) {
        // The JoinHandle is dropped on purpose: completion is reported through
        // the task's own channel.
        drop(self.handle.spawn_blocking(task));
    }
}

/// Queue of tasks waiting for the host's main thread.
///
/// Cloning shares the queue. The host calls [`MainThreadQueue::run_pending`]
/// from its main loop.
#[derive(Clone)]
pub struct MainThreadQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl MainThreadQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Run every task queued so far. Returns how many ran.
    ///
    /// Tasks queued by the tasks themselves wait for the next call.
    pub fn run_pending(&self) -> usize {
        let batch: Vec<Task> = self.rx.try_iter().collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for MainThreadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MainThreadQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainThreadQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl TaskExecutor for MainThreadQueue {
    fn execute(&self, task: Task) {
        // Both ends live in `self`, so the channel cannot be disconnected here.
        if self.tx.send(task).is_err() {
            warn!("main thread queue disconnected, task dropped");
        }
    }
}

/// The task never produced a value: it panicked or its executor dropped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task aborted before completion")]
pub struct TaskAborted;

/// Future resolving to the value of a scheduled task.
#[must_use = "dropping the handle does not cancel the task, but its result is lost"]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskAborted>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| TaskAborted))
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").finish_non_exhaustive()
    }
}

/// Pair of executors: one for background work, one for the main thread.
#[derive(Clone)]
pub struct Scheduler {
    async_executor: Arc<dyn TaskExecutor>,
    sync_executor: Arc<dyn TaskExecutor>,
}

impl Scheduler {
    pub fn new(
        async_executor: impl TaskExecutor + 'static,
        sync_executor: impl TaskExecutor + 'static,
    ) -> Self {
        Self {
            async_executor: Arc::new(async_executor),
            sync_executor: Arc::new(sync_executor),
        }
    }

    /// Everything runs on the submitting thread. Handy for tests and for
    /// single-threaded hosts.
    pub fn inline() -> Self {
        Self::new(InlineExecutor, InlineExecutor)
    }

    /// Dispatch on the current tokio runtime, continuations on `main`.
    #[cfg(feature = "tokio")]
    pub fn tokio(main: MainThreadQueue) -> Self {
        Self::new(TokioExecutor::current(), main)
    }

    pub fn async_executor(&self) -> &Arc<dyn TaskExecutor> {
        &self.async_executor
    }

    pub fn sync_executor(&self) -> &Arc<dyn TaskExecutor> {
        &self.sync_executor
    }

    /// Run `task` on the async executor.
    pub fn run_async<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        submit(self.async_executor.as_ref(), task)
    }

    /// Run `task` on the sync (main thread) executor.
    pub fn run_sync<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        submit(self.sync_executor.as_ref(), task)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}

fn submit<T, F>(executor: &dyn TaskExecutor, task: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    executor.execute(Box::new(move || {
        // A panic drops `tx`, which resolves the handle to `TaskAborted`.
        match catch_unwind(AssertUnwindSafe(task)) {
            Ok(value) => {
                let _ = tx.send(value);
            }
            Err(_) => warn!("scheduled task panicked"),
        }
    }));
    TaskHandle { rx }
}
