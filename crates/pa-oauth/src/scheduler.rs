//! Timer capability for the polling loop
//!
//! Polling is a chain of deferred callbacks, never busy-waiting: each tick
//! schedules at most one successor through a [`Scheduler`].

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// A deferred unit of work
pub type Task = Box<dyn FnOnce() + Send>;

/// Timer capability: run a task once after a delay
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run once, `delay` from now
    ///
    /// Implementations must defer the task; it never runs inside this call.
    /// Callers rely on that to hold locks across scheduling.
    fn schedule_after(&self, delay: Duration, task: Task);
}

/// Tokio-backed scheduler
///
/// Spawns a task that sleeps for the delay. Requires a running tokio
/// runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

/// Deterministic scheduler for tests
///
/// Queues tasks in FIFO order and runs them only when asked. Every requested
/// delay is recorded so tests can assert the poll cadence.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<Task>>,
    delays: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run the next queued task; returns `false` when the queue is empty
    pub fn run_next(&self) -> bool {
        // Pop before running: the task may schedule a successor.
        let task = self.queue.lock().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Every delay requested so far, in scheduling order
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) {
        self.delays.lock().push(delay);
        self.queue.lock().push_back(task);
    }
}
