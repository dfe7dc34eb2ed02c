// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cooperative event loop
//!
//! Tasks never run on their own: the host drives the loop with
//! [`EventLoop::run_ready`], [`EventLoop::run_until_idle`] or
//! [`EventLoop::wait_for_idle`]. Anything a caller does synchronously after
//! posting a task therefore happens before the task runs.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{Error, Result};

/// Task callback type
pub type Task = Box<dyn FnOnce() + Send>;

/// Handle of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u32);

/// Task entry in the queue
struct TaskEntry {
    id: TaskId,
    fire_at: Instant,
    /// Insertion order, breaks ties between equal deadlines
    seq: u64,
    task: Task,
}

impl PartialEq for TaskEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskEntry {}

impl PartialOrd for TaskEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaskEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse order for min-heap (earliest fires first, FIFO on ties)
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner {
    /// Pending tasks (min-heap by fire_at)
    tasks: Mutex<BinaryHeap<TaskEntry>>,
    /// Cancelled task IDs
    cancelled: Mutex<Vec<TaskId>>,
    next_id: AtomicU32,
    next_seq: AtomicU64,
    /// Real I/O still in flight
    outstanding: AtomicUsize,
    /// Wakes `wait_for_idle` when a task is posted or I/O settles
    wake: Notify,
    /// Cap on queued tasks for `set_timeout`
    max_tasks: usize,
}

/// Cooperative single-queue scheduler
#[derive(Clone)]
pub struct EventLoop {
    inner: Arc<Inner>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("pending", &self.pending_count())
            .field("outstanding_io", &self.outstanding_io())
            .finish()
    }
}

impl EventLoop {
    /// Create a new event loop
    pub fn new() -> Self {
        Self::with_max_tasks(10_000)
    }

    /// Create with custom max queued tasks
    pub fn with_max_tasks(max: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                tasks: Mutex::new(BinaryHeap::new()),
                cancelled: Mutex::new(Vec::new()),
                next_id: AtomicU32::new(1),
                next_seq: AtomicU64::new(0),
                outstanding: AtomicUsize::new(0),
                wake: Notify::new(),
                max_tasks: max,
            }),
        }
    }

    /// Schedule a task after a delay
    ///
    /// Fails without queueing the task if the timer cap is reached.
    pub fn set_timeout<F>(&self, task: F, delay: Duration) -> Result<TaskId>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = {
            let mut tasks = self.inner.tasks.lock();
            if tasks.len() >= self.inner.max_tasks {
                tracing::warn!(max_tasks = self.inner.max_tasks, "Event loop queue full");
                return Err(Error::invalid_state("set_timeout", "event loop queue full"));
            }
            self.push(&mut tasks, Box::new(task), delay)
        };

        self.inner.wake.notify_one();
        Ok(id)
    }

    /// Schedule a task for the next tick
    ///
    /// Not subject to the timer cap: completions must always run.
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = {
            let mut tasks = self.inner.tasks.lock();
            self.push(&mut tasks, Box::new(task), Duration::ZERO)
        };

        self.inner.wake.notify_one();
        id
    }

    /// Cancel a scheduled task; unknown or finished IDs are ignored
    pub fn clear_timeout(&self, id: TaskId) {
        let tasks = self.inner.tasks.lock();
        if !tasks.iter().any(|t| t.id == id) {
            return;
        }
        let mut cancelled = self.inner.cancelled.lock();
        if !cancelled.contains(&id) {
            cancelled.push(id);
        }
    }

    fn push(&self, tasks: &mut BinaryHeap<TaskEntry>, task: Task, delay: Duration) -> TaskId {
        let id = TaskId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        tasks.push(TaskEntry {
            id,
            fire_at: Instant::now() + delay,
            seq: self.inner.next_seq.fetch_add(1, Ordering::SeqCst),
            task,
        });
        id
    }

    /// Check if there are pending tasks
    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Get number of pending tasks
    pub fn pending_count(&self) -> usize {
        let tasks = self.inner.tasks.lock();
        let cancelled = self.inner.cancelled.lock();

        tasks.iter().filter(|t| !cancelled.contains(&t.id)).count()
    }

    /// Number of in-flight I/O operations holding the loop open
    pub fn outstanding_io(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Mark an I/O operation as in flight until the guard drops
    pub fn hold_io(&self) -> IoGuard {
        self.inner.outstanding.fetch_add(1, Ordering::SeqCst);
        IoGuard {
            inner: self.inner.clone(),
        }
    }

    /// Run every task that is due now; returns how many ran
    ///
    /// Tasks posted while running wait for the next call.
    pub fn run_ready(&self) -> usize {
        let ready = self.take_ready();
        let count = ready.len();
        for entry in ready {
            (entry.task)();
        }
        count
    }

    /// Run due tasks until none are left, bounded by `max_ticks`
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut executed = 0;
        for _ in 0..max_ticks {
            let ran = self.run_ready();
            if ran == 0 {
                break;
            }
            executed += ran;
        }
        executed
    }

    /// Drive the loop until no tasks or I/O remain
    pub async fn wait_for_idle(&self, config: IdleConfig) -> IdleResult {
        let start = Instant::now();
        let mut executed = 0;

        loop {
            executed += self.run_ready();

            if !self.has_pending() && self.outstanding_io() == 0 {
                return IdleResult {
                    is_idle: true,
                    tasks_executed: executed,
                    wait_time: start.elapsed(),
                    timed_out: false,
                };
            }

            let elapsed = start.elapsed();
            if elapsed >= config.timeout || executed >= config.max_task_executions {
                return IdleResult {
                    is_idle: false,
                    tasks_executed: executed,
                    wait_time: elapsed,
                    timed_out: elapsed >= config.timeout,
                };
            }

            let wait = self
                .time_until_next()
                .unwrap_or(config.poll_interval)
                .min(config.poll_interval)
                .min(config.timeout - elapsed);

            tokio::select! {
                _ = self.inner.wake.notified() => {}
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Wait duration until next task is due
    pub fn time_until_next(&self) -> Option<Duration> {
        let tasks = self.inner.tasks.lock();
        let cancelled = self.inner.cancelled.lock();
        let now = Instant::now();

        tasks
            .iter()
            .filter(|t| !cancelled.contains(&t.id))
            .map(|t| t.fire_at.saturating_duration_since(now))
            .min()
    }

    fn take_ready(&self) -> Vec<TaskEntry> {
        let now = Instant::now();
        let mut tasks = self.inner.tasks.lock();
        let mut cancelled = self.inner.cancelled.lock();

        let mut ready = Vec::new();
        while tasks.peek().map(|t| t.fire_at <= now).unwrap_or(false) {
            if let Some(entry) = tasks.pop() {
                if let Some(pos) = cancelled.iter().position(|id| *id == entry.id) {
                    cancelled.swap_remove(pos);
                    continue;
                }
                ready.push(entry);
            }
        }
        ready
    }
}

/// Keeps [`EventLoop::wait_for_idle`] from returning while I/O is in flight
pub struct IoGuard {
    inner: Arc<Inner>,
}

impl Drop for IoGuard {
    fn drop(&mut self) {
        self.inner.outstanding.fetch_sub(1, Ordering::SeqCst);
        self.inner.wake.notify_one();
    }
}

/// Result of waiting for idle
#[derive(Debug, Clone)]
pub struct IdleResult {
    /// Whether we reached idle state
    pub is_idle: bool,
    /// Number of tasks executed
    pub tasks_executed: usize,
    /// Total wait time
    pub wait_time: Duration,
    /// Whether we hit the timeout
    pub timed_out: bool,
}

/// Configuration for wait_for_idle
#[derive(Debug, Clone)]
pub struct IdleConfig {
    /// Maximum time to wait for idle
    pub timeout: Duration,
    /// Maximum tasks to execute
    pub max_task_executions: usize,
    /// Longest sleep between checks
    pub poll_interval: Duration,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_task_executions: 1000,
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl IdleConfig {
    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
