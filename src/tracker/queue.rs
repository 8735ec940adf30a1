//! FIFO task queue shared by the worker pool
//!
//! # Bookkeeping
//!
//! Every submitted task is *outstanding* until a worker acknowledges it with
//! [`TaskQueue::ack`]. Dequeuing does not end that; a task pushed back with
//! [`TaskQueue::requeue_front`] stays outstanding. [`TaskQueue::wait_drained`]
//! resolves once nothing is outstanding.

use crate::model::Task;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

/// Unbounded FIFO of pending tasks
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    available: Notify,
    outstanding: AtomicUsize,
    drained: Notify,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends a task and wakes one idle worker
    pub fn submit(&self, task: Task) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.lock().push_back(task);
        self.available.notify_one();
    }

    /// Puts an already outstanding task back at the head of the queue
    pub fn requeue_front(&self, task: Task) {
        self.lock().push_front(task);
        self.available.notify_one();
    }

    /// Pops the head of the queue without waiting
    pub fn try_pop(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    /// Suspends until a task is available and pops it
    ///
    /// Cancel-safe: a task is only removed on the path that returns it.
    pub async fn dequeue(&self) -> Task {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(task) = self.try_pop() {
                return task;
            }

            notified.await;
        }
    }

    /// Marks one dequeued task as finished
    pub fn ack(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);

        if previous <= 1 {
            self.drained.notify_waiters();
        }
    }

    /// Suspends until every submitted task has been acknowledged
    pub async fn wait_drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Tasks waiting in the queue
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Queued plus in-flight tasks
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Snapshot of the queued tasks, head first
    pub fn pending(&self) -> Vec<Task> {
        self.lock().iter().cloned().collect()
    }
}
