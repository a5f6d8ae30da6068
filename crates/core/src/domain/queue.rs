// Bounded Job Queue
//
// FIFO buffer shared by every producer (dispatcher) and consumer (worker).
// Two semaphores track free slots and buffered jobs; the deque itself is only
// touched under a short std mutex.

use super::error::{DomainError, Result};
use super::job::Job;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::{Semaphore, TryAcquireError};

struct Inner {
    jobs: VecDeque<Job>,
    closed: bool,
}

/// Bounded, concurrency-safe FIFO of jobs
pub struct JobQueue {
    inner: Mutex<Inner>,
    slots: Semaphore,
    items: Semaphore,
    len: AtomicUsize,
    capacity: usize,
}

impl JobQueue {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DomainError::InvalidCapacity);
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                jobs: VecDeque::new(),
                closed: false,
            }),
            slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
            len: AtomicUsize::new(0),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered jobs right now (jobs already claimed by a worker are
    /// not counted). Never waits.
    pub fn current_length(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Append a job, waiting for a free slot while the queue is full.
    ///
    /// Only fails when the queue is closed.
    pub async fn enqueue(&self, job: Job) -> Result<()> {
        let permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| DomainError::QueueClosed)?;
        permit.forget();
        self.push(job)
    }

    /// Append a job without waiting.
    pub fn try_enqueue(&self, job: Job) -> Result<()> {
        match self.slots.try_acquire() {
            Ok(permit) => permit.forget(),
            Err(TryAcquireError::NoPermits) => {
                return Err(DomainError::QueueFull {
                    capacity: self.capacity,
                })
            }
            Err(TryAcquireError::Closed) => return Err(DomainError::QueueClosed),
        }
        self.push(job)
    }

    /// Remove the oldest job, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue has been closed and fully drained.
    pub async fn dequeue(&self) -> Option<Job> {
        match self.items.acquire().await {
            Ok(permit) => {
                permit.forget();
                let job = self.pop();
                self.slots.add_permits(1);
                job
            }
            // Closed: hand out whatever is left, then report exhaustion
            Err(_) => self.pop(),
        }
    }

    /// Stop admitting jobs. Pending `enqueue` calls fail with `QueueClosed`,
    /// buffered jobs stay available to `dequeue` until drained.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        self.slots.close();
        self.items.close();
    }

    fn push(&self, job: Job) -> Result<()> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(DomainError::QueueClosed);
        }
        inner.jobs.push_back(job);
        self.len.store(inner.jobs.len(), Ordering::Release);
        drop(inner);
        self.items.add_permits(1);
        Ok(())
    }

    fn pop(&self) -> Option<Job> {
        let mut inner = self.lock();
        let job = inner.jobs.pop_front();
        self.len.store(inner.jobs.len(), Ordering::Release);
        job
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave the deque half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("len", &self.current_length())
            .field("capacity", &self.capacity)
            .finish()
    }
}
