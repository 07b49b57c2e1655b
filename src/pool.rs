//! Fixed-size pool of OS threads fed from one shared queue.
//!
//! The queue and the stop flag live under the same mutex, so a worker checks
//! "stopped and empty" atomically and cannot miss a wake-up.

use crate::error::{ServerError, ServerResult};
use log::{debug, error};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A unit of work run by exactly one worker
pub type Task = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    tasks: VecDeque<Task>,
    stopping: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    available: Condvar,
}

/// A pool of long-lived worker threads
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

impl WorkerPool {
    /// Spawn `size` workers
    pub fn new(size: usize) -> ServerResult<Self> {
        if size == 0 {
            return Err(ServerError::Config("worker pool needs at least one thread".to_string()));
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                stopping: false,
            }),
            available: Condvar::new(),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(size),
            size,
        };

        for id in 0..size {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(id, shared))
                .map_err(|e| ServerError::WorkerSpawn(e.to_string()))?;
            pool.workers.push(handle);
        }

        Ok(pool)
    }

    /// Queue a task and wake one idle worker
    pub fn submit<F>(&self, task: F) -> ServerResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            if state.stopping {
                return Err(ServerError::PoolStopped);
            }
            state.tasks.push_back(Box::new(task));
        }
        self.shared.available.notify_one();
        Ok(())
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tasks waiting for a worker
    pub fn queued(&self) -> usize {
        self.shared.state.lock().tasks.len()
    }

    /// Stop accepting tasks, let the workers drain the queue, and join them
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock();
            if state.stopping && self.workers.is_empty() {
                return;
            }
            state.stopping = true;
        }
        self.shared.available.notify_all();

        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                error!("{} exited abnormally", name);
            }
        }
        debug!("Worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(id: usize, shared: Arc<Shared>) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            while state.tasks.is_empty() && !state.stopping {
                shared.available.wait(&mut state);
            }
            match state.tasks.pop_front() {
                Some(task) => task,
                // Stopped and drained
                None => return,
            }
        };

        // A panicking task unwinds only to here; whatever it owned is dropped
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("Task panicked on worker {}: {}", id, message);
        }
    }
}
