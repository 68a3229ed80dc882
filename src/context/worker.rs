//! Bounded background worker pool for fire-and-forget jobs.
//!
//! Submitting never blocks the caller: when the queue is full the job is
//! dropped. Jobs report their own outcome (usually by logging).

use log::{debug, error, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 2;

/// Default number of queued jobs before submissions are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Fixed-size thread pool fed by a bounded queue.
#[derive(Debug)]
pub struct BackgroundWorker {
    sender: Option<SyncSender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundWorker {
    /// Spawn `workers` threads sharing a queue of `capacity` jobs.
    pub fn new(workers: usize, capacity: usize) -> Self {
        let (sender, receiver) = sync_channel::<Job>(capacity);
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..workers.max(1))
            .filter_map(|index| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("mm-background-{}", index))
                    .spawn(move || run_worker(&receiver))
                    .map_err(|e| error!("Failed to spawn background worker: {}", e))
                    .ok()
            })
            .collect();

        Self {
            sender: Some(sender),
            handles,
        }
    }

    /// Queue a job. Returns `false` when it was dropped.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(sender) = &self.sender else {
            return false;
        };

        match sender.try_send(Box::new(job)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Background queue is full, dropping job");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Background workers have stopped, dropping job");
                false
            }
        }
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }
}

impl Default for BackgroundWorker {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS, DEFAULT_QUEUE_CAPACITY)
    }
}

impl Drop for BackgroundWorker {
    /// Close the queue and wait for queued jobs to finish.
    fn drop(&mut self) {
        self.sender.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Background worker terminated abnormally");
            }
        }
    }
}

fn run_worker(receiver: &Mutex<Receiver<Job>>) {
    loop {
        let next = match receiver.lock() {
            Ok(rx) => rx.recv(),
            Err(poisoned) => poisoned.into_inner().recv(),
        };

        let Ok(job) = next else {
            debug!("Background worker shutting down");
            break;
        };

        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("Background job panicked");
        }
    }
}
