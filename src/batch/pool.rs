//! Bounded worker pool for the network-bound repository pipeline.
//!
//! Items are pulled from a shared queue by at most `workers` scoped threads;
//! completions are handed back to the calling thread in the order they
//! finish. A panicking task is caught and reported as that item's failure.
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` over every item and feed each completion to `on_complete`.
    ///
    /// Returns once every item has completed; there is no early abort.
    pub fn run<T, R, F, C>(&self, items: Vec<T>, task: F, mut on_complete: C)
    where
        T: Send,
        R: Send,
        F: Fn(&T) -> R + Sync,
        C: FnMut(T, Result<R, String>),
    {
        if items.is_empty() {
            return;
        }
        let workers = self.workers.min(items.len());
        let queue = Mutex::new(VecDeque::from(items));
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                let task = &task;
                scope.spawn(move || loop {
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some(item) = next else {
                        tracing::trace!(worker, "queue drained");
                        break;
                    };
                    let result =
                        panic::catch_unwind(AssertUnwindSafe(|| task(&item))).map_err(panic_message);
                    if tx.send((item, result)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);
            for (item, result) in rx {
                on_complete(item, result);
            }
        });
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {text}")
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("worker panicked: {text}")
    } else {
        "worker panicked".to_string()
    }
}
