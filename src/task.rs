//! One background worker thread for jobs too slow for the frame loop.
//!
//! Results come back through a slot the submitting component polls from its
//! TICK handler. The worker only holds a weak reference to the slot, so
//! dropping the `TaskHandle` cancels delivery (and skips the job if it has
//! not started yet).

use std::io;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct Worker {
    sender: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn() -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let thread = thread::Builder::new()
            .name("term-modal-worker".into())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
                tracing::debug!("worker stopped");
            })?;
        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Queue `job`; its result lands in the returned handle.
    pub fn submit<T, F>(&self, job: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let slot = Arc::new(Mutex::new(Slot::Pending));
        let weak: Weak<Mutex<Slot<T>>> = Arc::downgrade(&slot);
        let wrapped: Job = Box::new(move || {
            if weak.strong_count() == 0 {
                tracing::trace!("task cancelled before start");
                return;
            }
            let value = job();
            match weak.upgrade() {
                Some(slot) => {
                    if let Ok(mut slot) = slot.lock() {
                        *slot = Slot::Ready(value);
                    }
                }
                None => tracing::trace!("task result dropped, handle gone"),
            }
        });

        let queued = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(wrapped).is_ok());
        if !queued {
            tracing::warn!("worker is gone, task will never complete");
            if let Ok(mut s) = slot.lock() {
                *s = Slot::Lost;
            }
        }
        TaskHandle { slot }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

enum Slot<T> {
    Pending,
    Ready(T),
    Taken,
    Lost,
}

/// Pending result of a submitted job.
pub struct TaskHandle<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> TaskHandle<T> {
    /// Take the result if the job has finished. Returns `None` while pending
    /// and after the result was taken.
    pub fn poll(&mut self) -> Option<T> {
        let mut slot = self.slot.lock().ok()?;
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(value) => Some(value),
            other => {
                *slot = other;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .map(|s| matches!(*s, Slot::Pending))
            .unwrap_or(false)
    }

    /// The job can never deliver: the worker shut down before it was queued.
    pub fn is_lost(&self) -> bool {
        self.slot
            .lock()
            .map(|s| matches!(*s, Slot::Lost))
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn wait_for<T>(handle: &mut TaskHandle<T>) -> T {
        for _ in 0..500 {
            if let Some(value) = handle.poll() {
                return value;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("task did not finish");
    }

    #[test]
    fn result_arrives_through_the_handle() {
        let worker = Worker::spawn().unwrap();
        let mut handle = worker.submit(|| 6 * 7);
        assert_eq!(wait_for(&mut handle), 42);
        assert!(handle.poll().is_none());
        assert!(!handle.is_pending());
    }

    #[test]
    fn dropped_handle_skips_queued_job() {
        let worker = Worker::spawn().unwrap();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let (ran_tx, ran_rx) = mpsc::channel::<&'static str>();

        // Block the worker until the second job's handle is gone.
        let mut first = worker.submit(move || {
            let _ = gate_rx.recv();
        });
        let second_tx = ran_tx.clone();
        let second = worker.submit(move || {
            let _ = second_tx.send("second");
        });
        drop(second);
        let mut third = worker.submit(move || {
            let _ = ran_tx.send("third");
        });
        gate_tx.send(()).unwrap();

        wait_for(&mut first);
        wait_for(&mut third);
        assert_eq!(ran_rx.try_iter().collect::<Vec<_>>(), vec!["third"]);
    }
}
